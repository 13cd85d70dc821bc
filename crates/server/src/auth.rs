//! Bearer-token authentication and claims-based authorisation.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use service::convenio::repository::ConvenioRepository;
use service::convenio::ConvenioService;
use service::especialidade::repository::EspecialidadeRepository;
use service::especialidade::EspecialidadeService;
use service::storage::image_store::ImageStore;
use tracing::{debug, warn};

pub const CONVENIO: &str = "Convenio";
pub const ESPECIALIDADE: &str = "Especialidade";
pub const ADICIONAR: &str = "Adicionar";
pub const ATUALIZAR: &str = "Atualizar";
pub const EXCLUIR: &str = "Excluir";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub convenios: Arc<ConvenioService>,
    pub especialidades: Arc<EspecialidadeService>,
}

impl ServerState {
    pub fn new(
        auth: ServerAuthConfig,
        convenio_repo: Arc<dyn ConvenioRepository>,
        especialidade_repo: Arc<dyn EspecialidadeRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        let convenios = Arc::new(ConvenioService::new(convenio_repo.clone(), especialidade_repo.clone()));
        let especialidades = Arc::new(EspecialidadeService::new(especialidade_repo, convenio_repo, images));
        Self { auth, convenios, especialidades }
    }
}

/// Token claims. `permissions` maps an entity to its comma-separated actions,
/// e.g. `{"Especialidade": "Adicionar,Atualizar"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub permissions: HashMap<String, String>,
}

impl Claims {
    pub fn allows(&self, entity: &str, action: &str) -> bool {
        self.permissions
            .get(entity)
            .is_some_and(|actions| actions.split(',').any(|a| a.trim() == action))
    }

    /// `Err(403)` unless the claim is present.
    pub fn require(&self, entity: &str, action: &str) -> Result<(), StatusCode> {
        if self.allows(entity, action) {
            return Ok(());
        }
        warn!(sub = %self.sub, entity, action, "missing permission");
        Err(StatusCode::FORBIDDEN)
    }
}

/// Sign an HS256 token valid for `ttl`.
pub fn issue_token(
    secret: &str,
    sub: &str,
    permissions: HashMap<String, String>,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims { sub: sub.to_string(), exp, permissions };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

fn is_anonymous(method: &Method, path: &str) -> bool {
    *method == Method::OPTIONS
        || path == "/health"
        || path == "/metrics"
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || path.starts_with("/images/")
        || (*method == Method::GET && path == "/api/v1/convenios")
}

/// Validate `Authorization: Bearer <token>` and expose the [`Claims`] as a
/// request extension. Missing or invalid tokens get 401.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if is_anonymous(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            warn!(path = %path, "missing or malformed Authorization header");
            StatusCode::UNAUTHORIZED
        })?;

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => {
            debug!(sub = %data.claims.sub, path = %path, "token accepted");
            req.extensions_mut().insert(data.claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(perms: &[(&str, &str)]) -> Claims {
        Claims {
            sub: "tester".into(),
            exp: usize::MAX,
            permissions: perms.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn actions_are_comma_separated() {
        let c = claims(&[(ESPECIALIDADE, "Adicionar, Atualizar")]);
        assert!(c.allows(ESPECIALIDADE, ADICIONAR));
        assert!(c.allows(ESPECIALIDADE, ATUALIZAR));
        assert!(!c.allows(ESPECIALIDADE, EXCLUIR));
        assert!(!c.allows(CONVENIO, ADICIONAR));
        assert_eq!(c.require(CONVENIO, EXCLUIR), Err(StatusCode::FORBIDDEN));
    }

    #[test]
    fn issued_token_decodes() {
        let token = issue_token(
            "secret",
            "tester",
            HashMap::from([(CONVENIO.to_string(), EXCLUIR.to_string())]),
            chrono::Duration::minutes(5),
        )
        .unwrap();
        let data = decode::<Claims>(&token, &DecodingKey::from_secret(b"secret"), &Validation::new(Algorithm::HS256)).unwrap();
        assert!(data.claims.allows(CONVENIO, EXCLUIR));
    }

    #[test]
    fn public_paths() {
        assert!(is_anonymous(&Method::GET, "/api/v1/convenios"));
        assert!(!is_anonymous(&Method::POST, "/api/v1/convenios"));
        assert!(!is_anonymous(&Method::GET, "/api/v1/especialidades"));
        assert!(is_anonymous(&Method::GET, "/health"));
    }
}
