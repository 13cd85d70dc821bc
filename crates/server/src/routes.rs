use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use configs::StorageConfig;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::{metrics::encode_metrics, types::Health};

use crate::auth::{self, ServerState};
use crate::openapi::ApiDoc;

pub mod convenios;
pub mod especialidades;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}

/// Build the full application router: public routes, the authenticated API,
/// stored images and the API docs.
pub fn build_router(state: ServerState, cors: CorsLayer, storage: &StorageConfig) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest_service("/images", ServeDir::new(&storage.image_dir));

    let api = Router::new()
        .route("/api/v1/convenios", get(convenios::list).post(convenios::create))
        .route(
            "/api/v1/convenios/:id",
            get(convenios::get).put(convenios::update).delete(convenios::delete),
        )
        .route("/api/v1/convenios/:id/especialidades", get(convenios::list_especialidades))
        .route("/api/v1/enderecos/:id", get(convenios::get_endereco).put(convenios::update_endereco))
        .route("/api/v1/especialidades", get(especialidades::list).post(especialidades::create))
        .route("/api/v1/especialidades/upload", post(especialidades::create_upload))
        .route(
            "/api/v1/especialidades/:id",
            get(especialidades::get).put(especialidades::update).delete(especialidades::delete),
        )
        .route("/api/v1/admin/images/sweep", post(especialidades::sweep_images))
        .layer(DefaultBodyLimit::max(storage.max_upload_bytes))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    public
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
