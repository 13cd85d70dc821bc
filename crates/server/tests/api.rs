use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose, Engine};
use configs::StorageConfig;
use serde_json::{json, Value};
use service::convenio::repository::mock::MockConvenioRepository;
use service::especialidade::repository::mock::MockEspecialidadeRepository;
use service::storage::image_store::FsImageStore;
use tower::ServiceExt;
use uuid::Uuid;

use server::auth::{self, ServerAuthConfig, ServerState};
use server::routes;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    image_dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) { let _ = std::fs::remove_dir_all(&self.image_dir); }
}

async fn build_app() -> anyhow::Result<TestApp> {
    let image_dir = std::env::temp_dir().join(format!("credenciamento_api_{}", Uuid::new_v4()));
    let images = FsImageStore::open(&image_dir).await?;
    let state = ServerState::new(
        ServerAuthConfig { jwt_secret: SECRET.into() },
        Arc::new(MockConvenioRepository::default()),
        Arc::new(MockEspecialidadeRepository::default()),
        Arc::new(images),
    );
    let storage = StorageConfig { image_dir: image_dir.display().to_string(), max_upload_bytes: 1_000_000 };
    let router = routes::build_router(state, tower_http::cors::CorsLayer::very_permissive(), &storage);
    Ok(TestApp { router, image_dir })
}

fn token(perms: &[(&str, &str)]) -> String {
    let perms: HashMap<String, String> = perms.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    auth::issue_token(SECRET, "tester", perms, chrono::Duration::minutes(5)).expect("token")
}

fn admin() -> String {
    token(&[
        (auth::CONVENIO, "Adicionar,Atualizar,Excluir"),
        (auth::ESPECIALIDADE, "Adicionar,Atualizar,Excluir"),
    ])
}

async fn send(app: &TestApp, method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.router.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

fn convenio_body(document: &str) -> Value {
    json!({
        "name": "Clinica Central",
        "document": document,
        "email": "central@clinica.com",
        "active": true,
        "endereco": {
            "street": "Rua Um", "number": "10", "district": "Centro",
            "postal_code": "01001000", "city": "Sao Paulo", "state": "SP"
        }
    })
}

async fn create_convenio(app: &TestApp, bearer: &str) -> anyhow::Result<Uuid> {
    let (status, body) = send(app, "POST", "/api/v1/convenios", Some(bearer), Some(convenio_body("12345678901"))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    Ok(serde_json::from_value(body["data"]["id"].clone())?)
}

fn cardiology(convenio_id: Uuid) -> Value {
    json!({
        "convenio_id": convenio_id,
        "name": "Cardiology",
        "description": "Heart care",
        "value": 150.00,
        "image": "x",
        "image_upload": general_purpose::STANDARD.encode("x"),
    })
}

fn is_generated(name: &str, base: &str) -> bool {
    name.split_once('_').is_some_and(|(token, rest)| {
        rest == base && !token.is_empty() && token.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
    })
}

#[tokio::test]
async fn public_routes_need_no_token() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/api/v1/convenios", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, "GET", "/api/v1/especialidades", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/api/v1/especialidades", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn mutations_require_the_matching_claim() -> anyhow::Result<()> {
    let app = build_app().await?;
    let reader = token(&[(auth::ESPECIALIDADE, "Atualizar")]);
    let (status, _) = send(&app, "POST", "/api/v1/especialidades", Some(&reader), Some(cardiology(Uuid::new_v4()))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "POST", "/api/v1/convenios", Some(&reader), Some(convenio_body("12345678901"))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn specialty_lifecycle() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let convenio_id = create_convenio(&app, &bearer).await?;

    let (status, body) = send(&app, "POST", "/api/v1/especialidades", Some(&bearer), Some(cardiology(convenio_id))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    let created = &body["data"];
    let id: Uuid = serde_json::from_value(created["id"].clone())?;
    let image = created["image"].as_str().expect("image").to_string();
    assert!(is_generated(&image, "x"), "{image}");
    assert_eq!(created["active"], false);
    assert_eq!(tokio::fs::read(app.image_dir.join(&image)).await?, b"x");

    let mut update = cardiology(convenio_id);
    update["id"] = json!(id);
    update["image"] = json!("");
    update["image_upload"] = Value::Null;
    update["value"] = json!(200.00);
    let (status, body) = send(&app, "PUT", &format!("/api/v1/especialidades/{id}"), Some(&bearer), Some(update)).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["value"], 200.0);
    assert_eq!(body["data"]["image"], image.as_str());

    let req = Request::builder().uri(format!("/images/{image}")).body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK, "stored image is served anonymously");

    let (status, body) = send(&app, "GET", &format!("/api/v1/convenios/{convenio_id}"), Some(&bearer), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["especialidades"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["endereco"]["state"], "SP");

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/especialidades/{id}"), Some(&bearer), None).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, _) = send(&app, "GET", &format!("/api/v1/especialidades/{id}"), Some(&bearer), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn rejected_create_lists_every_message() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let convenio_id = create_convenio(&app, &bearer).await?;

    let mut body = cardiology(convenio_id);
    body["image_upload"] = Value::Null;
    body["value"] = json!(-5.0);
    let (status, resp) = send(&app, "POST", "/api/v1/especialidades", Some(&bearer), Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["success"], false);
    let errors: Vec<String> = serde_json::from_value(resp["errors"].clone())?;
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors.iter().any(|e| e == service::especialidade::upload::IMAGE_REQUIRED));
    Ok(())
}

#[tokio::test]
async fn id_mismatch_is_a_validation_failure() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let convenio_id = create_convenio(&app, &bearer).await?;

    let mut body = convenio_body("12345678901");
    body["id"] = json!(Uuid::new_v4());
    let (status, resp) = send(&app, "PUT", &format!("/api/v1/convenios/{convenio_id}"), Some(&bearer), Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["errors"][0], service::notification::ID_MISMATCH);
    Ok(())
}

#[tokio::test]
async fn unbindable_body_is_reported_in_the_error_envelope() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let convenio_id = create_convenio(&app, &bearer).await?;

    let mut body = cardiology(convenio_id);
    body.as_object_mut().expect("object").remove("name");
    let (status, resp) = send(&app, "POST", "/api/v1/especialidades", Some(&bearer), Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["success"], false);
    assert!(resp["errors"][0].as_str().is_some_and(|e| e.contains("name")), "{resp}");

    let mut body = convenio_body("98765432100");
    body["active"] = json!("yes");
    let (status, resp) = send(&app, "PUT", &format!("/api/v1/convenios/{convenio_id}"), Some(&bearer), Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["success"], false);
    assert_eq!(resp["errors"].as_array().map(Vec::len), Some(1));

    // permission is checked before the body
    let reader = token(&[(auth::ESPECIALIDADE, "Atualizar")]);
    let (status, _) = send(&app, "POST", "/api/v1/especialidades", Some(&reader), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn deleting_unknown_specialty_is_404_with_empty_body() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let (status, body) = send(&app, "DELETE", &format!("/api/v1/especialidades/{}", Uuid::new_v4()), Some(&bearer), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
    Ok(())
}

#[tokio::test]
async fn provider_with_specialties_cannot_be_deleted() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let convenio_id = create_convenio(&app, &bearer).await?;
    let (status, _) = send(&app, "POST", "/api/v1/especialidades", Some(&bearer), Some(cardiology(convenio_id))).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/convenios/{convenio_id}"), Some(&bearer), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], service::convenio::service::HAS_ESPECIALIDADES);
    Ok(())
}

fn multipart_body(boundary: &str, fields: &Value, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("--{boundary}\r\nContent-Disposition: form-data; name=\"especialidade\"\r\nContent-Type: application/json\r\n\r\n").as_bytes());
    out.extend_from_slice(fields.to_string().as_bytes());
    out.extend_from_slice(b"\r\n");
    if let Some((name, bytes)) = file {
        out.extend_from_slice(format!("--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n").as_bytes());
        out.extend_from_slice(bytes);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

async fn upload(app: &TestApp, bearer: &str, fields: &Value, file: Option<(&str, &[u8])>) -> anyhow::Result<(StatusCode, Value)> {
    let boundary = "credenciamento-boundary";
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/especialidades/upload")
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(multipart_body(boundary, fields, file)))?;
    let resp = app.router.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn multipart_create_names_file_after_the_part() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let convenio_id = create_convenio(&app, &bearer).await?;
    let mut fields = cardiology(convenio_id);
    fields["image_upload"] = Value::Null;

    let (status, body) = upload(&app, &bearer, &fields, Some(("scan.png", &[1, 2, 3]))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let image = body["data"]["image"].as_str().expect("image").to_string();
    assert!(is_generated(&image, "scan.png"), "{image}");
    assert_eq!(tokio::fs::read(app.image_dir.join(&image)).await?, vec![1, 2, 3]);

    let (status, body) = upload(&app, &bearer, &fields, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], service::especialidade::upload::IMAGE_REQUIRED);
    Ok(())
}

#[tokio::test]
async fn multipart_file_name_may_contain_double_dots() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let convenio_id = create_convenio(&app, &bearer).await?;
    let mut fields = cardiology(convenio_id);
    fields["image_upload"] = Value::Null;

    let (status, body) = upload(&app, &bearer, &fields, Some(("photo..v2.png", &[7]))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let image = body["data"]["image"].as_str().expect("image").to_string();
    assert!(is_generated(&image, "photo..v2.png"), "{image}");
    assert_eq!(tokio::fs::read(app.image_dir.join(&image)).await?, vec![7]);
    Ok(())
}

#[tokio::test]
async fn malformed_multipart_fields_use_the_error_envelope() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let (status, body) = upload(&app, &bearer, &json!({"description": "no provider"}), Some(("a.png", &[1]))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["errors"][0].as_str().is_some_and(|e| e.contains("especialidade")), "{body}");
    Ok(())
}

#[tokio::test]
async fn sweep_removes_unreferenced_images() -> anyhow::Result<()> {
    let app = build_app().await?;
    let bearer = admin();
    let convenio_id = create_convenio(&app, &bearer).await?;
    let (status, _) = send(&app, "POST", "/api/v1/especialidades", Some(&bearer), Some(cardiology(convenio_id))).await?;
    assert_eq!(status, StatusCode::OK);
    tokio::fs::write(app.image_dir.join("stray.png"), b"s").await?;

    let (status, body) = send(&app, "POST", "/api/v1/admin/images/sweep", Some(&bearer), None).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"], json!(["stray.png"]));
    Ok(())
}
