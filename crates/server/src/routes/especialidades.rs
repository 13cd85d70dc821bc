use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    response::{IntoResponse, Response},
    Extension, Json,
};
use service::especialidade::domain::EspecialidadeInput;
use service::notification::Notifier;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{Claims, ServerState, ADICIONAR, ATUALIZAR, ESPECIALIDADE, EXCLUIR};
use crate::response::{body_rejected, custom_response, rejected, respond};

/// Multipart part holding the JSON fields.
pub const FIELDS_PART: &str = "especialidade";

#[utoipa::path(
    get, path = "/api/v1/especialidades", tag = "especialidades",
    responses((status = 200, description = "All specialties with provider name")),
    security(("bearer" = []))
)]
pub async fn list(State(state): State<ServerState>) -> Response {
    respond(state.especialidades.list().await)
}

#[utoipa::path(
    get, path = "/api/v1/especialidades/{id}", tag = "especialidades",
    params(("id" = Uuid, Path, description = "Specialty id")),
    responses((status = 200, description = "Specialty"), (status = 404, description = "Not Found")),
    security(("bearer" = []))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Response {
    respond(state.especialidades.get(id).await)
}

/// Create with the image inline as base64 in `image_upload`.
#[utoipa::path(
    post, path = "/api/v1/especialidades", tag = "especialidades",
    request_body = crate::openapi::EspecialidadeInputDoc,
    responses((status = 200, description = "Created"), (status = 400, description = "Validation Error")),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<EspecialidadeInput>, JsonRejection>,
) -> Response {
    if let Err(status) = claims.require(ESPECIALIDADE, ADICIONAR) {
        return status.into_response();
    }
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };
    info!(sub = %claims.sub, convenio_id = %input.convenio_id, "especialidade_create_request");
    let mut notifier = Notifier::new();
    let result = state.especialidades.create(input.into_command(), &mut notifier).await;
    custom_response(result, notifier)
}

/// Create from a multipart form: the `especialidade` part carries the JSON
/// fields and the first file part is the image.
#[utoipa::path(
    post, path = "/api/v1/especialidades/upload", tag = "especialidades",
    request_body(content = crate::openapi::EspecialidadeUploadDoc, content_type = "multipart/form-data"),
    responses((status = 200, description = "Created"), (status = 400, description = "Validation Error")),
    security(("bearer" = []))
)]
pub async fn create_upload(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    if let Err(status) = claims.require(ESPECIALIDADE, ADICIONAR) {
        return status.into_response();
    }
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return rejected(vec![rejection.body_text()]),
    };
    let (input, file) = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(message) => return rejected(vec![message]),
    };
    info!(sub = %claims.sub, convenio_id = %input.convenio_id, has_file = file.is_some(), "especialidade_upload_request");
    let cmd = match file {
        Some((file_name, bytes)) => input.into_command_with_file(file_name, bytes),
        None => EspecialidadeInput { image_upload: None, ..input }.into_command(),
    };
    let mut notifier = Notifier::new();
    let result = state.especialidades.create(cmd, &mut notifier).await;
    custom_response(result, notifier)
}

/// Errors come back as the message reported to the caller.
async fn read_upload_form(mut multipart: Multipart) -> Result<(EspecialidadeInput, Option<(String, Vec<u8>)>), String> {
    let invalid = |detail: String| format!("invalid multipart form: {detail}");

    let mut input = None;
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| invalid(e.to_string()))? {
        let name = field.name().unwrap_or_default().to_string();
        if name == FIELDS_PART {
            let text = field.text().await.map_err(|e| invalid(e.to_string()))?;
            let parsed: EspecialidadeInput = serde_json::from_str(&text)
                .map_err(|e| invalid(format!("part '{FIELDS_PART}': {e}")))?;
            input = Some(parsed);
        } else if let Some(file_name) = field.file_name().map(str::to_string) {
            let bytes = field.bytes().await.map_err(|e| invalid(e.to_string()))?;
            if file.is_none() {
                file = Some((file_name, bytes.to_vec()));
            } else {
                debug!(part = %name, "extra file part ignored");
            }
        }
    }
    let input = input.ok_or_else(|| invalid(format!("missing part '{FIELDS_PART}'")))?;
    Ok((input, file))
}

#[utoipa::path(
    put, path = "/api/v1/especialidades/{id}", tag = "especialidades",
    params(("id" = Uuid, Path, description = "Specialty id")),
    request_body = crate::openapi::EspecialidadeInputDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Result<Json<EspecialidadeInput>, JsonRejection>,
) -> Response {
    if let Err(status) = claims.require(ESPECIALIDADE, ATUALIZAR) {
        return status.into_response();
    }
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };
    let mut notifier = Notifier::new();
    let result = state.especialidades.update(id, input.into_command(), &mut notifier).await;
    custom_response(result, notifier)
}

#[utoipa::path(
    delete, path = "/api/v1/especialidades/{id}", tag = "especialidades",
    params(("id" = Uuid, Path, description = "Specialty id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not Found")),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(status) = claims.require(ESPECIALIDADE, EXCLUIR) {
        return status.into_response();
    }
    respond(state.especialidades.delete(id).await)
}

/// Remove image files no specialty references.
#[utoipa::path(
    post, path = "/api/v1/admin/images/sweep", tag = "maintenance",
    responses((status = 200, description = "Names of removed files")),
    security(("bearer" = []))
)]
pub async fn sweep_images(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Response {
    if let Err(status) = claims.require(ESPECIALIDADE, EXCLUIR) {
        return status.into_response();
    }
    info!(sub = %claims.sub, "orphan_sweep_request");
    respond(state.especialidades.sweep_orphan_images().await)
}
