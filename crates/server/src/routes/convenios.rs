use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use service::convenio::domain::{ConvenioInput, EnderecoInput};
use service::notification::Notifier;
use tracing::info;
use uuid::Uuid;

use crate::auth::{Claims, ServerState, ADICIONAR, ATUALIZAR, CONVENIO, EXCLUIR};
use crate::response::{body_rejected, custom_response, respond};

#[utoipa::path(
    get, path = "/api/v1/convenios", tag = "convenios",
    responses((status = 200, description = "All providers"))
)]
pub async fn list(State(state): State<ServerState>) -> Response {
    respond(state.convenios.list().await)
}

#[utoipa::path(
    get, path = "/api/v1/convenios/{id}", tag = "convenios",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses((status = 200, description = "Provider with address and specialties"), (status = 404, description = "Not Found")),
    security(("bearer" = []))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Response {
    respond(state.convenios.get_detail(id).await)
}

#[utoipa::path(
    post, path = "/api/v1/convenios", tag = "convenios",
    request_body = crate::openapi::ConvenioInputDoc,
    responses((status = 200, description = "Created"), (status = 400, description = "Validation Error")),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<ConvenioInput>, JsonRejection>,
) -> Response {
    if let Err(status) = claims.require(CONVENIO, ADICIONAR) {
        return status.into_response();
    }
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };
    info!(sub = %claims.sub, document = %input.document, "convenio_create_request");
    let mut notifier = Notifier::new();
    let result = state.convenios.create(input, &mut notifier).await;
    custom_response(result, notifier)
}

#[utoipa::path(
    put, path = "/api/v1/convenios/{id}", tag = "convenios",
    params(("id" = Uuid, Path, description = "Provider id")),
    request_body = crate::openapi::ConvenioInputDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Result<Json<ConvenioInput>, JsonRejection>,
) -> Response {
    if let Err(status) = claims.require(CONVENIO, ATUALIZAR) {
        return status.into_response();
    }
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };
    let mut notifier = Notifier::new();
    let result = state.convenios.update(id, input, &mut notifier).await;
    custom_response(result, notifier)
}

#[utoipa::path(
    delete, path = "/api/v1/convenios/{id}", tag = "convenios",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses((status = 200, description = "Deleted"), (status = 400, description = "Still has specialties"), (status = 404, description = "Not Found")),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(status) = claims.require(CONVENIO, EXCLUIR) {
        return status.into_response();
    }
    let mut notifier = Notifier::new();
    let result = state.convenios.delete(id, &mut notifier).await;
    custom_response(result, notifier)
}

#[utoipa::path(
    get, path = "/api/v1/convenios/{id}/especialidades", tag = "convenios",
    params(("id" = Uuid, Path, description = "Provider id")),
    responses((status = 200, description = "Specialties of the provider")),
    security(("bearer" = []))
)]
pub async fn list_especialidades(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Response {
    respond(state.especialidades.list_by_convenio(id).await)
}

#[utoipa::path(
    get, path = "/api/v1/enderecos/{id}", tag = "convenios",
    params(("id" = Uuid, Path, description = "Address id")),
    responses((status = 200, description = "Address"), (status = 404, description = "Not Found")),
    security(("bearer" = []))
)]
pub async fn get_endereco(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Response {
    respond(state.convenios.get_endereco(id).await)
}

#[utoipa::path(
    put, path = "/api/v1/enderecos/{id}", tag = "convenios",
    params(("id" = Uuid, Path, description = "Address id")),
    request_body = crate::openapi::EnderecoInputDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")),
    security(("bearer" = []))
)]
pub async fn update_endereco(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Result<Json<EnderecoInput>, JsonRejection>,
) -> Response {
    if let Err(status) = claims.require(CONVENIO, ATUALIZAR) {
        return status.into_response();
    }
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };
    let mut notifier = Notifier::new();
    let result = state.convenios.update_endereco(id, input, &mut notifier).await;
    custom_response(result, notifier)
}
