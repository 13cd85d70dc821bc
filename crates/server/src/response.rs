//! Rendering service outcomes as HTTP responses.
//!
//! - success: `200 {"success": true, "data": ...}`
//! - rejected: `400 {"success": false, "errors": [...]}`
//! - lookup failure: `404` with an empty body
//! - anything else: `500` [`JsonApiError`]

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use service::notification::Notifier;
use tracing::error;

use crate::errors::JsonApiError;

#[derive(Debug, Serialize)]
struct Success<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct Rejected {
    success: bool,
    errors: Vec<String>,
}

/// Response for an operation that reports rule violations through `notifier`.
pub fn custom_response<T: Serialize>(result: Result<Option<T>, ServiceError>, notifier: Notifier) -> Response {
    match result {
        Err(e) => failure(e),
        Ok(_) if notifier.has_notifications() => rejected(notifier.into_notifications()),
        Ok(Some(data)) => success(data),
        Ok(None) => {
            error!("operation produced neither a result nor notifications");
            JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None).into_response()
        }
    }
}

/// Response for an operation without business rules (reads, deletes).
pub fn respond<T: Serialize>(result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(data) => success(data),
        Err(e) => failure(e),
    }
}

pub fn rejected(errors: Vec<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(Rejected { success: false, errors })).into_response()
}

/// A body that failed to bind is reported like any other rule violation.
pub fn body_rejected(rejection: JsonRejection) -> Response {
    rejected(vec![rejection.body_text()])
}

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(Success { success: true, data })).into_response()
}

fn failure(e: ServiceError) -> Response {
    if e.is_not_found() {
        return StatusCode::NOT_FOUND.into_response();
    }
    error!(error = %e, "request failed");
    JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_win_over_a_result() {
        let mut n = Notifier::new();
        n.record("name required");
        let res = custom_response(Ok(Some(1)), n);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_errors_win_over_notifications() {
        let mut n = Notifier::new();
        n.record("name required");
        let res = custom_response::<u8>(Err(ServiceError::Db("down".into())), n);
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unbindable_body_uses_the_error_envelope() {
        use axum::extract::FromRequest;

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Body {
            value: f64,
        }
        let req = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"value": "ten"}"#))
            .unwrap();
        let rejection = Json::<Body>::from_request(req, &()).await.expect_err("type mismatch");
        let res = body_rejected(rejection);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["errors"][0].as_str().unwrap().contains("value"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let res = respond::<u8>(Err(ServiceError::not_found("especialidade")));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(custom_response(Ok(Some("x")), Notifier::new()).status(), StatusCode::OK);
    }
}
