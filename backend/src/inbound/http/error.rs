//! Single mapping from domain [`Error`] to HTTP responses.
//!
//! | code              | status |
//! |-------------------|--------|
//! | `invalid_request` | 400    |
//! | `not_found`       | 404    |
//! | `conflict`        | 409    |
//! | `internal_error`  | 500    |
//!
//! Internal failures are logged with their trace id and replaced by a fixed
//! message before they reach the client.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for directory handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

/// Body sent to the client: internal errors keep only code and trace id.
fn client_payload(err: &Error) -> Error {
    match err.code() {
        ErrorCode::InternalError => {
            let redacted = Error::internal(REDACTED_MESSAGE);
            match err.trace_id() {
                Some(id) => redacted.with_trace_id(id),
                None => redacted,
            }
        }
        _ => err.clone(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                trace_id = self.trace_id(),
                cause = self.message(),
                details = ?self.details(),
                "directory request failed"
            );
        } else {
            debug!(
                trace_id = self.trace_id(),
                code = ?self.code(),
                message = self.message(),
                "directory request rejected"
            );
        }

        let mut response = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id));
        }
        response.json(client_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced in a directory handler");
        Error::internal(REDACTED_MESSAGE)
    }
}

/// Render unreadable JSON bodies as `invalid_request` payloads.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let reason = match &err {
        JsonPayloadError::ContentType => "content type must be application/json".to_owned(),
        other => other.to_string(),
    };
    Error::invalid_request("request body is not valid JSON")
        .with_details(json!({ "code": "malformed_body", "reason": reason }))
        .into()
}

/// JSON extractor configuration wired to [`json_error_handler`].
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}
