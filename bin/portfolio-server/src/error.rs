//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to the standard `{ "success": false, "message": ... }` envelope with an
//! appropriate status code.
//!
//! **Security note:** store and internal errors are logged with full detail
//! but only a generic message is returned to the caller so that SQL or other
//! implementation details never leak to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::query::QueryError;
use crate::schemas::envelope::ApiResponse;

/// All errors that can occur in the portfolio-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write violated a field constraint (required field, enum, length).
    #[error("validation failed: {0}")]
    Validation(String),

    /// No caller identity was forwarded with the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but neither the owner nor an admin.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The caller referenced a resource or sub-resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Database(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let client_message = match self {
            // Client-facing errors: expose the message directly.
            ServerError::Validation(m)
            | ServerError::Unauthorized(m)
            | ServerError::Forbidden(m)
            | ServerError::NotFound(m) => m,

            ServerError::Database(e) => {
                error!(error = %e, "database error");
                "internal server error".to_owned()
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                "internal server error".to_owned()
            }
        };
        (status, Json(ApiResponse::<()>::failure(client_message))).into_response()
    }
}

impl From<QueryError> for ServerError {
    fn from(e: QueryError) -> Self {
        ServerError::Validation(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ServerError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_validation_errors("", &e, &mut fields);
        fields.sort();
        if fields.is_empty() {
            fields.push("invalid request body".to_owned());
        }
        ServerError::Validation(fields.join("; "))
    }
}

impl From<validator::ValidationError> for ServerError {
    fn from(e: validator::ValidationError) -> Self {
        ServerError::Validation(reason(std::slice::from_ref(&e)))
    }
}

fn reason(errs: &[validator::ValidationError]) -> String {
    errs.iter()
        .find_map(|err| err.message.as_ref().map(ToString::to_string))
        .or_else(|| errs.first().map(|err| err.code.to_string()))
        .unwrap_or_default()
}

/// Flatten nested struct and list errors into `path: reason` strings.
fn collect_validation_errors(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let field = field.to_string();
        let path = match (prefix, field.as_str()) {
            (_, "__all__") => prefix.to_owned(),
            ("", name) => name.to_owned(),
            (prefix, name) => format!("{prefix}.{name}"),
        };
        match kind {
            ValidationErrorsKind::Field(errs) if path.is_empty() => out.push(reason(errs)),
            ValidationErrorsKind::Field(errs) => out.push(format!("{path}: {}", reason(errs))),
            ValidationErrorsKind::Struct(inner) => collect_validation_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        error!(error = %e, "failed to (de)serialise embedded document");
        ServerError::Internal(e.to_string())
    }
}
