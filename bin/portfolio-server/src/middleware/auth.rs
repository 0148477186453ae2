//! Caller identity forwarded by the authenticating gateway.
//!
//! The gateway sets `X-User-Id` (required) and `X-User-Role` (`user` or
//! `admin`, defaulting to `user`). Handlers take a [`Caller`] argument and
//! run every ownership decision through [`Caller::ensure_owner_or_admin`].

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use strum::EnumString;
use tracing::debug;

use crate::error::ServerError;

pub static X_USER_ID: &str = "x-user-id";
pub static X_USER_ROLE: &str = "x-user-role";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ServerError> {
        let user_id = headers
            .get(X_USER_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ServerError::Unauthorized("missing X-User-Id".into()))?;
        let role = headers
            .get(X_USER_ROLE)
            .and_then(|v| v.to_str().ok())
            .map(|raw| {
                raw.trim().parse().unwrap_or_else(|_| {
                    debug!(role = raw, "unknown role; treating caller as user");
                    Role::User
                })
            })
            .unwrap_or_default();
        Ok(Self {
            user_id: user_id.to_owned(),
            role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Shared authorization predicate for owned resources.
    pub fn ensure_owner_or_admin(&self, owner_id: &str, what: &str) -> Result<(), ServerError> {
        if self.user_id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(ServerError::Forbidden(format!("not authorized to access this {what}")))
        }
    }

    pub fn require_admin(&self) -> Result<(), ServerError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServerError::Forbidden("admin role required".into()))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

/// `Option<Caller>` for endpoints that are public but show more to admins.
impl<S: Send + Sync> OptionalFromRequestParts<S> for Caller {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers).ok())
    }
}
