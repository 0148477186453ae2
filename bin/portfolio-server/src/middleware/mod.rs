//! HTTP middleware stack and request-context extractors.

pub mod auth;
pub mod cors;
pub mod trace;

pub use auth::Caller;
