//! Request extractors.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;

/// JSON body that has been deserialised and passed `validator` checks.
///
/// Body rejections are reported through [`ServerError`] so they share the
/// response envelope with every other failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ServerError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Validate a body extracted as `Result<Json<T>, JsonRejection>`.
///
/// Update handlers extract the body this way so that existence and
/// ownership checks run before any validation failure is reported.
pub fn validated<T: Validate>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    let Json(value) = body.map_err(|rejection| ServerError::Validation(rejection.body_text()))?;
    value.validate()?;
    Ok(value)
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        let ValidatedJson(probe) = ValidatedJson::<Probe>::from_request(request(r#"{"name":"a"}"#), &())
            .await
            .unwrap();
        assert_eq!(probe.name, "a");
    }

    #[tokio::test]
    async fn rejects_invalid_and_malformed_bodies() {
        let err = ValidatedJson::<Probe>::from_request(request(r#"{"name":""}"#), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Validation(m) if m.contains("name is required")));

        let err = ValidatedJson::<Probe>::from_request(request("{"), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
    }
}
