use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// JSON body extractor whose rejections use the API error envelope
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(AppJsonRejection)
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => {
                format!("Invalid request body: {}", err.body_text())
            }
            JsonRejection::JsonSyntaxError(_) => "Invalid request body: malformed JSON".to_string(),
            JsonRejection::MissingJsonContentType(_) => {
                "Expected request with `Content-Type: application/json`".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

/// Handlers behind `auth_middleware` take the caller's identity as an argument
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authorization required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    struct NamedPayload {
        #[allow(dead_code)]
        name: String,
    }

    fn json_request(body: &'static str, content_type: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let req = json_request("{not json", Some("application/json"));
        let rejection = match AppJson::<NamedPayload>::from_request(req, &()).await {
            Err(rejection) => rejection,
            Ok(_) => panic!("expected rejection"),
        };
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let req = json_request(r#"{"name":"x"}"#, None);
        let rejection = match AppJson::<NamedPayload>::from_request(req, &()).await {
            Err(rejection) => rejection,
            Ok(_) => panic!("expected rejection"),
        };
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_authenticated_user_from_extensions() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .is_err());

        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "alice.smith@example.com".to_string(),
        };
        parts.extensions.insert(user.clone());
        let extracted = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(extracted.user_id, user.user_id);
    }
}
