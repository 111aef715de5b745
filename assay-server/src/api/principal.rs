//! Authenticated principal extractor
//!
//! Credential verification is an upstream concern (reverse proxy or
//! auth service); this server trusts the `x-user-id` header that layer
//! sets after verifying the caller. Endpoints that take a `Principal`
//! answer 401 when the header is absent or not a UUID.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::api::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated identity attributed to a request
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or(ApiError::Unauthorized)?;

        Ok(Principal { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Principal, ApiError> {
        let (mut parts, _) = request.into_parts();
        Principal::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header() {
        let user_id = Uuid::new_v4();
        let request = Request::builder()
            .header(USER_ID_HEADER, user_id.to_string())
            .body(())
            .unwrap();

        let principal = extract(request).await.unwrap();
        assert_eq!(principal.user_id, user_id);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(ApiError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_malformed_header_is_unauthorized() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await,
            Err(ApiError::Unauthorized)
        ));
    }
}
