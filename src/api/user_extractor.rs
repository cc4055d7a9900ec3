use crate::model::UserContext;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};

/// Axum extractor for the acting curator.
///
/// Reads `X-User-Id` (and optionally `X-User-Email`, `X-User-Name`). Without
/// headers the development user is used; authorization happens upstream.
#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        if let Some(user_id) = extract_header_value(headers, "x-user-id") {
            let user_email = extract_header_value(headers, "x-user-email");
            let user_name = extract_header_value(headers, "x-user-name");

            Ok(UserContext::with_details(user_id, user_email, user_name))
        } else {
            Ok(UserContext::default_user())
        }
    }
}

fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}
