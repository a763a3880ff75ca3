use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;
use uuid::Uuid;

use crate::http::AppError;
use crate::AppState;

/// Identity forwarded by the authenticating front layer. This service never
/// verifies credentials itself; it only requires a well-formed principal.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::bad_request("missing x-user-id header"))?;

        let user_id = Uuid::parse_str(header)
            .map_err(|_| AppError::bad_request("invalid x-user-id header"))?;

        Ok(AuthUser { user_id })
    }
}
