use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Claims, IdentityVerifier};
use crate::database::UserId;
use crate::error::ApiError;

/// Authenticated caller, injected into request extensions by
/// [`jwt_auth_middleware`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
        }
    }
}

/// Resolves the caller before any handler runs. Requests without a usable
/// token never reach the handler.
pub async fn jwt_auth_middleware(
    State(verifier): State<Arc<dyn IdentityVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())?;
    let claims = verifier.verify(token)?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated user {}", auth_user.user_id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header. A `Bearer ` prefix
/// is optional; an absent, unreadable or empty header means no token.
fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
