//! Authentication middleware.

use std::sync::Arc;

use auth::Claims;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use doc_store::DocumentStore;
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::AppState;

/// Authenticated user information.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User display name.
    pub name: Option<String>,
    /// Claims of the presented token, kept for sign-out.
    pub claims: Claims,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email.clone(),
            name: claims.name.clone(),
            claims,
        })
    }
}

/// Extracts the JWT token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn authenticate<S: DocumentStore>(
    state: &AppState<S>,
    token: Option<String>,
) -> Result<AuthenticatedUser, ServerError> {
    let token = token.ok_or(ServerError::AuthenticationRequired)?;
    let claims = state.jwt_manager.validate_token(&token)?;

    if state.revocations.is_revoked(&claims.jti).await? {
        return Err(auth::AuthError::TokenRevoked.into());
    }

    Ok(AuthenticatedUser::try_from(claims)?)
}

/// Authentication middleware.
///
/// Validates the bearer token, rejects revoked tokens and stores the
/// authenticated user in the request extensions.
pub async fn auth_middleware<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_token(&request).map(str::to_string);
    match authenticate(&state, token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(
                path = %request.uri().path(),
                error = %e,
                "Rejected unauthenticated request"
            );
            e.into_response()
        }
    }
}
