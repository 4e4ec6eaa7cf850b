//! Authentication API endpoints.
//!
//! Credentials are checked by the identity provider; these endpoints only
//! tie a validated token to a profile document and handle sign-out.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use doc_store::DocumentStore;
use entities::User;
use rpc_protocol::responses::*;

use super::convert::entity_to_rpc_user;
use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Display name for a first sign-in without a name claim.
fn default_display_name(user: &AuthenticatedUser) -> String {
    match user.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => user
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Ensures the caller's profile exists.
///
/// The first sign-in creates the profile with default fields; later ones
/// only refresh `updated_at`.
pub async fn start_session<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<SessionResponse>> {
    let mut tx = state.store.begin().await?;

    let (profile, created) = match tx.get_user(user.id).await? {
        Some(mut existing) => {
            existing.updated_at = chrono::Utc::now();
            (existing, false)
        }
        None => {
            let profile = User::new(user.id, user.email.clone())
                .with_display_name(default_display_name(&user));
            (profile, true)
        }
    };

    tx.put_user(profile.clone()).await?;
    tx.commit().await?;

    if created {
        tracing::info!(user_id = %user.id, "User profile created");
    }

    Ok(Json(SessionResponse {
        user: entity_to_rpc_user(&profile),
        created,
    }))
}

/// Gets the current authenticated user.
pub async fn get_current_user<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<UserResponse>> {
    let profile = state
        .store
        .get_user(user.id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        user: entity_to_rpc_user(&profile),
    }))
}

/// Logs out the current user by revoking the presented token.
pub async fn logout<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<LogoutResponse>> {
    state.revocations.revoke(&user.claims).await?;
    let removed = state.revocations.cleanup_expired().await?;

    tracing::info!(user_id = %user.id, pruned = removed, "User logged out");

    Ok(Json(LogoutResponse { success: true }))
}
