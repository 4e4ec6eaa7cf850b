//! User profile API endpoints.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use base64::Engine as _;
use doc_store::{DocumentStore, StoreTransaction, UserFilter};
use entities::{User, UserId, union_insert};
use rpc_protocol::{requests::*, responses::*};

use super::convert::entity_to_rpc_user;
use crate::error::{ServerError, ServerResult, parse_id};
use crate::middleware::AuthenticatedUser;
use crate::services::blob_store::profile_photo_key;
use crate::state::AppState;

/// Largest accepted profile photo, after decoding.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Largest page returned by a search.
const MAX_SEARCH_LIMIT: u32 = 100;

async fn load_own_profile(tx: &mut dyn StoreTransaction, user_id: UserId) -> ServerResult<User> {
    tx.get_user(user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))
}

fn clean_skill(skill: &str) -> ServerResult<String> {
    let skill = skill.trim();
    if skill.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Skill name must not be empty".to_string(),
        ));
    }
    Ok(skill.to_string())
}

/// Gets a profile by id.
pub async fn get_user<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<GetUserRequest>,
) -> ServerResult<Json<UserResponse>> {
    let user_id = parse_id(&request.user_id, "user_id")?;

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        user: entity_to_rpc_user(&user),
    }))
}

/// Updates the caller's profile. Absent fields are left unchanged.
pub async fn update_profile<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> ServerResult<Json<UserResponse>> {
    let mut tx = state.store.begin().await?;
    let mut user = load_own_profile(tx.as_mut(), caller.id).await?;

    if let Some(display_name) = request.display_name {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ServerError::InvalidRequest(
                "Display name must not be empty".to_string(),
            ));
        }
        user.display_name = display_name.to_string();
    }
    if let Some(title) = request.title {
        user.title = title.trim().to_string();
    }
    if let Some(bio) = request.bio {
        user.bio = bio.trim().to_string();
    }
    if let Some(location) = request.location {
        user.location = location.trim().to_string();
    }
    if let Some(availability) = request.availability {
        user.availability = availability.trim().to_string();
    }
    if let Some(skills) = request.skills {
        let mut cleaned = Vec::with_capacity(skills.len());
        for skill in skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            union_insert(&mut cleaned, skill.to_string());
        }
        user.skills = cleaned;
    }

    user.updated_at = chrono::Utc::now();
    tx.put_user(user.clone()).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(UserResponse {
        user: entity_to_rpc_user(&user),
    }))
}

/// Adds a skill to the caller's profile.
pub async fn add_skill<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<AddSkillRequest>,
) -> ServerResult<Json<UserResponse>> {
    let skill = clean_skill(&request.skill)?;

    let mut tx = state.store.begin().await?;
    let mut user = load_own_profile(tx.as_mut(), caller.id).await?;

    if user.add_skill(skill.clone()) {
        user.updated_at = chrono::Utc::now();
        tx.put_user(user.clone()).await?;
        tx.commit().await?;
        tracing::info!(user_id = %user.id, skill = %skill, "Skill added to profile");
    }

    Ok(Json(UserResponse {
        user: entity_to_rpc_user(&user),
    }))
}

/// Removes a skill from the caller's profile.
pub async fn remove_skill<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<RemoveSkillRequest>,
) -> ServerResult<Json<UserResponse>> {
    let skill = clean_skill(&request.skill)?;

    let mut tx = state.store.begin().await?;
    let mut user = load_own_profile(tx.as_mut(), caller.id).await?;

    if user.remove_skill(&skill) {
        user.updated_at = chrono::Utc::now();
        tx.put_user(user.clone()).await?;
        tx.commit().await?;
        tracing::info!(user_id = %user.id, skill = %skill, "Skill removed from profile");
    }

    Ok(Json(UserResponse {
        user: entity_to_rpc_user(&user),
    }))
}

/// Stores a new profile photo and points the caller's profile at it.
pub async fn upload_photo<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<UploadPhotoRequest>,
) -> ServerResult<Json<UploadPhotoResponse>> {
    // Accept data URLs as produced by browser file readers.
    let encoded = match request.content_base64.split_once(";base64,") {
        Some((_, data)) => data,
        None => request.content_base64.as_str(),
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| ServerError::InvalidRequest("Photo is not valid base64".to_string()))?;
    if bytes.is_empty() {
        return Err(ServerError::InvalidRequest("Photo is empty".to_string()));
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(ServerError::InvalidRequest(format!(
            "Photo exceeds {} bytes",
            MAX_PHOTO_BYTES
        )));
    }

    let key = profile_photo_key(caller.id, &request.file_name)?;
    let previous_url = state
        .store
        .get_user(caller.id)
        .await?
        .and_then(|user| user.photo_url);
    let photo_url = state.blobs.upload(&key, bytes).await?;

    let updated: ServerResult<User> = async {
        let mut tx = state.store.begin().await?;
        let mut user = load_own_profile(tx.as_mut(), caller.id).await?;
        user.photo_url = Some(photo_url.clone());
        user.updated_at = chrono::Utc::now();
        tx.put_user(user.clone()).await?;
        tx.commit().await?;
        Ok(user)
    }
    .await;

    let user = match updated {
        Ok(user) => user,
        Err(e) => {
            // Keep the blob if the profile already points at it.
            if previous_url.as_deref() != Some(photo_url.as_str()) {
                if let Err(cleanup) = state.blobs.delete(&key).await {
                    tracing::warn!(key = %key, error = %cleanup, "Failed to remove orphaned photo");
                }
            }
            return Err(e);
        }
    };

    tracing::info!(user_id = %user.id, key = %key, "Profile photo uploaded");

    Ok(Json(UploadPhotoResponse {
        photo_url,
        user: entity_to_rpc_user(&user),
    }))
}

/// Searches profiles by skill and display-name prefix.
pub async fn search_users<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<SearchUsersRequest>,
) -> ServerResult<Json<SearchUsersResponse>> {
    let filter = UserFilter {
        skill: request.skill.map(|s| s.trim().to_string()),
        name_prefix: request.name_prefix.map(|p| p.trim().to_string()),
        exclude: request.exclude_self.then_some(caller.id),
        limit: Some(request.limit.unwrap_or(MAX_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT)),
        offset: Some(request.offset),
    };

    let (users, total_count) = state.store.list_users(filter).await?;

    Ok(Json(SearchUsersResponse {
        users: users.iter().map(entity_to_rpc_user).collect(),
        total_count,
    }))
}

/// Lists the profiles the caller is connected to.
pub async fn list_connections<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ServerResult<Json<ListConnectionsResponse>> {
    let user = state
        .store
        .get_user(caller.id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    let mut users = Vec::with_capacity(user.connections.len());
    for id in &user.connections {
        match state.store.get_user(*id).await? {
            Some(connection) => users.push(entity_to_rpc_user(&connection)),
            None => tracing::warn!(user_id = %user.id, connection = %id, "Dangling connection"),
        }
    }

    Ok(Json(ListConnectionsResponse { users }))
}
