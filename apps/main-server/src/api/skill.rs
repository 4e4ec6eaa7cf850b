//! Skill catalogue API endpoints.

use std::sync::Arc;

use axum::{Json, extract::State};
use doc_store::DocumentStore;
use entities::Skill;
use rpc_protocol::{requests::*, responses::*};

use super::convert::entity_to_rpc_skill;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Lists the skill catalogue.
pub async fn list_skills<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<ListSkillsResponse>> {
    let skills = state.store.list_skills().await?;

    Ok(Json(ListSkillsResponse {
        skills: skills.iter().map(entity_to_rpc_skill).collect(),
    }))
}

/// Adds a skill to the catalogue.
pub async fn create_skill<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<CreateSkillRequest>,
) -> ServerResult<Json<CreateSkillResponse>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Skill name must not be empty".to_string(),
        ));
    }

    let skill = state
        .store
        .create_skill(Skill::new(name, request.description.trim()))
        .await?;

    tracing::info!(skill_id = %skill.id, name = %skill.name, "Skill created");

    Ok(Json(CreateSkillResponse {
        skill: entity_to_rpc_skill(&skill),
    }))
}

/// Adds the default catalogue entries that are still missing.
///
/// Returns the number of skills added.
pub async fn seed_default_skills<S: DocumentStore>(store: &S) -> doc_store::StoreResult<usize> {
    let mut added = 0;
    for skill in entities::default_skills() {
        if store.get_skill_by_name(&skill.name).await?.is_some() {
            continue;
        }
        store.create_skill(skill).await?;
        added += 1;
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use doc_store::MemoryStore;
    use serde_json::json;

    use super::*;
    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_create_and_list_skills() {
        let app = TestApp::new().await;
        let token = app.token_for_new_user("ada@example.com", Some("Ada")).await;

        let (status, body) = app
            .post(
                "/api/skill/create",
                &token,
                json!({ "name": "Rust", "description": "Systems programming" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skill"]["name"], "Rust");

        let (status, body) = app
            .post("/api/skill/create", &token, json!({ "name": "rust" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid-argument");

        let (_, body) = app.post("/api/skill/list", &token, json!({})).await;
        assert_eq!(body["skills"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let store = MemoryStore::new();

        assert_eq!(seed_default_skills(&store).await.unwrap(), 5);
        assert_eq!(seed_default_skills(&store).await.unwrap(), 0);

        let names: Vec<_> = store
            .list_skills()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert!(names.contains(&"TypeScript".to_string()));
        assert_eq!(names.len(), 5);
    }
}
