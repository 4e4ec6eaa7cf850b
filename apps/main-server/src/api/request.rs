//! Mentorship request API endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use doc_store::{DocumentStore, RequestFilter};
use entities::{MentorshipRequest, UserId, default_request_message};
use rpc_protocol::{Direction, requests::*, responses::*};

use super::convert::{entity_to_rpc_request, to_entity_request_status};
use crate::error::{ServerError, ServerResult, parse_id};
use crate::middleware::AuthenticatedUser;
use crate::services::mentorship;
use crate::state::AppState;

/// Looks up display names, remembering each user once.
struct NameCache<'a, S> {
    store: &'a S,
    names: HashMap<UserId, String>,
}

impl<'a, S: DocumentStore> NameCache<'a, S> {
    fn new(store: &'a S) -> Self {
        Self {
            store,
            names: HashMap::new(),
        }
    }

    async fn name(&mut self, user_id: UserId) -> ServerResult<String> {
        if let Some(name) = self.names.get(&user_id) {
            return Ok(name.clone());
        }
        let name = self
            .store
            .get_user(user_id)
            .await?
            .map(|u| u.display_name)
            .unwrap_or_default();
        self.names.insert(user_id, name.clone());
        Ok(name)
    }

    async fn enrich(
        &mut self,
        request: &MentorshipRequest,
    ) -> ServerResult<rpc_protocol::MentorshipRequest> {
        let from = self.name(request.from_user_id).await?;
        let to = self.name(request.to_user_id).await?;
        Ok(entity_to_rpc_request(request, from, to))
    }
}

/// Sends a mentorship request from the caller.
pub async fn send_request<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<SendMentorshipRequest>,
) -> ServerResult<Json<SendMentorshipResponse>> {
    let to_user_id = parse_id(&request.to_user_id, "to_user_id")?;
    if to_user_id == caller.id {
        return Err(ServerError::InvalidRequest(
            "Cannot send a mentorship request to yourself".to_string(),
        ));
    }

    let skill = request.skill.trim();
    if skill.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Skill must not be empty".to_string(),
        ));
    }

    state
        .store
        .get_user(caller.id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;
    state
        .store
        .get_user(to_user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Recipient not found".to_string()))?;

    let message = request
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_request_message(skill));

    let created = state
        .store
        .create_request(MentorshipRequest::new(caller.id, to_user_id, skill, message))
        .await?;

    tracing::info!(
        request_id = %created.id,
        from_user_id = %caller.id,
        to_user_id = %to_user_id,
        "Mentorship request sent"
    );

    let mut names = NameCache::new(&state.store);
    Ok(Json(SendMentorshipResponse {
        request: names.enrich(&created).await?,
    }))
}

/// Lists requests received (default) or sent by the caller.
pub async fn list_requests<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<ListMentorshipRequestsRequest>,
) -> ServerResult<Json<ListMentorshipRequestsResponse>> {
    let mut filter = RequestFilter {
        status: request.status.map(to_entity_request_status),
        ..Default::default()
    };
    match request.direction {
        Direction::Received => filter.to_user_id = Some(caller.id),
        Direction::Sent => filter.from_user_id = Some(caller.id),
    }

    let requests = state.store.list_requests(filter).await?;

    let mut names = NameCache::new(&state.store);
    let mut enriched = Vec::with_capacity(requests.len());
    for r in &requests {
        enriched.push(names.enrich(r).await?);
    }

    Ok(Json(ListMentorshipRequestsResponse { requests: enriched }))
}

/// Accepts a request addressed to the caller.
pub async fn accept_request<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<AcceptMentorshipRequest>,
) -> ServerResult<Json<AcceptMentorshipResponse>> {
    let request_id = parse_id(&request.request_id, "request_id")?;

    let conversation_id = mentorship::accept_request(&state.store, caller.id, request_id).await?;

    Ok(Json(AcceptMentorshipResponse {
        success: true,
        conversation_id: conversation_id.to_string(),
    }))
}

/// Rejects a request addressed to the caller.
pub async fn reject_request<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<RejectMentorshipRequest>,
) -> ServerResult<Json<RejectMentorshipResponse>> {
    let request_id = parse_id(&request.request_id, "request_id")?;

    mentorship::reject_request(&state.store, caller.id, request_id).await?;

    Ok(Json(RejectMentorshipResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_send_and_list_requests() {
        let app = TestApp::new().await;
        let (_, mia) = app.user("mia@example.com", Some("Mia")).await;
        let (max_id, max) = app.user("max@example.com", Some("Max")).await;

        let (status, body) = app
            .post(
                "/api/request/send",
                &mia,
                json!({ "to_user_id": max_id.to_string(), "skill": "React" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["request"]["status"], "pending");
        assert_eq!(
            body["request"]["message"],
            "Hi! I would like to learn React from you."
        );

        let (_, body) = app.post("/api/request/list", &max, json!({})).await;
        let requests = body["requests"].as_array().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["from_user_name"], "Mia");
        assert_eq!(requests[0]["to_user_name"], "Max");

        let (_, body) = app
            .post("/api/request/list", &mia, json!({ "direction": "sent" }))
            .await;
        assert_eq!(body["requests"].as_array().unwrap().len(), 1);

        let (_, body) = app
            .post(
                "/api/request/list",
                &max,
                json!({ "status": "accepted" }),
            )
            .await;
        assert!(body["requests"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_rejects_self_and_unknown_recipients() {
        let app = TestApp::new().await;
        let (mia_id, mia) = app.user("mia@example.com", Some("Mia")).await;

        let (status, _) = app
            .post(
                "/api/request/send",
                &mia,
                json!({ "to_user_id": mia_id.to_string(), "skill": "React" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .post(
                "/api/request/send",
                &mia,
                json!({ "to_user_id": uuid::Uuid::new_v4().to_string(), "skill": "React" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not-found");
    }

    #[tokio::test]
    async fn test_accept_flow_over_http() {
        let app = TestApp::new().await;
        let (mia_id, mia) = app.user("mia@example.com", Some("Mia")).await;
        let (max_id, max) = app.user("max@example.com", Some("Max")).await;

        let (_, body) = app
            .post(
                "/api/request/send",
                &mia,
                json!({ "to_user_id": max_id.to_string(), "skill": "Rust", "message": "please" }),
            )
            .await;
        let request_id = body["request"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .post("/api/request/accept", &mia, json!({ "request_id": request_id }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "permission-denied");

        let (status, body) = app
            .post("/api/request/accept", &max, json!({ "request_id": request_id }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let conversation_id = body["conversation_id"].as_str().unwrap().to_string();

        let (_, body) = app.post("/api/user/connections", &mia, json!({})).await;
        assert_eq!(body["users"][0]["id"], max_id.to_string());

        let (_, body) = app.post("/api/user/connections", &max, json!({})).await;
        assert_eq!(body["users"][0]["id"], mia_id.to_string());

        let (_, body) = app
            .post(
                "/api/conversation/messages",
                &mia,
                json!({ "conversation_id": conversation_id }),
            )
            .await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);

        let (status, _) = app
            .post("/api/request/reject", &max, json!({ "request_id": request_id }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
