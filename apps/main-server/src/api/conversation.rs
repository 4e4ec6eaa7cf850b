//! Conversation and chat API endpoints.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use doc_store::DocumentStore;
use entities::ConversationId;
use rpc_protocol::{requests::*, responses::*};

use super::convert::{entity_to_rpc_conversation, entity_to_rpc_message};
use crate::error::{ServerError, ServerResult, parse_id};
use crate::middleware::AuthenticatedUser;
use crate::services::conversation;
use crate::state::AppState;

pub(crate) fn parse_conversation_id(value: &str) -> ServerResult<ConversationId> {
    value
        .parse()
        .map_err(|_| ServerError::InvalidRequest("Invalid conversation_id".to_string()))
}

/// Opens a direct conversation with another user.
pub async fn start_conversation<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<StartConversationRequest>,
) -> ServerResult<Json<StartConversationResponse>> {
    let other_id = parse_id(&request.other_user_id, "other_user_id")?;

    let started = conversation::start_conversation(&state.store, caller.id, other_id).await?;
    let other = state.store.get_user(other_id).await?;

    tracing::info!(conversation_id = %started.id, user_id = %caller.id, "Conversation started");

    Ok(Json(StartConversationResponse {
        conversation: entity_to_rpc_conversation(&started, caller.id, other.as_ref()),
    }))
}

/// Lists the caller's conversations, most recently active first.
pub async fn list_conversations<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ServerResult<Json<ListConversationsResponse>> {
    let conversations = state.store.list_conversations(caller.id).await?;

    let mut summaries = Vec::with_capacity(conversations.len());
    for c in &conversations {
        let other = match c.other_participant(caller.id) {
            Some(id) => state.store.get_user(id).await?,
            None => None,
        };
        summaries.push(entity_to_rpc_conversation(c, caller.id, other.as_ref()));
    }

    Ok(Json(ListConversationsResponse {
        conversations: summaries,
    }))
}

/// Lists a conversation's messages, oldest first.
pub async fn list_messages<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<ListMessagesRequest>,
) -> ServerResult<Json<ListMessagesResponse>> {
    let conversation_id = parse_conversation_id(&request.conversation_id)?;

    let found = state
        .store
        .get_conversation(&conversation_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Conversation not found".to_string()))?;
    if !found.has_participant(caller.id) {
        return Err(ServerError::PermissionDenied(
            "Not a participant of this conversation".to_string(),
        ));
    }

    let messages = state.store.list_messages(&conversation_id).await?;

    Ok(Json(ListMessagesResponse {
        messages: messages.iter().map(entity_to_rpc_message).collect(),
    }))
}

/// Sends a message into a conversation.
pub async fn send_message<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<SendMessageRequest>,
) -> ServerResult<Json<SendMessageResponse>> {
    let conversation_id = parse_conversation_id(&request.conversation_id)?;

    let message =
        conversation::send_message(&state.store, caller.id, &conversation_id, &request.text)
            .await?;

    tracing::debug!(conversation_id = %conversation_id, message_id = %message.id, "Message sent");

    Ok(Json(SendMessageResponse {
        message: entity_to_rpc_message(&message),
    }))
}
