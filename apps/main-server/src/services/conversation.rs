//! Conversation helpers shared by acceptance, direct messages and tasks.

use doc_store::{DocumentStore, StoreResult, StoreTransaction};
use entities::{Conversation, ConversationId, Message, UserId};

use crate::error::{ServerError, ServerResult};

/// Returns the conversation between `a` and `b`, staging a new one if the
/// pair has none yet.
pub async fn open_conversation(
    tx: &mut dyn StoreTransaction,
    a: UserId,
    b: UserId,
) -> StoreResult<Conversation> {
    let id = ConversationId::for_pair(a, b);
    if let Some(existing) = tx.get_conversation(&id).await? {
        return Ok(existing);
    }

    let conversation = Conversation::between(a, b);
    tx.put_conversation(conversation.clone()).await?;
    Ok(conversation)
}

/// Appends a message and refreshes the conversation's last-message cache.
pub async fn post_message(
    tx: &mut dyn StoreTransaction,
    conversation: &mut Conversation,
    sender_id: UserId,
    text: impl Into<String>,
) -> StoreResult<Message> {
    let message = Message::new(conversation.id.clone(), sender_id, text);
    conversation.record(&message);
    tx.put_conversation(conversation.clone()).await?;
    tx.append_message(message.clone()).await?;
    Ok(message)
}

/// Opens (or reuses) the conversation between the caller and another user
/// and lists it on both profiles.
pub async fn start_conversation<S: DocumentStore>(
    store: &S,
    caller: UserId,
    other: UserId,
) -> ServerResult<Conversation> {
    if caller == other {
        return Err(ServerError::InvalidRequest(
            "Cannot start a conversation with yourself".to_string(),
        ));
    }

    let mut tx = store.begin().await?;

    let mut me = tx
        .get_user(caller)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;
    let mut them = tx
        .get_user(other)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    let conversation = open_conversation(tx.as_mut(), caller, other).await?;

    if me.join_conversation(conversation.id.clone()) {
        tx.put_user(me).await?;
    }
    if them.join_conversation(conversation.id.clone()) {
        tx.put_user(them).await?;
    }

    tx.commit().await?;

    Ok(conversation)
}

/// Sends a chat message from a participant.
pub async fn send_message<S: DocumentStore>(
    store: &S,
    caller: UserId,
    conversation_id: &ConversationId,
    text: &str,
) -> ServerResult<Message> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Message text must not be empty".to_string(),
        ));
    }

    let mut tx = store.begin().await?;

    let mut conversation = tx
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Conversation not found".to_string()))?;
    if !conversation.has_participant(caller) {
        return Err(ServerError::PermissionDenied(
            "Not a participant of this conversation".to_string(),
        ));
    }

    let message = post_message(tx.as_mut(), &mut conversation, caller, text).await?;
    tx.commit().await?;

    Ok(message)
}
