//! Mentorship request decisions.
//!
//! Accepting a request touches five documents (the request, the
//! conversation, its first message and both users), so the whole decision
//! runs inside one store transaction. Any early return drops the
//! transaction and discards what was staged.

use doc_store::DocumentStore;
use entities::{ConversationId, RequestStatus, UserId};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::services::conversation::{open_conversation, post_message};

/// Accepts a pending request on behalf of its recipient.
///
/// Returns the id of the conversation linking mentor and mentee. Accepting
/// an already accepted request returns the same id and writes nothing.
pub async fn accept_request<S: DocumentStore>(
    store: &S,
    caller: UserId,
    request_id: Uuid,
) -> ServerResult<ConversationId> {
    let mut tx = store.begin().await?;

    let mut request = tx
        .get_request(request_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Mentorship request not found".to_string()))?;

    if request.to_user_id != caller {
        tracing::warn!(
            request_id = %request_id,
            caller = %caller,
            "Accept attempted by non-recipient"
        );
        return Err(ServerError::PermissionDenied(
            "Only the recipient can accept this request".to_string(),
        ));
    }

    let mut mentor = tx
        .get_user(request.to_user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Mentor not found".to_string()))?;
    let mut mentee = tx
        .get_user(request.from_user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Mentee not found".to_string()))?;

    match request.status {
        RequestStatus::Accepted => {
            let conversation_id = request
                .conversation_id
                .clone()
                .unwrap_or_else(|| ConversationId::for_pair(mentor.id, mentee.id));
            return Ok(conversation_id);
        }
        RequestStatus::Rejected => {
            return Err(ServerError::InvalidRequest(
                "Request has already been rejected".to_string(),
            ));
        }
        RequestStatus::Pending => {}
    }

    let mut conversation = open_conversation(tx.as_mut(), mentor.id, mentee.id).await?;
    let welcome = request.welcome_message();
    post_message(tx.as_mut(), &mut conversation, mentor.id, welcome).await?;

    request.status = RequestStatus::Accepted;
    request.conversation_id = Some(conversation.id.clone());
    request.updated_at = chrono::Utc::now();
    tx.put_request(request).await?;

    mentor.join_conversation(conversation.id.clone());
    mentor.connect(mentee.id);
    mentee.join_conversation(conversation.id.clone());
    mentee.connect(mentor.id);
    tx.put_user(mentor).await?;
    tx.put_user(mentee).await?;

    tx.commit().await?;

    tracing::info!(
        request_id = %request_id,
        conversation_id = %conversation.id,
        "Mentorship request accepted"
    );

    Ok(conversation.id)
}

/// Rejects a pending request on behalf of its recipient.
///
/// Rejecting twice is a no-op; rejecting an accepted request is refused.
pub async fn reject_request<S: DocumentStore>(
    store: &S,
    caller: UserId,
    request_id: Uuid,
) -> ServerResult<()> {
    let mut tx = store.begin().await?;

    let mut request = tx
        .get_request(request_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Mentorship request not found".to_string()))?;

    if request.to_user_id != caller {
        tracing::warn!(
            request_id = %request_id,
            caller = %caller,
            "Reject attempted by non-recipient"
        );
        return Err(ServerError::PermissionDenied(
            "Only the recipient can reject this request".to_string(),
        ));
    }

    match request.status {
        RequestStatus::Rejected => return Ok(()),
        RequestStatus::Accepted => {
            return Err(ServerError::InvalidRequest(
                "Request has already been accepted".to_string(),
            ));
        }
        RequestStatus::Pending => {}
    }

    request.status = RequestStatus::Rejected;
    request.updated_at = chrono::Utc::now();
    tx.put_request(request).await?;
    tx.commit().await?;

    tracing::info!(request_id = %request_id, "Mentorship request rejected");

    Ok(())
}
