//! Conversions between stored documents and wire types.

use entities::{
    Conversation, MentorshipRequest, Message, Rating, RatingSummary,
    RequestStatus as EntityRequestStatus, Skill, Task, TaskStatus as EntityTaskStatus, User,
    UserId,
};
use rpc_protocol::{RequestStatus, TaskStatus};

/// Converts RPC RequestStatus to entity RequestStatus.
pub fn to_entity_request_status(status: RequestStatus) -> EntityRequestStatus {
    match status {
        RequestStatus::Pending => EntityRequestStatus::Pending,
        RequestStatus::Accepted => EntityRequestStatus::Accepted,
        RequestStatus::Rejected => EntityRequestStatus::Rejected,
    }
}

/// Converts entity RequestStatus to RPC RequestStatus.
pub fn to_rpc_request_status(status: EntityRequestStatus) -> RequestStatus {
    match status {
        EntityRequestStatus::Pending => RequestStatus::Pending,
        EntityRequestStatus::Accepted => RequestStatus::Accepted,
        EntityRequestStatus::Rejected => RequestStatus::Rejected,
    }
}

/// Converts RPC TaskStatus to entity TaskStatus.
pub fn to_entity_task_status(status: TaskStatus) -> EntityTaskStatus {
    match status {
        TaskStatus::Pending => EntityTaskStatus::Pending,
        TaskStatus::Completed => EntityTaskStatus::Completed,
    }
}

/// Converts entity TaskStatus to RPC TaskStatus.
pub fn to_rpc_task_status(status: EntityTaskStatus) -> TaskStatus {
    match status {
        EntityTaskStatus::Pending => TaskStatus::Pending,
        EntityTaskStatus::Completed => TaskStatus::Completed,
    }
}

pub fn to_rpc_rating_summary(summary: RatingSummary) -> rpc_protocol::RatingSummary {
    rpc_protocol::RatingSummary {
        total: summary.total,
        count: summary.count,
        average: summary.average,
    }
}

/// Converts entity User to RPC UserProfile.
pub fn entity_to_rpc_user(user: &User) -> rpc_protocol::UserProfile {
    rpc_protocol::UserProfile {
        id: user.id.to_string(),
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        photo_url: user.photo_url.clone(),
        title: user.title.clone(),
        bio: user.bio.clone(),
        skills: user.skills.clone(),
        location: user.location.clone(),
        availability: user.availability.clone(),
        rating: to_rpc_rating_summary(user.rating),
        connections: user.connections.iter().map(|id| id.to_string()).collect(),
        conversations: user.conversations.iter().map(|id| id.to_string()).collect(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub fn entity_to_rpc_skill(skill: &Skill) -> rpc_protocol::Skill {
    rpc_protocol::Skill {
        id: skill.id.to_string(),
        name: skill.name.clone(),
        description: skill.description.clone(),
        created_at: skill.created_at,
    }
}

/// Converts entity MentorshipRequest to RPC MentorshipRequest.
///
/// Names are looked up by the caller; missing users show as empty names.
pub fn entity_to_rpc_request(
    request: &MentorshipRequest,
    from_user_name: String,
    to_user_name: String,
) -> rpc_protocol::MentorshipRequest {
    rpc_protocol::MentorshipRequest {
        id: request.id.to_string(),
        from_user_id: request.from_user_id.to_string(),
        from_user_name,
        to_user_id: request.to_user_id.to_string(),
        to_user_name,
        skill: request.skill.clone(),
        message: request.message.clone(),
        status: to_rpc_request_status(request.status),
        conversation_id: request.conversation_id.as_ref().map(|id| id.to_string()),
        created_at: request.created_at,
        updated_at: request.updated_at,
    }
}

/// Converts entity Conversation to RPC ConversationSummary as seen by
/// `viewer`, given the other participant's profile when it exists.
pub fn entity_to_rpc_conversation(
    conversation: &Conversation,
    viewer: UserId,
    other: Option<&User>,
) -> rpc_protocol::ConversationSummary {
    let other_user_id = conversation
        .other_participant(viewer)
        .map(|id| id.to_string())
        .unwrap_or_default();

    rpc_protocol::ConversationSummary {
        id: conversation.id.to_string(),
        participants: conversation
            .participants
            .iter()
            .map(|id| id.to_string())
            .collect(),
        other_user_id,
        other_user_name: other.map(|u| u.display_name.clone()).unwrap_or_default(),
        other_user_photo_url: other.and_then(|u| u.photo_url.clone()),
        last_message: conversation.last_message.clone(),
        last_message_at: conversation.last_message_at,
        created_at: conversation.created_at,
    }
}

pub fn entity_to_rpc_message(message: &Message) -> rpc_protocol::Message {
    rpc_protocol::Message {
        id: message.id.to_string(),
        conversation_id: message.conversation_id.to_string(),
        sender_id: message.sender_id.to_string(),
        text: message.text.clone(),
        sent_at: message.sent_at,
    }
}

/// Converts entity Task to RPC Task.
pub fn entity_to_rpc_task(task: &Task) -> rpc_protocol::Task {
    rpc_protocol::Task {
        id: task.id.to_string(),
        assigned_by: task.assigned_by.to_string(),
        assigned_to: task.assigned_to.to_string(),
        name: task.name.clone(),
        description: task.description.clone(),
        conversation_id: task.conversation_id.to_string(),
        status: to_rpc_task_status(task.status),
        created_at: task.created_at,
        updated_at: task.updated_at,
    }
}

pub fn entity_to_rpc_rating(rating: &Rating) -> rpc_protocol::Rating {
    rpc_protocol::Rating {
        ratee_id: rating.ratee_id.to_string(),
        rater_id: rating.rater_id.to_string(),
        score: rating.score,
        comment: rating.comment.clone(),
        created_at: rating.created_at,
        updated_at: rating.updated_at,
    }
}
