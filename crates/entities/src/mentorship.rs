//! Mentorship request definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ConversationId, UserId};

/// Status of a mentorship request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting the recipient's decision.
    #[default]
    Pending,
    /// Accepted; a conversation links both users.
    Accepted,
    /// Rejected by the recipient.
    Rejected,
}

/// An invitation from one user to learn a skill from another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorshipRequest {
    /// Unique identifier.
    pub id: Uuid,
    /// The prospective mentee.
    pub from_user_id: UserId,
    /// The prospective mentor.
    pub to_user_id: UserId,
    /// Requested skill.
    pub skill: String,
    /// Note from the sender.
    pub message: String,
    /// Current status.
    pub status: RequestStatus,
    /// Conversation opened on acceptance.
    pub conversation_id: Option<ConversationId>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl MentorshipRequest {
    /// Creates a pending request.
    pub fn new(
        from_user_id: UserId,
        to_user_id: UserId,
        skill: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            from_user_id,
            to_user_id,
            skill: skill.into(),
            message: message.into(),
            status: RequestStatus::Pending,
            conversation_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Message sent by the mentor when accepting.
    pub fn welcome_message(&self) -> String {
        format!(
            "Hi! I've accepted your mentorship request for {}. I'm happy to help.",
            self.skill
        )
    }
}

/// Message used when the sender leaves the note empty.
pub fn default_request_message(skill: &str) -> String {
    format!("Hi! I would like to learn {skill} from you.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let request = MentorshipRequest::new(from, to, "Rust", "please");

        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.conversation_id.is_none());
        assert!(request.welcome_message().contains("Rust"));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&RequestStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
    }
}
