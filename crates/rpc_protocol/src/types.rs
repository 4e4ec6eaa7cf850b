//! RPC type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mentorship request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

/// Which side of a relationship the caller is on when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Documents addressed to the caller.
    #[default]
    Received,
    /// Documents created by the caller.
    Sent,
}

/// Running rating totals of a user.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    pub total: u32,
    pub count: u32,
    pub average: f64,
}

/// Public user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub title: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub location: String,
    pub availability: String,
    pub rating: RatingSummary,
    pub connections: Vec<String>,
    pub conversations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Skill catalogue entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Mentorship request, with both parties' display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorshipRequest {
    pub id: String,
    pub from_user_id: String,
    pub from_user_name: String,
    pub to_user_id: String,
    pub to_user_name: String,
    pub skill: String,
    pub message: String,
    pub status: RequestStatus,
    pub conversation_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A conversation as seen by one participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub participants: Vec<String>,
    pub other_user_id: String,
    pub other_user_name: String,
    pub other_user_photo_url: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Task assigned inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub assigned_by: String,
    pub assigned_to: String,
    pub name: String,
    pub description: String,
    pub conversation_id: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rating left by one user for another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub ratee_id: String,
    pub rater_id: String,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
