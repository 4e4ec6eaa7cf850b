//! RPC request types.

use serde::{Deserialize, Serialize};

use crate::types::*;

// ============================================================================
// User Service Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserRequest {
    pub user_id: String,
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSkillRequest {
    pub skill: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSkillRequest {
    pub skill: String,
}

/// Photo bytes, base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPhotoRequest {
    pub file_name: String,
    pub content_base64: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchUsersRequest {
    /// Skill to match exactly; empty or absent means everyone.
    #[serde(default)]
    pub skill: Option<String>,
    /// Case-insensitive display name prefix.
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub exclude_self: bool,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

// ============================================================================
// Skill Service Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// ============================================================================
// Mentorship Request Service Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMentorshipRequest {
    pub to_user_id: String,
    pub skill: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMentorshipRequestsRequest {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptMentorshipRequest {
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectMentorshipRequest {
    pub request_id: String,
}

// ============================================================================
// Conversation Service Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationRequest {
    pub other_user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMessagesRequest {
    pub conversation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub conversation_id: String,
    pub text: String,
}

// ============================================================================
// Task Service Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub conversation_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTasksRequest {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskStatusRequest {
    pub task_id: String,
    pub status: TaskStatus,
}

// ============================================================================
// Rating Service Requests
// ============================================================================

/// Score travels as a plain integer so that out-of-range values reach
/// validation instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRatingRequest {
    pub ratee_id: String,
    pub rater_id: String,
    pub score: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRatingsRequest {
    pub user_id: String,
}
