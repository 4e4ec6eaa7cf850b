//! RPC response types.

use serde::{Deserialize, Serialize};

use crate::types::*;

// ============================================================================
// Auth Service Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: UserProfile,
    /// True when this sign-in created the user document.
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// User Service Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPhotoResponse {
    pub photo_url: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    pub users: Vec<UserProfile>,
    pub total_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConnectionsResponse {
    pub users: Vec<UserProfile>,
}

// ============================================================================
// Skill Service Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSkillsResponse {
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSkillResponse {
    pub skill: Skill,
}

// ============================================================================
// Mentorship Request Service Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMentorshipResponse {
    pub request: MentorshipRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMentorshipRequestsResponse {
    pub requests: Vec<MentorshipRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptMentorshipResponse {
    pub success: bool,
    pub conversation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectMentorshipResponse {
    pub success: bool,
}

// ============================================================================
// Conversation Service Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationResponse {
    pub conversation: ConversationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message: Message,
}

// ============================================================================
// Task Service Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub task: Task,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskStatusResponse {
    pub task: Task,
}

// ============================================================================
// Rating Service Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRatingResponse {
    pub success: bool,
    pub rating: RatingSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRatingsResponse {
    pub ratings: Vec<Rating>,
    pub summary: RatingSummary,
}
