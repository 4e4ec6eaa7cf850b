//! Document store trait definitions.

use std::cmp::Reverse;

use async_trait::async_trait;
use entities::{
    Conversation, ConversationId, MentorshipRequest, Message, Rating, RequestStatus, Skill, Task,
    TaskStatus, User, UserId,
};
use uuid::Uuid;

use crate::StoreResult;

/// Filter options for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Only users listing this skill. Empty or `None` matches everyone.
    pub skill: Option<String>,
    /// Only users whose display name starts with this, ignoring case.
    pub name_prefix: Option<String>,
    /// Leave this user out (usually the caller).
    pub exclude: Option<UserId>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

impl UserFilter {
    /// Returns true if `user` passes the filter.
    pub fn matches(&self, user: &User) -> bool {
        if self.exclude == Some(user.id) {
            return false;
        }
        if let Some(skill) = self.skill.as_deref().filter(|s| !s.is_empty()) {
            if !user.has_skill(skill) {
                return false;
            }
        }
        if let Some(prefix) = self.name_prefix.as_deref().filter(|p| !p.is_empty()) {
            if !user
                .display_name
                .to_lowercase()
                .starts_with(&prefix.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Filter options for listing mentorship requests.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// Filter by sender.
    pub from_user_id: Option<UserId>,
    /// Filter by recipient.
    pub to_user_id: Option<UserId>,
    /// Filter by status.
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    /// Returns true if `request` passes the filter.
    pub fn matches(&self, request: &MentorshipRequest) -> bool {
        self.from_user_id.is_none_or(|id| request.from_user_id == id)
            && self.to_user_id.is_none_or(|id| request.to_user_id == id)
            && self.status.is_none_or(|status| request.status == status)
    }
}

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Filter by assignee.
    pub assigned_to: Option<UserId>,
    /// Filter by creator.
    pub assigned_by: Option<UserId>,
    /// Filter by originating conversation.
    pub conversation_id: Option<ConversationId>,
    /// Filter by status.
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Returns true if `task` passes the filter.
    pub fn matches(&self, task: &Task) -> bool {
        self.assigned_to.is_none_or(|id| task.assigned_to == id)
            && self.assigned_by.is_none_or(|id| task.assigned_by == id)
            && self
                .conversation_id
                .as_ref()
                .is_none_or(|id| &task.conversation_id == id)
            && self.status.is_none_or(|status| task.status == status)
    }
}

/// Applies the filter, ordering and pagination shared by every backend.
///
/// Returns the page and the number of matches before pagination.
pub(crate) fn select_users(users: Vec<User>, filter: &UserFilter) -> (Vec<User>, u32) {
    let mut result: Vec<User> = users.into_iter().filter(|u| filter.matches(u)).collect();
    result.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });

    let total = result.len() as u32;

    if let Some(offset) = filter.offset {
        result = result.into_iter().skip(offset as usize).collect();
    }
    if let Some(limit) = filter.limit {
        result = result.into_iter().take(limit as usize).collect();
    }

    (result, total)
}

/// Newest requests first.
pub(crate) fn sort_requests(requests: &mut [MentorshipRequest]) {
    requests.sort_by_key(|r| Reverse(r.created_at));
}

/// Oldest tasks first.
pub(crate) fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.created_at);
}

/// Most recently active conversations first.
pub(crate) fn sort_conversations(conversations: &mut [Conversation]) {
    conversations.sort_by_key(|c| Reverse(c.last_message_at.unwrap_or(c.created_at)));
}

/// A unit of work whose writes are applied all together or not at all.
///
/// Reads observe committed state plus this transaction's own staged writes.
/// Dropping a transaction without calling [`StoreTransaction::commit`]
/// discards every write it made.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Gets a user by ID.
    async fn get_user(&mut self, id: UserId) -> StoreResult<Option<User>>;

    /// Gets a mentorship request by ID.
    async fn get_request(&mut self, id: Uuid) -> StoreResult<Option<MentorshipRequest>>;

    /// Gets a conversation by ID.
    async fn get_conversation(&mut self, id: &ConversationId)
        -> StoreResult<Option<Conversation>>;

    /// Gets a task by ID.
    async fn get_task(&mut self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Gets the rating `rater_id` gave `ratee_id`.
    async fn get_rating(&mut self, ratee_id: UserId, rater_id: UserId)
        -> StoreResult<Option<Rating>>;

    /// Creates or replaces a user.
    async fn put_user(&mut self, user: User) -> StoreResult<()>;

    /// Creates or replaces a mentorship request.
    async fn put_request(&mut self, request: MentorshipRequest) -> StoreResult<()>;

    /// Creates or replaces a conversation.
    async fn put_conversation(&mut self, conversation: Conversation) -> StoreResult<()>;

    /// Appends a message. The conversation must exist or be staged.
    async fn append_message(&mut self, message: Message) -> StoreResult<()>;

    /// Creates or replaces a task.
    async fn put_task(&mut self, task: Task) -> StoreResult<()>;

    /// Creates or replaces a rating.
    async fn put_rating(&mut self, rating: Rating) -> StoreResult<()>;

    /// Applies every staged write atomically.
    async fn commit(&mut self) -> StoreResult<()>;
}

/// Trait for document storage operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Starts a transaction. Transactions on one store run one at a time.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;

    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Lists users with optional filters.
    async fn list_users(&self, filter: UserFilter) -> StoreResult<(Vec<User>, u32)>;

    // =========================================================================
    // Skill operations
    // =========================================================================

    /// Adds a skill to the catalogue. Names are unique ignoring case.
    async fn create_skill(&self, skill: Skill) -> StoreResult<Skill>;

    /// Gets a catalogue entry by name, ignoring case.
    async fn get_skill_by_name(&self, name: &str) -> StoreResult<Option<Skill>>;

    /// Lists the catalogue ordered by name.
    async fn list_skills(&self) -> StoreResult<Vec<Skill>>;

    // =========================================================================
    // Mentorship request operations
    // =========================================================================

    /// Creates a new mentorship request.
    async fn create_request(&self, request: MentorshipRequest)
        -> StoreResult<MentorshipRequest>;

    /// Gets a mentorship request by ID.
    async fn get_request(&self, id: Uuid) -> StoreResult<Option<MentorshipRequest>>;

    /// Lists mentorship requests, newest first.
    async fn list_requests(&self, filter: RequestFilter) -> StoreResult<Vec<MentorshipRequest>>;

    // =========================================================================
    // Conversation operations
    // =========================================================================

    /// Gets a conversation by ID.
    async fn get_conversation(&self, id: &ConversationId) -> StoreResult<Option<Conversation>>;

    /// Lists the conversations a user takes part in, most recent first.
    async fn list_conversations(&self, user_id: UserId) -> StoreResult<Vec<Conversation>>;

    /// Lists the messages of a conversation, oldest first.
    async fn list_messages(&self, conversation_id: &ConversationId) -> StoreResult<Vec<Message>>;

    // =========================================================================
    // Task operations
    // =========================================================================

    /// Creates a new task.
    async fn create_task(&self, task: Task) -> StoreResult<Task>;

    /// Gets a task by ID.
    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Lists tasks, oldest first.
    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>>;

    // =========================================================================
    // Rating operations
    // =========================================================================

    /// Lists the ratings a user has received, most recent first.
    async fn list_ratings(&self, ratee_id: UserId) -> StoreResult<Vec<Rating>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_filter() {
        let mut ada = User::new(Uuid::new_v4(), "ada@example.com").with_display_name("Ada");
        ada.add_skill("Rust");
        let bob = User::new(Uuid::new_v4(), "bob@example.com").with_display_name("Bob");

        let filter = UserFilter {
            skill: Some("Rust".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&ada));
        assert!(!filter.matches(&bob));

        let filter = UserFilter {
            skill: Some(String::new()),
            name_prefix: Some("b".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&ada));
        assert!(filter.matches(&bob));

        let filter = UserFilter {
            exclude: Some(bob.id),
            ..Default::default()
        };
        assert!(!filter.matches(&bob));
    }

    #[test]
    fn test_select_users_paginates_after_counting() {
        let users: Vec<User> = ["Cy", "ada", "Bob"]
            .into_iter()
            .map(|name| User::new(Uuid::new_v4(), "x@example.com").with_display_name(name))
            .collect();

        let filter = UserFilter {
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        };
        let (page, total) = select_users(users, &filter);

        assert_eq!(total, 3);
        let names: Vec<_> = page.iter().map(|u| u.display_name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Cy"]);
    }

    #[test]
    fn test_request_filter() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let request = MentorshipRequest::new(a, b, "Rust", "");

        let sent = RequestFilter {
            from_user_id: Some(a),
            ..Default::default()
        };
        let received = RequestFilter {
            to_user_id: Some(a),
            ..Default::default()
        };
        assert!(sent.matches(&request));
        assert!(!received.matches(&request));
    }
}
