//! In-memory document store implementation.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use entities::{
    Conversation, ConversationId, MentorshipRequest, Message, Rating, Skill, Task, User, UserId,
};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use uuid::Uuid;

use crate::{
    select_users, sort_conversations, sort_requests, sort_tasks, DocumentStore, RequestFilter,
    StoreError, StoreResult, StoreTransaction, TaskFilter, UserFilter,
};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserId, User>,
    skills: HashMap<Uuid, Skill>,
    requests: HashMap<Uuid, MentorshipRequest>,
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
    tasks: HashMap<Uuid, Task>,
    ratings: HashMap<(UserId, UserId), Rating>,
}

/// In-memory document store for tests and development.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Creates a new in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Writes staged by a [`MemoryTransaction`] until commit.
#[derive(Debug, Default)]
struct Staged {
    users: HashMap<UserId, User>,
    requests: HashMap<Uuid, MentorshipRequest>,
    conversations: HashMap<ConversationId, Conversation>,
    messages: Vec<Message>,
    tasks: HashMap<Uuid, Task>,
    ratings: HashMap<(UserId, UserId), Rating>,
}

/// Transaction over a [`MemoryStore`].
///
/// Holds the store's write lock for its whole lifetime, so transactions and
/// plain writes are serialized.
pub struct MemoryTransaction {
    guard: OwnedRwLockWriteGuard<Collections>,
    staged: Staged,
    finished: bool,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> StoreResult<()> {
        if self.finished {
            return Err(StoreError::TransactionFinished);
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get_user(&mut self, id: UserId) -> StoreResult<Option<User>> {
        self.ensure_open()?;
        Ok(self
            .staged
            .users
            .get(&id)
            .or_else(|| self.guard.users.get(&id))
            .cloned())
    }

    async fn get_request(&mut self, id: Uuid) -> StoreResult<Option<MentorshipRequest>> {
        self.ensure_open()?;
        Ok(self
            .staged
            .requests
            .get(&id)
            .or_else(|| self.guard.requests.get(&id))
            .cloned())
    }

    async fn get_conversation(
        &mut self,
        id: &ConversationId,
    ) -> StoreResult<Option<Conversation>> {
        self.ensure_open()?;
        Ok(self
            .staged
            .conversations
            .get(id)
            .or_else(|| self.guard.conversations.get(id))
            .cloned())
    }

    async fn get_task(&mut self, id: Uuid) -> StoreResult<Option<Task>> {
        self.ensure_open()?;
        Ok(self
            .staged
            .tasks
            .get(&id)
            .or_else(|| self.guard.tasks.get(&id))
            .cloned())
    }

    async fn get_rating(
        &mut self,
        ratee_id: UserId,
        rater_id: UserId,
    ) -> StoreResult<Option<Rating>> {
        self.ensure_open()?;
        let key = (ratee_id, rater_id);
        Ok(self
            .staged
            .ratings
            .get(&key)
            .or_else(|| self.guard.ratings.get(&key))
            .cloned())
    }

    async fn put_user(&mut self, user: User) -> StoreResult<()> {
        self.ensure_open()?;
        self.staged.users.insert(user.id, user);
        Ok(())
    }

    async fn put_request(&mut self, request: MentorshipRequest) -> StoreResult<()> {
        self.ensure_open()?;
        self.staged.requests.insert(request.id, request);
        Ok(())
    }

    async fn put_conversation(&mut self, conversation: Conversation) -> StoreResult<()> {
        self.ensure_open()?;
        self.staged
            .conversations
            .insert(conversation.id.clone(), conversation);
        Ok(())
    }

    async fn append_message(&mut self, message: Message) -> StoreResult<()> {
        self.ensure_open()?;
        let id = &message.conversation_id;
        if !self.staged.conversations.contains_key(id) && !self.guard.conversations.contains_key(id)
        {
            return Err(StoreError::not_found("Conversation", id.to_string()));
        }
        self.staged.messages.push(message);
        Ok(())
    }

    async fn put_task(&mut self, task: Task) -> StoreResult<()> {
        self.ensure_open()?;
        self.staged.tasks.insert(task.id, task);
        Ok(())
    }

    async fn put_rating(&mut self, rating: Rating) -> StoreResult<()> {
        self.ensure_open()?;
        self.staged
            .ratings
            .insert((rating.ratee_id, rating.rater_id), rating);
        Ok(())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        self.finished = true;

        let staged = std::mem::take(&mut self.staged);
        let collections = &mut *self.guard;
        collections.users.extend(staged.users);
        collections.requests.extend(staged.requests);
        collections.conversations.extend(staged.conversations);
        collections.tasks.extend(staged.tasks);
        collections.ratings.extend(staged.ratings);
        for message in staged.messages {
            collections
                .messages
                .entry(message.conversation_id.clone())
                .or_default()
                .push(message);
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let guard = self.collections.clone().write_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            staged: Staged::default(),
            finished: false,
        }))
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut collections = self.collections.write().await;
        if collections.users.contains_key(&user.id) {
            return Err(StoreError::already_exists("User", user.id.to_string()));
        }
        collections.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let collections = self.collections.read().await;
        Ok(collections.users.get(&id).cloned())
    }

    async fn list_users(&self, filter: UserFilter) -> StoreResult<(Vec<User>, u32)> {
        let collections = self.collections.read().await;
        let users = collections.users.values().cloned().collect();
        Ok(select_users(users, &filter))
    }

    // =========================================================================
    // Skill operations
    // =========================================================================

    async fn create_skill(&self, skill: Skill) -> StoreResult<Skill> {
        let mut collections = self.collections.write().await;
        let duplicate = collections
            .skills
            .values()
            .any(|s| s.id == skill.id || s.name.eq_ignore_ascii_case(&skill.name));
        if duplicate {
            return Err(StoreError::already_exists("Skill", skill.name));
        }
        collections.skills.insert(skill.id, skill.clone());
        Ok(skill)
    }

    async fn get_skill_by_name(&self, name: &str) -> StoreResult<Option<Skill>> {
        let collections = self.collections.read().await;
        Ok(collections
            .skills
            .values()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        let collections = self.collections.read().await;
        let mut skills: Vec<Skill> = collections.skills.values().cloned().collect();
        skills.sort_by_key(|s| s.name.to_lowercase());
        Ok(skills)
    }

    // =========================================================================
    // Mentorship request operations
    // =========================================================================

    async fn create_request(&self, request: MentorshipRequest) -> StoreResult<MentorshipRequest> {
        let mut collections = self.collections.write().await;
        if collections.requests.contains_key(&request.id) {
            return Err(StoreError::already_exists(
                "MentorshipRequest",
                request.id.to_string(),
            ));
        }
        collections.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get_request(&self, id: Uuid) -> StoreResult<Option<MentorshipRequest>> {
        let collections = self.collections.read().await;
        Ok(collections.requests.get(&id).cloned())
    }

    async fn list_requests(&self, filter: RequestFilter) -> StoreResult<Vec<MentorshipRequest>> {
        let collections = self.collections.read().await;
        let mut result: Vec<MentorshipRequest> = collections
            .requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        sort_requests(&mut result);
        Ok(result)
    }

    // =========================================================================
    // Conversation operations
    // =========================================================================

    async fn get_conversation(&self, id: &ConversationId) -> StoreResult<Option<Conversation>> {
        let collections = self.collections.read().await;
        Ok(collections.conversations.get(id).cloned())
    }

    async fn list_conversations(&self, user_id: UserId) -> StoreResult<Vec<Conversation>> {
        let collections = self.collections.read().await;
        let mut result: Vec<Conversation> = collections
            .conversations
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();
        sort_conversations(&mut result);
        Ok(result)
    }

    async fn list_messages(&self, conversation_id: &ConversationId) -> StoreResult<Vec<Message>> {
        let collections = self.collections.read().await;
        let mut result = collections
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps.
        result.sort_by_key(|m| m.sent_at);
        Ok(result)
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: Task) -> StoreResult<Task> {
        let mut collections = self.collections.write().await;
        if collections.tasks.contains_key(&task.id) {
            return Err(StoreError::already_exists("Task", task.id.to_string()));
        }
        collections.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let collections = self.collections.read().await;
        Ok(collections.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let collections = self.collections.read().await;
        let mut result: Vec<Task> = collections
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_tasks(&mut result);
        Ok(result)
    }

    // =========================================================================
    // Rating operations
    // =========================================================================

    async fn list_ratings(&self, ratee_id: UserId) -> StoreResult<Vec<Rating>> {
        let collections = self.collections.read().await;
        let mut result: Vec<Rating> = collections
            .ratings
            .values()
            .filter(|r| r.ratee_id == ratee_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| std::cmp::Reverse(r.updated_at));
        Ok(result)
    }
}
