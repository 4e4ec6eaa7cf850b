//! SQLite document store implementation.
//!
//! Every document is kept as a JSON body next to the few columns the store
//! needs for lookups and ordering.

use async_trait::async_trait;
use chrono::SecondsFormat;
use entities::{
    Conversation, ConversationId, MentorshipRequest, Message, Rating, Skill, Task, User, UserId,
};
use serde::de::DeserializeOwned;
use sqlx::{
    sqlite::{SqliteConnection, SqlitePoolOptions},
    Executor, Pool, Sqlite, Transaction,
};
use uuid::Uuid;

use crate::{
    select_users, sort_conversations, sort_requests, sort_tasks, DocumentStore, RequestFilter,
    StoreError, StoreResult, StoreTransaction, TaskFilter, UserFilter,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        body TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS skills (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE COLLATE NOCASE,
        body TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS mentorship_requests (
        id TEXT PRIMARY KEY,
        from_user_id TEXT NOT NULL,
        to_user_id TEXT NOT NULL,
        body TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_requests_from ON mentorship_requests (from_user_id)",
    "CREATE INDEX IF NOT EXISTS idx_requests_to ON mentorship_requests (to_user_id)",
    "CREATE TABLE IF NOT EXISTS conversations (
        id TEXT PRIMARY KEY,
        user_a TEXT NOT NULL,
        user_b TEXT NOT NULL,
        body TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        conversation_id TEXT NOT NULL REFERENCES conversations (id),
        sent_at TEXT NOT NULL,
        body TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages (conversation_id, sent_at)",
    "CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        assigned_to TEXT NOT NULL,
        assigned_by TEXT NOT NULL,
        body TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS ratings (
        ratee_id TEXT NOT NULL,
        rater_id TEXT NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (ratee_id, rater_id)
    )",
];

/// SQLite-backed document store.
///
/// The pool holds a single connection, so a transaction owns the database
/// until it commits or is dropped.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connects to `database_url` and creates the schema if needed.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;

        tracing::info!(database_url, "SQLite document store ready");

        Ok(store)
    }

    /// Opens a private in-memory database.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> StoreResult<T> {
    Ok(serde_json::from_str(body)?)
}

fn decode_all<T: DeserializeOwned>(bodies: Vec<String>) -> StoreResult<Vec<T>> {
    bodies.iter().map(|body| decode(body)).collect()
}

/// Maps a unique constraint violation to [`StoreError::AlreadyExists`].
fn map_insert_error(
    entity_type: &'static str,
    id: String,
) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::already_exists(entity_type, id)
        }
        _ => StoreError::Database(e),
    }
}

fn timestamp(dt: chrono::DateTime<chrono::Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

async fn fetch_body<'e, E, T>(executor: E, sql: &'static str, key: String) -> StoreResult<Option<T>>
where
    E: Executor<'e, Database = Sqlite> + 'e,
    T: DeserializeOwned,
{
    let body: Option<String> = sqlx::query_scalar(sql)
        .bind(key)
        .fetch_optional(executor)
        .await?;
    body.as_deref().map(decode).transpose()
}

async fn fetch_rating<'e, E>(
    executor: E,
    ratee_id: UserId,
    rater_id: UserId,
) -> StoreResult<Option<Rating>>
where
    E: Executor<'e, Database = Sqlite> + 'e,
{
    let body: Option<String> =
        sqlx::query_scalar("SELECT body FROM ratings WHERE ratee_id = ? AND rater_id = ?")
            .bind(ratee_id.to_string())
            .bind(rater_id.to_string())
            .fetch_optional(executor)
            .await?;
    body.as_deref().map(decode).transpose()
}

/// Transaction over a [`SqliteStore`]. Rolled back when dropped uncommitted.
pub struct SqliteTransaction {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteTransaction {
    fn conn(&mut self) -> StoreResult<&mut SqliteConnection> {
        self.tx
            .as_deref_mut()
            .ok_or(StoreError::TransactionFinished)
    }
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    async fn get_user(&mut self, id: UserId) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        fetch_body(conn, "SELECT body FROM users WHERE id = ?", id.to_string()).await
    }

    async fn get_request(&mut self, id: Uuid) -> StoreResult<Option<MentorshipRequest>> {
        let conn = self.conn()?;
        fetch_body(
            conn,
            "SELECT body FROM mentorship_requests WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn get_conversation(
        &mut self,
        id: &ConversationId,
    ) -> StoreResult<Option<Conversation>> {
        let conn = self.conn()?;
        fetch_body(conn, "SELECT body FROM conversations WHERE id = ?", id.to_string()).await
    }

    async fn get_task(&mut self, id: Uuid) -> StoreResult<Option<Task>> {
        let conn = self.conn()?;
        fetch_body(conn, "SELECT body FROM tasks WHERE id = ?", id.to_string()).await
    }

    async fn get_rating(
        &mut self,
        ratee_id: UserId,
        rater_id: UserId,
    ) -> StoreResult<Option<Rating>> {
        let conn = self.conn()?;
        fetch_rating(conn, ratee_id, rater_id).await
    }

    async fn put_user(&mut self, user: User) -> StoreResult<()> {
        let body = serde_json::to_string(&user)?;
        let conn = self.conn()?;
        sqlx::query(
            "INSERT INTO users (id, body) VALUES (?, ?)
             ON CONFLICT (id) DO UPDATE SET body = excluded.body",
        )
        .bind(user.id.to_string())
        .bind(body)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn put_request(&mut self, request: MentorshipRequest) -> StoreResult<()> {
        let body = serde_json::to_string(&request)?;
        let conn = self.conn()?;
        sqlx::query(
            "INSERT INTO mentorship_requests (id, from_user_id, to_user_id, body)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET body = excluded.body",
        )
        .bind(request.id.to_string())
        .bind(request.from_user_id.to_string())
        .bind(request.to_user_id.to_string())
        .bind(body)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn put_conversation(&mut self, conversation: Conversation) -> StoreResult<()> {
        let body = serde_json::to_string(&conversation)?;
        let [user_a, user_b] = conversation.participants;
        let conn = self.conn()?;
        sqlx::query(
            "INSERT INTO conversations (id, user_a, user_b, body) VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET body = excluded.body",
        )
        .bind(conversation.id.to_string())
        .bind(user_a.to_string())
        .bind(user_b.to_string())
        .bind(body)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn append_message(&mut self, message: Message) -> StoreResult<()> {
        let body = serde_json::to_string(&message)?;
        let conversation_id = message.conversation_id.to_string();
        let conn = self.conn()?;

        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM conversations WHERE id = ?")
                .bind(conversation_id.clone())
                .fetch_optional(&mut *conn)
                .await?;
        if exists.is_none() {
            return Err(StoreError::not_found("Conversation", conversation_id));
        }

        sqlx::query(
            "INSERT INTO messages (id, conversation_id, sent_at, body) VALUES (?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(conversation_id)
        .bind(timestamp(message.sent_at))
        .bind(body)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn put_task(&mut self, task: Task) -> StoreResult<()> {
        let body = serde_json::to_string(&task)?;
        let conn = self.conn()?;
        sqlx::query(
            "INSERT INTO tasks (id, assigned_to, assigned_by, body) VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET body = excluded.body",
        )
        .bind(task.id.to_string())
        .bind(task.assigned_to.to_string())
        .bind(task.assigned_by.to_string())
        .bind(body)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn put_rating(&mut self, rating: Rating) -> StoreResult<()> {
        let body = serde_json::to_string(&rating)?;
        let conn = self.conn()?;
        sqlx::query(
            "INSERT INTO ratings (ratee_id, rater_id, body) VALUES (?, ?, ?)
             ON CONFLICT (ratee_id, rater_id) DO UPDATE SET body = excluded.body",
        )
        .bind(rating.ratee_id.to_string())
        .bind(rating.rater_id.to_string())
        .bind(body)
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let tx = self.tx.take().ok_or(StoreError::TransactionFinished)?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTransaction { tx: Some(tx) }))
    }

    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query("INSERT INTO users (id, body) VALUES (?, ?)")
            .bind(user.id.to_string())
            .bind(serde_json::to_string(&user)?)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error("User", user.id.to_string()))?;
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        fetch_body(&self.pool, "SELECT body FROM users WHERE id = ?", id.to_string()).await
    }

    async fn list_users(&self, filter: UserFilter) -> StoreResult<(Vec<User>, u32)> {
        let bodies: Vec<String> = sqlx::query_scalar("SELECT body FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(select_users(decode_all(bodies)?, &filter))
    }

    // =========================================================================
    // Skill operations
    // =========================================================================

    async fn create_skill(&self, skill: Skill) -> StoreResult<Skill> {
        sqlx::query("INSERT INTO skills (id, name, body) VALUES (?, ?, ?)")
            .bind(skill.id.to_string())
            .bind(skill.name.clone())
            .bind(serde_json::to_string(&skill)?)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error("Skill", skill.name.clone()))?;
        Ok(skill)
    }

    async fn get_skill_by_name(&self, name: &str) -> StoreResult<Option<Skill>> {
        fetch_body(&self.pool, "SELECT body FROM skills WHERE name = ?", name.to_string()).await
    }

    async fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        let bodies: Vec<String> = sqlx::query_scalar("SELECT body FROM skills ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        decode_all(bodies)
    }

    // =========================================================================
    // Mentorship request operations
    // =========================================================================

    async fn create_request(&self, request: MentorshipRequest) -> StoreResult<MentorshipRequest> {
        sqlx::query(
            "INSERT INTO mentorship_requests (id, from_user_id, to_user_id, body)
             VALUES (?, ?, ?, ?)",
        )
        .bind(request.id.to_string())
        .bind(request.from_user_id.to_string())
        .bind(request.to_user_id.to_string())
        .bind(serde_json::to_string(&request)?)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error("MentorshipRequest", request.id.to_string()))?;
        Ok(request)
    }

    async fn get_request(&self, id: Uuid) -> StoreResult<Option<MentorshipRequest>> {
        fetch_body(
            &self.pool,
            "SELECT body FROM mentorship_requests WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn list_requests(&self, filter: RequestFilter) -> StoreResult<Vec<MentorshipRequest>> {
        let bodies: Vec<String> = match (filter.from_user_id, filter.to_user_id) {
            (Some(from), _) => {
                sqlx::query_scalar("SELECT body FROM mentorship_requests WHERE from_user_id = ?")
                    .bind(from.to_string())
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, Some(to)) => {
                sqlx::query_scalar("SELECT body FROM mentorship_requests WHERE to_user_id = ?")
                    .bind(to.to_string())
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, None) => sqlx::query_scalar("SELECT body FROM mentorship_requests")
                .fetch_all(&self.pool)
                .await?,
        };

        let mut result: Vec<MentorshipRequest> = decode_all::<MentorshipRequest>(bodies)?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        sort_requests(&mut result);
        Ok(result)
    }

    // =========================================================================
    // Conversation operations
    // =========================================================================

    async fn get_conversation(&self, id: &ConversationId) -> StoreResult<Option<Conversation>> {
        fetch_body(
            &self.pool,
            "SELECT body FROM conversations WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn list_conversations(&self, user_id: UserId) -> StoreResult<Vec<Conversation>> {
        let user_id = user_id.to_string();
        let bodies: Vec<String> =
            sqlx::query_scalar("SELECT body FROM conversations WHERE user_a = ? OR user_b = ?")
                .bind(user_id.clone())
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        let mut result = decode_all(bodies)?;
        sort_conversations(&mut result);
        Ok(result)
    }

    async fn list_messages(&self, conversation_id: &ConversationId) -> StoreResult<Vec<Message>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM messages WHERE conversation_id = ? ORDER BY sent_at, seq",
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        decode_all(bodies)
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: Task) -> StoreResult<Task> {
        sqlx::query("INSERT INTO tasks (id, assigned_to, assigned_by, body) VALUES (?, ?, ?, ?)")
            .bind(task.id.to_string())
            .bind(task.assigned_to.to_string())
            .bind(task.assigned_by.to_string())
            .bind(serde_json::to_string(&task)?)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error("Task", task.id.to_string()))?;
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        fetch_body(&self.pool, "SELECT body FROM tasks WHERE id = ?", id.to_string()).await
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let bodies: Vec<String> = match (filter.assigned_to, filter.assigned_by) {
            (Some(to), _) => sqlx::query_scalar("SELECT body FROM tasks WHERE assigned_to = ?")
                .bind(to.to_string())
                .fetch_all(&self.pool)
                .await?,
            (None, Some(by)) => sqlx::query_scalar("SELECT body FROM tasks WHERE assigned_by = ?")
                .bind(by.to_string())
                .fetch_all(&self.pool)
                .await?,
            (None, None) => sqlx::query_scalar("SELECT body FROM tasks")
                .fetch_all(&self.pool)
                .await?,
        };

        let mut result: Vec<Task> = decode_all::<Task>(bodies)?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        sort_tasks(&mut result);
        Ok(result)
    }

    // =========================================================================
    // Rating operations
    // =========================================================================

    async fn list_ratings(&self, ratee_id: UserId) -> StoreResult<Vec<Rating>> {
        let bodies: Vec<String> = sqlx::query_scalar("SELECT body FROM ratings WHERE ratee_id = ?")
            .bind(ratee_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        let mut result: Vec<Rating> = decode_all(bodies)?;
        result.sort_by_key(|r| std::cmp::Reverse(r.updated_at));
        Ok(result)
    }
}
