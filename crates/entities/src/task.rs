//! Task definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ConversationId, UserId};

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not done yet.
    #[default]
    Pending,
    /// Marked done by the assignee.
    Completed,
}

/// Work a mentor hands to a mentee inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: Uuid,
    /// Mentor who created the task.
    pub assigned_by: UserId,
    /// User expected to do it.
    pub assigned_to: UserId,
    /// Short name.
    pub name: String,
    /// Details.
    pub description: String,
    /// Conversation the task came from.
    pub conversation_id: ConversationId,
    /// Current status.
    pub status: TaskStatus,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task.
    pub fn new(
        assigned_by: UserId,
        assigned_to: UserId,
        conversation_id: ConversationId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            assigned_by,
            assigned_to,
            name: name.into(),
            description: description.into(),
            conversation_id,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Note posted to the conversation when the status changes.
    pub fn status_note(&self) -> String {
        match self.status {
            TaskStatus::Completed => format!("({}) task completed", self.name),
            TaskStatus::Pending => format!("({}) task marked as incomplete", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_note() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut task = Task::new(a, b, ConversationId::for_pair(a, b), "Read", "chapter 1");

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.status_note(), "(Read) task marked as incomplete");

        task.status = TaskStatus::Completed;
        assert_eq!(task.status_note(), "(Read) task completed");
    }
}
