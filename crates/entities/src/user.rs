//! User profile definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConversationId, UserId, union_insert};

/// Availability shown on a freshly created profile.
pub const DEFAULT_AVAILABILITY: &str = "Available";

/// Aggregate of all ratings a user has received.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Sum of all current scores.
    pub total: u32,
    /// Number of distinct raters.
    pub count: u32,
    /// `total / count`, or 0 when nobody has rated yet.
    pub average: f64,
}

impl RatingSummary {
    /// Folds a score into the summary.
    ///
    /// When `previous` is the rater's earlier score it is replaced rather than
    /// counted a second time.
    pub fn apply(self, previous: Option<u8>, score: u8) -> Self {
        let (total, count) = match previous {
            Some(prior) => (
                self.total.saturating_sub(u32::from(prior)) + u32::from(score),
                self.count.max(1),
            ),
            None => (self.total + u32::from(score), self.count + 1),
        };

        Self {
            total,
            count,
            average: f64::from(total) / f64::from(count),
        }
    }
}

/// A user profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, shared with the identity provider.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Profile photo URL.
    pub photo_url: Option<String>,
    /// Short headline.
    pub title: String,
    /// Free-form biography.
    pub bio: String,
    /// Skills the user can teach.
    pub skills: Vec<String>,
    /// Location.
    pub location: String,
    /// Availability text.
    pub availability: String,
    /// Aggregate rating.
    pub rating: RatingSummary,
    /// Users linked through an accepted mentorship request.
    pub connections: Vec<UserId>,
    /// Conversations the user takes part in.
    pub conversations: Vec<ConversationId>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a profile with default fields for a first sign-in.
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            display_name: String::new(),
            photo_url: None,
            title: String::new(),
            bio: String::new(),
            skills: Vec::new(),
            location: String::new(),
            availability: DEFAULT_AVAILABILITY.to_string(),
            rating: RatingSummary::default(),
            connections: Vec::new(),
            conversations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Adds a skill unless the user already lists it.
    pub fn add_skill(&mut self, skill: impl Into<String>) -> bool {
        union_insert(&mut self.skills, skill.into())
    }

    /// Removes a skill. Returns true if it was present.
    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s != skill);
        self.skills.len() != before
    }

    /// Records a connection to another user.
    pub fn connect(&mut self, other: UserId) -> bool {
        other != self.id && union_insert(&mut self.connections, other)
    }

    /// Records membership in a conversation.
    pub fn join_conversation(&mut self, conversation_id: ConversationId) -> bool {
        union_insert(&mut self.conversations, conversation_id)
    }

    /// Returns true if the profile lists `skill`.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}
