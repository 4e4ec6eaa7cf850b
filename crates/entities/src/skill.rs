//! Skill catalogue definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An entry in the skill catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Unique identifier.
    pub id: Uuid,
    /// Name, unique ignoring case.
    pub name: String,
    /// Short description.
    pub description: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Skill {
    /// Creates a catalogue entry.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

/// The catalogue a fresh deployment starts with.
pub fn default_skills() -> Vec<Skill> {
    [
        ("JavaScript", "A versatile scripting language for web development."),
        ("React", "A popular JavaScript library for building user interfaces."),
        ("TypeScript", "A statically typed superset of JavaScript."),
        ("Node.js", "A JavaScript runtime built on Chrome's V8 engine."),
        ("Firebase", "A platform by Google for creating mobile and web applications."),
    ]
    .into_iter()
    .map(|(name, description)| Skill::new(name, description))
    .collect()
}
