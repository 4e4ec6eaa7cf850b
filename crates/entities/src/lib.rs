//! Core document definitions for SkillKonnect.
//!
//! This crate defines the documents stored by the SkillKonnect backend:
//! user profiles, the skill catalogue, mentorship requests, conversations
//! and their messages, tasks, and ratings.

mod conversation;
mod mentorship;
mod rating;
mod skill;
mod task;
mod user;

pub use conversation::*;
pub use mentorship::*;
pub use rating::*;
pub use skill::*;
pub use task::*;
pub use user::*;

use uuid::Uuid;

/// Identifier of a user document (the identity provider's subject).
pub type UserId = Uuid;

/// Inserts `value` unless it is already present. Returns true if inserted.
///
/// Vectors stored on documents use set semantics but keep insertion order.
pub fn union_insert<T: PartialEq>(values: &mut Vec<T>, value: T) -> bool {
    if values.contains(&value) {
        return false;
    }
    values.push(value);
    true
}
