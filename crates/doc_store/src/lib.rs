//! Document storage for SkillKonnect
//!
//! This crate provides a storage abstraction over the SkillKonnect documents
//! (users, skills, mentorship requests, conversations, tasks, ratings) with
//! an all-or-nothing transaction primitive. It ships an in-memory backend for
//! tests and development and a SQLite backend for deployments.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
