//! Domain services shared by the API handlers.

pub mod blob_store;
pub mod conversation;
pub mod mentorship;
pub mod rating;
