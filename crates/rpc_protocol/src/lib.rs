//! Wire types for the SkillKonnect HTTP API
//!
//! Every endpoint takes a JSON request body and answers with a JSON response
//! body or an [`ApiError`]. Identifiers travel as strings.

mod error;
pub mod requests;
pub mod responses;
mod types;

pub use error::*;
pub use types::*;
