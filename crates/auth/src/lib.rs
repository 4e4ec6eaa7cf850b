//! Bearer token handling for SkillKonnect.
//!
//! The identity provider signs HS256 access tokens; this crate provides:
//! - JWT claims, token generation and validation
//! - A revocation list so signed-out tokens stop working before they expire

mod error;
mod jwt;
mod revocation;

pub use error::*;
pub use jwt::*;
pub use revocation::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "skill-konnect";
