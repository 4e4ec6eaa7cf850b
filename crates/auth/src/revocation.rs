//! Revoked token tracking
//!
//! Access tokens are stateless, so signing out records the token's `jti`
//! until the token would have expired anyway.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{AuthResult, Claims};

/// Trait for revoked token storage
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Revoke the token described by `claims`
    async fn revoke(&self, claims: &Claims) -> AuthResult<()>;

    /// Returns true if the token with this `jti` was revoked
    async fn is_revoked(&self, jti: &str) -> AuthResult<bool>;

    /// Forget revocations whose tokens have expired
    ///
    /// Returns the number of entries removed.
    async fn cleanup_expired(&self) -> AuthResult<usize>;
}

/// In-memory revocation list (for single-process deployments and tests)
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    revoked: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryRevocationStore {
    /// Create a new in-memory revocation list
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, claims: &Claims) -> AuthResult<()> {
        let mut revoked = self.revoked.write().await;
        revoked.insert(claims.jti.clone(), claims.expires_at());
        tracing::debug!(jti = %claims.jti, "Token revoked");
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AuthResult<bool> {
        let revoked = self.revoked.read().await;
        Ok(revoked.contains_key(jti))
    }

    async fn cleanup_expired(&self) -> AuthResult<usize> {
        let now = Utc::now();
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at > now);
        Ok(before - revoked.len())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn claims(expiration_hours: u64) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "ada@example.com".to_string(),
            None,
            crate::DEFAULT_JWT_ISSUER,
            expiration_hours,
        )
    }

    #[tokio::test]
    async fn test_revoke_and_check() {
        let store = MemoryRevocationStore::new();
        let claims = claims(1);

        assert!(!store.is_revoked(&claims.jti).await.unwrap());
        store.revoke(&claims).await.unwrap();
        assert!(store.is_revoked(&claims.jti).await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_live_tokens() {
        let store = MemoryRevocationStore::new();
        let live = claims(1);
        let mut expired = claims(1);
        expired.exp = Utc::now().timestamp() - 60;

        store.revoke(&live).await.unwrap();
        store.revoke(&expired).await.unwrap();

        let removed = store.cleanup_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.is_revoked(&live.jti).await.unwrap());
        assert!(!store.is_revoked(&expired.jti).await.unwrap());
    }
}
