//! Rating definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Lowest accepted score.
pub const MIN_SCORE: u8 = 1;

/// Highest accepted score.
pub const MAX_SCORE: u8 = 5;

/// One rater's score for one ratee. Resubmission overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    /// User being rated.
    pub ratee_id: UserId,
    /// User giving the rating.
    pub rater_id: UserId,
    /// Score in `MIN_SCORE..=MAX_SCORE`.
    pub score: u8,
    /// Optional review text.
    pub comment: Option<String>,
    /// When the first score was submitted.
    pub created_at: DateTime<Utc>,
    /// When the score was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    /// Creates a rating submitted now.
    pub fn new(ratee_id: UserId, rater_id: UserId, score: u8, comment: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            ratee_id,
            rater_id,
            score,
            comment,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Returns true if `score` is an accepted rating value.
pub fn is_valid_score(score: i64) -> bool {
    (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert!(!is_valid_score(0));
        assert!(is_valid_score(1));
        assert!(is_valid_score(5));
        assert!(!is_valid_score(6));
        assert!(!is_valid_score(-3));
    }
}
