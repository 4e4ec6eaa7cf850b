//! Rating submission.

use doc_store::DocumentStore;
use entities::{MAX_SCORE, MIN_SCORE, Rating, RatingSummary, UserId, is_valid_score};

use crate::error::{ServerError, ServerResult};

/// A rating as submitted by a client.
#[derive(Debug, Clone)]
pub struct RatingSubmission {
    pub ratee_id: UserId,
    pub rater_id: UserId,
    pub score: i64,
    pub comment: Option<String>,
}

/// Records `submission` and returns the ratee's new summary.
///
/// Reading the prior rating and the ratee's totals happens in the same
/// transaction as the writes, so concurrent submissions for one ratee
/// cannot lose updates.
pub async fn submit_rating<S: DocumentStore>(
    store: &S,
    caller: UserId,
    submission: RatingSubmission,
) -> ServerResult<RatingSummary> {
    let RatingSubmission {
        ratee_id,
        rater_id,
        score,
        comment,
    } = submission;

    if rater_id != caller {
        tracing::warn!(
            rater_id = %rater_id,
            caller = %caller,
            "Rating submitted on behalf of another user"
        );
        return Err(ServerError::PermissionDenied(
            "You can only submit ratings as yourself".to_string(),
        ));
    }
    if ratee_id == rater_id {
        return Err(ServerError::InvalidRequest(
            "You cannot rate yourself".to_string(),
        ));
    }
    if !is_valid_score(score) {
        return Err(ServerError::InvalidRequest(format!(
            "Rating must be between {} and {}",
            MIN_SCORE, MAX_SCORE
        )));
    }
    let score = score as u8;
    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let mut tx = store.begin().await?;

    let mut ratee = tx
        .get_user(ratee_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Rated user not found".to_string()))?;
    tx.get_user(rater_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Rater not found".to_string()))?;

    let prior = tx.get_rating(ratee_id, rater_id).await?;
    let summary = ratee.rating.apply(prior.as_ref().map(|r| r.score), score);

    let rating = match prior {
        Some(mut existing) => {
            existing.score = score;
            existing.comment = comment;
            existing.updated_at = chrono::Utc::now();
            existing
        }
        None => Rating::new(ratee_id, rater_id, score, comment),
    };

    ratee.rating = summary;
    ratee.updated_at = chrono::Utc::now();
    tx.put_user(ratee).await?;
    tx.put_rating(rating).await?;
    tx.commit().await?;

    tracing::info!(
        ratee_id = %ratee_id,
        rater_id = %rater_id,
        average = summary.average,
        count = summary.count,
        "Rating submitted"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use doc_store::{MemoryStore, SqliteStore};
    use entities::User;
    use uuid::Uuid;

    use super::*;

    async fn user<S: DocumentStore>(store: &S, email: &str) -> UserId {
        store
            .create_user(User::new(Uuid::new_v4(), email))
            .await
            .unwrap()
            .id
    }

    fn submission(ratee_id: UserId, rater_id: UserId, score: i64) -> RatingSubmission {
        RatingSubmission {
            ratee_id,
            rater_id,
            score,
            comment: None,
        }
    }

    async fn check_resubmission_replaces<S: DocumentStore>(store: S) {
        let ratee = user(&store, "ratee@example.com").await;
        let first = user(&store, "first@example.com").await;
        let second = user(&store, "second@example.com").await;

        submit_rating(&store, first, submission(ratee, first, 5)).await.unwrap();
        let summary = submit_rating(&store, second, submission(ratee, second, 3))
            .await
            .unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, 4.0);

        let summary = submit_rating(&store, first, submission(ratee, first, 1))
            .await
            .unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, 2.0);

        let stored = store.get_user(ratee).await.unwrap().unwrap();
        assert_eq!(stored.rating, summary);

        let ratings = store.list_ratings(ratee).await.unwrap();
        assert_eq!(ratings.len(), 2);
        let from_first = ratings.iter().find(|r| r.rater_id == first).unwrap();
        assert_eq!(from_first.score, 1);
    }

    #[tokio::test]
    async fn test_resubmission_replaces_memory() {
        check_resubmission_replaces(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_resubmission_replaces_sqlite() {
        check_resubmission_replaces(SqliteStore::in_memory().await.unwrap()).await;
    }

    #[tokio::test]
    async fn test_rejects_invalid_submissions() {
        let store = MemoryStore::new();
        let ratee = user(&store, "ratee@example.com").await;
        let rater = user(&store, "rater@example.com").await;

        assert!(matches!(
            submit_rating(&store, ratee, submission(ratee, rater, 4)).await,
            Err(ServerError::PermissionDenied(_))
        ));
        assert!(matches!(
            submit_rating(&store, rater, submission(rater, rater, 4)).await,
            Err(ServerError::InvalidRequest(_))
        ));
        for score in [0, 6, -1, 300] {
            assert!(matches!(
                submit_rating(&store, rater, submission(ratee, rater, score)).await,
                Err(ServerError::InvalidRequest(_))
            ));
        }
        assert!(matches!(
            submit_rating(&store, rater, submission(Uuid::new_v4(), rater, 4)).await,
            Err(ServerError::NotFound(_))
        ));

        let stored = store.get_user(ratee).await.unwrap().unwrap();
        assert_eq!(stored.rating.count, 0);
        assert!(store.list_ratings(ratee).await.unwrap().is_empty());
    }

    async fn check_concurrent_submissions<S: DocumentStore + 'static>(store: S) {
        let store = Arc::new(store);
        let ratee = user(store.as_ref(), "ratee@example.com").await;

        let mut raters = Vec::new();
        for i in 0..20 {
            raters.push(user(store.as_ref(), &format!("rater{i}@example.com")).await);
        }

        let handles: Vec<_> = raters
            .iter()
            .enumerate()
            .map(|(i, &rater)| {
                let store = Arc::clone(&store);
                let score = (i % 5) as i64 + 1;
                tokio::spawn(async move {
                    submit_rating(store.as_ref(), rater, submission(ratee, rater, score)).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get_user(ratee).await.unwrap().unwrap();
        assert_eq!(stored.rating.count, 20);
        assert_eq!(stored.rating.total, 60);
        assert_eq!(stored.rating.average, 3.0);
        assert_eq!(store.list_ratings(ratee).await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_serialized_memory() {
        check_concurrent_submissions(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_serialized_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("konnect.db").display());
        check_concurrent_submissions(SqliteStore::connect(&url).await.unwrap()).await;
    }
}
