//! Rating API endpoints.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use doc_store::DocumentStore;
use rpc_protocol::{requests::*, responses::*};

use super::convert::{entity_to_rpc_rating, to_rpc_rating_summary};
use crate::error::{ServerError, ServerResult, parse_id};
use crate::middleware::AuthenticatedUser;
use crate::services::rating::{self, RatingSubmission};
use crate::state::AppState;

/// Submits or replaces the caller's rating of another user.
pub async fn submit_rating<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<SubmitRatingRequest>,
) -> ServerResult<Json<SubmitRatingResponse>> {
    let submission = RatingSubmission {
        ratee_id: parse_id(&request.ratee_id, "ratee_id")?,
        rater_id: parse_id(&request.rater_id, "rater_id")?,
        score: request.score,
        comment: request.comment,
    };

    let summary = rating::submit_rating(&state.store, caller.id, submission).await?;

    Ok(Json(SubmitRatingResponse {
        success: true,
        rating: to_rpc_rating_summary(summary),
    }))
}

/// Lists the ratings a user has received.
pub async fn list_ratings<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<ListRatingsRequest>,
) -> ServerResult<Json<ListRatingsResponse>> {
    let user_id = parse_id(&request.user_id, "user_id")?;

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;
    let ratings = state.store.list_ratings(user_id).await?;

    Ok(Json(ListRatingsResponse {
        ratings: ratings.iter().map(entity_to_rpc_rating).collect(),
        summary: to_rpc_rating_summary(user.rating),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_rating_over_http() {
        let app = TestApp::new().await;
        let (ada_id, _) = app.user("ada@example.com", Some("Ada")).await;
        let (alan_id, alan) = app.user("alan@example.com", Some("Alan")).await;
        let (grace_id, grace) = app.user("grace@example.com", Some("Grace")).await;

        let rate = |rater: uuid::Uuid, score: i64| {
            json!({
                "ratee_id": ada_id.to_string(),
                "rater_id": rater.to_string(),
                "score": score,
                "comment": "Great mentor",
            })
        };

        let (status, body) = app.post("/api/rating/submit", &alan, rate(alan_id, 5)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = app.post("/api/rating/submit", &grace, rate(grace_id, 3)).await;
        assert_eq!(body["rating"]["average"], 4.0);
        assert_eq!(body["rating"]["count"], 2);

        let (_, body) = app.post("/api/rating/submit", &alan, rate(alan_id, 1)).await;
        assert_eq!(body["rating"]["average"], 2.0);
        assert_eq!(body["rating"]["count"], 2);

        let (_, body) = app
            .post("/api/rating/list", &alan, json!({ "user_id": ada_id.to_string() }))
            .await;
        assert_eq!(body["ratings"].as_array().unwrap().len(), 2);
        assert_eq!(body["summary"]["total"], 4);
    }

    #[tokio::test]
    async fn test_rating_errors_over_http() {
        let app = TestApp::new().await;
        let (ada_id, ada) = app.user("ada@example.com", Some("Ada")).await;
        let (alan_id, alan) = app.user("alan@example.com", Some("Alan")).await;

        let (status, body) = app
            .post(
                "/api/rating/submit",
                &ada,
                json!({
                    "ratee_id": ada_id.to_string(),
                    "rater_id": alan_id.to_string(),
                    "score": 5,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "permission-denied");

        let (status, _) = app
            .post(
                "/api/rating/submit",
                &alan,
                json!({
                    "ratee_id": ada_id.to_string(),
                    "rater_id": alan_id.to_string(),
                    "score": 9,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .post(
                "/api/rating/submit",
                &alan,
                json!({
                    "ratee_id": alan_id.to_string(),
                    "rater_id": alan_id.to_string(),
                    "score": 4,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
