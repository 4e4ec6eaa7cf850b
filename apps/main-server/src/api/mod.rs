//! API endpoints.

pub mod auth;
pub mod conversation;
mod convert;
pub mod rating;
pub mod request;
pub mod skill;
pub mod task;
pub mod user;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use doc_store::DocumentStore;

use crate::state::AppState;

/// Creates the router for the authenticated API endpoints.
pub fn create_router<S: DocumentStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Auth endpoints
        .route("/api/auth/session", post(auth::start_session))
        .route("/api/auth/me", get(auth::get_current_user))
        .route("/api/auth/logout", post(auth::logout))
        // User endpoints
        .route("/api/user/get", post(user::get_user))
        .route("/api/user/update", post(user::update_profile))
        .route("/api/user/add-skill", post(user::add_skill))
        .route("/api/user/remove-skill", post(user::remove_skill))
        .route("/api/user/upload-photo", post(user::upload_photo))
        .route("/api/user/search", post(user::search_users))
        .route("/api/user/connections", post(user::list_connections))
        // Skill endpoints
        .route("/api/skill/list", post(skill::list_skills))
        .route("/api/skill/create", post(skill::create_skill))
        // Mentorship request endpoints
        .route("/api/request/send", post(request::send_request))
        .route("/api/request/list", post(request::list_requests))
        .route("/api/request/accept", post(request::accept_request))
        .route("/api/request/reject", post(request::reject_request))
        // Conversation endpoints
        .route("/api/conversation/start", post(conversation::start_conversation))
        .route("/api/conversation/list", post(conversation::list_conversations))
        .route("/api/conversation/messages", post(conversation::list_messages))
        .route("/api/conversation/send", post(conversation::send_message))
        // Task endpoints
        .route("/api/task/create", post(task::create_task))
        .route("/api/task/list", post(task::list_tasks))
        .route("/api/task/update-status", post(task::update_task_status))
        // Rating endpoints
        .route("/api/rating/submit", post(rating::submit_rating))
        .route("/api/rating/list", post(rating::list_ratings))
}

/// Health check endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}
