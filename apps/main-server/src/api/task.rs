//! Task management API endpoints.
//!
//! Tasks live inside a conversation: the creator assigns work to the other
//! participant, and status changes are announced in the same conversation.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use doc_store::{DocumentStore, TaskFilter};
use entities::Task;
use rpc_protocol::{Direction, requests::*, responses::*};

use super::conversation::parse_conversation_id;
use super::convert::{entity_to_rpc_task, to_entity_task_status};
use crate::error::{ServerError, ServerResult, parse_id};
use crate::middleware::AuthenticatedUser;
use crate::services::conversation::post_message;
use crate::state::AppState;

/// Creates a task for the other participant of a conversation.
pub async fn create_task<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<CreateTaskRequest>,
) -> ServerResult<Json<CreateTaskResponse>> {
    let conversation_id = parse_conversation_id(&request.conversation_id)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Task name must not be empty".to_string(),
        ));
    }

    let conversation = state
        .store
        .get_conversation(&conversation_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Conversation not found".to_string()))?;
    let assignee = conversation.other_participant(caller.id).ok_or_else(|| {
        ServerError::PermissionDenied("Not a participant of this conversation".to_string())
    })?;

    let task = state
        .store
        .create_task(Task::new(
            caller.id,
            assignee,
            conversation_id,
            name,
            request.description.trim(),
        ))
        .await?;

    tracing::info!(task_id = %task.id, assigned_to = %assignee, "Task created");

    Ok(Json(CreateTaskResponse {
        task: entity_to_rpc_task(&task),
    }))
}

/// Lists tasks assigned to (default) or by the caller.
pub async fn list_tasks<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<ListTasksRequest>,
) -> ServerResult<Json<ListTasksResponse>> {
    let mut filter = TaskFilter {
        status: request.status.map(to_entity_task_status),
        ..Default::default()
    };
    match request.direction {
        Direction::Received => filter.assigned_to = Some(caller.id),
        Direction::Sent => filter.assigned_by = Some(caller.id),
    }
    if let Some(id) = request.conversation_id.as_deref() {
        filter.conversation_id = Some(parse_conversation_id(id)?);
    }

    let tasks = state.store.list_tasks(filter).await?;

    Ok(Json(ListTasksResponse {
        tasks: tasks.iter().map(entity_to_rpc_task).collect(),
    }))
}

/// Updates a task's status and posts a note to its conversation.
pub async fn update_task_status<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateTaskStatusRequest>,
) -> ServerResult<Json<UpdateTaskStatusResponse>> {
    let task_id = parse_id(&request.task_id, "task_id")?;
    let status = to_entity_task_status(request.status);

    let mut tx = state.store.begin().await?;

    let mut task = tx
        .get_task(task_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Task not found".to_string()))?;
    if task.assigned_to != caller.id {
        tracing::warn!(task_id = %task_id, caller = %caller.id, "Status update by non-assignee");
        return Err(ServerError::PermissionDenied(
            "Only the assignee can update this task".to_string(),
        ));
    }

    if task.status != status {
        task.status = status;
        task.updated_at = chrono::Utc::now();

        let mut conversation = tx
            .get_conversation(&task.conversation_id)
            .await?
            .ok_or_else(|| ServerError::NotFound("Conversation not found".to_string()))?;
        post_message(tx.as_mut(), &mut conversation, caller.id, task.status_note()).await?;

        tx.put_task(task.clone()).await?;
        tx.commit().await?;

        tracing::info!(task_id = %task.id, status = ?task.status, "Task status updated");
    }

    Ok(Json(UpdateTaskStatusResponse {
        task: entity_to_rpc_task(&task),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_support::TestApp;

    async fn conversation(app: &TestApp, token: &str, other: uuid::Uuid) -> String {
        let (_, body) = app
            .post(
                "/api/conversation/start",
                token,
                json!({ "other_user_id": other.to_string() }),
            )
            .await;
        body["conversation"]["id"].as_str().unwrap().to_string()
    }

    fn texts(body: &Value) -> Vec<String> {
        body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_task_lifecycle() {
        let app = TestApp::new().await;
        let (_, mentor) = app.user("max@example.com", Some("Max")).await;
        let (mia_id, mentee) = app.user("mia@example.com", Some("Mia")).await;
        let conversation_id = conversation(&app, &mentor, mia_id).await;

        let (status, body) = app
            .post(
                "/api/task/create",
                &mentor,
                json!({
                    "conversation_id": conversation_id,
                    "name": "Read the book",
                    "description": "Chapters 1-3",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["task"]["assigned_to"], mia_id.to_string());
        assert_eq!(body["task"]["status"], "pending");
        let task_id = body["task"]["id"].as_str().unwrap().to_string();

        let (_, body) = app.post("/api/task/list", &mentee, json!({})).await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
        let (_, body) = app
            .post("/api/task/list", &mentor, json!({ "direction": "sent" }))
            .await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

        let (status, _) = app
            .post(
                "/api/task/update-status",
                &mentor,
                json!({ "task_id": task_id, "status": "completed" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .post(
                "/api/task/update-status",
                &mentee,
                json!({ "task_id": task_id, "status": "completed" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["task"]["status"], "completed");

        app.post(
            "/api/task/update-status",
            &mentee,
            json!({ "task_id": task_id, "status": "pending" }),
        )
        .await;

        let (_, body) = app
            .post(
                "/api/conversation/messages",
                &mentor,
                json!({ "conversation_id": conversation_id }),
            )
            .await;
        assert_eq!(
            texts(&body),
            vec![
                "(Read the book) task completed",
                "(Read the book) task marked as incomplete",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_task_requires_participation() {
        let app = TestApp::new().await;
        let (_, max) = app.user("max@example.com", Some("Max")).await;
        let (mia_id, _) = app.user("mia@example.com", Some("Mia")).await;
        let eve = app.token_for_new_user("eve@example.com", Some("Eve")).await;
        let conversation_id = conversation(&app, &max, mia_id).await;

        let (status, _) = app
            .post(
                "/api/task/create",
                &eve,
                json!({ "conversation_id": conversation_id, "name": "Spy" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .post(
                "/api/task/create",
                &max,
                json!({ "conversation_id": conversation_id, "name": " " }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
