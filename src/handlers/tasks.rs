use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::api::format::{parse_due, task_to_api_value};
use crate::authz::{Action, ResourceRef};
use crate::database::store::parse_object_id;
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(rename = "sprintID")]
    pub sprint_id: String,
    pub header: String,
    #[serde(default)]
    pub description: String,
    pub due: String,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub blocks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub header: String,
    #[serde(default)]
    pub description: String,
    pub due: String,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub blocks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlocksRequest {
    pub blocks: Vec<String>,
}

/// GET /sprints/:id/tasks
pub async fn task_list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Value>> {
    let sprint_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Read,
            ResourceRef::Sprint(sprint_id),
        )
        .await?;

    let tasks = state.tasks.for_sprint(&sprint_id).await?;
    Ok(ApiResponse::success(
        tasks.iter().map(task_to_api_value).collect(),
    ))
}

/// POST /tasks - any member of the owning project may create tasks
pub async fn task_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateTaskRequest>,
) -> ApiResult<Value> {
    let sprint_id = parse_object_id(&body.sprint_id)?;
    let due = parse_due(&body.due)?;
    state
        .authz
        .authorize_task_create(Some(&principal.user_id), &sprint_id)
        .await?;

    let task = state
        .tasks
        .create(
            sprint_id,
            &body.header,
            &body.description,
            due,
            body.notes,
            body.blocks,
        )
        .await?;
    Ok(ApiResponse::created(task_to_api_value(&task)))
}

/// GET /tasks/:id
pub async fn task_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let task_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Read,
            ResourceRef::Task(task_id),
        )
        .await?;

    let task = state.tasks.get(&task_id).await?;
    Ok(ApiResponse::success(task_to_api_value(&task)))
}

/// PUT /tasks/:id - full replace, notes and blocks included
pub async fn task_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaskRequest>,
) -> ApiResult<Value> {
    let task_id = parse_object_id(&id)?;
    let due = parse_due(&body.due)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Task(task_id),
        )
        .await?;

    let task = state
        .tasks
        .update(
            &task_id,
            &body.header,
            &body.description,
            due,
            body.notes,
            body.blocks,
        )
        .await?;
    Ok(ApiResponse::success(task_to_api_value(&task)))
}

/// DELETE /tasks/:id
pub async fn task_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let task_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Task(task_id),
        )
        .await?;

    state.tasks.delete(&task_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// PUT /tasks/:id/notes - whole-collection replace of the notes sequence
pub async fn task_update_notes(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateNotesRequest>,
) -> ApiResult<Value> {
    let task_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Task(task_id),
        )
        .await?;

    let task = state.tasks.update_notes(&task_id, body.notes).await?;
    Ok(ApiResponse::success(task_to_api_value(&task)))
}

/// PUT /tasks/:id/blocks - whole-collection replace of the blocks sequence
pub async fn task_update_blocks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBlocksRequest>,
) -> ApiResult<Value> {
    let task_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Task(task_id),
        )
        .await?;

    let task = state.tasks.update_blocks(&task_id, body.blocks).await?;
    Ok(ApiResponse::success(task_to_api_value(&task)))
}
