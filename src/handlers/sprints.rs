use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::api::format::{parse_due, sprint_to_api_value};
use crate::authz::{Action, ResourceRef};
use crate::database::store::parse_object_id;
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSprintRequest {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub header: String,
    pub due: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSprintRequest {
    pub header: String,
    pub due: String,
    #[serde(default)]
    pub description: String,
}

/// GET /projects/:id/sprints
pub async fn sprint_list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Value>> {
    let project_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Read,
            ResourceRef::Project(project_id),
        )
        .await?;

    let sprints = state.sprints.for_project(&project_id).await?;
    Ok(ApiResponse::success(
        sprints.iter().map(sprint_to_api_value).collect(),
    ))
}

/// POST /sprints - sprint creation is a project-level write
pub async fn sprint_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateSprintRequest>,
) -> ApiResult<Value> {
    let project_id = parse_object_id(&body.project_id)?;
    let due = parse_due(&body.due)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Project(project_id),
        )
        .await?;

    let sprint = state
        .sprints
        .create(project_id, &body.header, due, &body.description)
        .await?;
    Ok(ApiResponse::created(sprint_to_api_value(&sprint)))
}

/// GET /sprints/:id
pub async fn sprint_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let sprint_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Read,
            ResourceRef::Sprint(sprint_id),
        )
        .await?;

    let sprint = state.sprints.get(&sprint_id).await?;
    Ok(ApiResponse::success(sprint_to_api_value(&sprint)))
}

/// PUT /sprints/:id - full replace of the mutable fields
pub async fn sprint_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateSprintRequest>,
) -> ApiResult<Value> {
    let sprint_id = parse_object_id(&id)?;
    let due = parse_due(&body.due)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Sprint(sprint_id),
        )
        .await?;

    let sprint = state
        .sprints
        .update(&sprint_id, &body.header, due, &body.description)
        .await?;
    Ok(ApiResponse::success(sprint_to_api_value(&sprint)))
}

/// DELETE /sprints/:id - tasks under the sprint are not cascaded
pub async fn sprint_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let sprint_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Sprint(sprint_id),
        )
        .await?;

    state.sprints.delete(&sprint_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
