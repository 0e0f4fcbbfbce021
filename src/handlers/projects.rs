use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::api::format::project_to_api_value;
use crate::authz::{Action, ResourceRef};
use crate::database::store::parse_object_id;
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// GET /projects - projects the caller is a member of
pub async fn project_list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<Value>> {
    let projects = state.projects.for_user(&principal.user_id).await?;
    Ok(ApiResponse::success(
        projects.iter().map(project_to_api_value).collect(),
    ))
}

/// POST /projects - create a project; the caller becomes its ProjectLead
pub async fn project_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<ProjectRequest>,
) -> ApiResult<Value> {
    let project = state
        .projects
        .create(&body.name, &body.description, &principal.user_id)
        .await?;
    Ok(ApiResponse::created(project_to_api_value(&project)))
}

/// GET /projects/:id
pub async fn project_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let project_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Read,
            ResourceRef::Project(project_id),
        )
        .await?;

    let project = state.projects.get(&project_id).await?;
    Ok(ApiResponse::success(project_to_api_value(&project)))
}

/// PUT /projects/:id - full replace of name and description
pub async fn project_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<ProjectRequest>,
) -> ApiResult<Value> {
    let project_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Project(project_id),
        )
        .await?;

    let project = state
        .projects
        .update(&project_id, &body.name, &body.description)
        .await?;
    Ok(ApiResponse::success(project_to_api_value(&project)))
}

/// DELETE /projects/:id - removes team memberships, then the project
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let project_id = parse_object_id(&id)?;
    state
        .authz
        .authorize(
            Some(&principal.user_id),
            Action::Write,
            ResourceRef::Project(project_id),
        )
        .await?;

    state.projects.delete(&project_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
