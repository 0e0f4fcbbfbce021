use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::api::format::membership_to_api_value;
use crate::authz::{Action, ResourceRef};
use crate::database::models::Role;
use crate::database::store::parse_object_id;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// GET /projects/:id/team - list the project's memberships
pub async fn team_list(
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

    let members = state.memberships.members_of(&project_id).await?;
    Ok(ApiResponse::success(
        members.iter().map(membership_to_api_value).collect(),
    ))
}

/// POST /projects/:id/team - add a member by email, Developer by default.
/// Team changes are project-level writes.
pub async fn team_add(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<AddMemberRequest>,
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

    let user = state
        .users
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No user with email {}", body.email)))?;

    let membership = state.memberships.add(project_id, &user.id, body.role).await?;
    Ok(ApiResponse::created(membership_to_api_value(&membership)))
}

/// PATCH /projects/:id/team/:user_id - change a member's role
pub async fn team_set_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, user_id)): Path<(String, String)>,
    Json(body): Json<SetRoleRequest>,
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

    state
        .memberships
        .set_role(&user_id, &project_id, body.role)
        .await?;
    Ok(ApiResponse::success(serde_json::json!({
        "projectID": project_id.to_hex(),
        "userID": user_id,
        "role": body.role,
    })))
}

/// DELETE /projects/:id/team/:user_id - remove a member
pub async fn team_remove(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((id, user_id)): Path<(String, String)>,
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

    state.memberships.remove(&user_id, &project_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// GET /memberships - every membership the caller holds
pub async fn member_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<Value>> {
    let memberships = state.memberships.all_roles_of(&principal.user_id).await?;
    Ok(ApiResponse::success(
        memberships.iter().map(membership_to_api_value).collect(),
    ))
}
