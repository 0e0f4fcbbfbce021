use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::format::user_to_api_value;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateUserRequest {
    pub token: String,
}

/// POST /users - validate a provider token, creating the local profile on
/// first sight and refreshing it when the provider's claims changed
pub async fn user_validate(
    State(state): State<AppState>,
    Json(body): Json<ValidateUserRequest>,
) -> ApiResult<Value> {
    let user = state.identity.resolve(&body.token).await?;
    Ok(ApiResponse::success(user_to_api_value(&user)))
}
