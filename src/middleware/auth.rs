use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller context, resolved once per request from the bearer
/// token and injected as a request extension.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Identity middleware: extracts the bearer token, resolves it through the
/// identity resolver (verifying with the provider and refreshing the stored
/// profile), and injects the resulting [`Principal`].
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;
    let user = state.identity.resolve(&token).await?;

    request.extensions_mut().insert(Principal::from(user));
    Ok(next.run(request).await)
}

/// Extract the token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(ApiError::unauthorized("Empty bearer token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}
