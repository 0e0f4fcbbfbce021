use axum::routing::{get, patch, post, put};
use axum::{middleware, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{projects, sprints, tasks, team, users};
use crate::middleware::auth::identity_middleware;
use crate::state::AppState;

/// Build the full router. Split out of main so tests can drive the service
/// in-process against any store backend.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/users", post(users::user_validate))
        // Everything else requires a resolved principal
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(projects::project_list).post(projects::project_create),
        )
        .route(
            "/projects/:id",
            get(projects::project_get)
                .put(projects::project_update)
                .delete(projects::project_delete),
        )
        .route(
            "/projects/:id/team",
            get(team::team_list).post(team::team_add),
        )
        .route(
            "/projects/:id/team/:user_id",
            patch(team::team_set_role).delete(team::team_remove),
        )
        .route("/memberships", get(team::member_status))
        .route("/projects/:id/sprints", get(sprints::sprint_list))
        .route("/sprints", post(sprints::sprint_create))
        .route(
            "/sprints/:id",
            get(sprints::sprint_get)
                .put(sprints::sprint_update)
                .delete(sprints::sprint_delete),
        )
        .route("/sprints/:id/tasks", get(tasks::task_list))
        .route("/tasks", post(tasks::task_create))
        .route(
            "/tasks/:id",
            get(tasks::task_get)
                .put(tasks::task_update)
                .delete(tasks::task_delete),
        )
        .route("/tasks/:id/notes", put(tasks::task_update_notes))
        .route("/tasks/:id/blocks", put(tasks::task_update_blocks))
        .layer(middleware::from_fn_with_state(state, identity_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Agility API (Rust)",
            "version": version,
            "description": "Agile project management backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "users": "/users (public - token validation)",
                "projects": "/projects[/:id] (protected)",
                "team": "/projects/:id/team[/:user_id] (protected)",
                "memberships": "/memberships (protected)",
                "sprints": "/sprints[/:id], /projects/:id/sprints (protected)",
                "tasks": "/tasks[/:id], /sprints/:id/tasks (protected)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
