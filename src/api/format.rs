//! Wire format for API payloads. Storage models carry BSON types (ObjectId,
//! BSON datetimes); the public surface speaks hex id strings and RFC 3339
//! timestamps, so every response goes through one of these converters.

use mongodb::bson::DateTime;
use serde_json::{json, Value};

use crate::database::models::{Membership, Project, Sprint, Task, User};
use crate::error::ApiError;

/// Parse an RFC 3339 timestamp from API input
pub fn parse_due(value: &str) -> Result<DateTime, ApiError> {
    DateTime::parse_rfc3339_str(value).map_err(|_| {
        let mut field_errors = std::collections::HashMap::new();
        field_errors.insert(
            "due".to_string(),
            format!("Invalid RFC 3339 timestamp: {}", value),
        );
        ApiError::validation_error("Invalid field format", Some(field_errors))
    })
}

fn format_due(due: DateTime) -> String {
    due.try_to_rfc3339_string()
        .unwrap_or_else(|_| due.timestamp_millis().to_string())
}

pub fn user_to_api_value(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "profileURL": user.profile_url,
    })
}

pub fn project_to_api_value(project: &Project) -> Value {
    json!({
        "id": project.id.to_hex(),
        "name": project.name,
        "description": project.description,
    })
}

pub fn membership_to_api_value(membership: &Membership) -> Value {
    json!({
        "projectID": membership.project_id.to_hex(),
        "userID": membership.user_id,
        "role": membership.role,
    })
}

pub fn sprint_to_api_value(sprint: &Sprint) -> Value {
    json!({
        "id": sprint.id.to_hex(),
        "projectID": sprint.project_id.to_hex(),
        "header": sprint.header,
        "due": format_due(sprint.due),
        "description": sprint.description,
    })
}

pub fn task_to_api_value(task: &Task) -> Value {
    json!({
        "id": task.id.to_hex(),
        "sprintID": task.sprint_id.to_hex(),
        "header": task.header,
        "description": task.description,
        "due": format_due(task.due),
        "notes": task.notes,
        "blocks": task.blocks,
    })
}
