use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// A task belongs to a sprint. Notes and blocks are whole-collection replace
/// targets: callers submit the full desired sequence, never a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "sprintID")]
    pub sprint_id: ObjectId,
    pub header: String,
    pub description: String,
    pub due: DateTime,
    pub notes: Vec<String>,
    pub blocks: Vec<String>,
}
