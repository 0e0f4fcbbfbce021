use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// A sprint belongs to a project. The reference is not FK-enforced by the
/// store; the authorization engine validates it at access time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "projectID")]
    pub project_id: ObjectId,
    pub header: String,
    pub due: DateTime,
    pub description: String,
}
