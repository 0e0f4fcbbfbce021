use serde::{Deserialize, Serialize};

/// A user profile, keyed by the identity provider's subject id.
///
/// The id is immutable once created; profile fields are refreshed from token
/// claims whenever the provider reports changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "profileURL")]
    pub profile_url: String,
}
