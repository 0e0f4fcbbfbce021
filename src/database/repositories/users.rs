use mongodb::bson::{doc, from_document, to_document};
use std::sync::Arc;

use crate::database::manager::DatastoreError;
use crate::database::models::User;
use crate::database::store::{collections, DocumentStore};

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, DatastoreError> {
        let document = self
            .store
            .find_one(collections::USERS, doc! { "_id": id })
            .await?;
        document.map(from_document).transpose().map_err(Into::into)
    }

    pub async fn get(&self, id: &str) -> Result<User, DatastoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatastoreError::NotFound(format!("user {}", id)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatastoreError> {
        let document = self
            .store
            .find_one(collections::USERS, doc! { "email": email })
            .await?;
        document.map(from_document).transpose().map_err(Into::into)
    }

    pub async fn insert(&self, user: &User) -> Result<(), DatastoreError> {
        self.store
            .insert_one(collections::USERS, to_document(user)?)
            .await
    }

    /// Full replace of the mutable profile fields; the id never changes.
    pub async fn update_profile(
        &self,
        id: &str,
        name: &str,
        email: &str,
        profile_url: &str,
    ) -> Result<(), DatastoreError> {
        let matched = self
            .store
            .update_one(
                collections::USERS,
                doc! { "_id": id },
                doc! { "name": name, "email": email, "profileURL": profile_url },
            )
            .await?;
        if matched == 0 {
            return Err(DatastoreError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }
}
