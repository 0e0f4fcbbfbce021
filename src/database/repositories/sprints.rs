use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, from_document, to_document, DateTime};
use std::sync::Arc;

use crate::database::manager::DatastoreError;
use crate::database::models::Sprint;
use crate::database::store::{collections, DocumentStore};

#[derive(Clone)]
pub struct SprintRepository {
    store: Arc<dyn DocumentStore>,
}

impl SprintRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        project_id: ObjectId,
        header: &str,
        due: DateTime,
        description: &str,
    ) -> Result<Sprint, DatastoreError> {
        let sprint = Sprint {
            id: ObjectId::new(),
            project_id,
            header: header.to_string(),
            due,
            description: description.to_string(),
        };
        self.store
            .insert_one(collections::SPRINTS, to_document(&sprint)?)
            .await?;
        Ok(sprint)
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Sprint, DatastoreError> {
        let document = self
            .store
            .find_one(collections::SPRINTS, doc! { "_id": *id })
            .await?;
        match document {
            Some(d) => Ok(from_document(d)?),
            None => Err(DatastoreError::NotFound(format!("sprint {}", id))),
        }
    }

    pub async fn for_project(&self, project_id: &ObjectId) -> Result<Vec<Sprint>, DatastoreError> {
        let documents = self
            .store
            .find(collections::SPRINTS, doc! { "projectID": *project_id })
            .await?;
        documents
            .into_iter()
            .map(|d| from_document(d).map_err(Into::into))
            .collect()
    }

    pub async fn update(
        &self,
        id: &ObjectId,
        header: &str,
        due: DateTime,
        description: &str,
    ) -> Result<Sprint, DatastoreError> {
        let matched = self
            .store
            .update_one(
                collections::SPRINTS,
                doc! { "_id": *id },
                doc! { "header": header, "due": due, "description": description },
            )
            .await?;
        if matched == 0 {
            return Err(DatastoreError::NotFound(format!("sprint {}", id)));
        }
        self.get(id).await
    }

    /// Deletes the sprint document only. Tasks under the sprint are left in
    /// place; with their sprint gone they drop out of every listing and
    /// become unreachable through the authorization chain. Kept to match the
    /// original semantics (see DESIGN.md).
    pub async fn delete(&self, id: &ObjectId) -> Result<(), DatastoreError> {
        let deleted = self
            .store
            .delete_one(collections::SPRINTS, doc! { "_id": *id })
            .await?;
        if deleted == 0 {
            return Err(DatastoreError::NotFound(format!("sprint {}", id)));
        }
        Ok(())
    }
}
