use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, from_document, to_bson, to_document, DateTime};
use std::sync::Arc;

use crate::database::manager::DatastoreError;
use crate::database::models::Task;
use crate::database::store::{collections, DocumentStore};

#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn DocumentStore>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        sprint_id: ObjectId,
        header: &str,
        description: &str,
        due: DateTime,
        notes: Vec<String>,
        blocks: Vec<String>,
    ) -> Result<Task, DatastoreError> {
        let task = Task {
            id: ObjectId::new(),
            sprint_id,
            header: header.to_string(),
            description: description.to_string(),
            due,
            notes,
            blocks,
        };
        self.store
            .insert_one(collections::TASKS, to_document(&task)?)
            .await?;
        Ok(task)
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Task, DatastoreError> {
        let document = self
            .store
            .find_one(collections::TASKS, doc! { "_id": *id })
            .await?;
        match document {
            Some(d) => Ok(from_document(d)?),
            None => Err(DatastoreError::NotFound(format!("task {}", id))),
        }
    }

    pub async fn for_sprint(&self, sprint_id: &ObjectId) -> Result<Vec<Task>, DatastoreError> {
        let documents = self
            .store
            .find(collections::TASKS, doc! { "sprintID": *sprint_id })
            .await?;
        documents
            .into_iter()
            .map(|d| from_document(d).map_err(Into::into))
            .collect()
    }

    /// Full replace of every mutable field, notes and blocks included. The
    /// caller submits the complete desired state.
    pub async fn update(
        &self,
        id: &ObjectId,
        header: &str,
        description: &str,
        due: DateTime,
        notes: Vec<String>,
        blocks: Vec<String>,
    ) -> Result<Task, DatastoreError> {
        let matched = self
            .store
            .update_one(
                collections::TASKS,
                doc! { "_id": *id },
                doc! {
                    "header": header,
                    "description": description,
                    "due": due,
                    "notes": to_bson(&notes)?,
                    "blocks": to_bson(&blocks)?,
                },
            )
            .await?;
        if matched == 0 {
            return Err(DatastoreError::NotFound(format!("task {}", id)));
        }
        self.get(id).await
    }

    /// Whole-collection replace of the notes sequence
    pub async fn update_notes(
        &self,
        id: &ObjectId,
        notes: Vec<String>,
    ) -> Result<Task, DatastoreError> {
        let matched = self
            .store
            .update_one(
                collections::TASKS,
                doc! { "_id": *id },
                doc! { "notes": to_bson(&notes)? },
            )
            .await?;
        if matched == 0 {
            return Err(DatastoreError::NotFound(format!("task {}", id)));
        }
        self.get(id).await
    }

    /// Whole-collection replace of the blocks sequence
    pub async fn update_blocks(
        &self,
        id: &ObjectId,
        blocks: Vec<String>,
    ) -> Result<Task, DatastoreError> {
        let matched = self
            .store
            .update_one(
                collections::TASKS,
                doc! { "_id": *id },
                doc! { "blocks": to_bson(&blocks)? },
            )
            .await?;
        if matched == 0 {
            return Err(DatastoreError::NotFound(format!("task {}", id)));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<(), DatastoreError> {
        let deleted = self
            .store
            .delete_one(collections::TASKS, doc! { "_id": *id })
            .await?;
        if deleted == 0 {
            return Err(DatastoreError::NotFound(format!("task {}", id)));
        }
        Ok(())
    }
}
