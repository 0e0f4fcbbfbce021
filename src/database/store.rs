use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::Database;

use crate::database::manager::DatastoreError;

/// Collection names, as laid out by the original Agility schema
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROJECTS: &str = "projects";
    pub const TEAM: &str = "team";
    pub const SPRINTS: &str = "sprints";
    pub const TASKS: &str = "tasks";
}

/// Minimal document-collection capability set the repositories are written
/// against. Backends: [`MongoStore`] for production, `MemoryStore` for tests
/// and local development.
///
/// Filters are plain BSON documents; the repositories only ever use top-level
/// equality and `{"$in": [..]}`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, filter: Document)
        -> Result<Vec<Document>, DatastoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, DatastoreError>;

    async fn insert_one(&self, collection: &str, document: Document)
        -> Result<(), DatastoreError>;

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), DatastoreError>;

    /// Set the given fields on the first matching document. Returns the
    /// matched count (0 when nothing matched).
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<u64, DatastoreError>;

    /// Returns the number of deleted documents
    async fn delete_one(&self, collection: &str, filter: Document)
        -> Result<u64, DatastoreError>;

    /// Returns the number of deleted documents
    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, DatastoreError>;

    /// Liveness probe against the backend
    async fn ping(&self) -> Result<(), DatastoreError>;
}

/// Parse a path/id string into an ObjectId, mapping malformed input to
/// `InvalidId` rather than a driver error.
pub fn parse_object_id(id: &str) -> Result<ObjectId, DatastoreError> {
    ObjectId::parse_str(id).map_err(|_| DatastoreError::InvalidId(id.to_string()))
}

/// MongoDB-backed document store
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Vec<Document>, DatastoreError> {
        let cursor = self.collection(collection).find(filter).await?;
        let documents = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, DatastoreError> {
        let document = self.collection(collection).find_one(filter).await?;
        Ok(document)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), DatastoreError> {
        self.collection(collection).insert_one(document).await?;
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), DatastoreError> {
        if documents.is_empty() {
            return Ok(());
        }
        self.collection(collection).insert_many(documents).await?;
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<u64, DatastoreError> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": set })
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, DatastoreError> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, DatastoreError> {
        let result = self.collection(collection).delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), DatastoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
