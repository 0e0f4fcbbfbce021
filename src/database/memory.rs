use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::database::manager::DatastoreError;
use crate::database::store::DocumentStore;

/// In-memory document store. Backs the test suite and local development
/// without a running MongoDB; implements the filter subset the repositories
/// use (top-level equality and `$in`).
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(document: &Document, filter: &Document) -> bool {
        filter.iter().all(|(key, condition)| {
            let value = document.get(key);
            match condition {
                Bson::Document(cond) if cond.contains_key("$in") => match cond.get("$in") {
                    Some(Bson::Array(candidates)) => {
                        value.is_some_and(|v| candidates.contains(v))
                    }
                    _ => false,
                },
                other => value == Some(other),
            }
        })
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Vec<Document>, DatastoreError> {
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| Self::matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, DatastoreError> {
        let collections = self.collections.read().await;
        let document = collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| Self::matches(d, &filter)).cloned());
        Ok(document)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), DatastoreError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), DatastoreError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<u64, DatastoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter_mut().find(|d| Self::matches(d, &filter)) {
            Some(target) => {
                for (key, value) in set {
                    target.insert(key, value);
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, DatastoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| Self::matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, DatastoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !Self::matches(d, &filter));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), DatastoreError> {
        Ok(())
    }
}
