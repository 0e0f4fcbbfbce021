use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::IdentityConfig;
use crate::database::manager::DatastoreError;
use crate::database::models::User;
use crate::database::repositories::UserRepository;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token audience mismatch: expected {expected}, got {actual}")]
    WrongAudience { expected: String, actual: String },

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Store(#[from] DatastoreError),
}

/// Claims extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: String,
    pub name: String,
    pub email: String,
    pub picture: String,
}

/// Opaque token verification collaborator. Implementations own the expected
/// audience; the resolver never inspects tokens itself.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    picture: String,
}

/// Verifies Google ID tokens against the provider's tokeninfo endpoint.
/// Audience and endpoint are fixed at construction from injected config.
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    endpoint: String,
    audience: String,
    timeout: Duration,
}

impl GoogleTokenVerifier {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.tokeninfo_endpoint.clone(),
            audience: config.audience.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl TokenVerifier for GoogleTokenVerifier {
    async fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", token)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        // tokeninfo answers 4xx for malformed or expired tokens
        if response.status().is_client_error() {
            return Err(AuthError::InvalidToken(format!(
                "provider rejected token ({})",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !self.audience.is_empty() && info.aud != self.audience {
            return Err(AuthError::WrongAudience {
                expected: self.audience.clone(),
                actual: info.aud,
            });
        }

        Ok(TokenClaims {
            subject: info.sub,
            name: info.name,
            email: info.email,
            picture: info.picture,
        })
    }
}

/// Fixed token-to-claims mapping for tests and local development
#[derive(Default)]
pub struct StaticTokenVerifier {
    claims: HashMap<String, TokenClaims>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, claims: TokenClaims) -> Self {
        self.claims.insert(token.into(), claims);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.claims
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))
    }
}

/// Resolves an external token into a persisted user profile, creating the
/// profile on first sight and refreshing it when the provider's claims have
/// drifted from the stored fields.
#[derive(Clone)]
pub struct IdentityResolver {
    verifier: Arc<dyn TokenVerifier>,
    users: UserRepository,
}

impl IdentityResolver {
    pub fn new(verifier: Arc<dyn TokenVerifier>, users: UserRepository) -> Self {
        Self { verifier, users }
    }

    /// Idempotent: repeated calls with an unchanged token write nothing
    /// after the first creation.
    pub async fn resolve(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.verifier.verify(token).await?;

        match self.users.find_by_id(&claims.subject).await? {
            None => {
                let user = User {
                    id: claims.subject,
                    name: claims.name,
                    email: claims.email,
                    profile_url: claims.picture,
                };
                self.users.insert(&user).await?;
                debug!("Created user profile {}", user.id);
                Ok(user)
            }
            Some(existing) => {
                // Field-by-field comparison, not partial patch semantics
                let changed = existing.name != claims.name
                    || existing.email != claims.email
                    || existing.profile_url != claims.picture;
                if !changed {
                    return Ok(existing);
                }

                self.users
                    .update_profile(&existing.id, &claims.name, &claims.email, &claims.picture)
                    .await?;
                debug!("Refreshed user profile {}", existing.id);
                Ok(User {
                    id: existing.id,
                    name: claims.name,
                    email: claims.email,
                    profile_url: claims.picture,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::store::DocumentStore;
    use mongodb::bson::{doc, Document};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Delegating store that counts writes, to pin idempotence down to the
    /// exact number of persisted operations.
    struct CountingStore {
        inner: MemoryStore,
        inserts: AtomicUsize,
        updates: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                inserts: AtomicUsize::new(0),
                updates: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn find(
            &self,
            collection: &str,
            filter: Document,
        ) -> Result<Vec<Document>, DatastoreError> {
            self.inner.find(collection, filter).await
        }

        async fn find_one(
            &self,
            collection: &str,
            filter: Document,
        ) -> Result<Option<Document>, DatastoreError> {
            self.inner.find_one(collection, filter).await
        }

        async fn insert_one(
            &self,
            collection: &str,
            document: Document,
        ) -> Result<(), DatastoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            self.inner.insert_one(collection, document).await
        }

        async fn insert_many(
            &self,
            collection: &str,
            documents: Vec<Document>,
        ) -> Result<(), DatastoreError> {
            self.inserts.fetch_add(documents.len(), Ordering::SeqCst);
            self.inner.insert_many(collection, documents).await
        }

        async fn update_one(
            &self,
            collection: &str,
            filter: Document,
            set: Document,
        ) -> Result<u64, DatastoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update_one(collection, filter, set).await
        }

        async fn delete_one(
            &self,
            collection: &str,
            filter: Document,
        ) -> Result<u64, DatastoreError> {
            self.inner.delete_one(collection, filter).await
        }

        async fn delete_many(
            &self,
            collection: &str,
            filter: Document,
        ) -> Result<u64, DatastoreError> {
            self.inner.delete_many(collection, filter).await
        }

        async fn ping(&self) -> Result<(), DatastoreError> {
            self.inner.ping().await
        }
    }

    fn claims(name: &str) -> TokenClaims {
        TokenClaims {
            subject: "google-sub-1".to_string(),
            name: name.to_string(),
            email: "alice@example.com".to_string(),
            picture: "https://example.com/alice.png".to_string(),
        }
    }

    #[tokio::test]
    async fn unchanged_token_writes_once() {
        let store = Arc::new(CountingStore::new());
        let verifier = Arc::new(StaticTokenVerifier::new().with_token("tok", claims("Alice")));
        let resolver = IdentityResolver::new(verifier, UserRepository::new(store.clone()));

        let first = resolver.resolve("tok").await.unwrap();
        let second = resolver.resolve("tok").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);

        let rows = store.inner.find("users", doc! {}).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn changed_name_triggers_exactly_one_update() {
        let store = Arc::new(CountingStore::new());
        let verifier = Arc::new(
            StaticTokenVerifier::new()
                .with_token("tok-v1", claims("Alice"))
                .with_token("tok-v2", claims("Alicia")),
        );
        let resolver = IdentityResolver::new(verifier, UserRepository::new(store.clone()));

        resolver.resolve("tok-v1").await.unwrap();
        let renamed = resolver.resolve("tok-v2").await.unwrap();
        assert_eq!(renamed.name, "Alicia");
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);

        // Settles: same token again is a pure read
        resolver.resolve("tok-v2").await.unwrap();
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let verifier = Arc::new(StaticTokenVerifier::new());
        let resolver = IdentityResolver::new(verifier, UserRepository::new(store));

        let err = resolver.resolve("bogus").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
