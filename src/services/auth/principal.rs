use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::{error::RepoResult, user_repo};

/// An identity a request can act as. Credentials stay in the user store;
/// password checks happen at login, never per request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub identifier: String,
    pub authorities: Vec<String>,
}

impl From<user_repo::UserRow> for Principal {
    fn from(row: user_repo::UserRow) -> Self {
        Self {
            id: row.id,
            identifier: row.identifier,
            authorities: row.authorities,
        }
    }
}

/// Read-only lookup of principals by their unique identifier.
///
/// - `Ok(None)`: unknown identifier
/// - `Err(_)`: backend failure (callers must fail closed)
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<Principal>>;
}

/// `users` table backed store.
#[derive(Clone, Debug)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<Principal>> {
        let row = user_repo::find_by_identifier(&self.pool, identifier).await?;
        Ok(row.map(Principal::from))
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;

    use super::*;
    use crate::repos::error::RepoError;

    /// Fixed in-memory store for tests. `failing()` simulates an unavailable backend.
    #[derive(Default)]
    pub struct InMemoryPrincipalStore {
        principals: HashMap<String, Principal>,
        fail: bool,
    }

    impl InMemoryPrincipalStore {
        pub fn with(identifiers: &[&str]) -> Self {
            let principals = identifiers
                .iter()
                .map(|id| {
                    (
                        id.to_string(),
                        Principal {
                            id: Uuid::new_v4(),
                            identifier: id.to_string(),
                            authorities: vec!["ROLE_USER".to_string()],
                        },
                    )
                })
                .collect();

            Self {
                principals,
                fail: false,
            }
        }

        /// Resolves `lookup` to a principal whose identifier differs from it.
        pub fn aliased(lookup: &str, identifier: &str) -> Self {
            let mut store = Self::with(&[identifier]);
            if let Some(principal) = store.principals.remove(identifier) {
                store.principals.insert(lookup.to_string(), principal);
            }
            store
        }

        pub fn failing() -> Self {
            Self {
                principals: HashMap::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl PrincipalStore for InMemoryPrincipalStore {
        async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<Principal>> {
            if self.fail {
                return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
            }
            Ok(self.principals.get(identifier).cloned())
        }
    }
}
