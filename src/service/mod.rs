//! Entity Services
//!
//! TigerStyle: One service per entity kind, each owning an injected store.
//!
//! Every call takes the store lock for exactly one synchronous store
//! operation, so mutations never interleave.

pub mod posts;
pub mod users;

pub use posts::PostService;
pub use users::UserService;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{ServiceError, ServiceResult};
use crate::model::{Post, User};
use crate::seed;
use crate::store::{Record, RecordStore};

/// Thread-safe record store
pub type SharedStore<R> = Arc<RwLock<RecordStore<R>>>;

/// Wrap a store for sharing between handlers.
pub fn shared<R: Record>(store: RecordStore<R>) -> SharedStore<R> {
    Arc::new(RwLock::new(store))
}

/// Services handed to the transport layer.
#[derive(Debug, Clone)]
pub struct AppState {
    pub users: UserService,
    pub posts: PostService,
}

impl AppState {
    /// State backed by the given stores.
    pub fn new(users: RecordStore<User>, posts: RecordStore<Post>) -> Self {
        Self {
            users: UserService::new(shared(users)),
            posts: PostService::new(shared(posts)),
        }
    }

    /// State populated with the seed records.
    pub fn seeded() -> Self {
        Self::new(
            RecordStore::with_seed(seed::users()),
            RecordStore::with_seed(seed::posts()),
        )
    }
}

/// Reject an empty (or whitespace-only) string field.
pub(crate) fn require_non_empty(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{field} should not be empty")));
    }
    Ok(())
}

/// Reject a patch field that is present but empty.
pub(crate) fn require_non_empty_opt(field: &str, value: Option<&str>) -> ServiceResult<()> {
    match value {
        Some(value) => require_non_empty(field, value),
        None => Ok(()),
    }
}
