//! User Service
//!
//! Enforces case-insensitive uniqueness of email and username. Email is
//! always checked before username, and an update never conflicts with the
//! record being updated.

use crate::error::{ServiceError, ServiceResult};
use crate::model::{NewUser, User, UserPatch};
use crate::store::{Deleted, RecordStore};

use super::{require_non_empty, require_non_empty_opt, SharedStore};

/// CRUD over the user store.
#[derive(Debug, Clone)]
pub struct UserService {
    store: SharedStore<User>,
}

impl UserService {
    /// Create a service over an injected store.
    pub fn new(store: SharedStore<User>) -> Self {
        Self { store }
    }

    /// All users in id order.
    pub async fn find_all(&self) -> Vec<User> {
        self.store.read().await.list()
    }

    /// One user by id.
    pub async fn find_one(&self, id: u64) -> ServiceResult<User> {
        Ok(self.store.read().await.get(id)?)
    }

    /// Validate and insert a new user.
    pub async fn create(&self, data: NewUser) -> ServiceResult<User> {
        require_non_empty("name", &data.name)?;
        require_non_empty("username", &data.username)?;
        require_non_empty("email", &data.email)?;

        let mut store = self.store.write().await;
        check_unique(&store, None, Some(&data.email), Some(&data.username))?;
        let user = store.insert(data);

        tracing::info!(id = user.id, username = %user.username, "created user");
        Ok(user)
    }

    /// Validate and merge a patch onto an existing user.
    pub async fn update(&self, id: u64, patch: UserPatch) -> ServiceResult<User> {
        require_non_empty_opt("name", patch.name.as_deref())?;
        require_non_empty_opt("username", patch.username.as_deref())?;
        require_non_empty_opt("email", patch.email.as_deref())?;

        let mut store = self.store.write().await;
        // NotFound wins over Conflict
        store.get(id)?;
        check_unique(
            &store,
            Some(id),
            patch.email.as_deref(),
            patch.username.as_deref(),
        )?;
        let user = store.replace(id, patch)?;

        tracing::info!(id, "updated user");
        Ok(user)
    }

    /// Delete a user. Their posts are left in place.
    pub async fn remove(&self, id: u64) -> ServiceResult<Deleted> {
        let deleted = self.store.write().await.delete(id)?;
        tracing::info!(id, "deleted user");
        Ok(deleted)
    }
}

/// Scan other records for a clashing email, then a clashing username.
fn check_unique(
    store: &RecordStore<User>,
    exclude: Option<u64>,
    email: Option<&str>,
    username: Option<&str>,
) -> ServiceResult<()> {
    let others = move || store.iter().filter(move |u| Some(u.id) != exclude);

    if let Some(email) = email {
        if others().any(|u| lower_eq(&u.email, email)) {
            tracing::warn!(%email, "email conflict");
            return Err(ServiceError::conflict(format!("Email {email} is already in use")));
        }
    }

    if let Some(username) = username {
        if others().any(|u| lower_eq(&u.username, username)) {
            tracing::warn!(%username, "username conflict");
            return Err(ServiceError::conflict(format!(
                "Username {username} is already taken"
            )));
        }
    }

    Ok(())
}

fn lower_eq(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

// =============================================================================
// Tests
// =============================================================================
