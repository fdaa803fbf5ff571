//! Post Service
//!
//! No uniqueness rules. The author id must be positive but is never checked
//! against the user store.

use crate::error::{ServiceError, ServiceResult};
use crate::model::{NewPost, Post, PostPatch};
use crate::store::Deleted;

use super::{require_non_empty, require_non_empty_opt, SharedStore};

/// CRUD over the post store.
#[derive(Debug, Clone)]
pub struct PostService {
    store: SharedStore<Post>,
}

impl PostService {
    /// Create a service over an injected store.
    pub fn new(store: SharedStore<Post>) -> Self {
        Self { store }
    }

    /// All posts in id order.
    pub async fn find_all(&self) -> Vec<Post> {
        self.store.read().await.list()
    }

    /// One post by id.
    pub async fn find_one(&self, id: u64) -> ServiceResult<Post> {
        Ok(self.store.read().await.get(id)?)
    }

    /// Validate and insert a new post.
    pub async fn create(&self, data: NewPost) -> ServiceResult<Post> {
        if data.user_id == 0 {
            return Err(ServiceError::validation("userId must be a positive number"));
        }
        require_non_empty("title", &data.title)?;

        let post = self.store.write().await.insert(data);

        tracing::info!(id = post.id, user_id = post.user_id, "created post");
        Ok(post)
    }

    /// Validate and merge a patch onto an existing post.
    pub async fn update(&self, id: u64, patch: PostPatch) -> ServiceResult<Post> {
        require_non_empty_opt("title", patch.title.as_deref())?;

        let post = self.store.write().await.replace(id, patch)?;

        tracing::info!(id, "updated post");
        Ok(post)
    }

    /// Delete a post.
    pub async fn remove(&self, id: u64) -> ServiceResult<Deleted> {
        let deleted = self.store.write().await.delete(id)?;
        tracing::info!(id, "deleted post");
        Ok(deleted)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::service::shared;
    use crate::store::RecordStore;
    use tokio_test::{assert_err, assert_ok};

    fn service() -> PostService {
        PostService::new(shared(RecordStore::with_seed(seed::posts())))
    }

    #[tokio::test]
    async fn test_create_with_dangling_author() {
        let service = service();

        let post = assert_ok!(
            service
                .create(NewPost {
                    user_id: 999,
                    title: "orphan".to_string(),
                })
                .await
        );

        assert_eq!(post.id, 16);
        assert_eq!(post.user_id, 999);
    }

    #[tokio::test]
    async fn test_create_rejects_zero_author() {
        let service = service();

        let err = assert_err!(
            service
                .create(NewPost {
                    user_id: 0,
                    title: "nobody".to_string(),
                })
                .await
        );

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(service.find_all().await.len(), 15);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let service = service();

        let err = assert_err!(
            service
                .create(NewPost {
                    user_id: 1,
                    title: String::new(),
                })
                .await
        );

        assert_eq!(err, ServiceError::Validation("title should not be empty".to_string()));
    }

    #[tokio::test]
    async fn test_update_title() {
        let service = service();

        let post = assert_ok!(
            service
                .update(
                    2,
                    PostPatch {
                        title: Some("quis est esse".to_string()),
                    },
                )
                .await
        );

        assert_eq!(post.title, "quis est esse");
        assert_eq!(post.user_id, 1);
    }

    #[tokio::test]
    async fn test_update_and_remove_missing() {
        let service = service();

        let err = assert_err!(service.update(77, PostPatch::default()).await);
        assert_eq!(err.to_string(), "Post with ID 77 not found");

        let err = assert_err!(service.remove(77).await);
        assert_eq!(err, ServiceError::NotFound { kind: "Post", id: 77 });
        assert_eq!(service.find_all().await.len(), 15);
    }
}
