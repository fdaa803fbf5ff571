//! Entity Model
//!
//! TigerStyle: Explicit types per entity, explicit patch structs.
//!
//! Wire format is camelCase JSON (`userId`). Patches carry only the fields
//! an update may touch; unknown JSON fields are dropped during
//! deserialization and never reach a stored record.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::store::Record;

// =============================================================================
// Entity Trait
// =============================================================================

/// A record kind exposed over the REST transport and listed by the
/// controller.
pub trait Entity: Record + Serialize + serde::de::DeserializeOwned {
    /// Collection path segment ("users")
    const COLLECTION: &'static str;

    /// Lowercase singular noun for messages ("user")
    const NOUN: &'static str;

    /// Field values the list search matches against.
    ///
    /// Posts resolve their author through the directory.
    fn search_fields<'a>(&'a self, directory: &'a UserDirectory) -> Vec<Cow<'a, str>>;
}

// =============================================================================
// User
// =============================================================================

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    /// Unique, case-insensitive
    pub username: String,
    /// Unique, case-insensitive
    pub email: String,
}

/// Fields for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Partial update for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserPatch {
    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.username.is_none() && self.email.is_none()
    }
}

impl Record for User {
    const KIND: &'static str = "User";
    type Draft = NewUser;
    type Patch = UserPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: NewUser) -> Self {
        Self {
            id,
            name: draft.name,
            username: draft.username,
            email: draft.email,
        }
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const NOUN: &'static str = "user";

    fn search_fields<'a>(&'a self, _directory: &'a UserDirectory) -> Vec<Cow<'a, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.username.as_str()),
            Cow::Borrowed(self.email.as_str()),
        ]
    }
}

// =============================================================================
// Post
// =============================================================================

/// A post record.
///
/// `user_id` is a plain reference; nothing checks that the user exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
}

/// Fields for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub user_id: u64,
    pub title: String,
}

/// Partial update for a post. The author cannot be reassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Record for Post {
    const KIND: &'static str = "Post";
    type Draft = NewPost;
    type Patch = PostPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: NewPost) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            title: draft.title,
        }
    }

    fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
    }
}

impl Entity for Post {
    const COLLECTION: &'static str = "posts";
    const NOUN: &'static str = "post";

    fn search_fields<'a>(&'a self, directory: &'a UserDirectory) -> Vec<Cow<'a, str>> {
        vec![
            Cow::Borrowed(self.title.as_str()),
            directory.author_label(self.user_id),
        ]
    }
}

// =============================================================================
// User Directory
// =============================================================================

/// Lookup from user id to display name, used to resolve post authors.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<u64, String>,
    usernames: HashMap<u64, String>,
}

impl UserDirectory {
    /// Build a directory from a fetched user collection.
    pub fn from_users(users: &[User]) -> Self {
        Self {
            names: users.iter().map(|u| (u.id, u.name.clone())).collect(),
            usernames: users.iter().map(|u| (u.id, u.username.clone())).collect(),
        }
    }

    /// Author name, or `User {id}` when the user no longer exists.
    pub fn author_label(&self, user_id: u64) -> Cow<'_, str> {
        match self.names.get(&user_id) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(format!("User {user_id}")),
        }
    }

    /// Picker label, e.g. `Leanne Graham (@Bret)`.
    pub fn option_label(&self, user_id: u64) -> Option<String> {
        let name = self.names.get(&user_id)?;
        let username = self.usernames.get(&user_id)?;
        Some(format!("{name} (@{username})"))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn leanne() -> User {
        User {
            id: 1,
            name: "Leanne Graham".to_string(),
            username: "Bret".to_string(),
            email: "Sincere@april.biz".to_string(),
        }
    }

    #[test]
    fn test_post_wire_format_is_camel_case() {
        let post = Post {
            id: 2,
            user_id: 1,
            title: "qui est esse".to_string(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 2, "userId": 1, "title": "qui est esse"})
        );
    }

    #[test]
    fn test_patch_ignores_unknown_fields() {
        let patch: UserPatch =
            serde_json::from_str(r#"{"name": "New", "id": 99, "role": "admin"}"#).unwrap();
        let mut user = leanne();

        user.apply(patch);

        assert_eq!(user.id, 1);
        assert_eq!(user.name, "New");
        assert_eq!(user.username, "Bret");
    }

    #[test]
    fn test_post_patch_cannot_move_author() {
        let patch: PostPatch =
            serde_json::from_str(r#"{"userId": 5, "title": "retitled"}"#).unwrap();
        let mut post = Post {
            id: 1,
            user_id: 1,
            title: "old".to_string(),
        };

        post.apply(patch);

        assert_eq!(post.user_id, 1);
        assert_eq!(post.title, "retitled");
    }

    #[test]
    fn test_directory_fallback_label() {
        let directory = UserDirectory::from_users(&[leanne()]);

        assert_eq!(directory.author_label(1), "Leanne Graham");
        assert_eq!(directory.author_label(14), "User 14");
        assert_eq!(
            directory.option_label(1).as_deref(),
            Some("Leanne Graham (@Bret)")
        );
        assert_eq!(directory.option_label(14), None);
    }

    #[test]
    fn test_post_search_fields_include_author() {
        let directory = UserDirectory::from_users(&[leanne()]);
        let post = Post {
            id: 1,
            user_id: 1,
            title: "qui est esse".to_string(),
        };

        let fields = post.search_fields(&directory);

        assert_eq!(fields, vec!["qui est esse", "Leanne Graham"]);
    }
}
