//! Postboard - Users & Posts Board
//!
//! TigerStyle: A small two-entity CRUD system, service and client in one crate.
//!
//! Features:
//! - In-memory record stores with monotonic, never-reused ids
//! - Entity services with validation and user uniqueness rules
//! - REST transport (axum) and a remote client (reqwest)
//! - A list controller: search, pagination, bulk selection, delete-and-refetch
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  render / CLI          │ terminal output    │
//! │  controller + listing  │ list state         │
//! │  client                │ reqwest            │
//! ├─────────────────────────────────────────────┤
//! │  api                   │ axum router        │
//! │  service               │ users, posts       │
//! │  store                 │ RecordStore<R>     │
//! └─────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod listing;
pub mod model;
pub mod render;
pub mod seed;
pub mod service;
pub mod store;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Application name
pub const APP_NAME: &str = "postboard";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Records shown per list page
pub const PAGE_SIZE: usize = 10;

// Re-export common types
pub use client::{ClientError, RecordApi, RemoteClient};
pub use controller::{ListController, Notice, PendingDelete};
pub use error::{ServiceError, ServiceResult};
pub use model::{Entity, NewPost, NewUser, Post, PostPatch, User, UserDirectory, UserPatch};
pub use service::{AppState, PostService, UserService};
pub use store::{Record, RecordStore, StoreError};
