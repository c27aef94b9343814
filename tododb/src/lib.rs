//! # tododb
//!
//! Persistence and account layer for a multi-user to-do list.
//!
//! [`TodoDb`] wraps a SeaORM [`DatabaseConnection`](sea_orm::DatabaseConnection) and
//! brings the schema up to date on connect. On top of it sit two stores:
//! [`TodoStore`] for owner-scoped task CRUD and [`UserStore`] for registration,
//! password login and Google sign-in.
//!
//! ## Quick start
//!
//! ```ignore
//! use tododb::{TodoDbBuilder, TodoStore};
//!
//! let db = TodoDbBuilder::new("sqlite:./todos.db?mode=rwc").build().await?;
//! let todos = TodoStore::new(db.clone());
//!
//! let todo = todos.create(user_id, "buy milk").await?;
//! todos.toggle(user_id, todo.id).await?;
//! ```
//!
//! ## Key types
//!
//! - [`TodoDb`] / [`TodoDbBuilder`]: pooled connection with migrations applied
//! - [`TodoStore`]: list, create, toggle and delete tasks for one owner
//! - [`UserStore`]: accounts, password verification, Google account linking
//! - [`SessionKeys`]: issue and verify the signed session token
//! - [`IdentityVerifier`] / [`GoogleVerifier`]: external ID token verification
//! - [`TodoError`]: the error every fallible operation returns

pub mod connection;
pub mod contract;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod google;
pub mod migration;
pub mod password;
pub mod session;
pub mod todos;
pub mod users;

pub use connection::{TodoDb, TodoDbBuilder};
pub use contract::{CreateTodo, Credentials, Deleted, GoogleLogin, Procedure, TodoId, UserProfile};
pub use error::TodoError;
pub use google::{ExternalIdentity, GoogleVerifier, IdentityVerifier};
pub use session::{SESSION_TTL_SECS, SessionClaims, SessionKeys};
pub use todos::TodoStore;
pub use users::UserStore;

// Re-export sea-orm for users of the library
pub use sea_orm;
