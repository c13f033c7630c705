//!
//! # Persistence Collaborators
//!
//! The auth pipeline and the task routes never touch the database directly;
//! they go through the `UserStore` and `TaskStore` traits defined here. The
//! production implementations live in [`postgres`]; [`memory`] provides
//! lock-based in-memory stores used by the test suites and local runs.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskInput, User, UserRecord};
use async_trait::async_trait;
use uuid::Uuid;

/// User persistence contract.
///
/// `find_by_email` is the only lookup that returns the stored password hash
/// (as a [`UserRecord`]); it exists solely for the login path. Every other
/// lookup returns [`User`] with the hash already excluded.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Persists a new account. Rejects duplicate email or google_id with
    /// `AlreadyRegistered` as a storage-layer backstop; callers are expected
    /// to have checked first.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError>;

    async fn insert(&self, task: &Task) -> Result<Task, AppError>;

    /// Applies the input to an existing task. Returns `None` when the task
    /// disappeared between the caller's existence check and the update.
    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Option<Task>, AppError>;

    /// Returns whether a row was actually removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
