//! `sqlx`-backed store implementations.
//!
//! Queries are bound at runtime so the crate builds without a live database.
//! Unique-constraint violations on users (email, google_id) are translated
//! to `AlreadyRegistered`; every other driver failure surfaces through the
//! `From<sqlx::Error>` conversion as `DatabaseUnavailable`.

use crate::error::{AppError, ErrorKind};
use crate::models::{NewUser, Task, TaskInput, User, UserRecord};
use crate::store::{TaskStore, UserStore};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

fn map_unique_violation(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::new(ErrorKind::AlreadyRegistered);
        }
    }
    error.into()
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, google_id, password_hash, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, google_id, created_at \
             FROM users WHERE google_id = $1",
        )
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        // The password hash is deliberately not selected here; callers of
        // this lookup (the auth middleware in particular) must never see it.
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, google_id, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, google_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, email, google_id, created_at",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.google_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }
}

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, owner_id, created_at, updated_at \
             FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, owner_id, created_at, updated_at \
             FROM tasks WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn insert(&self, task: &Task) -> Result<Task, AppError> {
        let inserted = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, title, description, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, title, description, owner_id, created_at, updated_at",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.owner_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Option<Task>, AppError> {
        // owner_id is never part of the SET list; ownership is immutable.
        let updated = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET title = $1, description = $2, updated_at = NOW() \
             WHERE id = $3 \
             RETURNING id, title, description, owner_id, created_at, updated_at",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
