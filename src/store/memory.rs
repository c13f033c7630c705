//! In-memory store implementations.
//!
//! Back the integration tests and database-free local runs. Same contract as
//! the Postgres stores, including the duplicate-account backstop.

use crate::error::{AppError, ErrorKind};
use crate::models::{NewUser, Task, TaskInput, User, UserRecord};
use crate::store::{TaskStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserRecord>>,
    next_id: AtomicI32,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|record| record.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|record| record.google_id.as_deref() == Some(google_id))
            .cloned()
            .map(UserRecord::into_user))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .map(UserRecord::into_user))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();

        let duplicate = users.iter().any(|record| {
            (new_user.email.is_some() && record.email == new_user.email)
                || (new_user.google_id.is_some() && record.google_id == new_user.google_id)
        });
        if duplicate {
            return Err(AppError::new(ErrorKind::AlreadyRegistered));
        }

        let record = UserRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: new_user.username,
            email: new_user.email,
            google_id: new_user.google_id,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record.into_user())
    }
}

#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.lock().unwrap();
        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn insert(&self, task: &Task) -> Result<Task, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        Ok(tasks.get_mut(&id).map(|task| {
            task.title = input.title.clone();
            task.description = input.description.clone();
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        Ok(tasks.remove(&id).is_some())
    }
}
