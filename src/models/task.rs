use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description. Maximum length of 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// A task as stored and returned by the API.
///
/// `owner_id` is set from the creating user at insert time and never changes
/// afterwards; every mutation is gated on it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Identifier of the user who created and owns the task.
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` from `TaskInput` and the creator's id.
    pub fn new(input: TaskInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation_binds_owner() {
        let input = TaskInput {
            title: "Test Task".to_string(),
            description: Some("Test Description".to_string()),
        };

        let task = Task::new(input, 1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.owner_id, 1);
    }

    #[test]
    fn test_task_input_validation() {
        let valid_input = TaskInput {
            title: "Valid Task".to_string(),
            description: Some("Valid Description".to_string()),
        };
        assert!(valid_input.validate().is_ok());

        let empty_title = TaskInput {
            title: "".to_string(),
            description: None,
        };
        assert!(empty_title.validate().is_err());

        let long_title = TaskInput {
            title: "a".repeat(201),
            description: None,
        };
        assert!(long_title.validate().is_err());

        let long_description = TaskInput {
            title: "Valid".to_string(),
            description: Some("b".repeat(1001)),
        };
        assert!(long_description.validate().is_err());
    }
}
