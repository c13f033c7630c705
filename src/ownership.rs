//!
//! # Ownership Authorizer
//!
//! Per-mutation check that the acting identity owns the target task. Callers
//! confirm existence first (that failure is `NotFound`); a mismatch here is
//! always `Forbidden`, and the two kinds are never conflated.

use crate::error::{AppError, ErrorKind};
use crate::models::{Task, User};

/// Fails `Forbidden` unless `user` owns `task`. Value equality on the ids.
pub fn authorize_owner(user: &User, task: &Task) -> Result<(), AppError> {
    if task.owner_id == user.id {
        Ok(())
    } else {
        Err(AppError::new(ErrorKind::Forbidden))
    }
}
