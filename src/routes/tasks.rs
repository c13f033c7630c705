use crate::{
    auth::CurrentUser,
    error::{AppError, ErrorKind},
    models::{Task, TaskInput},
    ownership::authorize_owner,
    store::TaskStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's tasks, newest first.
#[get("")]
pub async fn get_tasks(
    store: web::Data<dyn TaskStore>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = store.list_by_owner(user.0.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// The owner is always the acting identity; it is not accepted from the
/// request body and never changes afterwards.
#[post("")]
pub async fn create_task(
    store: web::Data<dyn TaskStore>,
    payload: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let task = Task::new(payload.into_inner(), user.0.id);
    let created = store.insert(&task).await?;

    log::info!("Task created {} by user {}", created.id, user.0.id);
    Ok(HttpResponse::Created().json(created))
}

/// Retrieves a single task by id.
///
/// Existence is checked before ownership, so a missing task is 404 while
/// someone else's task is 403; the two are never conflated.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = store
        .find_by_id(task_id.into_inner())
        .await?
        .ok_or(AppError::new(ErrorKind::NotFound))?;

    authorize_owner(&user.0, &task)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates a task the authenticated user owns.
#[put("/{id}")]
pub async fn update_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    payload: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    payload.validate()?;
    let id = task_id.into_inner();

    let task = store
        .find_by_id(id)
        .await?
        .ok_or(AppError::new(ErrorKind::NotFound))?;
    authorize_owner(&user.0, &task)?;

    // The task can vanish between the check and the write; that is still a
    // plain not-found, not an authorization failure.
    let updated = store
        .update(id, &payload)
        .await?
        .ok_or(AppError::new(ErrorKind::NotFound))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task the authenticated user owns.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();

    let task = store
        .find_by_id(id)
        .await?
        .ok_or(AppError::new(ErrorKind::NotFound))?;
    authorize_owner(&user.0, &task)?;

    if !store.delete(id).await? {
        return Err(AppError::new(ErrorKind::NotFound));
    }

    log::info!("Task deleted {}", id);
    Ok(HttpResponse::NoContent().finish())
}
