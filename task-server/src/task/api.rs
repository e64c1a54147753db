use crate::task::{TaskService, TaskServiceError, TaskState};
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use task_store::{NewTask, Task, TaskPatch};
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Identifier, unique within the data file
    pub id: u32,
    /// What needs doing
    pub description: String,
    /// Whether the task is done
    pub completed: bool,
    /// Free-form due date
    pub due_date: Option<String>,
    /// Free-form priority, "Medium" unless given
    pub priority: String,
    /// ISO-8601 creation time, in the same form it is stored
    pub created_at: String,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            description: task.description,
            completed: task.completed,
            due_date: task.due_date,
            priority: task.priority,
            created_at: task.created_at.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

/// Request body for creating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Required, must not be blank
    description: Option<String>,
    due_date: Option<String>,
    /// Defaults to "Medium"
    priority: Option<String>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(request: CreateTaskRequest) -> Self {
        NewTask {
            description: request.description,
            due_date: request.due_date,
            priority: request.priority,
        }
    }
}

/// Request body for updating a task. Only the fields present are changed.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    description: Option<String>,
    completed: Option<bool>,
    /// `null` clears the due date
    #[serde(default, deserialize_with = "task_store::task::deserialize_present")]
    #[schema(value_type = Option<String>)]
    due_date: Option<Option<String>>,
    priority: Option<String>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(request: UpdateTaskRequest) -> Self {
        TaskPatch {
            description: request.description,
            completed: request.completed,
            due_date: request.due_date,
            priority: request.priority,
        }
    }
}

/// JSON body for plain confirmations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// JSON body for API errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a task handler can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Task not found")]
    NotFound,
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::TaskNotFound(_) => ApiError::NotFound,
            TaskServiceError::MissingDescription => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handler for GET /api/tasks - Returns every task in the data file.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "All tasks, empty if the data file is missing or unreadable", body = [TaskJson])
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(State(state): State<Arc<TaskState>>) -> Json<Vec<TaskJson>> {
    let service = TaskService::new(&state.store);
    let tasks = service
        .get_all_tasks()
        .into_iter()
        .map(TaskJson::from)
        .collect();
    Json(tasks)
}

/// Handler for POST /api/tasks - Creates a task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 400, description = "Missing description or malformed body", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), ApiError> {
    let Json(request) = payload?;
    let service = TaskService::new(&state.store);
    let task = service.create_task(request.into())?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Handler for PUT /api/tasks/{id} - Overwrites the fields present in the body.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 400, description = "Malformed ID or body", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<u32>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let service = TaskService::new(&state.store);
    let task = service.update_task(id, request.into())?;
    Ok(Json(task.into()))
}

/// Handler for DELETE /api/tasks/{id} - Removes the task if it exists.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted, or there was nothing to delete", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    TaskService::new(&state.store).delete_task(id);
    Ok(Json(MessageResponse::new("Task deleted")))
}

/// Handler for PUT /api/tasks/{id}/toggle - Flips the completed flag.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/toggle",
    params(("id" = u32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task toggled", body = TaskJson),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn toggle_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let Path(id) = id?;
    let task = TaskService::new(&state.store).toggle_task(id)?;
    Ok(Json(task.into()))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/api/tasks", get(get_tasks_handler).post(create_task_handler))
        .route(
            "/api/tasks/{id}",
            put(update_task_handler).delete(delete_task_handler),
        )
        .route("/api/tasks/{id}/toggle", put(toggle_task_handler))
        .with_state(state)
}
