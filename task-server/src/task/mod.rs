use std::path::PathBuf;
use task_store::{JsonFile, NewTask, Task, TaskError, TaskList, TaskPatch};

pub mod api;

/// Shared state for the task routes: only the location of the data file,
/// since every request reloads it.
#[derive(Debug, Clone)]
pub struct TaskState {
    pub store: JsonFile<Task>,
}

impl TaskState {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonFile::new(data_file),
        }
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    #[error("Task not found")]
    TaskNotFound(u32),
    #[error("Missing required field: description")]
    MissingDescription,
}

impl From<TaskError> for TaskServiceError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => TaskServiceError::TaskNotFound(id),
            TaskError::MissingDescription => TaskServiceError::MissingDescription,
        }
    }
}

/// Runs one load, mutate, save cycle per call against the task file.
pub struct TaskService<'a> {
    store: &'a JsonFile<Task>,
}

impl TaskService<'_> {
    pub fn new(store: &JsonFile<Task>) -> TaskService<'_> {
        TaskService { store }
    }

    fn load(&self) -> TaskList {
        TaskList::from(self.store.load())
    }

    /// A failed write leaves the change applied only in the response; the
    /// caller still sees success.
    fn persist(&self, tasks: &TaskList) {
        if let Err(err) = self.store.save(tasks.as_slice()) {
            tracing::warn!("Task change applied but not persisted: {}", err);
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn get_all_tasks(&self) -> Vec<Task> {
        self.load().into_vec()
    }

    #[tracing::instrument(skip(self))]
    pub fn create_task(&self, new_task: NewTask) -> Result<Task, TaskServiceError> {
        let mut tasks = self.load();
        let task = tasks.add(new_task)?.clone();
        self.persist(&tasks);
        tracing::info!("Created task {}", task.id);
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn update_task(&self, id: u32, patch: TaskPatch) -> Result<Task, TaskServiceError> {
        let mut tasks = self.load();
        let task = tasks.update(id, patch)?.clone();
        self.persist(&tasks);
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_task(&self, id: u32) -> Result<Task, TaskServiceError> {
        let mut tasks = self.load();
        let task = tasks.toggle(id)?.clone();
        self.persist(&tasks);
        Ok(task)
    }

    /// Deletes the task if present. The file is rewritten either way.
    #[tracing::instrument(skip(self))]
    pub fn delete_task(&self, id: u32) -> bool {
        let mut tasks = self.load();
        let removed = tasks.remove(id);
        self.persist(&tasks);
        if !removed {
            tracing::debug!("No task with ID {} to delete", id);
        }
        removed
    }
}
