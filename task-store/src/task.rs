use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PRIORITY: &str = "Medium";

/// A task record as stored by the HTTP service.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Task {
    pub id: u32,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: String,
    pub created_at: NaiveDateTime,
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

/// Fields accepted when creating a task.
#[derive(Debug, Default, Clone)]
pub struct NewTask {
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
}

/// Partial update of a task. `None` leaves the field untouched.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub completed: Option<bool>,
    /// `Some(None)` clears the due date, `None` keeps it.
    pub due_date: Option<Option<String>>,
    pub priority: Option<String>,
}

/// Deserializes a field that may be absent, `null` or set, mapping a present
/// value (including `null`) to `Some`. Pair with `#[serde(default)]`.
pub fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Task not found")]
    NotFound(u32),
    #[error("Missing required field: description")]
    MissingDescription,
}

/// The in-memory task list. Ids are never renumbered, so deletes leave gaps.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_vec(self) -> Vec<Task> {
        self.tasks
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskError::NotFound(id))
    }

    /// The id the next created task receives: one past the current length,
    /// or one past the highest id when a gap would otherwise cause a clash.
    pub fn next_id(&self) -> u32 {
        let max_id = self.tasks.iter().map(|task| task.id).max().unwrap_or(0);
        let len = u32::try_from(self.tasks.len()).unwrap_or(u32::MAX);
        len.max(max_id).saturating_add(1)
    }

    pub fn add(&mut self, new_task: NewTask) -> Result<&Task, TaskError> {
        let description = new_task
            .description
            .filter(|description| !description.trim().is_empty())
            .ok_or(TaskError::MissingDescription)?;
        let task = Task {
            id: self.next_id(),
            description,
            completed: false,
            due_date: new_task.due_date,
            priority: new_task.priority.unwrap_or_else(default_priority),
            created_at: chrono::Local::now().naive_local(),
        };
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn update(&mut self, id: u32, patch: TaskPatch) -> Result<&Task, TaskError> {
        let task = self.get_mut(id)?;
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        Ok(task)
    }

    pub fn toggle(&mut self, id: u32) -> Result<&Task, TaskError> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        Ok(task)
    }

    /// Removes the task with `id`, returning whether one was present.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }
}
