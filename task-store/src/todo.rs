use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// A todo record as kept by the console manager.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Todo {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

/// `YYYY-MM-DD HH:MM:SS` in local time.
mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub(crate) fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local().trunc_subsecs(0)
}

impl Todo {
    pub fn created_at_display(&self) -> String {
        self.created_at.format(timestamp::FORMAT).to_string()
    }

    pub fn updated_at_display(&self) -> String {
        self.updated_at.format(timestamp::FORMAT).to_string()
    }

    fn touch(&mut self) {
        self.updated_at = now();
    }
}

/// Changes applied by [`TodoList::update`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TodoUpdate {
    /// `None` keeps the current title.
    pub title: Option<String>,
    /// `None` keeps the current description; an empty string clears it.
    pub description: Option<String>,
    /// `None` keeps the current status.
    pub completed: Option<bool>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("No todo found with ID: {0}")]
    NotFound(u32),
    #[error("Title cannot be empty!")]
    EmptyTitle,
}

/// Which todos a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Pending,
    Completed,
}

impl Filter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl Stats {
    /// Percentage of completed todos, 0 when there are none. Display it with
    /// `{:.1}`, which rounds exact ties to even.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// The in-memory todo list. Ids are kept contiguous from 1, so deleting a
/// todo renumbers every todo after it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TodoList {
    todos: Vec<Todo>,
}

impl From<Vec<Todo>> for TodoList {
    fn from(todos: Vec<Todo>) -> Self {
        Self { todos }
    }
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn as_slice(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: u32) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Todo, TodoError> {
        self.todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(TodoError::NotFound(id))
    }

    pub fn filter(&self, filter: Filter) -> impl Iterator<Item = &Todo> {
        self.todos.iter().filter(move |todo| filter.matches(todo))
    }

    pub fn add(&mut self, title: &str, description: &str) -> Result<&Todo, TodoError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TodoError::EmptyTitle);
        }
        let timestamp = now();
        self.todos.push(Todo {
            id: self.todos.len() as u32 + 1,
            title: title.to_string(),
            description: description.trim().to_string(),
            completed: false,
            created_at: timestamp,
            updated_at: timestamp,
        });
        Ok(&self.todos[self.todos.len() - 1])
    }

    /// Applies `update` and refreshes `updated_at`, even when no field
    /// actually changes.
    pub fn update(&mut self, id: u32, update: TodoUpdate) -> Result<&Todo, TodoError> {
        let todo = self.get_mut(id)?;
        if let Some(title) = update.title.filter(|title| !title.trim().is_empty()) {
            todo.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            todo.description = description.trim().to_string();
        }
        if let Some(completed) = update.completed {
            todo.completed = completed;
        }
        todo.touch();
        Ok(todo)
    }

    pub fn mark_complete(&mut self, id: u32) -> Result<&Todo, TodoError> {
        let todo = self.get_mut(id)?;
        todo.completed = true;
        todo.touch();
        Ok(todo)
    }

    /// Removes the todo with `id` and renumbers the rest `1..n`, keeping
    /// their relative order.
    pub fn remove(&mut self, id: u32) -> Result<Todo, TodoError> {
        let index = self
            .todos
            .iter()
            .position(|todo| todo.id == id)
            .ok_or(TodoError::NotFound(id))?;
        let removed = self.todos.remove(index);
        for (todo, id) in self.todos.iter_mut().zip(1..) {
            todo.id = id;
        }
        Ok(removed)
    }

    pub fn stats(&self) -> Stats {
        let total = self.todos.len();
        let completed = self.todos.iter().filter(|todo| todo.completed).count();
        Stats {
            total,
            completed,
            pending: total - completed,
        }
    }
}
