use std::path::{Path, PathBuf};
use task_store::{JsonFile, StorageError, Todo, TodoList};

/// What was found on disk when a session started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loaded {
    /// No file yet.
    Missing,
    /// The file held this many todos.
    Records(usize),
    /// The file could not be read or parsed; the session starts empty.
    Unreadable,
}

/// A console session: the todo list held in memory between explicit saves.
#[derive(Debug)]
pub struct Session {
    store: JsonFile<Todo>,
    todos: TodoList,
    loaded: Loaded,
}

impl Session {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let store = JsonFile::new(path);
        let (todos, loaded) = match store.try_load() {
            Ok(Some(todos)) => {
                let count = todos.len();
                (todos, Loaded::Records(count))
            }
            Ok(None) => (Vec::new(), Loaded::Missing),
            Err(err) => {
                tracing::warn!("Error loading todos: {}", err);
                (Vec::new(), Loaded::Unreadable)
            }
        };
        Self {
            store,
            todos: TodoList::from(todos),
            loaded,
        }
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn loaded(&self) -> Loaded {
        self.loaded
    }

    pub fn todos(&self) -> &TodoList {
        &self.todos
    }

    pub fn todos_mut(&mut self) -> &mut TodoList {
        &mut self.todos
    }

    pub fn save(&self) -> Result<(), StorageError> {
        self.store.save(self.todos.as_slice())
    }
}
