pub mod storage;
pub mod task;
pub mod todo;

pub use storage::{JsonFile, StorageError};
pub use task::{NewTask, Task, TaskError, TaskList, TaskPatch};
pub use todo::{Filter, Stats, Todo, TodoError, TodoList, TodoUpdate};
