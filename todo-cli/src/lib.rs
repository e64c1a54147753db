pub mod console;
pub mod session;

pub use console::{Console, Exit, MenuChoice};
pub use session::{Loaded, Session};
