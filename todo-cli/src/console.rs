use crate::session::{Loaded, Session};
use std::io::{self, BufRead, Write};
use task_store::{Filter, Todo, TodoUpdate};

const WIDE_RULE: usize = 50;
const NARROW_RULE: usize = 30;

/// One entry of the numbered menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ViewAll,
    ViewPending,
    ViewCompleted,
    Create,
    Update,
    Delete,
    MarkComplete,
    Statistics,
    SaveAndExit,
    ExitWithoutSaving,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        let choice = match input.trim() {
            "1" => MenuChoice::ViewAll,
            "2" => MenuChoice::ViewPending,
            "3" => MenuChoice::ViewCompleted,
            "4" => MenuChoice::Create,
            "5" => MenuChoice::Update,
            "6" => MenuChoice::Delete,
            "7" => MenuChoice::MarkComplete,
            "8" => MenuChoice::Statistics,
            "9" => MenuChoice::SaveAndExit,
            "0" => MenuChoice::ExitWithoutSaving,
            _ => return None,
        };
        Some(choice)
    }
}

/// How the menu loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Saved,
    Discarded,
}

/// The interactive menu over a [`Session`], reading operator input from
/// `input` and writing everything it shows to `output`.
pub struct Console<R, W> {
    input: R,
    output: W,
    session: Session,
    autosave: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, session: Session) -> Self {
        Self {
            input,
            output,
            session,
            autosave: false,
        }
    }

    /// Persist after every change instead of only on "Save and exit".
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    /// Runs the menu until one of the two exit choices, or end of input,
    /// which exits without saving.
    pub fn run(&mut self) -> io::Result<Exit> {
        self.print_banner()?;
        loop {
            self.print_menu()?;
            let Some(input) = self.prompt("\nEnter your choice (0-9): ")? else {
                writeln!(self.output)?;
                return self.exit_without_saving();
            };
            let Some(choice) = MenuChoice::parse(&input) else {
                writeln!(
                    self.output,
                    "Invalid choice! Please enter a number between 0 and 9."
                )?;
                continue;
            };
            tracing::debug!("Menu choice {:?}", choice);
            match choice {
                MenuChoice::ViewAll => self.list_todos(Filter::All)?,
                MenuChoice::ViewPending => self.list_todos(Filter::Pending)?,
                MenuChoice::ViewCompleted => self.list_todos(Filter::Completed)?,
                MenuChoice::Create => self.create_todo()?,
                MenuChoice::Update => self.update_todo()?,
                MenuChoice::Delete => self.delete_todo()?,
                MenuChoice::MarkComplete => self.mark_complete()?,
                MenuChoice::Statistics => self.show_stats()?,
                MenuChoice::SaveAndExit => return self.save_and_exit(),
                MenuChoice::ExitWithoutSaving => return self.exit_without_saving(),
            }
        }
    }

    /// Writes `label` and reads one line, trimmed. `None` at end of input.
    /// A line that is not valid UTF-8 is rejected and asked for again.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        loop {
            write!(self.output, "{label}")?;
            self.output.flush()?;
            let mut line = Vec::new();
            if self.input.read_until(b'\n', &mut line)? == 0 {
                return Ok(None);
            }
            match String::from_utf8(line) {
                Ok(line) => return Ok(Some(line.trim().to_string())),
                Err(err) => {
                    tracing::debug!("Rejected input line: {}", err);
                    writeln!(self.output, "Invalid input! Please enter plain text.")?;
                }
            }
        }
    }

    /// Reads an id and checks that a todo has it.
    fn prompt_existing_id(&mut self, label: &str) -> io::Result<Option<u32>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        let Ok(id) = raw.parse::<u32>() else {
            writeln!(self.output, "Invalid ID! Please enter a number.")?;
            return Ok(None);
        };
        if self.session.todos().get(id).is_none() {
            writeln!(self.output, "No todo found with ID: {id}")?;
            return Ok(None);
        }
        Ok(Some(id))
    }

    /// Reports a completed change, saving first when autosave is on.
    fn report_change(&mut self, done: &str, unsaved: &str) -> io::Result<()> {
        if self.autosave {
            if let Err(err) = self.session.save() {
                tracing::warn!("Autosave failed: {}", err);
                return writeln!(self.output, "{unsaved}");
            }
        }
        writeln!(self.output, "{done}")
    }

    fn print_banner(&mut self) -> io::Result<()> {
        match self.session.loaded() {
            Loaded::Records(count) => writeln!(
                self.output,
                "Loaded {count} todo(s) from {}",
                self.session.path().display()
            )?,
            Loaded::Unreadable => writeln!(
                self.output,
                "Error loading todos. Starting with an empty list."
            )?,
            Loaded::Missing => {}
        }
        writeln!(self.output, "{}", "=".repeat(WIDE_RULE))?;
        writeln!(self.output, "SIMPLE TODO APPLICATION")?;
        writeln!(self.output, "{}", "=".repeat(WIDE_RULE))
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nMenu:")?;
        writeln!(self.output, "1. View all todos")?;
        writeln!(self.output, "2. View pending todos")?;
        writeln!(self.output, "3. View completed todos")?;
        writeln!(self.output, "4. Create new todo")?;
        writeln!(self.output, "5. Update todo")?;
        writeln!(self.output, "6. Delete todo")?;
        writeln!(self.output, "7. Mark todo as complete")?;
        writeln!(self.output, "8. Show statistics")?;
        writeln!(self.output, "9. Save and exit")?;
        writeln!(self.output, "0. Exit without saving")
    }

    fn create_todo(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Create New Todo ---")?;
        let Some(title) = self.prompt("Enter todo title: ")? else {
            return Ok(());
        };
        if title.is_empty() {
            return writeln!(self.output, "Title cannot be empty!");
        }
        let Some(description) = self.prompt("Enter todo description (optional): ")? else {
            return Ok(());
        };
        let id = match self.session.todos_mut().add(&title, &description) {
            Ok(todo) => todo.id,
            Err(err) => return writeln!(self.output, "{err}"),
        };
        self.report_change(
            &format!("Todo '{title}' created successfully with ID: {id}"),
            "Todo created but failed to save to file.",
        )
    }

    fn list_todos(&mut self, filter: Filter) -> io::Result<()> {
        writeln!(self.output, "\n{}", "=".repeat(WIDE_RULE))?;
        writeln!(self.output, "TODO LIST")?;
        writeln!(self.output, "{}", "=".repeat(WIDE_RULE))?;

        let todos = self.session.todos();
        if todos.is_empty() {
            return writeln!(self.output, "No todos found!");
        }
        let matching: Vec<&Todo> = todos.filter(filter).collect();
        if matching.is_empty() {
            let status = match filter {
                Filter::Completed => "completed",
                Filter::Pending | Filter::All => "pending",
            };
            return writeln!(self.output, "No {status} todos found!");
        }
        for todo in matching {
            write_todo(&mut self.output, todo)?;
        }
        Ok(())
    }

    fn update_todo(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Update Todo ---")?;
        let Some(id) = self.prompt_existing_id("Enter todo ID to update: ")? else {
            return Ok(());
        };
        let Some(current) = self.session.todos().get(id).cloned() else {
            return Ok(());
        };

        writeln!(self.output, "\nCurrent title: {}", current.title)?;
        let Some(title) = self.prompt("Enter new title (press Enter to keep current): ")? else {
            return Ok(());
        };
        writeln!(self.output, "Current description: {}", current.description)?;
        let Some(description) =
            self.prompt("Enter new description (press Enter to keep current): ")?
        else {
            return Ok(());
        };
        let status = if current.completed { "Completed" } else { "Pending" };
        writeln!(self.output, "Current status: {status}")?;
        let Some(answer) =
            self.prompt("Mark as completed? (y/n, press Enter to keep current): ")?
        else {
            return Ok(());
        };

        let update = TodoUpdate {
            title: Some(title).filter(|title| !title.is_empty()),
            description: Some(description),
            completed: match answer.to_lowercase().as_str() {
                "y" => Some(true),
                "n" => Some(false),
                _ => None,
            },
        };
        if let Err(err) = self.session.todos_mut().update(id, update) {
            return writeln!(self.output, "{err}");
        }
        self.report_change(
            &format!("Todo ID {id} updated successfully!"),
            "Todo updated but failed to save to file.",
        )
    }

    fn delete_todo(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Delete Todo ---")?;
        let Some(id) = self.prompt_existing_id("Enter todo ID to delete: ")? else {
            return Ok(());
        };
        let title = self
            .session
            .todos()
            .get(id)
            .map(|todo| todo.title.clone())
            .unwrap_or_default();
        let Some(confirm) =
            self.prompt(&format!("Are you sure you want to delete '{title}'? (y/n): "))?
        else {
            return Ok(());
        };
        if confirm.to_lowercase() != "y" {
            return writeln!(self.output, "Deletion cancelled.");
        }
        if let Err(err) = self.session.todos_mut().remove(id) {
            return writeln!(self.output, "{err}");
        }
        self.report_change(
            &format!("Todo ID {id} deleted successfully!"),
            "Todo deleted but failed to save to file.",
        )
    }

    fn mark_complete(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Mark Todo Complete ---")?;
        let Some(id) = self.prompt_existing_id("Enter todo ID to mark as complete: ")? else {
            return Ok(());
        };
        if let Err(err) = self.session.todos_mut().mark_complete(id) {
            return writeln!(self.output, "{err}");
        }
        self.report_change(
            &format!("Todo ID {id} marked as complete!"),
            "Todo updated but failed to save to file.",
        )
    }

    fn show_stats(&mut self) -> io::Result<()> {
        let stats = self.session.todos().stats();
        writeln!(self.output, "\n--- Todo Statistics ---")?;
        writeln!(self.output, "Total todos: {}", stats.total)?;
        writeln!(self.output, "Completed: {}", stats.completed)?;
        writeln!(self.output, "Pending: {}", stats.pending)?;
        writeln!(
            self.output,
            "Completion rate: {:.1}%",
            stats.completion_rate()
        )
    }

    fn save_and_exit(&mut self) -> io::Result<Exit> {
        match self.session.save() {
            Ok(()) => writeln!(self.output, "Todos saved successfully!")?,
            Err(err) => {
                tracing::warn!("Save failed: {}", err);
                writeln!(self.output, "Error saving todos to file.")?;
            }
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(Exit::Saved)
    }

    fn exit_without_saving(&mut self) -> io::Result<Exit> {
        writeln!(self.output, "Exiting without saving. Goodbye!")?;
        Ok(Exit::Discarded)
    }
}

fn write_todo(output: &mut impl Write, todo: &Todo) -> io::Result<()> {
    let status = if todo.completed { "✓" } else { "✗" };
    writeln!(output, "ID: {}", todo.id)?;
    writeln!(output, "Title: {}", todo.title)?;
    if !todo.description.is_empty() {
        writeln!(output, "Description: {}", todo.description)?;
    }
    writeln!(output, "Status: {status}")?;
    writeln!(output, "Created: {}", todo.created_at_display())?;
    writeln!(output, "Updated: {}", todo.updated_at_display())?;
    writeln!(output, "{}", "-".repeat(NARROW_RULE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use predicates::prelude::*;
    use std::io::Cursor;

    struct Run {
        exit: Exit,
        output: String,
        session: Session,
    }

    fn run_session(session: Session, autosave: bool, lines: &[&str]) -> Run {
        let input = Cursor::new(lines.join("\n") + "\n");
        let mut console = Console::new(input, Vec::new(), session).with_autosave(autosave);
        let exit = console.run().unwrap();
        let Console {
            output, session, ..
        } = console;
        Run {
            exit,
            output: String::from_utf8(output).unwrap(),
            session,
        }
    }

    fn run_in(dir: &TempDir, lines: &[&str]) -> Run {
        run_session(Session::load(dir.child("todos.json").path()), false, lines)
    }

    fn titles(session: &Session) -> Vec<(u32, String)> {
        session
            .todos()
            .as_slice()
            .iter()
            .map(|todo| (todo.id, todo.title.clone()))
            .collect()
    }

    #[test]
    fn parses_every_menu_choice() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::ViewAll));
        assert_eq!(MenuChoice::parse(" 9 "), Some(MenuChoice::SaveAndExit));
        assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::ExitWithoutSaving));
        assert_eq!(MenuChoice::parse("10"), None);
        assert_eq!(MenuChoice::parse("x"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn can_create_todos_and_save() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["4", "A", "first", "4", "B", "", "9"]);

        assert_eq!(run.exit, Exit::Saved);
        assert!(run.output.contains("Todo 'A' created successfully with ID: 1"));
        assert!(run.output.contains("Todo 'B' created successfully with ID: 2"));
        assert!(run.output.contains("Todos saved successfully!"));
        let reloaded = Session::load(dir.child("todos.json").path());
        assert_eq!(
            titles(&reloaded),
            vec![(1, "A".to_string()), (2, "B".to_string())]
        );
    }

    #[test]
    fn empty_title_is_rejected() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["4", "   ", "0"]);

        assert!(run.output.contains("Title cannot be empty!"));
        assert!(run.session.todos().is_empty());
    }

    #[test]
    fn exit_without_saving_writes_nothing() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["4", "A", "", "0"]);

        assert_eq!(run.exit, Exit::Discarded);
        assert!(run.output.contains("Exiting without saving. Goodbye!"));
        dir.child("todos.json").assert(predicate::path::missing());
    }

    #[test]
    fn end_of_input_exits_without_saving() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["4", "A", ""]);

        assert_eq!(run.exit, Exit::Discarded);
        assert_eq!(run.session.todos().len(), 1);
        dir.child("todos.json").assert(predicate::path::missing());
    }

    #[test]
    fn invalid_choice_reprompts() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["42", "0"]);

        assert!(
            run.output
                .contains("Invalid choice! Please enter a number between 0 and 9.")
        );
        assert_eq!(run.exit, Exit::Discarded);
    }

    #[test]
    fn listing_distinguishes_empty_from_no_match() {
        let dir = TempDir::new().unwrap();

        let empty = run_in(&dir, &["1", "0"]);
        let no_completed = run_in(&dir, &["4", "A", "", "3", "0"]);
        let no_pending = run_in(&dir, &["4", "A", "", "7", "1", "2", "0"]);

        assert!(empty.output.contains("No todos found!"));
        assert!(no_completed.output.contains("No completed todos found!"));
        assert!(no_pending.output.contains("No pending todos found!"));
    }

    #[test]
    fn listing_prints_each_matching_todo() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["4", "A", "details", "4", "B", "", "7", "2", "2", "0"]);

        let listing = run.output.rsplit("TODO LIST").next().unwrap();
        assert!(listing.contains("ID: 1\nTitle: A\nDescription: details\nStatus: ✗\n"));
        assert!(!listing.contains("Title: B"));
        assert!(listing.contains(&"-".repeat(30)));
    }

    #[test]
    fn delete_with_confirmation_compacts_ids() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["4", "A", "", "4", "B", "", "6", "1", "y", "0"]);

        assert!(run.output.contains("Are you sure you want to delete 'A'? (y/n): "));
        assert!(run.output.contains("Todo ID 1 deleted successfully!"));
        assert_eq!(titles(&run.session), vec![(1, "B".to_string())]);
    }

    #[test]
    fn delete_without_confirmation_is_cancelled() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["4", "A", "", "6", "1", "n", "0"]);

        assert!(run.output.contains("Deletion cancelled."));
        assert_eq!(run.session.todos().len(), 1);
    }

    #[test]
    fn bad_ids_are_reported() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["5", "abc", "6", "3", "7", "", "0"]);

        assert!(run.output.contains("Invalid ID! Please enter a number."));
        assert!(run.output.contains("No todo found with ID: 3"));
        assert_eq!(run.exit, Exit::Discarded);
    }

    #[test]
    fn update_keeps_blank_title_and_overwrites_description() {
        let dir = TempDir::new().unwrap();

        let run = run_in(&dir, &["4", "A", "old", "5", "1", "", "", "y", "0"]);

        assert!(run.output.contains("Current title: A"));
        assert!(run.output.contains("Todo ID 1 updated successfully!"));
        let todo = run.session.todos().get(1).unwrap();
        assert_eq!(todo.title, "A");
        assert_eq!(todo.description, "");
        assert!(todo.completed);
    }

    #[test]
    fn update_with_other_answer_keeps_status() {
        let dir = TempDir::new().unwrap();

        let run = run_in(
            &dir,
            &["4", "A", "", "7", "1", "5", "1", "Renamed", "new", "maybe", "0"],
        );

        let todo = run.session.todos().get(1).unwrap();
        assert_eq!(todo.title, "Renamed");
        assert_eq!(todo.description, "new");
        assert!(todo.completed);
    }

    #[test]
    fn statistics_report_counts_and_rate() {
        let dir = TempDir::new().unwrap();

        let empty = run_in(&dir, &["8", "0"]);
        let run = run_in(
            &dir,
            &["4", "A", "", "4", "B", "", "4", "C", "", "7", "1", "8", "0"],
        );

        assert!(empty.output.contains("Total todos: 0"));
        assert!(empty.output.contains("Completion rate: 0.0%"));
        assert!(run.output.contains("Total todos: 3"));
        assert!(run.output.contains("Completed: 1"));
        assert!(run.output.contains("Pending: 2"));
        assert!(run.output.contains("Completion rate: 33.3%"));
    }

    #[test]
    fn banner_reports_loaded_todos() {
        let dir = TempDir::new().unwrap();
        run_in(&dir, &["4", "A", "", "9"]);

        let run = run_in(&dir, &["0"]);

        assert!(run.output.starts_with("Loaded 1 todo(s) from "));
        assert!(run.output.contains("SIMPLE TODO APPLICATION"));
    }

    #[test]
    fn banner_reports_unreadable_file() {
        let dir = TempDir::new().unwrap();
        dir.child("todos.json").write_str("[{]").unwrap();

        let run = run_in(&dir, &["0"]);

        assert!(
            run.output
                .starts_with("Error loading todos. Starting with an empty list.")
        );
    }

    #[test]
    fn autosave_persists_each_change() {
        let dir = TempDir::new().unwrap();
        let session = Session::load(dir.child("todos.json").path());

        let run = run_session(session, true, &["4", "A", "", "0"]);

        assert_eq!(run.exit, Exit::Discarded);
        let reloaded = Session::load(dir.child("todos.json").path());
        assert_eq!(titles(&reloaded), vec![(1, "A".to_string())]);
    }

    #[test]
    fn autosave_failure_is_reported_softly() {
        let dir = TempDir::new().unwrap();
        let session = Session::load(dir.child("missing/todos.json").path());

        let run = run_session(session, true, &["4", "A", "", "9"]);

        assert!(run.output.contains("Todo created but failed to save to file."));
        assert!(run.output.contains("Error saving todos to file."));
        assert!(run.output.contains("Goodbye!"));
        assert_eq!(run.session.todos().len(), 1);
    }

    #[test]
    fn invalid_utf8_line_is_asked_again() {
        let dir = TempDir::new().unwrap();
        let mut input = b"4\nA\n\n".to_vec();
        input.extend_from_slice(b"\xff\xfe\n9\n");
        let session = Session::load(dir.child("todos.json").path());
        let mut console = Console::new(Cursor::new(input), Vec::new(), session);

        let exit = console.run().unwrap();

        let output = String::from_utf8(console.output).unwrap();
        assert_eq!(exit, Exit::Saved);
        assert!(output.contains("Invalid input! Please enter plain text."));
        let reloaded = Session::load(dir.child("todos.json").path());
        assert_eq!(titles(&reloaded), vec![(1, "A".to_string())]);
    }
}
