use clap::Parser;
use std::io;
use std::path::PathBuf;
use todo_cli::{Console, Session};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(about = "Simple todo manager with an interactive menu")]
struct Cli {
    /// JSON file the todos are loaded from and saved to
    #[arg(long, default_value = "todos.json")]
    file: PathBuf,

    /// Save after every change instead of only on "Save and exit"
    #[arg(long)]
    autosave: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::WARN)
        .init();

    let session = Session::load(args.file);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console =
        Console::new(stdin.lock(), stdout.lock(), session).with_autosave(args.autosave);
    let exit = console.run()?;
    tracing::debug!("Session ended: {:?}", exit);

    Ok(())
}
