//! Headless mode for Next Card.
//!
//! This module provides a simple text-based interface for drawing cards
//! without a graphical front end. It's designed for manual play in a
//! terminal and for scripted runs.

use nextcard_core::{Catalog, CatalogError, DeckSession, FileStore, SessionConfig, Toggle};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from parsing command line options.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),
}

/// Errors that end a headless run.
#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Options for a headless run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessOptions {
    /// Catalog file; the bundled catalog is used when unset.
    pub catalog: Option<PathBuf>,
    /// Directory holding the saved category preferences.
    pub data_dir: PathBuf,
    pub seed: Option<u64>,
    pub avoid_repeats: bool,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            catalog: std::env::var_os("NEXTCARD_CATALOG").map(PathBuf::from),
            data_dir: default_data_dir(),
            seed: None,
            avoid_repeats: false,
        }
    }
}

impl HeadlessOptions {
    /// Parse options from the full argument list (program name first).
    pub fn from_args(args: &[String]) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        let mut iter = args.iter().skip(1);

        while let Some(arg) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .ok_or_else(|| OptionsError::MissingValue(arg.clone()))
            };
            match arg.as_str() {
                "--catalog" => options.catalog = Some(PathBuf::from(value()?)),
                "--data-dir" => options.data_dir = PathBuf::from(value()?),
                "--seed" => {
                    let raw = value()?;
                    let seed = raw.parse().map_err(|_| OptionsError::InvalidSeed(raw))?;
                    options.seed = Some(seed);
                }
                "--avoid-repeats" => options.avoid_repeats = true,
                other => return Err(OptionsError::UnknownOption(other.to_string())),
            }
        }

        Ok(options)
    }

    fn session_config(&self) -> SessionConfig {
        let config = SessionConfig::new().with_avoid_repeats(self.avoid_repeats);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("NEXTCARD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".nextcard"),
        None => PathBuf::from(".nextcard"),
    }
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Draw,
    Toggle(String),
    Status,
    Categories,
    Help,
    Quit,
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    /// Parse one line of input. An empty line draws.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Draw;
        }
        let Some(rest) = line.strip_prefix('#') else {
            return Command::Unknown(line.to_string());
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        match parts.first().copied() {
            Some("draw") | Some("next") => Command::Draw,
            Some("toggle") => match parts.get(1) {
                Some(id) => Command::Toggle(id.to_string()),
                None => Command::Usage("#toggle <category>"),
            },
            Some("status") => Command::Status,
            Some("categories") => Command::Categories,
            Some("help") => Command::Help,
            Some("quit") | Some("exit") => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Run the driver until `#quit` or end of input.
///
/// Protocol:
/// - Lines starting with `#` are commands (toggle, draw, status, quit, ...)
/// - An empty line draws the next card
/// - Output lines are tagged `[CARD]`, `[SELECTED]`, `[ERROR]` and so on
pub async fn run_headless(options: HeadlessOptions) -> Result<(), HeadlessError> {
    let catalog = match &options.catalog {
        Some(path) => Catalog::load(path).await?,
        None => Catalog::builtin()?,
    };
    let store = FileStore::new(&options.data_dir);
    tracing::info!(data_dir = %options.data_dir.display(), "Using preference store");

    let mut session = DeckSession::start(catalog, store, options.session_config()).await;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "=== Next Card ===")?;
    writeln!(stdout, "Push the button. Start the conversation.")?;
    writeln!(stdout)?;
    print_categories(&mut stdout, &session)?;
    writeln!(stdout)?;
    print_help(&mut stdout)?;
    writeln!(stdout)?;
    print_card(&mut stdout, &session)?;

    run_lines(&mut session, stdin.lock(), &mut stdout).await?;
    Ok(())
}

/// Feed input lines to the session until `#quit` or end of input.
pub async fn run_lines<R: BufRead, W: Write>(
    session: &mut DeckSession,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;

        match Command::parse(&line) {
            Command::Draw => match session.request_draw() {
                Ok(_) => print_card(out, session)?,
                Err(e) => writeln!(out, "[ERROR] {e}")?,
            },
            Command::Toggle(id) => {
                let change = session.toggle_category(&id).await;
                let label = session
                    .catalog()
                    .get(&id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| id.clone());
                match change {
                    Toggle::Added => writeln!(out, "[SELECTED] {label} on")?,
                    Toggle::Removed => writeln!(out, "[SELECTED] {label} off")?,
                    Toggle::Reset => {
                        writeln!(out, "[SELECTED] {label} off, back to the starter deck")?
                    }
                }
                print_card(out, session)?;
            }
            Command::Status => print_status(out, session)?,
            Command::Categories => print_categories(out, session)?,
            Command::Help => print_help(out)?,
            Command::Quit => {
                writeln!(out, "Goodbye!")?;
                break;
            }
            Command::Usage(usage) => writeln!(out, "[ERROR] Usage: {usage}")?,
            Command::Unknown(input) => {
                writeln!(out, "[ERROR] Unknown command: {input}. Type #help for commands.")?
            }
        }

        out.flush()?;
    }

    Ok(())
}

fn print_card(out: &mut impl Write, session: &DeckSession) -> io::Result<()> {
    match session.current_card() {
        Some(card) => writeln!(out, "[CARD] {card}"),
        None => writeln!(out, "[CARD] (no cards for the current selection)"),
    }
}

fn print_categories(out: &mut impl Write, session: &DeckSession) -> io::Result<()> {
    writeln!(out, "Categories:")?;
    for category in session.catalog().categories() {
        let mark = if session.is_selected(&category.id) { "x" } else { " " };
        writeln!(
            out,
            "  [{mark}] {:<12} {} ({} prompts)",
            category.id,
            category.name,
            category.prompts.len()
        )?;
    }
    Ok(())
}

fn print_status(out: &mut impl Write, session: &DeckSession) -> io::Result<()> {
    let selected: Vec<&str> = session.selection().iter().collect();
    writeln!(out, "[STATUS]")?;
    writeln!(out, "  Selected: {}", selected.join(", "))?;
    writeln!(out, "  Cards in pool: {}", session.pool().len())?;
    writeln!(out, "  Cards drawn: {}", session.draw_count())?;
    writeln!(out, "  Backdrop: {}", session.backdrop())
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  <enter>, #draw       - Draw the next card")?;
    writeln!(out, "  #toggle <category>   - Turn a category on or off")?;
    writeln!(out, "  #categories          - List categories")?;
    writeln!(out, "  #status              - Show the current selection")?;
    writeln!(out, "  #help                - Show this help")?;
    writeln!(out, "  #quit                - Exit")
}
