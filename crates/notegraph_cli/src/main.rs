//! CLI driver for the NoteGraph core.
//!
//! # Responsibility
//! - Expose hierarchy, filter, focus and paging over a SQLite store.
//! - Seed the store with notes/links for local experiments.
//! - Print JSON on stdout; errors go to stderr with a non-zero exit code.

use clap::{Parser, Subcommand};
use notegraph_core::db::open_db;
use notegraph_core::{
    init_logging, CoreConfig, GraphService, GraphServiceError, Link, Note, Selection,
    SqliteNoteStore, ViewState,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "notegraph", version, about = "Tree and subgraph views over a note graph")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, default_value = "notegraph.sqlite3")]
    db: PathBuf,
    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files; logging is off when absent.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Checks core linkage.
    Ping,
    /// Prints the single-rooted hierarchy.
    Hierarchy {
        #[arg(long)]
        lang: Option<String>,
    },
    /// Prints descendants of the seeds and the links touching them.
    Filter {
        #[arg(required = true)]
        seeds: Vec<String>,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Prints the subtree and breadcrumb of one note.
    Focus {
        id: String,
        #[arg(long)]
        lang: Option<String>,
    },
    /// Prints one depth window of a view.
    Page {
        #[arg(allow_hyphen_values = true)]
        index: i64,
        #[arg(long)]
        window: Option<usize>,
        /// Restrict the view to descendants of these seeds.
        #[arg(long = "seed")]
        seeds: Vec<String>,
        /// Re-root the view at this note.
        #[arg(long, conflicts_with = "seeds")]
        focus: Option<String>,
        /// Notes whose children are hidden.
        #[arg(long)]
        collapse: Vec<String>,
    },
    /// Inserts or replaces one note.
    AddNote {
        content: String,
        /// Existing id to upsert; a fresh id is generated when absent.
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        zh: Option<String>,
    },
    /// Inserts one link.
    AddLink {
        from: String,
        to: String,
        weight: f64,
        #[arg(long)]
        description: Option<String>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Hierarchy { .. } => "hierarchy",
            Self::Filter { .. } => "filter",
            Self::Focus { .. } => "focus",
            Self::Page { .. } => "page",
            Self::AddNote { .. } => "add_note",
            Self::AddLink { .. } => "add_link",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(message)) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
        Err(CliError::Failed(message)) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

enum CliError {
    Usage(String),
    Failed(String),
}

impl From<GraphServiceError> for CliError {
    fn from(value: GraphServiceError) -> Self {
        match value {
            GraphServiceError::MalformedInput(_) => Self::Usage(value.to_string()),
            other => Self::Failed(format!("[{}] {other}", other.code())),
        }
    }
}

fn failed(err: impl std::fmt::Display) -> CliError {
    CliError::Failed(err.to_string())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match cli.config.as_ref() {
        Some(path) => CoreConfig::load(path).map_err(failed)?,
        None => CoreConfig::default(),
    };
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir).map_err(CliError::Usage)?;
    }
    log::info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    if let Command::Ping = cli.command {
        println!("notegraph_core ping={}", notegraph_core::ping());
        println!("notegraph_core version={}", notegraph_core::core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db).map_err(failed)?;
    let store = SqliteNoteStore::try_new(&conn).map_err(failed)?;

    match cli.command {
        Command::Ping => Ok(()),
        Command::AddNote {
            id,
            content,
            parent,
            zh,
        } => {
            let mut note = match id {
                Some(id) => Note::with_id(id, content),
                None => Note::new(content),
            };
            note.parent_id = parent;
            note.content_zh = zh;
            store.insert_note(&note).map_err(failed)?;
            print_json(&note)
        }
        Command::AddLink {
            from,
            to,
            weight,
            description,
        } => {
            let mut link = Link::new(from, to, weight);
            link.description = description;
            store.insert_link(&link).map_err(failed)?;
            print_json(&link)
        }
        Command::Hierarchy { lang } => {
            let service = GraphService::with_config(store, &config);
            print_json(&service.build_hierarchy(lang.as_deref())?)
        }
        Command::Filter { seeds, lang } => {
            let service = GraphService::with_config(store, &config);
            print_json(&service.filter_descendants(&seeds, lang.as_deref())?)
        }
        Command::Focus { id, lang } => {
            let service = GraphService::with_config(store, &config);
            print_json(&service.focus(&id, lang.as_deref())?)
        }
        Command::Page {
            index,
            window,
            seeds,
            focus,
            collapse,
        } => {
            let service = GraphService::with_config(store, &config);
            let mut state = ViewState::new(window.unwrap_or(service.page_window()))
                .map_err(|err| CliError::Usage(err.to_string()))?;
            state.lang = config.default_lang;
            if let Some(focus) = focus {
                state.focus_on(focus);
            } else if !seeds.is_empty() {
                state.select(Selection::Descendants(seeds));
            }
            state
                .set_page(index)
                .map_err(|err| CliError::Usage(err.to_string()))?;
            for id in collapse {
                state.collapse(id);
            }
            print_json(&service.render_view(&state)?)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(failed)?;
    println!("{text}");
    Ok(())
}
