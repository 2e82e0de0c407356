//! CLI entry point for huddle.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use huddle_app::{AppConfig, TaskService, UserDirectory, caller_from_params_or_env};
use huddle_store_mem::MemStore;

mod commands;
mod shell;

const DEFAULT_STORE_FILE: &str = ".huddle/tasks.json";
const PROFILES_FILE: &str = ".huddle/profiles.json";

/// A shared task list on the command line.
#[derive(Parser, Debug)]
#[command(
    name = "huddle",
    version,
    about = "huddle: a shared task list with live, per-user visibility"
)]
struct Cli {
    /// Base directory holding `.huddle/` (defaults to current).
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Act as this user id (defaults to HUDDLE_USER_ID, then the name).
    #[arg(long)]
    user_id: Option<String>,

    /// Act with this display name (defaults to HUDDLE_USER_NAME, then USER).
    #[arg(long)]
    user_name: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task owned by the acting user.
    Add {
        /// Task text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List the tasks visible to the acting user, newest first.
    Ls {
        /// Skip checked tasks.
        #[arg(long)]
        hide_completed: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Mark a task as done.
    Check {
        /// Task id.
        task: String,
    },

    /// Mark a task as not done.
    Uncheck {
        /// Task id.
        task: String,
    },

    /// Delete a task.
    Rm {
        /// Task id.
        task: String,
    },

    /// Make a task visible only to its owner.
    Private {
        /// Task id.
        task: String,
    },

    /// Make a task visible to everyone again.
    Public {
        /// Task id.
        task: String,
    },

    /// Select the acting user's UI language.
    Lang {
        /// Language code from the configured list.
        language: String,
    },

    /// Start an interactive shell with a live task mirror.
    Shell,
}

/// Output format for `ls`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    /// Human-readable table.
    Table,
    /// Pretty-printed JSON.
    Json,
}

fn main() -> Result<()> {
    let Cli {
        dir,
        user_id,
        user_name,
        cmd,
    } = Cli::parse();

    install_tracing();

    let base = dir.unwrap_or_else(|| PathBuf::from("."));
    let caller = caller_from_params_or_env(user_id.as_deref(), user_name.as_deref());
    execute_command(&base, caller, cmd)
}

fn execute_command(base: &Path, caller: huddle_app::Caller, command: Command) -> Result<()> {
    let config = AppConfig::load(base)?;
    let store_path = config
        .store_path(base)
        .unwrap_or_else(|| base.join(DEFAULT_STORE_FILE));
    if let Some(parent) = store_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = MemStore::open(store_path)?;
    let profiles_path = base.join(PROFILES_FILE);
    if let Some(parent) = profiles_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let profiles = UserDirectory::open(profiles_path)?;
    let service = TaskService::with_profiles(store, profiles, config);

    match command {
        Command::Shell => shell::run(&service, caller),
        other => commands::run(other, &service, &caller),
    }
}

fn install_tracing() {
    // RUST_LOG overrides; the default is INFO.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from(["huddle", "--user-name", "alice", "add", "buy", "milk"]);
        match cli.cmd {
            Command::Add { text } => assert_eq!(text.join(" "), "buy milk"),
            _ => panic!("expected add command"),
        }
        assert_eq!(cli.user_name.as_deref(), Some("alice"));
    }

    #[test]
    fn parse_ls_command_with_flags() {
        let cli = Cli::parse_from(["huddle", "ls", "--hide-completed", "--format", "json"]);
        match cli.cmd {
            Command::Ls {
                hide_completed,
                format,
            } => {
                assert!(hide_completed);
                assert_eq!(format, LsFormat::Json);
            }
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn parse_private_command() {
        let cli = Cli::parse_from([
            "huddle",
            "private",
            "00000000-0000-7000-8000-000000000001",
        ]);
        match cli.cmd {
            Command::Private { task } => {
                assert_eq!(task, "00000000-0000-7000-8000-000000000001");
            }
            _ => panic!("expected private command"),
        }
    }

    #[test]
    fn parse_shell_command() {
        let cli = Cli::parse_from(["huddle", "--dir", "/tmp/list", "shell"]);
        assert!(matches!(cli.cmd, Command::Shell));
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/list")));
    }
}
