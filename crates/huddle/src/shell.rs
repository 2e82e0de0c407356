//! Interactive shell: a live, filtered mirror of the shared list.
//!
//! Queued deltas are applied before every render, so other writers'
//! changes show up without re-running a query.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use huddle_app::{Caller, ClientSession, TaskService, TaskStore};
use huddle_core::TaskId;

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Help,
    Ls,
    Add(String),
    Check(String),
    Uncheck(String),
    Rm(String),
    Private(String),
    Public(String),
    Hide(bool),
    Lang(String),
    Count,
    Login { id: String, name: Option<String> },
    Logout,
    Whoami,
    Quit,
}

impl ShellCommand {
    /// Parse a line; `None` means blank input or an unknown keyword.
    fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (trimmed, ""),
        };
        match (keyword, rest) {
            ("", _) => None,
            ("help", _) => Some(Self::Help),
            ("ls" | "list", _) => Some(Self::Ls),
            ("add", text) if !text.is_empty() => Some(Self::Add(text.to_owned())),
            ("check", target) if !target.is_empty() => Some(Self::Check(target.to_owned())),
            ("uncheck", target) if !target.is_empty() => Some(Self::Uncheck(target.to_owned())),
            ("rm" | "del", target) if !target.is_empty() => Some(Self::Rm(target.to_owned())),
            ("private", target) if !target.is_empty() => Some(Self::Private(target.to_owned())),
            ("public", target) if !target.is_empty() => Some(Self::Public(target.to_owned())),
            ("hide", "on") => Some(Self::Hide(true)),
            ("hide", "off") => Some(Self::Hide(false)),
            ("lang", language) if !language.is_empty() => Some(Self::Lang(language.to_owned())),
            ("count", _) => Some(Self::Count),
            ("login", rest) if !rest.is_empty() => {
                let mut parts = rest.split_whitespace();
                let id = parts.next()?.to_owned();
                let name = parts.next().map(ToOwned::to_owned);
                Some(Self::Login { id, name })
            }
            ("logout", _) => Some(Self::Logout),
            ("whoami", _) => Some(Self::Whoami),
            ("quit" | "exit", _) => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Run the shell loop until EOF or `quit`.
pub fn run<S: TaskStore>(service: &TaskService<S>, caller: Caller) -> Result<()> {
    let mut session = ClientSession::connect(service, caller)?;
    println!("huddle shell — type 'help' for commands");
    print_status(&session);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("huddle> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        session.drain();

        let Some(command) = ShellCommand::parse(&line) else {
            if !line.trim().is_empty() {
                eprintln!("unknown command; type 'help'");
            }
            continue;
        };
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(err) = execute(command, service, &mut session) {
            eprintln!("error: {err}");
        }
        session.drain();
    }
    Ok(())
}

fn execute<S: TaskStore>(
    command: ShellCommand,
    service: &TaskService<S>,
    session: &mut ClientSession,
) -> Result<()> {
    let caller = session.caller().clone();
    match command {
        ShellCommand::Help => print_help(),
        ShellCommand::Ls => {
            session.drain();
            render_list(session);
        }
        ShellCommand::Add(text) => {
            let task = service.add_task(&caller, &text)?;
            println!("added: {}", task.id);
        }
        ShellCommand::Check(target) => {
            let id = resolve_target(session, &target)?;
            service.set_checked(&caller, id, true)?;
        }
        ShellCommand::Uncheck(target) => {
            let id = resolve_target(session, &target)?;
            service.set_checked(&caller, id, false)?;
        }
        ShellCommand::Rm(target) => {
            let id = resolve_target(session, &target)?;
            service.delete_task(&caller, id)?;
        }
        ShellCommand::Private(target) => {
            let id = resolve_target(session, &target)?;
            service.set_private(&caller, id, true)?;
        }
        ShellCommand::Public(target) => {
            let id = resolve_target(session, &target)?;
            service.set_private(&caller, id, false)?;
        }
        ShellCommand::Hide(hide) => {
            session.set_hide_completed(hide);
            render_list(session);
        }
        ShellCommand::Lang(language) => {
            if !service.config().is_supported(&language) {
                bail!(
                    "language '{}' is not offered (choose from: {})",
                    language,
                    service.config().languages().join(", ")
                );
            }
            session.set_language(service, &language)?;
            println!("language: {language}");
        }
        ShellCommand::Count => println!("{} incomplete", session.incomplete_count()),
        ShellCommand::Login { id, name } => {
            let username = name.unwrap_or_else(|| id.clone());
            session.login(service, Caller::user(id, username))?;
            print_status(session);
        }
        ShellCommand::Logout => {
            session.logout(service)?;
            print_status(session);
        }
        ShellCommand::Whoami => print_status(session),
        ShellCommand::Quit => {}
    }
    Ok(())
}

/// Resolve a 1-based list position or a full task id.
fn resolve_target(session: &ClientSession, target: &str) -> Result<TaskId> {
    if let Ok(position) = target.parse::<usize>() {
        let tasks = session.visible_tasks();
        return position
            .checked_sub(1)
            .and_then(|index| tasks.get(index))
            .map(|task| task.id)
            .with_context(|| format!("no task at position {position}"));
    }
    TaskId::from_str(target).with_context(|| format!("invalid task id: {target}"))
}

fn render_list(session: &ClientSession) {
    let tasks = session.visible_tasks();
    if tasks.is_empty() {
        println!("(no tasks)");
        return;
    }
    for (position, task) in tasks.iter().enumerate() {
        let own = if session.is_owner(task) { "*" } else { " " };
        let done = if task.checked { "x" } else { " " };
        let privacy = if task.private { " (private)" } else { "" };
        println!(
            "{:>3} [{done}]{own} {} — {}{privacy}",
            position + 1,
            task.text,
            task.username
        );
    }
    println!("{} incomplete", session.incomplete_count());
}

fn print_status(session: &ClientSession) {
    match session.caller().info() {
        Some(user) => println!("logged in as {} ({}), lang {}", user.username, user.id, session.language()),
        None => println!("anonymous, lang {}", session.language()),
    }
}

fn print_help() {
    println!("commands:");
    println!("  ls                     show visible tasks, newest first");
    println!("  add <text>             add a task (requires login)");
    println!("  check/uncheck <n|id>   toggle completion");
    println!("  rm <n|id>              delete a task");
    println!("  private/public <n|id>  change task visibility (owner only)");
    println!("  hide on|off            hide checked tasks locally");
    println!("  lang <code>            select UI language");
    println!("  count                  incomplete task count");
    println!("  login <id> [name]      switch identity");
    println!("  logout / whoami / quit");
}
