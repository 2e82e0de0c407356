//! One-shot subcommand execution against the task service.

use std::str::FromStr;

use anyhow::{Context, Result, bail};
use time::format_description::well_known::Rfc3339;

use huddle_app::{Caller, ClientSession, TaskService, TaskStore};
use huddle_core::TaskId;

use crate::{Command, LsFormat};

pub fn run<S: TaskStore>(command: Command, service: &TaskService<S>, caller: &Caller) -> Result<()> {
    match command {
        Command::Add { text } => {
            let task = service.add_task(caller, &text.join(" "))?;
            println!("added task: {}", task.id);
        }
        Command::Ls {
            hide_completed,
            format,
        } => {
            let mut session = ClientSession::connect(service, caller.clone())?;
            session.set_hide_completed(hide_completed);
            match format {
                LsFormat::Table => render_task_table(&session),
                LsFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&session.visible_tasks())?);
                }
            }
        }
        Command::Check { task } => {
            let id = parse_task_id(&task)?;
            service.set_checked(caller, id, true)?;
            println!("checked: {id}");
        }
        Command::Uncheck { task } => {
            let id = parse_task_id(&task)?;
            service.set_checked(caller, id, false)?;
            println!("unchecked: {id}");
        }
        Command::Rm { task } => {
            let id = parse_task_id(&task)?;
            service.delete_task(caller, id)?;
            println!("deleted: {id}");
        }
        Command::Private { task } => {
            let id = parse_task_id(&task)?;
            service.set_private(caller, id, true)?;
            println!("now private: {id}");
        }
        Command::Public { task } => {
            let id = parse_task_id(&task)?;
            service.set_private(caller, id, false)?;
            println!("now public: {id}");
        }
        Command::Lang { language } => {
            if !service.config().is_supported(&language) {
                bail!(
                    "language '{}' is not offered (choose from: {})",
                    language,
                    service.config().languages().join(", ")
                );
            }
            let mut session = ClientSession::connect(service, caller.clone())?;
            session.set_language(service, &language)?;
            println!("language set to '{language}'");
        }
        Command::Shell => unreachable!("Shell is routed before commands::run"),
    }

    Ok(())
}

fn parse_task_id(value: &str) -> Result<TaskId> {
    TaskId::from_str(value).with_context(|| format!("invalid task id: {value}"))
}

fn render_task_table(session: &ClientSession) {
    let tasks = session.visible_tasks();
    if tasks.is_empty() {
        println!("No tasks found");
        return;
    }

    println!("ID | Done | Private | Owner | Created | Text");
    println!("-- | ---- | ------- | ----- | ------- | ----");
    for task in &tasks {
        let created = task
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| "-".to_owned());
        println!(
            "{} | {} | {} | {} | {} | {}",
            task.id,
            if task.checked { "x" } else { " " },
            if task.private { "yes" } else { "no" },
            task.username,
            created,
            task.text
        );
    }
    println!("{} incomplete", session.incomplete_count());
}
