mod logging;
mod table;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use minutes_core::{
    resolve_due_date, route, ActionItemExtractor, Config, FileTaskTracker, ImportUseCase,
    Priority, TaskTracker, TaskUpdate,
};
use tracing::debug;

#[derive(Parser)]
#[command(name = "minutes")]
#[command(about = "Turn meeting notes into routed tasks", long_about = None)]
struct Cli {
    /// Data directory holding config and tasks (default: ~/.minutes)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, a config file and the inbox project
    Init,
    /// Extract action items from notes (file or stdin)
    Extract {
        file: Option<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Resolve relative dates against this day (YYYY-MM-DD) instead of today
        #[arg(long)]
        reference: Option<NaiveDate>,
    },
    /// Show which project and section a line would be routed to
    Route {
        content: String,
        #[arg(long)]
        hint: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Extract, route and create tasks from notes (file or stdin)
    Import {
        file: Option<PathBuf>,
        /// Preferred destination project
        #[arg(long)]
        hint: Option<String>,
        /// Show the routing plan without creating tasks
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        reference: Option<NaiveDate>,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },
    /// Manage sections within a project
    Section {
        #[command(subcommand)]
        action: SectionCommand,
    },
    /// List tasks
    List {
        /// Only tasks in this project (by name)
        #[arg(long)]
        project: Option<String>,
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },
    /// Update a task (usage: update <ID> --due friday --priority 2)
    Update {
        id: String,
        #[arg(long)]
        content: Option<String>,
        /// Due date phrase, e.g. "tomorrow", "next friday", "2025-01-31"
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        priority: Option<u8>,
    },
    /// Mark a task as completed
    Close { id: String },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Add a project
    Add { name: String },
    /// List projects and their sections
    List,
}

#[derive(Subcommand)]
enum SectionCommand {
    /// Add a section to a project (by project name)
    Add { project: String, name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = Config::resolve_data_dir(cli.data_dir)?;
    let config = Config::load(&data_dir)?;
    logging::init(cli.log_level.as_deref().unwrap_or(&config.log_level))?;
    debug!(data_dir = %data_dir.display(), "loaded config");

    run(cli.command, &data_dir, &config)
}

/// Storage is only opened (and created) by commands that read or write tasks.
fn run(command: Commands, data_dir: &Path, config: &Config) -> Result<()> {
    let open_tracker = || FileTaskTracker::new(Some(data_dir.to_path_buf()));

    match command {
        Commands::Init => {
            if !Config::path(data_dir).exists() {
                config.save(data_dir)?;
            }
            let tracker = open_tracker()?;
            if tracker.find_project(&config.inbox_name)?.is_none() {
                tracker.add_project(&config.inbox_name)?;
            }
            println!("Initialized {}", data_dir.display());
        }
        Commands::Extract { file, json, reference } => {
            let text = read_input(file.as_deref())?;
            let items = ActionItemExtractor::new().extract_at(&text, reference_instant(reference));
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                table::show_items(&items);
            }
        }
        Commands::Route { content, hint, json } => {
            let projects = open_tracker()?.list_projects()?;
            let hint = hint.or_else(|| config.default_hint.clone());
            let result = route(&content, hint.as_deref(), &projects);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if !result.is_routed() {
                println!("No destination found (no projects configured).");
            } else {
                let project = projects.iter().find(|p| p.id == result.bucket_id);
                let section = project.and_then(|p| {
                    p.sub_buckets
                        .iter()
                        .find(|s| Some(&s.id) == result.sub_bucket_id.as_ref())
                });
                println!("Project: {}", project.map(|p| p.name.as_str()).unwrap_or("-"));
                println!("Section: {}", section.map(|s| s.name.as_str()).unwrap_or("-"));
            }
        }
        Commands::Import { file, hint, dry_run, json, reference } => {
            let text = read_input(file.as_deref())?;
            let reference = reference_instant(reference);
            let tracker = open_tracker()?;
            let usecase = ImportUseCase::new(&tracker).with_default_hint(config.default_hint.clone());

            if dry_run {
                let plan = usecase.plan(&text, hint.as_deref(), reference)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&plan)?);
                } else {
                    table::show_plan(&plan);
                }
            } else {
                let report = usecase.import(&text, hint.as_deref(), reference)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    table::show_report(&report);
                }
            }
        }
        Commands::Project { action } => {
            let tracker = open_tracker()?;
            match action {
                ProjectCommand::Add { name } => {
                    let project = tracker.add_project(&name)?;
                    println!("Project added: {} (ID: {})", project.name, project.id);
                }
                ProjectCommand::List => {
                    table::show_projects(&tracker.list_projects()?);
                }
            }
        }
        Commands::Section { action } => match action {
            SectionCommand::Add { project, name } => {
                let tracker = open_tracker()?;
                let bucket = tracker
                    .find_project(&project)?
                    .ok_or_else(|| anyhow!("Unknown project: '{}'", project))?;
                let section = tracker.add_section(&bucket.id, &name)?;
                println!("Section added: {} / {} (ID: {})", bucket.name, section.name, section.id);
            }
        },
        Commands::List { project, all } => {
            let tracker = open_tracker()?;
            let project_id = match project {
                Some(name) => Some(
                    tracker
                        .find_project(&name)?
                        .ok_or_else(|| anyhow!("Unknown project: '{}'", name))?
                        .id,
                ),
                None => None,
            };
            let mut tasks = tracker.list_tasks(project_id.as_deref())?;
            if !all {
                tasks.retain(|t| t.is_open());
            }
            table::show_tasks(&tasks, &tracker.list_projects()?);
        }
        Commands::Update { id, content, due, priority } => {
            let tracker = open_tracker()?;
            let id = resolve_task_id(&tracker, &id)?;
            let due = match due {
                Some(phrase) => Some(
                    resolve_due_date(&phrase, Local::now().naive_local())
                        .ok_or_else(|| anyhow!("Could not parse due date: '{}'", phrase))?,
                ),
                None => None,
            };
            let priority = priority
                .map(Priority::try_from)
                .transpose()
                .map_err(|e| anyhow!(e))?;

            let task = tracker.update_task(
                &id,
                TaskUpdate {
                    content,
                    description: None,
                    due,
                    priority,
                },
            )?;
            println!("Task updated: {}", task.content);
            if let Some(d) = task.due {
                println!("  Due: {}", d);
            }
            println!("  Priority: {} ({})", task.priority.ordinal(), table::priority_label(task.priority));
        }
        Commands::Close { id } => {
            let tracker = open_tracker()?;
            let id = resolve_task_id(&tracker, &id)?;
            tracker.close_task(&id)?;
            println!("Task closed: {}", id);
        }
    }
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn reference_instant(day: Option<NaiveDate>) -> NaiveDateTime {
    match day {
        Some(d) => d.and_time(NaiveTime::MIN),
        None => Local::now().naive_local(),
    }
}

/// Accepts a full task ID or a unique prefix (as shown by `list`).
fn resolve_task_id(tracker: &FileTaskTracker, prefix: &str) -> Result<String> {
    let matches: Vec<String> = tracker
        .list_tasks(None)?
        .into_iter()
        .filter(|t| t.id.starts_with(prefix))
        .map(|t| t.id)
        .collect();

    match matches.len() {
        1 => Ok(matches[0].clone()),
        0 => Err(anyhow!("Unknown task: '{}'", prefix)),
        _ => bail!("Ambiguous task ID: '{}' matches {} tasks", prefix, matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_leaves_data_dir_untouched() {
        let data = tempfile::tempdir().unwrap();
        let notes_dir = tempfile::tempdir().unwrap();
        let notes = notes_dir.path().join("notes.md");
        fs::write(&notes, "- send the recap\n").unwrap();

        let command = Commands::Extract {
            file: Some(notes),
            json: true,
            reference: NaiveDate::from_ymd_opt(2024, 6, 3),
        };
        run(command, data.path(), &Config::default()).unwrap();

        assert!(!data.path().join("tasks.json").exists());
        assert!(!data.path().join("projects.json").exists());
    }

    #[test]
    fn test_project_add_creates_storage() {
        let data = tempfile::tempdir().unwrap();
        let command = Commands::Project {
            action: ProjectCommand::Add {
                name: "Engineering".to_string(),
            },
        };
        run(command, data.path(), &Config::default()).unwrap();

        assert!(data.path().join("tasks.json").exists());
        let tracker = FileTaskTracker::new(Some(data.path().to_path_buf())).unwrap();
        assert!(tracker.find_project("engineering").unwrap().is_some());
    }
}
