use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::model::bucket::{Bucket, SubBucket};
use crate::model::task::{NewTask, Task, TaskUpdate};
use crate::repository::traits::TaskTracker;

const TASKS_FILE_NAME: &str = "tasks.json";
const PROJECTS_FILE_NAME: &str = "projects.json";

/// Local tracker keeping projects and tasks as JSON files.
#[derive(Clone)]
pub struct FileTaskTracker {
    tasks_path: PathBuf,
    projects_path: PathBuf,
}

impl FileTaskTracker {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let dir = Config::resolve_data_dir(base_dir)?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

        let tasks_path = dir.join(TASKS_FILE_NAME);
        let projects_path = dir.join(PROJECTS_FILE_NAME);
        init_file::<Task>(&tasks_path)?;
        init_file::<Bucket>(&projects_path)?;

        Ok(FileTaskTracker {
            tasks_path,
            projects_path,
        })
    }

    fn read_tasks(&self) -> Result<Vec<Task>> {
        read_json(&self.tasks_path)
    }

    fn write_tasks(&self, tasks: &[Task]) -> Result<()> {
        write_json(&self.tasks_path, tasks)
    }

    fn read_projects(&self) -> Result<Vec<Bucket>> {
        read_json(&self.projects_path)
    }

    fn write_projects(&self, projects: &[Bucket]) -> Result<()> {
        write_json(&self.projects_path, projects)
    }

    pub fn add_project(&self, name: &str) -> Result<Bucket> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Project name is required");
        }

        let mut projects = self.read_projects()?;
        if projects.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            bail!("Project '{}' already exists", name);
        }

        let project = Bucket::new(Uuid::new_v4().to_string(), name);
        projects.push(project.clone());
        self.write_projects(&projects)?;
        debug!(id = %project.id, name = %project.name, "project added");
        Ok(project)
    }

    pub fn add_section(&self, project_id: &str, name: &str) -> Result<SubBucket> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Section name is required");
        }

        let mut projects = self.read_projects()?;
        let project = projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| anyhow!("Project with ID {} not found", project_id))?;
        if project.sub_buckets.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            bail!("Section '{}' already exists in '{}'", name, project.name);
        }

        let section = SubBucket {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            bucket_id: project.id.clone(),
        };
        project.sub_buckets.push(section.clone());
        self.write_projects(&projects)?;
        Ok(section)
    }

    /// Case-insensitive lookup by exact project name.
    pub fn find_project(&self, name: &str) -> Result<Option<Bucket>> {
        let name = name.trim();
        Ok(self
            .read_projects()?
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name)))
    }

    fn check_destination(&self, project_id: &str, section_id: Option<&str>) -> Result<()> {
        let projects = self.read_projects()?;
        let project = projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| anyhow!("Project with ID {} not found", project_id))?;
        if let Some(section_id) = section_id {
            if !project.sub_buckets.iter().any(|s| s.id == section_id) {
                bail!("Section with ID {} not found in '{}'", section_id, project.name);
            }
        }
        Ok(())
    }
}

impl TaskTracker for FileTaskTracker {
    fn create_task(&self, task: NewTask) -> Result<Task> {
        if task.content.trim().is_empty() {
            bail!("Task content is required");
        }
        self.check_destination(&task.project_id, task.section_id.as_deref())?;

        let created = Task::from_new(task);
        let mut tasks = self.read_tasks()?;
        tasks.push(created.clone());
        self.write_tasks(&tasks)?;
        Ok(created)
    }

    fn create_subtask(&self, parent_id: &str, task: NewTask) -> Result<Task> {
        if task.content.trim().is_empty() {
            bail!("Task content is required");
        }

        let mut tasks = self.read_tasks()?;
        let parent = tasks
            .iter()
            .find(|t| t.id == parent_id)
            .ok_or_else(|| anyhow!("Task with ID {} not found", parent_id))?;

        let mut created = Task::from_new(NewTask {
            project_id: parent.project_id.clone(),
            section_id: parent.section_id.clone(),
            ..task
        });
        created.parent_id = Some(parent.id.clone());

        tasks.push(created.clone());
        self.write_tasks(&tasks)?;
        Ok(created)
    }

    fn list_tasks(&self, project_id: Option<&str>) -> Result<Vec<Task>> {
        let tasks = self.read_tasks()?;
        Ok(match project_id {
            Some(id) => tasks.into_iter().filter(|t| t.project_id == id).collect(),
            None => tasks,
        })
    }

    fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let mut tasks = self.read_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("Task with ID {} not found", id))?;
        task.apply(update);
        let updated = task.clone();
        self.write_tasks(&tasks)?;
        Ok(updated)
    }

    fn close_task(&self, id: &str) -> Result<()> {
        let mut tasks = self.read_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("Task with ID {} not found", id))?;
        task.close();
        self.write_tasks(&tasks)
    }

    fn list_projects(&self) -> Result<Vec<Bucket>> {
        self.read_projects()
    }

    fn list_sections(&self, project_id: &str) -> Result<Vec<SubBucket>> {
        self.read_projects()?
            .into_iter()
            .find(|p| p.id == project_id)
            .map(|p| p.sub_buckets)
            .ok_or_else(|| anyhow!("Project with ID {} not found", project_id))
    }
}

fn init_file<T: Serialize>(path: &Path) -> Result<()> {
    if !path.exists() {
        write_json(path, &Vec::<T>::new())?;
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let items = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(items)
}

fn write_json<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, items)?;
    writer.flush()?;
    Ok(())
}
