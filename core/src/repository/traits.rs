use crate::model::bucket::{Bucket, SubBucket};
use crate::model::task::{NewTask, Task, TaskUpdate};
use anyhow::Result;

/// Task-tracking service that receives routed action items.
///
/// Identifiers are opaque strings owned by the tracker.
pub trait TaskTracker {
    fn create_task(&self, task: NewTask) -> Result<Task>;
    /// Creates a child of `parent_id`; project and section follow the parent.
    fn create_subtask(&self, parent_id: &str, task: NewTask) -> Result<Task>;
    fn list_tasks(&self, project_id: Option<&str>) -> Result<Vec<Task>>;
    fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task>;
    fn close_task(&self, id: &str) -> Result<()>;
    /// All projects, each with its sections.
    fn list_projects(&self) -> Result<Vec<Bucket>>;
    fn list_sections(&self, project_id: &str) -> Result<Vec<SubBucket>>;
}
