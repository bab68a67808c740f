use serde::{Deserialize, Serialize};
use crate::model::action_item::ExtractedActionItem;
use crate::model::bucket::RouteResult;

/// An extracted item paired with where it would go.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlannedItem {
    pub item: ExtractedActionItem,
    pub route: RouteResult,
    pub project: Option<String>,
    pub section: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreatedTask {
    pub task_id: String,
    pub content: String,
    pub project: Option<String>,
    pub section: Option<String>,
    pub subtasks: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub content: String,
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FailedItem {
    pub content: String,
    /// Set when the parent task was created but a subtask was not.
    pub task_id: Option<String>,
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ImportReport {
    pub created: Vec<CreatedTask>,
    pub skipped: Vec<SkippedItem>,
    pub failed: Vec<FailedItem>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.skipped.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}
