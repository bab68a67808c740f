use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::model::task::Priority;

pub const MAX_CONTENT_CHARS: usize = 500;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MAX_SUBTASKS: usize = 20;

/// One action item found in meeting notes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExtractedActionItem {
    pub content: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub subtasks: Vec<String>,
}
