use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Four-level scale shared with the task tracker: 1 is the most pressing.
///
/// `Medium` (3) exists so the scale lines up with the tracker's own levels;
/// the classifier never produces it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Urgent = 1,
    Elevated = 2,
    Medium = 3,
    Normal = 4,
}

impl Priority {
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.ordinal()
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Urgent),
            2 => Ok(Priority::Elevated),
            3 => Ok(Priority::Medium),
            4 => Ok(Priority::Normal),
            other => Err(format!("priority must be between 1 and 4, got {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Status {
    Open,
    Completed,
}

impl Default for Status {
    fn default() -> Self {
        Status::Open
    }
}

/// A work item as stored by a task tracker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub content: String,
    pub description: Option<String>,
    pub due: Option<NaiveDate>,
    pub priority: Priority,
    pub project_id: String,
    pub section_id: Option<String>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn from_new(new_task: NewTask) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: new_task.content,
            description: new_task.description,
            due: new_task.due,
            priority: new_task.priority,
            project_id: new_task.project_id,
            section_id: new_task.section_id,
            parent_id: None,
            status: Status::default(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == Status::Open
    }

    pub fn close(&mut self) {
        self.status = Status::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(due) = update.due {
            self.due = Some(due);
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
    }
}

/// Creation request for `TaskTracker::create_task` and `create_subtask`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTask {
    pub content: String,
    pub description: Option<String>,
    pub due: Option<NaiveDate>,
    pub priority: Priority,
    pub project_id: String,
    pub section_id: Option<String>,
}

impl NewTask {
    pub fn new(content: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            project_id: project_id.into(),
            ..Default::default()
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskUpdate {
    pub content: Option<String>,
    pub description: Option<String>,
    pub due: Option<NaiveDate>,
    pub priority: Option<Priority>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_serializes_as_ordinal() {
        let json = serde_json::to_string(&Priority::Urgent).unwrap();
        assert_eq!(json, "1");
        let parsed: Priority = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, Priority::Normal);
        let reserved: Priority = serde_json::from_str("3").unwrap();
        assert_eq!(reserved, Priority::Medium);
        assert!(Priority::Elevated < Priority::Medium);
        assert!(serde_json::from_str::<Priority>("5").is_err());
    }

    #[test]
    fn test_apply_update_keeps_unset_fields() {
        let mut task = Task::from_new(NewTask::new("Write notes", "p1"));
        task.apply(TaskUpdate {
            priority: Some(Priority::Elevated),
            ..Default::default()
        });
        assert_eq!(task.content, "Write notes");
        assert_eq!(task.priority, Priority::Elevated);
        assert!(task.is_open());

        task.close();
        assert!(!task.is_open());
        assert!(task.completed_at.is_some());
    }
}
