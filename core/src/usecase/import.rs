use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::model::bucket::Bucket;
use crate::model::task::NewTask;
use crate::repository::TaskTracker;
use crate::service::dto::{CreatedTask, FailedItem, ImportReport, PlannedItem, SkippedItem};
use crate::service::extractor::ActionItemExtractor;
use crate::service::router::route;
use crate::time::{DateParser, PhraseDateParser};

/// Turns meeting notes into tracker tasks: extract, route, create.
///
/// Items are handled one at a time. A failure on one item is recorded in
/// the report and the rest are still attempted.
pub struct ImportUseCase<'a, T: TaskTracker, P: DateParser = PhraseDateParser> {
    tracker: &'a T,
    extractor: ActionItemExtractor<P>,
    default_hint: Option<String>,
}

impl<'a, T: TaskTracker> ImportUseCase<'a, T, PhraseDateParser> {
    pub fn new(tracker: &'a T) -> Self {
        Self::with_extractor(tracker, ActionItemExtractor::new())
    }
}

impl<'a, T: TaskTracker, P: DateParser> ImportUseCase<'a, T, P> {
    pub fn with_extractor(tracker: &'a T, extractor: ActionItemExtractor<P>) -> Self {
        Self {
            tracker,
            extractor,
            default_hint: None,
        }
    }

    /// Hint used when a call passes none (or a blank one).
    pub fn with_default_hint(mut self, hint: Option<String>) -> Self {
        self.default_hint = hint.filter(|h| !h.trim().is_empty());
        self
    }

    /// Extracts and routes without creating anything.
    pub fn plan(&self, text: &str, hint: Option<&str>, reference: NaiveDateTime) -> Result<Vec<PlannedItem>> {
        let buckets = self
            .tracker
            .list_projects()
            .context("Failed to list projects")?;
        Ok(self.plan_with(&buckets, text, hint, reference))
    }

    pub fn import(&self, text: &str, hint: Option<&str>, reference: NaiveDateTime) -> Result<ImportReport> {
        let planned = self.plan(text, hint, reference)?;
        let mut report = ImportReport::default();

        for item in planned {
            if !item.route.is_routed() {
                warn!(content = %item.item.content, "no destination project, skipping");
                report.skipped.push(SkippedItem {
                    content: item.item.content,
                    reason: "no destination project".to_string(),
                });
                continue;
            }

            match self.create(&item) {
                Ok(created) => {
                    info!(
                        task_id = %created.task_id,
                        project = ?created.project,
                        subtasks = created.subtasks,
                        "created task"
                    );
                    report.created.push(created);
                }
                Err((task_id, err)) => {
                    warn!(content = %item.item.content, error = %err, "failed to create task");
                    report.failed.push(FailedItem {
                        content: item.item.content,
                        task_id,
                        error: format!("{:#}", err),
                    });
                }
            }
        }

        Ok(report)
    }

    fn plan_with(
        &self,
        buckets: &[Bucket],
        text: &str,
        hint: Option<&str>,
        reference: NaiveDateTime,
    ) -> Vec<PlannedItem> {
        let hint = hint
            .filter(|h| !h.trim().is_empty())
            .or(self.default_hint.as_deref());

        self.extractor
            .extract_at(text, reference)
            .into_iter()
            .map(|item| {
                let destination = route(&item.content, hint, buckets);
                let bucket = buckets.iter().find(|b| b.id == destination.bucket_id);
                let section = bucket.and_then(|b| {
                    b.sub_buckets
                        .iter()
                        .find(|s| Some(&s.id) == destination.sub_bucket_id.as_ref())
                });
                PlannedItem {
                    project: bucket.map(|b| b.name.clone()),
                    section: section.map(|s| s.name.clone()),
                    item,
                    route: destination,
                }
            })
            .collect()
    }

    /// On error, also returns the parent task id if it was already created.
    fn create(&self, planned: &PlannedItem) -> Result<CreatedTask, (Option<String>, anyhow::Error)> {
        let item = &planned.item;
        let task = self
            .tracker
            .create_task(NewTask {
                content: item.content.clone(),
                description: Some(item.description.clone()),
                due: item.due_date,
                priority: item.priority,
                project_id: planned.route.bucket_id.clone(),
                section_id: planned.route.sub_bucket_id.clone(),
            })
            .map_err(|err| (None, err))?;

        for subtask in &item.subtasks {
            let mut sub = NewTask::new(subtask.as_str(), task.project_id.as_str());
            sub.priority = item.priority;
            self.tracker
                .create_subtask(&task.id, sub)
                .with_context(|| format!("Failed to create subtask '{}'", subtask))
                .map_err(|err| (Some(task.id.clone()), err))?;
        }

        Ok(CreatedTask {
            task_id: task.id,
            content: task.content,
            project: planned.project.clone(),
            section: planned.section.clone(),
            subtasks: item.subtasks.len(),
        })
    }
}
