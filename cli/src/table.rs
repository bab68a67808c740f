use chrono::NaiveDate;
use minutes_core::{Bucket, ExtractedActionItem, ImportReport, PlannedItem, Priority, Task};
use tabled::{Table, Tabled};
use tabled::settings::{Style, Color, Modify};
use tabled::settings::object::Rows;

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "P")]
    priority: u8,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Subtasks")]
    subtasks: String,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "P")]
    priority: u8,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Section")]
    section: String,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "P")]
    priority: u8,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Sections")]
    sections: String,
}

pub fn show_items(items: &[ExtractedActionItem]) {
    if items.is_empty() {
        println!("No action items found.");
        return;
    }

    let rows = items.iter().enumerate().map(|(i, item)| ItemRow {
        index: i + 1,
        content: item.content.clone(),
        priority: item.priority.ordinal(),
        due: format_due(item.due_date),
        subtasks: item.subtasks.join("\n"),
    });
    print_table(Table::new(rows));
}

pub fn show_plan(plan: &[PlannedItem]) {
    if plan.is_empty() {
        println!("No action items found.");
        return;
    }

    let rows = plan.iter().map(|p| PlanRow {
        content: p.item.content.clone(),
        priority: p.item.priority.ordinal(),
        due: format_due(p.item.due_date),
        project: p.project.clone().unwrap_or_else(|| "(none)".to_string()),
        section: p.section.clone().unwrap_or_else(|| "-".to_string()),
    });
    print_table(Table::new(rows));
}

pub fn show_report(report: &ImportReport) {
    println!(
        "Created {}, skipped {}, failed {}.",
        report.created.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for created in &report.created {
        let destination = match (&created.project, &created.section) {
            (Some(p), Some(s)) => format!("{} / {}", p, s),
            (Some(p), None) => p.clone(),
            _ => "-".to_string(),
        };
        println!("  + {} [{}] ({})", created.content, destination, short_id(&created.task_id));
    }
    for skipped in &report.skipped {
        println!("  ~ {} ({})", skipped.content, skipped.reason);
    }
    for failed in &report.failed {
        println!("  ! {}: {}", failed.content, failed.error);
    }
}

pub fn show_tasks(tasks: &[Task], projects: &[Bucket]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let rows = tasks.iter().map(|task| {
        let project = projects.iter().find(|p| p.id == task.project_id);
        let section = project.and_then(|p| {
            p.sub_buckets
                .iter()
                .find(|s| Some(&s.id) == task.section_id.as_ref())
        });
        let project = match (project, section) {
            (Some(p), Some(s)) => format!("{} / {}", p.name, s.name),
            (Some(p), None) => p.name.clone(),
            _ => "-".to_string(),
        };
        let content = match task.parent_id {
            Some(_) => format!("  └ {}", task.content),
            None => task.content.clone(),
        };
        TaskRow {
            id: short_id(&task.id).to_string(),
            content,
            priority: task.priority.ordinal(),
            due: format_due(task.due),
            project,
            status: format!("{:?}", task.status),
        }
    });
    print_table(Table::new(rows));
}

pub fn show_projects(projects: &[Bucket]) {
    if projects.is_empty() {
        println!("No projects found. Run `minutes init` or `minutes project add <NAME>`.");
        return;
    }

    let rows = projects.iter().map(|p| ProjectRow {
        id: short_id(&p.id).to_string(),
        name: p.name.clone(),
        sections: p
            .sub_buckets
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    });
    print_table(Table::new(rows));
}

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent => "urgent",
        Priority::Elevated => "elevated",
        Priority::Medium => "medium",
        Priority::Normal => "normal",
    }
}

fn print_table(mut table: Table) {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN)); // Header color
    println!("{}", table);
}

fn format_due(due: Option<NaiveDate>) -> String {
    due.map(|d| d.format("%Y-%m-%d (%a)").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
