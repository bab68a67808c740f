use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::model::action_item::{
    ExtractedActionItem, MAX_CONTENT_CHARS, MAX_DESCRIPTION_CHARS, MAX_SUBTASKS,
};
use crate::service::due_date::DueDateResolver;
use crate::service::priority::classify;
use crate::time::{DateParser, PhraseDateParser};

const MIN_CONTENT_CHARS: usize = 2;
const BARE_BULLET_MIN_CHARS: usize = 4;

struct Patterns {
    list_marker: Regex,
    checkbox: Regex,
    label: Regex,
    bare_bullet: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    list_marker: Regex::new(r"^(?:[-*•]|\d+[.)])\s+(.*)$").expect("valid list marker regex"),
    checkbox: Regex::new(r"(?i)^\[[ x]\]\s*(.*)$").expect("valid checkbox regex"),
    label: Regex::new(
        r"(?i)^(?:action(?:\s+item)?|todo|to-do|follow[- ]?up|next\s+steps?|deliverable)\s*:\s*(.*)$",
    )
    .expect("valid label regex"),
    bare_bullet: Regex::new(r"^[-*•]([^\s*•-].*)$").expect("valid bare bullet regex"),
});

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    raw: &'a str,
    text: &'a str,
    indent: usize,
}

impl<'a> Line<'a> {
    fn new(raw: &'a str) -> Self {
        let text = raw.trim();
        let indent = raw.len() - raw.trim_start().len();
        Self { raw, text, indent }
    }

    fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    fn is_heading(&self) -> bool {
        self.text.starts_with('#')
    }
}

/// An item whose continuation lines are still being collected.
struct PendingItem<'a> {
    opening: Line<'a>,
    content: String,
    description: Vec<&'a str>,
    subtasks: Vec<String>,
}

impl<'a> PendingItem<'a> {
    fn accepts(&self, line: &Line<'a>) -> bool {
        !line.is_blank() && !line.is_heading() && line.indent > self.opening.indent
    }

    fn push(&mut self, line: Line<'a>, patterns: &Patterns) {
        self.description.push(line.raw.trim_end());
        let subtask = strip_list_marker(line.text, patterns).unwrap_or(line.text);
        if !subtask.is_empty() {
            self.subtasks.push(subtask.to_string());
        }
    }
}

enum ScanState<'a> {
    Scanning,
    Collecting(PendingItem<'a>),
}

/// Pulls action items out of free-form meeting notes.
///
/// A line opens an item when it starts with a bullet, a numbered-list marker,
/// a checkbox or an explicit label such as `TODO:`. Lines indented below it
/// are folded into the item as subtasks until a blank line, a heading or a
/// dedent.
#[derive(Debug, Clone, Default)]
pub struct ActionItemExtractor<P: DateParser = PhraseDateParser> {
    resolver: DueDateResolver<P>,
}

impl ActionItemExtractor<PhraseDateParser> {
    pub fn new() -> Self {
        Self {
            resolver: DueDateResolver::new(),
        }
    }
}

impl<P: DateParser> ActionItemExtractor<P> {
    pub fn with_parser(parser: P) -> Self {
        Self {
            resolver: DueDateResolver::with_parser(parser),
        }
    }

    /// Extracts items, resolving relative dates against the local clock.
    pub fn extract(&self, text: &str) -> Vec<ExtractedActionItem> {
        self.extract_at(text, Local::now().naive_local())
    }

    /// Accepts tool-call arguments: anything but a JSON string yields nothing.
    pub fn extract_value(&self, value: &Value, reference: NaiveDateTime) -> Vec<ExtractedActionItem> {
        match value {
            Value::String(text) => self.extract_at(text, reference),
            _ => Vec::new(),
        }
    }

    pub fn extract_at(&self, text: &str, reference: NaiveDateTime) -> Vec<ExtractedActionItem> {
        let patterns = &*PATTERNS;

        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let lines: Vec<Line> = normalized.split('\n').map(Line::new).collect();

        let mut items = Vec::new();
        let mut state = ScanState::Scanning;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            state = match state {
                ScanState::Scanning => {
                    i += 1;
                    if line.is_blank() {
                        ScanState::Scanning
                    } else {
                        match opening_content(line.text, patterns) {
                            Some(content) => ScanState::Collecting(PendingItem {
                                opening: line,
                                content: content.to_string(),
                                description: vec![line.text],
                                subtasks: Vec::new(),
                            }),
                            None => ScanState::Scanning,
                        }
                    }
                }
                ScanState::Collecting(mut pending) => {
                    if pending.accepts(&line) {
                        pending.push(line, patterns);
                        i += 1;
                        ScanState::Collecting(pending)
                    } else {
                        // Rescan this line without consuming it.
                        items.push(self.finish(pending, reference));
                        ScanState::Scanning
                    }
                }
            };
        }

        if let ScanState::Collecting(pending) = state {
            items.push(self.finish(pending, reference));
        }

        items
    }

    fn finish(&self, pending: PendingItem, reference: NaiveDateTime) -> ExtractedActionItem {
        let due_date = self
            .resolver
            .resolve(&pending.content, reference)
            .or_else(|| self.resolver.resolve(pending.opening.text, reference));
        let priority = classify(pending.opening.text);

        let mut subtasks = pending.subtasks;
        subtasks.truncate(MAX_SUBTASKS);

        let item = ExtractedActionItem {
            content: truncate_chars(&pending.content, MAX_CONTENT_CHARS),
            description: truncate_chars(&pending.description.join("\n"), MAX_DESCRIPTION_CHARS),
            due_date,
            priority,
            subtasks,
        };
        debug!(
            content = %item.content,
            priority = item.priority.ordinal(),
            due = ?item.due_date,
            subtasks = item.subtasks.len(),
            "extracted action item"
        );
        item
    }
}

/// Extracts items from `text` with the built-in date parser.
pub fn extract_action_items(text: &str) -> Vec<ExtractedActionItem> {
    ActionItemExtractor::new().extract(text)
}

/// Returns the item content if `text` opens an action item.
fn opening_content<'t>(text: &'t str, patterns: &Patterns) -> Option<&'t str> {
    let mut rest = text;
    let mut marked = false;

    if let Some(stripped) = capture_rest(&patterns.list_marker, rest) {
        rest = stripped;
        marked = true;
    }
    if let Some(stripped) = capture_rest(&patterns.checkbox, rest) {
        rest = stripped;
        marked = true;
    }
    if let Some(stripped) = capture_rest(&patterns.label, rest) {
        rest = stripped;
        marked = true;
    }
    if !marked && text.chars().count() >= BARE_BULLET_MIN_CHARS {
        if let Some(stripped) = capture_rest(&patterns.bare_bullet, rest) {
            rest = stripped;
            marked = true;
        }
    }

    let content = rest.trim();
    if !marked
        || content.chars().count() < MIN_CONTENT_CHARS
        || !content.chars().any(char::is_alphanumeric)
    {
        return None;
    }
    Some(content)
}

/// Strips bullet, number and checkbox markers from a nested line.
fn strip_list_marker<'t>(text: &'t str, patterns: &Patterns) -> Option<&'t str> {
    let after_list = capture_rest(&patterns.list_marker, text);
    let after_checkbox = capture_rest(&patterns.checkbox, after_list.unwrap_or(text));
    after_checkbox.or(after_list).map(str::trim)
}

fn capture_rest<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use chrono::NaiveDate;

    // Monday, 2024-06-03
    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn extract(text: &str) -> Vec<ExtractedActionItem> {
        ActionItemExtractor::new().extract_at(text, reference())
    }

    #[test]
    fn test_patterns_compile() {
        LazyLock::force(&PATTERNS);
    }

    #[test]
    fn test_extract_uses_local_clock() {
        let items = extract_action_items("Standup\n- send the recap\n  - attach slides");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "send the recap");
        assert_eq!(items[0].subtasks, vec!["attach slides"]);
        assert_eq!(items[0].priority, Priority::Normal);
        assert_eq!(items[0].due_date, None);

        let items = ActionItemExtractor::new().extract("TODO: book the room");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "book the room");
        assert_eq!(items[0].description, "TODO: book the room");
    }

    #[test]
    fn test_empty_and_unmarked_input() {
        assert!(extract("").is_empty());
        assert!(extract("\n\n   \n").is_empty());
        assert!(extract("We talked about the roadmap.\nNothing decided.").is_empty());
        assert!(extract("# Heading only").is_empty());
    }

    #[test]
    fn test_non_string_value_yields_nothing() {
        let extractor = ActionItemExtractor::new();
        assert!(extractor.extract_value(&serde_json::json!(42), reference()).is_empty());
        assert!(extractor.extract_value(&serde_json::json!(null), reference()).is_empty());
        assert!(extractor
            .extract_value(&serde_json::json!(["- a task"]), reference())
            .is_empty());

        let items = extractor.extract_value(&serde_json::json!("- send recap"), reference());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_urgent_bullet() {
        let items = extract("- urgent: fix build asap");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].priority, Priority::Urgent);
        assert!(items[0].content.starts_with("urgent: fix build asap"));
        assert!(items[0].subtasks.is_empty());
    }

    #[test]
    fn test_numbered_item_with_nested_subtasks() {
        let items = extract("1. Review PR #42\n   - check tests\n   - check docs");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "Review PR #42");
        assert_eq!(items[0].subtasks, vec!["check tests", "check docs"]);
        assert_eq!(
            items[0].description,
            "1. Review PR #42\n   - check tests\n   - check docs"
        );
        assert_eq!(items[0].priority, Priority::Normal);
        assert_eq!(items[0].due_date, None);
    }

    #[test]
    fn test_markers_and_labels() {
        let text = "\
* star bullet
• dot bullet
2) paren number
[ ] open box
[X] done box
- [ ] bullet box
Action: send the deck
TODO: book room
Follow up: ping legal
Follow-up: ping finance
next step: draft plan
Deliverable: pricing memo
-squeezed bullet";
        let contents: Vec<String> = extract(text).into_iter().map(|i| i.content).collect();
        assert_eq!(
            contents,
            vec![
                "star bullet",
                "dot bullet",
                "paren number",
                "open box",
                "done box",
                "bullet box",
                "send the deck",
                "book room",
                "ping legal",
                "ping finance",
                "draft plan",
                "pricing memo",
                "squeezed bullet",
            ]
        );
    }

    #[test]
    fn test_label_inside_bullet_is_stripped() {
        let items = extract("- TODO: update runbook");
        assert_eq!(items[0].content, "update runbook");
    }

    #[test]
    fn test_short_and_empty_items_discarded() {
        assert!(extract("- a\n-\nTODO:\n---\n1. x").is_empty());
        assert!(extract("- TODO:\n* Action:\n1. Follow-up:\n- [ ] next steps:").is_empty());
    }

    #[test]
    fn test_rule_lines_are_not_items() {
        assert!(extract("* * *\n- - -\n1. ...").is_empty());
        assert_eq!(extract("- v2 release")[0].content, "v2 release");
    }

    #[test]
    fn test_continuation_stops_at_blank_heading_and_dedent() {
        let text = "\
- first
  detail one

  orphan after blank
- second
  # not a child
- third
  - nested
next paragraph";
        let items = extract(text);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].subtasks, vec!["detail one"]);
        assert_eq!(items[1].subtasks, Vec::<String>::new());
        assert_eq!(items[2].subtasks, vec!["nested"]);
    }

    #[test]
    fn test_prose_continuation_becomes_subtask() {
        let items = extract("- Plan offsite\n    budget is tight\n    1. pick venue");
        assert_eq!(items[0].subtasks, vec!["budget is tight", "pick venue"]);
        assert!(items[0].description.contains("    budget is tight"));
    }

    #[test]
    fn test_nested_list_does_not_open_items_when_indented_under_parent() {
        let items = extract("- parent\n  - child one\n  - child two\n- sibling");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].content, "sibling");
    }

    #[test]
    fn test_due_dates() {
        let items = extract("- send recap by Friday\n- wrap up by EOD\n- someday maybe");
        assert_eq!(items[0].due_date, NaiveDate::from_ymd_opt(2024, 6, 7));
        assert_eq!(items[1].due_date, NaiveDate::from_ymd_opt(2024, 6, 3));
        assert_eq!(items[2].due_date, None);
    }

    #[test]
    fn test_priority_uses_opening_line() {
        let items = extract("- [ ] P1 rotate keys\n- important: renew cert");
        assert_eq!(items[0].priority, Priority::Urgent);
        assert_eq!(items[1].priority, Priority::Elevated);
    }

    #[test]
    fn test_windows_and_old_mac_newlines() {
        assert_eq!(extract("- one\r\n- two\r- three").len(), 3);
        let items = extract("- parent\r\n  - child");
        assert_eq!(items[0].subtasks, vec!["child"]);
    }

    #[test]
    fn test_limits() {
        let long = format!("- {}", "x".repeat(600));
        let items = extract(&long);
        assert_eq!(items[0].content.chars().count(), MAX_CONTENT_CHARS);

        let mut text = String::from("- parent");
        for n in 0..30 {
            text.push_str(&format!("\n  - child {} {}", n, "y".repeat(80)));
        }
        let items = extract(&text);
        assert_eq!(items[0].subtasks.len(), MAX_SUBTASKS);
        assert_eq!(items[0].description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "Notes\n- call vendor tomorrow\n  - confirm quote\n1. ship v2 asap";
        assert_eq!(extract(text), extract(text));
    }
}
