use std::sync::LazyLock;

use regex::Regex;

use crate::model::task::Priority;

// Checked in order; the first hit decides.
static RULES: LazyLock<Vec<(Regex, Priority)>> = LazyLock::new(|| {
    [
        (
            r"(?i)\b(?:urgent|asap|as\s+soon\s+as\s+possible|blocker|critical|priority\s*1|p1)\b",
            Priority::Urgent,
        ),
        (r"(?i)\b(?:important|soon|priority\s*2|p2)\b", Priority::Elevated),
    ]
    .into_iter()
    .map(|(pattern, priority)| (Regex::new(pattern).expect("valid priority regex"), priority))
    .collect()
});

/// Maps a line of text to a priority level.
///
/// Only `Urgent`, `Elevated` and `Normal` are ever produced. `Medium` is left
/// for the tracker's own scale.
pub fn classify(line: &str) -> Priority {
    RULES
        .iter()
        .find(|(re, _)| re.is_match(line))
        .map(|(_, priority)| *priority)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_compile() {
        assert_eq!(RULES.len(), 2);
    }

    #[test]
    fn test_urgent_keywords() {
        for line in [
            "- urgent: fix build asap",
            "ASAP please",
            "do this as soon as possible",
            "Blocker for release",
            "critical path item",
            "Priority 1: rotate keys",
            "[p1] page on-call",
        ] {
            assert_eq!(classify(line), Priority::Urgent, "{}", line);
        }
    }

    #[test]
    fn test_elevated_keywords() {
        assert_eq!(classify("Important: update roadmap"), Priority::Elevated);
        assert_eq!(classify("send deck soon"), Priority::Elevated);
        assert_eq!(classify("priority 2 cleanup"), Priority::Elevated);
        assert_eq!(classify("P2 docs"), Priority::Elevated);
    }

    #[test]
    fn test_urgent_wins_over_elevated() {
        assert_eq!(classify("important and urgent"), Priority::Urgent);
    }

    #[test]
    fn test_default_is_normal_and_never_high() {
        assert_eq!(classify("update the wiki"), Priority::Normal);
        assert_eq!(classify(""), Priority::Normal);
        // word boundaries: no match inside other words
        assert_eq!(classify("soonish app1 criticality"), Priority::Normal);
    }
}
