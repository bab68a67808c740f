use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::time::{DateParser, PhraseDateParser};

static END_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\beod\b|\bend\s+of\s+(?:the\s+)?day\b|\be\.o\.d\b\.?")
        .expect("valid end-of-day regex")
});

/// Resolves due dates from free text.
///
/// Delegates to a [`DateParser`]. When the parser finds nothing, an
/// end-of-day marker ("eod", "end of day", "e.o.d.") resolves to the
/// reference date itself.
#[derive(Debug, Clone, Default)]
pub struct DueDateResolver<P: DateParser = PhraseDateParser> {
    parser: P,
}

impl DueDateResolver<PhraseDateParser> {
    pub fn new() -> Self {
        Self {
            parser: PhraseDateParser,
        }
    }
}

impl<P: DateParser> DueDateResolver<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    pub fn resolve(&self, text: &str, reference: NaiveDateTime) -> Option<NaiveDate> {
        self.parser
            .parse(text, reference)
            .or_else(|| has_end_of_day_marker(text).then(|| reference.date()))
    }
}

/// Resolves `text` with the built-in phrase parser.
pub fn resolve_due_date(text: &str, reference: NaiveDateTime) -> Option<NaiveDate> {
    DueDateResolver::new().resolve(text, reference)
}

fn has_end_of_day_marker(text: &str) -> bool {
    END_OF_DAY.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(16, 45, 0)
            .unwrap()
    }

    struct NeverParser;

    impl DateParser for NeverParser {
        fn parse(&self, _text: &str, _reference: NaiveDateTime) -> Option<NaiveDate> {
            None
        }
    }

    struct FixedParser(NaiveDate);

    impl DateParser for FixedParser {
        fn parse(&self, _text: &str, _reference: NaiveDateTime) -> Option<NaiveDate> {
            Some(self.0)
        }
    }

    #[test]
    fn test_upcoming_friday() {
        assert_eq!(
            resolve_due_date("by Friday", reference()),
            NaiveDate::from_ymd_opt(2024, 6, 7)
        );
    }

    #[test]
    fn test_end_of_day_fallback() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 3);
        assert_eq!(resolve_due_date("wrap up by EOD", reference()), today);
        assert_eq!(resolve_due_date("send it end of day", reference()), today);
        assert_eq!(resolve_due_date("numbers by e.o.d.", reference()), today);
    }

    #[test]
    fn test_parser_result_takes_precedence() {
        let fixed = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let resolver = DueDateResolver::with_parser(FixedParser(fixed));
        assert_eq!(resolver.resolve("eod", reference()), Some(fixed));
    }

    #[test]
    fn test_no_date() {
        let resolver = DueDateResolver::with_parser(NeverParser);
        assert_eq!(resolver.resolve("refactor the geode module", reference()), None);
        assert_eq!(resolve_due_date("Review PR #42", reference()), None);
    }
}
