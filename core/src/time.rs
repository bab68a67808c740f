use std::sync::LazyLock;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};
use regex::{Captures, Regex};

/// Natural-language date lookup used by the due date resolver.
///
/// Implementations return the first date phrase found in `text`, resolved
/// against `reference`. Relative phrases must resolve forward: "friday" is
/// the upcoming Friday, never the one that already passed.
pub trait DateParser {
    fn parse(&self, text: &str, reference: NaiveDateTime) -> Option<NaiveDate>;
}

/// Regex-driven phrase scanner. Picks the left-most phrase in the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseDateParser;

type Resolve = fn(&Captures, NaiveDate) -> Option<NaiveDate>;

const MONTHS: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";
const WEEKDAYS: &str = r"monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun";

static RULES: LazyLock<Vec<(Regex, Resolve)>> = LazyLock::new(|| {
    vec![
        rule(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b", resolve_iso),
        rule(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b", resolve_numeric),
        rule(
            &format!(r"\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?", MONTHS),
            resolve_month_day,
        ),
        rule(
            &format!(r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({})\b(?:,?\s+(\d{{4}})\b)?", MONTHS),
            resolve_day_month,
        ),
        rule(r"\bday\s+after\s+tomorrow\b", |_, today| Some(today + Duration::days(2))),
        rule(r"\b(?:today|tonight)\b", |_, today| Some(today)),
        rule(r"\b(?:tomorrow|tmrw|tmr)\b", |_, today| Some(today + Duration::days(1))),
        rule(r"\bnext\s+week\b", |_, today| Some(today + Duration::weeks(1))),
        rule(r"\bnext\s+month\b", |_, today| today.checked_add_months(Months::new(1))),
        rule(r"\b(?:end\s+of\s+(?:the\s+)?week|eow)\b", |_, today| Some(end_of_week(today))),
        rule(r"\b(?:end\s+of\s+(?:the\s+)?month|eom)\b", |_, today| end_of_month(today)),
        rule(r"\bin\s+(\d{1,3})\s+(day|week|month)s?\b", resolve_offset),
        rule(r"(?:^|\s)\+(\d{1,3})([dwm])\b", resolve_offset),
        rule(&format!(r"\b(?:(next|this)\s+)?({})\b", WEEKDAYS), resolve_weekday),
    ]
});

fn rule(pattern: &str, resolve: Resolve) -> (Regex, Resolve) {
    let re = Regex::new(&format!("(?i){}", pattern)).expect("valid date phrase regex");
    (re, resolve)
}

impl DateParser for PhraseDateParser {
    fn parse(&self, text: &str, reference: NaiveDateTime) -> Option<NaiveDate> {
        let today = reference.date();
        let mut best: Option<(usize, usize, NaiveDate)> = None;

        for (re, resolve) in RULES.iter() {
            let hit = re.captures_iter(text).find_map(|caps| {
                let whole = caps.get(0)?;
                resolve(&caps, today).map(|date| (whole.start(), whole.len(), date))
            });

            if let Some((start, len, date)) = hit {
                // Earliest phrase wins; on a tie the longer phrase does.
                let better = match best {
                    None => true,
                    Some((best_start, best_len, _)) => {
                        start < best_start || (start == best_start && len > best_len)
                    }
                };
                if better {
                    best = Some((start, len, date));
                }
            }
        }

        best.map(|(_, _, date)| date)
    }
}

fn resolve_iso(caps: &Captures, _today: NaiveDate) -> Option<NaiveDate> {
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn resolve_numeric(caps: &Captures, today: NaiveDate) -> Option<NaiveDate> {
    let month = caps[1].parse().ok()?;
    let day = caps[2].parse().ok()?;
    let year = caps.get(3).and_then(|y| parse_year(y.as_str()));
    date_forward(year, month, day, today)
}

fn resolve_month_day(caps: &Captures, today: NaiveDate) -> Option<NaiveDate> {
    let month = month_number(&caps[1])?;
    let day = caps[2].parse().ok()?;
    let year = caps.get(3).and_then(|y| parse_year(y.as_str()));
    date_forward(year, month, day, today)
}

fn resolve_day_month(caps: &Captures, today: NaiveDate) -> Option<NaiveDate> {
    let day = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year = caps.get(3).and_then(|y| parse_year(y.as_str()));
    date_forward(year, month, day, today)
}

fn resolve_offset(caps: &Captures, today: NaiveDate) -> Option<NaiveDate> {
    let count: u32 = caps[1].parse().ok()?;
    match caps[2].to_lowercase().as_str() {
        "d" | "day" => Some(today + Duration::days(count as i64)),
        "w" | "week" => Some(today + Duration::weeks(count as i64)),
        "m" | "month" => today.checked_add_months(Months::new(count)),
        _ => None,
    }
}

fn resolve_weekday(caps: &Captures, today: NaiveDate) -> Option<NaiveDate> {
    let target = parse_weekday_str(&caps[2])?;
    let is_next = caps
        .get(1)
        .map(|m| m.as_str().eq_ignore_ascii_case("next"))
        .unwrap_or(false);

    let mut days_needed = target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64;
    if days_needed < 0 || (days_needed == 0 && is_next) {
        days_needed += 7;
    }
    Some(today + Duration::days(days_needed))
}

/// Builds a calendar date; without an explicit year, a date already behind
/// `today` rolls over to next year.
fn date_forward(year: Option<i32>, month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => {
            let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
            match this_year {
                Some(date) if date >= today => Some(date),
                _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
            }
        }
    }
}

fn parse_year(input: &str) -> Option<i32> {
    let year: i32 = input.parse().ok()?;
    if input.len() == 2 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

fn end_of_week(today: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - today.weekday().num_days_from_monday() as i64;
    today + Duration::days(days_to_sunday)
}

fn end_of_month(today: NaiveDate) -> Option<NaiveDate> {
    let first = today.with_day(1)?;
    let next_month = first.checked_add_months(Months::new(1))?;
    next_month.pred_opt()
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_weekday_str(s: &str) -> Option<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Monday, 2024-06-03 09:30
    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn parse(text: &str) -> Option<NaiveDate> {
        PhraseDateParser.parse(text, reference())
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(RULES.len(), 14);
    }

    #[test]
    fn test_weekday_is_forward_biased() {
        assert_eq!(parse("by Friday"), date(2024, 6, 7));
        assert_eq!(parse("sync on wed"), date(2024, 6, 5));
        assert_eq!(parse("monday standup"), date(2024, 6, 3));
        assert_eq!(parse("next monday"), date(2024, 6, 10));
        assert_eq!(parse("sunday"), date(2024, 6, 9));
    }

    #[test]
    fn test_relative_keywords() {
        assert_eq!(parse("ship it today"), date(2024, 6, 3));
        assert_eq!(parse("due tomorrow"), date(2024, 6, 4));
        assert_eq!(parse("the day after tomorrow"), date(2024, 6, 5));
        assert_eq!(parse("sometime next week"), date(2024, 6, 10));
        assert_eq!(parse("next month"), date(2024, 7, 3));
        assert_eq!(parse("in 3 days"), date(2024, 6, 6));
        assert_eq!(parse("in 2 weeks"), date(2024, 6, 17));
        assert_eq!(parse("estimate +10d"), date(2024, 6, 13));
    }

    #[test]
    fn test_end_of_period() {
        assert_eq!(parse("by end of week"), date(2024, 6, 9));
        assert_eq!(parse("eom"), date(2024, 6, 30));
    }

    #[test]
    fn test_explicit_dates() {
        assert_eq!(parse("deadline 2024-07-15"), date(2024, 7, 15));
        assert_eq!(parse("by 6/10"), date(2024, 6, 10));
        assert_eq!(parse("by 6/10/25"), date(2025, 6, 10));
        assert_eq!(parse("launch on June 20th"), date(2024, 6, 20));
        assert_eq!(parse("launch on 20 June"), date(2024, 6, 20));
        assert_eq!(parse("Jan 5, 2025"), date(2025, 1, 5));
    }

    #[test]
    fn test_month_day_without_year_rolls_forward() {
        assert_eq!(parse("renew by March 1"), date(2025, 3, 1));
    }

    #[test]
    fn test_leftmost_phrase_wins() {
        assert_eq!(parse("tomorrow, or friday at the latest"), date(2024, 6, 4));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse("Review PR #42"), None);
        assert_eq!(parse("wrap up by EOD"), None);
        assert_eq!(parse("monthly report"), None);
        assert_eq!(parse(""), None);
    }
}
