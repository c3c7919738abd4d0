//! Due-date text parsing.
//!
//! The portal renders due dates as natural language ("Mon Sep 22, 2025
//! 4:00pm", "Sep 30 at 11:59pm", "Today at 4pm"), always in the campus time
//! zone. Parsing is anchored to a caller-supplied "now" so that year-less
//! and relative phrases resolve deterministically in tests.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// The portal renders every timestamp in campus local time (US Mountain).
pub const PORTAL_UTC_OFFSET_HOURS: i64 = -6;

const DATETIME_FORMATS: &[&str] = &[
    "%a %b %d %Y %I:%M%p",
    "%b %d %Y %I:%M%p",
    "%a %b %d %Y %I%p",
    "%b %d %Y %I%p",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%a %b %d %Y", "%b %d %Y", "%Y-%m-%d"];

/// Formats for strings with no year; the anchor year is appended before
/// matching.
const YEARLESS_FORMATS: &[&str] = &[
    "%a %b %d %I:%M%p %Y",
    "%b %d %I:%M%p %Y",
    "%a %b %d %I%p %Y",
    "%b %d %I%p %Y",
];

/// Parse a portal due-date string into an absolute instant.
///
/// Returns `None` when the text matches no known shape; callers decide the
/// fallback policy.
pub fn parse_due_text(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let cleaned = normalize(text);
    if cleaned.is_empty() {
        return None;
    }

    if let Some(resolved) = parse_relative(&cleaned, now) {
        return Some(resolved);
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(portal_to_utc(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(portal_to_utc(d.and_time(end_of_day())));
        }
    }

    // The portal omits the year for dates inside the current academic term.
    let anchored = format!("{} {}", cleaned, now.year());
    for fmt in YEARLESS_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&anchored, fmt) {
            return Some(portal_to_utc(dt));
        }
    }
    for fmt in &["%a %b %d %Y", "%b %d %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(&anchored, fmt) {
            return Some(portal_to_utc(d.and_time(end_of_day())));
        }
    }

    None
}

/// Uppercase, drop commas and connector words, collapse whitespace. Chrono
/// matches month and weekday names case-insensitively, but the am/pm marker
/// must be uppercased for `%p`.
fn normalize(text: &str) -> String {
    text.to_uppercase()
        .replace(',', " ")
        .replace(" AT ", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_relative(cleaned: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (date, rest) = if let Some(rest) = cleaned.strip_prefix("TODAY") {
        (portal_today(now), rest)
    } else if let Some(rest) = cleaned.strip_prefix("TOMORROW") {
        (portal_today(now) + Duration::days(1), rest)
    } else {
        return None;
    };

    let rest = rest.trim();
    let time = if rest.is_empty() {
        end_of_day()
    } else {
        NaiveTime::parse_from_str(rest, "%I:%M%p")
            .or_else(|_| NaiveTime::parse_from_str(rest, "%I%p"))
            .ok()?
    };
    Some(portal_to_utc(date.and_time(time)))
}

/// Calendar date it currently is on campus.
fn portal_today(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(PORTAL_UTC_OFFSET_HOURS)).date_naive()
}

fn portal_to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&local) - Duration::hours(PORTAL_UTC_OFFSET_HOURS)
}

/// Date-only strings mean "due by the end of that day".
fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_full_datetime() {
        let parsed = parse_due_text("Mon Sep 22, 2025 4:00pm", anchor()).expect("parse");
        // 16:00 Mountain is 22:00 UTC.
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 9, 22, 22, 0, 0).unwrap());
    }

    #[test]
    fn parses_yearless_datetime_anchored_to_now() {
        let parsed = parse_due_text("Sep 30 at 11:59pm", anchor()).expect("parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 10, 1, 5, 59, 0).unwrap());
    }

    #[test]
    fn parses_date_only_as_end_of_day() {
        let parsed = parse_due_text("Sep 22, 2025", anchor()).expect("parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 9, 23, 5, 59, 0).unwrap());
    }

    #[test]
    fn parses_relative_today() {
        // Anchor is 12:00 UTC = 06:00 Mountain, so "today" is Sep 1.
        let parsed = parse_due_text("Today at 4:00pm", anchor()).expect("parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 9, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn parses_relative_tomorrow_without_time() {
        let parsed = parse_due_text("Tomorrow", anchor()).expect("parse");
        // End of Sep 2 on campus is 05:59 UTC on Sep 3.
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 9, 3, 5, 59, 0).unwrap());
    }

    #[test]
    fn rejects_unparseable_text() {
        assert!(parse_due_text("No due date", anchor()).is_none());
        assert!(parse_due_text("", anchor()).is_none());
    }
}
