//! Regex-driven date and date-range extraction, independent of any AI
//! provider. Used both standalone (the `extract` CLI command) and as the
//! validator the Response Parser runs every AI-returned date through.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::taxonomy::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateKind {
    Filing,
    Event,
    Hearing,
    Decision,
    Served,
}

impl DateKind {
    pub const ALL: [DateKind; 5] = [
        DateKind::Filing,
        DateKind::Event,
        DateKind::Hearing,
        DateKind::Decision,
        DateKind::Served,
    ];

    fn cue_regex(self) -> &'static Regex {
        match self {
            DateKind::Filing => &FILING_CUE,
            DateKind::Event => &EVENT_CUE,
            DateKind::Hearing => &HEARING_CUE,
            DateKind::Decision => &DECISION_CUE,
            DateKind::Served => &SERVED_CUE,
        }
    }

    /// Validates an already-parsed ISO date against this kind's window.
    /// `now` anchors all relative bounds.
    pub fn validate(self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        let year = date.year();
        if year < 1950 || year > today.year() + 10 {
            return false;
        }
        match self {
            DateKind::Filing => date <= today + Duration::days(1),
            DateKind::Event => {
                date >= NaiveDate::from_ymd_opt(1950, 1, 1).unwrap()
                    && date <= add_years(today, 10)
            }
            DateKind::Hearing => {
                date >= today - Duration::days(30) && date <= add_years(today, 5)
            }
            DateKind::Decision => date <= today + Duration::days(30),
            DateKind::Served => date <= today + Duration::days(1),
        }
    }
}

fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() + years, date.month(), date.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(date.year() + years, date.month(), 28).unwrap())
}

static FILING_CUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bfiled\b[^.;\n]{0,40}?([A-Za-z0-9 ,./\-]{4,40})").unwrap());
static EVENT_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:occurred|incident|event)\b[^.;\n]{0,40}?([A-Za-z0-9 ,./\-]{4,40})")
        .unwrap()
});
static HEARING_CUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bhearing\b[^.;\n]{0,40}?([A-Za-z0-9 ,./\-]{4,40})").unwrap());
static DECISION_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:decided|decision|ordered)\b[^.;\n]{0,40}?([A-Za-z0-9 ,./\-]{4,40})")
        .unwrap()
});
static SERVED_CUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bserved\b[^.;\n]{0,40}?([A-Za-z0-9 ,./\-]{4,40})").unwrap());

// --- Parser chain -----------------------------------------------------

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").unwrap());
static US_SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})").unwrap());
static US_DASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{2,4})").unwrap());
static LONG_MONTH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})").unwrap()
});
static SHORT_MONTH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.?\s+(\d{1,2}),?\s+(\d{4})").unwrap()
});
static PARTIAL_LONG_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{4})").unwrap()
});
static PARTIAL_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{4})").unwrap());

static LEADING_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*(on|at|the)\s+").unwrap());
static TRAILING_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\d{1,2}:\d{2}(:\d{2})?\s*(am|pm)?\s*$").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn clean_candidate(raw: &str) -> String {
    let trimmed = raw.trim();
    let no_leading = LEADING_NOISE.replace(trimmed, "");
    let no_trailing_time = TRAILING_TIME.replace(&no_leading, "");
    WHITESPACE
        .replace_all(no_trailing_time.trim(), " ")
        .to_string()
}

fn month_number(name: &str) -> Option<u32> {
    let n = name.to_lowercase();
    Some(match n.as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    })
}

fn normalize_year(y: i32) -> i32 {
    if y < 100 {
        if y < 50 {
            2000 + y
        } else {
            1900 + y
        }
    } else {
        y
    }
}

/// Tries the full-date, then partial-date, then relative-date parsers in
/// order against a cleaned candidate substring.
fn parse_candidate(raw: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let candidate = clean_candidate(raw);
    parse_full_date(&candidate)
        .or_else(|| parse_partial_date(&candidate))
        .or_else(|| parse_relative_date(&candidate, now))
}

fn parse_full_date(s: &str) -> Option<NaiveDate> {
    if let Some(c) = ISO_DATE.captures(s) {
        let y = c[1].parse().ok()?;
        let m = c[2].parse().ok()?;
        let d = c[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    if let Some(c) = US_SLASH_DATE.captures(s) {
        let m = c[1].parse().ok()?;
        let d = c[2].parse().ok()?;
        let y = normalize_year(c[3].parse().ok()?);
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    if let Some(c) = US_DASH_DATE.captures(s) {
        let m = c[1].parse().ok()?;
        let d = c[2].parse().ok()?;
        let y = normalize_year(c[3].parse().ok()?);
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    if let Some(c) = LONG_MONTH_DATE.captures(s) {
        let m = month_number(&c[1])?;
        let d = c[2].parse().ok()?;
        let y = c[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    if let Some(c) = SHORT_MONTH_DATE.captures(s) {
        let m = month_number(&c[1])?;
        let d = c[2].parse().ok()?;
        let y = c[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    None
}

fn parse_partial_date(s: &str) -> Option<NaiveDate> {
    if let Some(c) = PARTIAL_LONG_MONTH.captures(s) {
        let m = month_number(&c[1])?;
        let y = c[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, 1);
    }
    if let Some(c) = PARTIAL_SLASH.captures(s) {
        let m = c[1].parse().ok()?;
        let y = c[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, 1);
    }
    None
}

fn next_weekday_from(today: NaiveDate, target: Weekday, allow_today: bool) -> NaiveDate {
    let mut candidate = today;
    loop {
        if candidate.weekday() == target && (allow_today || candidate != today) {
            return candidate;
        }
        candidate += Duration::days(1);
    }
}

fn last_weekday_from(today: NaiveDate, target: Weekday) -> NaiveDate {
    let mut candidate = today;
    loop {
        candidate -= Duration::days(1);
        if candidate.weekday() == target {
            return candidate;
        }
    }
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_relative_date(s: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let today = now.date_naive();
    let lower = s.to_lowercase();

    match lower.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "next week" => return Some(today + Duration::weeks(1)),
        "last week" => return Some(today - Duration::weeks(1)),
        "next month" => {
            let month = if today.month() == 12 { 1 } else { today.month() + 1 };
            let year = if today.month() == 12 { today.year() + 1 } else { today.year() };
            return NaiveDate::from_ymd_opt(year, month, 1.min(today.day()))
                .or_else(|| NaiveDate::from_ymd_opt(year, month, 1));
        }
        _ => {}
    }

    if let Some(rest) = lower.strip_prefix("next ") {
        if let Some(wd) = parse_weekday(rest) {
            return Some(next_weekday_from(today, wd, false));
        }
    }
    if let Some(rest) = lower.strip_prefix("last ") {
        if let Some(wd) = parse_weekday(rest) {
            return Some(last_weekday_from(today, wd));
        }
    }
    if let Some(wd) = parse_weekday(&lower) {
        return Some(next_weekday_from(today, wd, false));
    }

    None
}

/// Extracts a single date of the given kind from free text, running the
/// parser chain and then the per-kind validator. Returns `None` both when
/// no candidate is found and when a candidate fails validation — callers
/// must not infer "missing" vs. "invalid" from a `None`.
pub fn extract_date(text: &str, kind: DateKind, now: DateTime<Utc>) -> Option<NaiveDate> {
    let cue = kind.cue_regex();
    let captures = cue.captures(text)?;
    let raw = captures.get(1)?.as_str();
    let date = parse_candidate(raw, now)?;
    if kind.validate(date, now) {
        Some(date)
    } else {
        None
    }
}

/// Validates an already-parsed ISO `YYYY-MM-DD` string against a kind's
/// window; used by the Response Parser on AI-returned date fields.
pub fn validate_iso_date(iso: &str, kind: DateKind, now: DateTime<Utc>) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()?;
    if kind.validate(date, now) {
        Some(date)
    } else {
        None
    }
}

// --- Date ranges --------------------------------------------------------

static MONTH_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2})\s*[-\x{2013}]\s*(\d{1,2}),?\s+(\d{4})").unwrap()
});
static SLASH_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})\s+to\s+(\d{1,2})/(\d{1,2})/(\d{4})").unwrap()
});

const RANGE_KIND_CONTEXT_RADIUS: usize = 40;

/// Widens a match span by `RANGE_KIND_CONTEXT_RADIUS` bytes on each side
/// (clamped to valid char boundaries) so cue words just outside the date
/// span itself (e.g. "Trial is set for ...") are visible to
/// `infer_range_kind`.
fn context_window(text: &str, start: usize, end: usize) -> &str {
    let mut lo = start.saturating_sub(RANGE_KIND_CONTEXT_RADIUS);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + RANGE_KIND_CONTEXT_RADIUS).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

fn infer_range_kind(context: &str) -> &'static str {
    let lower = context.to_lowercase();
    if lower.contains("trial") {
        "trial_dates"
    } else if lower.contains("hearing") {
        "hearing_period"
    } else if lower.contains("conference") {
        "conference_period"
    } else if lower.contains("deposition") {
        "deposition_period"
    } else {
        "event_period"
    }
}

pub fn extract_date_ranges(text: &str) -> Vec<DateRange> {
    let mut ranges = Vec::new();

    for m in MONTH_RANGE.find_iter(text) {
        if let Some(c) = MONTH_RANGE.captures(m.as_str()) {
            let month = month_number(&c[1]);
            let year: Option<i32> = c[4].parse().ok();
            let start_day: Option<u32> = c[2].parse().ok();
            let end_day: Option<u32> = c[3].parse().ok();
            if let (Some(month), Some(year), Some(sd), Some(ed)) =
                (month, year, start_day, end_day)
            {
                let start = NaiveDate::from_ymd_opt(year, month, sd);
                let end = NaiveDate::from_ymd_opt(year, month, ed);
                ranges.push(DateRange {
                    start: start.map(|d| d.format("%Y-%m-%d").to_string()),
                    end: end.map(|d| d.format("%Y-%m-%d").to_string()),
                    kind: infer_range_kind(context_window(text, m.start(), m.end())).to_string(),
                });
            }
        }
    }

    for m in SLASH_RANGE.find_iter(text) {
        if let Some(c) = SLASH_RANGE.captures(m.as_str()) {
            let start = NaiveDate::from_ymd_opt(
                c[3].parse().unwrap_or(0),
                c[1].parse().unwrap_or(0),
                c[2].parse().unwrap_or(0),
            );
            let end = NaiveDate::from_ymd_opt(
                c[6].parse().unwrap_or(0),
                c[4].parse().unwrap_or(0),
                c[5].parse().unwrap_or(0),
            );
            ranges.push(DateRange {
                start: start.map(|d| d.format("%Y-%m-%d").to_string()),
                end: end.map(|d| d.format("%Y-%m-%d").to_string()),
                kind: infer_range_kind(context_window(text, m.start(), m.end())).to_string(),
            });
        }
    }

    ranges
}

/// The full set of dates extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DateExtractionResult {
    pub filing_date: Option<String>,
    pub event_date: Option<String>,
    pub hearing_date: Option<String>,
    pub decision_date: Option<String>,
    pub served_date: Option<String>,
    pub date_ranges: Vec<DateRange>,
}

pub fn extract_all(text: &str, now: DateTime<Utc>) -> DateExtractionResult {
    DateExtractionResult {
        filing_date: extract_date(text, DateKind::Filing, now).map(|d| d.format("%Y-%m-%d").to_string()),
        event_date: extract_date(text, DateKind::Event, now).map(|d| d.format("%Y-%m-%d").to_string()),
        hearing_date: extract_date(text, DateKind::Hearing, now).map(|d| d.format("%Y-%m-%d").to_string()),
        decision_date: extract_date(text, DateKind::Decision, now).map(|d| d.format("%Y-%m-%d").to_string()),
        served_date: extract_date(text, DateKind::Served, now).map(|d| d.format("%Y-%m-%d").to_string()),
        date_ranges: extract_date_ranges(text),
    }
}

/// `merge(primary, None) = primary`; `merge(None, secondary) = secondary`;
/// primary's non-null fields dominate; ranges concatenate.
pub fn merge(
    primary: Option<DateExtractionResult>,
    secondary: Option<DateExtractionResult>,
) -> Option<DateExtractionResult> {
    match (primary, secondary) {
        (Some(p), None) => Some(p),
        (None, Some(s)) => Some(s),
        (None, None) => None,
        (Some(p), Some(s)) => Some(DateExtractionResult {
            filing_date: p.filing_date.or(s.filing_date),
            event_date: p.event_date.or(s.event_date),
            hearing_date: p.hearing_date.or(s.hearing_date),
            decision_date: p.decision_date.or(s.decision_date),
            served_date: p.served_date.or(s.served_date),
            date_ranges: p.date_ranges.into_iter().chain(s.date_ranges).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn extracts_filed_date_full_format() {
        let text = "The motion was filed on 03/15/2024 in the circuit court.";
        let date = extract_date(text, DateKind::Filing, anchor()).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-03-15");
    }

    #[test]
    fn extracts_hearing_date_long_month_format() {
        let text = "hearing scheduled April 20, 2024 at 9:00 AM";
        let date = extract_date(text, DateKind::Hearing, anchor()).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-04-20");
    }

    #[test]
    fn rejects_unparseable_date() {
        let text = "filed on 2026-02-30, an invalid date";
        assert!(extract_date(text, DateKind::Filing, anchor()).is_none());
    }

    #[test]
    fn rejects_filing_date_in_the_future() {
        // now + 7 days relative to anchor (2024-06-01) => 2024-06-08
        assert!(validate_iso_date("2024-06-08", DateKind::Filing, anchor()).is_none());
    }

    #[test]
    fn rejects_hearing_date_outside_lookback_window() {
        // now - 60 days is outside the [-30d, +5y] window
        assert!(validate_iso_date("2024-04-02", DateKind::Hearing, anchor()).is_none());
    }

    #[test]
    fn accepts_hearing_date_within_lookback_window() {
        // now - 10 days is within [-30d, +5y]
        assert!(validate_iso_date("2024-05-22", DateKind::Hearing, anchor()).is_some());
    }

    #[test]
    fn partial_date_fills_day_as_first_of_month() {
        let text = "served in March 2024 per the certificate";
        // served_date cue requires "served" word; partial parse applies
        let date = extract_date(text, DateKind::Served, anchor());
        assert_eq!(date.map(|d| d.format("%Y-%m-%d").to_string()), Some("2024-03-01".to_string()));
    }

    #[test]
    fn relative_today_resolves_against_anchor() {
        let date = parse_candidate("today", anchor()).unwrap();
        assert_eq!(date, anchor().date_naive());
    }

    #[test]
    fn relative_tomorrow_resolves_against_anchor() {
        let date = parse_candidate("tomorrow", anchor()).unwrap();
        assert_eq!(date, anchor().date_naive() + Duration::days(1));
    }

    #[test]
    fn extraction_is_deterministic_given_fixed_anchor() {
        let text = "filed on 03/15/2024, hearing scheduled April 20, 2024";
        let first = extract_all(text, anchor());
        let second = extract_all(text, anchor());
        assert_eq!(first, second);
    }

    #[test]
    fn extracts_month_range_with_kind() {
        let text = "Trial is set for June 10-14, 2024 before the panel.";
        let ranges = extract_date_ranges(text);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].kind, "trial_dates");
        assert_eq!(ranges[0].start.as_deref(), Some("2024-06-10"));
        assert_eq!(ranges[0].end.as_deref(), Some("2024-06-14"));
    }

    #[test]
    fn extracts_slash_range_defaulting_to_event_period() {
        let text = "Discovery runs from 3/1/2024 to 3/15/2024 for both parties.";
        let ranges = extract_date_ranges(text);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].kind, "event_period");
    }

    #[test]
    fn merge_primary_only() {
        let primary = DateExtractionResult {
            filing_date: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        let merged = merge(Some(primary.clone()), None).unwrap();
        assert_eq!(merged, primary);
    }

    #[test]
    fn merge_secondary_only() {
        let secondary = DateExtractionResult {
            event_date: Some("2024-02-02".to_string()),
            ..Default::default()
        };
        let merged = merge(None, Some(secondary.clone())).unwrap();
        assert_eq!(merged, secondary);
    }

    #[test]
    fn merge_prefers_primary_nonnull_and_concatenates_ranges() {
        let primary = DateExtractionResult {
            filing_date: Some("2024-01-01".to_string()),
            date_ranges: vec![DateRange {
                start: Some("2024-01-01".to_string()),
                end: Some("2024-01-02".to_string()),
                kind: "trial_dates".to_string(),
            }],
            ..Default::default()
        };
        let secondary = DateExtractionResult {
            filing_date: Some("2024-09-09".to_string()),
            event_date: Some("2024-03-03".to_string()),
            date_ranges: vec![DateRange {
                start: Some("2024-05-01".to_string()),
                end: Some("2024-05-02".to_string()),
                kind: "event_period".to_string(),
            }],
            ..Default::default()
        };
        let merged = merge(Some(primary), Some(secondary)).unwrap();
        assert_eq!(merged.filing_date.as_deref(), Some("2024-01-01"));
        assert_eq!(merged.event_date.as_deref(), Some("2024-03-03"));
        assert_eq!(merged.date_ranges.len(), 2);
    }
}
