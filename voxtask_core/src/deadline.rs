//! Deadline span parsing into absolute timestamps.
//!
//! Natural-language parsing sits behind the [`DateParser`] trait so any
//! compliant implementation satisfies the contract; the rule-based
//! [`NaturalDateParser`] is the default. When the parser finds nothing, a
//! fixed fallback table of relative phrases is scanned in order. A deadline
//! that resolves nowhere is a diagnostic for the caller, never a failure.

use chrono::{Datelike, Days, Duration, Local, NaiveDate, NaiveDateTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

/// Output format for resolved deadlines, naive local time.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Abstract natural-language date parsing capability.
///
/// `now` is passed explicitly so relative phrases stay deterministic
/// under test.
pub trait DateParser: Send + Sync {
    fn parse(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDateTime>;
}

#[expect(clippy::expect_used, reason = "patterns are compile-time constants")]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static ISO_DATE: Lazy<Regex> = Lazy::new(|| compile(r"^(\d{4})-(\d{1,2})-(\d{1,2})$"));

static MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| compile(r"^([a-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?(?:\s+(\d{4}))?$"));

static DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| compile(r"^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)(?:\s+(\d{4}))?$"));

static SLASH_DATE: Lazy<Regex> = Lazy::new(|| compile(r"^(\d{1,2})/(\d{1,2})/(\d{4})$"));

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?:this\s+|next\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)$")
});

static RELATIVE: Lazy<Regex> =
    Lazy::new(|| compile(r"^in\s+(\d{1,3})\s+(day|days|week|weeks|month|months)$"));

/// Rule-based date parser covering absolute dates, weekday names, and
/// `in N days/weeks/months` phrases.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalDateParser;

impl NaturalDateParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Lowercase, drop quote/comma/period characters, collapse whitespace.
    fn normalize(text: &str) -> String {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '"' | '\'' | ',' | '.'))
            .collect();
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn month_number(name: &str) -> Option<u32> {
        let n = match name {
            "january" | "jan" => 1,
            "february" | "feb" => 2,
            "march" | "mar" => 3,
            "april" | "apr" => 4,
            "may" => 5,
            "june" | "jun" => 6,
            "july" | "jul" => 7,
            "august" | "aug" => 8,
            "september" | "sept" | "sep" => 9,
            "october" | "oct" => 10,
            "november" | "nov" => 11,
            "december" | "dec" => 12,
            _ => return None,
        };
        Some(n)
    }

    /// Build a date from month/day and an optional year. Without a year,
    /// the current year is used unless that date has already passed, in
    /// which case the date rolls to the next year.
    fn calendar_date(
        month: u32,
        day: u32,
        year: Option<i32>,
        now: NaiveDateTime,
    ) -> Option<NaiveDate> {
        match year {
            Some(y) => NaiveDate::from_ymd_opt(y, month, day),
            None => {
                let this_year = NaiveDate::from_ymd_opt(now.year(), month, day)?;
                if this_year < now.date() {
                    NaiveDate::from_ymd_opt(now.year() + 1, month, day)
                } else {
                    Some(this_year)
                }
            }
        }
    }

    /// Next occurrence of `weekday` strictly after today, at midnight.
    fn next_weekday(weekday: Weekday, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut ahead =
            i64::from(weekday.num_days_from_monday()) - i64::from(now.weekday().num_days_from_monday());
        if ahead <= 0 {
            ahead += 7;
        }
        #[expect(clippy::cast_sign_loss, reason = "ahead is in 1..=7 here")]
        let date = now.date().checked_add_days(Days::new(ahead as u64))?;
        date.and_hms_opt(0, 0, 0)
    }

    fn parse_absolute(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if let Some(caps) = ISO_DATE.captures(text) {
            let date = NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            )?;
            return date.and_hms_opt(0, 0, 0);
        }

        if let Some(caps) = SLASH_DATE.captures(text) {
            // US order: month/day/year.
            let date = NaiveDate::from_ymd_opt(
                caps[3].parse().ok()?,
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
            )?;
            return date.and_hms_opt(0, 0, 0);
        }

        if let Some(caps) = MONTH_DAY.captures(text) {
            let month = Self::month_number(&caps[1])?;
            let day: u32 = caps[2].parse().ok()?;
            let year: Option<i32> = caps.get(3).and_then(|m| m.as_str().parse().ok());
            return Self::calendar_date(month, day, year, now)?.and_hms_opt(0, 0, 0);
        }

        if let Some(caps) = DAY_MONTH.captures(text) {
            let day: u32 = caps[1].parse().ok()?;
            let month = Self::month_number(&caps[2])?;
            let year: Option<i32> = caps.get(3).and_then(|m| m.as_str().parse().ok());
            return Self::calendar_date(month, day, year, now)?.and_hms_opt(0, 0, 0);
        }

        None
    }

    fn parse_relative(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if let Some(caps) = WEEKDAY.captures(text) {
            let weekday: Weekday = caps[1].parse().ok()?;
            return Self::next_weekday(weekday, now);
        }

        if let Some(caps) = RELATIVE.captures(text) {
            let n: i64 = caps[1].parse().ok()?;
            return match &caps[2] {
                "day" | "days" => now.checked_add_signed(Duration::days(n)),
                "week" | "weeks" => now.checked_add_signed(Duration::weeks(n)),
                _ => add_months_clamped(now, u32::try_from(n).ok()?),
            };
        }

        None
    }
}

impl DateParser for NaturalDateParser {
    fn parse(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let text = Self::normalize(text);
        if text.is_empty() {
            return None;
        }

        Self::parse_absolute(&text, now).or_else(|| Self::parse_relative(&text, now))
    }
}

/// Add calendar months, clamping the day-of-month to the last valid day of
/// the target month (Jan 31 + 1 month = Feb 28/29).
fn add_months_clamped(now: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    let total = now.month0() + months;
    let year = now.year() + i32::try_from(total / 12).ok()?;
    let month = total % 12 + 1;

    let last_day = NaiveDate::from_ymd_opt(
        if month == 12 { year + 1 } else { year },
        if month == 12 { 1 } else { month + 1 },
        1,
    )?
    .pred_opt()?
    .day();

    NaiveDate::from_ymd_opt(year, month, now.day().min(last_day)).map(|d| d.and_time(now.time()))
}

/// Resolves free-text deadline spans into ISO-8601 timestamps.
pub struct DeadlineResolver {
    parser: Box<dyn DateParser>,
}

impl Default for DeadlineResolver {
    fn default() -> Self {
        Self::new(Box::new(NaturalDateParser::new()))
    }
}

impl DeadlineResolver {
    #[must_use]
    pub fn new(parser: Box<dyn DateParser>) -> Self {
        Self { parser }
    }

    /// Resolve `text` against the current wall clock.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<String> {
        self.resolve_at(text, Local::now().naive_local())
    }

    /// Resolve `text` at an explicit instant. First success wins:
    /// the natural-language parser, then the fallback phrase table,
    /// then `None`.
    #[must_use]
    pub fn resolve_at(&self, text: &str, now: NaiveDateTime) -> Option<String> {
        info!(text, "parsing deadline");

        if let Some(parsed) = self.parser.parse(text, now) {
            return Some(parsed.format(ISO_FORMAT).to_string());
        }

        let lower = text.to_lowercase();
        let fallback: &[(&str, fn(NaiveDateTime) -> Option<NaiveDateTime>)] = &[
            ("today", |now| Some(now)),
            ("tomorrow", |now| now.checked_add_signed(Duration::days(1))),
            ("next week", |now| now.checked_add_signed(Duration::days(7))),
            ("next month", |now| add_months_clamped(now, 1)),
        ];

        for (pattern, apply) in fallback {
            if lower.contains(pattern) {
                return apply(now).map(|t| t.format(ISO_FORMAT).to_string());
            }
        }

        None
    }
}
