//! Pattern channel: regex and keyword heuristics for each entity field.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::department::CANONICAL_DEPARTMENTS;

/// Clock time (`3`, `3pm`, `10:30 am`) or a day-part word.
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<time>\b\d{1,2}(?::\d{2})?\s*(?:am|pm)?\b|\bnoon\b|\bmorning\b|\bevening\b)")
        .expect("valid regex")
});

/// Date hints in priority order. Matched against lower-cased text;
/// the first pattern with any match wins.
static DATE_HINTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"this\s+\w+",
        r"next\s+\w+",
        r"today",
        r"tomorrow",
        r"friday|monday|tuesday|wednesday|thursday|saturday|sunday",
        r"\d{1,2}(?:st|nd|rd|th)?\s+\w+",
        r"\w+\s+\d{1,2}(?:st|nd|rd|th)?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// "book a X", "for X", "to see X": X is a candidate department.
static DEPARTMENT_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:book|for|to see)\s+(?:a\s+)?(?P<raw_dep>\w+)\b").expect("valid regex")
});

/// Words a trigger may capture that never name a department.
const DEPARTMENT_STOP_WORDS: &[&str] = &["the", "an", "appointment", "time", "date", "dr"];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// First clock time or day-part word in the text.
pub fn extract_time(text: &str) -> Option<String> {
    TIME_RE
        .captures(text)
        .and_then(|c| c.name("time"))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// First date hint, trying patterns in priority order.
pub fn extract_date_phrase(text: &str) -> Option<String> {
    let low = text.to_lowercase();
    DATE_HINTS
        .iter()
        .find_map(|re| re.find(&low))
        .map(|m| m.as_str().to_string())
}

/// Department token: a canonical keyword if one appears anywhere in the text,
/// else the word after a booking trigger unless it is a stop word.
pub fn extract_department(text: &str) -> Option<String> {
    let low = text.to_lowercase();

    if let Some((keyword, _)) = CANONICAL_DEPARTMENTS
        .iter()
        .find(|(keyword, _)| low.contains(keyword))
    {
        return Some(keyword.to_string());
    }

    let raw = DEPARTMENT_TRIGGER
        .captures(&low)
        .and_then(|c| c.name("raw_dep"))?
        .as_str()
        .trim();

    if DEPARTMENT_STOP_WORDS.contains(&raw) {
        return None;
    }
    Some(raw.to_string())
}

/// Remove relative qualifiers the date parser would read ambiguously.
///
/// `next day` becomes `tomorrow`; `next <weekday>` becomes `<weekday>`.
/// Anything else is returned as given.
pub fn clean_date_phrase(phrase: Option<String>) -> Option<String> {
    let phrase = phrase.filter(|p| !p.trim().is_empty())?;
    let low = phrase
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if low == "next day" {
        return Some("tomorrow".to_string());
    }

    if let Some(day) = low.strip_prefix("next ") {
        if WEEKDAYS.contains(&day) {
            tracing::debug!(phrase = %low, "Dropping 'next' qualifier from weekday");
            return Some(day.to_string());
        }
    }

    Some(phrase)
}
