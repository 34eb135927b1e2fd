//! Lightweight clock-time parser, independent of the natural-language date parser.

use std::sync::LazyLock;

use regex::Regex;

static TWELVE_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?(?P<meridiem>am|pm)$").expect("valid regex")
});

static TWENTY_FOUR_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?$").expect("valid regex")
});

/// Parse `H`, `H:MM`, `HH:MM`, optionally suffixed `am`/`pm`, into (hour, minute).
///
/// Case and inner spaces are ignored (`"10:30 PM"` works). With a meridiem the
/// hour must be 1-12; `12am` is midnight and `12pm` is noon. Without one the
/// hour is 0-23. Anything else, including words like "noon", is `None`.
pub fn parse_simple_time(phrase: &str) -> Option<(u32, u32)> {
    let compact: String = phrase
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if let Some(caps) = TWELVE_HOUR.captures(&compact) {
        let hour: u32 = caps["hour"].parse().ok()?;
        let minute = parse_minute(caps.name("minute").map(|m| m.as_str()))?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let hour = match (&caps["meridiem"], hour) {
            ("am", 12) => 0,
            ("am", h) => h,
            ("pm", 12) => 12,
            (_, h) => h + 12,
        };
        return Some((hour, minute));
    }

    let caps = TWENTY_FOUR_HOUR.captures(&compact)?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute = parse_minute(caps.name("minute").map(|m| m.as_str()))?;
    (hour <= 23).then_some((hour, minute))
}

fn parse_minute(raw: Option<&str>) -> Option<u32> {
    match raw {
        None => Some(0),
        Some(m) => m.parse().ok().filter(|m| *m <= 59),
    }
}
