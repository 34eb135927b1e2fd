//! Natural-language date parser for the short phrases the entity stage produces.
//!
//! Phrases are resolved against a relative base instant in the target zone.
//! Anything the parser does not recognise yields `None`; there is no guessing.

use std::sync::LazyLock;

use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Weekday,
};
use chrono_tz::Tz;
use regex::Regex;

use super::time::parse_simple_time;

/// Parser inputs besides the text itself.
#[derive(Debug, Clone)]
pub struct ParseSettings {
    pub timezone: Tz,
    /// "Now" for relative phrases. Missing time-of-day is taken from here.
    pub relative_base: DateTime<Tz>,
    /// Resolve ambiguous phrases (bare weekdays, year-less dates) forward.
    pub prefer_future: bool,
}

impl ParseSettings {
    pub fn new(relative_base: DateTime<Tz>) -> Self {
        Self {
            timezone: relative_base.timezone(),
            relative_base,
            prefer_future: true,
        }
    }
}

/// Natural-language date parsing capability.
pub trait DateParser: Send + Sync {
    /// Absolute, zone-aware instant for `text`, or `None` if it cannot be resolved.
    fn parse(&self, text: &str, settings: &ParseSettings) -> Option<DateTime<Tz>>;
}

/// Earliest local instant on `date` in `tz`. Differs from midnight only when
/// a DST transition skips it.
pub fn first_instant_of_day(tz: Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24 * 60).find_map(|minutes| {
        tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
            .earliest()
    })
}

/// Built-in English relative/absolute date parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelativeDateParser;

impl DateParser for RelativeDateParser {
    fn parse(&self, text: &str, settings: &ParseSettings) -> Option<DateTime<Tz>> {
        let base = settings.relative_base.naive_local();
        let tokens = tokenize(text);
        let (tokens, time_of_day) = split_time_of_day(tokens)?;

        let phrase = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !FILLER_WORDS.contains(t))
            .collect::<Vec<_>>()
            .join(" ");

        let resolved = if phrase.is_empty() {
            // A bare time means today.
            time_of_day?;
            base
        } else {
            resolve_phrase(&phrase, base, settings.prefer_future)?
        };

        let resolved = match time_of_day {
            Some(time) => resolved.date().and_time(time),
            None => resolved,
        };

        let mut localized = settings.timezone.from_local_datetime(&resolved).earliest();
        if localized.is_none() && time_of_day.is_none() && resolved.time() == base.time() {
            // Date-only result whose base time falls in a gap.
            localized = first_instant_of_day(settings.timezone, resolved.date());
        }
        if localized.is_none() {
            tracing::debug!(%resolved, tz = %settings.timezone, "Local time does not exist");
        }
        localized
    }
}

const FILLER_WORDS: &[&str] = &["at", "on", "the", "of", "by"];

static CLOCK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}(?::\d{2})?(?:am|pm)?$").expect("valid regex")
});

static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<qual>this|next|last|coming)\s+)?(?P<day>[a-z]+)$").expect("valid regex")
});

static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<qual>this|next|last)\s+(?P<unit>week|month|year)$").expect("valid regex")
});

static IN_OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^in\s+(?P<n>\d{1,4}|[a-z]+)\s+(?P<unit>minute|hour|day|week|fortnight|month|year)s?$")
        .expect("valid regex")
});

static SUFFIX_OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<n>\d{1,4}|[a-z]+)\s+(?P<unit>minute|hour|day|week|fortnight|month|year)s?\s+(?P<dir>from now|later|hence|ago)$",
    )
    .expect("valid regex")
});

static ISO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})$").expect("valid regex")
});

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<a>\d{1,2})[/.-](?P<b>\d{1,2})(?:[/.-](?P<y>\d{4}|\d{2}))?$").expect("valid regex")
});

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<d>\d{1,2})(?:st|nd|rd|th)?\s+(?P<month>[a-z]+)(?:\s+(?P<y>\d{4}))?$")
        .expect("valid regex")
});

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<month>[a-z]+)\s+(?P<d>\d{1,2})(?:st|nd|rd|th)?(?:\s+(?P<y>\d{4}))?$")
        .expect("valid regex")
});

static DAY_OF_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<d>\d{1,2})(?:st|nd|rd|th)$").expect("valid regex"));

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|t| t.trim_matches(|c: char| matches!(c, ';' | '!' | '?')).trim_end_matches('.'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Remove clock times and day-part words, returning the remaining tokens and
/// the first time found. `None` when a clock-shaped token is out of range.
fn split_time_of_day(tokens: Vec<String>) -> Option<(Vec<String>, Option<NaiveTime>)> {
    let mut rest = Vec::with_capacity(tokens.len());
    let mut found: Option<NaiveTime> = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();
        let next = tokens.get(i + 1).map(String::as_str);
        let prev = i.checked_sub(1).and_then(|p| tokens.get(p)).map(String::as_str);

        let mut consumed = 1;
        let time = if let Some(time) = day_part(token) {
            if token == "tonight" {
                rest.push("today".to_string());
            }
            Some(time)
        } else if CLOCK_TOKEN.is_match(token) {
            let explicit = token.contains(':') || token.ends_with("am") || token.ends_with("pm");
            if explicit {
                Some(hm(parse_simple_time(token)?)?)
            } else if matches!(next, Some("am" | "pm")) {
                consumed = 2;
                Some(hm(parse_simple_time(&format!("{token}{}", next.unwrap_or_default()))?)?)
            } else if prev == Some("at") {
                Some(hm(parse_simple_time(token)?)?)
            } else {
                None
            }
        } else {
            None
        };

        match time {
            Some(time) => {
                found.get_or_insert(time);
            }
            None => rest.push(tokens[i].clone()),
        }
        i += consumed;
    }

    Some((rest, found))
}

fn hm((hour, minute): (u32, u32)) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn day_part(word: &str) -> Option<NaiveTime> {
    let (hour, minute) = match word {
        "noon" | "midday" => (12, 0),
        "midnight" => (0, 0),
        "morning" => (9, 0),
        "afternoon" => (14, 0),
        "evening" => (18, 0),
        "night" | "tonight" => (21, 0),
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn resolve_phrase(phrase: &str, base: NaiveDateTime, prefer_future: bool) -> Option<NaiveDateTime> {
    let today = base.date();
    let at_base_time = |date: NaiveDate| Some(date.and_time(base.time()));

    match phrase {
        "now" => return Some(base),
        // "this" is what remains of "this morning" once the day part is taken.
        "today" | "this" => return at_base_time(today),
        "tomorrow" | "next day" => return at_base_time(today.checked_add_days(Days::new(1))?),
        "day after tomorrow" => return at_base_time(today.checked_add_days(Days::new(2))?),
        "yesterday" => return at_base_time(today.checked_sub_days(Days::new(1))?),
        "day before yesterday" => return at_base_time(today.checked_sub_days(Days::new(2))?),
        _ => {}
    }

    if let Some(caps) = PERIOD_RE.captures(phrase) {
        let sign = match &caps["qual"] {
            "next" => 1,
            "last" => -1,
            _ => 0,
        };
        let unit = &caps["unit"];
        return shift(base, sign, unit);
    }

    if let Some(caps) = WEEKDAY_RE.captures(phrase) {
        if let Some(target) = weekday_from_name(&caps["day"]) {
            let qual = caps.name("qual").map(|m| m.as_str());
            return at_base_time(resolve_weekday(today, target, qual, prefer_future)?);
        }
    }

    if let Some(caps) = IN_OFFSET_RE.captures(phrase) {
        let n = amount(&caps["n"])?;
        return shift(base, n, &caps["unit"]);
    }

    if let Some(caps) = SUFFIX_OFFSET_RE.captures(phrase) {
        let n = amount(&caps["n"])?;
        let n = if &caps["dir"] == "ago" { -n } else { n };
        return shift(base, n, &caps["unit"]);
    }

    if let Some(caps) = ISO_RE.captures(phrase) {
        let date = NaiveDate::from_ymd_opt(
            caps["y"].parse().ok()?,
            caps["m"].parse().ok()?,
            caps["d"].parse().ok()?,
        )?;
        return at_base_time(date);
    }

    if let Some(caps) = NUMERIC_RE.captures(phrase) {
        let a: u32 = caps["a"].parse().ok()?;
        let b: u32 = caps["b"].parse().ok()?;
        let year = match caps.name("y") {
            Some(y) => Some(expand_year(y.as_str())?),
            None => None,
        };
        // Month first; day first when that is not a valid date.
        let date = resolve_calendar(today, a, b, year, prefer_future)
            .or_else(|| resolve_calendar(today, b, a, year, prefer_future))?;
        return at_base_time(date);
    }

    for re in [&*DAY_MONTH_RE, &*MONTH_DAY_RE] {
        if let Some(caps) = re.captures(phrase) {
            if let Some(month) = month_from_name(&caps["month"]) {
                let day: u32 = caps["d"].parse().ok()?;
                let year = caps.name("y").map(|y| y.as_str().parse::<i32>()).transpose().ok()?;
                return at_base_time(resolve_calendar(today, month, day, year, prefer_future)?);
            }
        }
    }

    if let Some(caps) = DAY_OF_MONTH_RE.captures(phrase) {
        let day: u32 = caps["d"].parse().ok()?;
        return at_base_time(resolve_day_of_month(today, day, prefer_future)?);
    }

    None
}

fn resolve_weekday(
    today: NaiveDate,
    target: Weekday,
    qual: Option<&str>,
    prefer_future: bool,
) -> Option<NaiveDate> {
    let ahead = (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let behind = (7 - ahead) % 7;
    let strictly_ahead = if ahead == 0 { 7 } else { ahead };
    let strictly_behind = if behind == 0 { 7 } else { behind };

    match qual {
        Some("this") => today.checked_add_days(Days::new(ahead.into())),
        Some("next" | "coming") => today.checked_add_days(Days::new(strictly_ahead.into())),
        Some("last") => today.checked_sub_days(Days::new(strictly_behind.into())),
        _ if prefer_future => today.checked_add_days(Days::new(strictly_ahead.into())),
        _ => today.checked_sub_days(Days::new(behind.into())),
    }
}

/// A month/day pair, in the given year or (year-less) the nearest fitting one.
fn resolve_calendar(
    today: NaiveDate,
    month: u32,
    day: u32,
    year: Option<i32>,
    prefer_future: bool,
) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    if !prefer_future {
        return this_year;
    }
    match this_year {
        Some(date) if date >= today => Some(date),
        // Feb 29 may be up to four years out.
        _ => (1..=4).find_map(|k| NaiveDate::from_ymd_opt(today.year() + k, month, day)),
    }
}

fn resolve_day_of_month(today: NaiveDate, day: u32, prefer_future: bool) -> Option<NaiveDate> {
    if !(1..=31).contains(&day) {
        return None;
    }
    let month_start = today.with_day(1)?;
    if !prefer_future {
        return month_start.with_day(day);
    }
    (0..=12).find_map(|k| {
        let candidate = month_start.checked_add_months(Months::new(k))?.with_day(day)?;
        (candidate >= today).then_some(candidate)
    })
}

fn shift(base: NaiveDateTime, n: i64, unit: &str) -> Option<NaiveDateTime> {
    let months = |m: i64| -> Option<NaiveDateTime> {
        let count = Months::new(u32::try_from(m.unsigned_abs()).ok()?);
        if m >= 0 {
            base.checked_add_months(count)
        } else {
            base.checked_sub_months(count)
        }
    };
    match unit {
        "minute" => base.checked_add_signed(Duration::try_minutes(n)?),
        "hour" => base.checked_add_signed(Duration::try_hours(n)?),
        "day" => base.checked_add_signed(Duration::try_days(n)?),
        "week" => base.checked_add_signed(Duration::try_weeks(n)?),
        "fortnight" => base.checked_add_signed(Duration::try_weeks(n.checked_mul(2)?)?),
        "month" => months(n),
        "year" => months(n.checked_mul(12)?),
        _ => None,
    }
}

fn amount(word: &str) -> Option<i64> {
    if let Ok(n) = word.parse() {
        return Some(n);
    }
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 { 2000 + year } else { year })
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    Some(match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" | "weds" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    })
}

fn month_from_name(name: &str) -> Option<u32> {
    Some(match name {
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

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-03-12 is a Wednesday.
    fn settings_at(tz: Tz, y: i32, m: u32, d: u32) -> ParseSettings {
        ParseSettings::new(tz.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    fn kolkata() -> ParseSettings {
        settings_at(chrono_tz::Asia::Kolkata, 2025, 3, 12)
    }

    fn parse(text: &str, settings: &ParseSettings) -> Option<String> {
        RelativeDateParser
            .parse(text, settings)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
    }

    fn date(text: &str) -> Option<String> {
        parse(text, &kolkata()).map(|s| s[..10].to_string())
    }

    #[test]
    fn simple_relative_days() {
        assert_eq!(date("today").as_deref(), Some("2025-03-12"));
        assert_eq!(date("Tomorrow").as_deref(), Some("2025-03-13"));
        assert_eq!(date("day after tomorrow").as_deref(), Some("2025-03-14"));
        assert_eq!(date("yesterday").as_deref(), Some("2025-03-11"));
        assert_eq!(date("next day").as_deref(), Some("2025-03-13"));
    }

    #[test]
    fn bare_weekday_is_strictly_future() {
        assert_eq!(date("friday").as_deref(), Some("2025-03-14"));
        assert_eq!(date("fri").as_deref(), Some("2025-03-14"));
        assert_eq!(date("wednesday").as_deref(), Some("2025-03-19"));
        assert_eq!(date("monday").as_deref(), Some("2025-03-17"));
    }

    #[test]
    fn qualified_weekdays() {
        assert_eq!(date("this wednesday").as_deref(), Some("2025-03-12"));
        assert_eq!(date("this friday").as_deref(), Some("2025-03-14"));
        assert_eq!(date("next wednesday").as_deref(), Some("2025-03-19"));
        assert_eq!(date("next friday").as_deref(), Some("2025-03-14"));
        assert_eq!(date("last friday").as_deref(), Some("2025-03-07"));
        assert_eq!(date("last wednesday").as_deref(), Some("2025-03-05"));
    }

    #[test]
    fn weekday_without_future_preference_looks_back() {
        let mut settings = kolkata();
        settings.prefer_future = false;
        assert_eq!(parse("wednesday", &settings).as_deref(), Some("2025-03-12 00:00"));
        assert_eq!(parse("monday", &settings).as_deref(), Some("2025-03-10 00:00"));
    }

    #[test]
    fn periods() {
        assert_eq!(date("next week").as_deref(), Some("2025-03-19"));
        assert_eq!(date("last week").as_deref(), Some("2025-03-05"));
        assert_eq!(date("next month").as_deref(), Some("2025-04-12"));
        assert_eq!(date("next year").as_deref(), Some("2026-03-12"));
        assert_eq!(date("this month").as_deref(), Some("2025-03-12"));
    }

    #[test]
    fn offsets() {
        assert_eq!(date("in 3 days").as_deref(), Some("2025-03-15"));
        assert_eq!(date("in a week").as_deref(), Some("2025-03-19"));
        assert_eq!(date("2 weeks from now").as_deref(), Some("2025-03-26"));
        assert_eq!(date("a month ago").as_deref(), Some("2025-02-12"));
        assert_eq!(date("in two months").as_deref(), Some("2025-05-12"));
        assert_eq!(parse("in 2 hours", &kolkata()).as_deref(), Some("2025-03-12 02:00"));
    }

    #[test]
    fn month_names() {
        assert_eq!(date("15th march").as_deref(), Some("2025-03-15"));
        assert_eq!(date("march 15th").as_deref(), Some("2025-03-15"));
        assert_eq!(date("the 5th of May").as_deref(), Some("2025-05-05"));
        assert_eq!(date("Sept 2").as_deref(), Some("2025-09-02"));
    }

    #[test]
    fn past_year_less_dates_roll_forward() {
        assert_eq!(date("march 10").as_deref(), Some("2026-03-10"));
        assert_eq!(date("march 10 2025").as_deref(), Some("2025-03-10"));
        assert_eq!(date("feb 29").as_deref(), Some("2028-02-29"));
        assert_eq!(date("feb 30"), None);
    }

    #[test]
    fn year_less_dates_without_future_preference_stay() {
        let mut settings = kolkata();
        settings.prefer_future = false;
        assert_eq!(parse("march 10", &settings).as_deref(), Some("2025-03-10 00:00"));
    }

    #[test]
    fn bare_day_of_month() {
        assert_eq!(date("31st").as_deref(), Some("2025-03-31"));
        assert_eq!(date("12th").as_deref(), Some("2025-03-12"));
        assert_eq!(date("10th").as_deref(), Some("2025-04-10"));
        assert_eq!(date("32nd"), None);
    }

    #[test]
    fn numeric_dates() {
        assert_eq!(date("2025-03-14").as_deref(), Some("2025-03-14"));
        assert_eq!(date("3/14").as_deref(), Some("2025-03-14"));
        assert_eq!(date("14/3").as_deref(), Some("2025-03-14"));
        assert_eq!(date("3/14/26").as_deref(), Some("2026-03-14"));
        assert_eq!(date("14.03.2025").as_deref(), Some("2025-03-14"));
        assert_eq!(date("2025-02-30"), None);
    }

    #[test]
    fn embedded_times() {
        let s = kolkata();
        assert_eq!(parse("friday 3pm", &s).as_deref(), Some("2025-03-14 15:00"));
        assert_eq!(parse("friday at 3 pm", &s).as_deref(), Some("2025-03-14 15:00"));
        assert_eq!(parse("tomorrow noon", &s).as_deref(), Some("2025-03-13 12:00"));
        assert_eq!(parse("this morning", &s).as_deref(), Some("2025-03-12 09:00"));
        assert_eq!(parse("tonight", &s).as_deref(), Some("2025-03-12 21:00"));
        assert_eq!(parse("at 3", &s).as_deref(), Some("2025-03-12 03:00"));
        assert_eq!(parse("10:30", &s).as_deref(), Some("2025-03-12 10:30"));
    }

    #[test]
    fn invalid_clock_token_fails() {
        assert_eq!(date("friday 25:00"), None);
    }

    #[test]
    fn unrecognised_phrases_fail() {
        assert_eq!(date(""), None);
        assert_eq!(date("gibberish"), None);
        assert_eq!(date("dentist 3"), None);
        assert_eq!(date("next fortnightly"), None);
    }

    #[test]
    fn dst_gap_is_unresolved() {
        let settings = settings_at(chrono_tz::America::New_York, 2025, 3, 8);
        assert_eq!(parse("tomorrow 2:30am", &settings), None);
        assert_eq!(
            parse("tomorrow 3:30am", &settings).as_deref(),
            Some("2025-03-09 03:30")
        );
    }

    #[test]
    fn date_only_on_gap_midnight_takes_first_valid_instant() {
        // Santiago skips 2025-09-07 00:00..01:00.
        let settings = settings_at(chrono_tz::America::Santiago, 2025, 9, 5);
        assert_eq!(parse("sunday", &settings).as_deref(), Some("2025-09-07 01:00"));
        assert_eq!(parse("sunday 3pm", &settings).as_deref(), Some("2025-09-07 15:00"));
        assert_eq!(parse("sunday 0:30", &settings), None);
    }

    #[test]
    fn first_instant_of_ordinary_day_is_midnight() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let dt = first_instant_of_day(chrono_tz::Asia::Kolkata, date).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2025-03-12 00:00");
    }

    #[test]
    fn result_carries_settings_zone() {
        let settings = kolkata();
        let dt = RelativeDateParser.parse("friday", &settings).unwrap();
        assert_eq!(dt.timezone(), chrono_tz::Asia::Kolkata);
    }
}
