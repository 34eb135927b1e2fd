use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::natural::{first_instant_of_day, DateParser, ParseSettings};
use super::time::parse_simple_time;
use super::types::NormalizedDateTime;
use super::NormalizationError;
use crate::config::NORMALIZATION_SUCCESS_CONFIDENCE;

/// Resolve phrases to a concrete date and time in `locale`.
///
/// Never fails: every error path is logged and returns the unresolved marker.
pub fn normalize_datetime(
    date_phrase: Option<&str>,
    time_phrase: Option<&str>,
    locale: &str,
    now: DateTime<Utc>,
    parser: &dyn DateParser,
) -> NormalizedDateTime {
    match try_normalize_datetime(date_phrase, time_phrase, locale, now, parser) {
        Ok(normalized) => {
            tracing::info!(
                date = normalized.date.as_deref().unwrap_or_default(),
                time = normalized.time.as_deref().unwrap_or_default(),
                tz = locale,
                "Date/time normalized"
            );
            normalized
        }
        Err(e @ NormalizationError::UnknownTimezone(_)) => {
            tracing::warn!(error = %e, "Normalization failed");
            NormalizedDateTime::unresolved(locale)
        }
        Err(e) => {
            tracing::info!(error = %e, "Normalization unresolved");
            NormalizedDateTime::unresolved(locale)
        }
    }
}

pub fn try_normalize_datetime(
    date_phrase: Option<&str>,
    time_phrase: Option<&str>,
    locale: &str,
    now: DateTime<Utc>,
    parser: &dyn DateParser,
) -> Result<NormalizedDateTime, NormalizationError> {
    let date_phrase = date_phrase.map(str::trim).filter(|p| !p.is_empty());
    let time_phrase = time_phrase.map(str::trim).filter(|p| !p.is_empty());

    if date_phrase.is_none() && time_phrase.is_none() {
        return Err(NormalizationError::NoPhrases);
    }

    let tz: Tz = locale
        .parse()
        .map_err(|_| NormalizationError::UnknownTimezone(locale.to_string()))?;

    let local_now = now.with_timezone(&tz);
    let settings = ParseSettings {
        timezone: tz,
        relative_base: local_midnight(local_now),
        prefer_future: true,
    };

    let mut parsed = date_phrase.and_then(|phrase| {
        tracing::debug!(phrase, "Parsing date phrase");
        parser.parse(phrase, &settings)
    });

    if parsed.is_none() {
        let combined = format!(
            "{} {}",
            date_phrase.unwrap_or_default(),
            time_phrase.unwrap_or_default()
        );
        let combined = combined.trim();
        tracing::debug!(phrase = combined, "Date phrase failed, trying combined text");
        parsed = parser.parse(combined, &settings);
    }

    let parsed = parsed.ok_or_else(|| {
        NormalizationError::Unparseable(
            [date_phrase, time_phrase]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
        )
    })?;

    let clock_time = time_phrase.and_then(|phrase| {
        let time = parse_simple_time(phrase);
        if time.is_none() {
            tracing::warn!(phrase, "Time phrase not understood, defaulting to 00:00");
        }
        time
    });

    let final_dt = match clock_time {
        Some((hour, minute)) => {
            let naive = NaiveTime::from_hms_opt(hour, minute, 0)
                .map(|time| parsed.date_naive().and_time(time))
                .ok_or_else(|| {
                    NormalizationError::NonexistentLocalTime(
                        format!("{hour:02}:{minute:02}"),
                        locale.to_string(),
                    )
                })?;
            tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
                NormalizationError::NonexistentLocalTime(naive.to_string(), locale.to_string())
            })?
        }
        // Defaulted midnight: a skipped midnight becomes the first valid instant.
        None => first_instant_of_day(tz, parsed.date_naive()).ok_or_else(|| {
            NormalizationError::NonexistentLocalTime(
                parsed.date_naive().to_string(),
                locale.to_string(),
            )
        })?,
    };

    Ok(NormalizedDateTime {
        date: Some(final_dt.format("%Y-%m-%d").to_string()),
        time: Some(final_dt.format("%H:%M").to_string()),
        timezone: locale.to_string(),
        confidence: NORMALIZATION_SUCCESS_CONFIDENCE,
    })
}

/// Start of the current local day, so relative phrases resolve to dates
/// rather than date-plus-current-time.
fn local_midnight(local_now: DateTime<Tz>) -> DateTime<Tz> {
    first_instant_of_day(local_now.timezone(), local_now.date_naive()).unwrap_or(local_now)
}
