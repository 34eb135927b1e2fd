use serde::{Deserialize, Serialize};

/// Resolved calendar values, or the unresolved marker (no date, no time, 0.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDateTime {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// 24-hour `HH:MM`
    pub time: Option<String>,
    /// IANA name, echoed back as given.
    pub timezone: String,
    pub confidence: f32,
}

impl NormalizedDateTime {
    pub fn unresolved(timezone: &str) -> Self {
        Self {
            date: None,
            time: None,
            timezone: timezone.to_string(),
            confidence: 0.0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }
}
