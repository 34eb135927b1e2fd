use serde::{Deserialize, Serialize};

use super::enums::VerdictStatus;

/// Final, guardrail-approved appointment.
///
/// `department` is the canonical display name when the extracted token is
/// known, otherwise the token as extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub department: String,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// 24-hour `HH:MM`
    pub time: Option<String>,
    /// IANA zone name the date and time are expressed in.
    pub timezone: String,
    pub status: VerdictStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_serializes_flat_record() {
        let appointment = Appointment {
            department: "Dentistry".into(),
            date: Some("2026-10-23".into()),
            time: Some("15:00".into()),
            timezone: "Asia/Kolkata".into(),
            status: VerdictStatus::Ok,
        };
        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["department"], "Dentistry");
        assert_eq!(json["date"], "2026-10-23");
        assert_eq!(json["time"], "15:00");
        assert_eq!(json["timezone"], "Asia/Kolkata");
        assert_eq!(json["status"], "ok");
    }
}
