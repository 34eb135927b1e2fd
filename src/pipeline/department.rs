//! Department canonicalization: raw department token -> display name.

/// Canonical keywords in the order extraction tries them.
///
/// Extraction returns the first keyword found as a substring of the text, so
/// a keyword must come before any longer keyword containing it
/// (`cardio` before `cardiologist`).
pub const CANONICAL_DEPARTMENTS: &[(&str, &str)] = &[
    ("dentist", "Dentistry"),
    ("dental", "Dentistry"),
    ("cardio", "Cardiology"),
    ("cardiologist", "Cardiology"),
    ("eye", "Ophthalmology"),
    ("general", "General Medicine"),
    ("gynac", "Gynaecology"),
    ("gynaecologist", "Gynaecology"),
    ("optometrist", "Ophthalmology"),
];

/// Map a department token to its display name.
///
/// Lookup is case-insensitive. Unknown tokens pass through exactly as given;
/// an absent department yields an empty string.
pub fn canonicalize_department(raw: Option<&str>) -> String {
    let raw = raw.unwrap_or("");
    let key = raw.trim().to_lowercase();

    CANONICAL_DEPARTMENTS
        .iter()
        .find(|(keyword, _)| *keyword == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| raw.to_string())
}
