use chrono::{Local, NaiveDate, NaiveDateTime};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date on the server's local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parses a stored date string. Plain `YYYY-MM-DD` is the canonical form;
/// `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD HH:MM:SS` are accepted and truncated
/// to their date.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT) {
        return Some(date);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
}
