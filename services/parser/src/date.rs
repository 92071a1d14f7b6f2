//! Service date normalization.
//!
//! Recognized shapes, tried in order:
//! 1. `MARTES 20.05.2025` (weekday followed by `DD.MM.YYYY`, company template)
//! 2. `DD/MM/YYYY`, `DD.MM.YYYY`, `DD-MM-YYYY`
//! 3. `YYYY/MM/DD`, `YYYY.MM.DD`, `YYYY-MM-DD`
//! 4. `15 de agosto de 2024`

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static WEEKDAY_DOTTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[A-Za-zÁÉÍÓÚÜÑÀÈÒÇáéíóúüñàèòç]+,?\s+(\d{1,2})\.(\d{1,2})\.(\d{4})")
        .expect("weekday date pattern")
});

static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})\b").expect("day-first date pattern")
});

static YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})\b").expect("year-first date pattern")
});

static SPANISH_LONG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s+de\s+([a-záéíóúñ]+)\s+de\s+(\d{4})").expect("long date pattern")
});

const SPANISH_MONTHS: &[(&str, u32)] = &[
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

/// Normalize `text` to `YYYY-MM-DD`, or return it unchanged when no shape
/// matches or the matched date does not exist on the calendar.
pub fn normalize_date(text: &str) -> String {
    match parse_date(text) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => text.to_string(),
    }
}

/// Parse the first recognized date shape. The first shape that matches
/// decides; an impossible date there is not retried against later shapes.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = WEEKDAY_DOTTED.captures(text) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }
    if let Some(caps) = DAY_FIRST.captures(text) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }
    if let Some(caps) = YEAR_FIRST.captures(text) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = SPANISH_LONG.captures(text) {
        let month_name = caps[2].to_lowercase();
        let month = SPANISH_MONTHS
            .iter()
            .find(|(name, _)| *name == month_name)
            .map(|(_, m)| *m)?;
        let day: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_template_weekday() {
        assert_eq!(normalize_date("MARTES 20.05.2025"), "2025-05-20");
    }

    #[test]
    fn test_accented_weekday() {
        assert_eq!(normalize_date("MIÉRCOLES 4.6.2025"), "2025-06-04");
        assert_eq!(normalize_date("SÁBADO 07.06.2025"), "2025-06-07");
    }

    #[test]
    fn test_day_first_separators() {
        assert_eq!(normalize_date("20/05/2025"), "2025-05-20");
        assert_eq!(normalize_date("20-05-2025"), "2025-05-20");
        assert_eq!(normalize_date("1.2.2025"), "2025-02-01");
    }

    #[test]
    fn test_year_first() {
        assert_eq!(normalize_date("2025-05-20"), "2025-05-20");
        assert_eq!(normalize_date("2025/5/2"), "2025-05-02");
    }

    #[test]
    fn test_spanish_long_form() {
        assert_eq!(normalize_date("15 de agosto de 2024"), "2024-08-15");
        assert_eq!(normalize_date("Viernes, 3 de Octubre de 2025"), "2025-10-03");
        assert_eq!(normalize_date("1 de setiembre de 2024"), "2024-09-01");
    }

    #[test]
    fn test_unknown_month_passthrough() {
        assert_eq!(normalize_date("15 de agost de 2024"), "15 de agost de 2024");
    }

    #[test]
    fn test_unparseable_passthrough() {
        assert_eq!(normalize_date("not a date"), "not a date");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_invalid_calendar_date_passthrough() {
        assert_eq!(normalize_date("31/02/2025"), "31/02/2025");
        assert_eq!(normalize_date("LUNES 32.01.2025"), "LUNES 32.01.2025");
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(normalize_date("29/02/2024"), "2024-02-29");
        assert_eq!(normalize_date("29/02/2025"), "29/02/2025");
    }
}
