// src/app/timefmt.rs
//
// Date/time handling for the programme feed. The feed carries local
// wall-clock fields (`date` = YYYY-MM-DD, `heure` = HH:MM) with no timezone;
// everything here works on chrono naive types.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Sunday-first day-of-week abbreviations, as printed on the strip caps.
const JOURS: [&str; 7] = ["DIM", "LUN", "MAR", "MER", "JEU", "VEN", "SAM"];

/// Day label for one strip column: `abbr` like "MER", `date` like "04/09".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DayParts {
    pub abbr: String,
    pub date: String,
}

fn slice_num(s: &str, range: std::ops::Range<usize>) -> Option<u32> {
    s.get(range).and_then(|part| part.trim().parse::<u32>().ok())
}

/// Combine the feed's `date` and `heure` fields into a local instant.
///
/// The date must yield a valid calendar day or the whole instant is invalid.
/// Hour/minute fall back to 0 when the time field is present but garbled;
/// the source feed behaves the same way, so a malformed time reads as
/// midnight rather than dropping the session here. The eligibility filter
/// separately rejects blank time fields.
pub fn parse_instant(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    let time = time.trim();
    if date.is_empty() || time.is_empty() {
        return None;
    }

    let y = slice_num(date, 0..4)? as i32;
    let m = slice_num(date, 5..7)?;
    let d = slice_num(date, 8..10)?;

    let hh = slice_num(time, 0..2).unwrap_or(0);
    let mm = slice_num(time, 3..5).unwrap_or(0);

    NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(hh, mm, 0)
}

/// Split an ISO date into the strip-cap label parts.
///
/// Empty input gives two empty strings; a present but unparseable date keeps
/// the raw text in the `date` slot so the column still shows something.
pub fn day_parts(date: &str) -> DayParts {
    let date = date.trim();
    if date.is_empty() {
        return DayParts::default();
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => DayParts {
            abbr: JOURS[d.weekday().num_days_from_sunday() as usize].to_string(),
            date: format!("{:02}/{:02}", d.day(), d.month()),
        },
        Err(_) => DayParts {
            abbr: String::new(),
            date: date.to_string(),
        },
    }
}

/// "105" minutes -> "1h45"; under an hour -> "45 min".
pub fn format_duration(minutes: u32) -> String {
    if minutes >= 60 {
        let h = minutes / 60;
        let m = minutes % 60;
        if m > 0 {
            format!("{h}h{m:02}")
        } else {
            format!("{h}h00")
        }
    } else {
        format!("{minutes} min")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_plain_date_and_time() {
        let dt = parse_instant("2025-09-04", "20:30").expect("valid instant");
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 9, 4).unwrap());
        assert_eq!((dt.hour(), dt.minute()), (20, 30));
    }

    #[test]
    fn garbled_time_defaults_to_midnight() {
        // Matches the feed's lenient behaviour: bad digits read as 0.
        let dt = parse_instant("2025-09-04", "xx:yy").expect("date carries it");
        assert_eq!((dt.hour(), dt.minute()), (0, 0));
    }

    #[test]
    fn missing_fields_are_invalid() {
        assert!(parse_instant("", "20:30").is_none());
        assert!(parse_instant("2025-09-04", "").is_none());
        assert!(parse_instant("2025-9", "20:30").is_none());
        assert!(parse_instant("2025-13-04", "20:30").is_none());
    }

    #[test]
    fn day_parts_formats_french_abbreviations() {
        // 2025-09-04 is a Thursday.
        let parts = day_parts("2025-09-04");
        assert_eq!(parts.abbr, "JEU");
        assert_eq!(parts.date, "04/09");
    }

    #[test]
    fn day_parts_degrades_gracefully() {
        assert_eq!(day_parts(""), DayParts::default());
        let parts = day_parts("pas-une-date");
        assert_eq!(parts.abbr, "");
        assert_eq!(parts.date, "pas-une-date");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(60), "1h00");
        assert_eq!(format_duration(105), "1h45");
        assert_eq!(format_duration(125), "2h05");
    }
}
