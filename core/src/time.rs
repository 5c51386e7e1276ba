use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate, TimeDelta, Utc, Weekday};

/// Today's date on the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Identifier for a record created right now: Unix time in milliseconds.
pub fn timestamp_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Parse the date an attendance mark applies to, relative to today.
///
/// Accepts `today`, `yesterday`, `-Nd` (N days ago), a weekday name (the most
/// recent such day, today included) or `YYYY-MM-DD`.
pub fn parse_attendance_date(input: &str) -> Result<NaiveDate> {
    parse_relative_to(input, today())
}

fn parse_relative_to(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim().to_lowercase();

    match input.as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yes" => return days_before(today, 1),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix('-') {
        let count = rest
            .strip_suffix('d')
            .ok_or_else(|| anyhow!("Relative dates look like -3d, got '{}'", input))?;
        let days: i64 = count.parse().map_err(|_| anyhow!("Invalid relative format"))?;
        if days < 0 {
            return Err(anyhow!("Day count must not be negative, got '{}'", input));
        }
        return days_before(today, days);
    }

    if let Ok(weekday) = parse_weekday_str(&input) {
        let back = (7 + today.weekday().num_days_from_monday()
            - weekday.num_days_from_monday())
            % 7;
        return days_before(today, i64::from(back));
    }

    NaiveDate::parse_from_str(&input, "%Y-%m-%d")
        .map_err(|_| anyhow!("Could not parse date: {}", input))
}

fn days_before(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .ok_or_else(|| anyhow!("{} days before {} is out of range", days, date))
}

fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Invalid weekday")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-09-03 is a Wednesday.
    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()
    }

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_relative_to("today", anchor()).unwrap(), ymd(3));
        assert_eq!(parse_relative_to("Yesterday", anchor()).unwrap(), ymd(2));
    }

    #[test]
    fn test_days_ago() {
        assert_eq!(parse_relative_to("-2d", anchor()).unwrap(), ymd(1));
        assert!(parse_relative_to("-2w", anchor()).is_err());
    }

    #[test]
    fn test_days_ago_out_of_range_is_error() {
        assert!(parse_relative_to("-999999999999d", anchor()).is_err());
        assert!(parse_relative_to("-99999999d", anchor()).is_err());
    }

    #[test]
    fn test_negative_day_count_is_rejected() {
        assert!(parse_relative_to("--3d", anchor()).is_err());
    }

    #[test]
    fn test_weekday_is_most_recent() {
        assert_eq!(parse_relative_to("wed", anchor()).unwrap(), ymd(3));
        assert_eq!(parse_relative_to("mon", anchor()).unwrap(), ymd(1));
        assert_eq!(
            parse_relative_to("thu", anchor()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 28).unwrap()
        );
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(
            parse_relative_to("2025-10-01", anchor()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
        );
        assert!(parse_relative_to("10/01/2025", anchor()).is_err());
    }

    #[test]
    fn test_timestamp_id_is_numeric() {
        assert!(timestamp_id().parse::<i64>().is_ok());
    }
}
