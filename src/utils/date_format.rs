use serde::{self, Deserialize, Deserializer, Serializer};
use time::{Date, Month, error::Format, macros::format_description};

// Bodies carry hire dates as MM/DD/YYYY. The roster API has also been seen
// answering with ISO dates, so both shapes are accepted when reading.
pub fn parse_wire_date(date_str: &str) -> Result<Date, String> {
    let format = format_description!("[month]/[day]/[year]");
    if let Ok(date) = Date::parse(date_str, &format) {
        return Ok(date);
    }

    // Some serializers append a time component; keep only the date part
    let date_part = date_str.split('T').next().unwrap_or(date_str);
    parse_iso_date(date_part)
        .map_err(|_| format!("Failed to parse date '{date_str}': expected MM/DD/YYYY"))
}

/// Parses the `YYYY-MM-DD` shape used by date pickers and query strings.
pub fn parse_iso_date(date_str: &str) -> Result<Date, String> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(date_str, &format).map_err(|e| format!("Failed to parse date '{date_str}': {e}"))
}

pub fn format_iso_date(date: Date) -> Result<String, Format> {
    date.format(&format_description!("[year]-[month]-[day]"))
}

pub fn format_wire_date(date: Date) -> Result<String, Format> {
    date.format(&format_description!("[month]/[day]/[year]"))
}

/// Converts a picker value (`YYYY-MM-DD`) to the wire shape (`MM/DD/YYYY`).
///
/// The value is split as text rather than parsed into a date-time, so no
/// timezone conversion can move it to a neighbouring day.
pub fn iso_to_wire(date_str: &str) -> Result<String, String> {
    let parts: Vec<&str> = date_str.trim().split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(format!("Failed to parse date '{date_str}': expected YYYY-MM-DD"));
    };

    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(*year, 4) || !all_digits(*month, 2) || !all_digits(*day, 2) {
        return Err(format!("Failed to parse date '{date_str}': expected YYYY-MM-DD"));
    }

    // Reject values like 2025-13-40 while still formatting from the raw parts
    let month_number: u8 = month.parse().map_err(|_| format!("Invalid month in '{date_str}'"))?;
    let month_value = Month::try_from(month_number).map_err(|e| format!("Invalid month in '{date_str}': {e}"))?;
    let year_number: i32 = year.parse().map_err(|_| format!("Invalid year in '{date_str}'"))?;
    let day_number: u8 = day.parse().map_err(|_| format!("Invalid day in '{date_str}'"))?;
    Date::from_calendar_date(year_number, month_value, day_number)
        .map_err(|e| format!("Invalid date '{date_str}': {e}"))?;

    Ok(format!("{month}/{day}/{year}"))
}

// Hire dates on the wire (MM/DD/YYYY). Stored records may carry null,
// empty or garbled values, which read as `None`.
pub mod optional_wire_date {
    use super::{Date, Deserialize, Deserializer, Serializer, format_wire_date, parse_wire_date, serde};

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                let formatted = format_wire_date(*date).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => match parse_wire_date(&s) {
                Ok(date) => Ok(Some(date)),
                Err(reason) => {
                    warn!(%reason, "dropping unreadable hire date");
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }
}

// Query-string dates (YYYY-MM-DD)
pub mod iso_date {
    use super::{Date, Deserialize, Deserializer, Serializer, format_iso_date, parse_iso_date, serde};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = format_iso_date(*date).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let date_str = String::deserialize(deserializer)?;
        parse_iso_date(&date_str).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn picker_value_is_split_not_shifted() {
        assert_eq!(iso_to_wire("2025-01-01").unwrap(), "01/01/2025");
        assert_eq!(iso_to_wire("1999-12-31").unwrap(), "12/31/1999");
    }

    #[test]
    fn malformed_picker_values_are_rejected() {
        assert!(iso_to_wire("").is_err());
        assert!(iso_to_wire("2025/01/01").is_err());
        assert!(iso_to_wire("2025-1-01").is_err());
        assert!(iso_to_wire("2025-02-30").is_err());
    }

    #[test]
    fn wire_dates_accept_both_shapes() {
        assert_eq!(parse_wire_date("04/13/2025").unwrap(), date!(2025 - 04 - 13));
        assert_eq!(parse_wire_date("2025-04-13").unwrap(), date!(2025 - 04 - 13));
        assert_eq!(
            parse_wire_date("2025-04-13T00:00:00Z").unwrap(),
            date!(2025 - 04 - 13)
        );
        assert!(parse_wire_date("13/04/2025").is_err());
    }

    #[test]
    fn formatting_pads_components() {
        assert_eq!(format_wire_date(date!(2020 - 03 - 05)).unwrap(), "03/05/2020");
        assert_eq!(format_iso_date(date!(1925 - 04 - 13)).unwrap(), "1925-04-13");
    }
}
