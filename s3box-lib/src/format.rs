use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

pub const KIBI: u64 = 1024;

pub const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// renders a byte count with 1024 based units, rounded to at most two
/// decimals with trailing zeros dropped. anything past GB stays in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return format!("0 {}", SIZE_UNITS[0]);
    }

    let mut index = 0;
    let mut scale = 1u64;

    while index < SIZE_UNITS.len() - 1 && bytes / scale >= KIBI {
        scale *= KIBI;
        index += 1;
    }

    let value = bytes as f64 / scale as f64;
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[index])
}

/// final path segment of a storage key
pub fn display_name(key: &str) -> &str {
    key.rsplit('/')
        .next()
        .unwrap_or(key)
}

/// formats a listing timestamp in the local timezone
pub fn format_timestamp(value: &str) -> String {
    format_timestamp_in(value, &Local)
}

/// formats a listing timestamp in the given timezone. values without an
/// offset are taken as UTC, values that cannot be parsed are returned as is.
pub fn format_timestamp_in<Tz>(value: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if let Some(parsed) = parse_timestamp(value) {
        parsed.with_timezone(tz)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    } else {
        value.to_owned()
    }
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod test {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn file_sizes() {
        let cases = [
            (0, "0 Bytes"),
            (1, "1 Bytes"),
            (1023, "1023 Bytes"),
            (1024, "1 KB"),
            (1536, "1.5 KB"),
            (1280, "1.25 KB"),
            (1048576, "1 MB"),
            (1073741824, "1 GB"),
            (5 * 1024 * 1073741824, "5120 GB"),
        ];

        for (given, expected) in cases {
            assert_eq!(format_file_size(given), expected, "bytes {}", given);
        }
    }

    #[test]
    fn two_decimal_rounding() {
        // 1234567 / 1048576 = 1.17737...
        assert_eq!(format_file_size(1234567), "1.18 MB");
        // 1023.999 KB rounds up without switching unit
        assert_eq!(format_file_size(1048575), "1024 KB");
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("users/abc/report.pdf"), "report.pdf");
        assert_eq!(display_name("report.pdf"), "report.pdf");
        assert_eq!(display_name("users/abc/"), "");
    }

    #[test]
    fn timestamps() {
        let east = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(
            format_timestamp_in("2024-03-01T10:30:00+00:00", &Utc),
            "2024-03-01 10:30:00"
        );
        assert_eq!(
            format_timestamp_in("2024-03-01T10:30:00+00:00", &east),
            "2024-03-01 12:30:00"
        );
        assert_eq!(
            format_timestamp_in("2024-03-01T10:30:00.123456", &Utc),
            "2024-03-01 10:30:00"
        );
        assert_eq!(format_timestamp_in("yesterday", &Utc), "yesterday");
    }
}
