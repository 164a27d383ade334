use chrono::{Local, NaiveDateTime, TimeZone, Timelike, Utc};

/// Layout of the date and time part of a source timestamp
const SOURCE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of normalized timestamps
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a UTC `YYYY-MM-DD HH:MM:SS,mmm` timestamp to local time.
///
/// Anything that does not parse is returned unchanged.
pub fn normalize_timestamp(raw: &str) -> String {
    normalize_timestamp_in(raw, &Local)
}

/// Same as [`normalize_timestamp`], converting into `tz`
pub fn normalize_timestamp_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match parse_utc(raw) {
        Some(naive) => Utc
            .from_utc_datetime(&naive)
            .with_timezone(tz)
            .format(DISPLAY_FORMAT)
            .to_string(),
        None => raw.to_string(),
    }
}

/// Parse the comma-separated fractional form; the fraction is 1 to 6 digits
fn parse_utc(raw: &str) -> Option<NaiveDateTime> {
    let (datetime, fraction) = raw.rsplit_once(',')?;
    if fraction.is_empty() || fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // chrono tolerates padding and signs that the fixed layout does not
    if !has_source_layout(datetime) {
        return None;
    }

    let micros: u32 = format!("{:0<6}", fraction).parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(datetime, SOURCE_FORMAT).ok()?;
    // Leap seconds (`:60`) parse into an out-of-range nanosecond
    if naive.nanosecond() >= 1_000_000_000 {
        return None;
    }
    naive.checked_add_signed(chrono::Duration::microseconds(i64::from(micros)))
}

/// `YYYY-MM-DD HH:MM:SS` with every field zero-padded
fn has_source_layout(datetime: &str) -> bool {
    const LAYOUT: &[u8] = b"dddd-dd-dd dd:dd:dd";

    datetime.len() == LAYOUT.len()
        && datetime.bytes().zip(LAYOUT).all(|(b, &expected)| match expected {
            b'd' => b.is_ascii_digit(),
            sep => b == sep,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_convert_to_fixed_offset() {
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(
            normalize_timestamp_in("2023-05-01 12:00:00,500", &brt),
            "2023-05-01 09:00:00"
        );

        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(
            normalize_timestamp_in("2023-12-31 23:45:10,000", &ist),
            "2024-01-01 05:15:10"
        );

        assert_eq!(
            normalize_timestamp_in("2023-05-01 12:00:00,999999", &Utc),
            "2023-05-01 12:00:00"
        );
    }

    #[test]
    fn test_convert_to_local() {
        let expected = Utc
            .with_ymd_and_hms(2023, 5, 1, 12, 0, 0)
            .unwrap()
            .with_timezone(&Local)
            .format(DISPLAY_FORMAT)
            .to_string();
        assert_eq!(normalize_timestamp("2023-05-01 12:00:00,500"), expected);
    }

    #[test]
    fn test_unrecognized_passes_through() {
        for raw in [
            "not-a-date",
            "",
            "2023-05-01 12:00:00",
            "2023-05-01T12:00:00,500",
            "2023-05-01 12:00:00.500",
            "2023-05-01 12:00:00,",
            "2023-05-01 12:00:00,1234567",
            "2023-13-01 12:00:00,500",
            "2023-05-01 12:00:00,5x0",
            " 2023-05-01 12:00:00,500",
            "+2023-05-01 12:00:00,500",
            "2023-05-01 12:00:60,500",
            "2023-05-01 12:00:00 ,500",
            "2023-5-01 12:00:00,500",
        ] {
            assert_eq!(normalize_timestamp_in(raw, &Utc), raw);
        }
    }
}
