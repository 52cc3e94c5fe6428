//! Date/time and time span literals.
//!
//! Accepted dates are `yyyy-mm-dd`, `yyyy/mm/dd`, `m/d/yyyy` and `m-d-yyyy`,
//! optionally followed by a time after `T` or one space, and a zone: `Z`,
//! `GMT` or a numeric offset. A date without a zone is anchored at the
//! parse-time local offset, or at UTC when written with `utc:`.

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone};

use super::{Scan, at_boundary};
use crate::{
    reader::CharReader,
    value::{DateTimeKind, DateTimeValue, Value},
};

const NANOS_DIGITS: usize = 9;

/// Decides whether a digit run at the cursor commits to a date.
///
/// Four digits and a separator followed by a digit always commit. One or two
/// digits commit only when the whole `m/d/yyyy` shape is present, so runs
/// like `1-1` stay available as bare words.
pub(crate) fn date_ahead(reader: &CharReader) -> bool {
    let lead = reader.count_ahead(|c| c.is_ascii_digit());
    let sep = reader.peek_ahead(lead);
    if !matches!(sep, Some('-' | '/')) {
        return false;
    }
    let digit_at = |i: usize| reader.peek_ahead(i).is_some_and(|c| c.is_ascii_digit());

    match lead {
        4 => digit_at(lead + 1),
        1 | 2 => {
            let mut i = lead + 1;
            let day = (i..i + 3).take_while(|&j| digit_at(j)).count();
            if !(1..=2).contains(&day) {
                return false;
            }
            i += day;
            if reader.peek_ahead(i) != sep {
                return false;
            }
            (i + 1..=i + 4).all(digit_at) && !digit_at(i + 5)
        }
        _ => false,
    }
}

/// True when the cursor sits on digits followed by `:`.
pub(crate) fn timespan_ahead(reader: &CharReader) -> bool {
    let sign = usize::from(matches!(reader.peek(), Some('-' | '+')));
    let digits = (sign..)
        .take_while(|&i| reader.peek_ahead(i).is_some_and(|c| c.is_ascii_digit()))
        .count();
    digits > 0 && reader.peek_ahead(sign + digits) == Some(':')
}

fn read_digits(reader: &mut CharReader, min: usize, max: usize, start: usize, what: &str) -> Scan<u32> {
    let digits = reader.read_while_n(max, |c| c.is_ascii_digit());
    if digits.len() < min {
        return Err(format!(
            "invalid date/time {}: expecting {}",
            reader.slice_from(start),
            what
        ));
    }
    digits
        .parse::<u32>()
        .map_err(|e| format!("invalid date/time {}: {}", reader.slice_from(start), e))
}

fn expect(reader: &mut CharReader, ch: char, start: usize) -> Scan<()> {
    match reader.read_if(|c| c == ch) {
        Some(_) => Ok(()),
        None => Err(format!(
            "invalid date/time {}: expecting {}",
            reader.slice_from(start),
            ch
        )),
    }
}

/// Fractional seconds as nanoseconds, from 1 to 9 digits.
fn read_fraction(reader: &mut CharReader, start: usize) -> Scan<u32> {
    let digits = reader.read_while(|c| c.is_ascii_digit());
    if digits.is_empty() {
        return Err(format!(
            "invalid date/time {}: expecting fractional digits",
            reader.slice_from(start)
        ));
    }
    let kept: String = digits.chars().take(NANOS_DIGITS).collect();
    let scale = 10u32.pow((NANOS_DIGITS - kept.len()) as u32);
    kept.parse::<u32>()
        .map(|n| n * scale)
        .map_err(|e| format!("invalid date/time {}: {}", reader.slice_from(start), e))
}

fn read_date(reader: &mut CharReader, start: usize) -> Scan<NaiveDate> {
    let first = reader.read_while(|c| c.is_ascii_digit());
    let sep = reader
        .read_if(|c| c == '-' || c == '/')
        .ok_or_else(|| format!("invalid date {}: expecting - or /", reader.slice_from(start)))?;

    let (year, month, day) = match first.len() {
        4 => {
            let month = read_digits(reader, 1, 2, start, "month")?;
            expect(reader, sep, start)?;
            let day = read_digits(reader, 1, 2, start, "day")?;
            (first.parse::<i32>().unwrap_or_default(), month, day)
        }
        1 | 2 => {
            let day = read_digits(reader, 1, 2, start, "day")?;
            expect(reader, sep, start)?;
            let year = read_digits(reader, 4, 4, start, "four-digit year")?;
            (year as i32, first.parse::<u32>().unwrap_or_default(), day)
        }
        _ => {
            return Err(format!(
                "invalid date {}: expecting year-month-day or month/day/year",
                reader.slice_from(start)
            ));
        }
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        format!(
            "invalid date {}: no such day {:04}-{:02}-{:02}",
            reader.slice_from(start),
            year,
            month,
            day
        )
    })
}

/// `HH:MM[:SS[.fffffff]]`
fn read_clock(reader: &mut CharReader, start: usize) -> Scan<NaiveTime> {
    let hour = read_digits(reader, 1, 2, start, "hour")?;
    expect(reader, ':', start)?;
    let minute = read_digits(reader, 2, 2, start, "two-digit minute")?;
    let mut second = 0;
    let mut nanos = 0;
    if reader.read_if(|c| c == ':').is_some() {
        second = read_digits(reader, 2, 2, start, "two-digit second")?;
        if reader.peek() == Some('.') && reader.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            reader.read();
            nanos = read_fraction(reader, start)?;
        }
    }
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).ok_or_else(|| {
        format!(
            "invalid time {}: out of range",
            reader.slice_from(start)
        )
    })
}

fn gmt_ahead(reader: &CharReader, skip: usize) -> bool {
    let word: String = (skip..skip + 3).filter_map(|i| reader.peek_ahead(i)).collect();
    word.eq_ignore_ascii_case("gmt")
}

/// Explicit zone after the time, if any.
fn read_zone(reader: &mut CharReader, start: usize) -> Scan<Option<FixedOffset>> {
    let utc = FixedOffset::east_opt(0);
    match reader.peek() {
        Some('Z' | 'z') => {
            reader.read();
            Ok(utc)
        }
        Some('G' | 'g') if gmt_ahead(reader, 0) => {
            reader.read_while_n(3, |c| c.is_ascii_alphabetic());
            Ok(utc)
        }
        Some(' ') if gmt_ahead(reader, 1) => {
            reader.read();
            reader.read_while_n(3, |c| c.is_ascii_alphabetic());
            Ok(utc)
        }
        Some(sign @ ('+' | '-')) if reader.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => {
            reader.read();
            let hours = read_digits(reader, 2, 2, start, "two-digit offset hours")?;
            reader.read_if(|c| c == ':');
            let minutes = match reader.peek() {
                Some(c) if c.is_ascii_digit() => read_digits(reader, 2, 2, start, "two-digit offset minutes")?,
                _ => 0,
            };
            let seconds = (hours * 3600 + minutes * 60) as i32;
            let seconds = if sign == '-' { -seconds } else { seconds };
            FixedOffset::east_opt(seconds)
                .map(Some)
                .ok_or_else(|| format!("invalid offset in {}", reader.slice_from(start)))
        }
        _ => Ok(None),
    }
}

/// A time part is present after `T`, or after one space when digits and `:` follow.
fn time_follows(reader: &CharReader) -> bool {
    match reader.peek() {
        Some('T' | 't') => true,
        Some(' ') => {
            let digits = (1..=2)
                .take_while(|&i| reader.peek_ahead(i).is_some_and(|c| c.is_ascii_digit()))
                .count();
            digits > 0 && reader.peek_ahead(1 + digits) == Some(':')
        }
        _ => false,
    }
}

/// Scans a date/time literal and resolves it to an instant.
pub(crate) fn scan_datetime(
    reader: &mut CharReader,
    kind: DateTimeKind,
    local: FixedOffset,
) -> Scan<Value> {
    let start = reader.position();
    let date = read_date(reader, start)?;

    let mut time = NaiveTime::MIN;
    let mut zone = None;
    if time_follows(reader) {
        reader.read();
        time = read_clock(reader, start)?;
        zone = read_zone(reader, start)?;
    } else if matches!(reader.peek(), Some('Z' | 'z')) {
        zone = read_zone(reader, start)?;
    }

    if !at_boundary(reader) {
        let next = reader.peek().unwrap_or_default();
        reader.read();
        return Err(format!(
            "invalid date/time {}: unexpected '{}'",
            reader.slice_from(start),
            next
        ));
    }

    let utc = FixedOffset::east_opt(0).unwrap_or(local);
    let anchor = zone.unwrap_or(match kind {
        DateTimeKind::Local => local,
        DateTimeKind::Utc => utc,
    });
    let instant = anchor
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| format!("invalid date/time {}: not representable", reader.slice_from(start)))?;

    let display = match kind {
        DateTimeKind::Local => local,
        DateTimeKind::Utc => utc,
    };
    Ok(Value::DateTime(DateTimeValue::new(
        instant.with_timezone(&display),
        kind,
    )))
}

/// `[-]H+:MM:SS[.fffffff]`
pub(crate) fn scan_timespan(reader: &mut CharReader) -> Scan<Value> {
    let start = reader.position();
    let negative = match reader.peek() {
        Some('-') => {
            reader.read();
            true
        }
        Some('+') => {
            reader.read();
            false
        }
        _ => false,
    };
    let hours = reader.read_while_n(9, |c| c.is_ascii_digit());
    if hours.is_empty() {
        return Err(format!(
            "invalid time span {}: expecting hours",
            reader.slice_from(start)
        ));
    }
    let span_error = |reader: &CharReader, what: &str| {
        format!("invalid time span {}: expecting {}", reader.slice_from(start), what)
    };
    if reader.read_if(|c| c == ':').is_none() {
        return Err(span_error(reader, ":"));
    }
    let minutes = reader.read_while_n(2, |c| c.is_ascii_digit());
    if minutes.len() != 2 {
        return Err(span_error(reader, "two-digit minutes"));
    }
    if reader.read_if(|c| c == ':').is_none() {
        return Err(span_error(reader, ":SS"));
    }
    let seconds = reader.read_while_n(2, |c| c.is_ascii_digit());
    if seconds.len() != 2 {
        return Err(span_error(reader, "two-digit seconds"));
    }
    let mut nanos = 0;
    if reader.peek() == Some('.') && reader.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
        reader.read();
        nanos = read_fraction(reader, start)?;
    }
    if !at_boundary(reader) {
        return Err(span_error(reader, "end of time span"));
    }

    let hours: i64 = hours.parse().map_err(|_| span_error(reader, "hours"))?;
    let minutes: i64 = minutes.parse().map_err(|_| span_error(reader, "minutes"))?;
    let seconds: i64 = seconds.parse().map_err(|_| span_error(reader, "seconds"))?;
    if minutes > 59 || seconds > 59 {
        return Err(format!(
            "invalid time span {}: minutes and seconds must be below 60",
            reader.slice_from(start)
        ));
    }

    let span = TimeDelta::try_seconds(hours * 3600 + minutes * 60 + seconds)
        .map(|d| d + TimeDelta::nanoseconds(i64::from(nanos)))
        .ok_or_else(|| format!("invalid time span {}: out of range", reader.slice_from(start)))?;
    Ok(Value::TimeSpan(if negative { -span } else { span }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn datetime(input: &str) -> DateTimeValue {
        let mut reader = CharReader::new(input);
        match scan_datetime(&mut reader, DateTimeKind::Local, utc()).unwrap() {
            Value::DateTime(dt) => dt,
            other => panic!("expected datetime, got {:?}", other),
        }
    }

    #[test]
    fn test_date_commit_rules() {
        assert!(date_ahead(&CharReader::new("2000-01-02")));
        assert!(date_ahead(&CharReader::new("2000-1")));
        assert!(date_ahead(&CharReader::new("1/2/2000")));
        assert!(!date_ahead(&CharReader::new("1-1")));
        assert!(!date_ahead(&CharReader::new("12-31-20")));
        assert!(!date_ahead(&CharReader::new("123-4")));
    }

    #[test]
    fn test_equivalent_forms() {
        let a = datetime("2000-01-02");
        let b = datetime("1/2/2000");
        let c = datetime("2000/01/02T00:00:00Z");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.instant.year(), 2000);
    }

    #[test]
    fn test_offsets_normalize() {
        let a = datetime("2000-01-01T05:00:00Z");
        let b = datetime("2000-01-01 00:00:00-05:00");
        let c = datetime("01-01-2000 06:00 GMT");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(c.instant.hour(), 6);
    }

    #[test]
    fn test_fraction() {
        let a = datetime("2000-01-01T00:00:00.25");
        assert_eq!(a.instant.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_invalid_dates() {
        let mut reader = CharReader::new("2000-13-01");
        let err = scan_datetime(&mut reader, DateTimeKind::Local, utc()).unwrap_err();
        assert!(err.contains("no such day"));
        let mut reader = CharReader::new("2000-01");
        assert!(scan_datetime(&mut reader, DateTimeKind::Local, utc()).is_err());
    }

    #[test]
    fn test_timespan() {
        let mut reader = CharReader::new("12:30:15");
        assert_eq!(
            scan_timespan(&mut reader).unwrap(),
            Value::TimeSpan(TimeDelta::seconds(12 * 3600 + 30 * 60 + 15))
        );
        assert!(scan_timespan(&mut CharReader::new("12:30")).is_err());
        assert!(scan_timespan(&mut CharReader::new("12:75:00")).is_err());
        assert!(timespan_ahead(&CharReader::new("-1:00:00")));
    }
}
