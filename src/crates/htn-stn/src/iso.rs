//! ISO-8601 parsing and microsecond conversion.
//!
//! Two forms are recognized, matching the planner's external interface:
//!
//! - *Absolute*: `YYYY-MM-DDThh:mm:ss[.ffffff][Z|±hh:mm]`, converted to a
//!   signed count of microseconds since the Unix epoch.
//! - *Duration*: `P[nY][nM][nD][T[nH][nM][nS]]`, converted to a signed
//!   microsecond count. Calendar-relative designators (`Y`, `M`) are
//!   rejected: their length is ambiguous without an anchor date, and the
//!   spec calls this out explicitly as an unsupported case that must
//!   surface as a structured error rather than a guessed 30-day month.

use crate::error::StnError;
use chrono::{DateTime, Utc};

/// Parse an absolute ISO-8601 datetime into microseconds since the Unix
/// epoch (may be negative for dates before 1970).
pub fn to_micros_abs(iso: &str) -> Result<i64, StnError> {
    let dt = DateTime::parse_from_rfc3339(iso)
        .map_err(|e| StnError::MalformedIso(format!("{iso}: {e}")))?;
    let dt: DateTime<Utc> = dt.with_timezone(&Utc);
    dt.timestamp_micros()
        .checked_add(0)
        .ok_or_else(|| StnError::MalformedIso(format!("{iso}: out of range")))
}

/// Inverse of [`to_micros_abs`]: render microseconds since epoch as an
/// RFC3339 `Z`-suffixed datetime.
pub fn from_micros_abs(micros: i64) -> Result<String, StnError> {
    let secs = micros.div_euclid(1_000_000);
    let rem_micros = micros.rem_euclid(1_000_000);
    let nanos = (rem_micros * 1_000) as u32;
    let dt = DateTime::<Utc>::from_timestamp(secs, nanos)
        .ok_or_else(|| StnError::MalformedIso(format!("{micros} µs: out of range")))?;
    Ok(dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
}

/// Parse an ISO-8601 duration (`PnYnMnDTnHnMnS`) into a microsecond count.
/// `Y` and `M` (calendar year/month) designators are rejected.
pub fn to_micros_dur(iso: &str) -> Result<i64, StnError> {
    let rest = iso
        .strip_prefix('P')
        .ok_or_else(|| StnError::MalformedIso(format!("{iso}: duration must start with 'P'")))?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut micros: i64 = 0;
    let mut saw_any = false;

    for (value, designator) in parse_designators(date_part)? {
        saw_any = true;
        match designator {
            'D' => micros += value * 86_400_000_000,
            'Y' | 'M' => {
                return Err(StnError::MalformedIso(format!(
                    "{iso}: calendar designator '{designator}' requires calendar semantics, unsupported"
                )))
            }
            other => {
                return Err(StnError::MalformedIso(format!(
                    "{iso}: unexpected date designator '{other}'"
                )))
            }
        }
    }

    if let Some(time_part) = time_part {
        for (value, designator) in parse_designators(time_part)? {
            saw_any = true;
            match designator {
                'H' => micros += value * 3_600_000_000,
                'M' => micros += value * 60_000_000,
                'S' => micros += value * 1_000_000,
                other => {
                    return Err(StnError::MalformedIso(format!(
                        "{iso}: unexpected time designator '{other}'"
                    )))
                }
            }
        }
    }

    if !saw_any {
        return Err(StnError::MalformedIso(format!(
            "{iso}: duration has no designators"
        )));
    }

    Ok(micros)
}

/// Inverse of [`to_micros_dur`]: render a microsecond count as `PT<seconds>S`
/// (the minimal always-valid rendering; fractional seconds are dropped to
/// whole microsecond precision expressed via decimal seconds).
pub fn from_micros_dur(micros: i64) -> Result<String, StnError> {
    if micros == 0 {
        return Ok("PT0S".to_string());
    }
    let whole_seconds = micros / 1_000_000;
    let frac_micros = (micros % 1_000_000).abs();
    if frac_micros == 0 {
        Ok(format!("PT{whole_seconds}S"))
    } else {
        Ok(format!("PT{whole_seconds}.{frac_micros:06}S"))
    }
}

/// Split a run of `<number><designator>` pairs, e.g. `"2H30M"` →
/// `[(2, 'H'), (30, 'M')]`. Numbers may carry a fractional part for
/// seconds; only the integer portion is kept (microsecond-level durations
/// in this planner are always expressed as whole units below the second).
fn parse_designators(s: &str) -> Result<Vec<(i64, char)>, StnError> {
    let mut out = Vec::new();
    let mut chars = s.char_indices().peekable();
    let mut start = 0usize;
    while let Some((i, c)) = chars.next() {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            continue;
        }
        let number_str = &s[start..i];
        if number_str.is_empty() {
            return Err(StnError::MalformedIso(format!(
                "missing numeric value before designator '{c}'"
            )));
        }
        let value: f64 = number_str
            .parse()
            .map_err(|_| StnError::MalformedIso(format!("invalid numeric value '{number_str}'")))?;
        out.push((value as i64, c));
        start = i + c.len_utf8();
    }
    if start != s.len() {
        return Err(StnError::MalformedIso(format!(
            "trailing characters without designator: '{}'",
            &s[start..]
        )));
    }
    Ok(out)
}
