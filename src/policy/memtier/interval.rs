//! Time intervals with a human readable wire format
//!
//! Intervals travel as quoted duration strings ("500ms", "1h30m0s") rather
//! than raw nanosecond counts. The codec itself is plain `Display`/`FromStr`;
//! the serde impls only forward to it.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Write};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Duration text that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed interval {raw:?}: {reason}")]
pub struct MalformedInterval {
    raw: String,
    reason: &'static str,
}

impl MalformedInterval {
    fn new(raw: &str, reason: &'static str) -> Self {
        Self {
            raw: raw.to_string(),
            reason,
        }
    }

    /// The offending text, exactly as received
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn reason(&self) -> &str {
        self.reason
    }
}

/// A signed span of time with nanosecond resolution.
///
/// Zero (or anything negative) means the feature driven by the interval is
/// disabled, not that it should fire continuously. Use [`Interval::as_std`]
/// or [`Interval::is_disabled`] instead of comparing against zero by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(i64);

impl Interval {
    pub const DISABLED: Interval = Interval(0);

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(MILLISECOND as i64))
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(SECOND as i64))
    }

    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    pub const fn is_disabled(&self) -> bool {
        self.0 <= 0
    }

    /// Timer period to use, or `None` when disabled
    pub fn as_std(&self) -> Option<Duration> {
        if self.is_disabled() {
            None
        } else {
            Some(Duration::from_nanos(self.0 as u64))
        }
    }

    /// Encode as a quoted duration string, e.g. `"1h30m0s"`
    pub fn to_quoted(&self) -> String {
        format!("\"{}\"", self)
    }

    /// Decode a quoted duration string, e.g. `"1h30m"`
    pub fn from_quoted(text: &str) -> Result<Self, MalformedInterval> {
        if text.len() < 2 {
            return Err(MalformedInterval::new(
                text,
                "too short to hold a quoted duration",
            ));
        }
        let inner = text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .ok_or_else(|| MalformedInterval::new(text, "duration must be a quoted string"))?;

        parse_nanos(inner)
            .map(Self)
            .map_err(|reason| MalformedInterval::new(text, reason))
    }

    /// Decode `text` into `self`. On error `self` keeps its previous value.
    pub fn set_from_quoted(&mut self, text: &str) -> Result<(), MalformedInterval> {
        *self = Self::from_quoted(text)?;
        Ok(())
    }
}

impl From<Duration> for Interval {
    /// Saturates at the largest representable interval
    fn from(duration: Duration) -> Self {
        Self(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }

        let mut out = String::new();
        if self.0 < 0 {
            out.push('-');
        }

        let nanos = self.0.unsigned_abs();
        if nanos < SECOND {
            let (scale, unit) = match nanos {
                n if n < MICROSECOND => (NANOSECOND, "ns"),
                n if n < MILLISECOND => (MICROSECOND, "µs"),
                _ => (MILLISECOND, "ms"),
            };
            push_scaled(&mut out, nanos, scale)?;
            out.push_str(unit);
        } else {
            let hours = nanos / HOUR;
            let minutes = nanos % HOUR / MINUTE;
            if hours > 0 {
                write!(out, "{}h", hours)?;
            }
            if hours > 0 || minutes > 0 {
                write!(out, "{}m", minutes)?;
            }
            push_scaled(&mut out, nanos % MINUTE, SECOND)?;
            out.push('s');
        }

        f.write_str(&out)
    }
}

/// Write `value / scale` with the fractional part trimmed of trailing zeros
fn push_scaled(out: &mut String, value: u64, scale: u64) -> fmt::Result {
    write!(out, "{}", value / scale)?;
    let fraction = value % scale;
    if fraction > 0 {
        let width = scale.ilog10() as usize;
        let digits = format!("{:0width$}", fraction, width = width);
        write!(out, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

impl FromStr for Interval {
    type Err = MalformedInterval;

    /// Parse unquoted duration text such as `1h30m`, `-1.5s` or `250us`
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_nanos(text)
            .map(Self)
            .map_err(|reason| MalformedInterval::new(text, reason))
    }
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

fn split_digits(text: &str) -> (&str, &str) {
    let end = text
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(text.len());
    text.split_at(end)
}

/// Grammar: `[-+]? (<digits>[.<digits>]<unit>)+`, or a bare `0`
fn parse_nanos(text: &str) -> Result<i64, &'static str> {
    const OUT_OF_RANGE: &str = "duration out of range";

    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        return Err("empty duration");
    }

    let limit = if negative {
        i64::MAX as u64 + 1
    } else {
        i64::MAX as u64
    };
    let mut total: u64 = 0;

    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        rest = after;
        let int_part = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().map_err(|_| OUT_OF_RANGE)?
        };

        // Digits past u64 precision are consumed but ignored.
        let mut fraction: u64 = 0;
        let mut scale: u64 = 1;
        let mut has_fraction = false;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, after) = split_digits(after_dot);
            rest = after;
            has_fraction = !digits.is_empty();
            for digit in digits.bytes() {
                let next = fraction
                    .checked_mul(10)
                    .and_then(|f| f.checked_add(u64::from(digit - b'0')))
                    .zip(scale.checked_mul(10));
                match next {
                    Some((f, s)) => {
                        fraction = f;
                        scale = s;
                    }
                    None => break,
                }
            }
        }
        if whole.is_empty() && !has_fraction {
            return Err("expected a number");
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after) = rest.split_at(unit_end);
        rest = after;
        if unit.is_empty() {
            return Err("missing unit");
        }
        let unit = unit_nanos(unit).ok_or("unknown unit")?;

        let mut value = int_part.checked_mul(unit).ok_or(OUT_OF_RANGE)?;
        if fraction > 0 {
            let partial = fraction as f64 * (unit as f64 / scale as f64);
            value = value.checked_add(partial as u64).ok_or(OUT_OF_RANGE)?;
        }
        total = total.checked_add(value).ok_or(OUT_OF_RANGE)?;
        if total > limit {
            return Err(OUT_OF_RANGE);
        }
    }

    if negative {
        Ok((total as i64).wrapping_neg())
    } else {
        Ok(total as i64)
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(IntervalVisitor)
    }
}

struct IntervalVisitor;

impl<'de> Visitor<'de> for IntervalVisitor {
    type Value = Interval;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration string such as \"500ms\" or \"1h30m\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Interval, E> {
        value.parse().map_err(E::custom)
    }
}
