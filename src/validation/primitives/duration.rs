//! Wire durations and timestamps.
//!
//! A wire duration (`{seconds, nanos}`) is decoded into a signed
//! [`chrono::TimeDelta`] before any range or precision check.

use chrono::TimeDelta;
use prost_types::{Duration, Timestamp};

use crate::validation::report::{ErrorCollector, Outcome, Violation};

/// Largest magnitude of `Duration::seconds` (about 10,000 years).
const MAX_DURATION_SECONDS: i64 = 315_576_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i32 = 1_000_000;

/// 0001-01-01T00:00:00Z
const MIN_TIMESTAMP_SECONDS: i64 = -62_135_596_800;
/// 10000-01-01T00:00:00Z
const MAX_TIMESTAMP_SECONDS: i64 = 253_402_300_800;

fn discovery_refresh_delay_bounds() -> (TimeDelta, TimeDelta) {
    (TimeDelta::seconds(1), TimeDelta::minutes(10))
}

fn connect_timeout_bounds() -> (TimeDelta, TimeDelta) {
    (TimeDelta::milliseconds(1), TimeDelta::seconds(30))
}

fn drain_time_max() -> TimeDelta {
    TimeDelta::hours(1)
}

fn parent_shutdown_time_max() -> TimeDelta {
    TimeDelta::hours(1)
}

fn describe(duration: &Duration) -> String {
    format!("seconds:{} nanos:{}", duration.seconds, duration.nanos)
}

/// Decode a wire duration into a signed span.
///
/// Rejects out-of-range seconds or nanos, mixed signs, and spans that do not
/// fit in 64-bit nanoseconds.
pub fn decode_duration(duration: &Duration) -> Result<TimeDelta, Violation> {
    let Duration { seconds, nanos } = *duration;
    if !(-MAX_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&seconds) {
        return Err(Violation::range(format!(
            "duration: {}: seconds out of range",
            describe(duration)
        )));
    }
    if i64::from(nanos).abs() >= NANOS_PER_SECOND {
        return Err(Violation::range(format!(
            "duration: {}: nanos out of range",
            describe(duration)
        )));
    }
    if (seconds < 0 && nanos > 0) || (seconds > 0 && nanos < 0) {
        return Err(Violation::format(format!(
            "duration: {}: seconds and nanos have different signs",
            describe(duration)
        )));
    }
    seconds
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|total| total.checked_add(i64::from(nanos)))
        .map(TimeDelta::nanoseconds)
        .ok_or_else(|| {
            Violation::range(format!(
                "duration: {} is out of range for a 64-bit span",
                describe(duration)
            ))
        })
}

/// Render a span the way humans read durations: `1h0m0s`, `10m0s`, `1.5s`,
/// `250ms`, `1.5µs`, `0s`.
pub fn format_span(span: TimeDelta) -> String {
    let Some(nanos) = span.num_nanoseconds() else {
        return format!("{}s", span.num_seconds());
    };
    if nanos == 0 {
        return "0s".to_string();
    }

    let sign = if nanos < 0 { "-" } else { "" };
    let magnitude = nanos.unsigned_abs();
    let body = if magnitude < 1_000 {
        format!("{}ns", magnitude)
    } else if magnitude < 1_000_000 {
        format!("{}µs", fractional(magnitude, 1_000, 3))
    } else if magnitude < 1_000_000_000 {
        format!("{}ms", fractional(magnitude, 1_000_000, 6))
    } else {
        let seconds = magnitude / 1_000_000_000;
        let (hours, minutes) = (seconds / 3600, (seconds % 3600) / 60);
        let seconds_part = fractional(magnitude % 60_000_000_000, 1_000_000_000, 9);
        if hours > 0 {
            format!("{}h{}m{}s", hours, minutes, seconds_part)
        } else if minutes > 0 {
            format!("{}m{}s", minutes, seconds_part)
        } else {
            format!("{}s", seconds_part)
        }
    };
    format!("{}{}", sign, body)
}

fn fractional(value: u64, unit: u64, digits: usize) -> String {
    let (whole, remainder) = (value / unit, value % unit);
    if remainder == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", remainder, width = digits);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Validate a duration: decodable, at least 1ms, and a whole number of
/// milliseconds.
pub fn validate_duration(duration: &Duration) -> Outcome {
    let span = decode_duration(duration)?;
    if span < TimeDelta::milliseconds(1) {
        return Violation::range("duration must be greater than 1ms").fail();
    }
    if span.subsec_nanos() % NANOS_PER_MILLI != 0 {
        return Violation::format("only durations to ms precision are supported").fail();
    }
    Ok(())
}

/// Validate a duration that must be present.
pub fn validate_required_duration(duration: Option<&Duration>) -> Outcome {
    match duration {
        Some(duration) => validate_duration(duration),
        None => Violation::required("duration must be set").fail(),
    }
}

/// Validate that `span` lies within `[min, max]`.
pub fn validate_duration_range(span: TimeDelta, min: TimeDelta, max: TimeDelta) -> Outcome {
    if span > max || span < min {
        return Violation::range(format!(
            "time {} must be >{} and <{}",
            format_span(span),
            format_span(min),
            format_span(max)
        ))
        .fail();
    }
    Ok(())
}

fn validate_bounded_duration(duration: Option<&Duration>, bounds: (TimeDelta, TimeDelta)) -> Outcome {
    validate_required_duration(duration)?;
    match duration.map(decode_duration) {
        Some(Ok(span)) => validate_duration_range(span, bounds.0, bounds.1),
        _ => Ok(()),
    }
}

/// Validate a discovery refresh delay: a valid duration within `[1s, 10m]`.
pub fn validate_refresh_delay(refresh: Option<&Duration>) -> Outcome {
    validate_bounded_duration(refresh, discovery_refresh_delay_bounds())
}

/// Validate an upstream connect timeout: a valid duration within `[1ms, 30s]`.
pub fn validate_connect_timeout(timeout: Option<&Duration>) -> Outcome {
    validate_bounded_duration(timeout, connect_timeout_bounds())
}

/// Validate the drain and parent shutdown pair.
///
/// Both must be valid durations in whole seconds, at most one hour, and the
/// parent shutdown must strictly exceed the drain.
pub fn validate_parent_and_drain(
    drain_time: Option<&Duration>,
    parent_shutdown: Option<&Duration>,
) -> Outcome {
    let mut errors = ErrorCollector::new();
    errors.check_with_prefix("invalid drain duration:", validate_required_duration(drain_time));
    errors.check_with_prefix(
        "invalid parent shutdown duration:",
        validate_required_duration(parent_shutdown),
    );
    if !errors.is_empty() {
        return errors.finish();
    }

    let (Some(Ok(drain)), Some(Ok(parent))) = (
        drain_time.map(decode_duration),
        parent_shutdown.map(decode_duration),
    ) else {
        return errors.finish();
    };

    if drain.subsec_nanos() != 0 {
        errors.push(Violation::format(
            "drain time only supports durations to seconds precision",
        ));
    }
    if parent.subsec_nanos() != 0 {
        errors.push(Violation::format(
            "parent shutdown time only supports durations to seconds precision",
        ));
    }
    if parent <= drain {
        errors.push(Violation::cross_field(format!(
            "parent shutdown time {} must be greater than drain time {}",
            format_span(parent),
            format_span(drain)
        )));
    }
    if drain > drain_time_max() {
        errors.push(Violation::range(format!(
            "drain time {} must be <{}",
            format_span(drain),
            format_span(drain_time_max())
        )));
    }
    if parent > parent_shutdown_time_max() {
        errors.push(Violation::range(format!(
            "parent shutdown time {} must be <{}",
            format_span(parent),
            format_span(parent_shutdown_time_max())
        )));
    }
    errors.finish()
}

/// Validate a timestamp: 0001-01-01 inclusive to 10000-01-01 exclusive, with
/// nanos in `[0, 1e9)`.
pub fn validate_timestamp(timestamp: &Timestamp) -> Outcome {
    let shown = || format!("seconds:{} nanos:{}", timestamp.seconds, timestamp.nanos);
    if timestamp.seconds < MIN_TIMESTAMP_SECONDS {
        return Violation::range(format!("timestamp: {} before 0001-01-01", shown())).fail();
    }
    if timestamp.seconds >= MAX_TIMESTAMP_SECONDS {
        return Violation::range(format!("timestamp: {} after 10000-01-01", shown())).fail();
    }
    if !(0..NANOS_PER_SECOND).contains(&i64::from(timestamp.nanos)) {
        return Violation::range(format!(
            "timestamp: {}: nanos not in range [0, 1e9)",
            shown()
        ))
        .fail();
    }
    Ok(())
}
