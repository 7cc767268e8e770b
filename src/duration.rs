//! Widget change frequency: parsing and the two renderings

use crate::constants::{MSG_BAD_DURATION, MSG_DURATION_TOO_SHORT};

const DAY: u64 = 86_400;

/// Parse `[DD ][HH:[MM:]]ss[.uuuuuu]` into whole seconds (fractions truncated)
pub fn parse(raw: &str) -> std::result::Result<u64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MSG_BAD_DURATION);
    }
    let (days, clock) = match raw.split_once(' ') {
        Some((d, rest)) => (d.trim().parse::<u64>().map_err(|_| MSG_BAD_DURATION)?, rest.trim()),
        None => (0, raw),
    };
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() > 3 {
        return Err(MSG_BAD_DURATION);
    }
    let seconds_part = parts[parts.len() - 1];
    let whole = seconds_part.split('.').next().unwrap_or("");
    let seconds = number(whole)?;
    let minutes = if parts.len() >= 2 { number(parts[parts.len() - 2])? } else { 0 };
    let hours = if parts.len() == 3 { number(parts[0])? } else { 0 };
    if parts.len() > 1 && (seconds >= 60 || minutes >= 60) {
        return Err(MSG_BAD_DURATION);
    }
    let total = days
        .checked_mul(DAY)
        .and_then(|t| t.checked_add(hours.checked_mul(3600)?))
        .and_then(|t| t.checked_add(minutes.checked_mul(60)?))
        .and_then(|t| t.checked_add(seconds))
        .ok_or(MSG_BAD_DURATION)?;
    if total == 0 {
        return Err(MSG_DURATION_TOO_SHORT);
    }
    Ok(total)
}

fn number(s: &str) -> std::result::Result<u64, &'static str> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MSG_BAD_DURATION);
    }
    s.parse().map_err(|_| MSG_BAD_DURATION)
}

/// Structured rendering: `HH:MM:SS`, prefixed `D ` from one day up
pub fn to_api(secs: u64) -> String {
    let (days, rest) = (secs / DAY, secs % DAY);
    let clock = format!("{:02}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    if days > 0 {
        format!("{} {}", days, clock)
    } else {
        clock
    }
}

/// Tabular rendering: `H:MM:SS`, prefixed `N day(s), ` from one day up
pub fn to_tabular(secs: u64) -> String {
    let (days, rest) = (secs / DAY, secs % DAY);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clock_forms() {
        assert_eq!(parse("00:01:00"), Ok(60));
        assert_eq!(parse("00:02:00"), Ok(120));
        assert_eq!(parse("1:30"), Ok(90));
        assert_eq!(parse("45"), Ok(45));
        assert_eq!(parse("2 00:00:01"), Ok(2 * DAY + 1));
        assert_eq!(parse("00:00:05.250000"), Ok(5));
    }

    #[test]
    fn rejects_garbage_and_zero() {
        assert_eq!(parse("soon"), Err(MSG_BAD_DURATION));
        assert_eq!(parse("00:61:00"), Err(MSG_BAD_DURATION));
        assert_eq!(parse("1:2:3:4"), Err(MSG_BAD_DURATION));
        assert_eq!(parse(""), Err(MSG_BAD_DURATION));
        assert_eq!(parse("00:00:00"), Err(MSG_DURATION_TOO_SHORT));
    }

    #[test]
    fn huge_values_are_rejected_not_wrapped() {
        assert_eq!(parse("999999999999999999 00:00:01"), Err(MSG_BAD_DURATION));
        assert_eq!(parse("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(parse("18446744073709551615:00"), Err(MSG_BAD_DURATION));
    }

    #[test]
    fn renders_both_forms() {
        assert_eq!(to_api(60), "00:01:00");
        assert_eq!(to_tabular(60), "0:01:00");
        assert_eq!(to_api(DAY + 3661), "1 01:01:01");
        assert_eq!(to_tabular(DAY + 3661), "1 day, 1:01:01");
        assert_eq!(to_tabular(3 * DAY), "3 days, 0:00:00");
    }
}
