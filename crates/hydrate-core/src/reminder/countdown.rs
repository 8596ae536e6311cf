use chrono::{DateTime, Utc};

/// Display used while reminders are stopped.
pub const INACTIVE_DISPLAY: &str = "--:--";

/// Milliseconds until `next`, clamped at zero.
pub fn remaining_ms(next: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (next - now).num_milliseconds().max(0) as u64
}

/// Format as `MM:SS`, floor-rounded and zero-padded.
///
/// Minutes are not wrapped into hours, so a two-hour interval shows `120:00`.
pub fn format_remaining(remaining_ms: u64) -> String {
    let minutes = remaining_ms / 60_000;
    let seconds = (remaining_ms % 60_000) / 1000;
    format!("{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn formats_zero_padded() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(5_000), "00:05");
        assert_eq!(format_remaining(61_000), "01:01");
        assert_eq!(format_remaining(120 * 60_000), "120:00");
    }

    #[test]
    fn floors_partial_seconds() {
        assert_eq!(format_remaining(59_999), "00:59");
        assert_eq!(format_remaining(999), "00:00");
    }

    #[test]
    fn remaining_never_negative() {
        let now = Utc::now();
        assert_eq!(remaining_ms(now - TimeDelta::seconds(3), now), 0);
        assert_eq!(remaining_ms(now + TimeDelta::seconds(3), now), 3_000);
    }
}
