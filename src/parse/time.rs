/// Minutes in a day; display times wrap at this boundary
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse `HH:MM` into minutes since midnight.
pub fn time_to_minutes(time: &str) -> Option<u32> {
    let (h, m) = time.trim().split_once(':')?;
    let hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Format minutes as `HH:MM`. Hours wrap modulo 24, so a slot past midnight
/// (1500) renders as `01:00`.
pub fn minutes_to_time(minutes: u32) -> String {
    let hours = (minutes / 60) % 24;
    format!("{:02}:{:02}", hours, minutes % 60)
}

/// End time of an event starting at `start` and lasting `duration` minutes.
pub fn end_time(start: &str, duration: u32) -> Option<String> {
    time_to_minutes(start).map(|m| minutes_to_time(m.saturating_add(duration)))
}
