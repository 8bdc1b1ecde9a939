/// Whole hours between two `HH:MM` strings. Minutes are ignored and an
/// unreadable hour yields zero. The result may be negative when `end` is
/// before `start`.
pub fn compute_duration(start_hour: &str, end_hour: &str) -> i64 {
    match (parse_hour(start_hour), parse_hour(end_hour)) {
        (Some(start), Some(end)) => end - start,
        _ => 0,
    }
}

/// Non-positive durations describe an incomplete schedule and cost nothing.
pub fn compute_total(duration_hours: i64, price_per_hour: i64) -> i64 {
    if duration_hours <= 0 {
        return 0;
    }
    duration_hours * price_per_hour
}

fn parse_hour(s: &str) -> Option<i64> {
    let hour: i64 = s.trim().split(':').next()?.parse().ok()?;
    (0..=23).contains(&hour).then_some(hour)
}
