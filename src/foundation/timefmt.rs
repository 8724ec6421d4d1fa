/// Format a whole number of seconds as a wall clock: `HH:MM:SS` when the
/// value spans at least an hour, `MM:SS` otherwise.
pub fn format_clock(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// Parse a clock string produced by [`format_clock`] back into seconds.
///
/// Accepts `MM:SS` and `HH:MM:SS`. Returns `None` for anything else so
/// callers scanning free-form status text can skip non-clock content.
pub fn parse_clock(text: &str) -> Option<u64> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    let as_u64 = |s: &str| -> Option<u64> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };

    match parts.as_slice() {
        [m, s] => Some(as_u64(m)? * 60 + as_u64(s)?),
        [h, m, s] => Some(as_u64(h)? * 3600 + as_u64(m)? * 60 + as_u64(s)?),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/timefmt.rs"]
mod tests;
