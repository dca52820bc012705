//! Stopwatch display formatting.

/// Minutes, seconds and centiseconds of a duration, each two digits.
///
/// Minutes wrap at 60, like a wall clock face; hours are not shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParts {
    pub min: String,
    pub sec: String,
    pub centis: String,
}

pub fn format_time_parts(ms: u64) -> TimeParts {
    TimeParts {
        min: format!("{:02}", (ms / 60_000) % 60),
        sec: format!("{:02}", (ms / 1_000) % 60),
        centis: format!("{:02}", (ms % 1_000) / 10),
    }
}

/// `MM:SS.CC`
pub fn format_time(ms: u64) -> String {
    let TimeParts { min, sec, centis } = format_time_parts(ms);
    format!("{min}:{sec}.{centis}")
}
