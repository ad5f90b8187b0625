use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Duration, DurationUnit};

// "90 min", "1 Season", "2 Seasons", "45 minutes"
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<value>\d{1,6})\s*(?P<unit>mins?|minutes?|seasons?)$").unwrap()
});

/// Split duration text into a value and unit. Non-matching text is `None`.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let caps = DURATION_RE.captures(raw.trim())?;
    let value: u32 = caps.name("value")?.as_str().parse().ok()?;
    let unit = if caps.name("unit")?.as_str().to_lowercase().starts_with("season") {
        DurationUnit::Seasons
    } else {
        DurationUnit::Minutes
    };
    Some(Duration { value, unit })
}
