//! Utility functions for worktree command

use anyhow::Result;
use std::time::Duration;

/// Parse duration string (e.g., "1ms", "5s", "10m", "2h", "7d")
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// let duration = parse_duration("1h").unwrap();
/// assert_eq!(duration, Duration::from_secs(3600));
///
/// let duration = parse_duration("24h").unwrap();
/// assert_eq!(duration, Duration::from_secs(86400));
///
/// let duration = parse_duration("7d").unwrap();
/// assert_eq!(duration, Duration::from_secs(604800));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    let (num_str, unit) = if s.ends_with("ms") {
        (&s[..s.len() - 2], "ms")
    } else if s.ends_with('s') {
        (&s[..s.len() - 1], "s")
    } else if s.ends_with('m') {
        (&s[..s.len() - 1], "m")
    } else if s.ends_with('h') {
        (&s[..s.len() - 1], "h")
    } else if s.ends_with('d') {
        (&s[..s.len() - 1], "d")
    } else {
        return Err(anyhow::anyhow!(
            "Invalid duration format. Use format like '1h', '24h', '7d'"
        ));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid number in duration"))?;

    Ok(match unit {
        "ms" => Duration::from_millis(num),
        "s" => Duration::from_secs(num),
        "m" => Duration::from_secs(num * 60),
        "h" => Duration::from_secs(num * 3600),
        "d" => Duration::from_secs(num * 86400),
        _ => unreachable!(),
    })
}
