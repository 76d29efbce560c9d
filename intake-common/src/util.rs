//! Utility functions.

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Works on character boundaries, so multi-byte text (emoji, accented names) is safe.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Parse a duration string like "1s", "30s", "5m", "1h" into seconds.
pub fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let Some((idx, unit)) = s.char_indices().last() else {
        return Err("Empty duration string".into());
    };
    let num_str = &s[..idx];
    let num: u64 = num_str.parse().map_err(|_| format!("Invalid number: {num_str}"))?;

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        _ => return Err(format!("Unknown unit: {unit}")),
    };

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("Duration too large: {s}"))
}
