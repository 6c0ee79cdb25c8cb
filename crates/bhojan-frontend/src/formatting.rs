use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Formats how long ago `created_at` was, relative to `now`.
///
/// Within a week this is `Just now`, `Nm ago`, `Nh ago` or `Nd ago`; older
/// records show the date as `Mon D`. Without a usable timestamp the server's
/// own label is used, and without that there is no label at all.
pub fn format_time_ago(
    created_at: Option<DateTime<Utc>>,
    server_label: Option<&str>,
    now: DateTime<Utc>,
) -> Option<String> {
    let Some(created_at) = created_at else {
        return server_label.map(str::to_string);
    };

    // Clock skew can put fresh records slightly in the future.
    let seconds = (now - created_at).num_seconds().max(0);
    let label = match seconds {
        0..MINUTE => "Just now".to_string(),
        MINUTE..HOUR => format!("{}m ago", seconds / MINUTE),
        HOUR..DAY => format!("{}h ago", seconds / HOUR),
        DAY..WEEK => format!("{}d ago", seconds / DAY),
        _ => created_at.format("%b %-d").to_string(),
    };
    Some(label)
}

/// Shortens `body` to at most `max_chars` characters, ending with an
/// ellipsis when anything was cut.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    let body = body.trim();
    if body.chars().count() <= max_chars {
        return body.to_string();
    }

    let kept: String = body.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Text of a count badge. Zero hides the badge; counts above `cap` show as
/// `cap+`.
pub fn format_badge(count: u32, cap: Option<u32>) -> Option<String> {
    match (count, cap) {
        (0, _) => None,
        (count, Some(cap)) if count > cap => Some(format!("{cap}+")),
        (count, _) => Some(count.to_string()),
    }
}
