use chrono::{DateTime, Utc};

/// Format a timestamp as a human-readable "5m ago" style string.
pub fn time_ago(when: DateTime<Utc>) -> String {
    let delta = Utc::now().signed_duration_since(when);
    let secs = delta.num_seconds().max(0);

    if secs >= 86_400 {
        format!("{}d ago", secs / 86_400)
    } else if secs >= 3_600 {
        format!("{}h ago", secs / 3_600)
    } else if secs >= 60 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}s ago", secs)
    }
}

/// Short form of a commit sha for display.
pub fn short_sha(sha: &str) -> &str {
    &sha[..sha.len().min(7)]
}

/// Turn a service name into a safe default alias.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '-' })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}
