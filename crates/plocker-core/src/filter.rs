//! Case-insensitive plugin name filter used by the settings panel.

/// Normalizes raw search input: trimmed and lowercased.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Keeps the items whose name contains `query` case-insensitively,
/// preserving input order. An empty (or all-whitespace) query keeps everything.
pub fn filter_by_name<'a, T, F>(items: &'a [T], query: &str, name: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let needle = normalize_query(query);
    items
        .iter()
        .filter(|item| needle.is_empty() || name(*item).to_lowercase().contains(&needle))
        .collect()
}
