pub(crate) fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Memory keys are matched case-insensitively with whitespace collapsed.
pub(crate) fn normalize_key(key: &str) -> String {
    one_line(key).to_lowercase()
}

pub(crate) fn trim_mid(s: &str, max_chars: usize) -> String {
    let t = one_line(s);
    if t.chars().count() <= max_chars {
        return t;
    }
    let head: String = t.chars().take(max_chars.saturating_sub(2)).collect();
    format!("{head}..")
}
