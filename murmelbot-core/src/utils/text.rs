/// `1 message`, `2 messages`.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Truncates at a character boundary, appending `…` when anything was cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// `a`, `a and b`, `a, b and c`.
pub fn join_natural(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_naturally() {
        assert_eq!(join_natural(&[]), "");
        assert_eq!(join_natural(&["a".into()]), "a");
        assert_eq!(join_natural(&["a".into(), "b".into()]), "a and b");
        assert_eq!(
            join_natural(&["a".into(), "b".into(), "c".into()]),
            "a, b and c"
        );
    }

    #[test]
    fn pluralizes() {
        assert_eq!(pluralize(1, "message"), "1 message");
        assert_eq!(pluralize(3, "message"), "3 messages");
        assert_eq!(pluralize(0, "message"), "0 messages");
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer text", 9), "a longer…");
    }
}
