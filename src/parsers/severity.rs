use regex::Regex;
use std::sync::LazyLock;

// Stripped in this order, each at most once.
static SEVERITY_PREFIXES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [r"^\[INFO\]\s*", r"^\[ERROR\]\s*", r"^\[WARNING\]\s*"]
        .map(|pattern| Regex::new(pattern).expect("severity prefix regex is valid"))
});

/// Removes leading `[INFO]`, `[ERROR]` and `[WARNING]` markers, checked one
/// after another, so `[INFO] [ERROR] x` becomes `x`.
pub fn strip_severity(text: &str) -> &str {
    SEVERITY_PREFIXES.iter().fold(text, |rest, prefix| match prefix.find(rest) {
        Some(m) => &rest[m.end()..],
        None => rest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_levels() {
        assert_eq!(strip_severity("[INFO] Email: a@b.com"), "Email: a@b.com");
        assert_eq!(strip_severity("[ERROR]boom"), "boom");
        assert_eq!(strip_severity("[WARNING]   slow"), "slow");
    }

    #[test]
    fn stacked_markers_in_level_order() {
        assert_eq!(strip_severity("[INFO] [ERROR] boom"), "boom");
        assert_eq!(strip_severity("[INFO][ERROR] [WARNING] x"), "x");
        // A later level does not re-open an earlier one.
        assert_eq!(strip_severity("[ERROR] [INFO] x"), "[INFO] x");
        assert_eq!(strip_severity("[INFO] [INFO] x"), "[INFO] x");
    }

    #[test]
    fn only_at_start() {
        assert_eq!(strip_severity("note [ERROR] x"), "note [ERROR] x");
        assert_eq!(strip_severity("[DEBUG] x"), "[DEBUG] x");
    }
}
