//! Ordered rule tables applied after decoding: glyph fixes, the drop list and
//! the display rewrites. Each table is evaluated top to bottom.

use std::borrow::Cow;

/// Cross marks the engine emits (plain and mis-encoded), and their replacements.
pub const GLYPH_FIXES: &[(&str, &str)] = &[
    ("\u{2717}", "\u{274C}"),
    ("\u{201A}\u{FA}\u{F3}", "\u{274C}"),
    (r"\u2717", ""),
];

#[derive(Debug, Clone, Copy)]
pub enum DropRule {
    Prefix(&'static str),
    Contains(&'static str),
    ContainsAll(&'static [&'static str]),
    Blank,
}

pub const DROP_RULES: &[DropRule] = &[
    DropRule::Prefix(r#"[{"id":"#),
    DropRule::Contains("HTTP Request"),
    DropRule::Contains("Auto-extracted"),
    DropRule::ContainsAll(&[r#""success": true"#, r#""files":"#]),
    DropRule::Blank,
    DropRule::Contains("Starting verification for"),
];

impl DropRule {
    fn matches(&self, text: &str) -> bool {
        match self {
            DropRule::Prefix(p) => text.starts_with(p),
            DropRule::Contains(s) => text.contains(s),
            DropRule::ContainsAll(all) => all.iter().all(|s| text.contains(s)),
            DropRule::Blank => text.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    Prefix(&'static str),
    Contains(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// `<label> <rest>` where rest follows the matched prefix.
    Relabel(&'static str),
    Replace(&'static str),
    Keep,
    /// Remove the first occurrence of the marker, then trim.
    StripMarker(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    pub matcher: Matcher,
    pub action: Action,
}

const fn rule(matcher: Matcher, action: Action) -> RewriteRule {
    RewriteRule { matcher, action }
}

pub const REWRITE_RULES: &[RewriteRule] = &[
    rule(Matcher::Prefix("Teacher Info:"), Action::Relabel("Name:")),
    rule(Matcher::Prefix("Email:"), Action::Relabel("Email:")),
    rule(Matcher::Prefix("School:"), Action::Relabel("School:")),
    rule(Matcher::Prefix("DOB:"), Action::Relabel("DOB:")),
    rule(Matcher::Prefix("Verification ID:"), Action::Relabel("ID:")),
    rule(Matcher::Prefix("Backup:"), Action::Relabel("Saved:")),
    rule(Matcher::Contains("Step 1/4"), Action::Replace("Generating PDF...")),
    rule(Matcher::Contains("Step 2/4"), Action::Replace("Submitting Info...")),
    rule(Matcher::Contains("Step 3/4"), Action::Replace("Skipping SSO...")),
    // Upstream wording, stray digit included.
    rule(Matcher::Contains("Step 4/4"), Action::Replace("4Uploading Doc...")),
    rule(Matcher::Prefix("Complete:"), Action::Keep),
    rule(Matcher::Contains("[OK]"), Action::StripMarker("[OK]")),
];

impl Matcher {
    fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Prefix(p) => text.starts_with(p),
            Matcher::Contains(s) => text.contains(s),
        }
    }
}

impl RewriteRule {
    fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.action {
            Action::Relabel(label) => {
                let rest = match self.matcher {
                    Matcher::Prefix(p) => &text[p.len()..],
                    Matcher::Contains(_) => text,
                };
                Cow::Owned(format!("{label} {}", rest.trim()))
            }
            Action::Replace(fixed) => Cow::Borrowed(fixed),
            Action::Keep => Cow::Borrowed(text),
            Action::StripMarker(marker) => {
                Cow::Owned(text.replacen(marker, "", 1).trim().to_string())
            }
        }
    }
}

pub fn fix_glyphs(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for &(from, to) in GLYPH_FIXES {
        if out.contains(from) {
            out = Cow::Owned(out.replace(from, to));
        }
    }
    out
}

pub fn should_drop(text: &str) -> bool {
    DROP_RULES.iter().any(|rule| rule.matches(text))
}

/// Applies the first matching rewrite; unmatched text passes through.
pub fn rewrite(text: &str) -> Cow<'_, str> {
    REWRITE_RULES
        .iter()
        .find(|rule| rule.matcher.matches(text))
        .map_or(Cow::Borrowed(text), |rule| rule.apply(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_fixes() {
        assert_eq!(fix_glyphs("\u{201A}\u{FA}\u{F3} upload failed"), "❌ upload failed");
        assert_eq!(fix_glyphs("\u{2717} upload failed"), "❌ upload failed");
        assert_eq!(fix_glyphs(r"\u2717 upload failed"), " upload failed");
        assert!(matches!(fix_glyphs("clean"), Cow::Borrowed("clean")));
    }

    #[test]
    fn drop_list() {
        assert!(should_drop(r#"[{"id": 4, "name": "x"}]"#));
        assert!(should_drop(r#"[{"id":4,"name":"x"}]"#));
        assert!(!should_drop(r#"[ {"id": 4}]"#));
        assert!(!should_drop(r#"[{"name": "x", "id": 4}]"#));
        assert!(should_drop("HTTP Request: POST https://example.test"));
        assert!(should_drop("Auto-extracted 3 fields"));
        assert!(should_drop(r#"{"success": true, "files": ["a.pdf"]}"#));
        assert!(!should_drop(r#"{"success": true}"#));
        assert!(should_drop(""));
        assert!(should_drop("   "));
        assert!(should_drop("Starting verification for jane@school.edu"));
        assert!(!should_drop("Starting..."));
    }

    #[test]
    fn labels_are_rewritten() {
        assert_eq!(rewrite("Teacher Info:  Jane Doe "), "Name: Jane Doe");
        assert_eq!(rewrite("Email:a@b.com"), "Email: a@b.com");
        assert_eq!(rewrite("School: Lincoln High"), "School: Lincoln High");
        assert_eq!(rewrite("DOB: 1980-01-02"), "DOB: 1980-01-02");
        assert_eq!(rewrite("Verification ID: 6f2a"), "ID: 6f2a");
        assert_eq!(rewrite("Backup: out/run.json"), "Saved: out/run.json");
    }

    #[test]
    fn steps_are_replaced() {
        assert_eq!(rewrite("Step 1/4: rendering"), "Generating PDF...");
        assert_eq!(rewrite("Step 2/4: submitting"), "Submitting Info...");
        assert_eq!(rewrite(">> Step 3/4"), "Skipping SSO...");
        assert_eq!(rewrite("Step 4/4 upload"), "4Uploading Doc...");
    }

    #[test]
    fn first_match_wins() {
        // Prefix labels are checked before the step markers.
        assert_eq!(rewrite("Backup: Step 1/4.json"), "Saved: Step 1/4.json");
        assert_eq!(rewrite("Complete: [OK] all done"), "Complete: [OK] all done");
        assert_eq!(rewrite("[OK] Step 2/4"), "Submitting Info...");
    }

    #[test]
    fn ok_marker_removed_once() {
        assert_eq!(rewrite("[OK] Done"), "Done");
        assert_eq!(rewrite("Upload [OK] [OK]"), "Upload  [OK]");
    }

    #[test]
    fn unmatched_passes_through() {
        assert!(matches!(rewrite("Waiting for review"), Cow::Borrowed("Waiting for review")));
        // Labels only match as prefixes.
        assert_eq!(rewrite("Primary Email: x"), "Primary Email: x");
    }
}
