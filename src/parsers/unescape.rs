use std::borrow::Cow;

/// Reads `text` as the body of a JSON string literal, so `\n`, `\"` and
/// `\uXXXX` escapes become real characters. Anything that is not a valid
/// literal body (stray quotes, raw control chars, bad escapes) is returned
/// untouched.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        // No escapes; decoding would only fail on quotes/control chars or
        // return the same text.
        return Cow::Borrowed(text);
    }

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    quoted.push_str(text);
    quoted.push('"');

    match serde_json::from_str::<String>(&quoted) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(err) => {
            tracing::debug!(%err, "line is not an escaped literal, keeping raw text");
            Cow::Borrowed(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_unicode_escapes() {
        assert_eq!(unescape(r"Sch\u00f6n \u2714 done"), "Schön ✔ done");
    }

    #[test]
    fn decodes_newline_and_quote() {
        assert_eq!(unescape(r#"a\nb \"c\""#), "a\nb \"c\"");
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(unescape("Step 1/4"), Cow::Borrowed("Step 1/4")));
    }

    #[test]
    fn invalid_escape_falls_back() {
        assert_eq!(unescape(r"C:\path\to"), r"C:\path\to");
    }

    #[test]
    fn unbalanced_quote_falls_back() {
        let raw = r#"{"id": 1} \u2717"#;
        assert_eq!(unescape(raw), raw);
    }
}
