pub mod embedded_error;
pub mod severity;
pub mod unescape;

pub use embedded_error::extract_embedded_error;
pub use severity::strip_severity;
pub use unescape::unescape;

/// Turns a raw engine line into plain text: trim, unescape, drop the
/// severity marker and collapse embedded failure objects.
pub fn decode(raw: &str) -> String {
    let unescaped = unescape(raw.trim());
    let text = strip_severity(&unescaped);
    match extract_embedded_error(text) {
        Some(rewritten) => rewritten,
        None => text.to_string(),
    }
}
