//! JSON rendering helpers

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Pretty-prints `data` with a four-space indent if it parses as JSON.
///
/// Escapes in the input are decoded, so `"\u00f3"` renders as `"ó"`.
/// HTML-significant characters are never escaped.
#[must_use]
pub fn pretty_json(data: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(data).ok()?;
    let mut out = Vec::with_capacity(data.len());
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pretty_json_indent_and_unicode() {
        let rendered = pretty_json(br#"{"name":"Jos\u00e9","tag":"<b>"}"#);
        assert_eq!(
            rendered.as_deref(),
            Some("{\n    \"name\": \"José\",\n    \"tag\": \"<b>\"\n}")
        );
    }

    #[test]
    fn test_pretty_json_rejects_text() {
        assert_eq!(pretty_json(b"pong"), None);
        assert_eq!(pretty_json(b""), None);
    }

    #[test]
    fn test_pretty_json_preserves_key_order() {
        let rendered = pretty_json(br#"{"z":1,"a":2}"#).unwrap_or_default();
        assert!(rendered.find("\"z\"") < rendered.find("\"a\""));
    }
}
