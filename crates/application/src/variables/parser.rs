//! Placeholder scanner for `{{name}}` syntax

use std::ops::Range;

/// A `{{name}}` occurrence in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Trimmed name between the braces.
    pub name: String,
    /// Byte range of the whole `{{...}}` in the input.
    pub span: Range<usize>,
}

/// Scans `input` for placeholders, left to right.
///
/// Inner whitespace is trimmed (`{{ host }}` names `host`). Empty names are
/// skipped. A `{{` that is not closed before the next `{{` stays plain text
/// and scanning resumes at the later opener.
///
/// # Examples
///
/// ```
/// use courier_application::variables::parse_placeholders;
///
/// let found = parse_placeholders("https://{{host}}/{{ path }}");
/// assert_eq!(found.len(), 2);
/// assert_eq!(found[1].name, "path");
/// ```
#[must_use]
pub fn parse_placeholders(input: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = input[cursor..].find("{{") {
        let start = cursor + offset;
        let body_start = start + 2;
        let rest = &input[body_start..];
        let Some(close) = rest.find("}}") else {
            break;
        };
        if let Some(reopen) = rest[..close].find("{{") {
            cursor = body_start + reopen;
            continue;
        }

        let name = rest[..close].trim();
        let end = body_start + close + 2;
        if !name.is_empty() {
            found.push(Placeholder {
                name: name.to_string(),
                span: start..end,
            });
        }
        cursor = end;
    }

    found
}

/// Returns true if `input` may contain a placeholder.
#[must_use]
pub fn has_placeholders(input: &str) -> bool {
    input.contains("{{") && input.contains("}}")
}

/// Replaces every placeholder whose name `lookup` knows, leaving the rest verbatim.
pub fn replace_placeholders<'a, F>(input: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<&'a str>,
{
    if !has_placeholders(input) {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for placeholder in parse_placeholders(input) {
        out.push_str(&input[last..placeholder.span.start]);
        match lookup(&placeholder.name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&input[placeholder.span.clone()]),
        }
        last = placeholder.span.end;
    }
    out.push_str(&input[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple() {
        let found = parse_placeholders("{{name}}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "name");
        assert_eq!(found[0].span, 0..8);
    }

    #[test]
    fn test_parse_adjacent_and_spaced() {
        let found = parse_placeholders("{{a}}{{ b }}{{c}}");
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_ignores_single_brace_and_empty() {
        assert!(parse_placeholders("/users/{id}").is_empty());
        assert!(parse_placeholders("{{   }}").is_empty());
        assert!(parse_placeholders("{{name").is_empty());
    }

    #[test]
    fn test_unclosed_opener_keeps_later_placeholders() {
        let input = "x {{ y {{host}}";
        let found = parse_placeholders(input);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "host");
        assert_eq!(&input[found[0].span.clone()], "{{host}}");

        let out = replace_placeholders(input, |name| (name == "host").then_some("h"));
        assert_eq!(out, "x {{ y h");
    }

    #[test]
    fn test_span_covers_braces() {
        let input = "Hello {{name}}, welcome!";
        let found = parse_placeholders(input);
        assert_eq!(&input[found[0].span.clone()], "{{name}}");
    }

    #[test]
    fn test_replace_keeps_unknown_verbatim() {
        let out = replace_placeholders("{{known}}-{{missing}}", |name| {
            (name == "known").then_some("v")
        });
        assert_eq!(out, "v-{{missing}}");
    }

    #[test]
    fn test_replace_without_placeholders_is_identity() {
        let out = replace_placeholders("plain {text}", |_| Some("x"));
        assert_eq!(out, "plain {text}");
    }

    #[test]
    fn test_replace_json_body() {
        let out = replace_placeholders(r#"{"user": "{{user}}"}"#, |name| {
            (name == "user").then_some("ada")
        });
        assert_eq!(out, r#"{"user": "ada"}"#);
    }
}
