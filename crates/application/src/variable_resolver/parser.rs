//! Parser for `${variable}` placeholders
//!
//! Extracts placeholder references with their byte spans. The first `}`
//! closes a placeholder; a line break before it means no placeholder starts
//! at that `${`. An unclosed `${` is plain text.

use std::ops::Range;

/// A parsed placeholder reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name (without `${` and `}`), taken verbatim.
    pub name: String,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

const fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Parses a string and extracts all placeholder references, left to right.
///
/// # Examples
///
/// ```
/// use dratt_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("${baseUrl}/todos/${todoId}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "baseUrl");
/// assert_eq!(refs[1].span, 17..26);
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let mut references = Vec::new();
    let mut offset = 0;

    while let Some(found) = input[offset..].find("${") {
        let start = offset + found;
        let name_start = start + 2;
        let rest = &input[name_start..];

        match rest.find(|ch: char| ch == '}' || is_line_terminator(ch)) {
            Some(i) if rest[i..].starts_with('}') => {
                let end = name_start + i + 1;
                references.push(VariableReference::new(&rest[..i], start..end));
                offset = end;
            }
            // `$` is one byte, so the next char boundary is right after it
            _ => offset = start + 1,
        }
    }

    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_variable() {
        let refs = parse_variables("${name}");
        assert_eq!(refs, vec![VariableReference::new("name", 0..7)]);
    }

    #[test]
    fn test_parse_multiple_variables() {
        let names: Vec<_> = parse_variables("${base_url}/api/${version}/users/${id}")
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["base_url", "version", "id"]);
    }

    #[test]
    fn test_first_closing_brace_wins() {
        let refs = parse_variables("${a}b}");
        assert_eq!(refs, vec![VariableReference::new("a", 0..4)]);
    }

    #[test]
    fn test_name_is_not_trimmed() {
        let refs = parse_variables("${ name }");
        assert_eq!(refs[0].name, " name ");
    }

    #[test]
    fn test_empty_placeholder() {
        let refs = parse_variables("${}");
        assert_eq!(refs, vec![VariableReference::new("", 0..3)]);
    }

    #[test]
    fn test_unclosed_placeholder_is_literal() {
        assert!(parse_variables("${name").is_empty());
        assert!(parse_variables("cost: $5 {x}").is_empty());
    }

    #[test]
    fn test_line_break_abandons_placeholder() {
        assert!(parse_variables("${a\nb}").is_empty());
        let refs = parse_variables("${a\n${b}");
        assert_eq!(refs, vec![VariableReference::new("b", 4..8)]);
    }

    #[test]
    fn test_adjacent_variables() {
        let refs = parse_variables("${a}${b}${c}");
        assert_eq!(
            refs,
            vec![
                VariableReference::new("a", 0..4),
                VariableReference::new("b", 4..8),
                VariableReference::new("c", 8..12),
            ]
        );
    }

    #[test]
    fn test_span_positions() {
        let input = "Hello ${name}, welcome!";
        let refs = parse_variables(input);
        assert_eq!(&input[refs[0].span.clone()], "${name}");
    }

    #[test]
    fn test_multibyte_text_around_placeholders() {
        let input = "héllo ${nåme} ✓";
        let refs = parse_variables(input);
        assert_eq!(refs[0].name, "nåme");
        assert_eq!(&input[refs[0].span.clone()], "${nåme}");
    }
}
