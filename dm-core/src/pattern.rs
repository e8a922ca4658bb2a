//! Identity string pattern matching
//!
//! The pattern is matched as-is. The only metacharacters are `^` at the
//! beginning and `$` at the end, so a pattern is one of "^prefix",
//! "suffix$", "substring" or "^complete string$". Comparison is byte-wise
//! and case-sensitive.

use tracing::trace;

/// A pattern split into its anchors and literal text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern<'a> {
    pub start_anchored: bool,
    pub end_anchored: bool,
    pub text: &'a str,
}

impl<'a> Pattern<'a> {
    /// Split off a leading `^` and then a trailing `$`.
    /// Never fails: "^", "$" and "^$" are all valid patterns.
    pub fn parse(pattern: &'a str) -> Self {
        let (start_anchored, rest) = match pattern.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let (end_anchored, text) = match rest.strip_suffix('$') {
            Some(text) => (true, text),
            None => (false, rest),
        };

        Self {
            start_anchored,
            end_anchored,
            text,
        }
    }

    /// Test this pattern against one value
    pub fn matches(&self, value: &str) -> bool {
        let value = value.as_bytes();
        let text = self.text.as_bytes();

        if !self.start_anchored && !self.end_anchored && text.is_empty() {
            return true;
        }

        let mut window = value;
        let mut anchored = self.start_anchored;

        if self.end_anchored {
            if text.len() > value.len() {
                return false;
            }
            // Both anchors: whole-string match
            if self.start_anchored && value.len() != text.len() {
                return false;
            }
            window = &value[value.len() - text.len()..];
            anchored = true;
        }

        if anchored {
            window.starts_with(text)
        } else {
            contains(window, text)
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Does a substring/prefix/suffix/whole-string match of `pattern` against `value`.
///
/// An empty pattern matches everything.
pub fn matches(value: &str, pattern: &str) -> bool {
    let result = pattern.is_empty() || Pattern::parse(pattern).matches(value);
    trace!("matching {:?} against {:?}: {}", value, pattern, result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_anchors() {
        assert_eq!(
            Pattern::parse("^abc$"),
            Pattern { start_anchored: true, end_anchored: true, text: "abc" }
        );
        assert_eq!(
            Pattern::parse("abc"),
            Pattern { start_anchored: false, end_anchored: false, text: "abc" }
        );
        assert_eq!(
            Pattern::parse("$abc^"),
            Pattern { start_anchored: false, end_anchored: false, text: "$abc^" }
        );
        assert_eq!(
            Pattern::parse("^"),
            Pattern { start_anchored: true, end_anchored: false, text: "" }
        );
        assert_eq!(
            Pattern::parse("^$"),
            Pattern { start_anchored: true, end_anchored: true, text: "" }
        );
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert!(matches("", ""));
        assert!(matches("ASUSTeK COMPUTER INC.", ""));
    }

    #[test]
    fn test_substring() {
        assert!(matches("HelloWorld", "loWo"));
        assert!(matches("HelloWorld", "HelloWorld"));
        assert!(!matches("HelloWorld", "world"));
        assert!(!matches("Hello", "HelloWorld"));
        assert!(!matches("", "x"));
    }

    #[test]
    fn test_substring_agrees_with_str_contains() {
        let values = ["", "P5B", "P5B-Deluxe", "ThinkPad X230", "aaa"];
        let patterns = ["a", "aa", "P5", "Deluxe", "X23", "ThinkPad X230 ", "-"];
        for v in values {
            for p in patterns {
                assert_eq!(matches(v, p), v.contains(p), "value {:?} pattern {:?}", v, p);
            }
        }
    }

    #[test]
    fn test_prefix() {
        assert!(matches("HelloWorld", "^Hello"));
        assert!(!matches("HelloWorld", "^World"));
        assert!(!matches("Hi", "^Hello"));
    }

    #[test]
    fn test_suffix() {
        assert!(matches("HelloWorld", "World$"));
        assert!(!matches("HelloWorld", "Hello$"));
        assert!(matches("World", "World$"));
    }

    #[test]
    fn test_whole_string() {
        assert!(matches("Hello", "^Hello$"));
        assert!(!matches("HelloWorld", "^Hello$"));
        assert!(!matches("Hi", "^LongPattern$"));
        assert!(!matches("Hi", "LongPattern$"));
    }

    #[test]
    fn test_anchor_only_patterns() {
        assert!(matches("anything", "^"));
        assert!(matches("anything", "$"));
        assert!(matches("", "^$"));
        assert!(!matches("x", "^$"));
    }

    #[test]
    fn test_anchor_characters_inside_text_are_literal() {
        assert!(matches("a^b", "a^b"));
        assert!(matches("cost$5", "t$5"));
        assert!(matches("x$", "x$$"));
        assert!(!matches("x", "x$$"));
    }

    #[test]
    fn test_multibyte_suffix_window() {
        assert!(matches("Café", "fé$"));
        assert!(!matches("Café", "^fé"));
    }

    #[test]
    fn test_repeatable() {
        for _ in 0..3 {
            assert!(matches("System Product Name", "Product"));
            assert!(!matches("System Product Name", "^Product"));
        }
    }
}
