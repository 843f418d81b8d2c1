//! Concise renderings of values and types for violation diagnostics.
//!
//! Violation messages embed the offending values. Everything rendered here is
//! length-bounded so a thrown message stays usable in logs even when a call
//! involves enormous structures.

use std::borrow::Cow;
use std::fmt;

/// Upper bound on the length of a concise representation, in characters.
pub const MAX_CONCISE_LENGTH: usize = 80;

/// Marker inserted where a representation was truncated.
pub const TRUNCATION_MARKER: char = '…';

/// Render a value for embedding in a violation message.
pub fn concise<T: fmt::Debug + ?Sized>(value: &T) -> String {
    concise_str(&format!("{value:?}"))
}

/// Bound already-rendered text: collapse whitespace runs and truncate the
/// middle when it exceeds [`MAX_CONCISE_LENGTH`].
pub fn concise_str(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_middle(&collapsed, MAX_CONCISE_LENGTH)
}

/// Keep the head and tail of `text`, replacing the middle with
/// [`TRUNCATION_MARKER`], so both the start of a structure and its end stay
/// visible.
pub fn truncate_middle(text: &str, max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max || max < 2 {
        return text.to_owned();
    }
    let keep = max - 1;
    let head = keep - keep / 2;
    let tail = keep / 2;
    let mut out = String::with_capacity(max * 4);
    out.extend(&chars[..head]);
    out.push(TRUNCATION_MARKER);
    out.extend(&chars[chars.len() - tail..]);
    out
}

/// Full type path of a value.
pub fn type_of<T: ?Sized>(_value: &T) -> &'static str {
    std::any::type_name::<T>()
}

/// Type name with leading module segments stripped. Generic arguments are
/// kept exactly as the compiler renders them.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let bytes = full.as_bytes();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && i + 1 < bytes.len() && bytes[i + 1] == b':' => {
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    full[start..].to_owned()
}

/// Condition names pass through the same bounding as rendered values; short
/// single-line names are kept as-is.
pub(crate) fn normalize_name(name: Cow<'static, str>) -> Cow<'static, str> {
    let untidy = name.chars().count() > MAX_CONCISE_LENGTH
        || name.contains(|c: char| c.is_whitespace() && c != ' ')
        || name.contains("  ");
    if untidy {
        Cow::Owned(concise_str(&name))
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_middle("n >= 0", MAX_CONCISE_LENGTH), "n >= 0");
    }

    #[test]
    fn test_truncation_keeps_head_and_tail() {
        let long = "a".repeat(60) + &"z".repeat(60);
        let bounded = truncate_middle(&long, MAX_CONCISE_LENGTH);
        assert_eq!(bounded.chars().count(), MAX_CONCISE_LENGTH);
        assert!(bounded.starts_with("aaa"));
        assert!(bounded.ends_with("zzz"));
        assert!(bounded.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn test_concise_collapses_whitespace() {
        assert_eq!(concise_str("a\n  b\t c"), "a b c");
    }

    #[test]
    fn test_concise_of_debug_value() {
        assert_eq!(concise(&(1, 2)), "(1, 2)");
        let wide = vec![0u32; 200];
        assert!(concise(&wide).chars().count() <= MAX_CONCISE_LENGTH);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<i64>(), "i64");
        assert!(short_type_name::<Vec<u8>>().starts_with("Vec<"));
        assert!(!short_type_name::<String>().contains("::"));
    }

    #[test]
    fn test_normalize_name_passes_clean_names_through() {
        let name = normalize_name(Cow::Borrowed("n >= 0"));
        assert!(matches!(name, Cow::Borrowed("n >= 0")));
    }

    #[test]
    fn test_normalize_name_collapses_multiline_source() {
        let name = normalize_name(Cow::Borrowed("|s, args|\n    args.0 > 0"));
        assert_eq!(name.as_ref(), "|s, args| args.0 > 0");
    }
}
