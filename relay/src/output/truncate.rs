//! Size-bounding helpers for text that ends up inside chat messages.
//!
//! All lengths are measured in characters (Unicode scalar values), never bytes,
//! so a cut can never land inside a multi-byte sequence.

use {serde::Serialize, std::fmt};

/// Marker appended to text that was cut short.
pub const TRUNCATION_MARKER: &str = "\n\n... (truncated) ...\n";

/// Characters reserved at the end of a truncated string for the marker.
const MARKER_RESERVE: usize = 24;

/// Triple backtick that opens and closes a fenced code block.
const CODE_FENCE: &str = "```";

/// Replacement for a triple backtick found inside embedded text.
const ESCAPED_FENCE: &str = "'''";

/// Bounds `s` to at most `max_chars` characters.
///
/// Text that already fits is returned unchanged. Longer text keeps its first
/// `max_chars - 24` characters followed by [`TRUNCATION_MARKER`]. A limit too
/// small to hold the marker degrades to a plain cut at `max_chars`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_text("short", 100), "short");
/// assert!(truncate_text(&"x".repeat(500), 100).ends_with(TRUNCATION_MARKER));
/// ```
pub fn truncate_text(s: &str, max_chars: usize) -> String {
    // Cheap byte check first: byte length is an upper bound on char count
    if s.len() <= max_chars || s.chars().count() <= max_chars {
        return s.to_string();
    }

    if max_chars < MARKER_RESERVE {
        return s.chars().take(max_chars).collect();
    }

    let mut out: String = s.chars().take(max_chars - MARKER_RESERVE).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Escapes every triple backtick so `s` can sit inside a fenced code block
/// without closing it early.
pub fn sanitize_code_fence(s: &str) -> String {
    s.replace(CODE_FENCE, ESCAPED_FENCE)
}

/// Serializes `value` as pretty JSON bounded to `max_chars` characters.
///
/// Falls back to the value's `Debug` rendering when serialization fails.
/// Either way the result goes through [`truncate_text`], so this never fails.
pub fn serialize_bounded<T>(value: &T, max_chars: usize) -> String
where
    T: Serialize + fmt::Debug + ?Sized,
{
    let rendered = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            log::debug!("Falling back to debug rendering, serialization failed: {e}");
            format!("{value:?}")
        }
    };

    truncate_text(&rendered, max_chars)
}

#[cfg(test)]
mod tests {
    use {super::*, serde::ser::Error as _, serde_json::json};

    /// A value whose serializer always errors.
    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_truncate_text_short_input_unchanged() {
        assert_eq!(truncate_text("hello", 100), "hello");
        assert_eq!(truncate_text("", 0), "");
        let exact = "a".repeat(50);
        assert_eq!(truncate_text(&exact, 50), exact);
    }

    #[test]
    fn test_truncate_text_long_input_bounded() {
        let long = "b".repeat(1000);
        let out = truncate_text(&long, 100);

        assert!(out.chars().count() <= 100);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert!(out.starts_with(&"b".repeat(76)));
    }

    #[test]
    fn test_truncate_text_multibyte_counts_chars() {
        // 40 chars but 160 bytes: must not be cut
        let emoji = "🔔".repeat(40);
        assert_eq!(truncate_text(&emoji, 40), emoji);

        let out = truncate_text(&"é".repeat(300), 60);
        assert!(out.chars().count() <= 60);
        assert!(out.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_text_tiny_limit() {
        let out = truncate_text("abcdefghijklmnopqrstuvwxyz0123456789", 10);
        assert_eq!(out, "abcdefghij");
    }

    #[test]
    fn test_sanitize_code_fence() {
        let input = "before ```json\n{}\n``` after ``````";
        let out = sanitize_code_fence(input);

        assert!(!out.contains("```"));
        assert_eq!(out, "before '''json\n{}\n''' after ''''''");
        assert_eq!(out.chars().count(), input.chars().count());
        assert_eq!(sanitize_code_fence("no fences `here`"), "no fences `here`");
    }

    #[test]
    fn test_serialize_bounded_pretty_json() {
        let value = json!({"id": 7, "tags": ["a", "b"]});
        let out = serialize_bounded(&value, 1000);

        assert!(out.contains('\n'));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&out).unwrap(), value);
    }

    #[test]
    fn test_serialize_bounded_truncates() {
        let value = json!({"blob": "z".repeat(5000)});
        let out = serialize_bounded(&value, 200);

        assert!(out.chars().count() <= 200);
        assert!(out.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_serialize_bounded_falls_back_on_error() {
        let out = serialize_bounded(&Unserializable, 100);
        assert_eq!(out, "Unserializable");
    }
}
