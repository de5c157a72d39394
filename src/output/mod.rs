// Output formatting: terminal display and JSON lines.
//
// The core never writes files; everything here goes to stdout.

pub mod json;
pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters such as CJK ideographs.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Topics are numbered from 1 for humans.
pub fn topic_label(topic: usize) -> String {
    format!("Topic {}", topic + 1)
}
