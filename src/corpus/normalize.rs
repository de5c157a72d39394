// Text normalization: the canonical form every token is derived from.
//
// Order matters: URLs go first (their letters would otherwise survive the
// symbol filter), then everything that is not a Latin letter or a CJK
// ideograph becomes a space, spaces collapse, and finally all CJK text is
// converted to Taiwan-standard traditional script.

use std::sync::LazyLock;

use regex_lite::Regex;
use zhconv::{zhconv, Variant};

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s\u{3000}]+").expect("URL pattern is valid"));

/// Script variant all CJK text is converted to.
const CANONICAL_VARIANT: Variant = Variant::ZhTW;

/// Normalize a document's raw text. Pure and idempotent.
pub fn normalize(text: &str) -> String {
    let without_urls = URL_PATTERN.replace_all(text, "");
    let cleaned = retain_linguistic(&without_urls);
    let canonical = to_canonical_script(&cleaned);
    // Conversion tables occasionally map into characters outside the kept range.
    if canonical.chars().all(|c| c == ' ' || is_linguistic(c)) {
        canonical
    } else {
        retain_linguistic(&canonical)
    }
}

/// Convert CJK characters to the canonical script, leaving the rest alone.
pub fn to_canonical_script(text: &str) -> String {
    zhconv(text, CANONICAL_VARIANT)
}

/// Latin letters and CJK unified ideographs are the only characters kept.
pub fn is_linguistic(c: char) -> bool {
    c.is_ascii_alphabetic() || is_ideograph(c)
}

pub fn is_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Replace runs of non-linguistic characters with a single space and trim.
fn retain_linguistic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut gap = false;
    for c in text.chars() {
        if is_linguistic(c) {
            if gap && !out.is_empty() {
                out.push(' ');
            }
            gap = false;
            out.push(c);
        } else {
            gap = true;
        }
    }
    out
}
