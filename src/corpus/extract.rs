// Post extraction from PTT-style board dumps.
//
// A dump is a sequence of posts separated by a line of 70 '=' characters.
// Each post opens with header lines (作者/看板/標題/時間), then the body,
// then an origin-station line after which come the push/boo/reply lines.
// Only the body and the reply lines are kept as document text.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex_lite::Regex;

use super::{Document, PostMeta};

/// Separator between posts in a dump.
pub const POST_DELIMITER: &str =
    "======================================================================";

/// Marks the end of the body; everything after it is the reply region.
pub const ORIGIN_MARKER: &str = "※ 發信站: 批踢踢實業坊(ptt.cc)";

/// First characters of a retained reply line: push, boo, arrow, quote.
const REPLY_GLYPHS: [char; 4] = ['推', '噓', '→', ':'];

const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

static QUOTE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r": ※ 引述.*").expect("quote reference pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    Author,
    Board,
    Title,
    Time,
}

impl Header {
    fn split(line: &str) -> Option<(Self, &str)> {
        [
            ("作者", Header::Author),
            ("看板", Header::Board),
            ("標題", Header::Title),
            ("時間", Header::Time),
        ]
        .into_iter()
        .find_map(|(prefix, header)| line.strip_prefix(prefix).map(|rest| (header, rest.trim())))
    }
}

/// Split a raw dump into documents.
///
/// Never fails: a segment with no recognizable structure still yields its
/// whole text as a prose-only document. Segments that are blank after
/// trimming yield nothing.
pub fn extract_documents(dump: &str) -> Vec<Document> {
    dump.split(POST_DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(extract_post)
        .collect()
}

/// Extract a single post segment.
pub fn extract_post(segment: &str) -> Document {
    let (main, replies) = match segment.split_once(ORIGIN_MARKER) {
        Some((main, replies)) => (main, Some(replies)),
        None => (segment, None),
    };

    // Headers are only read from the leading block; a body line that
    // happens to start with 時間 or 標題 is body text.
    let mut meta = PostMeta::default();
    let mut seen: Vec<Header> = Vec::new();
    let mut lines = main.lines().peekable();
    while let Some((header, value)) = lines.peek().copied().and_then(Header::split) {
        if seen.contains(&header) {
            break;
        }
        seen.push(header);
        match header {
            Header::Author => meta.author = non_empty(value),
            Header::Board => meta.board = non_empty(value),
            Header::Title => meta.title = non_empty(value),
            Header::Time => meta.posted_at = parse_timestamp(value),
        }
        lines.next();
    }
    let body_lines: Vec<&str> = lines.collect();

    let body = body_lines.join("\n");
    let body = QUOTE_REFERENCE.replace_all(&body, "");
    let mut text = body.trim().to_string();

    if let Some(replies) = replies {
        let kept = reply_lines(replies);
        if !kept.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&kept.join(" "));
        }
    }

    Document { text, meta }
}

/// Lines in the reply region that begin with a reply glyph and a space.
fn reply_lines(region: &str) -> Vec<&str> {
    region
        .lines()
        .map(str::trim)
        .filter(|line| {
            let mut chars = line.chars();
            matches!(
                (chars.next(), chars.next()),
                (Some(glyph), Some(next)) if REPLY_GLYPHS.contains(&glyph) && next.is_whitespace()
            )
        })
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse a header timestamp such as `Sat Jul 26 16:30:00 2025`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> String {
        [
            "作者 someone (暱稱)",
            "看板 Gossiping",
            "標題 [問卦] 罷免投票怎麼看",
            "時間 Sat Jul 26 16:30:00 2025",
            "",
            "今天去投票了 大家怎麼看",
            ": ※ 引述《other》之銘言",
            "",
            "--",
            ORIGIN_MARKER,
            "※ 文章網址: https://www.ptt.cc/bbs/Gossiping/M.1.html",
            "推 user1: 支持罷免",
            "噓 user2: 不同意",
            "→ user3: 再看看",
            "這行不是回覆",
        ]
        .join("\n")
    }

    #[test]
    fn test_extract_body_and_replies() {
        let doc = extract_post(&sample_post());
        assert!(doc.text.starts_with("今天去投票了 大家怎麼看"));
        assert!(doc.text.contains("推 user1: 支持罷免"));
        assert!(doc.text.contains("噓 user2: 不同意"));
        assert!(doc.text.contains("→ user3: 再看看"));
        assert!(!doc.text.contains("這行不是回覆"));
        assert!(!doc.text.contains("引述"));
        assert!(!doc.text.contains("看板"));
        assert!(!doc.text.contains("文章網址"));
    }

    #[test]
    fn test_extract_metadata() {
        let doc = extract_post(&sample_post());
        assert_eq!(doc.meta.author.as_deref(), Some("someone (暱稱)"));
        assert_eq!(doc.meta.board.as_deref(), Some("Gossiping"));
        assert_eq!(doc.meta.title.as_deref(), Some("[問卦] 罷免投票怎麼看"));
        let expected = NaiveDateTime::parse_from_str("2025-07-26 16:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(doc.meta.posted_at, Some(expected));
    }

    #[test]
    fn test_body_lines_starting_with_header_words_are_body() {
        let post = [
            "作者 someone (暱稱)",
            "看板 Gossiping",
            "標題 [問卦] 罷免投票怎麼看",
            "時間 Sat Jul 26 16:30:00 2025",
            "",
            "時間到了大家快去",
            "標題黨真多",
        ]
        .join("\n");
        let doc = extract_post(&post);
        assert_eq!(doc.meta.title.as_deref(), Some("[問卦] 罷免投票怎麼看"));
        let expected = NaiveDateTime::parse_from_str("2025-07-26 16:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(doc.meta.posted_at, Some(expected));
        assert_eq!(doc.text, "時間到了大家快去\n標題黨真多");
    }

    #[test]
    fn test_repeated_header_ends_the_header_block() {
        let doc = extract_post("作者 a\n時間 Sat Jul 26 16:30:00 2025\n作者 b");
        assert_eq!(doc.meta.author.as_deref(), Some("a"));
        assert!(doc.meta.posted_at.is_some());
        assert_eq!(doc.text, "作者 b");
    }

    #[test]
    fn test_blank_segments_are_discarded() {
        let dump = format!("\n{POST_DELIMITER}\n   \n{POST_DELIMITER}\n");
        assert!(extract_documents(&dump).is_empty());
    }

    #[test]
    fn test_unstructured_segment_is_prose_only() {
        let doc = extract_post("只是一段沒有格式的文字");
        assert_eq!(doc.text, "只是一段沒有格式的文字");
        assert_eq!(doc.meta, PostMeta::default());
    }

    #[test]
    fn test_multiple_posts_in_order() {
        let dump = format!("第一篇\n{POST_DELIMITER}\n第二篇\n{POST_DELIMITER}\n第三篇");
        let texts: Vec<String> = extract_documents(&dump).into_iter().map(|d| d.text).collect();
        assert_eq!(texts, vec!["第一篇", "第二篇", "第三篇"]);
    }

    #[test]
    fn test_reply_glyph_requires_following_space() {
        let lines = reply_lines("推文很多\n推 ok\n:x\n: yes");
        assert_eq!(lines, vec!["推 ok", ": yes"]);
    }

    #[test]
    fn test_single_digit_day_timestamp() {
        assert!(parse_timestamp("Sun Jul  6 09:05:00 2025").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}
