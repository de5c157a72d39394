// Stopword set: tokens that carry no topical signal.
//
// The curated list mixes board boilerplate (作者, 看板, 推, 噓), news-site
// domains, and function words. Entries are also stored in the canonical
// script so a simplified-script entry still filters its canonical token.

use std::collections::HashSet;

use stop_words::LANGUAGE;

use crate::corpus::normalize::to_canonical_script;

const EMBEDDED_STOPWORDS: &str = include_str!("../../data/stopwords.txt");

#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn embedded() -> Self {
        Self::parse(EMBEDDED_STOPWORDS)
    }

    /// Parse a stopword file: one entry per line, `#` starts a comment line.
    pub fn parse(text: &str) -> Self {
        let mut set = Self::default();
        for line in text.lines() {
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            set.insert(entry);
        }
        set
    }

    pub fn insert(&mut self, word: &str) {
        let canonical = to_canonical_script(word);
        if canonical != word {
            self.words.insert(canonical);
        }
        self.words.insert(word.to_string());
    }

    pub fn extend_with_language(&mut self, language: LANGUAGE) {
        for word in stop_words::get(language) {
            self.insert(&word);
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for Stopwords {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::default();
        for word in iter {
            set.insert(word);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let set = Stopwords::parse("# header\n\n作者\n  推  \n");
        assert_eq!(set.len(), 2);
        assert!(set.contains("作者"));
        assert!(set.contains("推"));
        assert!(!set.contains("# header"));
    }

    #[test]
    fn test_embedded_has_board_boilerplate() {
        let set = Stopwords::embedded();
        assert!(set.contains("看板"));
        assert!(set.contains("發信站"));
        assert!(set.contains("https"));
    }

    #[test]
    fn test_simplified_entry_matches_canonical_token() {
        let set = Stopwords::parse("内容\n");
        assert!(set.contains("内容"));
        assert!(set.contains(&to_canonical_script("内容")));
    }

    #[test]
    fn test_english_extension() {
        let mut set = Stopwords::default();
        set.extend_with_language(LANGUAGE::English);
        assert!(set.contains("the"));
    }
}
