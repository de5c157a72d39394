// Dictionary-aware word segmentation.
//
// Registered terms (names, nicknames, slang) are carved out first with a
// leftmost-longest automaton and are never split. Only the text between
// them goes through jieba, which also knows every registered term that
// contains an ideograph. Pure Latin terms stay with the automaton, whose
// word-boundary guard keeps them from matching inside longer words.
// Stopwords and one-character tokens are dropped last.

use std::collections::BTreeMap;

use aho_corasick::{AhoCorasick, Match, MatchKind};
use anyhow::{Context, Result};
use jieba_rs::Jieba;
use tracing::debug;

use super::normalize::{is_ideograph, normalize};
use crate::lexicon::stopwords::Stopwords;
use crate::lexicon::Lexicon;

/// Read-only tokenizer built once from the static lexicon.
pub struct Segmenter {
    jieba: Jieba,
    registered: AhoCorasick,
    /// Canonical registered terms; automaton pattern `i` is `terms[i]`.
    terms: Vec<String>,
    /// Indices into `entities` of every entity a term names.
    owners: Vec<Vec<usize>>,
    entities: Vec<String>,
    stopwords: Stopwords,
}

impl Segmenter {
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        let terms = registrable_terms(lexicon.registry.terms());

        let mut jieba = Jieba::new();
        for term in terms.iter().filter(|t| t.chars().any(is_ideograph)) {
            jieba.add_word(term, None, None);
        }

        let registered = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&terms)
            .context("Failed to build registered-term automaton")?;

        let entities: Vec<String> = lexicon
            .registry
            .entities
            .iter()
            .map(|e| e.name.clone())
            .collect();
        let mut owners = vec![Vec::new(); terms.len()];
        for (index, entity) in lexicon.registry.entities.iter().enumerate() {
            for term in entity.terms() {
                if let Ok(pos) = terms.binary_search(&normalize(term)) {
                    if !owners[pos].contains(&index) {
                        owners[pos].push(index);
                    }
                }
            }
        }

        debug!(terms = terms.len(), entities = entities.len(), "Segmenter ready");

        Ok(Self {
            jieba,
            registered,
            terms,
            owners,
            entities,
            stopwords: lexicon.stopwords.clone(),
        })
    }

    /// Registered terms in their canonical form.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Normalize and segment raw document text.
    pub fn tokenize(&self, raw: &str) -> Vec<String> {
        self.segment(&normalize(raw))
    }

    /// Segment already-normalized text.
    pub fn segment(&self, canonical: &str) -> Vec<String> {
        let mut pieces: Vec<&str> = Vec::new();
        let mut cursor = 0;

        for found in self.registered_matches(canonical) {
            pieces.extend(self.jieba.cut(&canonical[cursor..found.start()], true));
            pieces.push(&canonical[found.range()]);
            cursor = found.end();
        }
        pieces.extend(self.jieba.cut(&canonical[cursor..], true));

        pieces
            .into_iter()
            .map(str::trim)
            .filter(|piece| piece.chars().count() > 1 && !self.stopwords.contains(piece))
            .map(str::to_string)
            .collect()
    }

    /// Count entity mentions in already-normalized text, keyed by entity name.
    ///
    /// A mention is any registered name or alias of the entity, found the
    /// same way segmentation carves terms out. Stopwords do not apply.
    pub fn mentions(&self, canonical: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for found in self.registered_matches(canonical) {
            for &entity in &self.owners[found.pattern().as_usize()] {
                *counts.entry(self.entities[entity].clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    fn registered_matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Match> + 'a {
        self.registered
            .find_iter(text)
            .filter(move |found| on_word_boundary(text, found.start(), found.end()))
    }
}

/// Canonicalize registry terms; drop those that could never survive as tokens.
fn registrable_terms(raw: Vec<&str>) -> Vec<String> {
    let mut terms: Vec<String> = raw
        .into_iter()
        .map(normalize)
        .filter(|term| term.chars().count() > 1 && !term.contains(' '))
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

/// A Latin-letter term must not match inside a longer Latin word.
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let first = text[start..end].chars().next();
    let last = text[start..end].chars().next_back();
    let after = text[end..].chars().next();

    let glued = |outer: Option<char>, inner: Option<char>| {
        matches!((outer, inner), (Some(o), Some(i)) if o.is_ascii_alphabetic() && i.is_ascii_alphabetic())
    };
    !glued(before, first) && !glued(after, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::registry::{Entity, KeywordGroup, Registry};

    fn lexicon(terms: &[&str], stopwords: &[&str]) -> Lexicon {
        Lexicon {
            stopwords: stopwords.iter().copied().collect(),
            registry: Registry {
                entities: vec![],
                keyword_groups: vec![KeywordGroup {
                    theme: "test".to_string(),
                    keywords: terms.iter().map(|t| t.to_string()).collect(),
                }],
            },
        }
    }

    #[test]
    fn test_registered_terms_are_never_split() {
        let seg = Segmenter::new(&lexicon(&["藐視國會", "罷免"], &[])).unwrap();
        let tokens = seg.segment("立委藐視國會引發罷免");
        assert!(tokens.contains(&"藐視國會".to_string()), "{tokens:?}");
        assert!(tokens.contains(&"罷免".to_string()), "{tokens:?}");
    }

    #[test]
    fn test_longest_registered_match_wins() {
        let seg = Segmenter::new(&lexicon(&["罷免", "大罷免"], &[])).unwrap();
        let tokens = seg.segment("大罷免");
        assert_eq!(tokens, vec!["大罷免".to_string()]);
    }

    #[test]
    fn test_stopwords_and_single_chars_removed() {
        let seg = Segmenter::new(&lexicon(&["罷免"], &["罷免"])).unwrap();
        let tokens = seg.segment("罷免 的 a ok");
        assert_eq!(tokens, vec!["ok".to_string()]);
    }

    #[test]
    fn test_latin_term_inside_word_is_not_matched() {
        let seg = Segmenter::new(&lexicon(&["LSE"], &[])).unwrap();
        assert_eq!(seg.segment("FALSE"), vec!["FALSE".to_string()]);
        assert_eq!(seg.segment("LSE"), vec!["LSE".to_string()]);
    }

    #[test]
    fn test_embedded_latin_aliases_stay_inside_words() {
        let seg = Segmenter::new(&Lexicon::embedded().unwrap()).unwrap();
        assert_eq!(seg.tokenize("FALSE"), vec!["FALSE".to_string()]);
        assert_eq!(seg.tokenize("Cheapest"), vec!["Cheapest".to_string()]);
        assert_eq!(seg.tokenize("Pumas"), vec!["Pumas".to_string()]);
        assert_eq!(seg.tokenize("TBCA"), vec!["TBCA".to_string()]);
        assert_eq!(seg.tokenize("Puma Pumas"), vec!["Puma".to_string(), "Pumas".to_string()]);
    }

    #[test]
    fn test_mentions_count_every_alias_of_an_entity() {
        let lex = Lexicon {
            stopwords: ["國昌"].into_iter().collect(),
            registry: Registry {
                entities: vec![
                    Entity {
                        name: "黃國昌".to_string(),
                        aliases: vec!["國昌".to_string(), "昌神".to_string()],
                    },
                    Entity {
                        name: "沈伯洋".to_string(),
                        aliases: vec!["Puma".to_string()],
                    },
                ],
                keyword_groups: vec![],
            },
        };
        let seg = Segmenter::new(&lex).unwrap();
        let counts = seg.mentions(&normalize("黃国昌 国昌 昌神說 Puma Pumas 罷免"));
        assert_eq!(counts.get("黃國昌"), Some(&3));
        assert_eq!(counts.get("沈伯洋"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_simplified_alias_registered_canonically() {
        let lex = Lexicon {
            stopwords: Stopwords::default(),
            registry: Registry {
                entities: vec![Entity {
                    name: "赖清德".to_string(),
                    aliases: vec!["100万".to_string()],
                }],
                keyword_groups: vec![],
            },
        };
        let seg = Segmenter::new(&lex).unwrap();
        assert_eq!(seg.terms(), &["賴清德".to_string()]);
        assert_eq!(seg.tokenize("賴清德"), vec!["賴清德".to_string()]);
    }

    #[test]
    fn test_empty_text_yields_no_tokens() {
        let seg = Segmenter::new(&lexicon(&[], &[])).unwrap();
        assert!(seg.segment("").is_empty());
    }
}
