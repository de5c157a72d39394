// Bag-of-words vectors over a pruned vocabulary.

use std::collections::BTreeMap;

use serde::Serialize;

use super::vocabulary::Vocabulary;
use crate::corpus::TokenizedDocument;

/// Sparse `(term id, count)` pairs sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BagOfWords(pub Vec<(u32, u32)>);

impl BagOfWords {
    /// Count the tokens present in `vocab`; unknown tokens are skipped.
    pub fn from_tokens(tokens: &[String], vocab: &Vocabulary) -> Self {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for id in tokens.iter().filter_map(|t| vocab.id(t)) {
            *counts.entry(id).or_insert(0) += 1;
        }
        Self(counts.into_iter().collect())
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|&(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, u32)> {
        self.0.iter()
    }
}

/// The documents of one corpus that still carry at least one term.
#[derive(Debug, Clone, Default)]
pub struct VectorizedCorpus {
    pub documents: Vec<BagOfWords>,
    /// Documents whose vector came out empty after pruning.
    pub dropped: usize,
}

impl VectorizedCorpus {
    pub fn build(documents: &[TokenizedDocument], vocab: &Vocabulary) -> Self {
        let mut corpus = Self::default();
        for doc in documents {
            let bow = BagOfWords::from_tokens(&doc.tokens, vocab);
            if bow.is_empty() {
                corpus.dropped += 1;
            } else {
                corpus.documents.push(bow);
            }
        }
        corpus
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
