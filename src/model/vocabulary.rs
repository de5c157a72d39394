// Token <-> id mapping with document frequencies.
//
// Ids are dense and assigned in first-seen order across the corpus, so the
// same documents in the same order always give the same vocabulary.
// Pruning removes rare and ubiquitous tokens and renumbers the survivors
// without disturbing their relative order.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::corpus::TokenizedDocument;

/// Frequency thresholds applied when pruning a vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyConfig {
    /// Drop tokens found in fewer documents than this (default 10).
    pub no_below: usize,
    /// Drop tokens found in more than this fraction of documents (default 0.6).
    pub no_above: f64,
    /// Keep at most this many of the most document-frequent tokens.
    pub keep_n: Option<usize>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            no_below: 10,
            no_above: 0.6,
            keep_n: Some(100_000),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: HashMap<String, u32>,
    doc_freqs: Vec<usize>,
    num_docs: usize,
}

impl Vocabulary {
    /// Collect every token of the non-empty documents, unpruned.
    pub fn collect<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a TokenizedDocument>,
    {
        let mut vocab = Self::default();
        for doc in documents.into_iter().filter(|d| !d.is_empty()) {
            vocab.num_docs += 1;
            let mut seen: HashSet<u32> = HashSet::new();
            for token in &doc.tokens {
                let id = vocab.intern(token);
                if seen.insert(id) {
                    vocab.doc_freqs[id as usize] += 1;
                }
            }
        }
        vocab
    }

    /// Collect and prune in one step.
    pub fn build(documents: &[TokenizedDocument], config: &VocabularyConfig) -> Self {
        let full = Self::collect(documents);
        let pruned = full.pruned(config);
        debug!(
            documents = full.num_docs,
            collected = full.len(),
            kept = pruned.len(),
            "Vocabulary built"
        );
        pruned
    }

    fn intern(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.ids.get(token) {
            return id;
        }
        let id = self.tokens.len() as u32;
        self.tokens.push(token.to_string());
        self.ids.insert(token.to_string(), id);
        self.doc_freqs.push(0);
        id
    }

    /// A copy keeping only tokens with `no_below <= df <= floor(no_above * n_docs)`,
    /// capped at `keep_n`, renumbered densely.
    pub fn pruned(&self, config: &VocabularyConfig) -> Self {
        let ceiling = (config.no_above * self.num_docs as f64).floor() as usize;

        let mut survivors: Vec<u32> = (0..self.tokens.len() as u32)
            .filter(|&id| {
                let df = self.doc_freqs[id as usize];
                df >= config.no_below && df <= ceiling
            })
            .collect();

        if let Some(keep_n) = config.keep_n {
            if survivors.len() > keep_n {
                survivors.sort_by(|&a, &b| {
                    self.doc_freqs[b as usize]
                        .cmp(&self.doc_freqs[a as usize])
                        .then(a.cmp(&b))
                });
                survivors.truncate(keep_n);
                survivors.sort_unstable();
            }
        }

        let mut pruned = Self {
            num_docs: self.num_docs,
            ..Self::default()
        };
        for old in survivors {
            let id = pruned.intern(&self.tokens[old as usize]);
            pruned.doc_freqs[id as usize] = self.doc_freqs[old as usize];
        }
        pruned
    }

    pub fn id(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    pub fn doc_freq(&self, id: u32) -> Option<usize> {
        self.doc_freqs.get(id as usize).copied()
    }

    /// Number of non-empty documents the vocabulary was collected from.
    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
