// Corpus preparation, from raw board dumps to token sequences.
//
// Three stages, each a pure transformation:
//   extract    split a dump into posts, strip headers, keep reply lines
//   normalize  drop URLs and symbols, collapse spaces, canonical script
//   segment    dictionary-aware word segmentation and stopword removal

pub mod extract;
pub mod normalize;
pub mod segment;

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use self::normalize::normalize;
use self::segment::Segmenter;

/// Header metadata recovered from a post, when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostMeta {
    pub author: Option<String>,
    pub board: Option<String>,
    pub title: Option<String>,
    pub posted_at: Option<NaiveDateTime>,
}

/// One post's prose plus its retained reply lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub text: String,
    pub meta: PostMeta,
}

/// The token sequence derived from one [`Document`]. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizedDocument {
    pub tokens: Vec<String>,
    /// Registered entity mentions in the document, by entity name.
    pub mentions: BTreeMap<String, usize>,
    pub posted_at: Option<NaiveDateTime>,
}

impl TokenizedDocument {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Normalize and segment every document, preserving corpus order.
pub fn tokenize_documents(documents: &[Document], segmenter: &Segmenter) -> Vec<TokenizedDocument> {
    documents
        .iter()
        .map(|doc| {
            let canonical = normalize(&doc.text);
            TokenizedDocument {
                tokens: segmenter.segment(&canonical),
                mentions: segmenter.mentions(&canonical),
                posted_at: doc.meta.posted_at,
            }
        })
        .collect()
}
