// Lexicon: the curated static data the segmenter depends on.
//
// Two pieces: the stopword set and the entity/keyword registry. Both ship
// embedded in the binary and can be overridden with files on disk. They
// are loaded once at startup and then only ever read.

pub mod registry;
pub mod stopwords;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use self::registry::Registry;
use self::stopwords::Stopwords;

/// Immutable bundle of stopwords and registered terms for one program run.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub stopwords: Stopwords,
    pub registry: Registry,
}

impl Lexicon {
    /// The lexicon compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            stopwords: Stopwords::embedded(),
            registry: Registry::embedded()?,
        })
    }

    /// Load the lexicon, preferring override files when given.
    ///
    /// A missing or malformed override is an error rather than a silent
    /// fallback: the caller asked for that file specifically.
    pub fn load(stopwords_path: Option<&Path>, registry_path: Option<&Path>) -> Result<Self> {
        let stopwords = match stopwords_path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read stopwords from {}", path.display()))?;
                Stopwords::parse(&text)
            }
            None => Stopwords::embedded(),
        };

        let registry = match registry_path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read registry from {}", path.display()))?;
                Registry::from_json(&text)
                    .with_context(|| format!("Malformed registry file {}", path.display()))?
            }
            None => Registry::embedded()?,
        };

        info!(
            stopwords = stopwords.len(),
            entities = registry.entities.len(),
            keyword_groups = registry.keyword_groups.len(),
            "Lexicon loaded"
        );

        Ok(Self {
            stopwords,
            registry,
        })
    }

    /// Merge the English stopword list from the `stop-words` crate.
    pub fn with_english_stopwords(mut self) -> Self {
        self.stopwords.extend_with_language(stop_words::LANGUAGE::English);
        self
    }
}
