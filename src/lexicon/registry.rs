// Entity and keyword registry: terms the segmenter must never split.
//
// Political figures with their nicknames, plus thematic keyword groups
// (recall vote, tariff negotiation, typhoon relief). The registry is pure
// data: the segmenter decides how to use it.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const EMBEDDED_REGISTRY: &str = include_str!("../../data/registry.json");

/// A named entity and the aliases it is discussed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Entity {
    /// The name followed by every alias.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A list of keywords belonging to one discussion theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub theme: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub keyword_groups: Vec<KeywordGroup>,
}

impl Registry {
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_REGISTRY).context("Embedded registry is malformed")
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Every distinct registered term, sorted.
    ///
    /// Names, aliases and keywords are flattened together; the sort makes
    /// tokenizer construction independent of file order.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: BTreeSet<&str> = BTreeSet::new();
        for entity in &self.entities {
            terms.extend(entity.terms());
        }
        for group in &self.keyword_groups {
            terms.extend(group.keywords.iter().map(String::as_str));
        }
        terms.into_iter().filter(|t| !t.trim().is_empty()).collect()
    }
}
