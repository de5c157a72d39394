// TopicReport, the final artifact of one corpus run.
//
// Two views of a trained model: each topic's highest-probability terms,
// and how often each topic is the dominant one across the corpus. Next to
// them, how often each registered entity is mentioned, optionally split at
// a cutoff time.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::corpus::TokenizedDocument;
use crate::model::bow::VectorizedCorpus;
use crate::model::lda::TopicModel;
use crate::model::vocabulary::Vocabulary;

/// A term and its probability within a topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicTerm {
    pub term: String,
    pub weight: f64,
}

/// Ranked term list for one topic. `topic` is zero-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicTerms {
    pub topic: usize,
    pub terms: Vec<TopicTerm>,
}

/// Share of assigned documents for which `topic` is dominant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicShare {
    pub topic: usize,
    pub documents: usize,
    pub percentage: f64,
}

/// Earliest and latest post timestamps seen in a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRange {
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

impl DateRange {
    pub fn from_timestamps<I: IntoIterator<Item = NaiveDateTime>>(timestamps: I) -> Option<Self> {
        timestamps.into_iter().fold(None, |range, ts| match range {
            None => Some(Self {
                earliest: ts,
                latest: ts,
            }),
            Some(r) => Some(Self {
                earliest: r.earliest.min(ts),
                latest: r.latest.max(ts),
            }),
        })
    }
}

/// Mentions of one registered entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityMentions {
    pub entity: String,
    pub mentions: usize,
}

/// Entity mentions on either side of a cutoff time.
///
/// Documents without a timestamp fall on neither side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CutoffVolume {
    pub at: NaiveDateTime,
    /// Documents posted at or before `at`.
    pub documents_before: usize,
    pub before: Vec<EntityMentions>,
    /// Documents posted after `at`.
    pub documents_after: usize,
    pub after: Vec<EntityMentions>,
}

/// How much each registered entity is talked about in one corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityVolume {
    /// Most mentioned first, ties by name.
    pub overall: Vec<EntityMentions>,
    pub cutoff: Option<CutoffVolume>,
}

impl EntityVolume {
    pub fn from_documents(documents: &[TokenizedDocument], cutoff: Option<NaiveDateTime>) -> Self {
        let cutoff = cutoff.map(|at| {
            let before: Vec<&TokenizedDocument> = documents
                .iter()
                .filter(|d| d.posted_at.is_some_and(|ts| ts <= at))
                .collect();
            let after: Vec<&TokenizedDocument> = documents
                .iter()
                .filter(|d| d.posted_at.is_some_and(|ts| ts > at))
                .collect();
            CutoffVolume {
                at,
                documents_before: before.len(),
                before: tally_mentions(before),
                documents_after: after.len(),
                after: tally_mentions(after),
            }
        });
        Self {
            overall: tally_mentions(documents),
            cutoff,
        }
    }
}

fn tally_mentions<'a, I>(documents: I) -> Vec<EntityMentions>
where
    I: IntoIterator<Item = &'a TokenizedDocument>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in documents {
        for (entity, n) in &doc.mentions {
            *counts.entry(entity.as_str()).or_insert(0) += n;
        }
    }
    let mut ranked: Vec<EntityMentions> = counts
        .into_iter()
        .map(|(entity, mentions)| EntityMentions {
            entity: entity.to_string(),
            mentions,
        })
        .collect();
    // Stable sort keeps the BTreeMap's name order among equal counts.
    ranked.sort_by(|a, b| b.mentions.cmp(&a.mentions));
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicReport {
    /// Which corpus this run covered (a source name, or the combined label).
    pub label: String,
    /// Documents handed to the run.
    pub documents: usize,
    /// Documents left in the vectorized corpus.
    pub modeled_documents: usize,
    pub vocabulary_size: usize,
    pub num_topics: usize,
    pub topics: Vec<TopicTerms>,
    /// Only topics that are dominant for at least one document, by index.
    pub shares: Vec<TopicShare>,
    pub assigned_documents: usize,
    pub date_range: Option<DateRange>,
    pub entity_volume: EntityVolume,
}

/// Assign every vectorized document its dominant topic and tally the shares.
pub fn dominant_topic_shares(model: &TopicModel, corpus: &VectorizedCorpus) -> (Vec<TopicShare>, usize) {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for bow in &corpus.documents {
        if let Some(topic) = model.infer(bow).dominant_topic() {
            *counts.entry(topic).or_insert(0) += 1;
        }
    }

    let assigned: usize = counts.values().sum();
    let shares = counts
        .into_iter()
        .map(|(topic, documents)| TopicShare {
            topic,
            documents,
            percentage: documents as f64 / assigned as f64 * 100.0,
        })
        .collect();
    (shares, assigned)
}

/// The `top_n` terms of every topic, resolved to strings.
pub fn topic_terms(model: &TopicModel, vocab: &Vocabulary, top_n: usize) -> Vec<TopicTerms> {
    (0..model.num_topics())
        .map(|topic| TopicTerms {
            topic,
            terms: model
                .top_terms(topic, top_n)
                .into_iter()
                .filter_map(|(id, weight)| {
                    vocab.token(id).map(|term| TopicTerm {
                        term: term.to_string(),
                        weight,
                    })
                })
                .collect(),
        })
        .collect()
}
