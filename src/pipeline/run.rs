// A single topic-pipeline run over one corpus.
//
// Pure with respect to its inputs: the vocabulary, model and report are
// built from scratch on every call and nothing survives the call except
// the report. The per-source and combined phases both go through here.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use super::PipelineConfig;
use crate::corpus::segment::Segmenter;
use crate::corpus::{tokenize_documents, Document, TokenizedDocument};
use crate::model::bow::VectorizedCorpus;
use crate::model::lda;
use crate::model::vocabulary::Vocabulary;
use crate::model::ModelError;
use crate::report::{dominant_topic_shares, topic_terms, DateRange, EntityVolume, TopicReport};

/// Why a run produced no report. None of these stop the program.
#[derive(Debug, Error)]
pub enum RunFailure {
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no documents to analyze")]
    EmptyCorpus,
    #[error("no document kept any token after segmentation")]
    NoUsableTokens,
    #[error(
        "pruning left an empty vocabulary ({documents} documents, no_below={no_below}, no_above={no_above})"
    )]
    DegenerateVocabulary {
        documents: usize,
        no_below: usize,
        no_above: f64,
    },
    #[error("every document vector is empty after pruning")]
    DegenerateCorpus,
    #[error("training failed: {0}")]
    Training(#[from] ModelError),
}

/// Normalize, segment and model raw documents.
pub fn run_documents(
    label: &str,
    documents: &[Document],
    segmenter: &Segmenter,
    config: &PipelineConfig,
) -> Result<TopicReport, RunFailure> {
    let tokenized = tokenize_documents(documents, segmenter);
    run_topic_pipeline(label, &tokenized, config)
}

/// Build vocabulary, vectors, model and report for one corpus.
pub fn run_topic_pipeline(
    label: &str,
    documents: &[TokenizedDocument],
    config: &PipelineConfig,
) -> Result<TopicReport, RunFailure> {
    info!(corpus = label, documents = documents.len(), "Starting topic run");

    if documents.is_empty() {
        return Err(RunFailure::EmptyCorpus);
    }
    if documents.iter().all(TokenizedDocument::is_empty) {
        return Err(RunFailure::NoUsableTokens);
    }

    let vocab = Vocabulary::build(documents, &config.vocabulary);
    if vocab.is_empty() {
        return Err(RunFailure::DegenerateVocabulary {
            documents: vocab.num_docs(),
            no_below: config.vocabulary.no_below,
            no_above: config.vocabulary.no_above,
        });
    }

    let corpus = vectorize(documents, &vocab)?;
    if corpus.dropped > 0 {
        warn!(
            corpus = label,
            dropped = corpus.dropped,
            "Documents with no surviving terms left out of training"
        );
    }
    info!(
        corpus = label,
        terms = vocab.len(),
        modeled = corpus.len(),
        "Corpus vectorized"
    );

    let model = lda::train(&corpus.documents, vocab.len(), &config.trainer)?;

    let (shares, assigned_documents) = dominant_topic_shares(&model, &corpus);
    let topics = topic_terms(&model, &vocab, config.top_terms);

    Ok(TopicReport {
        label: label.to_string(),
        documents: documents.len(),
        modeled_documents: corpus.len(),
        vocabulary_size: vocab.len(),
        num_topics: model.num_topics(),
        topics,
        shares,
        assigned_documents,
        date_range: DateRange::from_timestamps(documents.iter().filter_map(|d| d.posted_at)),
        entity_volume: EntityVolume::from_documents(documents, config.cutoff),
    })
}

/// Vectorize `documents` against `vocab`, refusing an all-empty corpus.
///
/// A vocabulary built from the same documents always leaves at least one
/// non-empty vector, so inside a run this only fires if the two diverge.
fn vectorize(
    documents: &[TokenizedDocument],
    vocab: &Vocabulary,
) -> Result<VectorizedCorpus, RunFailure> {
    let corpus = VectorizedCorpus::build(documents, vocab);
    if corpus.is_empty() {
        return Err(RunFailure::DegenerateCorpus);
    }
    Ok(corpus)
}
