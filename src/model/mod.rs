// Topic model: vocabulary, bag-of-words vectors and LDA.
//
// Everything here is scoped to one corpus. A Vocabulary and the TopicModel
// trained against it are never shared with another run.

pub mod bow;
pub mod lda;
pub mod math;
pub mod vocabulary;

use thiserror::Error;

/// Conditions under which a model cannot be trained.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("the vectorized corpus has no documents")]
    EmptyCorpus,
    #[error("the vocabulary has no terms")]
    EmptyVocabulary,
    #[error("invalid trainer configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to start training workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
