// One corpus in, one TopicReport out, with the per-source and combined
// orchestration on top.

pub mod orchestrator;
pub mod run;

use chrono::NaiveDateTime;

use crate::model::lda::TrainerConfig;
use crate::model::vocabulary::VocabularyConfig;

/// Everything a single run needs, fixed before the first run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub vocabulary: VocabularyConfig,
    pub trainer: TrainerConfig,
    /// Terms listed per topic in the report (default 15).
    pub top_terms: usize,
    /// Split entity mention counts at this time, when set.
    pub cutoff: Option<NaiveDateTime>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vocabulary: VocabularyConfig::default(),
            trainer: TrainerConfig::default(),
            top_terms: 15,
            cutoff: None,
        }
    }
}
