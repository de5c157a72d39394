// Run orchestration: every source on its own, then all of them together.
//
// Runs are strictly sequential. Each run's outcome is handed to the caller
// before the next run starts, so a report is fully rendered before the
// next (memory-hungry) model is built. A failing source never blocks the
// others or the combined run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::run::{run_topic_pipeline, RunFailure};
use super::PipelineConfig;
use crate::corpus::extract::extract_documents;
use crate::corpus::segment::Segmenter;
use crate::corpus::{tokenize_documents, TokenizedDocument};
use crate::report::TopicReport;

pub const COMBINED_LABEL: &str = "all sources combined";

/// One board dump to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub path: PathBuf,
}

impl Source {
    /// A source named after its file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Source,
    Combined,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub label: String,
    pub kind: RunKind,
    pub result: Result<TopicReport, RunFailure>,
}

impl RunOutcome {
    pub fn report(&self) -> Option<&TopicReport> {
        self.result.as_ref().ok()
    }
}

/// Read, extract and segment one source.
///
/// Returns the source's tokenized documents, or the reason it was skipped.
pub fn prepare_source(
    source: &Source,
    segmenter: &Segmenter,
) -> Result<Vec<TokenizedDocument>, RunFailure> {
    let dump = read_source(&source.path)?;
    let documents = extract_documents(&dump);
    if documents.is_empty() {
        return Err(RunFailure::EmptyCorpus);
    }
    info!(source = %source.name, documents = documents.len(), "Source extracted");
    Ok(tokenize_documents(&documents, segmenter))
}

fn read_source(path: &Path) -> Result<String, RunFailure> {
    std::fs::read_to_string(path).map_err(|source| RunFailure::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Run every source, then the combined corpus if more than one source
/// contributed documents. `on_outcome` sees each outcome as soon as its
/// run finishes; all outcomes are also returned in order.
pub fn run_all<F>(
    sources: &[Source],
    segmenter: &Segmenter,
    config: &PipelineConfig,
    mut on_outcome: F,
) -> Vec<RunOutcome>
where
    F: FnMut(&RunOutcome),
{
    let mut outcomes = Vec::with_capacity(sources.len() + 1);
    let mut combined: Vec<TokenizedDocument> = Vec::new();
    let mut contributing = 0usize;

    for source in sources {
        let result = match prepare_source(source, segmenter) {
            Ok(documents) => {
                let result = run_topic_pipeline(&source.name, &documents, config);
                contributing += 1;
                combined.extend(documents);
                result
            }
            Err(failure) => Err(failure),
        };

        if let Err(failure) = &result {
            warn!(source = %source.name, reason = %failure, "Source run skipped");
        }

        let outcome = RunOutcome {
            label: source.name.clone(),
            kind: RunKind::Source,
            result,
        };
        on_outcome(&outcome);
        outcomes.push(outcome);
    }

    if contributing > 1 {
        info!(
            sources = contributing,
            documents = combined.len(),
            "Starting combined run"
        );
        let result = run_topic_pipeline(COMBINED_LABEL, &combined, config);
        if let Err(failure) = &result {
            warn!(reason = %failure, "Combined run skipped");
        }
        let outcome = RunOutcome {
            label: COMBINED_LABEL.to_string(),
            kind: RunKind::Combined,
            result,
        };
        on_outcome(&outcome);
        outcomes.push(outcome);
    } else if sources.len() > 1 {
        warn!(
            contributing,
            "Fewer than two sources produced documents; combined run skipped"
        );
    }

    outcomes
}
