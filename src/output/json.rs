// JSON-lines rendering of run outcomes for downstream plotting tools.

use anyhow::Result;
use serde::Serialize;

use crate::pipeline::orchestrator::{RunKind, RunOutcome};
use crate::report::TopicReport;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeLine<'a> {
    Ok {
        label: &'a str,
        kind: RunKind,
        report: &'a TopicReport,
    },
    Skipped {
        label: &'a str,
        kind: RunKind,
        reason: String,
    },
}

impl<'a> From<&'a RunOutcome> for OutcomeLine<'a> {
    fn from(outcome: &'a RunOutcome) -> Self {
        match &outcome.result {
            Ok(report) => OutcomeLine::Ok {
                label: &outcome.label,
                kind: outcome.kind,
                report,
            },
            Err(failure) => OutcomeLine::Skipped {
                label: &outcome.label,
                kind: outcome.kind,
                reason: failure.to_string(),
            },
        }
    }
}

pub fn outcome_line(outcome: &RunOutcome) -> Result<String> {
    Ok(serde_json::to_string(&OutcomeLine::from(outcome))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::terminal;
    use crate::pipeline::run::RunFailure;
    use crate::report::{EntityMentions, EntityVolume, TopicTerm, TopicTerms};

    fn unassigned_report() -> TopicReport {
        TopicReport {
            label: "recall.txt".to_string(),
            documents: 2,
            modeled_documents: 2,
            vocabulary_size: 2,
            num_topics: 2,
            topics: (0..2)
                .map(|topic| TopicTerms {
                    topic,
                    terms: vec![
                        TopicTerm {
                            term: "罷免".to_string(),
                            weight: 0.6,
                        },
                        TopicTerm {
                            term: "投票".to_string(),
                            weight: 0.4,
                        },
                    ],
                })
                .collect(),
            shares: vec![],
            assigned_documents: 0,
            date_range: None,
            entity_volume: EntityVolume {
                overall: vec![EntityMentions {
                    entity: "黃國昌".to_string(),
                    mentions: 3,
                }],
                cutoff: None,
            },
        }
    }

    #[test]
    fn test_skipped_line() {
        let outcome = RunOutcome {
            label: "hatepolitics.txt".to_string(),
            kind: RunKind::Source,
            result: Err(RunFailure::EmptyCorpus),
        };
        let line = outcome_line(&outcome).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["kind"], "source");
        assert_eq!(value["label"], "hatepolitics.txt");
        assert_eq!(value["reason"], "no documents to analyze");
    }

    #[test]
    fn test_report_without_shares_still_lists_topics() {
        let outcome = RunOutcome {
            label: "recall.txt".to_string(),
            kind: RunKind::Source,
            result: Ok(unassigned_report()),
        };
        let line = outcome_line(&outcome).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["report"]["shares"], serde_json::json!([]));
        assert_eq!(value["report"]["assigned_documents"], 0);
        assert_eq!(value["report"]["topics"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["report"]["topics"][1]["terms"][0]["term"], "罷免");
        assert_eq!(
            value["report"]["entity_volume"]["overall"][0]["entity"],
            "黃國昌"
        );
        assert!(value["report"]["entity_volume"]["cutoff"].is_null());

        // The terminal renderer takes the same report through its no-share branch.
        terminal::display_outcome(&outcome);
    }
}
