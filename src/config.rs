use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::model::lda::TrainerConfig;
use crate::model::vocabulary::VocabularyConfig;
use crate::pipeline::PipelineConfig;

/// Central configuration loaded from environment variables.
///
/// Every value has a default, so an empty environment is valid. The .env
/// file is loaded automatically at startup via dotenvy; CLI flags are
/// applied on top by the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub num_topics: usize,
    pub passes: usize,
    pub seed: u64,
    pub workers: usize,
    /// Minimum document frequency for a vocabulary term
    pub no_below: usize,
    /// Maximum fraction of documents a vocabulary term may appear in
    pub no_above: f64,
    /// Cap on vocabulary size; 0 disables the cap
    pub keep_n: usize,
    pub top_terms: usize,
    pub inference_iterations: usize,
    /// Replacement for the embedded stopword list
    pub stopwords_path: Option<PathBuf>,
    /// Replacement for the embedded entity/keyword registry
    pub registry_path: Option<PathBuf>,
    /// Split entity mention counts at this local time
    pub cutoff: Option<NaiveDateTime>,
}

impl Default for Config {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            num_topics: pipeline.trainer.num_topics,
            passes: pipeline.trainer.passes,
            seed: pipeline.trainer.seed,
            workers: pipeline.trainer.workers,
            no_below: pipeline.vocabulary.no_below,
            no_above: pipeline.vocabulary.no_above,
            keep_n: pipeline.vocabulary.keep_n.unwrap_or(0),
            top_terms: pipeline.top_terms,
            inference_iterations: pipeline.trainer.inference_iterations,
            stopwords_path: None,
            registry_path: None,
            cutoff: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults;
    /// set but unparsable keys are an error naming the variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            num_topics: parse_or(&lookup, "MURMUR_TOPICS", defaults.num_topics)?,
            passes: parse_or(&lookup, "MURMUR_PASSES", defaults.passes)?,
            seed: parse_or(&lookup, "MURMUR_SEED", defaults.seed)?,
            workers: parse_or(&lookup, "MURMUR_WORKERS", defaults.workers)?,
            no_below: parse_or(&lookup, "MURMUR_NO_BELOW", defaults.no_below)?,
            no_above: parse_or(&lookup, "MURMUR_NO_ABOVE", defaults.no_above)?,
            keep_n: parse_or(&lookup, "MURMUR_KEEP_N", defaults.keep_n)?,
            top_terms: parse_or(&lookup, "MURMUR_TOP_TERMS", defaults.top_terms)?,
            inference_iterations: parse_or(
                &lookup,
                "MURMUR_INFERENCE_ITERATIONS",
                defaults.inference_iterations,
            )?,
            stopwords_path: lookup("MURMUR_STOPWORDS_PATH").map(PathBuf::from),
            registry_path: lookup("MURMUR_REGISTRY_PATH").map(PathBuf::from),
            cutoff: lookup("MURMUR_CUTOFF")
                .map(|raw| parse_cutoff(&raw).context("MURMUR_CUTOFF has an invalid value"))
                .transpose()?,
        };
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.num_topics == 0 {
            anyhow::bail!("MURMUR_TOPICS must be at least 1");
        }
        if self.passes == 0 {
            anyhow::bail!("MURMUR_PASSES must be at least 1");
        }
        if self.workers == 0 {
            anyhow::bail!("MURMUR_WORKERS must be at least 1");
        }
        if !(self.no_above > 0.0 && self.no_above <= 1.0) {
            anyhow::bail!(
                "MURMUR_NO_ABOVE must be in (0, 1], got {}",
                self.no_above
            );
        }
        if self.inference_iterations == 0 {
            anyhow::bail!("MURMUR_INFERENCE_ITERATIONS must be at least 1");
        }
        Ok(())
    }

    pub fn pipeline(&self, show_progress: bool) -> PipelineConfig {
        PipelineConfig {
            vocabulary: VocabularyConfig {
                no_below: self.no_below,
                no_above: self.no_above,
                keep_n: (self.keep_n > 0).then_some(self.keep_n),
            },
            trainer: TrainerConfig {
                num_topics: self.num_topics,
                passes: self.passes,
                seed: self.seed,
                workers: self.workers,
                inference_iterations: self.inference_iterations,
                show_progress,
                ..TrainerConfig::default()
            },
            top_terms: self.top_terms,
            cutoff: self.cutoff,
        }
    }
}

/// Parse a cutoff such as `2025-07-26 16:30` (seconds optional).
pub fn parse_cutoff(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .with_context(|| format!("expected YYYY-MM-DD HH:MM[:SS], got {raw:?}"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.num_topics, 5);
        assert_eq!(config.passes, 15);
        assert_eq!(config.seed, 42);
        assert_eq!(config.no_below, 10);
        assert!((config.no_above - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.top_terms, 15);
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("MURMUR_TOPICS", "8"),
            ("MURMUR_NO_ABOVE", " 0.5 "),
            ("MURMUR_REGISTRY_PATH", "/etc/murmur/registry.json"),
        ]))
        .unwrap();
        assert_eq!(config.num_topics, 8);
        assert!((config.no_above - 0.5).abs() < f64::EPSILON);
        assert_eq!(
            config.registry_path,
            Some(PathBuf::from("/etc/murmur/registry.json"))
        );
    }

    #[test]
    fn test_malformed_value_names_variable() {
        let err = Config::from_lookup(lookup(&[("MURMUR_PASSES", "many")])).unwrap_err();
        assert!(err.to_string().contains("MURMUR_PASSES"), "{err}");
    }

    #[test]
    fn test_validate_rejects_bad_ceiling() {
        let config = Config {
            no_above: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        let config = Config {
            num_topics: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cutoff_parsed_and_passed_through() {
        let config =
            Config::from_lookup(lookup(&[("MURMUR_CUTOFF", "2025-07-26 16:30")])).unwrap();
        let expected = chrono::NaiveDate::from_ymd_opt(2025, 7, 26)
            .unwrap()
            .and_hms_opt(16, 30, 0)
            .unwrap();
        assert_eq!(config.cutoff, Some(expected));
        assert_eq!(config.pipeline(false).cutoff, Some(expected));
        assert_eq!(parse_cutoff(" 2025-07-26 16:30:00 ").unwrap(), expected);

        let err = Config::from_lookup(lookup(&[("MURMUR_CUTOFF", "Jul 26")])).unwrap_err();
        assert!(err.to_string().contains("MURMUR_CUTOFF"), "{err}");
        assert_eq!(Config::default().cutoff, None);
    }

    #[test]
    fn test_keep_n_zero_disables_cap() {
        let config = Config {
            keep_n: 0,
            ..Config::default()
        };
        assert_eq!(config.pipeline(false).vocabulary.keep_n, None);
    }
}
