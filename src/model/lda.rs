// Latent Dirichlet Allocation trained with batch variational Bayes.
//
// Each pass runs the E-step over the corpus split into one contiguous shard
// per worker. Workers accumulate their own sufficient statistics; the
// collect at the end of the parallel section is the pass barrier, after
// which the shard statistics are summed in shard order and the M-step
// replaces the topic-term parameters. Nothing else is shared.
//
// Reproducibility: with the same corpus, seed and worker count the model is
// bitwise identical. A different worker count changes how floating-point
// sums are grouped, so results then only agree within rounding.

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Gamma};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::bow::BagOfWords;
use super::math::{exp_dirichlet_expectation, exp_dirichlet_expectation_rows, mean_abs_difference, normalized};
use super::ModelError;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Number of topics K (default 5).
    pub num_topics: usize,
    /// Full passes over the corpus (default 15).
    pub passes: usize,
    pub seed: u64,
    /// Size of the worker pool for the E-step (default 4).
    pub workers: usize,
    /// Upper bound on per-document variational iterations (default 50).
    pub inference_iterations: usize,
    /// Per-document convergence threshold on mean |Δγ| (default 0.001).
    pub gamma_threshold: f64,
    /// Draw a progress bar over passes.
    pub show_progress: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_topics: 5,
            passes: 15,
            seed: 42,
            workers: 4,
            inference_iterations: 50,
            gamma_threshold: 0.001,
            show_progress: false,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.num_topics == 0 {
            return Err(ModelError::InvalidConfig("num_topics must be at least 1".into()));
        }
        if self.passes == 0 {
            return Err(ModelError::InvalidConfig("passes must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(ModelError::InvalidConfig("workers must be at least 1".into()));
        }
        Ok(())
    }
}

/// A topic-probability vector for one document; sums to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicDistribution(pub Vec<f64>);

impl TopicDistribution {
    /// Index of the most probable topic, lowest index on ties.
    pub fn dominant_topic(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (topic, &p) in self.0.iter().enumerate() {
            if p.is_nan() {
                continue;
            }
            match best {
                Some((_, max)) if p <= max => {}
                _ => best = Some((topic, p)),
            }
        }
        best.map(|(topic, _)| topic)
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.0
    }
}

/// A trained model. Immutable once training returns.
#[derive(Debug, Clone)]
pub struct TopicModel {
    /// Row k is topic k's distribution over term ids.
    topic_terms: Vec<Vec<f64>>,
    exp_elog_beta: Vec<Vec<f64>>,
    alpha: Vec<f64>,
    inference_iterations: usize,
    gamma_threshold: f64,
}

impl TopicModel {
    pub fn num_topics(&self) -> usize {
        self.topic_terms.len()
    }

    pub fn num_terms(&self) -> usize {
        self.topic_terms.first().map_or(0, Vec::len)
    }

    /// Topic `topic`'s probability over every term id.
    pub fn topic_terms(&self, topic: usize) -> &[f64] {
        &self.topic_terms[topic]
    }

    /// The `n` most probable term ids of a topic, most probable first.
    pub fn top_terms(&self, topic: usize, n: usize) -> Vec<(u32, f64)> {
        let mut ranked: Vec<(u32, f64)> = self.topic_terms[topic]
            .iter()
            .enumerate()
            .map(|(id, &p)| (id as u32, p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    /// Infer a document's topic mixture. Every topic is reported, however small.
    pub fn infer(&self, bow: &BagOfWords) -> TopicDistribution {
        let state = infer_document(
            bow,
            &self.exp_elog_beta,
            &self.alpha,
            self.inference_iterations,
            self.gamma_threshold,
        );
        TopicDistribution(normalized(&state.gamma))
    }
}

/// Variational state of one document after inference.
struct DocumentState {
    gamma: Vec<f64>,
    exp_elog_theta: Vec<f64>,
    phinorm: Vec<f64>,
}

fn phinorm(bow: &BagOfWords, exp_elog_theta: &[f64], exp_elog_beta: &[Vec<f64>]) -> Vec<f64> {
    bow.iter()
        .map(|&(id, _)| {
            exp_elog_theta
                .iter()
                .zip(exp_elog_beta)
                .map(|(theta, beta)| theta * beta[id as usize])
                .sum::<f64>()
                + 1e-100
        })
        .collect()
}

fn infer_document(
    bow: &BagOfWords,
    exp_elog_beta: &[Vec<f64>],
    alpha: &[f64],
    max_iterations: usize,
    threshold: f64,
) -> DocumentState {
    let k = alpha.len();
    let length = bow.total() as f64;
    let mut gamma: Vec<f64> = alpha.iter().map(|a| a + length / k as f64).collect();
    let mut exp_elog_theta = exp_dirichlet_expectation(&gamma);
    let mut norm = phinorm(bow, &exp_elog_theta, exp_elog_beta);

    for _ in 0..max_iterations {
        let previous = gamma.clone();
        for topic in 0..k {
            let weighted: f64 = bow
                .iter()
                .zip(&norm)
                .map(|(&(id, count), n)| count as f64 / n * exp_elog_beta[topic][id as usize])
                .sum();
            gamma[topic] = alpha[topic] + exp_elog_theta[topic] * weighted;
        }
        exp_elog_theta = exp_dirichlet_expectation(&gamma);
        norm = phinorm(bow, &exp_elog_theta, exp_elog_beta);
        if mean_abs_difference(&gamma, &previous) < threshold {
            break;
        }
    }

    DocumentState {
        gamma,
        exp_elog_theta,
        phinorm: norm,
    }
}

/// E-step over one shard: the shard's unscaled sufficient statistics.
fn shard_statistics(
    shard: &[BagOfWords],
    exp_elog_beta: &[Vec<f64>],
    alpha: &[f64],
    config: &TrainerConfig,
    num_terms: usize,
) -> Vec<Vec<f64>> {
    let mut sstats = vec![vec![0.0; num_terms]; alpha.len()];
    for bow in shard {
        let state = infer_document(
            bow,
            exp_elog_beta,
            alpha,
            config.inference_iterations,
            config.gamma_threshold,
        );
        for (topic, row) in sstats.iter_mut().enumerate() {
            let theta = state.exp_elog_theta[topic];
            for (&(id, count), n) in bow.iter().zip(&state.phinorm) {
                row[id as usize] += theta * count as f64 / n;
            }
        }
    }
    sstats
}

/// Fit a K-topic model over `corpus`, whose term ids index a vocabulary of
/// `num_terms` entries.
pub fn train(
    corpus: &[BagOfWords],
    num_terms: usize,
    config: &TrainerConfig,
) -> Result<TopicModel, ModelError> {
    config.validate()?;
    if num_terms == 0 {
        return Err(ModelError::EmptyVocabulary);
    }
    if corpus.is_empty() {
        return Err(ModelError::EmptyCorpus);
    }

    let k = config.num_topics;
    let prior = 1.0 / k as f64;
    let alpha = vec![prior; k];
    let eta = prior;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let init = Gamma::new(100.0, 0.01).map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
    let mut lambda: Vec<Vec<f64>> = (0..k)
        .map(|_| (0..num_terms).map(|_| init.sample(&mut rng)).collect())
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;
    let shard_len = corpus.len().div_ceil(config.workers);

    info!(
        documents = corpus.len(),
        terms = num_terms,
        topics = k,
        passes = config.passes,
        workers = config.workers,
        "Training topic model"
    );

    let progress = if config.show_progress {
        let pb = ProgressBar::new(config.passes as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("  Training [{bar:30}] pass {pos}/{len} ({eta})") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    for pass in 0..config.passes {
        let exp_elog_beta = exp_dirichlet_expectation_rows(&lambda);

        let shards: Vec<Vec<Vec<f64>>> = pool.install(|| {
            corpus
                .par_chunks(shard_len)
                .map(|shard| shard_statistics(shard, &exp_elog_beta, &alpha, config, num_terms))
                .collect()
        });

        let mut sstats = vec![vec![0.0; num_terms]; k];
        for shard in &shards {
            for (total, local) in sstats.iter_mut().zip(shard) {
                for (t, l) in total.iter_mut().zip(local) {
                    *t += l;
                }
            }
        }

        let mut change = 0.0;
        for topic in 0..k {
            let updated: Vec<f64> = sstats[topic]
                .iter()
                .zip(&exp_elog_beta[topic])
                .map(|(s, beta)| eta + s * beta)
                .collect();
            change += mean_abs_difference(&updated, &lambda[topic]);
            lambda[topic] = updated;
        }

        debug!(pass = pass + 1, mean_change = change / k as f64, "Pass complete");
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(TopicModel {
        topic_terms: lambda.iter().map(|row| normalized(row)).collect(),
        exp_elog_beta: exp_dirichlet_expectation_rows(&lambda),
        alpha,
        inference_iterations: config.inference_iterations,
        gamma_threshold: config.gamma_threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(k: usize) -> TrainerConfig {
        TrainerConfig {
            num_topics: k,
            passes: 10,
            workers: 2,
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn test_dominant_topic_ties_go_to_lowest_index() {
        assert_eq!(TopicDistribution(vec![0.4, 0.4, 0.2]).dominant_topic(), Some(0));
        assert_eq!(TopicDistribution(vec![0.1, 0.45, 0.45]).dominant_topic(), Some(1));
        assert_eq!(TopicDistribution(vec![]).dominant_topic(), None);
    }

    #[test]
    fn test_rows_are_distributions() {
        let corpus = vec![
            BagOfWords(vec![(0, 3), (1, 1)]),
            BagOfWords(vec![(2, 2), (3, 4)]),
            BagOfWords(vec![(0, 1), (3, 1)]),
        ];
        let model = train(&corpus, 4, &config(2)).unwrap();
        assert_eq!(model.num_topics(), 2);
        assert_eq!(model.num_terms(), 4);
        for topic in 0..2 {
            let sum: f64 = model.topic_terms(topic).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_inferred_distribution_sums_to_one() {
        let corpus = vec![BagOfWords(vec![(0, 2)]), BagOfWords(vec![(1, 5)])];
        let model = train(&corpus, 2, &config(3)).unwrap();
        for bow in &corpus {
            let dist = model.infer(bow);
            assert_eq!(dist.0.len(), 3);
            assert!((dist.0.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_top_terms_most_probable_first() {
        let corpus = vec![BagOfWords(vec![(0, 1), (1, 9)]), BagOfWords(vec![(1, 8), (2, 1)])];
        let model = train(&corpus, 3, &config(1)).unwrap();
        let top = model.top_terms(0, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, 1);
        assert!(top[0].1 >= top[1].1);
    }

    #[test]
    fn test_same_seed_same_model() {
        let corpus: Vec<BagOfWords> = (0..12)
            .map(|i| BagOfWords(vec![(i % 4, 2), ((i + 1) % 4, 1)]))
            .collect();
        let a = train(&corpus, 4, &config(2)).unwrap();
        let b = train(&corpus, 4, &config(2)).unwrap();
        for topic in 0..2 {
            assert_eq!(a.topic_terms(topic), b.topic_terms(topic));
        }
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        assert!(matches!(train(&[], 3, &config(2)), Err(ModelError::EmptyCorpus)));
        let corpus = vec![BagOfWords(vec![(0, 1)])];
        assert!(matches!(train(&corpus, 0, &config(2)), Err(ModelError::EmptyVocabulary)));
        assert!(matches!(train(&corpus, 1, &config(0)), Err(ModelError::InvalidConfig(_))));
    }
}
