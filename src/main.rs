use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use murmur::config::{self, Config};
use murmur::corpus::extract::extract_documents;
use murmur::corpus::segment::Segmenter;
use murmur::lexicon::Lexicon;
use murmur::output::{json, terminal, truncate_chars};
use murmur::pipeline::orchestrator::{self, Source};

/// Murmur: latent topic extraction for forum post dumps.
///
/// Models each board dump on its own, then all of them together, and
/// reports each topic's top terms and how many posts it dominates.
#[derive(Parser)]
#[command(name = "murmur", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Model topics per dump file, then over all files combined
    Run {
        /// Dump files, one per board
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Print one JSON object per run instead of the terminal report
        #[arg(long)]
        json: bool,
    },

    /// Show what the extractor and segmenter make of a dump file
    Extract {
        file: PathBuf,

        /// Number of documents to preview (default: 3)
        #[arg(long, default_value = "3")]
        preview: usize,

        #[command(flatten)]
        lexicon: LexiconArgs,
    },
}

/// Flags that override the environment configuration.
#[derive(Args)]
struct Overrides {
    /// Number of topics
    #[arg(long)]
    topics: Option<usize>,

    /// Training passes over each corpus
    #[arg(long)]
    passes: Option<usize>,

    /// Random seed for model initialization
    #[arg(long)]
    seed: Option<u64>,

    /// Training worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Drop terms found in fewer documents than this
    #[arg(long)]
    no_below: Option<usize>,

    /// Drop terms found in more than this fraction of documents
    #[arg(long)]
    no_above: Option<f64>,

    /// Terms to list per topic
    #[arg(long)]
    top_terms: Option<usize>,

    /// Split entity mention counts at this time (YYYY-MM-DD HH:MM)
    #[arg(long)]
    cutoff: Option<String>,

    #[command(flatten)]
    lexicon: LexiconArgs,
}

#[derive(Args)]
struct LexiconArgs {
    /// Stopword file replacing the built-in list
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Registry JSON replacing the built-in entity/keyword registry
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Also filter common English stopwords
    #[arg(long)]
    english_stopwords: bool,
}

impl Overrides {
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(v) = self.topics {
            config.num_topics = v;
        }
        if let Some(v) = self.passes {
            config.passes = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.workers {
            config.workers = v;
        }
        if let Some(v) = self.no_below {
            config.no_below = v;
        }
        if let Some(v) = self.no_above {
            config.no_above = v;
        }
        if let Some(v) = self.top_terms {
            config.top_terms = v;
        }
        if let Some(raw) = &self.cutoff {
            config.cutoff = Some(config::parse_cutoff(raw).context("Invalid --cutoff")?);
        }
        self.lexicon.apply(config);
        Ok(())
    }
}

impl LexiconArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.stopwords {
            config.stopwords_path = Some(path.clone());
        }
        if let Some(path) = &self.registry {
            config.registry_path = Some(path.clone());
        }
    }

    fn load(&self, config: &Config) -> Result<Lexicon> {
        let lexicon = Lexicon::load(
            config.stopwords_path.as_deref(),
            config.registry_path.as_deref(),
        )?;
        Ok(if self.english_stopwords {
            lexicon.with_english_stopwords()
        } else {
            lexicon
        })
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("murmur=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            files,
            overrides,
            json: as_json,
        } => {
            let mut config = Config::load()?;
            overrides.apply(&mut config)?;
            config.validate()?;

            let lexicon = overrides.lexicon.load(&config)?;
            let segmenter = Segmenter::new(&lexicon)?;
            let pipeline = config.pipeline(!as_json);

            let sources: Vec<Source> = files.into_iter().map(Source::from_path).collect();
            info!(sources = sources.len(), "Starting topic analysis");

            let mut render_error = None;
            let outcomes = orchestrator::run_all(&sources, &segmenter, &pipeline, |outcome| {
                if as_json {
                    match json::outcome_line(outcome) {
                        Ok(line) => println!("{line}"),
                        Err(e) => {
                            render_error.get_or_insert(e);
                        }
                    }
                } else {
                    terminal::display_outcome(outcome);
                }
            });
            if let Some(e) = render_error {
                return Err(e.context("Failed to render a run outcome as JSON"));
            }

            let succeeded = outcomes.iter().filter(|o| o.report().is_some()).count();
            if !as_json {
                println!(
                    "\n{}",
                    format!(
                        "All runs finished: {succeeded} of {} produced a report.",
                        outcomes.len()
                    )
                    .bold()
                );
            }
        }

        Commands::Extract {
            file,
            preview,
            lexicon,
        } => {
            let mut config = Config::load()?;
            lexicon.apply(&mut config);
            let segmenter = Segmenter::new(&lexicon.load(&config)?)?;

            let dump = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let documents = extract_documents(&dump);

            println!(
                "{}",
                format!("{}: {} documents", file.display(), documents.len()).bold()
            );
            for (i, doc) in documents.iter().take(preview).enumerate() {
                let tokens = segmenter.tokenize(&doc.text);
                println!(
                    "\n  {}. {}",
                    i + 1,
                    doc.meta.title.as_deref().unwrap_or("(untitled)").bold()
                );
                println!("     {}", truncate_chars(&doc.text, 80).dimmed());
                println!(
                    "     {} tokens: {}",
                    tokens.len(),
                    truncate_chars(&tokens.join(" "), 120)
                );
            }
        }
    }

    Ok(())
}
