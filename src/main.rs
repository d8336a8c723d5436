use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use ankitag::core::config::{
    RunConfig, DEFAULT_BATCH_SIZE, DEFAULT_ENDPOINT, DEFAULT_NOTE_FIELD, DEFAULT_QUERY,
    DEFAULT_THRESHOLD, DEFAULT_WORKERS,
};
use ankitag::document::extract::PlainTextSource;
use ankitag::embed::embedder::DEFAULT_MODEL_HF;
use ankitag::embed::{Embedder, Model2VecEmbedder};
use ankitag::pipeline;
use ankitag::store::{AnkiConnectStore, NoteStore};

#[derive(Parser)]
#[command(name = "ankitag")]
#[command(about = "Tag Anki notes that are semantically relevant to a reference document", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the reference document (UTF-8 text or Markdown)
    #[arg(value_parser = parse_existing_file)]
    document: PathBuf,

    /// Tag to apply to relevant notes
    tag: String,

    /// Number of batches scored concurrently
    #[arg(long, default_value_t = DEFAULT_WORKERS, value_parser = parse_positive)]
    workers: usize,

    /// Notes fetched and scored per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_positive)]
    batch_size: usize,

    /// Minimum cosine similarity for a note to count as relevant
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    threshold: f32,

    /// Anki search query selecting the notes to consider
    #[arg(long, default_value = DEFAULT_QUERY)]
    query: String,

    /// Note field whose text is scored
    #[arg(long, default_value = DEFAULT_NOTE_FIELD)]
    field: String,

    /// AnkiConnect endpoint URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Model2Vec model id or local path
    #[arg(long, default_value = DEFAULT_MODEL_HF)]
    model: String,

    /// Suppress the progress bar
    #[arg(long, short)]
    quiet: bool,
}

fn parse_positive(value: &str) -> Result<usize, String> {
    let parsed: usize = value
        .parse()
        .map_err(|_| format!("{value} is not an integer"))?;
    if parsed == 0 {
        return Err(format!("{value} is not a positive integer"));
    }
    Ok(parsed)
}

fn parse_threshold(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|_| format!("{value} is not a number"))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(format!("{value} is not a threshold between 0.0 and 1.0"));
    }
    Ok(parsed)
}

fn parse_existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("the file {value} does not exist"));
    }
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = RunConfig {
        document: cli.document,
        tag: cli.tag,
        workers: cli.workers,
        batch_size: cli.batch_size,
        threshold: cli.threshold,
        query: cli.query,
        note_field: cli.field,
        endpoint: cli.endpoint,
        model_id: cli.model,
    };
    config.validate()?;

    if !cli.quiet {
        println!(
            "{} Loading embedding model: {}",
            "→".dimmed(),
            config.model_id.cyan()
        );
    }
    let embedder: Arc<dyn Embedder> = Arc::new(Model2VecEmbedder::load(&config.model_id)?);
    let store: Arc<dyn NoteStore> =
        Arc::new(AnkiConnectStore::new(&config.endpoint, &config.note_field)?);

    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
            .with_style(
                ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} batches")
                    .expect("progress template is valid"),
            )
            .with_message("Scoring notes")
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(pipeline::run(
        &config,
        &PlainTextSource,
        embedder,
        store,
        &progress,
    ))?;
    progress.finish_and_clear();

    if !cli.quiet {
        println!(
            "  {} {} document sentences, {} candidate notes in {} batches",
            "→".dimmed(),
            summary.sentences,
            summary.universe,
            summary.batches
        );
    }
    println!(
        "{} added tag \"{}\" to {} notes",
        "✓".green().bold(),
        config.tag.cyan(),
        summary.tagged.to_string().cyan()
    );
    if summary.failed_batches > 0 {
        eprintln!(
            "{} {} of {} batches failed; the tagged set may be incomplete",
            "!".yellow().bold(),
            summary.failed_batches,
            summary.batches
        );
    }

    Ok(())
}
