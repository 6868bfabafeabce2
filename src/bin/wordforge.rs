//! wordforge - targeted wordlist generator
//!
//! # Usage
//!
//! ```bash
//! # Organization-based list, default limit, shuffled
//! wordforge generate --company "Acme Bank" --words admin,welcome
//!
//! # Full deterministic enumeration with leetspeak, to stdout
//! wordforge generate --company acme --all --leet --yes --stdout
//!
//! # Seed words from the target's website
//! wordforge generate --company acme --url acme.example
//!
//! # Write a starter patterns.yaml
//! wordforge init
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wordforge::patterns::DEFAULT_PATTERNS_FILE;
use wordforge::{
    default_output_path, gather_keywords, load_patterns_or_default, write_default_patterns,
    CandidatePipeline, CandidateStream, CountLimit, GeneratorConfig, HttpKeywordSource,
    KeywordConfig, LocaleData, OutputReconciler, PipelineInput,
};

/// Log a progress line every this many candidates.
const PROGRESS_EVERY: usize = 100_000;

#[derive(Parser)]
#[command(name = "wordforge")]
#[command(version)]
#[command(about = "Targeted wordlist generator for authorized password audits")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a wordlist
    Generate(GenerateArgs),

    /// Write a default patterns file if none exists
    Init {
        /// File to create
        #[arg(long, default_value = DEFAULT_PATTERNS_FILE)]
        path: PathBuf,
    },

    /// Print version information
    Version,
}

#[derive(Args)]
struct GenerateArgs {
    /// Organization name
    #[arg(short, long)]
    company: Option<String>,

    /// Common words, comma separated
    #[arg(short, long, value_delimiter = ',')]
    words: Vec<String>,

    /// Template pattern, e.g. "{company}@{year}" (repeatable)
    #[arg(short, long)]
    template: Vec<String>,

    /// YAML file with a `patterns` list [default: patterns.yaml]
    #[arg(short = 'P', long)]
    patterns_file: Option<PathBuf>,

    /// Target URL to harvest seed words from
    #[arg(long)]
    url: Option<String>,

    /// Locale for common words, seasons and months (en, pt-br)
    #[arg(long, default_value = "en")]
    lang: String,

    /// YAML generator config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    min_length: Option<usize>,

    #[arg(long)]
    max_length: Option<usize>,

    #[arg(long)]
    min_year: Option<i32>,

    #[arg(long)]
    max_year: Option<i32>,

    /// Maximum number of candidates
    #[arg(short = 'm', long)]
    max_passwords: Option<usize>,

    /// Every combination, unshuffled, no limit
    #[arg(long)]
    all: bool,

    /// Enable leetspeak substitution
    #[arg(short, long)]
    leet: bool,

    /// Shuffle seed, for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Output file [default: wordlist_<company>.txt]
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write candidates to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Do not ask for confirmation before an unbounded run
    #[arg(short, long)]
    yes: bool,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "wordforge=debug"
    } else {
        "wordforge=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Command::Generate(args) => cmd_generate(args).await,
        Command::Init { path } => cmd_init(path),
        Command::Version => {
            println!(
                "wordforge {} ({}-{})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            );
            Ok(())
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

fn cmd_init(path: PathBuf) -> Result<()> {
    let created = write_default_patterns(&path)
        .with_context(|| format!("Failed to initialize {}", path.display()))?;
    if created {
        tracing::info!(path = %path.display(), "Default patterns file created");
    } else {
        tracing::info!(path = %path.display(), "Patterns file already exists, nothing to do");
    }
    Ok(())
}

async fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let config = build_config(&args)?;

    let mut words = args.words.clone();
    if let Some(url) = &args.url {
        let source = HttpKeywordSource::new(KeywordConfig::default())
            .context("Failed to create HTTP client")?;
        words.extend(gather_keywords(&source, url).await);
    }

    let locale = LocaleData::resolve(&args.lang);
    words.extend(locale.common_words.iter().cloned());

    let mut templates = args.template.clone();
    let explicit = args.patterns_file.is_some();
    let patterns_path = args
        .patterns_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATTERNS_FILE));
    templates.extend(
        load_patterns_or_default(&patterns_path, explicit)
            .with_context(|| format!("Failed to load patterns from {}", patterns_path.display()))?,
    );

    let mut input = PipelineInput::new()
        .with_words(words)
        .with_templates(templates)
        .with_locale(locale);
    if let Some(company) = &args.company {
        input = input.with_identity(company.clone());
    }

    let unbounded = config.is_unbounded();
    let pipeline = CandidatePipeline::new(input, config).context("Invalid generation settings")?;

    if unbounded && !args.yes && !confirm_unbounded()? {
        tracing::info!("Cancelled by user");
        return Ok(());
    }

    tracing::info!(seed = pipeline.seed(), unbounded, "Starting generation");
    let started = std::time::Instant::now();

    let mut stream = pipeline.spawn();
    let cancel = stream.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping generation");
            cancel.cancel();
        }
    });

    if args.stdout {
        write_stdout(&mut stream).await?;
    } else {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(args.company.as_deref()));
        write_reconciled(&mut stream, path).await?;
    }

    let report = stream.finish().await?;
    tracing::info!(
        emitted = report.emitted,
        generated = report.generated(),
        duplicates = report.duplicates,
        rejected_length = report.rejected_length,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Generation complete"
    );
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// File config (or defaults) with command-line overrides applied.
fn build_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    if let Some(v) = args.min_length {
        config.min_length = v;
    }
    if let Some(v) = args.max_length {
        config.max_length = v;
    }
    if let Some(v) = args.min_year {
        config.min_year = v;
    }
    if let Some(v) = args.max_year {
        config.max_year = v;
    }
    if let Some(v) = args.max_passwords {
        config.limit = CountLimit::Bounded(v);
    }
    if args.all {
        config.limit = CountLimit::Unbounded;
    }
    if args.leet {
        config.leet = true;
    }
    if args.seed.is_some() {
        config.shuffle_seed = args.seed;
    }
    Ok(config)
}

fn confirm_unbounded() -> Result<bool> {
    let mut stderr = io::stderr();
    writeln!(
        stderr,
        "\nUnbounded mode generates every combination. Output can reach gigabytes and take a long time."
    )?;
    write!(stderr, "Continue? [Y/n]: ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "" | "y" | "yes" | "s" | "sim"
    ))
}

async fn write_stdout(stream: &mut CandidateStream) -> Result<()> {
    let mut out = BufWriter::new(io::stdout());
    while let Some(candidate) = stream.next().await {
        match writeln!(out, "{}", candidate) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                // reader closed the pipe (e.g. `| head`)
                stream.cancel();
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to write to stdout"),
        }
    }
    match out.flush() {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e).context("Failed to flush stdout"),
        _ => Ok(()),
    }
}

async fn write_reconciled(stream: &mut CandidateStream, path: PathBuf) -> Result<()> {
    let mut reconciler = OutputReconciler::open(&path)
        .with_context(|| format!("Failed to open output {}", path.display()))?;

    let mut count = 0usize;
    while let Some(candidate) = stream.next().await {
        reconciler.record(&candidate)?;
        count += 1;
        if count % PROGRESS_EVERY == 0 {
            tracing::info!(processed = count, "Generating");
        }
    }

    let summary = reconciler.finish()?;
    tracing::info!(
        path = %path.display(),
        processed = summary.processed,
        new = summary.new,
        known = summary.known,
        "Wordlist updated"
    );
    if let Some(new_file) = &summary.new_file {
        tracing::info!(path = %new_file.display(), new = summary.new, "New candidates saved");
    }
    Ok(())
}
