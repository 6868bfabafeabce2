//! Targeted Wordlist Generation
//!
//! Builds candidate wordlists for authorized password audits from an
//! organization name and/or a list of common words. Seeds pass through case,
//! separator, abbreviation, number, year and symbol variations, optional
//! leetspeak substitution and a small template grammar; the results are
//! merged, deduplicated, length-filtered and capped by one streaming
//! pipeline.
//!
//! Key concepts:
//! - [`CandidatePipeline`] is the only entry point that produces output. It
//!   validates its configuration up front and then streams unique candidates
//!   through a bounded queue.
//! - Bounded runs are a seeded uniform sample of the unique set. Unbounded
//!   runs are emitted in generation order and are reproducible.
//! - Collaborators (locale data, pattern files, keyword sources) degrade to
//!   warnings; only configuration errors stop a run.
//!
//! # Example
//!
//! ```yaml
//! # patterns.yaml
//! patterns:
//!   - "{company}@{year}"
//!   - "{word}{sep}{company}"
//! ```
//!
//! ```no_run
//! use wordforge::{CandidatePipeline, GeneratorConfig, LocaleData, PipelineInput};
//!
//! # async fn run() -> Result<(), wordforge::GenerateError> {
//! let input = PipelineInput::new()
//!     .with_identity("Acme Bank")
//!     .with_words(["admin", "welcome"])
//!     .with_templates(["{company}@{year}"])
//!     .with_locale(LocaleData::resolve("en"));
//!
//! let mut stream = CandidatePipeline::new(input, GeneratorConfig::default())?.spawn();
//! while let Some(candidate) = stream.next().await {
//!     println!("{candidate}");
//! }
//! let report = stream.finish().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod keywords;
pub mod leet;
pub mod locale;
pub mod patterns;
pub mod pipeline;
pub mod reconcile;
pub mod seasonal;
pub mod template;
pub mod variation;

pub use config::{CountLimit, GeneratorConfig};
pub use context::{CorporateContext, Industry};
pub use error::{
    ConfigError, GenerateError, KeywordError, LocaleError, PatternError, ReconcileError,
};
pub use keywords::{gather_keywords, HttpKeywordSource, KeywordConfig, KeywordSource};
pub use locale::LocaleData;
pub use patterns::{load_patterns, load_patterns_or_default, write_default_patterns, DEFAULT_PATTERNS};
pub use pipeline::{
    CancelHandle, CandidatePipeline, CandidateStream, PipelineInput, ProducerReport, Stage,
};
pub use reconcile::{default_output_path, Disposition, OutputReconciler, ReconcileSummary};
pub use template::{ExpansionContext, ExpansionResult, TemplateExpander, TokenKind};
pub use variation::VariationGenerator;
