//! Candidate Pipeline
//!
//! Orchestrates every generator into one stream of unique candidates:
//!
//! ```text
//! identity ─┐
//! words ────┤
//! seasonal ─┤  blocking      batches    ┌──────────────┐   mpsc(10_000)
//! combos ───┼─ generator ─────────────► │ length/dedup │ ─────────────► consumer
//! templates ┤  (sampled unless          │ ceiling      │
//! leet ─────┘   unbounded)              └──────────────┘
//!                                            ▲ watch(cancel)
//! ```
//!
//! In bounded mode every raw candidate is offered to a [`PrioritySample`]:
//! each distinct in-length candidate gets a priority hashed from a seeded
//! key, and the `ceiling` lowest priorities are kept and emitted in priority
//! order. That is a uniform shuffle of the unique set truncated to the
//! ceiling, held in memory proportional to the ceiling rather than to the
//! whole set. In unbounded mode stages are emitted in order, batch by batch,
//! and two runs with the same input produce the same sequence.
//!
//! The only error a run can report is a configuration error, raised by
//! [`CandidatePipeline::new`] before generation starts.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::GeneratorConfig;
use crate::context::CorporateContext;
use crate::error::{ConfigError, GenerateError};
use crate::leet;
use crate::locale::LocaleData;
use crate::seasonal::seasonal_candidates;
use crate::template::{ExpansionContext, TemplateExpander};
use crate::variation::VariationGenerator;

/// Capacity of the candidate queue between producer and consumer.
pub const QUEUE_CAPACITY: usize = 10_000;

/// Batches in flight between the blocking generator and the emitter.
const BATCH_QUEUE_CAPACITY: usize = 4;

/// Sampled candidates are handed to the emitter in chunks of this size.
const CHUNK_SIZE: usize = 4096;

/// Seed for unbounded runs without an explicit one, so full enumeration is
/// reproducible (the seed still drives the founding-year estimate).
const UNBOUNDED_SEED: u64 = 0;

type Batches<'a> = Box<dyn Iterator<Item = Vec<String>> + 'a>;

fn no_batches<'a>() -> Batches<'a> {
    Box::new(std::iter::empty())
}

// =============================================================================
// STAGES
// =============================================================================

/// Generation stages, in emission order for unbounded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Identity,
    Words,
    Seasonal,
    Combinations,
    Templates,
    Leet,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Identity,
        Stage::Words,
        Stage::Seasonal,
        Stage::Combinations,
        Stage::Templates,
        Stage::Leet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Identity => "identity",
            Stage::Words => "words",
            Stage::Seasonal => "seasonal",
            Stage::Combinations => "combinations",
            Stage::Templates => "templates",
            Stage::Leet => "leet",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw (pre-filter) output size of one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub generated: usize,
}

/// Summary of a finished (or cancelled) run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerReport {
    pub stages: Vec<StageReport>,
    /// Candidates delivered to the queue
    pub emitted: usize,
    /// Rejected by the length bound
    pub rejected_length: usize,
    /// Rejected as repeats
    pub duplicates: usize,
    /// The count ceiling stopped the run
    pub ceiling_reached: bool,
    /// The run was cancelled or the consumer went away
    pub cancelled: bool,
}

/// What the blocking generator reports back to the emitter.
#[derive(Debug, Default)]
struct GeneratorSummary {
    stages: Vec<StageReport>,
    /// Length rejections made while sampling (bounded mode only)
    rejected_length: usize,
}

impl ProducerReport {
    /// Total raw candidates produced by all stages.
    pub fn generated(&self) -> usize {
        self.stages.iter().map(|s| s.generated).sum()
    }
}

// =============================================================================
// INPUT
// =============================================================================

/// Seed data for one run
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    /// Organization name
    pub identity: Option<String>,
    /// Common words, in caller order
    pub words: Vec<String>,
    /// Template patterns
    pub templates: Vec<String>,
    pub locale: LocaleData,
}

impl PipelineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates = templates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_locale(mut self, locale: LocaleData) -> Self {
        self.locale = locale;
        self
    }

    /// Trimmed identity, `None` when blank.
    fn identity(&self) -> Option<String> {
        self.identity
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Trimmed words, blanks dropped.
    fn words(&self) -> Vec<String> {
        self.words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// =============================================================================
// FILTER
// =============================================================================

/// Length bound, run-scoped dedup set and count ceiling.
#[derive(Debug)]
pub struct CandidateFilter {
    min_length: usize,
    max_length: usize,
    ceiling: Option<usize>,
    seen: HashSet<String>,
    admitted: usize,
    rejected_length: usize,
    duplicates: usize,
}

impl CandidateFilter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            min_length: config.min_length,
            max_length: config.max_length,
            ceiling: config.ceiling(),
            seen: HashSet::new(),
            admitted: 0,
            rejected_length: 0,
            duplicates: 0,
        }
    }

    /// Decide whether `candidate` may be emitted. Admitted candidates are
    /// remembered so a byte-identical repeat is rejected later.
    pub fn admit(&mut self, candidate: &str) -> bool {
        if self.is_exhausted() {
            return false;
        }
        let len = candidate.chars().count();
        if len < self.min_length || len > self.max_length {
            self.rejected_length += 1;
            return false;
        }
        if !self.seen.insert(candidate.to_string()) {
            self.duplicates += 1;
            return false;
        }
        self.admitted += 1;
        true
    }

    /// True once the ceiling has been reached. Never true in unbounded mode.
    pub fn is_exhausted(&self) -> bool {
        self.ceiling.is_some_and(|n| self.admitted >= n)
    }

    pub fn admitted(&self) -> usize {
        self.admitted
    }
}

/// Bounded-memory uniform sample of distinct candidates.
///
/// Keeps the `capacity` in-length candidates with the lowest keyed hash.
/// Repeats hash to the same priority, so every distinct candidate has the
/// same chance of being kept no matter how often it is generated.
#[derive(Debug)]
pub struct PrioritySample {
    capacity: usize,
    key: u64,
    min_length: usize,
    max_length: usize,
    heap: BinaryHeap<(u64, String)>,
    members: HashSet<String>,
    rejected_length: usize,
}

impl PrioritySample {
    pub fn new(capacity: usize, key: u64, config: &GeneratorConfig) -> Self {
        Self {
            capacity,
            key,
            min_length: config.min_length,
            max_length: config.max_length,
            heap: BinaryHeap::new(),
            members: HashSet::new(),
            rejected_length: 0,
        }
    }

    fn priority(&self, candidate: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.key.hash(&mut hasher);
        candidate.hash(&mut hasher);
        hasher.finish()
    }

    pub fn offer(&mut self, candidate: String) {
        let len = candidate.chars().count();
        if len < self.min_length || len > self.max_length {
            self.rejected_length += 1;
            return;
        }
        if self.members.contains(&candidate) {
            return;
        }

        let priority = self.priority(&candidate);
        if self.heap.len() >= self.capacity {
            let outranks = self
                .heap
                .peek()
                .is_some_and(|(top, top_candidate)| (priority, &candidate) < (*top, top_candidate));
            if !outranks {
                return;
            }
            if let Some((_, evicted)) = self.heap.pop() {
                self.members.remove(&evicted);
            }
        }
        self.members.insert(candidate.clone());
        self.heap.push((priority, candidate));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Kept candidates, lowest priority first.
    pub fn into_ordered(self) -> Vec<String> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|(_, candidate)| candidate)
            .collect()
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// A validated, ready-to-run generation job.
pub struct CandidatePipeline {
    identity: Option<String>,
    words: Vec<String>,
    templates: Vec<String>,
    locale: LocaleData,
    config: GeneratorConfig,
    reference_date: NaiveDate,
    seed: u64,
    rng: StdRng,
    context: Option<CorporateContext>,
    variations: VariationGenerator,
}

impl CandidatePipeline {
    /// Validate the configuration and derive the per-run context.
    ///
    /// Fails with [`ConfigError::NoSeedSource`] when neither an identity nor
    /// a non-blank word is supplied.
    pub fn new(input: PipelineInput, config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let identity = input.identity();
        let words = input.words();
        if identity.is_none() && words.is_empty() {
            return Err(ConfigError::NoSeedSource);
        }

        let seed = match config.shuffle_seed {
            Some(seed) => seed,
            None if config.is_unbounded() => UNBOUNDED_SEED,
            None => time_seed(),
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let context = identity
            .as_deref()
            .map(|id| CorporateContext::build(id, rng.gen()));

        let variations = VariationGenerator::new(config.years())
            .with_locale_suffixes(input.locale.common_suffixes.clone());

        tracing::debug!(
            seed,
            identity = identity.as_deref().unwrap_or(""),
            words = words.len(),
            templates = input.templates.len(),
            unbounded = config.is_unbounded(),
            leet = config.leet,
            "Pipeline configured"
        );

        Ok(Self {
            identity,
            words,
            templates: input.templates,
            locale: input.locale,
            config,
            reference_date: chrono::Local::now().date_naive(),
            seed,
            rng,
            context,
            variations,
        })
    }

    /// Date the seasonal stage is computed for (default: today).
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    /// Seed actually used for shuffling, for reproducing a run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn corporate_context(&self) -> Option<&CorporateContext> {
        self.context.as_ref()
    }

    /// Stages that apply to this input.
    pub fn active_stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| match stage {
                Stage::Identity => self.identity.is_some(),
                Stage::Words => !self.words.is_empty(),
                Stage::Seasonal => true,
                Stage::Combinations => self.identity.is_some() && !self.words.is_empty(),
                Stage::Templates => !self.templates.is_empty(),
                Stage::Leet => self.config.leet,
            })
            .collect()
    }

    /// Raw output of one stage, unfiltered and in generation order.
    pub fn stage_candidates(&self, stage: Stage) -> Vec<String> {
        self.stage_batches(stage).flatten().collect()
    }

    fn stage_batches(&self, stage: Stage) -> Batches<'_> {
        match stage {
            Stage::Identity => match (&self.identity, &self.context) {
                (Some(identity), Some(context)) => {
                    let mut batch = self.variations.identity_variations(identity);
                    batch.extend(self.variations.identity_passwords(identity, context));
                    Box::new(std::iter::once(batch))
                }
                _ => no_batches(),
            },
            Stage::Words => Box::new(
                self.words
                    .iter()
                    .map(move |w| self.variations.word_passwords(w)),
            ),
            Stage::Seasonal => Box::new(std::iter::once(seasonal_candidates(
                &self.locale,
                self.reference_date,
            ))),
            Stage::Combinations => match &self.identity {
                Some(identity) if !self.words.is_empty() => Box::new(std::iter::once(
                    self.variations
                        .identity_word_combinations(identity, &self.words),
                )),
                _ => no_batches(),
            },
            Stage::Templates => {
                if self.templates.is_empty() {
                    return no_batches();
                }
                let expander = self.template_expander();
                Box::new(
                    self.templates
                        .iter()
                        .map(move |t| expander.expand(t).candidates),
                )
            }
            Stage::Leet => {
                if !self.config.leet {
                    return no_batches();
                }
                let forms = self.leet_forms();
                tracing::debug!(forms = forms.len(), "Leet forms expanded");
                let decorated = forms.clone();
                Box::new(
                    std::iter::once(forms).chain(
                        decorated
                            .into_iter()
                            .map(move |form| self.variations.word_passwords(&form)),
                    ),
                )
            }
        }
    }

    fn template_expander(&self) -> TemplateExpander {
        let mut context = ExpansionContext::new()
            .with_words(self.words.clone())
            .with_years(self.config.years())
            .with_locale(self.locale.clone());
        if let Some(identity) = &self.identity {
            context = context.with_identity(identity.clone());
        }
        TemplateExpander::new(context)
    }

    /// Leet variants of every identity variation and every word.
    fn leet_forms(&self) -> Vec<String> {
        let mut bases = self
            .identity
            .as_deref()
            .map(|id| self.variations.identity_variations(id))
            .unwrap_or_default();
        bases.extend(self.words.iter().cloned());
        leet::expand_all(bases.iter().map(String::as_str))
    }

    /// Run every active stage, handing batches to `sink` until it returns
    /// `false`. Bounded runs are sampled down to the ceiling first, polling
    /// `stopped` between batches.
    fn generate(
        &self,
        sink: impl FnMut(Vec<String>) -> bool,
        stopped: impl Fn() -> bool,
    ) -> GeneratorSummary {
        match self.config.ceiling() {
            Some(ceiling) => self.generate_sample(ceiling, sink, stopped),
            None => self.generate_in_order(sink),
        }
    }

    fn generate_in_order(&self, mut sink: impl FnMut(Vec<String>) -> bool) -> GeneratorSummary {
        let mut summary = GeneratorSummary::default();
        'stages: for stage in self.active_stages() {
            let mut generated = 0;
            for batch in self.stage_batches(stage) {
                generated += batch.len();
                if !sink(batch) {
                    summary.stages.push(StageReport { stage, generated });
                    break 'stages;
                }
            }
            tracing::debug!(stage = %stage, generated, "Stage emitted");
            summary.stages.push(StageReport { stage, generated });
        }
        summary
    }

    fn generate_sample(
        &self,
        ceiling: usize,
        mut sink: impl FnMut(Vec<String>) -> bool,
        stopped: impl Fn() -> bool,
    ) -> GeneratorSummary {
        let mut rng = self.rng.clone();
        let mut sample = PrioritySample::new(ceiling, rng.gen(), &self.config);
        let mut summary = GeneratorSummary::default();

        for stage in self.active_stages() {
            let mut generated = 0;
            for batch in self.stage_batches(stage) {
                if stopped() {
                    summary.stages.push(StageReport { stage, generated });
                    return summary;
                }
                generated += batch.len();
                for candidate in batch {
                    sample.offer(candidate);
                }
            }
            tracing::debug!(stage = %stage, generated, sampled = sample.len(), "Stage sampled");
            summary.stages.push(StageReport { stage, generated });
        }
        summary.rejected_length = sample.rejected_length;

        let mut remaining = sample.into_ordered().into_iter();
        loop {
            let chunk: Vec<String> = remaining.by_ref().take(CHUNK_SIZE).collect();
            if chunk.is_empty() || !sink(chunk) {
                break;
            }
        }
        summary
    }

    /// Start the producer. Candidates arrive on the returned stream one at a
    /// time, in FIFO order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> CandidateStream {
        let (tx, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(produce(self, tx, cancel_rx));
        CandidateStream {
            receiver,
            cancel: CancelHandle(Arc::new(cancel_tx)),
            task,
        }
    }

    /// Run to completion and collect every emitted candidate.
    pub async fn collect(self) -> Result<(Vec<String>, ProducerReport), GenerateError> {
        let mut stream = self.spawn();
        let mut candidates = Vec::new();
        while let Some(candidate) = stream.next().await {
            candidates.push(candidate);
        }
        let report = stream.finish().await?;
        Ok((candidates, report))
    }
}

fn time_seed() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .map(|n| n as u64)
        .unwrap_or_default()
}

// =============================================================================
// PRODUCER
// =============================================================================

async fn produce(
    pipeline: CandidatePipeline,
    tx: mpsc::Sender<String>,
    mut cancel_rx: watch::Receiver<bool>,
) -> Result<ProducerReport, GenerateError> {
    let mut filter = CandidateFilter::new(&pipeline.config);
    let (batch_tx, mut batch_rx) = mpsc::channel::<Vec<String>>(BATCH_QUEUE_CAPACITY);

    let generator = tokio::task::spawn_blocking(move || {
        pipeline.generate(
            |batch| batch_tx.blocking_send(batch).is_ok(),
            || batch_tx.is_closed(),
        )
    });

    let mut report = ProducerReport::default();

    'batches: loop {
        if *cancel_rx.borrow() {
            report.cancelled = true;
            break;
        }

        let batch = tokio::select! {
            biased;
            _ = cancel_rx.changed() => {
                report.cancelled = true;
                break;
            }
            batch = batch_rx.recv() => match batch {
                Some(batch) => batch,
                None => break,
            },
        };

        for candidate in batch {
            if !filter.admit(&candidate) {
                continue;
            }
            tokio::select! {
                biased;
                _ = cancel_rx.changed() => {
                    report.cancelled = true;
                    break 'batches;
                }
                sent = tx.send(candidate) => {
                    if sent.is_err() {
                        tracing::debug!("Candidate consumer went away, stopping producer");
                        report.cancelled = true;
                        break 'batches;
                    }
                    report.emitted += 1;
                }
            }
            if filter.is_exhausted() {
                report.ceiling_reached = true;
                break 'batches;
            }
        }
    }

    // Closing the batch queue stops the generator at its next hand-off.
    drop(batch_rx);
    drop(tx);

    let summary = generator
        .await
        .map_err(|e| GenerateError::Producer(e.to_string()))?;
    report.stages = summary.stages;
    report.rejected_length = filter.rejected_length + summary.rejected_length;
    report.duplicates = filter.duplicates;

    if report.cancelled {
        tracing::info!(emitted = report.emitted, "Candidate generation cancelled");
    } else {
        tracing::info!(
            emitted = report.emitted,
            generated = report.generated(),
            duplicates = report.duplicates,
            rejected_length = report.rejected_length,
            ceiling_reached = report.ceiling_reached,
            "Candidate generation finished"
        );
    }

    Ok(report)
}

// =============================================================================
// STREAM
// =============================================================================

/// Signals the producer to discard the rest of the run and close the queue.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        // No receiver means the producer already finished.
        let _ = self.0.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// Consumer side of a running pipeline.
pub struct CandidateStream {
    receiver: mpsc::Receiver<String>,
    cancel: CancelHandle,
    task: JoinHandle<Result<ProducerReport, GenerateError>>,
}

impl CandidateStream {
    /// Next candidate, or `None` once the producer is done.
    pub async fn next(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Ask the producer to stop. Candidates already queued can still be
    /// read.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the producer and return its report. Candidates not yet read
    /// are discarded.
    pub async fn finish(self) -> Result<ProducerReport, GenerateError> {
        let CandidateStream {
            receiver,
            cancel,
            task,
        } = self;
        drop(receiver);
        let report = task
            .await
            .map_err(|e| GenerateError::Producer(e.to_string()))??;
        drop(cancel);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountLimit;

    fn config(limit: CountLimit) -> GeneratorConfig {
        GeneratorConfig {
            min_length: 1,
            max_length: 64,
            min_year: 2024,
            max_year: 2025,
            limit,
            leet: false,
            shuffle_seed: Some(42),
        }
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_no_seed_source_rejected() {
        let input = PipelineInput::new()
            .with_identity("   ")
            .with_words(["", " "]);
        assert!(matches!(
            CandidatePipeline::new(input, config(CountLimit::Unbounded)),
            Err(ConfigError::NoSeedSource)
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_generation() {
        let mut cfg = config(CountLimit::Unbounded);
        cfg.max_length = 0;
        assert!(matches!(
            CandidatePipeline::new(PipelineInput::new().with_words(["admin"]), cfg),
            Err(ConfigError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_filter_length_dedup_ceiling() {
        let mut cfg = config(CountLimit::Bounded(2));
        cfg.min_length = 3;
        cfg.max_length = 5;
        let mut filter = CandidateFilter::new(&cfg);

        assert!(!filter.admit("ab"));
        assert!(!filter.admit("abcdef"));
        assert!(filter.admit("abc"));
        assert!(!filter.admit("abc"));
        assert!(filter.admit("ABC"));
        assert!(filter.is_exhausted());
        assert!(!filter.admit("xyz"));
        assert_eq!(filter.admitted(), 2);
        assert_eq!(filter.rejected_length, 2);
        assert_eq!(filter.duplicates, 1);
    }

    #[test]
    fn test_filter_counts_characters() {
        let mut cfg = config(CountLimit::Unbounded);
        cfg.min_length = 4;
        cfg.max_length = 4;
        let mut filter = CandidateFilter::new(&cfg);
        // four characters, more than four bytes
        assert!(filter.admit("verã"));
        assert!(!filter.is_exhausted());
    }

    #[test]
    fn test_active_stages() {
        let pipeline = CandidatePipeline::new(
            PipelineInput::new().with_words(["admin"]),
            config(CountLimit::Unbounded),
        )
        .unwrap();
        assert_eq!(pipeline.active_stages(), vec![Stage::Words, Stage::Seasonal]);

        let mut cfg = config(CountLimit::Unbounded);
        cfg.leet = true;
        let pipeline = CandidatePipeline::new(
            PipelineInput::new()
                .with_identity("Acme")
                .with_words(["admin"])
                .with_templates(["{company}{year}"]),
            cfg,
        )
        .unwrap();
        assert_eq!(pipeline.active_stages(), Stage::ALL.to_vec());
    }

    #[test]
    fn test_leet_stage_composes_with_word_variations() {
        let mut cfg = config(CountLimit::Unbounded);
        cfg.leet = true;
        let pipeline =
            CandidatePipeline::new(PipelineInput::new().with_words(["as"]), cfg).unwrap();

        let leet = pipeline.stage_candidates(Stage::Leet);
        assert!(leet.contains(&"@5".to_string()));
        // second pass decorates leet forms like any other word
        assert!(leet.contains(&"@5123".to_string()));
        assert!(leet.contains(&"@5_24".to_string()));
        assert!(leet.contains(&"!@$07".to_string()));
    }

    #[test]
    fn test_identity_stage_includes_bare_forms() {
        let pipeline = CandidatePipeline::new(
            PipelineInput::new().with_identity("Ferreira Costa"),
            config(CountLimit::Unbounded),
        )
        .unwrap();
        let identity = pipeline.stage_candidates(Stage::Identity);
        for expected in ["ferreiracosta", "ferreira_costa", "FerreiraCosta", "FERREIRA_COSTA", "FC"] {
            assert!(identity.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[tokio::test]
    async fn test_unbounded_run_is_deterministic() {
        let run = || async {
            let mut cfg = config(CountLimit::Unbounded);
            cfg.shuffle_seed = None;
            CandidatePipeline::new(
                PipelineInput::new()
                    .with_identity("Acme")
                    .with_words(["admin"])
                    .with_templates(["{company}{sep}{year}"]),
                cfg,
            )
            .unwrap()
            .with_reference_date(reference())
            .collect()
            .await
            .unwrap()
            .0
        };
        let first = run().await;
        let second = run().await;
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_bounded_run_respects_ceiling_and_seed() {
        let run = || async {
            CandidatePipeline::new(
                PipelineInput::new().with_identity("Acme").with_words(["admin"]),
                config(CountLimit::Bounded(50)),
            )
            .unwrap()
            .with_reference_date(reference())
            .collect()
            .await
            .unwrap()
        };
        let (first, report) = run().await;
        let (second, _) = run().await;
        assert_eq!(first.len(), 50);
        assert!(report.ceiling_reached);
        assert_eq!(report.emitted, 50);
        // same seed, same sample
        assert_eq!(first, second);
    }

    #[test]
    fn test_priority_sample_keeps_distinct_in_length_candidates() {
        let mut cfg = config(CountLimit::Bounded(10));
        cfg.min_length = 3;
        cfg.max_length = 8;
        let mut sample = PrioritySample::new(10, 99, &cfg);

        for round in 0..3 {
            for i in 0..100 {
                sample.offer(format!("word{}", i));
            }
            sample.offer("ab".to_string());
            sample.offer("waytoolongword".to_string());
            assert_eq!(sample.len(), 10, "round {}", round);
        }

        assert_eq!(sample.rejected_length, 6);
        let kept = sample.into_ordered();
        let unique: HashSet<&String> = kept.iter().collect();
        assert_eq!(unique.len(), 10);
        assert!(kept.iter().all(|c| c.starts_with("word")));
    }

    #[test]
    fn test_priority_sample_ignores_repeat_counts() {
        // repeats must not raise a candidate's chance of being kept
        let cfg = config(CountLimit::Bounded(5));
        let mut once = PrioritySample::new(5, 7, &cfg);
        let mut repeated = PrioritySample::new(5, 7, &cfg);
        for i in 0..50 {
            once.offer(format!("c{}", i));
            for _ in 0..(i % 4 + 1) {
                repeated.offer(format!("c{}", i));
            }
        }
        assert_eq!(once.into_ordered(), repeated.into_ordered());
    }

    #[tokio::test]
    async fn test_bounded_run_is_shuffled() {
        let run = |limit: CountLimit, seed: u64| async move {
            let mut cfg = config(limit);
            cfg.shuffle_seed = Some(seed);
            CandidatePipeline::new(
                PipelineInput::new().with_identity("Acme").with_words(["admin"]),
                cfg,
            )
            .unwrap()
            .with_reference_date(reference())
            .collect()
            .await
            .unwrap()
            .0
        };

        let in_order = run(CountLimit::Unbounded, 42).await;
        let first = run(CountLimit::Bounded(50), 42).await;
        let other_seed = run(CountLimit::Bounded(50), 43).await;

        assert_eq!(first.len(), 50);
        assert_ne!(first, in_order[..50].to_vec());
        assert_ne!(first, other_seed);
        // every sampled candidate belongs to the full set
        let all: HashSet<&String> = in_order.iter().collect();
        assert!(first.iter().all(|c| all.contains(c)));
    }

    #[tokio::test]
    async fn test_full_queue_suspends_producer_without_loss() {
        let input = || {
            PipelineInput::new()
                .with_identity("Acme")
                .with_words(["admin", "welcome", "password", "summer"])
        };
        let (fast, _) = CandidatePipeline::new(input(), config(CountLimit::Unbounded))
            .unwrap()
            .with_reference_date(reference())
            .collect()
            .await
            .unwrap();
        assert!(fast.len() > QUEUE_CAPACITY);

        let mut stream = CandidatePipeline::new(input(), config(CountLimit::Unbounded))
            .unwrap()
            .with_reference_date(reference())
            .spawn();

        // stay away until the producer has filled the queue
        let mut waited = 0;
        while stream.receiver.len() < QUEUE_CAPACITY && waited < 1000 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            waited += 1;
        }
        assert_eq!(stream.receiver.len(), QUEUE_CAPACITY);

        let mut slow = Vec::new();
        while let Some(candidate) = stream.next().await {
            slow.push(candidate);
        }
        let report = stream.finish().await.unwrap();

        assert!(!report.cancelled);
        assert_eq!(report.emitted, fast.len());
        assert_eq!(slow, fast);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_bounded_sampling() {
        let mut cfg = config(CountLimit::Bounded(10));
        cfg.leet = true;
        let stream = CandidatePipeline::new(
            PipelineInput::new().with_identity("Acme").with_words(["admin", "welcome"]),
            cfg,
        )
        .unwrap()
        .spawn();

        stream.cancel();
        let report = stream.finish().await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.emitted, 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_producer() {
        // leet output is far larger than the queue, so the producer blocks
        let mut cfg = config(CountLimit::Unbounded);
        cfg.leet = true;
        let pipeline = CandidatePipeline::new(
            PipelineInput::new().with_identity("Acme").with_words(["admin", "welcome"]),
            cfg,
        )
        .unwrap();
        let mut stream = pipeline.spawn();
        let first = stream.next().await;
        assert!(first.is_some());

        stream.cancel();
        assert!(stream.cancel_handle().is_cancelled());
        let report = stream.finish().await.unwrap();
        assert!(report.cancelled);
        assert!(!report.ceiling_reached);
    }

    #[tokio::test]
    async fn test_report_accounts_for_stages() {
        let (candidates, report) = CandidatePipeline::new(
            PipelineInput::new().with_words(["test"]),
            config(CountLimit::Unbounded),
        )
        .unwrap()
        .with_reference_date(reference())
        .collect()
        .await
        .unwrap();

        assert_eq!(report.emitted, candidates.len());
        assert_eq!(
            report.generated(),
            report.emitted + report.duplicates + report.rejected_length
        );
        assert_eq!(
            report.stages.iter().map(|s| s.stage).collect::<Vec<_>>(),
            vec![Stage::Words, Stage::Seasonal]
        );
    }
}
