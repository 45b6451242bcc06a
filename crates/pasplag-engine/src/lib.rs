//! Winnowing-based syntactic similarity engine for Pascal sources.
//!
//! Pipeline: normalising tokenizer → k-gram hashing → winnowing selection →
//! inverted fingerprint index → pair analysis → fragment reconstruction →
//! scoring. The engine is purely compute-bound and side-effect-free; all
//! outputs are deterministic given fixed inputs and parameters.
//!
//! ## Example
//!
//! ```
//! use pasplag_core::config::{DetectOptions, EngineConfig};
//! use pasplag_engine::Engine;
//! use pasplag_lexer::SourceFile;
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! let a = SourceFile::new("a.pas", "program P; begin writeln('hi'); end.");
//! let b = SourceFile::new("b.pas", "program P; begin writeln('hi'); end.");
//! let result = engine.detect(&a, &b, &DetectOptions::default());
//! assert_eq!(result.overall_similarity, 1.0);
//! ```

pub mod batch;
pub mod fragment;
pub mod hash;
pub mod index;
pub mod pair;
pub mod score;
pub mod winnow;

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use pasplag_core::config::{DetectOptions, EngineConfig};
use pasplag_core::error::AnalysisError;
use pasplag_core::report::{BatchResult, MappedFragment, PlagiarismResult};
use pasplag_lexer::{SourceFile, TokenizedFile, tokenize};

use crate::fragment::Fragmenter;
use crate::index::{FileId, FingerprintIndex};
use crate::score::VerdictSignals;

/// The similarity engine. Cheap to construct; parameters are fixed for its
/// lifetime.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Validates parameters; invalid ones are fatal here, never downstream.
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compare two source files.
    ///
    /// Lex errors and empty files zero the pair (similarity 0, no fragments)
    /// instead of failing the call; use [`Engine::try_detect`] to observe the
    /// error itself.
    pub fn detect(
        &self,
        file1: &SourceFile,
        file2: &SourceFile,
        opts: &DetectOptions,
    ) -> PlagiarismResult {
        let started = Instant::now();
        let mut result = match self.try_detect(file1, file2, opts) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    file1 = %file1.name,
                    file2 = %file2.name,
                    error = %err,
                    "pair unanalyzable, reporting zero similarity"
                );
                PlagiarismResult::empty(&file1.name, &file2.name)
            }
        };
        result.processing_time = started.elapsed().as_millis() as u64;
        result
    }

    /// Like [`Engine::detect`] but surfaces `Lex` and `EmptyFile` errors.
    pub fn try_detect(
        &self,
        file1: &SourceFile,
        file2: &SourceFile,
        opts: &DetectOptions,
    ) -> Result<PlagiarismResult, AnalysisError> {
        let left = tokenize(&file1.name, &file1.text)?;
        let right = tokenize(&file2.name, &file2.text)?;

        let mut index = FingerprintIndex::new(self.config.kgram_size, self.config.window_size);
        let a = index.add_file(&left)?;
        let b = index.add_file(&right)?;

        Ok(self.evaluate_pair(&index, a, b, &left, &right, opts))
    }

    /// Compare every unordered pair of `files`. See [`batch`] for the
    /// threshold and ordering rules.
    pub fn detect_batch(&self, files: &[SourceFile], opts: &DetectOptions) -> BatchResult {
        batch::run(self, files, opts, None)
    }

    /// Batch comparison that stops between pair evaluations once `cancel`
    /// becomes true. Pairs already evaluated are returned; abandoning the
    /// rest leaks no state.
    pub fn detect_batch_with_cancel(
        &self,
        files: &[SourceFile],
        opts: &DetectOptions,
        cancel: &AtomicBool,
    ) -> BatchResult {
        batch::run(self, files, opts, Some(cancel))
    }

    /// Evaluate one indexed pair. Read-only over the index; safe to call
    /// from parallel batch workers once ingest is complete.
    pub(crate) fn evaluate_pair(
        &self,
        index: &FingerprintIndex,
        a: FileId,
        b: FileId,
        left: &TokenizedFile,
        right: &TokenizedFile,
        opts: &DetectOptions,
    ) -> PlagiarismResult {
        let k = self.config.kgram_size;
        let analysis = pair::analyze(index, a, b);

        let fragments = Fragmenter::new(self.config.window_size)
            .with_min_occurrences(opts.min_occurrences.unwrap_or(1))
            .build(&analysis.shared);

        let mapped: Vec<MappedFragment> = fragments
            .iter()
            .enumerate()
            .map(|(id, f)| score::map_fragment(f, id, left, right, k))
            .collect();

        let total_mapped = mapped.len();
        let mut significant: Vec<MappedFragment> = mapped
            .into_iter()
            .filter(|m| score::is_significant(m, k))
            .collect();
        significant.sort_by(|x, y| {
            y.confidence
                .partial_cmp(&x.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| x.fragment_id.cmp(&y.fragment_id))
        });

        let total_shared_lines: usize =
            significant.iter().map(|m| m.file1_lines.count as usize).sum();
        let total_shared_tokens: usize =
            significant.iter().map(|m| m.shared_tokens.len()).sum();

        let syntactic_similarity = round4(analysis.similarity);
        let overall_similarity =
            round4((self.config.syntactic_weight * analysis.similarity).clamp(0.0, 1.0));

        let coverage1 = round4(coverage(analysis.left_covered, analysis.left_total));
        let coverage2 = round4(coverage(analysis.right_covered, analysis.right_total));

        let threshold = opts
            .threshold
            .unwrap_or_else(|| score::adaptive_threshold(overall_similarity, significant.len()));

        let confidence = score::confidence_label(&VerdictSignals {
            overall_similarity,
            syntactic_similarity,
            longest_fragment: analysis.longest_run_tokens,
            coverage1,
            coverage2,
            significant_fragments: significant.len(),
            total_shared_lines,
        });

        PlagiarismResult {
            syntactic_similarity,
            overall_similarity,
            shared_fragments: fragments.len(),
            longest_fragment: analysis.longest_run_tokens,
            coverage1,
            coverage2,
            significant_mapped_fragments: significant.len(),
            total_mapped_fragments: total_mapped,
            mapped_fragments: significant,
            total_shared_lines,
            total_shared_tokens,
            is_plagiarism: overall_similarity >= threshold,
            confidence,
            file1: left.name().to_string(),
            file2: right.name().to_string(),
            processing_time: 0,
        }
    }
}

fn coverage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// Round a score to four decimals for reporting. Deterministic.
pub(crate) fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
