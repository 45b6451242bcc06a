//! All-pairs batch analysis.
//!
//! Ingest phase (parallel tokenisation, serial index build) followed by a
//! read-only query phase evaluated in parallel across pairs. Unanalyzable
//! files zero their pairs rather than failing the batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use pasplag_core::config::DetectOptions;
use pasplag_core::report::{BatchResult, PlagiarismResult};
use pasplag_lexer::{SourceFile, TokenizedFile, tokenize};
use rayon::prelude::*;

use crate::Engine;
use crate::index::{FileId, FingerprintIndex};

/// Lower clamp of the batch-adaptive threshold.
const MIN_THRESHOLD: f64 = 0.25;
/// Upper clamp of the batch-adaptive threshold.
const MAX_THRESHOLD: f64 = 0.8;

pub(crate) fn run(
    engine: &Engine,
    files: &[SourceFile],
    opts: &DetectOptions,
    cancel: Option<&AtomicBool>,
) -> BatchResult {
    let started = Instant::now();

    // Ingest phase: tokenize in parallel, then build the index serially.
    // The index is immutable afterwards.
    let tokenized: Vec<Option<TokenizedFile>> = files
        .par_iter()
        .map(|f| match tokenize(&f.name, &f.text) {
            Ok(tf) if !tf.is_empty() => Some(tf),
            Ok(_) => {
                tracing::warn!(file = %f.name, "no tokens after normalisation, pairs will be zeroed");
                None
            }
            Err(err) => {
                tracing::warn!(file = %f.name, error = %err, "unanalyzable file, pairs will be zeroed");
                None
            }
        })
        .collect();

    let config = engine.config();
    let mut index = FingerprintIndex::new(config.kgram_size, config.window_size);
    let ids: Vec<Option<FileId>> = tokenized
        .iter()
        .map(|tf| tf.as_ref().and_then(|tf| index.add_file(tf).ok()))
        .collect();

    // Query phase: read-only over the index, parallel across pairs.
    // Cancellation is honoured between pair evaluations, never mid-pair.
    let pair_list: Vec<(usize, usize)> = (0..files.len())
        .flat_map(|i| (i + 1..files.len()).map(move |j| (i, j)))
        .collect();

    let mut results: Vec<PlagiarismResult> = pair_list
        .par_iter()
        .filter_map(|&(i, j)| {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return None;
            }
            let pair_started = Instant::now();
            let mut result = match (ids[i], ids[j], &tokenized[i], &tokenized[j]) {
                (Some(a), Some(b), Some(ta), Some(tb)) => {
                    engine.evaluate_pair(&index, a, b, ta, tb, opts)
                }
                _ => PlagiarismResult::empty(&files[i].name, &files[j].name),
            };
            result.processing_time = pair_started.elapsed().as_millis() as u64;
            Some(result)
        })
        .collect();

    let threshold = opts
        .threshold
        .unwrap_or_else(|| adaptive_threshold(&results));

    for result in &mut results {
        result.is_plagiarism = result.overall_similarity >= threshold;
    }
    let suspicious_pairs = results.iter().filter(|r| r.is_plagiarism).count();

    results.sort_by(|x, y| {
        y.overall_similarity
            .partial_cmp(&x.overall_similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.file1.cmp(&y.file1))
            .then_with(|| x.file2.cmp(&y.file2))
    });

    let total_comparisons = results.len();
    tracing::debug!(
        files = files.len(),
        comparisons = total_comparisons,
        suspicious = suspicious_pairs,
        threshold,
        "batch complete"
    );

    BatchResult {
        results,
        threshold,
        total_comparisons,
        suspicious_pairs,
        processing_time: started.elapsed().as_millis() as u64,
    }
}

/// Batch-adaptive threshold: `clamp(mean + 1.5·stddev, 0.25, 0.8)` over the
/// observed overall similarities.
fn adaptive_threshold(results: &[PlagiarismResult]) -> f64 {
    if results.is_empty() {
        return MIN_THRESHOLD;
    }
    let n = results.len() as f64;
    let mean = results.iter().map(|r| r.overall_similarity).sum::<f64>() / n;
    let variance = results
        .iter()
        .map(|r| (r.overall_similarity - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean + 1.5 * variance.sqrt()).clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}
