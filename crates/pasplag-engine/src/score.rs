//! Fragment scoring, classification, and the overall verdict.
//!
//! Lifts a clustered [`Fragment`] to a reportable [`MappedFragment`] via the
//! tokenizer's position map, scores its confidence, and derives the
//! pair-level plagiarism verdict and confidence label.

use crate::fragment::Fragment;
use pasplag_core::report::{
    ConfidenceLabel, FragmentKind, LineSpan, MappedFragment, TokenSpan, number_lines,
};
use pasplag_lexer::TokenizedFile;

/// Fragments classify as EXACT at or above this confidence.
const EXACT_CONFIDENCE: f64 = 0.8;
/// Fragments classify as SIMILAR at or above this confidence.
const SIMILAR_CONFIDENCE: f64 = 0.6;
/// Fragments below this confidence are not significant.
const SIGNIFICANT_CONFIDENCE: f64 = 0.3;
/// Token patterns longer than this are elided to head and tail.
const PATTERN_ELISION: usize = 20;

/// Lift a fragment to its mapped, scored report form.
pub fn map_fragment(
    fragment: &Fragment,
    fragment_id: usize,
    left: &TokenizedFile,
    right: &TokenizedFile,
    kgram_size: usize,
) -> MappedFragment {
    let left_tokens = TokenSpan::new(fragment.left.from, fragment.left.to + kgram_size - 1);
    let right_tokens = TokenSpan::new(fragment.right.from, fragment.right.to + kgram_size - 1);

    let left_lines = line_span(left, &left_tokens);
    let right_lines = line_span(right, &right_tokens);

    let shared_tokens: Vec<String> = left.tokens()[left_tokens.start..=left_tokens.end.min(left.len() - 1)]
        .iter()
        .map(|t| t.value.clone())
        .collect();

    let token_count = shared_tokens.len();
    let pair_count = fragment.pairs.len();
    let range_len = fragment.left.count();
    let confidence = confidence(token_count, pair_count, range_len);

    let left_snippet = left.snippet(left_lines.start, left_lines.end);
    let right_snippet = right.snippet(right_lines.start, right_lines.end);

    MappedFragment {
        fragment_id,
        confidence,
        fragment_type: classify(confidence),
        file1_lines: left_lines,
        file2_lines: right_lines,
        file1_token_range: left_tokens,
        file2_token_range: right_tokens,
        token_pattern: pattern(&shared_tokens),
        local_similarity: local_similarity(pair_count, token_count, kgram_size),
        shared_fingerprints: pair_count,
        file1_code_with_line_numbers: number_lines(&left_snippet, left_lines.start),
        file2_code_with_line_numbers: number_lines(&right_snippet, right_lines.start),
        file1_code_snippet: left_snippet,
        file2_code_snippet: right_snippet,
        shared_tokens,
    }
}

/// 1-based line range of a token range, clamped to the file.
fn line_span(tf: &TokenizedFile, tokens: &TokenSpan) -> LineSpan {
    let start = tf.line_of(tokens.start);
    let end = tf.line_of(tokens.end).max(start);
    LineSpan::new(start, end)
}

/// Fragment confidence in [0, 1]: rewards absolute size, pair density, and
/// coherence (pair density within the covered k-gram range).
fn confidence(token_count: usize, pair_count: usize, range_len: usize) -> f64 {
    let size = (token_count as f64 / 50.0).min(1.0);
    let density = (0.1 * pair_count as f64).min(1.0);
    let coherence = (pair_count as f64 / (range_len as f64).max(1.0)).min(1.0);
    (0.4 * size + 0.3 * density + 0.3 * coherence).min(1.0)
}

fn classify(confidence: f64) -> FragmentKind {
    if confidence >= EXACT_CONFIDENCE {
        FragmentKind::Exact
    } else if confidence >= SIMILAR_CONFIDENCE {
        FragmentKind::Similar
    } else {
        FragmentKind::Structural
    }
}

fn local_similarity(pair_count: usize, token_count: usize, kgram_size: usize) -> f64 {
    let expected = (token_count as f64 / kgram_size as f64).max(1.0);
    (pair_count as f64 / expected).min(1.0)
}

/// Space-joined shared tokens, elided to head and tail past 20 tokens.
fn pattern(tokens: &[String]) -> String {
    if tokens.len() <= PATTERN_ELISION {
        tokens.join(" ")
    } else {
        format!(
            "{} ... {}",
            tokens[..10].join(" "),
            tokens[tokens.len() - 10..].join(" ")
        )
    }
}

/// Whether a mapped fragment is significant enough to report.
pub fn is_significant(fragment: &MappedFragment, kgram_size: usize) -> bool {
    fragment.confidence >= SIGNIFICANT_CONFIDENCE && fragment.shared_tokens.len() >= kgram_size
}

/// Adaptive decision threshold keyed on (similarity, fragment count),
/// most specific row first.
pub fn adaptive_threshold(similarity: f64, fragments: usize) -> f64 {
    if similarity > 0.8 && fragments > 5 {
        0.7
    } else if similarity > 0.6 && fragments > 3 {
        0.5
    } else if similarity > 0.4 && fragments > 1 {
        0.35
    } else {
        0.3
    }
}

/// Inputs to the four-level confidence label.
#[derive(Debug, Clone, Copy)]
pub struct VerdictSignals {
    pub overall_similarity: f64,
    pub syntactic_similarity: f64,
    /// Longest shared run in tokens.
    pub longest_fragment: usize,
    pub coverage1: f64,
    pub coverage2: f64,
    pub significant_fragments: usize,
    pub total_shared_lines: usize,
}

/// Additive evidence score over the verdict signals, bucketed to a label.
pub fn confidence_label(signals: &VerdictSignals) -> ConfidenceLabel {
    let mut score = match signals.overall_similarity {
        s if s >= 0.9 => 4,
        s if s >= 0.75 => 3,
        s if s >= 0.6 => 2,
        s if s >= 0.4 => 1,
        _ => 0,
    };
    if signals.syntactic_similarity >= 0.7 {
        score += 1;
    }
    if signals.longest_fragment > 10 {
        score += 1;
    }
    if signals.coverage1 > 0.5 || signals.coverage2 > 0.5 {
        score += 1;
    }
    if signals.significant_fragments > 5 {
        score += 1;
    }
    if signals.total_shared_lines > 20 {
        score += 1;
    }

    match score {
        s if s >= 8 => ConfidenceLabel::VeryHigh,
        s if s >= 6 => ConfidenceLabel::High,
        s if s >= 4 => ConfidenceLabel::Medium,
        _ => ConfidenceLabel::Low,
    }
}
