//! Detection report schema.
//!
//! These are the exact shapes external callers (HTTP layer, desktop shell)
//! rely on: camelCase field names, uppercase enum discriminants, line-numbered
//! snippet rendering. All types are standalone values suitable for
//! serialisation; nothing here borrows engine state.

use serde::{Deserialize, Serialize};

/// Classification of a mapped fragment by confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FragmentKind {
    Exact,
    Similar,
    Structural,
}

/// Four-level confidence label for the overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// An inclusive 1-based line range on one side of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
    pub count: u32,
}

impl LineSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            count: end.saturating_sub(start) + 1,
        }
    }
}

/// An inclusive token-index range on one side of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
    /// Number of tokens covered by the range.
    pub tokens: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            tokens: end.saturating_sub(start) + 1,
        }
    }
}

/// A precisely located region shared by both files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedFragment {
    pub fragment_id: usize,
    /// Confidence in [0, 1] combining size, density, and coherence.
    pub confidence: f64,
    pub fragment_type: FragmentKind,
    pub file1_lines: LineSpan,
    pub file2_lines: LineSpan,
    pub file1_token_range: TokenSpan,
    pub file2_token_range: TokenSpan,
    /// Normalised token values of the left file over its token range.
    pub shared_tokens: Vec<String>,
    /// Space-joined shared tokens, elided past 20 tokens.
    pub token_pattern: String,
    pub file1_code_snippet: String,
    pub file2_code_snippet: String,
    pub file1_code_with_line_numbers: String,
    pub file2_code_with_line_numbers: String,
    pub local_similarity: f64,
    /// Number of shared k-grams clustered into this fragment.
    pub shared_fingerprints: usize,
}

/// Result of comparing one pair of files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismResult {
    pub syntactic_similarity: f64,
    pub overall_similarity: f64,
    /// Number of fragments built from the shared fingerprints.
    pub shared_fragments: usize,
    /// Longest contiguous shared run, in tokens.
    pub longest_fragment: usize,
    /// Fraction of file1's selected fingerprints shared with file2.
    pub coverage1: f64,
    /// Fraction of file2's selected fingerprints shared with file1.
    pub coverage2: f64,
    /// The significant mapped fragments, confidence descending.
    pub mapped_fragments: Vec<MappedFragment>,
    pub total_mapped_fragments: usize,
    pub significant_mapped_fragments: usize,
    pub total_shared_lines: usize,
    pub total_shared_tokens: usize,
    pub is_plagiarism: bool,
    pub confidence: ConfidenceLabel,
    pub file1: String,
    pub file2: String,
    /// Wall-clock time spent on this pair, in milliseconds.
    pub processing_time: u64,
}

impl PlagiarismResult {
    /// The zeroed result reported when one side of the pair is unanalyzable
    /// (lex error or no tokens after normalisation).
    pub fn empty(file1: &str, file2: &str) -> Self {
        Self {
            syntactic_similarity: 0.0,
            overall_similarity: 0.0,
            shared_fragments: 0,
            longest_fragment: 0,
            coverage1: 0.0,
            coverage2: 0.0,
            mapped_fragments: Vec::new(),
            total_mapped_fragments: 0,
            significant_mapped_fragments: 0,
            total_shared_lines: 0,
            total_shared_tokens: 0,
            is_plagiarism: false,
            confidence: ConfidenceLabel::Low,
            file1: file1.to_string(),
            file2: file2.to_string(),
            processing_time: 0,
        }
    }
}

/// Result of an all-pairs batch analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Pair results sorted by descending overall similarity.
    pub results: Vec<PlagiarismResult>,
    /// The decision threshold applied (caller-supplied or batch-adaptive).
    pub threshold: f64,
    pub total_comparisons: usize,
    pub suspicious_pairs: usize,
    pub processing_time: u64,
}

/// Prefix each snippet line with a left-aligned 3-wide line number.
///
/// `first_line` is the 1-based source line of the snippet's first line.
pub fn number_lines(snippet: &str, first_line: u32) -> String {
    snippet
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:<3}: {}", first_line + i as u32, line))
        .collect::<Vec<_>>()
        .join("\n")
}
