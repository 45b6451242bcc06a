//! Pairwise analysis of shared fingerprints.
//!
//! Derives the overlap, per-side coverage, Dice similarity, and longest
//! contiguous run for one ordered pair of indexed files.

use crate::index::{FileId, FingerprintIndex, SharedKGram};
use rustc_hash::{FxHashMap, FxHashSet};

/// Shared-fingerprint structure for an ordered pair of files.
#[derive(Debug, Clone)]
pub struct PairAnalysis {
    /// Shared k-grams sorted by (left, right).
    pub shared: Vec<SharedKGram>,
    /// Multiset intersection of the two fingerprint sets:
    /// `Σ_h min(count_left(h), count_right(h))`.
    pub overlap: usize,
    /// Selected fingerprints in the left file.
    pub left_total: usize,
    /// Selected fingerprints in the right file.
    pub right_total: usize,
    /// Distinct left positions participating in any shared k-gram.
    pub left_covered: usize,
    /// Distinct right positions participating in any shared k-gram.
    pub right_covered: usize,
    /// Dice coefficient over the selected-fingerprint sets, in [0, 1].
    pub similarity: f64,
    /// Longest contiguous covered run on the left side, in tokens
    /// (`run_length + K − 1`); 0 when nothing is shared.
    pub longest_run_tokens: usize,
}

/// Analyse the ordered pair `(a, b)`.
pub fn analyze(index: &FingerprintIndex, a: FileId, b: FileId) -> PairAnalysis {
    let shared = index.shared_kgrams(a, b);
    let left_total = index.fingerprint_count(a);
    let right_total = index.fingerprint_count(b);

    // Distinct participating positions per side, and per-hash position
    // counts for the multiset overlap.
    let mut left_positions: FxHashSet<usize> = FxHashSet::default();
    let mut right_positions: FxHashSet<usize> = FxHashSet::default();
    let mut per_hash: FxHashMap<u64, (FxHashSet<usize>, FxHashSet<usize>)> = FxHashMap::default();
    for s in &shared {
        left_positions.insert(s.left);
        right_positions.insert(s.right);
        let entry = per_hash.entry(s.hash).or_default();
        entry.0.insert(s.left);
        entry.1.insert(s.right);
    }

    let overlap: usize = per_hash
        .values()
        .map(|(l, r)| l.len().min(r.len()))
        .sum();

    let similarity = if left_total + right_total == 0 {
        0.0
    } else {
        2.0 * overlap as f64 / (left_total + right_total) as f64
    };

    let longest_run_tokens = longest_run(&left_positions, index.kgram_size());

    PairAnalysis {
        shared,
        overlap,
        left_total,
        right_total,
        left_covered: left_positions.len(),
        right_covered: right_positions.len(),
        similarity,
        longest_run_tokens,
    }
}

/// Longest run of consecutive k-gram positions, lifted to tokens.
fn longest_run(positions: &FxHashSet<usize>, kgram_size: usize) -> usize {
    if positions.is_empty() {
        return 0;
    }
    let mut sorted: Vec<usize> = positions.iter().copied().collect();
    sorted.sort_unstable();

    let mut best = 1usize;
    let mut current = 1usize;
    for pair in sorted.windows(2) {
        if pair[1] == pair[0] + 1 {
            current += 1;
            best = best.max(current);
        } else {
            current = 1;
        }
    }
    best + kgram_size - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FingerprintIndex;
    use pasplag_lexer::tokenize;

    const PROGRAM: &str =
        "program P; var x: integer; begin x := 1; x := x + 2; writeln(x); end.";

    fn analyzed(a: &str, b: &str) -> PairAnalysis {
        let mut index = FingerprintIndex::new(4, 3);
        let ia = index.add_file(&tokenize("a.pas", a).unwrap()).unwrap();
        let ib = index.add_file(&tokenize("b.pas", b).unwrap()).unwrap();
        analyze(&index, ia, ib)
    }

    #[test]
    fn test_identical_files_dice_is_one() {
        let pair = analyzed(PROGRAM, PROGRAM);
        assert_eq!(pair.overlap, pair.left_total);
        assert_eq!(pair.similarity, 1.0);
        assert_eq!(pair.left_covered, pair.left_total);
        assert_eq!(pair.right_covered, pair.right_total);
    }

    #[test]
    fn test_disjoint_files_dice_is_zero() {
        let pair = analyzed(
            "program A; begin writeln('one'); end.",
            "function Sq(v: integer): integer; begin Sq := v * v; end;",
        );
        assert_eq!(pair.overlap, 0);
        assert_eq!(pair.similarity, 0.0);
        assert_eq!(pair.longest_run_tokens, 0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let left = "program A; var i: integer; begin for i := 1 to 9 do writeln(i); end.";
        let right = "program B; var i: integer; begin for i := 1 to 9 do writeln(i * i); end.";
        let ab = analyzed(left, right);
        let ba = analyzed(right, left);
        assert_eq!(ab.similarity, ba.similarity);
        assert_eq!(ab.left_covered, ba.right_covered);
        assert_eq!(ab.right_covered, ba.left_covered);
    }

    #[test]
    fn test_longest_run_lifts_to_tokens() {
        let mut positions = FxHashSet::default();
        for p in [2, 3, 4, 9, 10] {
            positions.insert(p);
        }
        // Run {2,3,4} has length 3; with K = 8 that is 3 + 7 = 10 tokens.
        assert_eq!(longest_run(&positions, 8), 10);
    }

    #[test]
    fn test_single_position_run() {
        let mut positions = FxHashSet::default();
        positions.insert(7);
        assert_eq!(longest_run(&positions, 8), 8);
    }
}
