//! Fragment reconstruction from sparse shared fingerprints.
//!
//! Greedy clustering of the sorted shared-k-gram list into contiguous
//! co-running regions. The drift band rejects coincidental interleavings
//! (common boilerplate runs) while tolerating small edits; the gap tolerance
//! bridges the spacing winnowing leaves between selected fingerprints.

use crate::index::SharedKGram;

/// Inclusive range of k-gram positions on one side of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KGramRange {
    pub from: usize,
    pub to: usize,
}

impl KGramRange {
    /// Number of k-gram positions covered. Never zero: `from <= to` by
    /// construction.
    pub fn count(&self) -> usize {
        self.to - self.from + 1
    }
}

/// A cluster of shared k-grams that track each other on both sides.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub left: KGramRange,
    pub right: KGramRange,
    /// Member shared k-grams, in (left, right) order.
    pub pairs: Vec<SharedKGram>,
}

/// Greedy fragment clustering with configurable tolerances.
#[derive(Debug, Clone, Copy)]
pub struct Fragmenter {
    /// Maximum k-gram spacing bridged on either side. Defaults to the
    /// winnowing window size: consecutive selected fingerprints of one
    /// contiguous shared region are never further apart than that.
    gap_tolerance: i64,
    /// Allowed deviation of `right − left` from the fragment's first pair.
    drift_band: i64,
    /// Minimum member count for a fragment to survive.
    min_occurrences: usize,
}

impl Fragmenter {
    pub fn new(window_size: usize) -> Self {
        Self {
            gap_tolerance: window_size as i64,
            drift_band: 1,
            min_occurrences: 1,
        }
    }

    pub fn with_gap_tolerance(mut self, gap_tolerance: usize) -> Self {
        self.gap_tolerance = gap_tolerance as i64;
        self
    }

    pub fn with_drift_band(mut self, drift_band: usize) -> Self {
        self.drift_band = drift_band as i64;
        self
    }

    pub fn with_min_occurrences(mut self, min_occurrences: usize) -> Self {
        self.min_occurrences = min_occurrences.max(1);
        self
    }

    /// Cluster a (left, right)-sorted shared-k-gram list into fragments.
    /// Linear in the input; deterministic.
    pub fn build(&self, shared: &[SharedKGram]) -> Vec<Fragment> {
        let mut fragments: Vec<Fragment> = Vec::new();
        let mut current: Option<Building> = None;

        for &s in shared {
            match current.as_mut() {
                Some(building) if building.accepts(s, self.gap_tolerance, self.drift_band) => {
                    building.extend(s);
                }
                Some(building) => {
                    fragments.push(building.finish());
                    current = Some(Building::seed(s));
                }
                None => current = Some(Building::seed(s)),
            }
        }
        if let Some(building) = current.as_mut() {
            fragments.push(building.finish());
        }

        fragments.retain(|f| f.pairs.len() >= self.min_occurrences);
        fragments
    }
}

/// A fragment being accumulated.
struct Building {
    left_from: usize,
    left_to: usize,
    right_from: usize,
    right_to: usize,
    /// `right − left` of the seeding pair; members must stay within the
    /// drift band of it.
    offset: i64,
    pairs: Vec<SharedKGram>,
}

impl Building {
    fn seed(s: SharedKGram) -> Self {
        Self {
            left_from: s.left,
            left_to: s.left,
            right_from: s.right,
            right_to: s.right,
            offset: s.right as i64 - s.left as i64,
            pairs: vec![s],
        }
    }

    fn accepts(&self, s: SharedKGram, gap_tolerance: i64, drift_band: i64) -> bool {
        let left_gap = s.left as i64 - self.left_to as i64;
        let right_gap = s.right as i64 - self.right_to as i64;
        let drift = (s.right as i64 - s.left as i64 - self.offset).abs();
        left_gap <= gap_tolerance && right_gap <= gap_tolerance && drift <= drift_band
    }

    fn extend(&mut self, s: SharedKGram) {
        self.left_to = self.left_to.max(s.left);
        self.right_from = self.right_from.min(s.right);
        self.right_to = self.right_to.max(s.right);
        self.pairs.push(s);
    }

    fn finish(&mut self) -> Fragment {
        Fragment {
            left: KGramRange {
                from: self.left_from,
                to: self.left_to,
            },
            right: KGramRange {
                from: self.right_from,
                to: self.right_to,
            },
            pairs: std::mem::take(&mut self.pairs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kgram(left: usize, right: usize) -> SharedKGram {
        SharedKGram {
            hash: (left * 1000 + right) as u64,
            left,
            right,
        }
    }

    fn fragmenter() -> Fragmenter {
        Fragmenter::new(15)
    }

    #[test]
    fn test_empty_input_builds_nothing() {
        assert!(fragmenter().build(&[]).is_empty());
    }

    #[test]
    fn test_single_pair_single_fragment() {
        let fragments = fragmenter().build(&[kgram(4, 9)]);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].left, KGramRange { from: 4, to: 4 });
        assert_eq!(fragments[0].right, KGramRange { from: 9, to: 9 });
    }

    #[test]
    fn test_aligned_run_merges() {
        // Winnowing-spaced selections of one shared region, constant offset.
        let shared = [kgram(0, 5), kgram(7, 12), kgram(14, 19), kgram(21, 26)];
        let fragments = fragmenter().build(&shared);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].left, KGramRange { from: 0, to: 21 });
        assert_eq!(fragments[0].right, KGramRange { from: 5, to: 26 });
        assert_eq!(fragments[0].pairs.len(), 4);
    }

    #[test]
    fn test_gap_beyond_tolerance_splits() {
        let shared = [kgram(0, 0), kgram(40, 40)];
        let fragments = fragmenter().build(&shared);
        assert_eq!(fragments.len(), 2);
    }

    #[test]
    fn test_drift_beyond_band_splits() {
        // Same gaps, but the offset jumps by 9: a re-ordered coincidence.
        let shared = [kgram(0, 5), kgram(6, 20)];
        let fragments = fragmenter().build(&shared);
        assert_eq!(fragments.len(), 2);
    }

    #[test]
    fn test_small_edit_within_drift_band_merges() {
        // One inserted token on the right side shifts the offset by 1.
        let shared = [kgram(0, 5), kgram(8, 14)];
        let fragments = fragmenter().build(&shared);
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_min_occurrences_discards_small_fragments() {
        let shared = [kgram(0, 0), kgram(7, 7), kgram(40, 90)];
        let fragments = Fragmenter::new(15).with_min_occurrences(2).build(&shared);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].pairs.len(), 2);
    }

    #[test]
    fn test_ranges_monotonic_within_fragment() {
        let shared = [kgram(0, 3), kgram(5, 8), kgram(11, 14), kgram(13, 17)];
        for fragment in fragmenter().build(&shared) {
            assert!(fragment.left.from <= fragment.left.to);
            assert!(fragment.right.from <= fragment.right.to);
            for pair in fragment.pairs.windows(2) {
                assert!(pair[0].left <= pair[1].left);
            }
        }
    }

    #[test]
    fn test_custom_gap_tolerance() {
        let shared = [kgram(0, 0), kgram(2, 2)];
        assert_eq!(
            Fragmenter::new(15).with_gap_tolerance(1).build(&shared).len(),
            2
        );
        assert_eq!(fragmenter().build(&shared).len(), 1);
    }
}
