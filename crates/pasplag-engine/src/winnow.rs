//! Schleimer-Wilkerson-Aiken winnowing selection.
//!
//! In every window of W consecutive k-gram hashes, select the rightmost
//! minimum; emit it only when the selected position changes between windows.
//! If two files share a run of at least K + W − 1 matching tokens, at least
//! one common fingerprint is selected from that region.

/// A selected (hash, k-gram position) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fingerprint {
    pub hash: u64,
    /// K-gram index in the file's hash sequence, not a token index.
    pub position: usize,
}

/// Select fingerprints from a k-gram hash sequence.
///
/// A sequence that fits inside one window has nothing to thin: every hash is
/// selected, so small files keep full fingerprint support and identity
/// against their own copies. Output is ordered by position; positions are
/// strictly increasing.
pub fn select(hashes: &[u64], window: usize) -> Vec<Fingerprint> {
    if hashes.len() <= window {
        return hashes
            .iter()
            .enumerate()
            .map(|(position, &hash)| Fingerprint { hash, position })
            .collect();
    }

    let mut selected = Vec::new();
    let mut last_position: Option<usize> = None;
    for start in 0..=hashes.len() - window {
        let position = rightmost_min(&hashes[start..start + window], start);
        if last_position != Some(position) {
            selected.push(Fingerprint {
                hash: hashes[position],
                position,
            });
            last_position = Some(position);
        }
    }
    selected
}

/// Index of the rightmost minimum of `window`, offset by `base`.
fn rightmost_min(window: &[u64], base: usize) -> usize {
    let mut min_value = window[0];
    let mut min_index = 0;
    for (i, &h) in window.iter().enumerate() {
        if h <= min_value {
            min_value = h;
            min_index = i;
        }
    }
    base + min_index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(hashes: &[u64], w: usize) -> Vec<usize> {
        select(hashes, w).iter().map(|f| f.position).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(select(&[], 4).is_empty());
    }

    #[test]
    fn test_short_sequence_keeps_every_hash() {
        // Sequences within one window: nothing to thin, every hash selected.
        assert_eq!(positions(&[9, 2, 7], 15), vec![0, 1, 2]);
        assert_eq!(positions(&[9, 2, 7], 3), vec![0, 1, 2]);
        assert_eq!(positions(&[5], 15), vec![0]);
    }

    #[test]
    fn test_rightmost_minimum_on_ties() {
        // Two equal minima inside one window: the rightmost wins.
        assert_eq!(positions(&[3, 1, 1, 5], 4), vec![2]);
    }

    #[test]
    fn test_no_reemission_of_same_position() {
        // The minimum at index 1 covers the first two windows; emitted once.
        assert_eq!(positions(&[4, 1, 5, 6, 0], 3), vec![1, 4]);
    }

    #[test]
    fn test_every_window_is_covered() {
        let hashes: Vec<u64> = (0..200)
            .map(|i: u64| i.wrapping_mul(0x9E37_79B9_7F4A_7C15))
            .collect();
        let w = 15;
        let selected = positions(&hashes, w);
        for start in 0..=hashes.len() - w {
            assert!(
                selected.iter().any(|&p| p >= start && p < start + w),
                "window at {start} has no selected fingerprint"
            );
        }
    }

    #[test]
    fn test_positions_strictly_increasing() {
        let hashes: Vec<u64> = (0..100)
            .map(|i: u64| i.wrapping_mul(0x2545_F491_4F6C_DD1D) ^ 0x5555)
            .collect();
        let selected = positions(&hashes, 8);
        for pair in selected.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_density_on_periodic_minima() {
        // Hashes crafted so each window of W contains exactly one low value:
        // low values sit at multiples of W, everything else is high. The
        // selection picks exactly the low positions, matching the
        // 2·n/(W+1) + 1 density bound.
        let w = 15;
        let n = 300;
        let hashes: Vec<u64> = (0..n)
            .map(|i| {
                if i % w == 0 {
                    i as u64 // distinct lows
                } else {
                    1_000_000 + i as u64 // distinct highs
                }
            })
            .collect();
        let selected = positions(&hashes, w);
        assert!(selected.iter().all(|p| p % w == 0));
        let bound = (2 * n).div_ceil(w + 1) + 1;
        assert!(
            selected.len() <= bound,
            "{} selections exceed density bound {}",
            selected.len(),
            bound
        );
    }

    #[test]
    fn test_deterministic() {
        let hashes: Vec<u64> = (0..500)
            .map(|i: u64| i.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17))
            .collect();
        assert_eq!(select(&hashes, 15), select(&hashes, 15));
    }
}
