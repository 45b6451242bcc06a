//! Inverted fingerprint index over a set of tokenized files.
//!
//! Write-exclusive during the ingest phase, read-only afterwards; queries may
//! run freely in parallel once every file is registered.

use crate::hash::{hash_token, kgram_hashes};
use crate::winnow::{self, Fingerprint};
use pasplag_core::error::AnalysisError;
use pasplag_lexer::TokenizedFile;
use rustc_hash::FxHashMap;

/// Identifier of a file registered in the index.
pub type FileId = usize;

/// One posting: a selected fingerprint position in one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub file: FileId,
    /// K-gram index, not a token index.
    pub position: usize,
}

/// A k-gram present in both sides of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedKGram {
    pub hash: u64,
    /// K-gram position in the left file.
    pub left: usize,
    /// K-gram position in the right file.
    pub right: usize,
}

#[derive(Debug)]
struct IndexedFile {
    name: String,
    /// Selected fingerprints sorted by (hash, position).
    fingerprints: Vec<Fingerprint>,
    /// Per-file positions of each selected hash.
    by_hash: FxHashMap<u64, Vec<usize>>,
}

/// Inverted map from fingerprint hash to its occurrences across files.
#[derive(Debug)]
pub struct FingerprintIndex {
    kgram_size: usize,
    window_size: usize,
    files: Vec<IndexedFile>,
    postings: FxHashMap<u64, Vec<Occurrence>>,
}

impl FingerprintIndex {
    pub fn new(kgram_size: usize, window_size: usize) -> Self {
        Self {
            kgram_size,
            window_size,
            files: Vec::new(),
            postings: FxHashMap::default(),
        }
    }

    pub fn kgram_size(&self) -> usize {
        self.kgram_size
    }

    /// Tokenized-file ingest: hash k-grams, winnow, register every selected
    /// fingerprint. Returns the file's id within the index.
    pub fn add_file(&mut self, tf: &TokenizedFile) -> Result<FileId, AnalysisError> {
        if tf.is_empty() {
            return Err(AnalysisError::EmptyFile(tf.name().to_string()));
        }

        let token_hashes: Vec<u64> = tf.tokens().iter().map(|t| hash_token(&t.value)).collect();
        let kgrams = kgram_hashes(&token_hashes, self.kgram_size);
        let mut fingerprints = winnow::select(&kgrams, self.window_size);
        fingerprints.sort_unstable();

        let id = self.files.len();
        let mut by_hash: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
        for fp in &fingerprints {
            by_hash.entry(fp.hash).or_default().push(fp.position);
            self.postings.entry(fp.hash).or_default().push(Occurrence {
                file: id,
                position: fp.position,
            });
        }

        tracing::debug!(
            file = tf.name(),
            tokens = tf.len(),
            kgrams = kgrams.len(),
            fingerprints = fingerprints.len(),
            "indexed file"
        );

        self.files.push(IndexedFile {
            name: tf.name().to_string(),
            fingerprints,
            by_hash,
        });
        Ok(id)
    }

    pub fn file_name(&self, id: FileId) -> &str {
        &self.files[id].name
    }

    /// Number of selected fingerprints for a file.
    pub fn fingerprint_count(&self, id: FileId) -> usize {
        self.files[id].fingerprints.len()
    }

    /// Occurrences of a hash across all files.
    pub fn occurrences(&self, hash: u64) -> &[Occurrence] {
        self.postings.get(&hash).map_or(&[], Vec::as_slice)
    }

    /// All shared k-grams between two files: for every hash selected in both,
    /// the cross product of positions, sorted by (left, right).
    ///
    /// A file never pairs with itself; asking for it is a caller bug.
    pub fn shared_kgrams(&self, a: FileId, b: FileId) -> Vec<SharedKGram> {
        debug_assert!(a != b, "a file cannot be paired with itself");
        if a == b {
            return Vec::new();
        }

        let left = &self.files[a];
        let right = &self.files[b];
        let mut shared = Vec::new();
        for (&hash, left_positions) in &left.by_hash {
            let Some(right_positions) = right.by_hash.get(&hash) else {
                continue;
            };
            for &lp in left_positions {
                for &rp in right_positions {
                    shared.push(SharedKGram {
                        hash,
                        left: lp,
                        right: rp,
                    });
                }
            }
        }
        shared.sort_unstable_by_key(|s| (s.left, s.right));
        shared
    }
}
