//! Proof-of-work search and validation
//!
//! A proof is valid for a context string when the SHA-256 hex digest of
//! `context + decimal(proof)` starts with `difficulty` `'0'` characters.
//! Server-side mining uses the canonical string of the previous block as
//! context; client-submitted mining uses the previous block's hash.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::crypto::sha256_hex;

/// Candidates tried between two looks at the cancel flag.
pub const SEARCH_BATCH: u64 = 10_000;

/// Length of a hex SHA-256 digest; no difficulty above this can be met.
pub const MAX_DIFFICULTY: u32 = 64;

/// True iff `hash` starts with at least `difficulty` `'0'` characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let required = difficulty as usize;
    hash.len() >= required && hash.bytes().take(required).all(|b| b == b'0')
}

pub fn is_valid_proof(context: &str, proof: u64, difficulty: u32) -> bool {
    let mut guess = String::with_capacity(context.len() + 20);
    guess.push_str(context);
    let _ = write!(guess, "{}", proof);
    meets_difficulty(&sha256_hex(guess.as_bytes()), difficulty)
}

/// Smallest non-negative proof valid for `context`.
///
/// Unbounded: expected cost is about `16^difficulty / 2` hashes, and a
/// difficulty above [`MAX_DIFFICULTY`] never returns.
pub fn search_proof(context: &str, difficulty: u32) -> u64 {
    let mut proof = 0u64;
    while !is_valid_proof(context, proof, difficulty) {
        proof += 1;
    }
    proof
}

/// Same scan as [`search_proof`], giving up with `None` once `cancel` is
/// observed set. The flag is checked every [`SEARCH_BATCH`] candidates.
pub fn search_proof_until(context: &str, difficulty: u32, cancel: &AtomicBool) -> Option<u64> {
    scan(context, difficulty, cancel, None)
}

fn scan(
    context: &str,
    difficulty: u32,
    cancel: &AtomicBool,
    hashes: Option<&AtomicU64>,
) -> Option<u64> {
    let mut guess = String::with_capacity(context.len() + 20);
    let mut proof = 0u64;

    loop {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }

        for _ in 0..SEARCH_BATCH {
            guess.clear();
            guess.push_str(context);
            let _ = write!(guess, "{}", proof);

            if meets_difficulty(&sha256_hex(guess.as_bytes()), difficulty) {
                if let Some(counter) = hashes {
                    counter.fetch_add(proof % SEARCH_BATCH + 1, Ordering::Relaxed);
                }
                return Some(proof);
            }
            proof += 1;
        }

        if let Some(counter) = hashes {
            counter.fetch_add(SEARCH_BATCH, Ordering::Relaxed);
        }
    }
}

/// Cancellable handle around the proof search, shared by everything that
/// mines on behalf of one node.
///
/// Cancelling is sticky: every run started after [`ProofSearch::cancel`]
/// returns `None` at once until [`ProofSearch::reset`] is called.
#[derive(Debug, Clone, Default)]
pub struct ProofSearch {
    cancelled: Arc<AtomicBool>,
    hashes_tried: Arc<AtomicU64>,
}

impl ProofSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the scan on the calling thread. Blocking; async callers should
    /// use `spawn_blocking`.
    pub fn run(&self, context: &str, difficulty: u32) -> Option<u64> {
        let start = Instant::now();
        debug!(difficulty, "proof search started");

        let found = scan(context, difficulty, &self.cancelled, Some(&self.hashes_tried));

        match found {
            Some(proof) => info!(
                proof,
                difficulty,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "proof found"
            ),
            None => info!(difficulty, "proof search cancelled"),
        }
        found
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Total candidates hashed by runs of this handle.
    pub fn hashes_tried(&self) -> u64 {
        self.hashes_tried.load(Ordering::Relaxed)
    }
}
