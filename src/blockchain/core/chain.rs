use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::info;

use crate::crypto::{canonical_string, hash_block};
use crate::error::{ChainError, Result};
use crate::transaction::{AccountSummary, Transaction};

use super::pool::TransactionPool;
use super::validation::validate_chain;

/// `previous_hash` of the genesis block. Not a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "1";
/// `proof` of the genesis block. Never validated.
pub const GENESIS_PROOF: u64 = 100;

/// A sealed block. Field names are part of the hash input and must not be
/// renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub index: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn hash(&self) -> String {
        hash_block(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 1
    }
}

/// Current wall-clock time as fractional seconds.
pub fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// The append-only chain together with the pool of pending transactions.
///
/// A ledger always holds at least the genesis block. Every successful
/// [`Ledger::seal_block`] appends exactly one block and empties the pool in
/// the same step.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    pool: TransactionPool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_genesis_timestamp(now_seconds())
    }

    /// Ledger whose genesis block carries a fixed timestamp, so that its hash
    /// is known in advance.
    pub fn with_genesis_timestamp(timestamp: f64) -> Self {
        let genesis = Block {
            index: 1,
            timestamp,
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        };

        Ledger {
            blocks: vec![genesis],
            pool: TransactionPool::new(),
        }
    }

    pub fn tip(&self) -> Result<&Block> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    pub fn tip_hash(&self) -> Result<String> {
        self.tip().map(hash_block)
    }

    /// Canonical string of the tip; the context for server-side proofs.
    pub fn previous_block_string(&self) -> Result<String> {
        self.tip().map(canonical_string)
    }

    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Index the next sealed block will receive.
    pub fn next_index(&self) -> u64 {
        self.blocks.len() as u64 + 1
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    /// Queues a transaction for the next block and returns that block's index.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Number>,
    ) -> u64 {
        self.pool.submit(Transaction::new(sender, recipient, amount));
        self.next_index()
    }

    /// Seals the whole pool into a new block and appends it.
    ///
    /// `proof` is not checked here; callers validate it first. Without an
    /// explicit `previous_hash` the hash of the current tip is used.
    pub fn seal_block(&mut self, proof: u64, previous_hash: Option<String>) -> Result<Block> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self.tip_hash()?,
        };

        let block = Block {
            index: self.next_index(),
            timestamp: now_seconds(),
            transactions: self.pool.take_all(),
            proof,
            previous_hash,
        };

        info!(
            index = block.index,
            proof = block.proof,
            transactions = block.transactions.len(),
            "block sealed"
        );

        self.blocks.push(block.clone());
        Ok(block)
    }

    /// Checks that every block links to the hash of its predecessor.
    pub fn validate_chain(&self) -> Result<()> {
        validate_chain(&self.blocks)
    }

    pub fn account_summary(&self, id: &str, mint_sender: &str) -> AccountSummary {
        AccountSummary::from_blocks(id, &self.blocks, mint_sender)
    }
}
