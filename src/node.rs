//! The node: one ledger, one identity and the two mining flows
//!
//! `Node` is a cheap cloneable handle. Every clone shares the same ledger, so
//! request handlers each hold their own copy instead of reaching for a
//! global.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Number;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::blockchain::{Block, Ledger};
use crate::config::{Config, MiningConfig, MiningMode};
use crate::error::{ChainError, Result};
use crate::miner::{is_valid_proof, ProofSearch};
use crate::transaction::AccountSummary;

/// Process-lifetime identifier of this node, used as the recipient of
/// mining rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodeIdentity(String);

impl NodeIdentity {
    /// A random UUIDv4 rendered as 32 lowercase hex characters, no dashes.
    pub fn generate() -> Self {
        NodeIdentity(Uuid::new_v4().simple().to_string())
    }

    pub fn new(identifier: impl Into<String>) -> Self {
        NodeIdentity(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full chain listing.
#[derive(Debug, Clone, Serialize)]
pub struct ChainSnapshot {
    pub length: usize,
    pub chain: Vec<Block>,
}

/// Everything an external miner needs to search for the next proof.
#[derive(Debug, Clone, Serialize)]
pub struct MiningContext {
    pub mode: String,
    pub index: u64,
    pub difficulty: u32,
    /// Context for client-submitted proofs.
    pub previous_hash: String,
    /// Context for server-side proofs.
    pub previous_block_string: String,
}

#[derive(Clone)]
pub struct Node {
    ledger: Arc<RwLock<Ledger>>,
    identity: NodeIdentity,
    mining: MiningConfig,
    search: ProofSearch,
}

impl Node {
    pub fn new(identity: NodeIdentity, mining: MiningConfig) -> Self {
        Self::with_ledger(Ledger::new(), identity, mining)
    }

    pub fn with_ledger(ledger: Ledger, identity: NodeIdentity, mining: MiningConfig) -> Self {
        info!(
            node_id = %identity,
            mode = %mining.mode,
            difficulty = mining.difficulty,
            "node created"
        );
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            identity,
            mining,
            search: ProofSearch::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let identity = match &config.node.identifier {
            Some(identifier) => NodeIdentity::new(identifier.clone()),
            None => NodeIdentity::generate(),
        };
        Self::new(identity, config.mining.clone())
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn mining_config(&self) -> &MiningConfig {
        &self.mining
    }

    pub fn submit_transaction(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Number>,
    ) -> u64 {
        let (sender, recipient) = (sender.into(), recipient.into());
        debug!(%sender, %recipient, "transaction submitted");
        self.ledger.write().submit_transaction(sender, recipient, amount)
    }

    /// Server-side mining: validate `supplied_proof` (or search for one)
    /// against the tip's canonical string, credit the reward to this node and
    /// seal.
    ///
    /// The search runs without any ledger lock. If another block was sealed
    /// meanwhile, the proof no longer matches the tip and the work restarts
    /// from the new tip.
    pub fn mine_server_side(&self, supplied_proof: Option<u64>) -> Result<Block> {
        let difficulty = self.mining.difficulty;

        loop {
            let (context, length) = {
                let ledger = self.ledger.read();
                (ledger.previous_block_string()?, ledger.len())
            };

            let proof = match supplied_proof {
                Some(proof) => {
                    if !is_valid_proof(&context, proof, difficulty) {
                        warn!(proof, difficulty, "rejected server-side proof");
                        return Err(ChainError::InvalidProof { proof });
                    }
                    proof
                }
                None => self
                    .search
                    .run(&context, difficulty)
                    .ok_or(ChainError::SearchCancelled)?,
            };

            let mut ledger = self.ledger.write();
            if ledger.len() != length {
                debug!(proof, "tip moved during mining, retrying against new tip");
                continue;
            }

            let previous_hash = ledger.tip_hash()?;
            ledger.submit_transaction(
                self.mining.mint_sender.clone(),
                self.identity.as_str(),
                self.mining.reward_amount.clone(),
            );
            return ledger.seal_block(proof, Some(previous_hash));
        }
    }

    /// Client-submitted mining: `proof` must be valid against the hash of the
    /// current tip. A `previous_hash` naming any other block means the proof
    /// was mined against a stale context and is rejected the same way. No
    /// reward is minted.
    pub fn mine_client_side(&self, proof: u64, previous_hash: Option<&str>) -> Result<Block> {
        let difficulty = self.mining.difficulty;
        let mut ledger = self.ledger.write();
        let expected = ledger.tip_hash()?;

        if let Some(previous_hash) = previous_hash {
            if previous_hash != expected {
                warn!(proof, %previous_hash, %expected, "proof mined against a stale block");
                return Err(ChainError::InvalidProof { proof });
            }
        }

        if !is_valid_proof(&expected, proof, difficulty) {
            warn!(proof, difficulty, "rejected client proof");
            return Err(ChainError::InvalidProof { proof });
        }

        ledger.seal_block(proof, Some(expected))
    }

    /// Dispatches to the flow selected by the configured mining mode.
    pub fn mine(&self, proof: Option<u64>, previous_hash: Option<&str>) -> Result<Block> {
        match self.mining.mode {
            MiningMode::Server => self.mine_server_side(proof),
            MiningMode::Client => {
                let proof = proof.ok_or_else(|| {
                    ChainError::MalformedRequest(
                        "a proof is required in client mining mode".to_string(),
                    )
                })?;
                self.mine_client_side(proof, previous_hash)
            }
        }
    }

    pub fn get_chain(&self) -> ChainSnapshot {
        let ledger = self.ledger.read();
        ChainSnapshot {
            length: ledger.len(),
            chain: ledger.chain().to_vec(),
        }
    }

    pub fn get_tip(&self) -> Result<Block> {
        self.ledger.read().tip().cloned()
    }

    pub fn pending_transactions(&self) -> usize {
        self.ledger.read().pool().len()
    }

    pub fn mining_context(&self) -> Result<MiningContext> {
        let ledger = self.ledger.read();
        Ok(MiningContext {
            mode: self.mining.mode.to_string(),
            index: ledger.next_index(),
            difficulty: self.mining.difficulty,
            previous_hash: ledger.tip_hash()?,
            previous_block_string: ledger.previous_block_string()?,
        })
    }

    pub fn account_summary(&self, id: &str) -> AccountSummary {
        self.ledger
            .read()
            .account_summary(id, &self.mining.mint_sender)
    }

    pub fn validate_chain(&self) -> Result<()> {
        self.ledger.read().validate_chain()
    }

    /// Stops any in-progress proof search. Sticky, for shutdown.
    pub fn cancel_search(&self) {
        info!("cancelling proof search");
        self.search.cancel();
    }
}
