use crate::error::ChainError;

use super::chain::{Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};

/// Verifies the chain-link invariant: positions are 1-based and contiguous,
/// genesis carries its sentinels, and every later block's `previous_hash`
/// equals the hash of the block before it.
///
/// Proofs are not re-checked; they are validated once, at sealing time,
/// against whichever context the mining mode used.
pub fn validate_chain(blocks: &[Block]) -> Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::EmptyChain)?;
    if genesis.index != 1
        || genesis.previous_hash != GENESIS_PREVIOUS_HASH
        || genesis.proof != GENESIS_PROOF
    {
        return Err(ChainError::InvalidBlock(
            "Genesis block does not carry the sentinel index, proof and previous hash.".to_string(),
        ));
    }

    for (position, pair) in blocks.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);
        let expected_index = position as u64 + 2;

        if block.index != expected_index {
            return Err(ChainError::InvalidBlock(format!(
                "Invalid block index. Expected {}, but got {}.",
                expected_index, block.index
            )));
        }

        let expected_hash = previous.hash();
        if block.previous_hash != expected_hash {
            return Err(ChainError::InvalidBlock(format!(
                "Invalid previous block hash at index {}. Expected {}, but got {}.",
                block.index, expected_hash, block.previous_hash
            )));
        }
    }
    Ok(())
}
