//! Error types for minichain

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// The submitted proof does not satisfy the difficulty predicate against
    /// the expected previous-block context. Nothing is mutated.
    #[error("Invalid proof: {proof} is not a valid proof")]
    InvalidProof { proof: u64 },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Unreachable once a ledger has been constructed, since genesis is
    /// always seeded.
    #[error("Chain is empty")]
    EmptyChain,

    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    #[error("Proof search was cancelled")]
    SearchCancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
