//! minichain - a minimal single-node proof-of-work ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the append-only ledger, the transaction pool and chain validation
//! - [`transaction`] - Transaction records and account summaries
//!
//! ## Mining
//! - [`miner`] - Proof-of-work search and validation
//! - [`node`] - Node identity and the server-side / client-submitted mining flows
//!
//! ## Cryptography
//! - [`crypto`] - Canonical block encoding and SHA-256 hashing
//!
//! ## Integration
//! - [`api`] - REST API over a [`node::Node`]
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Mining
// ============================================================================
pub mod miner;
pub mod node;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
