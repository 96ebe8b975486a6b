// Thin re-export module: implementation is in `blockchain/core.rs`, split
// into the chain itself, the pending transaction pool and chain validation.

pub mod core;
pub use self::core::*;
