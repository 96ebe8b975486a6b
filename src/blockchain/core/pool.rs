use crate::transaction::Transaction;

/// Transactions waiting for the next block, in arrival order.
///
/// Only the [`Ledger`](super::chain::Ledger) owns a pool. Sealing a block
/// always takes the whole pool; there is no partial draining.
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tx` and returns the new pool length.
    pub fn submit(&mut self, tx: Transaction) -> usize {
        self.pending.push(tx);
        self.pending.len()
    }

    /// Empties the pool, returning everything it held.
    pub fn take_all(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
