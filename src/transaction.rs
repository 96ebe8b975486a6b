//! Transaction records and per-account views over sealed transactions

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::blockchain::Block;

/// A transfer of `amount` from `sender` to `recipient`.
///
/// Field values are never validated: empty strings, zero and negative
/// amounts are all accepted. `amount` keeps the exact JSON number it was
/// created with so that integers hash as integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Number,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Number>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// Amount as a float, for balance arithmetic.
    pub fn amount_f64(&self) -> f64 {
        self.amount.as_f64().unwrap_or(0.0)
    }

    pub fn is_mint(&self, mint_sender: &str) -> bool {
        self.sender == mint_sender
    }
}

/// Label shown in place of the sender for mining rewards.
pub const MINED_LABEL: &str = "mined";

/// A credit to the summarized account, with the sender as it is displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomingTransfer {
    #[serde(flatten)]
    pub transaction: Transaction,
    /// [`MINED_LABEL`] for rewards, the sender otherwise.
    pub from: String,
}

/// Balance and history of one account, derived from the sealed chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub id: String,
    pub balance: f64,
    pub incoming: Vec<IncomingTransfer>,
    pub outgoing: Vec<Transaction>,
}

impl AccountSummary {
    /// Walks every sealed transaction: credits where `id` is the recipient,
    /// debits where it is the sender. A self-transfer shows up on both sides.
    /// Credits from `mint_sender` are labelled [`MINED_LABEL`].
    pub fn from_blocks(id: &str, blocks: &[Block], mint_sender: &str) -> Self {
        let mut summary = AccountSummary {
            id: id.to_string(),
            balance: 0.0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        };

        for tx in blocks.iter().flat_map(|b| b.transactions.iter()) {
            if tx.recipient == id {
                summary.balance += tx.amount_f64();
                let from = if tx.is_mint(mint_sender) {
                    MINED_LABEL.to_string()
                } else {
                    tx.sender.clone()
                };
                summary.incoming.push(IncomingTransfer {
                    transaction: tx.clone(),
                    from,
                });
            }
            if tx.sender == id {
                summary.balance -= tx.amount_f64();
                summary.outgoing.push(tx.clone());
            }
        }

        summary
    }
}
