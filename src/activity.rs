//! Session log of confirmed transactions
//!
//! Nothing here is persisted, the log lives as long as the page does.

use crate::wallet::Receipt;
use alloy_primitives::B256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Deposit,
    Withdrawal,
    SetLimits,
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActivityKind::Deposit => "Deposit",
            ActivityKind::Withdrawal => "Withdrawal",
            ActivityKind::SetLimits => "Set limits",
        };
        f.write_str(label)
    }
}

/// One confirmed transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub kind: ActivityKind,
    /// Amount as shown to the user, e.g. `1.5 ETH` or `1 / 2 ETH`
    pub summary: String,
    pub hash: B256,
    pub block: Option<u64>,
    pub at: chrono::DateTime<chrono::Local>,
}

impl Activity {
    pub fn from_receipt(kind: ActivityKind, summary: String, receipt: &Receipt) -> Self {
        Activity {
            kind,
            summary,
            hash: receipt.transaction_hash,
            block: receipt.block(),
            at: chrono::Local::now(),
        }
    }

    /// Abbreviated hash for display
    pub fn short_hash(&self) -> String {
        let full = alloy_primitives::hex::encode_prefixed(self.hash);
        format!("{}…{}", &full[..10], &full[full.len() - 8..])
    }

    pub fn time(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

/// Newest first, bounded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityLog {
    entries: Vec<Activity>,
}

impl ActivityLog {
    pub const CAPACITY: usize = 20;

    pub fn record(&mut self, activity: Activity) {
        self.entries.insert(0, activity);
        self.entries.truncate(Self::CAPACITY);
    }

    pub fn entries(&self) -> &[Activity] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
