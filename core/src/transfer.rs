//! Value-transfer collaborator.
//!
//! The ledger charges a fee per logged session but does not own balances.
//! Hosts plug in whatever moves value; transfers are assumed to succeed.

use serde::Serialize;

use carelog_types::Principal;

pub trait FeeTransfer {
    fn transfer(&mut self, amount: u64, from: &Principal, to: &Principal);
}

impl<T: FeeTransfer + ?Sized> FeeTransfer for &mut T {
    fn transfer(&mut self, amount: u64, from: &Principal, to: &Principal) {
        (**self).transfer(amount, from, to);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub amount: u64,
    pub from: Principal,
    pub to: Principal,
}

/// Records every transfer in call order.
#[derive(Debug, Clone, Default)]
pub struct TransferLog {
    records: Vec<TransferRecord>,
}

impl TransferLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    /// Sum of all amounts received by `to`.
    #[must_use]
    pub fn total_to(&self, to: &Principal) -> u64 {
        self.records
            .iter()
            .filter(|record| record.to == *to)
            .map(|record| record.amount)
            .sum()
    }
}

impl FeeTransfer for TransferLog {
    fn transfer(&mut self, amount: u64, from: &Principal, to: &Principal) {
        self.records.push(TransferRecord {
            amount,
            from: from.clone(),
            to: to.clone(),
        });
    }
}
