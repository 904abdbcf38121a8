use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Credit balance shared by every request.
///
/// Deductions are conditional decrements, so concurrent requests can never
/// take the balance below zero. Each reset starts a new epoch; holds taken
/// in an earlier epoch are not refunded into the new balance.
#[derive(Debug)]
pub struct CreditLedger {
    balance: AtomicU64,
    initial: u64,
    epoch: AtomicU64,
}

impl CreditLedger {
    pub fn new(initial: u64) -> Self {
        Self {
            balance: AtomicU64::new(initial),
            initial,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance.load(Ordering::SeqCst)
    }

    /// Lower the balance by `amount` if it covers it; no effect otherwise
    pub fn deduct(&self, amount: u64) -> bool {
        self.balance
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |balance| balance.checked_sub(amount))
            .is_ok()
    }

    pub fn refund(&self, amount: u64) {
        let _ = self
            .balance
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |balance| Some(balance.saturating_add(amount)));
    }

    /// Restore the initial balance. The epoch moves after the store, so a
    /// hold racing the reset can lose its refund but never add one twice.
    pub fn reset(&self) {
        self.balance.store(self.initial, Ordering::SeqCst);
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Deduct `amount` and return a guard that refunds it unless committed
    pub fn hold(self: &Arc<Self>, amount: u64) -> Option<CreditHold> {
        let epoch = self.epoch();
        if !self.deduct(amount) {
            return None;
        }

        Some(CreditHold {
            ledger: Arc::clone(self),
            amount,
            epoch,
            committed: false,
        })
    }
}

/// Credits taken for one generation attempt.
///
/// Dropping the hold refunds the credits; [`CreditHold::commit`] keeps them.
#[derive(Debug)]
#[must_use = "dropping a hold refunds its credits immediately"]
pub struct CreditHold {
    ledger: Arc<CreditLedger>,
    amount: u64,
    epoch: u64,
    committed: bool,
}

impl CreditHold {
    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for CreditHold {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if self.ledger.epoch() != self.epoch {
            debug!(amount = self.amount, "balance was reset since the hold, refund skipped");
            return;
        }

        self.ledger.refund(self.amount);
        debug!(amount = self.amount, balance = self.ledger.balance(), "credits refunded");
    }
}
