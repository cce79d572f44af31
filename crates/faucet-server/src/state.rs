//! Per-account credit accounting.

use crate::coin::Amount;
use crate::error::{FaucetError, FaucetResult};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use tracing::{debug, info};

/// Credit given to one address in one denomination during the current window
#[derive(Debug, Clone)]
pub struct CreditEntry {
    pub total: Amount,
    pub window_start: DateTime<Utc>,
}

/// Tracks how much each address received, per denomination.
///
/// Totals reset once their window is older than the refresh window.
#[derive(Debug)]
pub struct CreditLedger {
    /// (address, denom) -> credit in the current window
    entries: DashMap<(String, String), CreditEntry>,
    refresh_window: Duration,
}

impl CreditLedger {
    pub fn new(refresh_window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            refresh_window,
        }
    }

    /// Reserve `amount` for `address`, failing if it would exceed `max`.
    ///
    /// The check and the update happen under the entry lock, so concurrent
    /// requests for the same address cannot both slip under the limit.
    pub fn reserve(
        &self,
        address: &str,
        denom: &str,
        amount: Amount,
        max: Amount,
    ) -> FaucetResult<()> {
        let now = Utc::now();
        let mut entry = self
            .entries
            .entry((address.to_string(), denom.to_string()))
            .or_insert_with(|| CreditEntry {
                total: Amount::ZERO,
                window_start: now,
            });

        if now.signed_duration_since(entry.window_start) >= self.refresh_window {
            entry.total = Amount::ZERO;
            entry.window_start = now;
        }

        let total = entry
            .total
            .checked_add(amount)
            .filter(|total| *total <= max)
            .ok_or_else(|| FaucetError::MaxCreditReached {
                max: max.to_string(),
                denom: denom.to_string(),
            })?;

        entry.total = total;
        debug!("Reserved {}{} for {} ({} in window)", amount, denom, address, total);
        Ok(())
    }

    /// Give back a reservation whose transfer did not happen.
    pub fn release(&self, address: &str, denom: &str, amount: Amount) {
        if let Some(mut entry) = self
            .entries
            .get_mut(&(address.to_string(), denom.to_string()))
        {
            entry.total = entry.total.saturating_sub(amount);
        }
    }

    /// Amount credited to `address` in the current window.
    pub fn credited(&self, address: &str, denom: &str) -> Amount {
        let now = Utc::now();
        self.entries
            .get(&(address.to_string(), denom.to_string()))
            .filter(|entry| now.signed_duration_since(entry.window_start) < self.refresh_window)
            .map(|entry| entry.total)
            .unwrap_or_default()
    }

    /// Drop entries whose window has expired.
    pub fn cleanup(&self) {
        let now = Utc::now();
        self.entries
            .retain(|_, entry| now.signed_duration_since(entry.window_start) < self.refresh_window);

        info!("Cleanup completed: {} credit entries", self.entries.len());
    }

    pub fn get_stats(&self) -> LedgerStats {
        let addresses: HashSet<String> = self.entries.iter().map(|e| e.key().0.clone()).collect();

        LedgerStats {
            entries: self.entries.len(),
            addresses: addresses.len(),
        }
    }
}

/// Statistics about the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    pub entries: usize,
    pub addresses: usize,
}
