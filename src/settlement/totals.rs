use crate::core::bill::Bill;
use crate::core::currency::{CurrencyAmounts, CurrencyKey};
use crate::core::participant::Participant;
use crate::settlement::engine::SettlementEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grand totals across every bill in a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of every participant balance, per currency.
    pub total_per_currency: CurrencyAmounts,
    /// Each participant's balance summed over all bills.
    pub total_balances: BTreeMap<Participant, CurrencyAmounts>,
}

impl LedgerTotals {
    /// A participant's overall balance in one currency.
    pub fn balance_for(&self, participant: &Participant, currency: &CurrencyKey) -> i64 {
        self.total_balances
            .get(participant)
            .map(|amounts| amounts.get(currency))
            .unwrap_or(0)
    }
}

impl std::fmt::Display for LedgerTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Standings ===")?;
        if self.total_balances.is_empty() {
            return writeln!(f, "Nothing recorded yet.");
        }
        for (participant, amounts) in &self.total_balances {
            writeln!(f, "  {}: {}", participant, amounts)?;
        }
        writeln!(f, "Total: {}", self.total_per_currency)
    }
}

impl SettlementEngine {
    /// Sum per-participant balances over all bills.
    ///
    /// Straight addition: every bill contributes, nothing is deduplicated.
    /// Bills that were never recomputed contribute nothing.
    pub fn aggregate_totals(bills: &[Bill]) -> LedgerTotals {
        let mut totals = LedgerTotals::default();

        for bill in bills {
            let aggregates = match bill.aggregates() {
                Some(aggregates) => aggregates,
                None => continue,
            };
            for (participant, amounts) in &aggregates.balances_by_participant {
                let participant_total = totals
                    .total_balances
                    .entry(participant.clone())
                    .or_default();
                for (currency, cents) in amounts {
                    participant_total.add(currency, *cents);
                    totals.total_per_currency.add(currency, *cents);
                }
            }
        }

        log::debug!(
            "Recomputed totals over {} bills: {}",
            bills.len(),
            totals.total_per_currency
        );
        totals
    }
}
