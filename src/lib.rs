//! # tabulator
//!
//! Bill-splitting ledger with penny-exact multi-currency settlement.
//!
//! Users record shared expenses on bills and assign each one to some of the
//! participants. The engine turns those items into integer-cent balances per
//! participant and per currency, and tells whether each bill is settled.
//!
//! ## Architecture
//!
//! - **core** — Participants, currency keys, items, bills, the ledger
//! - **normalize** — Reading amounts and currency markers from raw text
//! - **settlement** — Per-bill recompute and cross-bill totals
//! - **store** — Persistence traits plus JSON-file and in-memory stores
//! - **simulation** — Random bill generation for tests and benchmarks

pub mod core;
pub mod normalize;
pub mod settlement;
pub mod simulation;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::bill::{Bill, BillAggregates};
    pub use crate::core::currency::{CurrencyAmounts, CurrencyKey};
    pub use crate::core::item::{Item, NormalizeError};
    pub use crate::core::ledger::{Ledger, LedgerError, Startup};
    pub use crate::core::participant::{Participant, Roster, RosterError};
    pub use crate::normalize::normalizer::normalize;
    pub use crate::settlement::engine::SettlementEngine;
    pub use crate::settlement::totals::LedgerTotals;
    pub use crate::store::{BillStore, RosterStore, StoreError};
}
