//! Persistence seams.
//!
//! The ledger never touches storage directly. A front end picks a store,
//! passes it to [`crate::core::ledger::Ledger::load`] and
//! [`crate::core::ledger::Ledger::save`], and owns any I/O failure.

pub mod json_file;
pub mod memory;

use crate::core::bill::Bill;
use crate::core::participant::Roster;
use thiserror::Error;

/// Errors from reading or writing stored data.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where bills and the last active bill index live.
pub trait BillStore {
    fn load_all(&self) -> Result<Vec<Bill>, StoreError>;
    fn save_all(&mut self, bills: &[Bill]) -> Result<(), StoreError>;
    fn last_active_index(&self) -> Result<Option<usize>, StoreError>;
    fn set_last_active_index(&mut self, index: Option<usize>) -> Result<(), StoreError>;
}

/// Where the participant roster lives.
pub trait RosterStore {
    /// Load the roster, or the default roster if none was saved.
    fn load_participants(&self) -> Result<Roster, StoreError>;
    fn save_participants(&mut self, roster: &Roster) -> Result<(), StoreError>;
}
