use crate::core::bill::Bill;
use crate::core::participant::Roster;
use crate::store::{BillStore, RosterStore, StoreError};

/// Keeps everything in memory. Useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bills: Vec<Bill>,
    last_active_index: Option<usize>,
    roster: Option<Roster>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BillStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(self.bills.clone())
    }

    fn save_all(&mut self, bills: &[Bill]) -> Result<(), StoreError> {
        self.bills = bills.to_vec();
        Ok(())
    }

    fn last_active_index(&self) -> Result<Option<usize>, StoreError> {
        Ok(self.last_active_index)
    }

    fn set_last_active_index(&mut self, index: Option<usize>) -> Result<(), StoreError> {
        self.last_active_index = index;
        Ok(())
    }
}

impl RosterStore for MemoryStore {
    fn load_participants(&self) -> Result<Roster, StoreError> {
        Ok(self.roster.clone().unwrap_or_default())
    }

    fn save_participants(&mut self, roster: &Roster) -> Result<(), StoreError> {
        self.roster = Some(roster.clone());
        Ok(())
    }
}
