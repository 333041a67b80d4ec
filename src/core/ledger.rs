use crate::core::bill::Bill;
use crate::core::currency::CurrencyKey;
use crate::core::item::{Item, NormalizeError};
use crate::core::participant::Participant;
use crate::normalize::normalizer::normalize;
use crate::settlement::engine::SettlementEngine;
use crate::settlement::totals::LedgerTotals;
use crate::store::{BillStore, StoreError};
use rand::Rng;
use thiserror::Error;

/// Most cents one currency may carry across every item in the ledger.
///
/// Every per-bill and cross-bill sum in a currency is bounded by this
/// volume, which keeps them inside `i64`.
pub const MAX_LEDGER_CENTS: i64 = 1_000_000_000_000_000_000;

/// Errors from ledger operations. All of them leave the ledger unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no bill is active")]
    NoActiveBill,
    #[error("bill index {index} out of range for {len} bills")]
    BillIndexOutOfRange { index: usize, len: usize },
    #[error("item index {index} out of range for {len} items")]
    ItemIndexOutOfRange { index: usize, len: usize },
    #[error("bill title must not be blank")]
    EmptyTitle,
    #[error("adding {cents} cents would take {currency} past the ledger limit")]
    AmountOutOfRange { currency: CurrencyKey, cents: i64 },
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// What the front end should do once the ledger is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    /// There are no bills yet; ask for the first one.
    NeedsFirstBill,
    Ready,
}

/// Every bill, the active-bill pointer and the grand totals.
///
/// Each mutation recomputes what it touched before returning: the changed
/// bill's aggregates (if its items or title changed) and then the totals.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    bills: Vec<Bill>,
    active: Option<usize>,
    totals: LedgerTotals,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored bills and the stored active index.
    ///
    /// A missing index means the first bill. An index past the end means no
    /// active bill. Totals are not computed until [`Ledger::initialize`].
    pub fn from_parts(bills: Vec<Bill>, last_active_index: Option<usize>) -> Self {
        let active = last_active_index
            .or(Some(0))
            .filter(|index| *index < bills.len());
        Self {
            bills,
            active,
            totals: LedgerTotals::default(),
        }
    }

    /// Load bills and the active index from a store.
    pub fn load<S: BillStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        let bills = store.load_all()?;
        let index = store.last_active_index()?;
        log::info!("Loaded {} bills, last active {:?}", bills.len(), index);
        Ok(Self::from_parts(bills, index))
    }

    /// Write bills and the active index to a store.
    pub fn save<S: BillStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.save_all(&self.bills)?;
        store.set_last_active_index(self.active)
    }

    /// Post-construction step, called once by the front end.
    pub fn initialize(&mut self) -> Startup {
        self.recompute_totals();
        if self.bills.is_empty() {
            Startup::NeedsFirstBill
        } else {
            Startup::Ready
        }
    }

    // --- Accessors ---

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn totals(&self) -> &LedgerTotals {
        &self.totals
    }

    pub fn last_active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_bill(&self) -> Option<&Bill> {
        self.active.and_then(|index| self.bills.get(index))
    }

    // --- Bills ---

    /// Append an empty bill and make it active. Returns its index.
    pub fn create_bill(&mut self, title: &str) -> Result<usize, LedgerError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LedgerError::EmptyTitle);
        }
        self.bills.push(Bill::new(title));
        let index = self.bills.len() - 1;
        self.active = Some(index);
        log::info!("Created bill '{}' at {}", title, index);
        self.recompute_totals();
        Ok(index)
    }

    pub fn select_bill(&mut self, index: usize) -> Result<&Bill, LedgerError> {
        if index >= self.bills.len() {
            return Err(LedgerError::BillIndexOutOfRange {
                index,
                len: self.bills.len(),
            });
        }
        self.active = Some(index);
        Ok(&self.bills[index])
    }

    pub fn rename_active_bill<R: Rng + ?Sized>(
        &mut self,
        title: &str,
        rng: &mut R,
    ) -> Result<(), LedgerError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LedgerError::EmptyTitle);
        }
        let index = self.active_index()?;
        self.bills[index].set_title(title);
        self.recompute_bill(index, rng);
        Ok(())
    }

    /// Remove the active bill and move the pointer.
    ///
    /// The pointer moves to the preceding bill, stays at 0 when the first
    /// bill was removed, and clears when no bills remain.
    pub fn delete_active_bill(&mut self) -> Result<Bill, LedgerError> {
        let index = self.active_index()?;
        let removed = self.bills.remove(index);
        self.active = if self.bills.is_empty() {
            None
        } else if index == 0 {
            Some(0)
        } else {
            Some(index - 1)
        };
        log::info!(
            "Deleted bill '{}', active now {:?}",
            removed.title(),
            self.active
        );
        self.recompute_totals();
        Ok(removed)
    }

    /// Drop every bill.
    pub fn delete_all(&mut self) {
        log::info!("Deleting all {} bills", self.bills.len());
        self.bills.clear();
        self.active = None;
        self.recompute_totals();
    }

    // --- Items ---

    /// Append an already-normalized item to the active bill.
    pub fn add_item<R: Rng + ?Sized>(&mut self, item: Item, rng: &mut R) -> Result<(), LedgerError> {
        let index = self.active_index()?;
        self.check_volume(&item)?;
        log::info!(
            "Added item {} to '{}'",
            item.id(),
            self.bills[index].title()
        );
        self.bills[index].push_item(item);
        self.recompute_bill(index, rng);
        Ok(())
    }

    /// Normalize raw input and add it to the active bill.
    ///
    /// Nothing changes if there is no active bill or the input is rejected.
    pub fn create_item<R: Rng + ?Sized>(
        &mut self,
        raw_text: &str,
        title: Option<&str>,
        selected_participants: &[Participant],
        is_each: bool,
        is_credit: bool,
        rng: &mut R,
    ) -> Result<&Item, LedgerError> {
        let index = self.active_index()?;
        let mut item = normalize(raw_text, selected_participants, is_each, is_credit)?;
        if let Some(title) = title {
            item = item.with_title(title);
        }
        self.add_item(item, rng)?;
        let items = self.bills[index].items();
        Ok(&items[items.len() - 1])
    }

    /// Remove an item from the active bill.
    pub fn delete_item<R: Rng + ?Sized>(
        &mut self,
        item_index: usize,
        rng: &mut R,
    ) -> Result<Item, LedgerError> {
        let index = self.active_index()?;
        let len = self.bills[index].items().len();
        let removed = self.bills[index]
            .remove_item(item_index)
            .ok_or(LedgerError::ItemIndexOutOfRange {
                index: item_index,
                len,
            })?;
        log::info!(
            "Deleted item {} from '{}'",
            removed.id(),
            self.bills[index].title()
        );
        self.recompute_bill(index, rng);
        Ok(removed)
    }

    // --- Recompute ---

    fn active_index(&self) -> Result<usize, LedgerError> {
        self.active
            .filter(|index| *index < self.bills.len())
            .ok_or(LedgerError::NoActiveBill)
    }

    /// Refuse an item that would push its currency's volume past
    /// [`MAX_LEDGER_CENTS`].
    fn check_volume(&self, item: &Item) -> Result<(), LedgerError> {
        let cents = item.cents();
        let used: i128 = self
            .bills
            .iter()
            .flat_map(|bill| bill.items())
            .filter(|existing| existing.currency() == item.currency())
            .map(|existing| i128::from(existing.cents()))
            .sum();
        if used + i128::from(cents) > i128::from(MAX_LEDGER_CENTS) {
            log::warn!(
                "Rejected item {}: {} already holds {} cents",
                item.id(),
                item.currency(),
                used
            );
            return Err(LedgerError::AmountOutOfRange {
                currency: item.currency().clone(),
                cents,
            });
        }
        Ok(())
    }

    fn recompute_bill<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) {
        let aggregates = SettlementEngine::recompute_bill(&self.bills[index], rng);
        self.bills[index].set_aggregates(aggregates);
        self.recompute_totals();
    }

    fn recompute_totals(&mut self) {
        self.totals = SettlementEngine::aggregate_totals(&self.bills);
    }
}
