use crate::core::currency::{CurrencyAmounts, CurrencyKey};
use crate::core::item::Item;
use crate::core::participant::Participant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Computed totals for one bill, all in integer cents.
///
/// Produced by [`crate::settlement::engine::SettlementEngine::recompute_bill`].
/// Never updated incrementally: any change to the bill's items replaces it
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillAggregates {
    /// Sum of debit items per currency. Credits do not count here.
    pub value_by_currency: CurrencyAmounts,
    /// Debits minus credits per currency.
    pub balance_by_currency: CurrencyAmounts,
    /// Each participant's share of the net balance per currency.
    pub balances_by_participant: BTreeMap<Participant, CurrencyAmounts>,
    /// True when every currency's net balance is zero.
    pub is_balanced: bool,
}

impl BillAggregates {
    /// A participant's balance in one currency, zero if they have none.
    pub fn participant_balance(&self, participant: &Participant, currency: &CurrencyKey) -> i64 {
        self.balances_by_participant
            .get(participant)
            .map(|amounts| amounts.get(currency))
            .unwrap_or(0)
    }
}

impl fmt::Display for BillAggregates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Value:   {}", self.value_by_currency)?;
        writeln!(f, "Balance: {}", self.balance_by_currency)?;
        writeln!(
            f,
            "Status:  {}",
            if self.is_balanced { "settled" } else { "unsettled" }
        )?;
        for (participant, amounts) in &self.balances_by_participant {
            writeln!(f, "  {}: {}", participant, amounts)?;
        }
        Ok(())
    }
}

/// A named collection of items plus its last computed aggregates.
///
/// A new bill has no aggregates until its first recompute, so
/// [`Bill::is_balanced`] reports `None` rather than claiming it is settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    id: Uuid,
    title: String,
    items: Vec<Item>,
    #[serde(default)]
    aggregates: Option<BillAggregates>,
    created_at: DateTime<Utc>,
}

impl Bill {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            items: Vec::new(),
            aggregates: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn aggregates(&self) -> Option<&BillAggregates> {
        self.aggregates.as_ref()
    }

    pub fn is_balanced(&self) -> Option<bool> {
        self.aggregates.as_ref().map(|a| a.is_balanced)
    }

    // The mutators below leave the aggregates stale; the ledger
    // recomputes right after calling them.

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn push_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub(crate) fn remove_item(&mut self, index: usize) -> Option<Item> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub(crate) fn set_aggregates(&mut self, aggregates: BillAggregates) {
        self.aggregates = Some(aggregates);
    }
}

impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.title)?;
        for (i, item) in self.items.iter().enumerate() {
            let names: Vec<&str> = item.participants().iter().map(|p| p.as_str()).collect();
            writeln!(
                f,
                "  [{}] {}{}{} {}{}{} ({})",
                i,
                item.title().map(|t| format!("{}: ", t)).unwrap_or_default(),
                item.currency().symbol_before(),
                item.raw_amount(),
                item.currency().symbol_after(),
                if item.is_split_each() { " each" } else { "" },
                if item.is_credit() { " credit" } else { "" },
                names.join(", ")
            )?;
        }
        match &self.aggregates {
            Some(aggregates) => write!(f, "{}", aggregates),
            None => writeln!(f, "(not yet calculated)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_item() -> Item {
        Item::new(
            dec!(5),
            CurrencyKey::before("$"),
            false,
            false,
            vec![Participant::new("A")],
        )
        .unwrap()
    }

    #[test]
    fn test_new_bill_is_unbalanced_unknown() {
        let bill = Bill::new("Dinner");
        assert_eq!(bill.title(), "Dinner");
        assert!(bill.items().is_empty());
        assert_eq!(bill.is_balanced(), None);
    }

    #[test]
    fn test_remove_item_out_of_range() {
        let mut bill = Bill::new("Dinner");
        bill.push_item(sample_item());
        assert!(bill.remove_item(3).is_none());
        assert!(bill.remove_item(0).is_some());
        assert!(bill.items().is_empty());
    }

    #[test]
    fn test_participant_balance_defaults_to_zero() {
        let aggregates = BillAggregates::default();
        assert_eq!(
            aggregates.participant_balance(&Participant::new("A"), &CurrencyKey::bare()),
            0
        );
    }

    #[test]
    fn test_bill_json_keeps_aggregates() {
        let mut bill = Bill::new("Trip");
        bill.push_item(sample_item());
        let mut aggregates = BillAggregates::default();
        aggregates.value_by_currency.add(&CurrencyKey::before("$"), 500);
        aggregates.balance_by_currency.add(&CurrencyKey::before("$"), 500);
        let mut amounts = CurrencyAmounts::new();
        amounts.add(&CurrencyKey::before("$"), 500);
        aggregates
            .balances_by_participant
            .insert(Participant::new("A"), amounts);
        bill.set_aggregates(aggregates);

        let json = serde_json::to_string(&bill).unwrap();
        let back: Bill = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bill);
    }
}
