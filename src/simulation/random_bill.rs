//! Random bill generation.
//!
//! Builds bills with awkward amounts and participant subsets for
//! benchmarks, property tests and the `generate` command.

use crate::core::bill::Bill;
use crate::core::currency::CurrencyKey;
use crate::core::item::Item;
use crate::core::participant::Participant;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random bill.
#[derive(Debug, Clone)]
pub struct RandomBillConfig {
    /// Number of participants to draw item subsets from.
    pub participant_count: usize,
    /// Currencies to use.
    pub currencies: Vec<CurrencyKey>,
    /// Number of items on the bill.
    pub item_count: usize,
    /// Largest amount per item, in cents.
    pub max_cents: i64,
    /// Chance that an item is a credit.
    pub credit_ratio: f64,
    /// Chance that an item is split-each.
    pub each_ratio: f64,
}

impl Default for RandomBillConfig {
    fn default() -> Self {
        Self {
            participant_count: 5,
            currencies: vec![CurrencyKey::before("$")],
            item_count: 20,
            max_cents: 100_000,
            credit_ratio: 0.2,
            each_ratio: 0.2,
        }
    }
}

/// Generate a bill of random items.
///
/// Amounts carry up to three decimal places so that the sub-cent floor is
/// exercised too. Every item has at least one participant.
pub fn generate_random_bill<R: Rng + ?Sized>(config: &RandomBillConfig, rng: &mut R) -> Bill {
    let participants: Vec<Participant> = (0..config.participant_count.max(1))
        .map(|i| Participant::new(format!("P{:02}", i)))
        .collect();
    let currencies = if config.currencies.is_empty() {
        vec![CurrencyKey::bare()]
    } else {
        config.currencies.clone()
    };

    let mut bill = Bill::new(format!("Random bill ({} items)", config.item_count));
    for _ in 0..config.item_count {
        let subset_size = rng.gen_range(1..=participants.len());
        let subset: Vec<Participant> = participants
            .choose_multiple(rng, subset_size)
            .cloned()
            .collect();

        let mills = rng.gen_range(0..=config.max_cents.max(0) * 10);
        let amount = Decimal::new(mills, 3);
        let currency = currencies[rng.gen_range(0..currencies.len())].clone();
        let is_credit = rng.gen_bool(config.credit_ratio.clamp(0.0, 1.0));
        let is_each = rng.gen_bool(config.each_ratio.clamp(0.0, 1.0));

        match Item::new(amount, currency, is_credit, is_each, subset) {
            Ok(item) => bill.push_item(item),
            Err(e) => log::warn!("Skipped generated item: {}", e),
        }
    }

    bill
}
