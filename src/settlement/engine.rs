use crate::core::bill::{Bill, BillAggregates};
use crate::core::currency::CurrencyAmounts;
use crate::core::item::Item;
use crate::core::participant::Participant;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// How a single item divides among its participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSplit {
    /// Item total in cents, negative for credits.
    pub signed_cents: i64,
    /// Whole-cent amount every participant receives, signed like the item.
    pub share: i64,
    /// Cents left over after equal division, always `0 <= remainder < n`.
    pub remainder: i64,
    /// The participants who absorb one leftover cent each.
    pub remainder_recipients: Vec<Participant>,
}

impl ItemSplit {
    /// What `participant` ends up with from this item.
    pub fn amount_for(&self, participant: &Participant) -> i64 {
        if self.remainder_recipients.contains(participant) {
            self.share + self.remainder_step()
        } else {
            self.share
        }
    }

    /// `+1` for debits, `-1` for credits and zero-cent items.
    fn remainder_step(&self) -> i64 {
        if self.signed_cents > 0 {
            1
        } else {
            -1
        }
    }
}

/// The settlement engine.
///
/// Turns a bill's items into integer-cent aggregates. Stateless: every call
/// recomputes from the items alone. The only input besides the items is the
/// random source used to place leftover cents.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Split one item into equal shares plus leftover cents.
    ///
    /// Share and remainder are taken on the unsigned total, so both round
    /// toward zero for credits too. The remainder goes one cent each to
    /// `remainder` distinct participants drawn uniformly at random.
    ///
    /// Returns `None` for an item without participants, which only stored
    /// data edited by hand can produce.
    pub fn split_item<R: Rng + ?Sized>(item: &Item, rng: &mut R) -> Option<ItemSplit> {
        let participants = item.participants();
        if participants.is_empty() {
            return None;
        }

        let cents = item.cents();
        let n = participants.len() as i64;
        let share = cents / n;
        let remainder = cents % n;

        let (signed_cents, share) = if item.is_credit() {
            (-cents, -share)
        } else {
            (cents, share)
        };

        let remainder_recipients: Vec<Participant> = participants
            .choose_multiple(rng, remainder as usize)
            .cloned()
            .collect();

        Some(ItemSplit {
            signed_cents,
            share,
            remainder,
            remainder_recipients,
        })
    }

    /// Compute all aggregates of a bill from its items.
    ///
    /// # Algorithm
    ///
    /// For each item in order:
    /// 1. `cents = floor(raw_amount × multiplier × 100)`.
    /// 2. Split into `share` and `remainder` (see [`Self::split_item`]).
    /// 3. Non-negative totals add to `value_by_currency`; every total adds
    ///    to `balance_by_currency`.
    /// 4. Every participant gets `share`; the remainder recipients get one
    ///    more cent in the item's direction.
    ///
    /// Per-currency totals are deterministic. Which participants absorb the
    /// leftover cents changes from call to call unless `rng` is seeded.
    ///
    /// For every currency the participant balances sum to the bill's
    /// balance in that currency.
    pub fn recompute_bill<R: Rng + ?Sized>(bill: &Bill, rng: &mut R) -> BillAggregates {
        let mut value_by_currency = CurrencyAmounts::new();
        let mut balance_by_currency = CurrencyAmounts::new();
        let mut balances_by_participant: BTreeMap<Participant, CurrencyAmounts> = BTreeMap::new();

        for item in bill.items() {
            let split = match Self::split_item(item, rng) {
                Some(split) => split,
                None => {
                    log::warn!("Skipping item {} with no participants", item.id());
                    continue;
                }
            };
            let currency = item.currency();

            balance_by_currency.add(currency, split.signed_cents);
            value_by_currency.touch(currency);
            if split.signed_cents >= 0 {
                value_by_currency.add(currency, split.signed_cents);
            }

            log::debug!(
                "{} ({}) split between {} = {} each plus {}",
                split.signed_cents,
                currency,
                item.participants().len(),
                split.share,
                split.remainder
            );

            for participant in item.participants() {
                balances_by_participant
                    .entry(participant.clone())
                    .or_default()
                    .add(currency, split.share);
            }
            for participant in &split.remainder_recipients {
                let step = split.remainder_step();
                balances_by_participant
                    .entry(participant.clone())
                    .or_default()
                    .add(currency, step);
                log::debug!("Added {} to balance of {}", step, participant);
            }
        }

        let is_balanced = balance_by_currency.all_zero();
        log::debug!(
            "Recomputed '{}': value [{}], balance [{}], balanced {}",
            bill.title(),
            value_by_currency,
            balance_by_currency,
            is_balanced
        );

        BillAggregates {
            value_by_currency,
            balance_by_currency,
            balances_by_participant,
            is_balanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn people(names: &[&str]) -> Vec<Participant> {
        names.iter().map(|n| Participant::new(*n)).collect()
    }

    fn item(amount: Decimal, currency: CurrencyKey, credit: bool, names: &[&str]) -> Item {
        Item::new(amount, currency, credit, false, people(names)).unwrap()
    }

    fn bill_with(items: Vec<Item>) -> Bill {
        let mut bill = Bill::new("Test");
        for item in items {
            bill.push_item(item);
        }
        bill
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_even_split() {
        let usd = CurrencyKey::before("$");
        let bill = bill_with(vec![item(dec!(30), usd.clone(), false, &["A", "B", "C"])]);
        let agg = SettlementEngine::recompute_bill(&bill, &mut rng());

        assert_eq!(agg.value_by_currency.get(&usd), 3000);
        assert_eq!(agg.balance_by_currency.get(&usd), 3000);
        for p in people(&["A", "B", "C"]) {
            assert_eq!(agg.participant_balance(&p, &usd), 1000);
        }
        assert!(!agg.is_balanced);
    }

    #[test]
    fn test_remainder_goes_to_exactly_one() {
        let usd = CurrencyKey::before("$");
        let bill = bill_with(vec![item(dec!(1.00), usd.clone(), false, &["A", "B", "C"])]);
        let agg = SettlementEngine::recompute_bill(&bill, &mut rng());

        let mut balances: Vec<i64> = people(&["A", "B", "C"])
            .iter()
            .map(|p| agg.participant_balance(p, &usd))
            .collect();
        balances.sort();
        assert_eq!(balances, vec![33, 33, 34]);
        assert_eq!(balances.iter().sum::<i64>(), 100);
    }

    #[test]
    fn test_credit_remainder_rounds_toward_zero() {
        let usd = CurrencyKey::before("$");
        let bill = bill_with(vec![item(dec!(1.00), usd.clone(), true, &["A", "B", "C"])]);
        let agg = SettlementEngine::recompute_bill(&bill, &mut rng());

        let mut balances: Vec<i64> = people(&["A", "B", "C"])
            .iter()
            .map(|p| agg.participant_balance(p, &usd))
            .collect();
        balances.sort();
        assert_eq!(balances, vec![-34, -33, -33]);
        assert_eq!(agg.balance_by_currency.get(&usd), -100);
        // Credits never count toward value, but the bucket still exists.
        assert_eq!(agg.value_by_currency.get(&usd), 0);
        assert!(agg.value_by_currency.contains(&usd));
    }

    #[test]
    fn test_debit_and_credit_balance() {
        let usd = CurrencyKey::before("$");
        let bill = bill_with(vec![
            item(dec!(10), usd.clone(), false, &["A", "B"]),
            item(dec!(10), usd.clone(), true, &["A", "B"]),
        ]);
        let agg = SettlementEngine::recompute_bill(&bill, &mut rng());

        assert_eq!(agg.balance_by_currency.get(&usd), 0);
        assert_eq!(agg.value_by_currency.get(&usd), 1000);
        assert!(agg.is_balanced);
        assert_eq!(agg.participant_balance(&Participant::new("A"), &usd), 0);
    }

    #[test]
    fn test_currencies_stay_separate() {
        let usd = CurrencyKey::before("$");
        let eur = CurrencyKey::after("€");
        let bill = bill_with(vec![
            item(dec!(10), usd.clone(), false, &["A", "B"]),
            item(dec!(10), eur.clone(), true, &["A", "B"]),
        ]);
        let agg = SettlementEngine::recompute_bill(&bill, &mut rng());

        assert_eq!(agg.balance_by_currency.get(&usd), 1000);
        assert_eq!(agg.balance_by_currency.get(&eur), -1000);
        assert_eq!(agg.balance_by_currency.len(), 2);
        assert!(!agg.is_balanced);
        assert_eq!(agg.participant_balance(&Participant::new("B"), &usd), 500);
        assert_eq!(agg.participant_balance(&Participant::new("B"), &eur), -500);
    }

    #[test]
    fn test_split_each_multiplier() {
        let usd = CurrencyKey::before("$");
        let each = Item::new(dec!(10.00), usd.clone(), false, true, people(&["A", "B", "C"])).unwrap();
        let bill = bill_with(vec![each]);
        let agg = SettlementEngine::recompute_bill(&bill, &mut rng());

        assert_eq!(agg.value_by_currency.get(&usd), 3000);
        assert_eq!(agg.participant_balance(&Participant::new("C"), &usd), 1000);
    }

    #[test]
    fn test_empty_bill_is_balanced() {
        let agg = SettlementEngine::recompute_bill(&Bill::new("Empty"), &mut rng());
        assert!(agg.is_balanced);
        assert!(agg.balance_by_currency.is_empty());
        assert!(agg.balances_by_participant.is_empty());
    }

    #[test]
    fn test_zero_amount_item() {
        let usd = CurrencyKey::before("$");
        let bill = bill_with(vec![item(dec!(0), usd.clone(), false, &["A", "B"])]);
        let agg = SettlementEngine::recompute_bill(&bill, &mut rng());
        assert!(agg.value_by_currency.contains(&usd));
        assert!(agg.is_balanced);
        assert_eq!(agg.participant_balance(&Participant::new("A"), &usd), 0);
    }

    #[test]
    fn test_split_item_out_of_range_stored_credit() {
        let valid = item(dec!(3), CurrencyKey::bare(), true, &["A", "B"]);
        let mut json = serde_json::to_value(&valid).unwrap();
        json["raw_amount"] = serde_json::json!("99999999999999999");
        let stored: Item = serde_json::from_value(json).unwrap();

        let split = SettlementEngine::split_item(&stored, &mut rng()).unwrap();
        assert_eq!(split.signed_cents, 0);
        assert_eq!(split.share, 0);
        assert_eq!(split.remainder, 0);

        let split = SettlementEngine::split_item(&valid, &mut rng()).unwrap();
        assert_eq!(split.signed_cents, -300);
        assert_eq!(split.share, -150);
    }

    #[test]
    fn test_split_item_parts() {
        let split = SettlementEngine::split_item(
            &item(dec!(1.01), CurrencyKey::bare(), false, &["A", "B", "C", "D"]),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(split.signed_cents, 101);
        assert_eq!(split.share, 25);
        assert_eq!(split.remainder, 1);
        assert_eq!(split.remainder_recipients.len(), 1);
        let recipient = split.remainder_recipients[0].clone();
        assert_eq!(split.amount_for(&recipient), 26);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let bill = bill_with(vec![
            item(dec!(1.00), CurrencyKey::bare(), false, &["A", "B", "C"]),
            item(dec!(2.02), CurrencyKey::bare(), true, &["A", "B", "C", "D", "E"]),
        ]);
        let first = SettlementEngine::recompute_bill(&bill, &mut StdRng::seed_from_u64(42));
        let second = SettlementEngine::recompute_bill(&bill, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_totals_stable_across_rngs() {
        let bill = bill_with(vec![
            item(dec!(1.00), CurrencyKey::bare(), false, &["A", "B", "C"]),
            item(dec!(0.07), CurrencyKey::bare(), true, &["B", "C", "D"]),
        ]);
        let first = SettlementEngine::recompute_bill(&bill, &mut StdRng::seed_from_u64(1));
        let second = SettlementEngine::recompute_bill(&bill, &mut StdRng::seed_from_u64(2));
        assert_eq!(first.value_by_currency, second.value_by_currency);
        assert_eq!(first.balance_by_currency, second.balance_by_currency);
    }
}
