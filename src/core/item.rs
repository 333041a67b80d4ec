use crate::core::currency::CurrencyKey;
use crate::core::participant::Participant;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Largest total an item may carry, in cents (ten trillion units).
///
/// This bounds one item only. Running sums are bounded by the ledger's
/// per-currency volume limit, `MAX_LEDGER_CENTS`.
pub const MAX_ITEM_CENTS: i64 = 1_000_000_000_000_000;

/// Errors that stop an item from being created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no amount found in {0:?}")]
    InvalidAmount(String),
    #[error("no participants selected")]
    NoParticipantsSelected,
    #[error("amount {0} is too large")]
    AmountOutOfRange(Decimal),
}

/// One shared expense (or credit) on a bill.
///
/// `raw_amount` is stored exactly as entered. When `is_split_each` is set
/// it is a per-participant amount and the item's total is
/// `raw_amount × participants.len()`.
///
/// Items are immutable once created: editing is delete plus recreate.
///
/// # Examples
///
/// ```
/// use tabulator::core::currency::CurrencyKey;
/// use tabulator::core::item::Item;
/// use tabulator::core::participant::Participant;
/// use rust_decimal_macros::dec;
///
/// let item = Item::new(
///     dec!(10.00),
///     CurrencyKey::before("$"),
///     false,
///     true,
///     vec![Participant::new("A"), Participant::new("B"), Participant::new("C")],
/// )
/// .unwrap();
///
/// assert_eq!(item.cents(), 3000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: Uuid,
    #[serde(default)]
    title: Option<String>,
    raw_amount: Decimal,
    currency: CurrencyKey,
    is_credit: bool,
    is_split_each: bool,
    participants: Vec<Participant>,
    created_at: DateTime<Utc>,
}

impl Item {
    /// Create an item.
    ///
    /// Duplicate participants collapse onto their first occurrence. Fails if
    /// no participant remains, if the amount is negative, or if the total
    /// would exceed [`MAX_ITEM_CENTS`].
    pub fn new(
        raw_amount: Decimal,
        currency: CurrencyKey,
        is_credit: bool,
        is_split_each: bool,
        participants: Vec<Participant>,
    ) -> Result<Self, NormalizeError> {
        let mut unique: Vec<Participant> = Vec::with_capacity(participants.len());
        for p in participants {
            if !unique.contains(&p) {
                unique.push(p);
            }
        }
        if unique.is_empty() {
            return Err(NormalizeError::NoParticipantsSelected);
        }
        if raw_amount.is_sign_negative() && !raw_amount.is_zero() {
            return Err(NormalizeError::InvalidAmount(raw_amount.to_string()));
        }

        let multiplier = if is_split_each { unique.len() } else { 1 };
        if total_cents(raw_amount, multiplier).is_none() {
            return Err(NormalizeError::AmountOutOfRange(raw_amount));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title: None,
            raw_amount,
            currency,
            is_credit,
            is_split_each,
            participants: unique,
            created_at: Utc::now(),
        })
    }

    /// Attach a display label. Blank labels are dropped.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = if title.trim().is_empty() {
            None
        } else {
            Some(title)
        };
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn raw_amount(&self) -> Decimal {
        self.raw_amount
    }

    pub fn currency(&self) -> &CurrencyKey {
        &self.currency
    }

    pub fn is_credit(&self) -> bool {
        self.is_credit
    }

    pub fn is_split_each(&self) -> bool {
        self.is_split_each
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Participant count when split-each, otherwise 1.
    pub fn multiplier(&self) -> usize {
        if self.is_split_each {
            self.participants.len()
        } else {
            1
        }
    }

    /// Unsigned total in whole cents, `floor(raw_amount × multiplier × 100)`.
    ///
    /// Items only come out of [`Item::new`] within range. A stored item that
    /// was edited out of range by hand counts as zero.
    pub fn cents(&self) -> i64 {
        total_cents(self.raw_amount, self.multiplier()).unwrap_or_else(|| {
            log::warn!(
                "Item {} amount {} x{} is out of range, counted as 0",
                self.id,
                self.raw_amount,
                self.multiplier()
            );
            0
        })
    }

    /// Cents with the credit sign applied.
    pub fn signed_cents(&self) -> i64 {
        if self.is_credit {
            -self.cents()
        } else {
            self.cents()
        }
    }
}

fn total_cents(raw_amount: Decimal, multiplier: usize) -> Option<i64> {
    let cents = raw_amount
        .checked_mul(Decimal::from(multiplier))?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .floor()
        .to_i64()?;
    (0..=MAX_ITEM_CENTS).contains(&cents).then_some(cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn people(names: &[&str]) -> Vec<Participant> {
        names.iter().map(|n| Participant::new(*n)).collect()
    }

    #[test]
    fn test_item_creation() {
        let item = Item::new(
            dec!(12.50),
            CurrencyKey::before("$"),
            false,
            false,
            people(&["A", "B"]),
        )
        .unwrap();
        assert_eq!(item.raw_amount(), dec!(12.50));
        assert_eq!(item.currency().symbol_before(), "$");
        assert_eq!(item.multiplier(), 1);
        assert_eq!(item.cents(), 1250);
        assert_eq!(item.signed_cents(), 1250);
        assert!(item.title().is_none());
    }

    #[test]
    fn test_split_each_multiplies() {
        let item = Item::new(
            dec!(10.00),
            CurrencyKey::bare(),
            false,
            true,
            people(&["A", "B", "C"]),
        )
        .unwrap();
        assert_eq!(item.raw_amount(), dec!(10.00));
        assert_eq!(item.multiplier(), 3);
        assert_eq!(item.cents(), 3000);
    }

    #[test]
    fn test_credit_sign() {
        let item = Item::new(dec!(4), CurrencyKey::bare(), true, false, people(&["A"])).unwrap();
        assert_eq!(item.cents(), 400);
        assert_eq!(item.signed_cents(), -400);
    }

    #[test]
    fn test_sub_cent_amounts_floor() {
        let item = Item::new(dec!(0.299), CurrencyKey::bare(), false, false, people(&["A"])).unwrap();
        assert_eq!(item.cents(), 29);
        let item = Item::new(dec!(0.29), CurrencyKey::bare(), false, false, people(&["A"])).unwrap();
        assert_eq!(item.cents(), 29);
    }

    #[test]
    fn test_empty_participants_rejected() {
        let result = Item::new(dec!(1), CurrencyKey::bare(), false, false, Vec::new());
        assert_eq!(result.unwrap_err(), NormalizeError::NoParticipantsSelected);
    }

    #[test]
    fn test_duplicate_participants_collapse() {
        let item = Item::new(
            dec!(3),
            CurrencyKey::bare(),
            false,
            true,
            people(&["B", "A", "B"]),
        )
        .unwrap();
        assert_eq!(item.participants(), people(&["B", "A"]).as_slice());
        assert_eq!(item.cents(), 600);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let result = Item::new(
            dec!(20_000_000_000_000),
            CurrencyKey::bare(),
            false,
            false,
            people(&["A"]),
        );
        assert!(matches!(result, Err(NormalizeError::AmountOutOfRange(_))));
    }

    #[test]
    fn test_blank_title_dropped() {
        let item = Item::new(dec!(1), CurrencyKey::bare(), false, false, people(&["A"]))
            .unwrap()
            .with_title("  ");
        assert!(item.title().is_none());
        let item = item.with_title("Pizza");
        assert_eq!(item.title(), Some("Pizza"));
    }
}
