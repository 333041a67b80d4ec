use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Where a currency marker sits relative to the amount.
///
/// Users type amounts like `$12.50` or `12,50€`. The marker is kept as
/// entered, either before or after the number, never both. Two amounts
/// belong to the same currency bucket only if both halves match exactly,
/// so `$5` and `5$` are tracked separately.
///
/// # Examples
///
/// ```
/// use tabulator::core::currency::CurrencyKey;
///
/// let dollars = CurrencyKey::before("$");
/// let euros = CurrencyKey::after("€");
/// assert_ne!(dollars, euros);
/// assert_eq!(dollars.format_cents(1250), "$12.50");
/// assert_eq!(euros.format_cents(-305), "-3.05€");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyKey {
    #[serde(rename = "currency_before")]
    before: String,
    #[serde(rename = "currency_after")]
    after: String,
}

impl CurrencyKey {
    /// Build a key from trimmed prefix and suffix markers.
    ///
    /// A non-empty prefix wins: the suffix is dropped.
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        let before = before.into().trim().to_string();
        let after = if before.is_empty() {
            after.into().trim().to_string()
        } else {
            String::new()
        };
        Self { before, after }
    }

    pub fn before(symbol: impl Into<String>) -> Self {
        Self::new(symbol, "")
    }

    pub fn after(symbol: impl Into<String>) -> Self {
        Self::new("", symbol)
    }

    /// Key for amounts entered without any marker.
    pub fn bare() -> Self {
        Self::default()
    }

    pub fn symbol_before(&self) -> &str {
        &self.before
    }

    pub fn symbol_after(&self) -> &str {
        &self.after
    }

    /// Render an integer-cent amount with this key's markers.
    pub fn format_cents(&self, cents: i64) -> String {
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        format!(
            "{}{}{}.{:02}{}",
            sign,
            self.before,
            abs / 100,
            abs % 100,
            self.after
        )
    }
}

impl fmt::Display for CurrencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.before.is_empty() && self.after.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}{}", self.before, self.after)
        }
    }
}

/// One serialized bucket: `{ "currency_before", "value", "currency_after" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyEntry {
    #[serde(flatten)]
    pub currency: CurrencyKey,
    pub value: i64,
}

/// Integer-cent amounts bucketed by [`CurrencyKey`].
///
/// Iteration follows key order, so output built from it is stable.
/// Serialized as a list of entries rather than a map because JSON object
/// keys must be strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CurrencyEntry>", into = "Vec<CurrencyEntry>")]
pub struct CurrencyAmounts {
    amounts: BTreeMap<CurrencyKey, i64>,
}

impl CurrencyAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `cents` to the bucket for `currency`, creating it at zero first.
    ///
    /// Clamps at the `i64` bounds with a warning rather than wrapping. The
    /// ledger refuses items that could get there, so only hand-edited
    /// stored data reaches the clamp.
    pub fn add(&mut self, currency: &CurrencyKey, cents: i64) {
        let bucket = self.amounts.entry(currency.clone()).or_insert(0);
        match bucket.checked_add(cents) {
            Some(sum) => *bucket = sum,
            None => {
                log::warn!("{} total overflowed adding {}, clamped", currency, cents);
                *bucket = bucket.saturating_add(cents);
            }
        }
    }

    /// Make sure a bucket exists without changing its value.
    pub fn touch(&mut self, currency: &CurrencyKey) {
        self.amounts.entry(currency.clone()).or_insert(0);
    }

    /// Amount in `currency`, zero when the bucket does not exist.
    pub fn get(&self, currency: &CurrencyKey) -> i64 {
        self.amounts.get(currency).copied().unwrap_or(0)
    }

    pub fn contains(&self, currency: &CurrencyKey) -> bool {
        self.amounts.contains_key(currency)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, CurrencyKey, i64> {
        self.amounts.iter()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyKey> {
        self.amounts.keys()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// True when every bucket holds exactly zero (vacuously true when empty).
    pub fn all_zero(&self) -> bool {
        self.amounts.values().all(|v| *v == 0)
    }
}

impl<'a> IntoIterator for &'a CurrencyAmounts {
    type Item = (&'a CurrencyKey, &'a i64);
    type IntoIter = btree_map::Iter<'a, CurrencyKey, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.amounts.iter()
    }
}

impl From<Vec<CurrencyEntry>> for CurrencyAmounts {
    fn from(entries: Vec<CurrencyEntry>) -> Self {
        let mut amounts = CurrencyAmounts::new();
        for entry in entries {
            amounts.add(&entry.currency, entry.value);
        }
        amounts
    }
}

impl From<CurrencyAmounts> for Vec<CurrencyEntry> {
    fn from(amounts: CurrencyAmounts) -> Self {
        amounts
            .amounts
            .into_iter()
            .map(|(currency, value)| CurrencyEntry { currency, value })
            .collect()
    }
}

impl fmt::Display for CurrencyAmounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .amounts
            .iter()
            .map(|(currency, cents)| currency.format_cents(*cents))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
