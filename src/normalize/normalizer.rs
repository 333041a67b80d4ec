use crate::core::item::{Item, NormalizeError};
use crate::core::participant::Participant;
use crate::normalize::amount::parse_amount;

/// Turn raw user input into an [`Item`].
///
/// The participant check runs before parsing, so an empty selection is
/// reported even when the amount is also unreadable. The item keeps the
/// unmultiplied amount; `is_each` only records that it is per participant.
///
/// # Examples
///
/// ```
/// use tabulator::core::participant::Participant;
/// use tabulator::normalize::normalizer::normalize;
///
/// let selected = vec![Participant::new("Me"), Participant::new("You")];
/// let item = normalize("$12.50", &selected, false, false).unwrap();
/// assert_eq!(item.cents(), 1250);
/// ```
pub fn normalize(
    raw_text: &str,
    selected_participants: &[Participant],
    is_each: bool,
    is_credit: bool,
) -> Result<Item, NormalizeError> {
    if selected_participants.is_empty() {
        log::debug!("No participants selected");
        return Err(NormalizeError::NoParticipantsSelected);
    }

    let parsed = parse_amount(raw_text)?;
    let item = Item::new(
        parsed.amount,
        parsed.currency,
        is_credit,
        is_each,
        selected_participants.to_vec(),
    )?;

    log::debug!(
        "Normalized {:?} to {} x{} in {}",
        raw_text,
        item.raw_amount(),
        item.multiplier(),
        item.currency()
    );
    Ok(item)
}
