use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A person who can share items and accrue balances.
///
/// Participants carry no state beyond their name. Two participants with the
/// same name are the same participant.
///
/// # Examples
///
/// ```
/// use tabulator::core::participant::Participant;
///
/// let alice = Participant::new("Alice");
/// let bob = Participant::new("Bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant(String);

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the participant's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Participant {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors from editing the participant roster.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("participant name must not be blank")]
    EmptyName,
    #[error("participant '{0}' is already on the roster")]
    Duplicate(Participant),
    #[error("participant '{0}' is not on the roster")]
    Unknown(Participant),
    #[error("a roster needs at least two participants, got {0}")]
    TooFew(usize),
}

/// The list of people items can be assigned to.
///
/// Kept sorted and duplicate-free. An empty roster is never observable:
/// removing the last name restores the default `Me` / `You` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Participant>", into = "Vec<Participant>")]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            participants: vec![Participant::new("Me"), Participant::new("You")],
        }
    }
}

impl From<Vec<Participant>> for Roster {
    fn from(mut participants: Vec<Participant>) -> Self {
        participants.sort();
        participants.dedup();
        if participants.is_empty() {
            return Self::default();
        }
        Self { participants }
    }
}

impl From<Roster> for Vec<Participant> {
    fn from(roster: Roster) -> Self {
        roster.participants
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn contains(&self, participant: &Participant) -> bool {
        self.participants.binary_search(participant).is_ok()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Add a participant, keeping the roster sorted.
    pub fn add(&mut self, name: &str) -> Result<&Participant, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        let participant = Participant::new(name);
        match self.participants.binary_search(&participant) {
            Ok(_) => Err(RosterError::Duplicate(participant)),
            Err(pos) => {
                log::info!("Added participant {}", participant);
                self.participants.insert(pos, participant);
                Ok(&self.participants[pos])
            }
        }
    }

    /// Remove a participant. Items already recorded keep their snapshot.
    pub fn remove(&mut self, name: &str) -> Result<Participant, RosterError> {
        let participant = Participant::new(name.trim());
        let pos = self
            .participants
            .binary_search(&participant)
            .map_err(|_| RosterError::Unknown(participant))?;
        let removed = self.participants.remove(pos);
        log::info!("Removed participant {}", removed);
        if self.participants.is_empty() {
            *self = Self::default();
        }
        Ok(removed)
    }

    /// Replace the whole roster. Needs at least two distinct non-blank names.
    pub fn replace<I, S>(&mut self, names: I) -> Result<(), RosterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut participants: Vec<Participant> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .map(Participant::new)
            .collect();
        participants.sort();
        participants.dedup();
        if participants.len() < 2 {
            return Err(RosterError::TooFew(participants.len()));
        }
        log::info!("Replaced roster with {} participants", participants.len());
        self.participants = participants;
        Ok(())
    }
}
