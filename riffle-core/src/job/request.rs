//! Job requests and validation

use crate::state::Mode;

/// Players/cards request as received from the front end
///
/// Values are signed; anything non-positive is rejected by
/// [`validate`](Self::validate) rather than treated as a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JobRequest {
    pub players: i32,
    pub cards_per_player: i32,
}

/// Validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Player count is zero or negative
    NoPlayers,
    /// Cards per player is zero or negative
    NoCards,
    /// Player count does not fit a job
    TooManyPlayers,
    /// Cards per player does not fit a job
    TooManyCards,
}

impl ValidationError {
    /// Operator-facing reason
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::NoPlayers => "players must be positive",
            ValidationError::NoCards => "cards must be positive",
            ValidationError::TooManyPlayers => "too many players",
            ValidationError::TooManyCards => "too many cards",
        }
    }
}

/// Why a submission was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RejectReason {
    /// A job is already running (or the machine is faulted)
    Busy(Mode),
    /// The request failed validation
    Invalid(ValidationError),
}

impl From<ValidationError> for RejectReason {
    fn from(error: ValidationError) -> Self {
        RejectReason::Invalid(error)
    }
}

/// A validated job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Job {
    players: u16,
    cards_per_player: u16,
}

impl Job {
    pub fn players(&self) -> u16 {
        self.players
    }

    pub fn cards_per_player(&self) -> u16 {
        self.cards_per_player
    }

    /// Number of cards to deal
    pub fn total_cards(&self) -> u32 {
        u32::from(self.players) * u32::from(self.cards_per_player)
    }

    /// Check if card `index` (0-based) is the last of a hand
    pub fn ends_hand(&self, index: u32) -> bool {
        (index + 1) % u32::from(self.cards_per_player) == 0
    }
}

impl JobRequest {
    pub const fn new(players: i32, cards_per_player: i32) -> Self {
        Self {
            players,
            cards_per_player,
        }
    }

    /// Check the request and convert it into a runnable job
    pub fn validate(&self) -> Result<Job, ValidationError> {
        if self.players <= 0 {
            return Err(ValidationError::NoPlayers);
        }
        if self.cards_per_player <= 0 {
            return Err(ValidationError::NoCards);
        }
        let players = u16::try_from(self.players).map_err(|_| ValidationError::TooManyPlayers)?;
        let cards_per_player =
            u16::try_from(self.cards_per_player).map_err(|_| ValidationError::TooManyCards)?;

        Ok(Job {
            players,
            cards_per_player,
        })
    }
}
