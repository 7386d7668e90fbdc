use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Unknown pet '{name}'. Available: {available}")]
    UnknownCreature { name: String, available: String },

    #[error("Team is full (capacity {capacity})")]
    SlotFull { capacity: usize },

    #[error("Slot {position} is already occupied")]
    SlotOccupied { position: usize },

    #[error("Slot {position} is outside a team of capacity {capacity}")]
    SlotOutOfRange { position: usize, capacity: usize },

    #[error("Engine invariant violated: {0}")]
    InvariantViolation(String),
}

impl SimError {
    /// Fatal errors abort the running battle or batch. Everything else is a
    /// caller mistake that leaves engine state untouched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SimError::InvariantViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
