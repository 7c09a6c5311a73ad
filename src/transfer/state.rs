//! Transfer FSM State Definitions

use std::fmt;

/// Transfer FSM States
///
/// A transfer runs as one linear pass inside a single unit of work:
///
/// ```text
/// VALIDATING → DEBITING → CREDITING → RECORDING → COMMITTED
///      └──────────┴───────────┴───────────┴──────→ ABORTED
/// ```
///
/// Terminal states: COMMITTED (40), ABORTED (-10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum TransferState {
    /// Request checks; no unit of work is open yet
    Validating = 0,

    /// Source row locked and debited
    Debiting = 10,

    /// Destination row locked and credited
    Crediting = 20,

    /// Log entry appended, commit pending
    Recording = 30,

    /// Terminal: all three effects committed together
    Committed = 40,

    /// Terminal: unit of work rolled back, nothing persisted
    Aborted = -10,
}

impl TransferState {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Committed | TransferState::Aborted)
    }

    /// Whether a unit of work is open in this state
    #[inline]
    pub fn holds_unit_of_work(&self) -> bool {
        matches!(
            self,
            TransferState::Debiting | TransferState::Crediting | TransferState::Recording
        )
    }

    /// Next state on success; terminal states have none.
    pub fn next(&self) -> Option<Self> {
        match self {
            TransferState::Validating => Some(TransferState::Debiting),
            TransferState::Debiting => Some(TransferState::Crediting),
            TransferState::Crediting => Some(TransferState::Recording),
            TransferState::Recording => Some(TransferState::Committed),
            TransferState::Committed | TransferState::Aborted => None,
        }
    }

    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(TransferState::Validating),
            10 => Some(TransferState::Debiting),
            20 => Some(TransferState::Crediting),
            30 => Some(TransferState::Recording),
            40 => Some(TransferState::Committed),
            -10 => Some(TransferState::Aborted),
            _ => None,
        }
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Validating => "VALIDATING",
            TransferState::Debiting => "DEBITING",
            TransferState::Crediting => "CREDITING",
            TransferState::Recording => "RECORDING",
            TransferState::Committed => "COMMITTED",
            TransferState::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
