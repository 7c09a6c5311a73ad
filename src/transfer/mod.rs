//! Atomic Transfer Protocol
//!
//! # State Machine
//!
//! ```text
//! VALIDATING → DEBITING → CREDITING → RECORDING → COMMITTED
//!      ↓           ↓          ↓           ↓
//!   ABORTED     ABORTED    ABORTED     ABORTED
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Validate Before Open**: rejected requests never open a unit of work
//! 2. **Single Rounding**: the amount is normalized once; debit, credit and
//!    log entry carry the same value
//! 3. **All-or-Nothing**: debit, credit and log append share one unit of
//!    work; any failure rolls all three back
//! 4. **Lock Then Check**: insufficient funds is decided only on a
//!    balance read under the row lock
//! 5. **No Internal Retry**: infrastructure failures surface as
//!    `Unavailable` and the caller decides whether to retry

pub mod engine;
pub mod state;
pub mod validation;

#[cfg(test)]
mod integration_tests;

pub use engine::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT, TransferEngine};
pub use state::TransferState;
