//! Transfer Ledger - atomic fund transfers between accounts
//!
//! Accounts hold exact decimal balances. A transfer debits one account,
//! credits another and appends an immutable log entry, all inside one
//! unit of work: the three effects commit together or not at all.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier aliases and currency scale
//! - [`money`] - Exact decimal parsing, rounding and display
//! - [`error`] - Closed error taxonomy with response categories
//! - [`store`] - Unit-of-work seam (PostgreSQL and in-memory)
//! - [`db`] - PostgreSQL pool and schema
//! - [`account`] - Account rows, repository and service
//! - [`transaction`] - Append-only transaction log
//! - [`transfer`] - Transfer FSM and engine
//! - [`observer`] - Injected observability sink
//! - [`gateway`] - axum HTTP boundary
//! - [`config`] / [`logging`] - Process plumbing

// Core types - must be first!
pub mod core_types;

pub mod error;
pub mod money;

// Persistence
pub mod db;
pub mod store;

// Ledger components
pub mod account;
pub mod observer;
pub mod transaction;
pub mod transfer;

// Process plumbing
pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use account::{Account, AccountService};
pub use core_types::{AccountId, TransactionId};
pub use error::{ErrorCategory, LedgerError};
pub use observer::{LedgerEvent, LedgerObserver, NoopObserver, RecordingObserver, TracingObserver};
pub use store::{LedgerStore, MemoryLedgerStore, PgLedgerStore, StoreError, UnitOfWork};
pub use transaction::TransactionRecord;
pub use transfer::{TransferEngine, TransferState};
