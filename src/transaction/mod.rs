//! Transaction log
//!
//! Append-only record of committed transfers. Entries are created once by
//! the transfer engine inside its unit of work and never updated.

pub mod models;
pub mod repository;

pub use models::{NewTransaction, TransactionRecord};
pub use repository::TransactionRepository;
