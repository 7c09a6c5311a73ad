//! Account management module
//!
//! Account rows, the repository that owns balance reads and locked
//! writes, and the service that guards account creation and lookup.

pub mod models;
pub mod repository;
pub mod service;

pub use models::Account;
pub use repository::AccountRepository;
pub use service::AccountService;
