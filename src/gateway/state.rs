use std::sync::Arc;

use crate::account::AccountService;
use crate::observer::LedgerObserver;
use crate::store::LedgerStore;
use crate::transfer::TransferEngine;

/// Gateway shared state
pub struct AppState<S: LedgerStore> {
    pub accounts: AccountService<S>,
    pub engine: TransferEngine<S>,
    /// Kept for health checks
    pub store: Arc<S>,
}

impl<S: LedgerStore> AppState<S> {
    pub fn new(
        store: Arc<S>,
        observer: Arc<dyn LedgerObserver>,
        transfer_timeout: Option<std::time::Duration>,
    ) -> Self {
        let engine = TransferEngine::new(store.clone(), observer.clone());
        let engine = match transfer_timeout {
            Some(timeout) => engine.with_timeout(timeout),
            None => engine,
        };
        Self {
            accounts: AccountService::new(store.clone(), observer),
            engine,
            store,
        }
    }
}
