//! Integration Tests for the Transfer Engine
//!
//! These tests drive the complete FSM against the in-memory store, wrapped
//! in a fault-injecting store so every abort path can be forced. The
//! wrapper can also report serializable isolation, which sends the engine
//! down the PostgreSQL path: no pre-lock, debit row first.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;

use crate::account::Account;
use crate::core_types::{AccountId, TransactionId};
use crate::error::{ErrorCategory, LedgerError};
use crate::observer::{LedgerEvent, RecordingObserver};
use crate::store::memory::MemoryUnitOfWork;
use crate::store::{LedgerStore, MemoryLedgerStore, StoreError, UnitOfWork};
use crate::transaction::{NewTransaction, TransactionRecord};
use crate::transfer::{TransferEngine, TransferState};

// ============================================================================
// Fault-injecting store
// ============================================================================

/// Where the next operations should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Begin,
    Exists,
    WriteBalance(AccountId),
    /// Locked read of this row fails the way SQLSTATE 40001 does
    LockConflict(AccountId),
    InsertTransaction,
    /// Append succeeds, but only after sleeping this long
    SlowInsert(Duration),
    Commit,
    /// Commit succeeds, but only after sleeping this long
    SlowCommit(Duration),
}

struct FaultyStore {
    inner: MemoryLedgerStore,
    fault: Mutex<Option<Fault>>,
    begin_count: AtomicUsize,
    serializable: bool,
    /// Every `lock_balance` call, in order
    lock_log: Arc<Mutex<Vec<AccountId>>>,
}

impl FaultyStore {
    fn new() -> Self {
        Self::with_isolation(false)
    }

    /// Claims serializable isolation like the PostgreSQL store
    fn reporting_serializable() -> Self {
        Self::with_isolation(true)
    }

    fn with_isolation(serializable: bool) -> Self {
        Self {
            inner: MemoryLedgerStore::new(),
            fault: Mutex::new(None),
            begin_count: AtomicUsize::new(0),
            serializable,
            lock_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take_lock_log(&self) -> Vec<AccountId> {
        std::mem::take(&mut *self.lock_log.lock().unwrap())
    }

    fn set_fault(&self, fault: Option<Fault>) {
        *self.fault.lock().unwrap() = fault;
    }

    fn fault(&self) -> Option<Fault> {
        *self.fault.lock().unwrap()
    }

    fn begin_count(&self) -> usize {
        self.begin_count.load(Ordering::SeqCst)
    }
}

struct FaultyUnit {
    inner: MemoryUnitOfWork,
    fault: Option<Fault>,
    lock_log: Arc<Mutex<Vec<AccountId>>>,
}

fn injected(point: &str) -> StoreError {
    StoreError::Unavailable(format!("injected failure at {point}"))
}

#[async_trait]
impl UnitOfWork for FaultyUnit {
    async fn lock_balance(
        &mut self,
        account_id: AccountId,
    ) -> Result<Option<Decimal>, StoreError> {
        self.lock_log.lock().unwrap().push(account_id);
        if self.fault == Some(Fault::LockConflict(account_id)) {
            return Err(StoreError::Conflict(
                "could not serialize access due to concurrent update".into(),
            ));
        }
        self.inner.lock_balance(account_id).await
    }

    async fn write_balance(
        &mut self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<(), StoreError> {
        if self.fault == Some(Fault::WriteBalance(account_id)) {
            return Err(injected("write_balance"));
        }
        self.inner.write_balance(account_id, balance).await
    }

    async fn insert_transaction(
        &mut self,
        entry: &NewTransaction,
    ) -> Result<TransactionRecord, StoreError> {
        match self.fault {
            Some(Fault::InsertTransaction) => return Err(injected("insert_transaction")),
            Some(Fault::SlowInsert(delay)) => tokio::time::sleep(delay).await,
            _ => {}
        }
        self.inner.insert_transaction(entry).await
    }

    async fn commit(self) -> Result<(), StoreError> {
        match self.fault {
            Some(Fault::Commit) => {
                return Err(StoreError::Conflict("injected serialization failure".into()));
            }
            Some(Fault::SlowCommit(delay)) => tokio::time::sleep(delay).await,
            _ => {}
        }
        self.inner.commit().await
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.inner.rollback().await
    }
}

#[async_trait]
impl LedgerStore for FaultyStore {
    type Unit = FaultyUnit;

    fn name(&self) -> &'static str {
        "faulty"
    }

    fn serializable(&self) -> bool {
        self.serializable
    }

    async fn begin(&self) -> Result<FaultyUnit, StoreError> {
        self.begin_count.fetch_add(1, Ordering::SeqCst);
        let fault = self.fault();
        if fault == Some(Fault::Begin) {
            return Err(injected("begin"));
        }
        Ok(FaultyUnit {
            inner: self.inner.begin().await?,
            fault,
            lock_log: self.lock_log.clone(),
        })
    }

    async fn insert_account(
        &self,
        account_id: AccountId,
        balance: Decimal,
    ) -> Result<Account, StoreError> {
        self.inner.insert_account(account_id, balance).await
    }

    async fn fetch_account(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        self.inner.fetch_account(account_id).await
    }

    async fn account_exists(&self, account_id: AccountId) -> Result<bool, StoreError> {
        if self.fault() == Some(Fault::Exists) {
            return Err(injected("account_exists"));
        }
        self.inner.account_exists(account_id).await
    }

    async fn fetch_balance(&self, account_id: AccountId) -> Result<Option<Decimal>, StoreError> {
        self.inner.fetch_balance(account_id).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        self.inner.list_accounts().await
    }

    async fn fetch_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        self.inner.fetch_transaction(transaction_id).await
    }

    async fn transactions_for_account(
        &self,
        account_id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        self.inner
            .transactions_for_account(account_id, limit, offset)
            .await
    }

    async fn list_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        self.inner.list_transactions().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

// ============================================================================
// Harness
// ============================================================================

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

struct TestHarness {
    engine: TransferEngine<FaultyStore>,
    store: Arc<FaultyStore>,
    observer: Arc<RecordingObserver>,
}

impl TestHarness {
    async fn new(accounts: &[(AccountId, &str)]) -> Self {
        Self::over(FaultyStore::new(), accounts).await
    }

    async fn serializable(accounts: &[(AccountId, &str)]) -> Self {
        Self::over(FaultyStore::reporting_serializable(), accounts).await
    }

    async fn over(store: FaultyStore, accounts: &[(AccountId, &str)]) -> Self {
        let store = Arc::new(store);
        for (id, balance) in accounts {
            store.insert_account(*id, d(balance)).await.unwrap();
        }
        let observer = Arc::new(RecordingObserver::new());
        let engine = TransferEngine::new(store.clone(), observer.clone());
        Self {
            engine,
            store,
            observer,
        }
    }

    async fn balance(&self, account_id: AccountId) -> Decimal {
        self.store.fetch_balance(account_id).await.unwrap().unwrap()
    }

    fn log_len(&self) -> usize {
        self.store.inner.transaction_count()
    }

    fn total(&self) -> Decimal {
        self.store.inner.total_balance()
    }
}

// ============================================================================
// Happy Path Tests
// ============================================================================

#[tokio::test]
async fn test_transfer_then_insufficient_funds() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;

    let record = h.engine.transfer(1, 2, d("30.00")).await.unwrap();
    assert_eq!(record.source_account_id, 1);
    assert_eq!(record.destination_account_id, 2);
    assert_eq!(record.amount, d("30.00"));
    assert_eq!(h.balance(1).await, d("70.00"));
    assert_eq!(h.balance(2).await, d("30.00"));

    let err = h.engine.transfer(1, 2, d("1000.00")).await.unwrap_err();
    assert_eq!(err, LedgerError::InsufficientFunds);
    assert_eq!(err.category(), ErrorCategory::Unprocessable);
    assert_eq!(h.balance(1).await, d("70.00"));
    assert_eq!(h.balance(2).await, d("30.00"));
    assert_eq!(h.log_len(), 1);

    assert_eq!(h.observer.committed_count(), 1);
    assert_eq!(
        h.observer.aborts(),
        vec![(TransferState::Debiting, LedgerError::InsufficientFunds)]
    );
}

#[tokio::test]
async fn test_transfer_entire_balance() {
    let h = TestHarness::new(&[(1, "30.00"), (2, "0.00")]).await;
    h.engine.transfer(1, 2, d("30.00")).await.unwrap();
    assert_eq!(h.balance(1).await, Decimal::ZERO);
    assert_eq!(h.balance(2).await, d("30.00"));
}

#[tokio::test]
async fn test_amount_rounded_once_for_all_effects() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;

    let record = h.engine.transfer(1, 2, d("10.005")).await.unwrap();
    assert_eq!(record.amount, d("10.01"));
    assert_eq!(h.balance(1).await, d("89.99"));
    assert_eq!(h.balance(2).await, d("10.01"));
}

#[tokio::test]
async fn test_sub_cent_amount_rejected_as_non_positive() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;
    assert_eq!(
        h.engine.transfer(1, 2, d("0.004")).await.unwrap_err(),
        LedgerError::NonPositiveAmount
    );
    assert_eq!(h.store.begin_count(), 0);
}

#[tokio::test]
async fn test_reverse_direction_transfer() {
    let h = TestHarness::new(&[(1, "5.00"), (2, "50.00")]).await;
    h.engine.transfer(2, 1, d("20.00")).await.unwrap();
    assert_eq!(h.balance(1).await, d("25.00"));
    assert_eq!(h.balance(2).await, d("30.00"));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn test_same_account_rejected_for_any_amount() {
    let h = TestHarness::new(&[(1, "100.00")]).await;

    for amount in ["30.00", "0", "-5", "100000"] {
        assert_eq!(
            h.engine.transfer(1, 1, d(amount)).await.unwrap_err(),
            LedgerError::SameAccountTransfer
        );
    }
    assert_eq!(h.balance(1).await, d("100.00"));
    assert_eq!(h.store.begin_count(), 0);
    assert_eq!(h.log_len(), 0);
}

#[tokio::test]
async fn test_missing_source_fails_before_any_lock() {
    let h = TestHarness::new(&[(1, "100.00")]).await;

    assert_eq!(
        h.engine.transfer(999, 1, d("10")).await.unwrap_err(),
        LedgerError::SourceAccountNotFound
    );
    assert_eq!(
        h.engine.transfer(1, 999, d("10")).await.unwrap_err(),
        LedgerError::DestinationAccountNotFound
    );
    assert_eq!(h.store.begin_count(), 0);
    assert_eq!(h.balance(1).await, d("100.00"));
}

#[tokio::test]
async fn test_invalid_identifiers() {
    let h = TestHarness::new(&[(1, "100.00")]).await;
    assert_eq!(
        h.engine.transfer(0, 1, d("10")).await.unwrap_err(),
        LedgerError::InvalidAccountIdentifier
    );
    assert_eq!(
        h.engine.transfer(1, -4, d("10")).await.unwrap_err(),
        LedgerError::InvalidAccountIdentifier
    );
}

#[tokio::test]
async fn test_existence_lookup_failure_reported_as_not_found() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;
    h.store.set_fault(Some(Fault::Exists));

    let err = h.engine.transfer(1, 2, d("10")).await.unwrap_err();
    assert_eq!(err, LedgerError::SourceAccountNotFound);
    assert_eq!(h.store.begin_count(), 0);
}

// ============================================================================
// Atomicity Tests
// ============================================================================

#[tokio::test]
async fn test_credit_failure_rolls_back_debit() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;
    h.store.set_fault(Some(Fault::WriteBalance(2)));

    let err = h.engine.transfer(1, 2, d("40")).await.unwrap_err();
    assert_eq!(err, LedgerError::CreditFailed);
    assert_eq!(err.category(), ErrorCategory::Unavailable);

    assert_eq!(h.balance(1).await, d("100.00"));
    assert_eq!(h.balance(2).await, d("0.00"));
    assert_eq!(h.log_len(), 0);
    assert_eq!(
        h.observer.aborts(),
        vec![(TransferState::Crediting, LedgerError::CreditFailed)]
    );
}

#[tokio::test]
async fn test_debit_write_failure() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;
    h.store.set_fault(Some(Fault::WriteBalance(1)));

    assert_eq!(
        h.engine.transfer(1, 2, d("40")).await.unwrap_err(),
        LedgerError::DebitFailed
    );
    assert_eq!(h.balance(1).await, d("100.00"));
}

#[tokio::test]
async fn test_record_failure_rolls_back_both_balances() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;
    h.store.set_fault(Some(Fault::InsertTransaction));

    assert_eq!(
        h.engine.transfer(1, 2, d("40")).await.unwrap_err(),
        LedgerError::RecordFailed
    );
    assert_eq!(h.balance(1).await, d("100.00"));
    assert_eq!(h.balance(2).await, d("0.00"));
    assert_eq!(h.log_len(), 0);
}

#[tokio::test]
async fn test_commit_failure_is_retryable_debit_failure() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;
    h.store.set_fault(Some(Fault::Commit));

    let err = h.engine.transfer(1, 2, d("40")).await.unwrap_err();
    assert_eq!(err, LedgerError::DebitFailed);
    assert!(err.category().is_retryable());
    assert_eq!(h.balance(1).await, d("100.00"));
    assert_eq!(h.log_len(), 0);

    // Retrying from scratch succeeds once the store recovers
    h.store.set_fault(None);
    h.engine.transfer(1, 2, d("40")).await.unwrap();
    assert_eq!(h.balance(1).await, d("60.00"));
}

#[tokio::test]
async fn test_begin_failure_is_service_unavailable() {
    let h = TestHarness::new(&[(1, "100.00"), (2, "0.00")]).await;
    h.store.set_fault(Some(Fault::Begin));

    let err = h.engine.transfer(1, 2, d("40")).await.unwrap_err();
    assert!(matches!(err, LedgerError::ServiceUnavailable(_)));
    assert_eq!(h.balance(1).await, d("100.00"));
}

async fn timed_harness(
    timeout: Duration,
) -> (
    TransferEngine<FaultyStore>,
    Arc<FaultyStore>,
    Arc<RecordingObserver>,
) {
    let store = Arc::new(FaultyStore::new());
    store.insert_account(1, d("100.00")).await.unwrap();
    store.insert_account(2, d("0.00")).await.unwrap();
    let observer = Arc::new(RecordingObserver::new());
    let engine = TransferEngine::new(store.clone(), observer.clone()).with_timeout(timeout);
    (engine, store, observer)
}

#[tokio::test]
async fn test_timeout_rolls_back_and_releases_locks() {
    let (engine, store, observer) = timed_harness(Duration::from_millis(50)).await;

    store.set_fault(Some(Fault::SlowInsert(Duration::from_secs(5))));
    let err = engine.transfer(1, 2, d("40")).await.unwrap_err();
    assert!(matches!(err, LedgerError::ServiceUnavailable(_)));
    assert_eq!(store.fetch_balance(1).await.unwrap(), Some(d("100.00")));
    assert_eq!(store.inner.transaction_count(), 0);
    assert_eq!(observer.aborts()[0].0, TransferState::Recording);

    // Row locks were released with the dropped unit of work
    store.set_fault(None);
    engine.transfer(1, 2, d("40")).await.unwrap();
    assert_eq!(store.fetch_balance(2).await.unwrap(), Some(d("40.00")));
}

#[tokio::test]
async fn test_timeout_never_cuts_an_issued_commit() {
    let (engine, store, observer) = timed_harness(Duration::from_millis(50)).await;

    // Commit outlasts the bound but still lands and is reported as success
    store.set_fault(Some(Fault::SlowCommit(Duration::from_millis(200))));
    let record = engine.transfer(1, 2, d("40")).await.unwrap();
    assert_eq!(record.amount, d("40.00"));
    assert_eq!(store.fetch_balance(1).await.unwrap(), Some(d("60.00")));
    assert_eq!(store.fetch_balance(2).await.unwrap(), Some(d("40.00")));
    assert_eq!(store.inner.transaction_count(), 1);
    assert_eq!(observer.committed_count(), 1);
    assert!(observer.aborts().is_empty());
}

#[tokio::test]
async fn test_credit_past_ledger_limit_leaves_no_trace() {
    let near_limit = (crate::money::AMOUNT_LIMIT - Decimal::ONE).to_string();
    let h = TestHarness::new(&[(1, near_limit.as_str()), (2, near_limit.as_str())]).await;

    let err = h
        .engine
        .transfer(1, 2, d("40000000000000000000000000"))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::BalanceLimitExceeded);
    assert_eq!(err.category(), ErrorCategory::Unprocessable);
    assert_eq!(h.balance(1).await.to_string(), near_limit);
    assert_eq!(h.balance(2).await.to_string(), near_limit);
    assert_eq!(h.log_len(), 0);
    assert_eq!(
        h.observer.aborts(),
        vec![(TransferState::Crediting, LedgerError::BalanceLimitExceeded)]
    );
}

// ============================================================================
// Serializable Store Path
// ============================================================================

#[tokio::test]
async fn test_lock_order_depends_on_isolation() {
    // Serializable: debit row, then credit row, nothing else
    let h = TestHarness::serializable(&[(1, "100.00"), (2, "100.00")]).await;
    h.engine.transfer(2, 1, d("10")).await.unwrap();
    assert_eq!(h.store.take_lock_log(), vec![2, 1]);

    // Otherwise both rows are pre-locked lowest id first
    let h = TestHarness::new(&[(1, "100.00"), (2, "100.00")]).await;
    h.engine.transfer(2, 1, d("10")).await.unwrap();
    assert_eq!(h.store.take_lock_log(), vec![1, 2, 2, 1]);
}

#[tokio::test]
async fn test_serializable_scenario() {
    let h = TestHarness::serializable(&[(1, "100.00"), (2, "0.00")]).await;

    h.engine.transfer(1, 2, d("30.00")).await.unwrap();
    assert_eq!(h.balance(1).await, d("70.00"));
    assert_eq!(h.balance(2).await, d("30.00"));

    assert_eq!(
        h.engine.transfer(1, 2, d("1000.00")).await.unwrap_err(),
        LedgerError::InsufficientFunds
    );
    assert_eq!(h.balance(1).await, d("70.00"));
    assert_eq!(h.balance(2).await, d("30.00"));
    assert_eq!(h.log_len(), 1);
}

#[tokio::test]
async fn test_serializable_aborts_roll_back_everything() {
    let cases = [
        (Fault::WriteBalance(1), LedgerError::DebitFailed),
        (Fault::WriteBalance(2), LedgerError::CreditFailed),
        (Fault::InsertTransaction, LedgerError::RecordFailed),
        (Fault::Commit, LedgerError::DebitFailed),
    ];

    for (fault, expected) in cases {
        let h = TestHarness::serializable(&[(1, "100.00"), (2, "0.00")]).await;
        h.store.set_fault(Some(fault));

        let err = h.engine.transfer(1, 2, d("40")).await.unwrap_err();
        assert_eq!(err, expected, "{fault:?}");
        assert!(err.category().is_retryable());
        assert_eq!(h.balance(1).await, d("100.00"), "{fault:?}");
        assert_eq!(h.balance(2).await, d("0.00"), "{fault:?}");
        assert_eq!(h.log_len(), 0, "{fault:?}");
    }
}

#[tokio::test]
async fn test_serialization_conflict_classified_by_stage() {
    let h = TestHarness::serializable(&[(1, "100.00"), (2, "0.00")]).await;

    h.store.set_fault(Some(Fault::LockConflict(1)));
    assert_eq!(
        h.engine.transfer(1, 2, d("40")).await.unwrap_err(),
        LedgerError::DebitFailed
    );

    h.store.set_fault(Some(Fault::LockConflict(2)));
    assert_eq!(
        h.engine.transfer(1, 2, d("40")).await.unwrap_err(),
        LedgerError::CreditFailed
    );

    assert_eq!(h.balance(1).await, d("100.00"));
    assert_eq!(h.balance(2).await, d("0.00"));
    assert_eq!(
        h.observer.aborts(),
        vec![
            (TransferState::Debiting, LedgerError::DebitFailed),
            (TransferState::Crediting, LedgerError::CreditFailed),
        ]
    );

    // A retry after the conflict clears goes through
    h.store.set_fault(None);
    h.engine.transfer(1, 2, d("40")).await.unwrap();
    assert_eq!(h.balance(2).await, d("40.00"));
}

// ============================================================================
// Concurrency Tests
// ============================================================================

async fn concurrent_overdraft(serializable: bool) {
    const N: i64 = 20;
    const A: i64 = 5;

    let mut accounts = vec![(1, format!("{}", N * A - 1))];
    for dest in 2..=N + 1 {
        accounts.push((dest, "0".to_string()));
    }
    let accounts: Vec<(AccountId, &str)> =
        accounts.iter().map(|(id, b)| (*id, b.as_str())).collect();
    let h = Arc::new(if serializable {
        TestHarness::serializable(&accounts).await
    } else {
        TestHarness::new(&accounts).await
    });

    let tasks = (2..=N + 1).map(|dest| {
        let h = h.clone();
        tokio::spawn(async move { h.engine.transfer(1, dest, Decimal::from(A)).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let failures: Vec<_> = results.iter().filter_map(|r| r.clone().err()).collect();
    assert_eq!(successes as i64, N - 1);
    assert_eq!(failures, vec![LedgerError::InsufficientFunds]);

    assert_eq!(h.balance(1).await, Decimal::from(A - 1));
    assert_eq!(h.total(), Decimal::from(N * A - 1));
    assert_eq!(h.log_len() as i64, N - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overdraft_exactly_one_fails() {
    concurrent_overdraft(false).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overdraft_serializable_path() {
    concurrent_overdraft(true).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crossing_transfers_conserve_money_without_deadlock() {
    let h = Arc::new(TestHarness::new(&[(1, "500"), (2, "500"), (3, "500")]).await);
    let before = h.total();

    let pairs = [(1, 2), (2, 1), (2, 3), (3, 2), (3, 1), (1, 3)];
    let tasks = (0..120).map(|i| {
        let h = h.clone();
        let (source, destination) = pairs[i % pairs.len()];
        tokio::spawn(async move {
            h.engine
                .transfer(source, destination, Decimal::from((i % 7 + 1) as i64))
                .await
        })
    });

    let results = tokio::time::timeout(Duration::from_secs(10), join_all(tasks))
        .await
        .expect("transfers deadlocked");

    let committed = results
        .into_iter()
        .map(|r| r.unwrap())
        .filter(|r| r.is_ok())
        .count();

    assert_eq!(h.total(), before);
    assert_eq!(h.log_len(), committed);
    for id in 1..=3 {
        assert!(h.balance(id).await >= Decimal::ZERO);
    }
    assert_eq!(h.observer.committed_count(), committed);
}

#[tokio::test]
async fn test_every_event_carries_the_rounded_amount() {
    let h = TestHarness::new(&[(1, "10.00"), (2, "0.00")]).await;
    h.engine.transfer(1, 2, d("1.234")).await.unwrap();

    let events = h.observer.events();
    assert!(matches!(
        &events[..],
        [LedgerEvent::TransferCommitted { amount, .. }] if *amount == d("1.23")
    ));
}
