//! Transaction coordinator for aggregate writes.
//!
//! # Responsibility
//! - Group every row write of one save under a single SQLite transaction.
//! - Decide commit vs. rollback in exactly one place.
//!
//! # Invariants
//! - Lifecycle is `Idle -> Active -> (Committed | RolledBack)`; both end
//!   states are terminal for that unit of work.
//! - Transactions begin `IMMEDIATE`, so the write lock is taken up front.
//! - Dropping an active unit of work (including during a panic) rolls back.

use crate::repo::recipe_repo::{RepoError, RepoResult};
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Lifecycle state of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfWorkState {
    Idle,
    Active,
    Committed,
    RolledBack,
}

impl Display for UnitOfWorkState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        };
        f.write_str(label)
    }
}

/// One atomic unit of work over an exclusively borrowed connection.
pub struct UnitOfWork<'conn> {
    conn: Option<&'conn mut Connection>,
    tx: Option<Transaction<'conn>>,
    state: UnitOfWorkState,
    started_at: Option<Instant>,
}

impl<'conn> UnitOfWork<'conn> {
    /// Creates an idle unit of work; nothing touches storage yet.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self {
            conn: Some(conn),
            tx: None,
            state: UnitOfWorkState::Idle,
            started_at: None,
        }
    }

    pub fn state(&self) -> UnitOfWorkState {
        self.state
    }

    /// Opens the transactional context: `Idle -> Active`.
    ///
    /// A failed `BEGIN` consumes the connection borrow and leaves the unit
    /// `RolledBack`, so it cannot be begun again.
    pub fn begin(&mut self) -> RepoResult<()> {
        self.expect_state(UnitOfWorkState::Idle)?;
        let conn = self.conn.take().ok_or(RepoError::InvalidUnitOfWorkState {
            expected: UnitOfWorkState::Idle,
            actual: self.state,
        })?;

        let tx = match Transaction::new(conn, TransactionBehavior::Immediate) {
            Ok(tx) => tx,
            Err(err) => {
                self.finish(UnitOfWorkState::RolledBack);
                return Err(err.into());
            }
        };
        self.tx = Some(tx);
        self.state = UnitOfWorkState::Active;
        self.started_at = Some(Instant::now());
        debug!("event=unit_of_work module=repo status=start");
        Ok(())
    }

    /// Returns the transaction handle shared by every row call of this unit.
    pub fn transaction(&self) -> RepoResult<&Transaction<'conn>> {
        match (self.state, self.tx.as_ref()) {
            (UnitOfWorkState::Active, Some(tx)) => Ok(tx),
            _ => Err(RepoError::InvalidUnitOfWorkState {
                expected: UnitOfWorkState::Active,
                actual: self.state,
            }),
        }
    }

    /// Makes every write durable: `Active -> Committed`.
    ///
    /// A failed `COMMIT` leaves the unit `RolledBack`; the engine discards the
    /// pending writes when the transaction handle drops.
    pub fn commit(&mut self) -> RepoResult<()> {
        let tx = self.take_active()?;
        match tx.commit() {
            Ok(()) => {
                self.finish(UnitOfWorkState::Committed);
                Ok(())
            }
            Err(err) => {
                self.finish(UnitOfWorkState::RolledBack);
                Err(err.into())
            }
        }
    }

    /// Discards every write issued since `begin`: `Active -> RolledBack`.
    pub fn rollback(&mut self) -> RepoResult<()> {
        let tx = self.take_active()?;
        self.finish(UnitOfWorkState::RolledBack);
        tx.rollback()?;
        Ok(())
    }

    fn take_active(&mut self) -> RepoResult<Transaction<'conn>> {
        self.expect_state(UnitOfWorkState::Active)?;
        self.tx.take().ok_or(RepoError::InvalidUnitOfWorkState {
            expected: UnitOfWorkState::Active,
            actual: self.state,
        })
    }

    fn expect_state(&self, expected: UnitOfWorkState) -> RepoResult<()> {
        if self.state != expected {
            return Err(RepoError::InvalidUnitOfWorkState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn finish(&mut self, state: UnitOfWorkState) {
        self.state = state;
        let duration_ms = self
            .started_at
            .map_or(0, |started_at| started_at.elapsed().as_millis());
        debug!(
            "event=unit_of_work module=repo status={} duration_ms={}",
            state, duration_ms
        );
    }
}

/// Runs `work` inside one unit of work, committing only when it succeeds.
///
/// On any error from `work` the unit is rolled back before the original
/// error is returned. A rollback failure is logged and the original error
/// still wins.
pub fn run_in_unit_of_work<T, F>(conn: &mut Connection, work: F) -> RepoResult<T>
where
    F: FnOnce(&Transaction<'_>) -> RepoResult<T>,
{
    let mut unit = UnitOfWork::new(conn);
    unit.begin()?;

    let outcome = work(unit.transaction()?);
    match outcome {
        Ok(value) => {
            unit.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = unit.rollback() {
                warn!(
                    "event=unit_of_work module=repo status=rollback_failed error_code={} error={}",
                    rollback_err.code(),
                    rollback_err
                );
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{UnitOfWork, UnitOfWorkState};
    use crate::repo::recipe_repo::RepoError;
    use rusqlite::Connection;
    use std::time::Duration;

    #[test]
    fn state_machine_rejects_out_of_order_calls() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut unit = UnitOfWork::new(&mut conn);
        assert_eq!(unit.state(), UnitOfWorkState::Idle);

        let err = unit.commit().unwrap_err();
        assert!(matches!(
            err,
            RepoError::InvalidUnitOfWorkState {
                expected: UnitOfWorkState::Active,
                actual: UnitOfWorkState::Idle,
            }
        ));

        unit.begin().unwrap();
        assert_eq!(unit.state(), UnitOfWorkState::Active);
        assert!(unit.begin().is_err());

        unit.commit().unwrap();
        assert_eq!(unit.state(), UnitOfWorkState::Committed);
        assert!(unit.rollback().is_err());
        assert!(unit.transaction().is_err());
    }

    #[test]
    fn dropping_active_unit_discards_writes() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE scratch (value INTEGER);")
            .unwrap();

        {
            let mut unit = UnitOfWork::new(&mut conn);
            unit.begin().unwrap();
            unit.transaction()
                .unwrap()
                .execute("INSERT INTO scratch (value) VALUES (1);", [])
                .unwrap();
        }

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM scratch;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn failed_begin_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("busy.sqlite3");
        let mut conn = Connection::open(&path).unwrap();
        conn.busy_timeout(Duration::ZERO).unwrap();

        let holder = Connection::open(&path).unwrap();
        holder.execute_batch("BEGIN IMMEDIATE;").unwrap();

        let mut unit = UnitOfWork::new(&mut conn);
        let err = unit.begin().unwrap_err();
        assert!(matches!(err, RepoError::StorageUnavailable(_)), "{err}");
        assert_eq!(unit.state(), UnitOfWorkState::RolledBack);

        let err = unit.begin().unwrap_err();
        assert!(matches!(
            err,
            RepoError::InvalidUnitOfWorkState {
                expected: UnitOfWorkState::Idle,
                actual: UnitOfWorkState::RolledBack,
            }
        ));
        assert!(unit.transaction().is_err());

        holder.execute_batch("ROLLBACK;").unwrap();
    }
}
