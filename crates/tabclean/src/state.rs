//! Shared session state.
//!
//! [`SharedSession`] lets several handlers (threads, request workers) work on
//! one [`CleaningSession`]. Mutations hold the write lock for the whole
//! remediation, so no reader ever observes a half-applied fill or a report
//! that belongs to a different table.
//!
//! # Thread Safety
//!
//! The session is wrapped in `RwLock` from `parking_lot`, so readers
//! proceed in parallel and the lock cannot be poisoned.

use crate::config::{MissingStrategy, OutlierStrategy};
use crate::error::Result;
use crate::quality::QualityReport;
use crate::session::{CleaningOutcome, CleaningSession};
use crate::table::Table;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle to a session behind a read-write lock.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<RwLock<CleaningSession>>,
}

impl SharedSession {
    pub fn new(session: CleaningSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    pub fn from_table(table: Table) -> Self {
        Self::new(CleaningSession::new(table))
    }

    /// Run `f` with shared read access.
    pub fn read<R>(&self, f: impl FnOnce(&CleaningSession) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut CleaningSession) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn apply_missing(&self, method: MissingStrategy) -> CleaningOutcome {
        self.write(|s| s.apply_missing(method))
    }

    pub fn apply_outliers(&self, method: OutlierStrategy) -> Result<CleaningOutcome> {
        self.write(|s| s.apply_outliers(method))
    }

    pub fn reset(&self) {
        self.write(CleaningSession::reset)
    }

    /// Snapshot of the latest report.
    pub fn report(&self) -> QualityReport {
        self.read(|s| s.report().clone())
    }

    /// Snapshot of the current table.
    pub fn current(&self) -> Table {
        self.read(|s| s.current().clone())
    }
}

static_assertions::assert_impl_all!(SharedSession: Send, Sync);
