// src/store/memory.rs

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::errors::{ResearchError, Result};
use crate::types::BoxFuture;

use super::{RunRecord, RunStore};

/// In-memory run store, a test double in the manner of
/// [`MockFileSystem`](crate::fs::mock::MockFileSystem). It panics on a
/// poisoned lock and is not wired into the binary.
///
/// Clones share state, so a test can hold one handle, give another to the
/// controller, and clear the record "out of band" to simulate an
/// abandonment from another process.
#[derive(Debug, Clone, Default)]
pub struct MemoryRunStore {
    record: Arc<Mutex<Option<RunRecord>>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: RunRecord) -> Self {
        let store = Self::default();
        store.replace(Some(record));
        store
    }

    /// Synchronous peek for assertions.
    pub fn current(&self) -> Option<RunRecord> {
        self.record.lock().unwrap().clone()
    }

    /// Synchronous replace that bypasses the write counter.
    pub fn replace(&self, record: Option<RunRecord>) {
        *self.record.lock().unwrap() = record;
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent `set` calls fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl RunStore for MemoryRunStore {
    fn get(&self) -> BoxFuture<'_, Result<Option<RunRecord>>> {
        let record = self.current();
        Box::pin(async move { Ok(record) })
    }

    fn set(&self, record: Option<RunRecord>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ResearchError::Other(anyhow!("store is read-only")));
            }
            self.replace(record);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}
