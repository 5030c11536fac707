//! In-memory persistence gateway.
//!
//! Backs stores in tests and previews where durable storage is not wanted.
//! Load and save failures can be switched on to exercise the store's
//! failure paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::trait_def::PersistenceGateway;

pub struct MemoryPersistenceGateway<R> {
    records: Mutex<Vec<R>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl<R: Clone> MemoryPersistenceGateway<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<R>) -> Self {
        MemoryPersistenceGateway {
            records: Mutex::new(records),
            fail_loads: AtomicBool::new(false),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make subsequent `load_all` calls fail until switched back.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `save_all` calls fail until switched back.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The durable content as this gateway currently sees it.
    pub fn stored(&self) -> Vec<R> {
        self.records.lock().unwrap().clone()
    }
}

impl<R: Clone> Default for MemoryPersistenceGateway<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> PersistenceGateway<R> for MemoryPersistenceGateway<R> {
    async fn load_all(&self) -> Result<Vec<R>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            bail!("memory gateway configured to fail loads");
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn save_all(&self, records: &[R]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            bail!("memory gateway configured to fail saves");
        }
        *self.records.lock().unwrap() = records.to_vec();
        Ok(())
    }
}
