//! PersistenceGateway trait definition.
//!
//! The seam between the in-memory catalog store and durable storage. The
//! full collection is the unit of persistence: every mutation re-saves the
//! whole family collection, there are no per-record transactions.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Durable storage for one entity family's record collection.
#[async_trait]
pub trait PersistenceGateway<R>: Send + Sync {
    /// Fetch every record of the family, in stored collection order.
    async fn load_all(&self) -> Result<Vec<R>>;

    /// Replace the durable collection with `records`, preserving order.
    async fn save_all(&self, records: &[R]) -> Result<()>;
}

#[async_trait]
impl<R, G> PersistenceGateway<R> for Arc<G>
where
    R: Send + Sync,
    G: PersistenceGateway<R> + ?Sized,
{
    async fn load_all(&self) -> Result<Vec<R>> {
        self.as_ref().load_all().await
    }

    async fn save_all(&self, records: &[R]) -> Result<()> {
        self.as_ref().save_all(records).await
    }
}
