//! Catalog state layer for an illustrated astronomy browser.
//!
//! Three entity families (constellations, galaxies, planets) each get a
//! [`CatalogStore`]: the persistence-backed owner of that family's record
//! collection. Views read snapshots and subscribe to updates; every write
//! goes through the store's validated mutation operations, which persist the
//! full post-mutation collection through a [`PersistenceGateway`] before
//! committing it in memory.
//!
//! Rendering, localized string resolution and image decoding are
//! collaborator concerns. This crate stores raw bytes and raw strings only.

pub mod catalog;
pub mod catalog_store;
pub mod localization;
pub mod search;
pub mod seed;
pub mod sqlite_persistence;

pub use catalog::{
    CatalogRecord, Constellation, ConstellationDraft, EntityFamily, Galaxy, GalaxyDraft, Planet,
    PlanetDraft, SEED_RECORD_COUNT,
};
pub use catalog_store::{
    CatalogError, CatalogStore, LoadOutcome, LoadState, MemoryPersistenceGateway,
    PersistenceGateway,
};
pub use sqlite_persistence::SqliteDb;
