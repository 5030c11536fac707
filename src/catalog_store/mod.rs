mod error;
mod memory_gateway;
mod store;
mod trait_def;

pub use error::CatalogError;
pub use memory_gateway::MemoryPersistenceGateway;
pub use store::{CatalogStore, LoadOutcome, LoadState};
pub use trait_def::PersistenceGateway;
