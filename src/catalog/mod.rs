mod constellation;
mod galaxy;
mod planet;
mod record;
pub mod video_link;

pub use constellation::{Constellation, ConstellationDraft};
pub use galaxy::{Galaxy, GalaxyDraft};
pub use planet::{Planet, PlanetDraft};
pub use record::{CatalogRecord, EntityFamily, SEED_RECORD_COUNT};

pub(crate) use record::generate_record_id;
