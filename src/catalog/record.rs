//! Common surface of the three entity record types.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The persisted entity families of the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityFamily {
    Constellation,
    Galaxy,
    Planet,
}

impl EntityFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityFamily::Constellation => "constellation",
            EntityFamily::Galaxy => "galaxy",
            EntityFamily::Planet => "planet",
        }
    }
}

/// Records created at first-run population occupy `order_index` 0..3 and are
/// protected from edit and delete for the lifetime of the collection.
pub const SEED_RECORD_COUNT: u32 = 3;

/// Accessors and construction shared by [`Constellation`], [`Galaxy`] and
/// [`Planet`], so one store implementation can own any family's collection.
///
/// Records are value types: the presentation layer never writes fields
/// directly, it requests mutations from the store by id and receives the
/// updated value back.
///
/// [`Constellation`]: super::Constellation
/// [`Galaxy`]: super::Galaxy
/// [`Planet`]: super::Planet
pub trait CatalogRecord: Clone + Send + Sync + 'static {
    /// Caller-supplied fields for `add`: everything except `id`,
    /// `order_index`, `view_count` (starts at 0) and `is_favorite`
    /// (starts false).
    type Draft: Send;

    const FAMILY: EntityFamily;

    /// Build a record from a draft, compacting list fields and normalizing
    /// video links. `id` and `order_index` are assigned by the store.
    fn from_draft(draft: Self::Draft, id: String, order_index: u32) -> Self;

    /// Display name carried by a draft, validated before a record exists.
    fn draft_name(draft: &Self::Draft) -> &str;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn order_index(&self) -> u32;
    fn set_order_index(&mut self, order_index: u32);
    fn is_favorite(&self) -> bool;
    fn set_favorite(&mut self, favorite: bool);
    fn view_count(&self) -> u64;
    fn bump_view_count(&mut self);

    fn is_seed(&self) -> bool {
        self.order_index() < SEED_RECORD_COUNT
    }
}

/// Opaque record id: 128 random bits as lowercase hex.
pub(crate) fn generate_record_id() -> String {
    format!("{:032x}", rand::rng().random::<u128>())
}

/// Drops empty entries from a user-edited text list.
pub(crate) fn compact_text_list(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter(|item| !item.is_empty()).collect()
}
