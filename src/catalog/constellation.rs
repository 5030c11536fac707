use serde::{Deserialize, Serialize};

use super::record::{compact_text_list, CatalogRecord, EntityFamily};
use super::video_link::sanitize_video_links;

/// A constellation profile as shown in the sky atlas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Collection size at creation time. Never reassigned; values below
    /// [`SEED_RECORD_COUNT`](super::SEED_RECORD_COUNT) mark seed records.
    pub order_index: u32,
    pub is_favorite: bool,
    pub view_count: u64,
    /// Raw encoded image bytes; decoding is a collaborator concern. When
    /// absent the presentation layer falls back to an image keyed by `name`.
    pub cover_image: Option<Vec<u8>>,
    /// Ordered gallery slots; a slot may be present but empty.
    pub gallery_images: Vec<Option<Vec<u8>>>,
    pub random_facts: Vec<String>,
    pub about_text: String,
    /// Normalized embeddable video URLs.
    pub video_links: Vec<String>,
    pub wiki_link: Option<String>,
    pub main_star_count: u32,
    pub named_stars: Vec<String>,
}

/// Caller-supplied fields for a new constellation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstellationDraft {
    pub name: String,
    pub description: String,
    pub cover_image: Option<Vec<u8>>,
    pub gallery_images: Vec<Option<Vec<u8>>>,
    pub random_facts: Vec<String>,
    pub about_text: String,
    pub video_links: Vec<String>,
    pub wiki_link: Option<String>,
    pub main_star_count: u32,
    pub named_stars: Vec<String>,
}

impl CatalogRecord for Constellation {
    type Draft = ConstellationDraft;
    const FAMILY: EntityFamily = EntityFamily::Constellation;

    fn from_draft(draft: ConstellationDraft, id: String, order_index: u32) -> Self {
        Constellation {
            id,
            name: draft.name,
            description: draft.description,
            order_index,
            is_favorite: false,
            view_count: 0,
            cover_image: draft.cover_image,
            gallery_images: draft.gallery_images,
            random_facts: compact_text_list(draft.random_facts),
            about_text: draft.about_text,
            video_links: sanitize_video_links(draft.video_links),
            wiki_link: draft.wiki_link,
            main_star_count: draft.main_star_count,
            named_stars: compact_text_list(draft.named_stars),
        }
    }

    fn draft_name(draft: &ConstellationDraft) -> &str {
        &draft.name
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn order_index(&self) -> u32 {
        self.order_index
    }

    fn set_order_index(&mut self, order_index: u32) {
        self.order_index = order_index;
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn set_favorite(&mut self, favorite: bool) {
        self.is_favorite = favorite;
    }

    fn view_count(&self) -> u64 {
        self.view_count
    }

    fn bump_view_count(&mut self) {
        self.view_count += 1;
    }
}
