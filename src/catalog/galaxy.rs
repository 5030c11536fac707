use serde::{Deserialize, Serialize};

use super::record::{compact_text_list, CatalogRecord, EntityFamily};
use super::video_link::sanitize_video_links;

/// A galaxy profile.
///
/// The measurement fields are free-text display strings, never parsed
/// numerics, so entries like "2.5 million light-years" survive verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Galaxy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub order_index: u32,
    pub is_favorite: bool,
    pub view_count: u64,
    pub cover_image: Option<Vec<u8>>,
    pub gallery_images: Vec<Option<Vec<u8>>>,
    pub random_facts: Vec<String>,
    pub about_text: String,
    pub video_links: Vec<String>,
    pub wiki_link: Option<String>,
    pub radius: String,
    pub distance_from_sun: String,
    pub age: String,
}

/// Caller-supplied fields for a new galaxy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GalaxyDraft {
    pub name: String,
    pub description: String,
    pub cover_image: Option<Vec<u8>>,
    pub gallery_images: Vec<Option<Vec<u8>>>,
    pub random_facts: Vec<String>,
    pub about_text: String,
    pub video_links: Vec<String>,
    pub wiki_link: Option<String>,
    pub radius: String,
    pub distance_from_sun: String,
    pub age: String,
}

impl CatalogRecord for Galaxy {
    type Draft = GalaxyDraft;
    const FAMILY: EntityFamily = EntityFamily::Galaxy;

    fn from_draft(draft: GalaxyDraft, id: String, order_index: u32) -> Self {
        Galaxy {
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
            radius: draft.radius,
            distance_from_sun: draft.distance_from_sun,
            age: draft.age,
        }
    }

    fn draft_name(draft: &GalaxyDraft) -> &str {
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
