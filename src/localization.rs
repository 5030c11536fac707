//! Display-string resolution collaborator.
//!
//! The catalog layer never resolves display strings itself; the composition
//! root injects a [`Translations`] implementation into the views. A missing
//! entry falls back to the stable key, so a hole in the table can never
//! surface as a formatting fault.

/// Localized string table, keyed by stable identifiers.
pub trait Translations: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Stable keys for the display strings the catalog screens use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKey {
    ConstellationsTitle,
    GalaxiesTitle,
    PlanetsTitle,
    ZodiacTitle,
    FavoritesSection,
    AboutSection,
    FactsSection,
    GallerySection,
    VideosSection,
    SearchPlaceholder,
}

impl TextKey {
    pub fn key(&self) -> &'static str {
        match self {
            TextKey::ConstellationsTitle => "constellations_title",
            TextKey::GalaxiesTitle => "galaxies_title",
            TextKey::PlanetsTitle => "planets_title",
            TextKey::ZodiacTitle => "zodiac_title",
            TextKey::FavoritesSection => "favorites_section",
            TextKey::AboutSection => "about_section",
            TextKey::FactsSection => "facts_section",
            TextKey::GallerySection => "gallery_section",
            TextKey::VideosSection => "videos_section",
            TextKey::SearchPlaceholder => "search_placeholder",
        }
    }

    /// Resolve through the injected table, falling back to the key itself.
    pub fn resolve(&self, translations: &dyn Translations) -> String {
        translations
            .lookup(self.key())
            .unwrap_or_else(|| self.key().to_owned())
    }
}
