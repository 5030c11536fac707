//! First-run population.
//!
//! The first three records of every family are created here through the
//! normal add path, so they occupy `order_index` 0..3 and fall under seed
//! protection from then on.

use tracing::info;

use crate::catalog::{CatalogRecord, ConstellationDraft, GalaxyDraft, PlanetDraft};
use crate::catalog_store::{CatalogError, CatalogStore};

/// Add `drafts` when a freshly loaded collection is empty.
///
/// Call after a successful `load`. Does nothing when any record already
/// exists, so repeat launches never duplicate seeds.
pub async fn ensure_seeded<R: CatalogRecord>(
    store: &CatalogStore<R>,
    drafts: Vec<R::Draft>,
) -> Result<(), CatalogError> {
    if !store.all().await.is_empty() {
        return Ok(());
    }
    let count = drafts.len();
    for draft in drafts {
        store.add(draft).await?;
    }
    info!("Seeded {} {} records", count, R::FAMILY.as_str());
    Ok(())
}

pub fn constellation_seeds() -> Vec<ConstellationDraft> {
    vec![
        ConstellationDraft {
            name: "Orion".to_string(),
            description: "The Hunter, straddling the celestial equator".to_string(),
            about_text: "Orion is among the most recognizable constellations in the sky, \
                         visible from both hemispheres during winter evenings in the north."
                .to_string(),
            random_facts: vec![
                "Betelgeuse, Orion's shoulder, is a red supergiant expected to go supernova"
                    .to_string(),
                "The three belt stars are known as the Three Kings or the Three Sisters"
                    .to_string(),
                "The Orion Nebula is visible to the naked eye below the belt".to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Orion_(constellation)".to_string()),
            main_star_count: 7,
            named_stars: vec![
                "Betelgeuse".to_string(),
                "Rigel".to_string(),
                "Bellatrix".to_string(),
                "Mintaka".to_string(),
                "Alnilam".to_string(),
                "Alnitak".to_string(),
                "Saiph".to_string(),
            ],
            ..Default::default()
        },
        ConstellationDraft {
            name: "Ursa Major".to_string(),
            description: "The Great Bear, home of the Big Dipper".to_string(),
            about_text: "Ursa Major is the largest northern constellation; its seven \
                         brightest stars form the Big Dipper asterism used to find Polaris."
                .to_string(),
            random_facts: vec![
                "Mizar and Alcor form a famous naked-eye double star".to_string(),
                "The Big Dipper is an asterism, not a constellation of its own".to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Ursa_Major".to_string()),
            main_star_count: 7,
            named_stars: vec![
                "Dubhe".to_string(),
                "Merak".to_string(),
                "Phecda".to_string(),
                "Megrez".to_string(),
                "Alioth".to_string(),
                "Mizar".to_string(),
                "Alkaid".to_string(),
            ],
            ..Default::default()
        },
        ConstellationDraft {
            name: "Cassiopeia".to_string(),
            description: "The Queen, a bright northern W".to_string(),
            about_text: "Cassiopeia's five brightest stars trace a distinctive W shape that \
                         circles the north celestial pole and never sets for most northern \
                         observers."
                .to_string(),
            random_facts: vec![
                "Tycho Brahe observed a supernova here in 1572".to_string(),
                "Cassiopeia A is the strongest radio source in the sky beyond the solar system"
                    .to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Cassiopeia_(constellation)".to_string()),
            main_star_count: 5,
            named_stars: vec![
                "Schedar".to_string(),
                "Caph".to_string(),
                "Gamma Cassiopeiae".to_string(),
                "Ruchbah".to_string(),
                "Segin".to_string(),
            ],
            ..Default::default()
        },
    ]
}

pub fn galaxy_seeds() -> Vec<GalaxyDraft> {
    vec![
        GalaxyDraft {
            name: "Milky Way".to_string(),
            description: "Our home barred spiral galaxy".to_string(),
            about_text: "The Milky Way contains the solar system and between 100 and 400 \
                         billion stars, with the galactic center lying toward Sagittarius."
                .to_string(),
            random_facts: vec![
                "A supermassive black hole, Sagittarius A*, sits at its center".to_string(),
                "The Sun completes a galactic orbit roughly every 230 million years".to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Milky_Way".to_string()),
            radius: "52,850 light-years".to_string(),
            distance_from_sun: "26,000 light-years to the galactic center".to_string(),
            age: "13.6 billion years".to_string(),
            ..Default::default()
        },
        GalaxyDraft {
            name: "Andromeda".to_string(),
            description: "The nearest major galaxy to the Milky Way".to_string(),
            about_text: "The Andromeda Galaxy is a barred spiral on a slow collision course \
                         with the Milky Way, expected to merge in about 4.5 billion years."
                .to_string(),
            random_facts: vec![
                "It is the most distant object easily visible to the naked eye".to_string(),
                "It holds roughly one trillion stars".to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Andromeda_Galaxy".to_string()),
            radius: "110,000 light-years".to_string(),
            distance_from_sun: "2.5 million light-years".to_string(),
            age: "10 billion years".to_string(),
            ..Default::default()
        },
        GalaxyDraft {
            name: "Whirlpool".to_string(),
            description: "A grand-design spiral seen face-on".to_string(),
            about_text: "The Whirlpool Galaxy interacts with its dwarf companion NGC 5195, \
                         which drives the pronounced spiral structure."
                .to_string(),
            random_facts: vec![
                "It was the first galaxy recognized to have spiral structure".to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Whirlpool_Galaxy".to_string()),
            radius: "38,000 light-years".to_string(),
            distance_from_sun: "23 million light-years".to_string(),
            age: "400 million years since the encounter began".to_string(),
            ..Default::default()
        },
    ]
}

pub fn planet_seeds() -> Vec<PlanetDraft> {
    vec![
        PlanetDraft {
            name: "Mercury".to_string(),
            description: "The smallest planet, closest to the Sun".to_string(),
            about_text: "Mercury completes an orbit every 88 days and has almost no \
                         atmosphere, so its surface swings between extremes of heat and cold."
                .to_string(),
            random_facts: vec![
                "A Mercury day lasts two Mercury years".to_string(),
                "Its surface temperature spans roughly -173 to 427 degrees Celsius".to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Mercury_(planet)".to_string()),
            ..Default::default()
        },
        PlanetDraft {
            name: "Venus".to_string(),
            description: "The hottest planet, shrouded in clouds".to_string(),
            about_text: "Venus rotates backwards compared to most planets and its dense \
                         carbon dioxide atmosphere traps heat in a runaway greenhouse effect."
                .to_string(),
            random_facts: vec![
                "A day on Venus is longer than its year".to_string(),
                "Surface pressure is about 90 times that of Earth".to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Venus".to_string()),
            ..Default::default()
        },
        PlanetDraft {
            name: "Earth".to_string(),
            description: "The only known world with life".to_string(),
            about_text: "Earth is the densest planet in the solar system and the only one \
                         with stable liquid water on its surface."
                .to_string(),
            random_facts: vec![
                "About 71 percent of the surface is covered by ocean".to_string(),
                "The Moon stabilizes Earth's axial tilt".to_string(),
            ],
            wiki_link: Some("https://en.wikipedia.org/wiki/Earth".to_string()),
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::Planet;
    use crate::catalog_store::MemoryPersistenceGateway;

    #[tokio::test]
    async fn test_ensure_seeded_populates_an_empty_store_once() {
        let gateway = Arc::new(MemoryPersistenceGateway::new());
        let store = CatalogStore::<Planet>::new(Box::new(gateway));
        store.load().await.unwrap();

        ensure_seeded(&store, planet_seeds()).await.unwrap();
        let seeded = store.all().await;
        assert_eq!(seeded.len(), 3);
        assert!(seeded.iter().all(|record| record.is_seed()));

        // a second launch must not duplicate the seeds
        ensure_seeded(&store, planet_seeds()).await.unwrap();
        assert_eq!(store.all().await, seeded);
    }

    #[test]
    fn test_every_family_ships_exactly_three_seed_drafts() {
        assert_eq!(constellation_seeds().len(), 3);
        assert_eq!(galaxy_seeds().len(), 3);
        assert_eq!(planet_seeds().len(), 3);
    }
}
