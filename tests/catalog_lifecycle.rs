use starbook_catalog::catalog::{Planet, PlanetDraft};
use starbook_catalog::seed::{ensure_seeded, planet_seeds};
use starbook_catalog::{
    CatalogError, CatalogRecord, CatalogStore, LoadOutcome, SqliteDb,
};
use tempfile::tempdir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn draft(name: &str) -> PlanetDraft {
    PlanetDraft {
        name: name.to_string(),
        description: format!("{name} description"),
        ..Default::default()
    }
}

async fn open_store(path: &std::path::Path) -> CatalogStore<Planet> {
    let db = SqliteDb::open(path).unwrap();
    let store = CatalogStore::new(Box::new(db.planets()));
    store.load().await.unwrap();
    store
}

#[tokio::test]
async fn test_first_launch_seeds_and_later_launches_see_the_same_catalog() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    {
        let store = open_store(&path).await;
        ensure_seeded(&store, planet_seeds()).await.unwrap();
        assert_eq!(store.all().await.len(), 3);
    }

    let store = open_store(&path).await;
    let records = store.all().await;
    assert_eq!(records.len(), 3);
    let names: Vec<&str> = records.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Mercury", "Venus", "Earth"]);
    assert!(records.iter().all(|r| r.is_seed()));

    // reseeding an already populated catalog is a no-op
    ensure_seeded(&store, planet_seeds()).await.unwrap();
    assert_eq!(store.all().await.len(), 3);
}

#[tokio::test]
async fn test_mutations_persist_across_restarts() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let added_id = {
        let store = open_store(&path).await;
        ensure_seeded(&store, planet_seeds()).await.unwrap();

        let added = store.add(draft("Mars")).await.unwrap();
        assert_eq!(added.order_index, 3);
        assert!(!added.is_seed());

        let seed_id = store.all().await[0].id.clone();
        store.toggle_favorite(&seed_id).await.unwrap();
        store.increment_view_count(&added.id).await.unwrap();
        store.increment_view_count(&added.id).await.unwrap();
        added.id
    };

    let store = open_store(&path).await;
    let records = store.all().await;
    assert_eq!(records.len(), 4);
    assert!(records[0].is_favorite);
    let reloaded = store.find(&added_id).await.unwrap();
    assert_eq!(reloaded.view_count, 2);
    assert_eq!(reloaded.name, "Mars");
}

#[tokio::test]
async fn test_deleting_a_user_record_restores_the_seed_catalog() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    {
        let store = open_store(&path).await;
        ensure_seeded(&store, planet_seeds()).await.unwrap();
        let added = store.add(draft("Pluto")).await.unwrap();
        store.delete(&added.id).await.unwrap();
    }

    let store = open_store(&path).await;
    assert_eq!(store.all().await.len(), 3);
}

#[tokio::test]
async fn test_seed_protection_holds_across_restarts() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    {
        let store = open_store(&path).await;
        ensure_seeded(&store, planet_seeds()).await.unwrap();
    }

    let store = open_store(&path).await;
    let seed = store.all().await[0].clone();

    let mut edited = seed.clone();
    edited.name = "Renamed".to_string();
    let err = store.update(edited).await.unwrap_err();
    assert!(matches!(err, CatalogError::SeedProtected { .. }));

    let err = store.delete(&seed.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::SeedProtected { .. }));
    assert_eq!(store.find(&seed.id).await.unwrap(), seed);
}

#[tokio::test]
async fn test_update_of_a_user_record_round_trips_through_sqlite() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let (id, expected) = {
        let store = open_store(&path).await;
        ensure_seeded(&store, planet_seeds()).await.unwrap();
        let added = store.add(draft("Neptune")).await.unwrap();

        let mut edited = added.clone();
        edited.description = "The windiest planet".to_string();
        edited.random_facts = vec!["Winds reach 2,000 km/h".to_string()];
        let updated = store.update(edited).await.unwrap();
        (added.id, updated)
    };

    let store = open_store(&path).await;
    assert_eq!(store.find(&id).await.unwrap(), expected);
}

#[tokio::test]
async fn test_load_runs_once_per_store_instance() {
    init_tracing();
    let dir = tempdir().unwrap();
    let db = SqliteDb::open(dir.path().join("catalog.db")).unwrap();
    let store = CatalogStore::<Planet>::new(Box::new(db.planets()));

    assert_eq!(store.load().await.unwrap(), LoadOutcome::Fresh);
    assert_eq!(store.load().await.unwrap(), LoadOutcome::AlreadyLoaded);
}
