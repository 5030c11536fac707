//! Sqlite-backed persistence gateways.
//!
//! `save_all` rewrites the family's tables inside one transaction, `load_all`
//! reads them back in `position` order. All three family gateways share a
//! single connection behind a mutex; gateway calls never await while the
//! lock is held.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::schema::CATALOG_VERSIONED_SCHEMAS;
use crate::catalog::{Constellation, Galaxy, Planet};
use crate::catalog_store::PersistenceGateway;

const CONSTELLATION_TABLES: &[&str] = &[
    "constellation_named_stars",
    "constellation_video_links",
    "constellation_facts",
    "constellation_gallery_images",
    "constellations",
];

const GALAXY_TABLES: &[&str] = &[
    "galaxy_video_links",
    "galaxy_facts",
    "galaxy_gallery_images",
    "galaxies",
];

const PLANET_TABLES: &[&str] = &[
    "planet_video_links",
    "planet_facts",
    "planet_gallery_images",
    "planets",
];

/// Handle to the catalog database. Cheap to clone the per-family gateways
/// off; they all share the underlying connection.
pub struct SqliteDb {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDb {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).with_context(|| {
            format!(
                "opening catalog database at {}",
                path.as_ref().display()
            )
        })?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrate_if_needed(&conn)?;
        Ok(SqliteDb {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn constellations(&self) -> SqliteConstellationGateway {
        SqliteConstellationGateway {
            conn: self.conn.clone(),
        }
    }

    pub fn galaxies(&self) -> SqliteGalaxyGateway {
        SqliteGalaxyGateway {
            conn: self.conn.clone(),
        }
    }

    pub fn planets(&self) -> SqlitePlanetGateway {
        SqlitePlanetGateway {
            conn: self.conn.clone(),
        }
    }
}

fn migrate_if_needed(conn: &Connection) -> Result<()> {
    let latest = &CATALOG_VERSIONED_SCHEMAS[CATALOG_VERSIONED_SCHEMAS.len() - 1];
    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        info!("Creating catalog schema version {}", latest.version);
        return latest.create(conn);
    }

    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current > latest.version as i64 {
        bail!(
            "catalog database has schema version {}, newest supported is {}",
            current,
            latest.version
        );
    }
    for schema in CATALOG_VERSIONED_SCHEMAS {
        if schema.version as i64 <= current {
            continue;
        }
        let migration = schema
            .migration
            .ok_or_else(|| anyhow!("no migration to schema version {}", schema.version))?;
        info!("Migrating catalog schema to version {}", schema.version);
        migration(conn)?;
        conn.pragma_update(None, "user_version", schema.version as i64)?;
    }
    Ok(())
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| anyhow!("catalog database mutex poisoned"))
}

fn clear_tables(conn: &Connection, tables: &[&str]) -> Result<()> {
    for table in tables {
        conn.execute(&format!("DELETE FROM {table}"), [])?;
    }
    Ok(())
}

fn write_text_rows(
    conn: &Connection,
    table: &str,
    column: &str,
    record_id: &str,
    items: &[String],
) -> Result<()> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO {table} (record_id, position, {column}) VALUES (?1, ?2, ?3)"
    ))?;
    for (position, item) in items.iter().enumerate() {
        stmt.execute(params![record_id, position as i64, item])?;
    }
    Ok(())
}

fn read_text_rows(
    conn: &Connection,
    table: &str,
    column: &str,
    record_id: &str,
) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {column} FROM {table} WHERE record_id = ?1 ORDER BY position"
    ))?;
    let rows = stmt.query_map([record_id], |row| row.get(0))?;
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

fn write_gallery_rows(
    conn: &Connection,
    table: &str,
    record_id: &str,
    images: &[Option<Vec<u8>>],
) -> Result<()> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO {table} (record_id, position, image) VALUES (?1, ?2, ?3)"
    ))?;
    for (position, image) in images.iter().enumerate() {
        stmt.execute(params![record_id, position as i64, image])?;
    }
    Ok(())
}

fn read_gallery_rows(
    conn: &Connection,
    table: &str,
    record_id: &str,
) -> Result<Vec<Option<Vec<u8>>>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT image FROM {table} WHERE record_id = ?1 ORDER BY position"
    ))?;
    let rows = stmt.query_map([record_id], |row| row.get(0))?;
    let mut images = Vec::new();
    for row in rows {
        images.push(row?);
    }
    Ok(images)
}

fn save_constellations(conn: &mut Connection, records: &[Constellation]) -> Result<()> {
    let tx = conn.transaction()?;
    clear_tables(&tx, CONSTELLATION_TABLES)?;
    for (position, record) in records.iter().enumerate() {
        tx.execute(
            "INSERT INTO constellations \
             (id, name, description, order_index, position, is_favorite, view_count, \
              cover_image, about_text, wiki_link, main_star_count) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id,
                record.name,
                record.description,
                record.order_index,
                position as i64,
                record.is_favorite,
                record.view_count as i64,
                record.cover_image,
                record.about_text,
                record.wiki_link,
                record.main_star_count,
            ],
        )?;
        write_gallery_rows(
            &tx,
            "constellation_gallery_images",
            &record.id,
            &record.gallery_images,
        )?;
        write_text_rows(&tx, "constellation_facts", "fact", &record.id, &record.random_facts)?;
        write_text_rows(
            &tx,
            "constellation_video_links",
            "url",
            &record.id,
            &record.video_links,
        )?;
        write_text_rows(
            &tx,
            "constellation_named_stars",
            "star",
            &record.id,
            &record.named_stars,
        )?;
    }
    tx.commit()?;
    debug!("Saved {} constellation records", records.len());
    Ok(())
}

fn load_constellations(conn: &Connection) -> Result<Vec<Constellation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, description, order_index, is_favorite, view_count, \
         cover_image, about_text, wiki_link, main_star_count \
         FROM constellations ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Constellation {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            order_index: row.get(3)?,
            is_favorite: row.get(4)?,
            view_count: row.get::<_, i64>(5)? as u64,
            cover_image: row.get(6)?,
            gallery_images: Vec::new(),
            random_facts: Vec::new(),
            about_text: row.get(7)?,
            video_links: Vec::new(),
            wiki_link: row.get(8)?,
            main_star_count: row.get(9)?,
            named_stars: Vec::new(),
        })
    })?;
    let mut records = Vec::new();
    for row in rows {
        let mut record = row?;
        record.gallery_images =
            read_gallery_rows(conn, "constellation_gallery_images", &record.id)?;
        record.random_facts = read_text_rows(conn, "constellation_facts", "fact", &record.id)?;
        record.video_links =
            read_text_rows(conn, "constellation_video_links", "url", &record.id)?;
        record.named_stars =
            read_text_rows(conn, "constellation_named_stars", "star", &record.id)?;
        records.push(record);
    }
    Ok(records)
}

fn save_galaxies(conn: &mut Connection, records: &[Galaxy]) -> Result<()> {
    let tx = conn.transaction()?;
    clear_tables(&tx, GALAXY_TABLES)?;
    for (position, record) in records.iter().enumerate() {
        tx.execute(
            "INSERT INTO galaxies \
             (id, name, description, order_index, position, is_favorite, view_count, \
              cover_image, about_text, wiki_link, radius, distance_from_sun, age) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                record.id,
                record.name,
                record.description,
                record.order_index,
                position as i64,
                record.is_favorite,
                record.view_count as i64,
                record.cover_image,
                record.about_text,
                record.wiki_link,
                record.radius,
                record.distance_from_sun,
                record.age,
            ],
        )?;
        write_gallery_rows(&tx, "galaxy_gallery_images", &record.id, &record.gallery_images)?;
        write_text_rows(&tx, "galaxy_facts", "fact", &record.id, &record.random_facts)?;
        write_text_rows(&tx, "galaxy_video_links", "url", &record.id, &record.video_links)?;
    }
    tx.commit()?;
    debug!("Saved {} galaxy records", records.len());
    Ok(())
}

fn load_galaxies(conn: &Connection) -> Result<Vec<Galaxy>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, description, order_index, is_favorite, view_count, \
         cover_image, about_text, wiki_link, radius, distance_from_sun, age \
         FROM galaxies ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Galaxy {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            order_index: row.get(3)?,
            is_favorite: row.get(4)?,
            view_count: row.get::<_, i64>(5)? as u64,
            cover_image: row.get(6)?,
            gallery_images: Vec::new(),
            random_facts: Vec::new(),
            about_text: row.get(7)?,
            video_links: Vec::new(),
            wiki_link: row.get(8)?,
            radius: row.get(9)?,
            distance_from_sun: row.get(10)?,
            age: row.get(11)?,
        })
    })?;
    let mut records = Vec::new();
    for row in rows {
        let mut record = row?;
        record.gallery_images = read_gallery_rows(conn, "galaxy_gallery_images", &record.id)?;
        record.random_facts = read_text_rows(conn, "galaxy_facts", "fact", &record.id)?;
        record.video_links = read_text_rows(conn, "galaxy_video_links", "url", &record.id)?;
        records.push(record);
    }
    Ok(records)
}

fn save_planets(conn: &mut Connection, records: &[Planet]) -> Result<()> {
    let tx = conn.transaction()?;
    clear_tables(&tx, PLANET_TABLES)?;
    for (position, record) in records.iter().enumerate() {
        tx.execute(
            "INSERT INTO planets \
             (id, name, description, order_index, position, is_favorite, view_count, \
              cover_image, about_text, wiki_link) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id,
                record.name,
                record.description,
                record.order_index,
                position as i64,
                record.is_favorite,
                record.view_count as i64,
                record.cover_image,
                record.about_text,
                record.wiki_link,
            ],
        )?;
        write_gallery_rows(&tx, "planet_gallery_images", &record.id, &record.gallery_images)?;
        write_text_rows(&tx, "planet_facts", "fact", &record.id, &record.random_facts)?;
        write_text_rows(&tx, "planet_video_links", "url", &record.id, &record.video_links)?;
    }
    tx.commit()?;
    debug!("Saved {} planet records", records.len());
    Ok(())
}

fn load_planets(conn: &Connection) -> Result<Vec<Planet>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, description, order_index, is_favorite, view_count, \
         cover_image, about_text, wiki_link \
         FROM planets ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Planet {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            order_index: row.get(3)?,
            is_favorite: row.get(4)?,
            view_count: row.get::<_, i64>(5)? as u64,
            cover_image: row.get(6)?,
            gallery_images: Vec::new(),
            random_facts: Vec::new(),
            about_text: row.get(7)?,
            video_links: Vec::new(),
            wiki_link: row.get(8)?,
        })
    })?;
    let mut records = Vec::new();
    for row in rows {
        let mut record = row?;
        record.gallery_images = read_gallery_rows(conn, "planet_gallery_images", &record.id)?;
        record.random_facts = read_text_rows(conn, "planet_facts", "fact", &record.id)?;
        record.video_links = read_text_rows(conn, "planet_video_links", "url", &record.id)?;
        records.push(record);
    }
    Ok(records)
}

#[derive(Clone)]
pub struct SqliteConstellationGateway {
    conn: Arc<Mutex<Connection>>,
}

#[async_trait]
impl PersistenceGateway<Constellation> for SqliteConstellationGateway {
    async fn load_all(&self) -> Result<Vec<Constellation>> {
        let conn = lock(&self.conn)?;
        load_constellations(&conn)
    }

    async fn save_all(&self, records: &[Constellation]) -> Result<()> {
        let mut conn = lock(&self.conn)?;
        save_constellations(&mut conn, records)
    }
}

#[derive(Clone)]
pub struct SqliteGalaxyGateway {
    conn: Arc<Mutex<Connection>>,
}

#[async_trait]
impl PersistenceGateway<Galaxy> for SqliteGalaxyGateway {
    async fn load_all(&self) -> Result<Vec<Galaxy>> {
        let conn = lock(&self.conn)?;
        load_galaxies(&conn)
    }

    async fn save_all(&self, records: &[Galaxy]) -> Result<()> {
        let mut conn = lock(&self.conn)?;
        save_galaxies(&mut conn, records)
    }
}

#[derive(Clone)]
pub struct SqlitePlanetGateway {
    conn: Arc<Mutex<Connection>>,
}

#[async_trait]
impl PersistenceGateway<Planet> for SqlitePlanetGateway {
    async fn load_all(&self) -> Result<Vec<Planet>> {
        let conn = lock(&self.conn)?;
        load_planets(&conn)
    }

    async fn save_all(&self, records: &[Planet]) -> Result<()> {
        let mut conn = lock(&self.conn)?;
        save_planets(&mut conn, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogRecord, PlanetDraft};

    fn planet(name: &str, order_index: u32) -> Planet {
        Planet::from_draft(
            PlanetDraft {
                name: name.to_string(),
                description: format!("About {name}"),
                random_facts: vec![format!("{name} fact")],
                ..Default::default()
            },
            format!("id-{name}"),
            order_index,
        )
    }

    #[tokio::test]
    async fn test_save_all_then_load_all_preserves_records_and_order() {
        let db = SqliteDb::open_in_memory().unwrap();
        let gateway = db.planets();

        let records = vec![planet("Mercury", 0), planet("Venus", 1), planet("Earth", 2)];
        gateway.save_all(&records).await.unwrap();
        assert_eq!(gateway.load_all().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_save_all_replaces_the_previous_collection() {
        let db = SqliteDb::open_in_memory().unwrap();
        let gateway = db.planets();

        gateway
            .save_all(&[planet("Mercury", 0), planet("Venus", 1)])
            .await
            .unwrap();
        let survivors = vec![planet("Mercury", 0)];
        gateway.save_all(&survivors).await.unwrap();
        assert_eq!(gateway.load_all().await.unwrap(), survivors);
    }

    #[tokio::test]
    async fn test_position_order_survives_order_index_ties() {
        let db = SqliteDb::open_in_memory().unwrap();
        let gateway = db.planets();

        // after deletions two records can share an order_index
        let records = vec![planet("Saturn", 3), planet("Uranus", 3)];
        gateway.save_all(&records).await.unwrap();
        assert_eq!(gateway.load_all().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_load_all_on_a_fresh_database_is_empty() {
        let db = SqliteDb::open_in_memory().unwrap();
        assert!(db.constellations().load_all().await.unwrap().is_empty());
        assert!(db.galaxies().load_all().await.unwrap().is_empty());
        assert!(db.planets().load_all().await.unwrap().is_empty());
    }
}
