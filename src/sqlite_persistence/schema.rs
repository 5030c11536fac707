//! Versioned sqlite schema for the catalog database.
//!
//! One database file holds all three entity families. Each family gets a
//! records table plus position-ordered child tables for gallery blobs,
//! facts, video links and (constellations only) named stars. The `position`
//! column on the records table captures exact collection order, which
//! `order_index` alone cannot once deletions create ties.

use anyhow::Result;
use rusqlite::Connection;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SqlType {
    Text,
    Integer,
    Blob,
}

pub(crate) struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub non_null: bool,
}

const fn col(name: &'static str, sql_type: SqlType) -> Column {
    Column {
        name,
        sql_type,
        primary_key: false,
        non_null: true,
    }
}

const fn nullable(name: &'static str, sql_type: SqlType) -> Column {
    Column {
        name,
        sql_type,
        primary_key: false,
        non_null: false,
    }
}

const fn primary_key(name: &'static str) -> Column {
    Column {
        name,
        sql_type: SqlType::Text,
        primary_key: true,
        non_null: true,
    }
}

pub(crate) struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column.name);
            sql.push(' ');
            sql.push_str(match column.sql_type {
                SqlType::Text => "TEXT",
                SqlType::Integer => "INTEGER",
                SqlType::Blob => "BLOB",
            });
            if column.primary_key {
                sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                sql.push_str(" NOT NULL");
            }
        }
        sql.push_str(");");
        conn.execute(&sql, [])?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                [],
            )?;
        }
        Ok(())
    }
}

pub(crate) struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.pragma_update(None, "user_version", self.version as i64)?;
        Ok(())
    }
}

const CONSTELLATIONS: Table = Table {
    name: "constellations",
    columns: &[
        primary_key("id"),
        col("name", SqlType::Text),
        col("description", SqlType::Text),
        col("order_index", SqlType::Integer),
        col("position", SqlType::Integer),
        col("is_favorite", SqlType::Integer),
        col("view_count", SqlType::Integer),
        nullable("cover_image", SqlType::Blob),
        col("about_text", SqlType::Text),
        nullable("wiki_link", SqlType::Text),
        col("main_star_count", SqlType::Integer),
    ],
    indices: &[("idx_constellations_position", "position")],
};

const CONSTELLATION_GALLERY_IMAGES: Table = Table {
    name: "constellation_gallery_images",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        nullable("image", SqlType::Blob),
    ],
    indices: &[("idx_constellation_gallery_record", "record_id")],
};

const CONSTELLATION_FACTS: Table = Table {
    name: "constellation_facts",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        col("fact", SqlType::Text),
    ],
    indices: &[("idx_constellation_facts_record", "record_id")],
};

const CONSTELLATION_VIDEO_LINKS: Table = Table {
    name: "constellation_video_links",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        col("url", SqlType::Text),
    ],
    indices: &[("idx_constellation_video_links_record", "record_id")],
};

const CONSTELLATION_NAMED_STARS: Table = Table {
    name: "constellation_named_stars",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        col("star", SqlType::Text),
    ],
    indices: &[("idx_constellation_named_stars_record", "record_id")],
};

const GALAXIES: Table = Table {
    name: "galaxies",
    columns: &[
        primary_key("id"),
        col("name", SqlType::Text),
        col("description", SqlType::Text),
        col("order_index", SqlType::Integer),
        col("position", SqlType::Integer),
        col("is_favorite", SqlType::Integer),
        col("view_count", SqlType::Integer),
        nullable("cover_image", SqlType::Blob),
        col("about_text", SqlType::Text),
        nullable("wiki_link", SqlType::Text),
        col("radius", SqlType::Text),
        col("distance_from_sun", SqlType::Text),
        col("age", SqlType::Text),
    ],
    indices: &[("idx_galaxies_position", "position")],
};

const GALAXY_GALLERY_IMAGES: Table = Table {
    name: "galaxy_gallery_images",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        nullable("image", SqlType::Blob),
    ],
    indices: &[("idx_galaxy_gallery_record", "record_id")],
};

const GALAXY_FACTS: Table = Table {
    name: "galaxy_facts",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        col("fact", SqlType::Text),
    ],
    indices: &[("idx_galaxy_facts_record", "record_id")],
};

const GALAXY_VIDEO_LINKS: Table = Table {
    name: "galaxy_video_links",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        col("url", SqlType::Text),
    ],
    indices: &[("idx_galaxy_video_links_record", "record_id")],
};

const PLANETS: Table = Table {
    name: "planets",
    columns: &[
        primary_key("id"),
        col("name", SqlType::Text),
        col("description", SqlType::Text),
        col("order_index", SqlType::Integer),
        col("position", SqlType::Integer),
        col("is_favorite", SqlType::Integer),
        col("view_count", SqlType::Integer),
        nullable("cover_image", SqlType::Blob),
        col("about_text", SqlType::Text),
        nullable("wiki_link", SqlType::Text),
    ],
    indices: &[("idx_planets_position", "position")],
};

const PLANET_GALLERY_IMAGES: Table = Table {
    name: "planet_gallery_images",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        nullable("image", SqlType::Blob),
    ],
    indices: &[("idx_planet_gallery_record", "record_id")],
};

const PLANET_FACTS: Table = Table {
    name: "planet_facts",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        col("fact", SqlType::Text),
    ],
    indices: &[("idx_planet_facts_record", "record_id")],
};

const PLANET_VIDEO_LINKS: Table = Table {
    name: "planet_video_links",
    columns: &[
        col("record_id", SqlType::Text),
        col("position", SqlType::Integer),
        col("url", SqlType::Text),
    ],
    indices: &[("idx_planet_video_links_record", "record_id")],
};

pub(crate) const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        CONSTELLATIONS,
        CONSTELLATION_GALLERY_IMAGES,
        CONSTELLATION_FACTS,
        CONSTELLATION_VIDEO_LINKS,
        CONSTELLATION_NAMED_STARS,
        GALAXIES,
        GALAXY_GALLERY_IMAGES,
        GALAXY_FACTS,
        GALAXY_VIDEO_LINKS,
        PLANETS,
        PLANET_GALLERY_IMAGES,
        PLANET_FACTS,
        PLANET_VIDEO_LINKS,
    ],
    migration: None,
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_builds_every_catalog_table() {
        let conn = Connection::open_in_memory().unwrap();
        let latest = &CATALOG_VERSIONED_SCHEMAS[CATALOG_VERSIONED_SCHEMAS.len() - 1];
        latest.create(&conn).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 13);

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, latest.version as i64);
    }

    #[test]
    fn test_nullable_columns_accept_null() {
        let conn = Connection::open_in_memory().unwrap();
        CATALOG_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
        conn.execute(
            "INSERT INTO planet_gallery_images (record_id, position, image) VALUES ('p', 0, NULL)",
            [],
        )
        .unwrap();
    }
}
