mod gateway;
mod schema;

pub use gateway::{
    SqliteConstellationGateway, SqliteDb, SqliteGalaxyGateway, SqlitePlanetGateway,
};
