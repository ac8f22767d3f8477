//! Seed data loading from config.toml
//!
//! The accounts, halls and movies defined in the config file are inserted on
//! start-up when missing. Existing rows are left alone, so seeding can run on
//! every boot.

use crate::{
    core::{hall, movie, user},
    entities::{Movie, movie as movie_entity},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    /// Accounts to create
    #[serde(default)]
    pub users: Vec<UserSeed>,
    /// Halls to create
    #[serde(default)]
    pub halls: Vec<HallSeed>,
    /// Movies to create
    #[serde(default)]
    pub movies: Vec<movie::MovieDraft>,
}

/// One account in config.toml
#[derive(Debug, Deserialize, Clone)]
pub struct UserSeed {
    /// Login name
    pub username: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// API token presented as `Authorization: Token <token>`
    pub token: String,
    /// Staff flag
    #[serde(default)]
    pub is_staff: bool,
    /// Superuser flag
    #[serde(default)]
    pub is_superuser: bool,
    /// Opening wallet balance, 10000.00 when absent
    pub wallet: Option<Decimal>,
}

/// One hall in config.toml
#[derive(Debug, Deserialize, Clone)]
pub struct HallSeed {
    /// Hall name
    pub name: String,
    /// Seat count
    pub seats: i32,
}

/// How many rows seeding inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Accounts created
    pub users: usize,
    /// Halls created
    pub halls: usize,
    /// Movies created
    pub movies: usize,
}

/// Loads seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Like [`load_config`], but a missing file yields an empty configuration.
pub fn load_optional_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        info!(path = %path.as_ref().display(), "No seed config found, skipping");
        Ok(SeedConfig::default())
    }
}

/// Inserts every configured account, hall and movie that is not stored yet.
///
/// Accounts are matched by username, halls by name and movies by title.
pub async fn seed_database(db: &DatabaseConnection, config: &SeedConfig) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for seed in &config.users {
        if user::get_user_by_username(db, &seed.username).await?.is_some() {
            debug!(username = %seed.username, "User already exists");
            continue;
        }
        let new_user = user::NewUser {
            username: seed.username.clone(),
            email: seed.email.clone(),
            token: seed.token.clone(),
            is_staff: seed.is_staff,
            is_superuser: seed.is_superuser,
            wallet: seed.wallet,
        };
        user::create_user(db, new_user).await?;
        report.users += 1;
    }

    let existing_halls = hall::list_halls(db).await?;
    for seed in &config.halls {
        if existing_halls.iter().any(|h| h.name == seed.name.trim()) {
            debug!(name = %seed.name, "Hall already exists");
            continue;
        }
        hall::insert_hall(db, &seed.name, seed.seats).await?;
        report.halls += 1;
    }

    for seed in &config.movies {
        let existing = Movie::find()
            .filter(movie_entity::Column::Title.eq(seed.title.trim()))
            .one(db)
            .await?;
        if existing.is_some() {
            debug!(title = %seed.title, "Movie already exists");
            continue;
        }
        movie::insert_movie(db, seed).await?;
        report.movies += 1;
    }

    info!(
        users = report.users,
        halls = report.halls,
        movies = report.movies,
        "Seeding finished"
    );
    Ok(report)
}
