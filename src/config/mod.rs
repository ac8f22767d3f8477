/// Database configuration and connection management
pub mod database;

/// Seed accounts, halls and movies from config.toml
pub mod seed;

/// Listener address, config paths and CORS from environment variables
pub mod server;
