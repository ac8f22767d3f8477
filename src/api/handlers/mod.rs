/// Liveness probe
pub mod health;
/// Hall endpoints
pub mod halls;
/// Movie endpoints
pub mod movies;
/// Purchase endpoints
pub mod purchases;
/// Session and seat availability endpoints
pub mod sessions;
/// Current account endpoint
pub mod users;
