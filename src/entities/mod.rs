//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod hall;
pub mod movie;
pub mod purchase;
pub mod session;
pub mod user;

// Re-export specific types to avoid conflicts
pub use hall::{Column as HallColumn, Entity as Hall, Model as HallModel};
pub use movie::{Column as MovieColumn, Entity as Movie, Model as MovieModel};
pub use purchase::{Column as PurchaseColumn, Entity as Purchase, Model as PurchaseModel};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
