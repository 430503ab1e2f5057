//! Users domain
//!
//! The User aggregate, its single lifecycle event and the repository that
//! projects it. Passwords are hashed with Argon2 at registration time and
//! only the PHC string ever reaches storage.

pub mod commands;
pub mod error;
pub mod events;
pub mod models;
pub mod postgres;
pub mod repository;

pub use commands::CreateUser;
pub use error::{UserError, UserResult};
pub use events::UserEvent;
pub use models::{Role, User, UserSnapshot};
pub use postgres::PgUserRepository;
pub use repository::UserRepository;
