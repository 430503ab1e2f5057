//! Notifications domain
//!
//! The Notification aggregate, its events, the commands that mutate it and
//! the repository projecting those events into relational rows. Structured
//! exactly like the tasks domain: commands run the load → validate → mutate
//! → persist → publish protocol over the shared event-sourcing substrate.

pub mod commands;
pub mod error;
pub mod events;
pub mod models;
pub mod postgres;
pub mod repository;

pub use commands::{CreateNotification, MarkNotificationRead};
pub use error::{NotificationError, NotificationResult};
pub use events::NotificationEvent;
pub use models::{Notification, NotificationSnapshot, NotificationStatus};
pub use postgres::PgNotificationRepository;
pub use repository::NotificationRepository;
