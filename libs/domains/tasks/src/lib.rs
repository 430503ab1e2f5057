//! Tasks domain
//!
//! The Task aggregate, the events it emits, the commands that mutate it and
//! the repository that projects those events into relational rows.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Commands   │  ← load → validate → mutate → persist → publish
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Aggregate  │  ← invariants; one event per state change
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← event → SQL effect; snapshot reads
//! └─────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod events;
pub mod models;
pub mod postgres;
pub mod repository;

pub use commands::{AddDependency, CreateTask, RemoveDependency, UpdateTaskStatus};
pub use error::{TaskError, TaskResult};
pub use events::TaskEvent;
pub use models::{Task, TaskSnapshot, TaskStatus};
pub use postgres::PgTaskRepository;
pub use repository::TaskRepository;
