//! Multi-table runtime: per-table actors, their messages, and the
//! registry that spawns them.

mod actor;
mod config;
mod manager;
pub mod messages;

pub use actor::{TableActor, TableClosed, TableHandle};
pub use config::{TableConfig, TableSpeed};
pub use manager::{DEFAULT_MAX_TABLES, TableManager};

use uuid::Uuid;

/// Short identifiers for games and players, enough entropy for an
/// in-memory registry.
pub(crate) fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
