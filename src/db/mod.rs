//! Database module

pub mod schema;
pub mod connection;
pub mod repositories;

pub use connection::Database;
pub use repositories::kv::KvRepository;
pub use schema::{AUTH_KEY, WEBSITES_KEY};
