//! Repositories

pub mod kv;
