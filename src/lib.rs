//! Zukii - Turn websites into embeddable voice agents

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod voice;
pub mod website;
