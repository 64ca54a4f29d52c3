//! SQL schema definitions

pub const SCHEMA: &str = r#"
-- Key-value state (website collection, auth flag)
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Key holding the persisted website collection
pub const WEBSITES_KEY: &str = "zukii-websites";

/// Key holding the persisted auth state
pub const AUTH_KEY: &str = "zukii-auth";
