// Tests for the local key-value database

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use zukii::db::{Database, KvRepository};

fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(db_path).unwrap();
    (db, temp_dir)
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Sample {
    count: u32,
    label: String,
}

#[tokio::test]
async fn test_database_initialization() {
    let (db, _temp) = create_test_db();
    assert!(db.path().contains("test.db"));

    let kv = KvRepository::new(db);
    assert!(kv.get_raw("zukii-websites").await.unwrap().is_none());
}

#[tokio::test]
async fn test_in_memory_database() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.path(), ":memory:");

    let kv = KvRepository::new(db.clone());
    kv.set_raw("key", "value").await.unwrap();

    // Clones share the connection
    let other = KvRepository::new(db);
    assert_eq!(other.get_raw("key").await.unwrap().as_deref(), Some("value"));
}

#[tokio::test]
async fn test_missing_key() {
    let (db, _temp) = create_test_db();
    let kv = KvRepository::new(db);

    assert!(kv.get_raw("nope").await.unwrap().is_none());
    assert!(kv.load::<Sample>("nope").await.is_none());
}

#[tokio::test]
async fn test_save_overwrites() {
    let (db, _temp) = create_test_db();
    let kv = KvRepository::new(db);

    kv.save("sample", &Sample { count: 1, label: "a".into() }).await.unwrap();
    kv.save("sample", &Sample { count: 2, label: "b".into() }).await.unwrap();

    let loaded: Sample = kv.load("sample").await.unwrap();
    assert_eq!(loaded, Sample { count: 2, label: "b".into() });
}

#[tokio::test]
async fn test_corrupt_value_loads_as_none() {
    let (db, _temp) = create_test_db();
    let kv = KvRepository::new(db);

    kv.set_raw("sample", "{\"count\": \"many\"}").await.unwrap();

    assert!(kv.load::<Sample>("sample").await.is_none());
}

#[tokio::test]
async fn test_values_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    {
        let kv = KvRepository::new(Database::new(&db_path).unwrap());
        kv.save("sample", &Sample { count: 3, label: "c".into() }).await.unwrap();
    }

    let kv = KvRepository::new(Database::new(&db_path).unwrap());
    let loaded: Sample = kv.load("sample").await.unwrap();
    assert_eq!(loaded.count, 3);

    kv.delete("sample").await.unwrap();
    assert!(kv.get_raw("sample").await.unwrap().is_none());
}
