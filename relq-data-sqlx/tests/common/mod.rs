#![allow(dead_code)]

use relq_data::{ColumnType, Record, TableSchema};
use relq_data_sqlx::{BusinessRepository, DbConfig, Repository};

// Opt-in statement logging: RUST_LOG=relq_data_sqlx=debug cargo test -- --nocapture
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// One connection so every statement in a test sees the same in-memory db.
pub async fn memory_pool() -> sqlx::AnyPool {
    init_tracing();
    DbConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        acquire_timeout_secs: 5,
    }
    .connect()
    .await
    .expect("in-memory pool")
}

pub fn users_schema() -> TableSchema {
    TableSchema::builder("users")
        .column("id", ColumnType::Int)
        .column("name", ColumnType::Text)
        .column("age", ColumnType::Int)
        .audit_columns()
        .build()
        .expect("users schema")
}

const CREATE_USERS: &str = "CREATE TABLE users (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    name TEXT, \
    age BIGINT, \
    created_at TEXT, \
    updated_at TEXT, \
    deleted_at TEXT, \
    created_by TEXT, \
    updated_by TEXT)";

pub async fn setup() -> Repository {
    let pool = memory_pool().await;
    let repo = Repository::new(pool, users_schema());
    repo.execute(None, CREATE_USERS, &[]).await.expect("create table");
    repo
}

pub async fn setup_business() -> (BusinessRepository, Repository) {
    let repo = setup().await;
    let business = BusinessRepository::new(repo.pool().clone(), users_schema());
    (business, repo)
}

pub fn user(name: &str, age: i64) -> Record {
    Record::new().set("name", name).set("age", age)
}
