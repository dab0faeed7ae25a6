//! # relq-data-sqlx — SQLx backend for the relq data layer
//!
//! This crate executes the statements assembled by [`relq-data`] against a
//! real database through SQLx's `Any` driver, so one implementation covers
//! SQLite, Postgres, and MySQL.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Repository`] | Generic façade: get / first / last / query / count / insert / update / delete over one bound table |
//! | [`BusinessRepository`] | Soft-delete + audit-stamping wrapper around [`Repository`] |
//! | [`Tx`] | Scoped transaction — commit on success, rollback on drop, connection always released |
//! | [`DbConfig`] | Pool configuration section (url, size, acquire timeout) |
//! | [`Validator`] | Pluggable pre-write validation hook |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `relq_data::Error` |
//! | [`RepoResult<T>`] | Type alias for `Result<T, relq_data::Error>` |
//!
//! # Quick start
//!
//! ```ignore
//! use relq_data::{ColumnType, Filter, TableSchema};
//! use relq_data_sqlx::{DbConfig, Repository};
//!
//! let pool = DbConfig::new("sqlite::memory:").connect().await?;
//! let schema = TableSchema::builder("users")
//!     .column("id", ColumnType::Int)
//!     .column("name", ColumnType::Text)
//!     .build()?;
//! let repo = Repository::new(pool, schema);
//! let user = repo.get(None, &Filter::new().with("name", "alice")).await?;
//! ```
//!
//! # Transactions
//!
//! Operations take an optional `&mut Tx`. With a `Tx` they run serialized on
//! that one connection in submission order; without one they use any pooled
//! connection (and `query`'s list + count sub-queries overlap).
//!
//! ```ignore
//! let mut tx = repo.begin().await?;
//! repo.insert(Some(&mut tx), record).await?;
//! tx.commit().await?;
//! ```
//!
//! Dropping a `Tx` without committing rolls back. A failed commit is
//! reported as a storage error after the driver has already torn the
//! transaction down; the connection goes back to the pool on every path.
//!
//! # Error bridging
//!
//! Orphan rules prevent `From<sqlx::Error> for relq_data::Error` here; the
//! boundary uses [`SqlxErrorExt::into_repo_error`] instead, and callers of
//! this crate never see `sqlx::Error`.

pub mod business;
pub mod config;
pub mod error;
pub mod repository;
mod row;
pub mod tx;

pub use business::BusinessRepository;
pub use config::DbConfig;
pub use error::{RepoResult, SqlxErrorExt};
pub use repository::{Repository, Validator};
pub use tx::Tx;

/// Re-exports of the most commonly used types from `relq-data` and this crate.
pub mod prelude {
    pub use crate::{BusinessRepository, DbConfig, RepoResult, Repository, SqlxErrorExt, Tx};
    pub use relq_data::prelude::*;
}
