use crate::error::RepoResult;
use crate::repository::Repository;
use crate::tx::Tx;
use chrono::Utc;
use relq_data::transcode::{CREATED_AT, CREATED_BY, DELETED_AT, UPDATED_AT, UPDATED_BY};
use relq_data::{Filter, Pager, Record, SoftDeleteTranscoder, Sorter, TableSchema};
use sqlx::AnyPool;
use std::sync::Arc;

/// Business repository: audit stamping plus soft-delete scoping on top of
/// the plain [`Repository`].
///
/// Reads exclude soft-deleted rows unless `unscoped` is passed; `delete`
/// marks rows via `deleted_at` instead of removing them; every write stamps
/// the acting user. Returned records go through the soft-delete transcoder,
/// so audit columns are stripped and values are JSON-safe.
#[derive(Clone)]
pub struct BusinessRepository {
    inner: Repository,
}

impl BusinessRepository {
    pub fn new(pool: AnyPool, schema: TableSchema) -> Self {
        Self {
            inner: Repository::new(pool, schema)
                .with_transcoder(Arc::new(SoftDeleteTranscoder)),
        }
    }

    /// Wrap an already-configured repository (custom transcoder, validator,
    /// dialect). The transcoder's `scope_filter` drives row scoping.
    pub fn from_repository(inner: Repository) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Repository {
        &self.inner
    }

    fn scoped(&self, filter: &Filter, unscoped: bool) -> Filter {
        self.inner.transcoder().scope_filter(filter.clone(), unscoped)
    }

    pub async fn get(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        unscoped: bool,
    ) -> RepoResult<Option<Record>> {
        let filter = self.scoped(filter, unscoped);
        self.inner.get(ctx, &filter).await
    }

    pub async fn first(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        sorter_key: Option<&str>,
        unscoped: bool,
    ) -> RepoResult<Option<Record>> {
        let filter = self.scoped(filter, unscoped);
        self.inner.first(ctx, &filter, sorter_key).await
    }

    pub async fn last(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        sorter_key: Option<&str>,
        unscoped: bool,
    ) -> RepoResult<Option<Record>> {
        let filter = self.scoped(filter, unscoped);
        self.inner.last(ctx, &filter, sorter_key).await
    }

    pub async fn query(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        pager: Option<&Pager>,
        sorter: Option<&Sorter>,
        unscoped: bool,
    ) -> RepoResult<(Vec<Record>, u64)> {
        let filter = self.scoped(filter, unscoped);
        self.inner.query(ctx, &filter, pager, sorter).await
    }

    pub async fn count(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        unscoped: bool,
    ) -> RepoResult<u64> {
        let filter = self.scoped(filter, unscoped);
        self.inner.count(ctx, &filter).await
    }

    /// Insert with `created_at`/`created_by` stamped from the acting user.
    pub async fn insert(
        &self,
        ctx: Option<&mut Tx>,
        mut data: Record,
        modify_by: &str,
    ) -> RepoResult<i64> {
        data.insert(CREATED_AT, Utc::now());
        data.insert(CREATED_BY, modify_by);
        self.inner.insert(ctx, data).await
    }

    /// Update with `updated_at`/`updated_by` stamped; `created_at` is left
    /// untouched. The WHERE mapping is scoped like a read.
    pub async fn update(
        &self,
        ctx: Option<&mut Tx>,
        where_filter: &Filter,
        mut data: Record,
        modify_by: &str,
        unscoped: bool,
    ) -> RepoResult<u64> {
        data.insert(UPDATED_AT, Utc::now());
        data.insert(UPDATED_BY, modify_by);
        let where_filter = self.scoped(where_filter, unscoped);
        self.inner.update(ctx, &where_filter, data).await
    }

    /// Soft delete: an UPDATE setting `deleted_at`, never a physical DELETE.
    /// With `unscoped: true` this becomes a hard delete instead.
    pub async fn delete(
        &self,
        ctx: Option<&mut Tx>,
        where_filter: &Filter,
        modify_by: &str,
        unscoped: bool,
    ) -> RepoResult<u64> {
        if unscoped {
            return self.inner.delete(ctx, where_filter).await;
        }
        let data = Record::new()
            .set(DELETED_AT, Utc::now())
            .set(UPDATED_BY, modify_by);
        let where_filter = self.scoped(where_filter, false);
        self.inner.update(ctx, &where_filter, data).await
    }
}
