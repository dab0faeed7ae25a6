use crate::error::{RepoResult, SqlxErrorExt};
use crate::row::{bind_params, decode_row};
use crate::tx::Tx;
use relq_data::{
    Dialect, Error, Filter, IdentityTranscoder, Pager, Predicate, QueryBuilder, Record, Sorter,
    TableSchema, Transcoder, Value,
};
use sqlx::any::{AnyQueryResult, AnyRow};
use sqlx::{AnyPool, Row};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, trace};

/// Pluggable pre-write validation hook, run before insert and update.
pub trait Validator: Send + Sync {
    fn validate(&self, record: &Record) -> Result<(), Error>;
}

/// Generic repository over one bound table.
///
/// The binding (pool + schema) is supplied at construction and immutable
/// afterwards; transcoder, dialect, and validator are optional override
/// points.
///
/// Every operation takes an optional `&mut Tx`: with one, it runs on that
/// transaction's connection; without, on any pooled connection. Driver
/// failures are wrapped into [`Error::Storage`] at this boundary.
#[derive(Clone)]
pub struct Repository {
    pool: AnyPool,
    schema: Arc<TableSchema>,
    dialect: Dialect,
    transcoder: Arc<dyn Transcoder>,
    validator: Option<Arc<dyn Validator>>,
}

impl Repository {
    pub fn new(pool: AnyPool, schema: TableSchema) -> Self {
        Self {
            pool,
            schema: Arc::new(schema),
            dialect: Dialect::Generic,
            transcoder: Arc::new(IdentityTranscoder),
            validator: None,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Replace the record transcoder.
    ///
    /// The plain repository only applies `to_storage`/`from_storage`; the
    /// transcoder's `scope_filter` is a [`crate::BusinessRepository`]
    /// concern, so attaching a soft-delete transcoder here does not hide
    /// deleted rows from reads.
    pub fn with_transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn transcoder(&self) -> &dyn Transcoder {
        self.transcoder.as_ref()
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.schema).dialect(self.dialect)
    }

    /// Single-row fetch by filter; `Ok(None)` when nothing matches.
    pub async fn get(&self, ctx: Option<&mut Tx>, filter: &Filter) -> RepoResult<Option<Record>> {
        let predicate = Predicate::compile(filter, &self.schema)?;
        let (sql, params) = self
            .builder()
            .select(&predicate, Some(&Pager::per_page(1)), None);
        let row = self.fetch_optional(ctx, &sql, &params).await?;
        self.decode_optional(row)
    }

    /// First row ordered descending by `sorter_key` (default: identity column).
    pub async fn first(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        sorter_key: Option<&str>,
    ) -> RepoResult<Option<Record>> {
        self.single_sorted(ctx, filter, sorter_key, true).await
    }

    /// Last row: ascending by `sorter_key` (default: identity column).
    pub async fn last(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        sorter_key: Option<&str>,
    ) -> RepoResult<Option<Record>> {
        self.single_sorted(ctx, filter, sorter_key, false).await
    }

    async fn single_sorted(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        sorter_key: Option<&str>,
        desc: bool,
    ) -> RepoResult<Option<Record>> {
        let predicate = Predicate::compile(filter, &self.schema)?;
        let sorter = Sorter {
            order_by: sorter_key.map(Into::into),
            desc: Some(desc),
        };
        let (sql, params) =
            self.builder()
                .select(&predicate, Some(&Pager::per_page(1)), Some(&sorter));
        let row = self.fetch_optional(ctx, &sql, &params).await?;
        self.decode_optional(row)
    }

    /// List fetch plus a count over the same filter.
    ///
    /// Without a transaction the two sub-queries run concurrently on pooled
    /// connections; inside one they serialize on its connection.
    pub async fn query(
        &self,
        ctx: Option<&mut Tx>,
        filter: &Filter,
        pager: Option<&Pager>,
        sorter: Option<&Sorter>,
    ) -> RepoResult<(Vec<Record>, u64)> {
        let predicate = Predicate::compile(filter, &self.schema)?;
        let default_sorter = Sorter::default();
        let sorter = sorter.unwrap_or(&default_sorter);
        let (sql, params) = self.builder().select(&predicate, pager, Some(sorter));
        let (count_sql, count_params) = self.builder().count(&predicate);

        let (rows, total) = match ctx {
            Some(tx) => {
                let rows = self.fetch_all(Some(&mut *tx), &sql, &params).await?;
                let total = self.scalar(Some(tx), &count_sql, &count_params).await?;
                (rows, total)
            }
            None => tokio::try_join!(
                self.fetch_all(None, &sql, &params),
                self.scalar(None, &count_sql, &count_params)
            )?,
        };

        let records = rows
            .iter()
            .map(|row| {
                decode_row(row, &self.schema).map(|rec| self.transcoder.from_storage(rec))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total))
    }

    pub async fn count(&self, ctx: Option<&mut Tx>, filter: &Filter) -> RepoResult<u64> {
        let predicate = Predicate::compile(filter, &self.schema)?;
        let (sql, params) = self.builder().count(&predicate);
        self.scalar(ctx, &sql, &params).await
    }

    /// Insert one record and return the storage-generated identifier.
    pub async fn insert(&self, ctx: Option<&mut Tx>, data: Record) -> RepoResult<i64> {
        if let Some(validator) = &self.validator {
            validator.validate(&data)?;
        }
        let data = self.transcoder.to_storage(data, false);
        let (sql, params) = self.builder().insert(&data)?;
        let result = self.execute_stmt(ctx, &sql, &params).await?;
        result
            .last_insert_id()
            .ok_or_else(|| Error::Other("driver did not report a generated id".into()))
    }

    /// Update rows matched by the WHERE mapping; returns the affected count.
    ///
    /// WHERE keys that do not name a column are skipped, not failed — the
    /// write path is deliberately lenient where reads are strict.
    pub async fn update(
        &self,
        ctx: Option<&mut Tx>,
        where_filter: &Filter,
        data: Record,
    ) -> RepoResult<u64> {
        if let Some(validator) = &self.validator {
            validator.validate(&data)?;
        }
        let data = self.transcoder.to_storage(data, false);
        let predicate = Predicate::compile_lenient(where_filter, &self.schema);
        let (sql, params) = self.builder().update(&predicate, &data)?;
        Ok(self.execute_stmt(ctx, &sql, &params).await?.rows_affected())
    }

    /// Physical delete; the soft-deleting variant lives on
    /// [`crate::BusinessRepository`].
    pub async fn delete(&self, ctx: Option<&mut Tx>, where_filter: &Filter) -> RepoResult<u64> {
        let predicate = Predicate::compile_lenient(where_filter, &self.schema);
        let (sql, params) = self.builder().delete(&predicate);
        Ok(self.execute_stmt(ctx, &sql, &params).await?.rows_affected())
    }

    /// Raw statement escape hatch; values still bind as placeholders.
    pub async fn execute(
        &self,
        ctx: Option<&mut Tx>,
        sql: &str,
        params: &[Value],
    ) -> RepoResult<u64> {
        Ok(self.execute_stmt(ctx, sql, params).await?.rows_affected())
    }

    /// Begin an explicit transaction on a checked-out connection.
    pub async fn begin(&self) -> RepoResult<Tx> {
        let tx = self.pool.begin().await.map_err(|e| e.into_repo_error())?;
        Ok(Tx::new(tx))
    }

    /// Scoped transaction: commit on `Ok`, rollback on `Err`, connection
    /// released on every path. A rollback failure is raised instead of the
    /// original error, never silently swallowed.
    pub async fn transaction<T, F>(&self, f: F) -> RepoResult<T>
    where
        F: for<'t> FnOnce(
            &'t mut Tx,
        ) -> Pin<Box<dyn Future<Output = RepoResult<T>> + Send + 't>>,
    {
        let mut tx = self.begin().await?;
        match f(&mut tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    fn decode_optional(&self, row: Option<AnyRow>) -> RepoResult<Option<Record>> {
        row.map(|r| decode_row(&r, &self.schema))
            .transpose()
            .map(|opt| opt.map(|rec| self.transcoder.from_storage(rec)))
    }

    async fn fetch_all(
        &self,
        ctx: Option<&mut Tx>,
        sql: &str,
        params: &[Value],
    ) -> RepoResult<Vec<AnyRow>> {
        debug!(table = self.schema.name(), sql, binds = params.len(), "fetch_all");
        let query = bind_params(sql, params);
        let rows = match ctx {
            Some(tx) => query.fetch_all(tx.as_mut()).await,
            None => query.fetch_all(&self.pool).await,
        }
        .map_err(|e| e.into_repo_error())?;
        trace!(rows = rows.len(), "fetched");
        Ok(rows)
    }

    async fn fetch_optional(
        &self,
        ctx: Option<&mut Tx>,
        sql: &str,
        params: &[Value],
    ) -> RepoResult<Option<AnyRow>> {
        debug!(table = self.schema.name(), sql, binds = params.len(), "fetch_optional");
        let query = bind_params(sql, params);
        match ctx {
            Some(tx) => query.fetch_optional(tx.as_mut()).await,
            None => query.fetch_optional(&self.pool).await,
        }
        .map_err(|e| e.into_repo_error())
    }

    async fn scalar(&self, ctx: Option<&mut Tx>, sql: &str, params: &[Value]) -> RepoResult<u64> {
        debug!(table = self.schema.name(), sql, binds = params.len(), "scalar");
        let query = bind_params(sql, params);
        let row = match ctx {
            Some(tx) => query.fetch_one(tx.as_mut()).await,
            None => query.fetch_one(&self.pool).await,
        }
        .map_err(|e| e.into_repo_error())?;
        let count: i64 = row.try_get(0).map_err(|e| e.into_repo_error())?;
        Ok(count.max(0) as u64)
    }

    async fn execute_stmt(
        &self,
        ctx: Option<&mut Tx>,
        sql: &str,
        params: &[Value],
    ) -> RepoResult<AnyQueryResult> {
        debug!(table = self.schema.name(), sql, binds = params.len(), "execute");
        let query = bind_params(sql, params);
        match ctx {
            Some(tx) => query.execute(tx.as_mut()).await,
            None => query.execute(&self.pool).await,
        }
        .map_err(|e| e.into_repo_error())
    }
}
