use crate::error::{RepoResult, SqlxErrorExt};
use sqlx::{Any, AnyConnection, Transaction};
use tracing::warn;

/// A scoped transaction: one checked-out connection owning the whole
/// begin → commit/rollback lifecycle.
///
/// Operations handed a `&mut Tx` run serialized on this connection in
/// submission order. Dropping without commit rolls back; the connection is
/// returned to the pool on every exit path, including a failed commit.
pub struct Tx {
    inner: Transaction<'static, Any>,
}

impl Tx {
    pub(crate) fn new(inner: Transaction<'static, Any>) -> Self {
        Self { inner }
    }

    /// Mutable access to the underlying connection for raw sqlx calls.
    pub fn as_mut(&mut self) -> &mut AnyConnection {
        &mut self.inner
    }

    /// Commit. On failure the driver has already torn the transaction down
    /// (rollback on drop); the commit error is surfaced, never masked.
    pub async fn commit(self) -> RepoResult<()> {
        self.inner.commit().await.map_err(|e| {
            warn!(error = %e, "transaction commit failed");
            e.into_repo_error()
        })
    }

    /// Explicit rollback. A failure here is raised to the caller; the
    /// connection is still released.
    pub async fn rollback(self) -> RepoResult<()> {
        self.inner.rollback().await.map_err(|e| {
            warn!(error = %e, "transaction rollback failed");
            e.into_repo_error()
        })
    }
}
