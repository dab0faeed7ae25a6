use relq_data::Error;

/// Extension trait for converting `sqlx::Error` into the layer's [`Error`].
///
/// Due to Rust's orphan rules, `From<sqlx::Error> for Error` can't be
/// implemented in this crate. Use `.into_repo_error()` at the boundary.
pub trait SqlxErrorExt {
    fn into_repo_error(self) -> Error;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_repo_error(self) -> Error {
        Error::storage(self)
    }
}

/// Convenience alias for repository results.
pub type RepoResult<T> = Result<T, Error>;
