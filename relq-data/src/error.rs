/// Errors surfaced by the data layer.
///
/// Driver-specific failures are always wrapped into `Storage` at the
/// repository boundary; callers never see the underlying driver types.
/// An absent row is `Ok(None)`, never an error.
#[derive(Debug)]
pub enum Error {
    /// A filter key's column does not exist in the bound table (reads only;
    /// update/delete WHERE keys are silently skipped instead).
    Schema { key: String },
    /// Caller-supplied data rejected by the validation hook before a write.
    Validation(String),
    /// Repository or schema misconfiguration detected at binding time.
    Binding(String),
    /// Wrapped driver failure (connectivity, constraint, coercion).
    Storage(Box<dyn std::error::Error + Send + Sync>),
    /// Anything else the layer cannot classify.
    Other(String),
}

impl Error {
    /// Construct a `Storage` variant from any driver error type.
    ///
    /// Used by backend crates to wrap driver-specific errors.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Storage(Box::new(err))
    }

    /// Business error code for the uniform error channel.
    pub fn code(&self) -> u32 {
        match self {
            Error::Schema { .. } | Error::Validation(_) => 400,
            Error::Binding(_) | Error::Storage(_) | Error::Other(_) => 500,
        }
    }

    /// HTTP-style status for the uniform error channel.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Schema { .. } | Error::Validation(_) => 400,
            Error::Binding(_) | Error::Storage(_) | Error::Other(_) => 500,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Schema { key } => write!(f, "Unknown column for filter key: {key}"),
            Error::Validation(msg) => write!(f, "Validation failed: {msg}"),
            Error::Binding(msg) => write!(f, "Repository binding error: {msg}"),
            Error::Storage(err) => write!(f, "Storage error: {err}"),
            Error::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Storage(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
