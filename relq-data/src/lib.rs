pub mod error;
pub mod filter;
pub mod page;
pub mod query;
pub mod record;
pub mod schema;
pub mod transcode;
pub mod value;

pub use error::Error;
pub use filter::{Condition, Filter, FilterValue, Predicate};
pub use page::{Pager, Sorter, DEFAULT_PAGE_SIZE};
pub use query::{Dialect, QueryBuilder};
pub use record::Record;
pub use schema::{ColumnDef, ColumnType, TableSchema};
pub use transcode::{IdentityTranscoder, SoftDeleteTranscoder, Transcoder};
pub use value::Value;

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        ColumnType, Error, Filter, Pager, Predicate, QueryBuilder, Record, Sorter, TableSchema,
        Transcoder, Value,
    };
}
