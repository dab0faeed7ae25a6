use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDateTime, Utc};
use relq_data::value::render_timestamp;
use relq_data::{ColumnType, Error, Record, TableSchema, Value};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Row};

/// Bind every value as a placeholder argument, in order.
///
/// Timestamps and bytes travel as their canonical text forms (RFC 3339,
/// base64) so the Any driver only needs its portable scalar encodings.
pub(crate) fn bind_params<'q>(
    sql: &'q str,
    params: &'q [Value],
) -> Query<'q, Any, AnyArguments<'q>> {
    let mut query: Query<'q, Any, AnyArguments<'q>> = sqlx::query(sql);
    for value in params {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::Int(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Timestamp(ts) => query.bind(render_timestamp(ts)),
            Value::Bytes(bytes) => query.bind(BASE64.encode(bytes)),
        };
    }
    query
}

/// Decode one row into a [`Record`] using the declared column types.
///
/// Lookup is schema-driven: every declared column is read by name, and SQL
/// NULL maps to [`Value::Null`].
pub(crate) fn decode_row(row: &AnyRow, schema: &TableSchema) -> Result<Record, Error> {
    let mut record = Record::new();
    for col in schema.columns() {
        let name = col.name.as_str();
        let value = match col.ty {
            ColumnType::Bool => decode_bool(row, name)?,
            ColumnType::Int => row
                .try_get::<Option<i64>, _>(name)
                .map_err(Error::storage)?
                .map(Value::Int),
            ColumnType::Float => row
                .try_get::<Option<f64>, _>(name)
                .map_err(Error::storage)?
                .map(Value::Float),
            ColumnType::Text => row
                .try_get::<Option<String>, _>(name)
                .map_err(Error::storage)?
                .map(Value::Text),
            ColumnType::Timestamp => row
                .try_get::<Option<String>, _>(name)
                .map_err(Error::storage)?
                .map(|s| parse_timestamp(name, &s))
                .transpose()?,
            ColumnType::Bytes => row
                .try_get::<Option<String>, _>(name)
                .map_err(Error::storage)?
                .map(|s| {
                    BASE64
                        .decode(s.as_bytes())
                        .map(Value::Bytes)
                        .map_err(|e| Error::Other(format!("bad base64 in column {name}: {e}")))
                })
                .transpose()?,
        };
        record.insert(name, value.unwrap_or(Value::Null));
    }
    Ok(record)
}

// Some engines report BOOLEAN columns as integers; accept both.
fn decode_bool(row: &AnyRow, name: &str) -> Result<Option<Value>, Error> {
    match row.try_get::<Option<bool>, _>(name) {
        Ok(v) => Ok(v.map(Value::Bool)),
        Err(_) => Ok(row
            .try_get::<Option<i64>, _>(name)
            .map_err(Error::storage)?
            .map(|v| Value::Bool(v != 0))),
    }
}

fn parse_timestamp(name: &str, text: &str) -> Result<Value, Error> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(Value::Timestamp(ts.with_timezone(&Utc)));
    }
    // space-separated form written by engines with native datetime columns
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Value::Timestamp(naive.and_utc()));
    }
    Err(Error::Other(format!(
        "bad timestamp in column {name}: {text}"
    )))
}
