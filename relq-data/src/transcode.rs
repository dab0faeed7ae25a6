use crate::filter::Filter;
use crate::record::Record;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const DELETED_AT: &str = "deleted_at";
pub const CREATED_BY: &str = "created_by";
pub const UPDATED_BY: &str = "updated_by";

const AUDIT_COLUMNS: &[&str] = &[CREATED_AT, UPDATED_AT, DELETED_AT];

/// Conversion between the storage row shape and the external model shape.
///
/// Injected at repository construction; both directions default to identity.
/// `scope_filter` lets a variant rewrite read/write conditions (the
/// soft-delete variant uses it to hide deleted rows).
pub trait Transcoder: Send + Sync {
    fn to_storage(&self, record: Record, _unscoped: bool) -> Record {
        record
    }

    fn from_storage(&self, record: Record) -> Record {
        record
    }

    fn scope_filter(&self, filter: Filter, _unscoped: bool) -> Filter {
        filter
    }
}

/// Pass-through transcoder; the plain repository default.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranscoder;

impl Transcoder for IdentityTranscoder {}

/// Soft-delete aware transcoder used by the business layer.
///
/// Outgoing records lose their audit columns and have driver-native values
/// flattened to JSON-safe scalars; conditions gain `deleted_at IS NULL`
/// unless the caller opts out with `unscoped` or supplies the key itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftDeleteTranscoder;

impl Transcoder for SoftDeleteTranscoder {
    fn from_storage(&self, record: Record) -> Record {
        record
            .into_iter()
            .filter(|(column, _)| !AUDIT_COLUMNS.contains(&column.as_str()))
            .map(|(column, value)| (column, json_safe(value)))
            .collect()
    }

    fn scope_filter(&self, mut filter: Filter, unscoped: bool) -> Filter {
        if !unscoped && !filter.contains_key(DELETED_AT) {
            filter.insert(DELETED_AT, Value::Null);
        }
        filter
    }
}

fn json_safe(value: Value) -> Value {
    match value {
        Value::Timestamp(ts) => Value::Text(crate::value::render_timestamp(&ts)),
        Value::Bytes(bytes) => Value::Text(BASE64.encode(bytes)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_identity_round_trip() {
        let rec = Record::new().set("name", "alice").set("age", 30);
        let t = IdentityTranscoder;
        assert_eq!(t.from_storage(t.to_storage(rec.clone(), false)), rec);
    }

    #[test]
    fn test_soft_delete_round_trip_without_audit_columns() {
        let rec = Record::new().set("name", "alice").set("age", 30);
        let t = SoftDeleteTranscoder;
        assert_eq!(t.from_storage(t.to_storage(rec.clone(), false)), rec);
    }

    #[test]
    fn test_soft_delete_strips_audit_columns() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let rec = Record::new()
            .set("name", "alice")
            .set(CREATED_AT, ts)
            .set(UPDATED_AT, ts)
            .set(DELETED_AT, Value::Null);
        let out = SoftDeleteTranscoder.from_storage(rec);
        assert_eq!(out, Record::new().set("name", "alice"));
    }

    #[test]
    fn test_soft_delete_flattens_native_values() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let rec = Record::new().set("seen_at", ts).set("blob", vec![1u8, 2]);
        let out = SoftDeleteTranscoder.from_storage(rec);
        assert_eq!(
            out.get("seen_at"),
            Some(&Value::Text("2024-05-01T00:00:00.000000Z".into()))
        );
        assert_eq!(out.get("blob"), Some(&Value::Text("AQI=".into())));
    }

    #[test]
    fn test_scope_filter_injects_deleted_at() {
        let scoped = SoftDeleteTranscoder.scope_filter(Filter::new().with("id", 1), false);
        assert!(scoped.contains_key(DELETED_AT));

        let unscoped = SoftDeleteTranscoder.scope_filter(Filter::new().with("id", 1), true);
        assert!(!unscoped.contains_key(DELETED_AT));
    }

    #[test]
    fn test_scope_filter_respects_explicit_deleted_at() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let filter = Filter::new().with(DELETED_AT, ts);
        let scoped = SoftDeleteTranscoder.scope_filter(filter.clone(), false);
        assert_eq!(scoped, filter);
    }
}
