use crate::error::Error;
use crate::schema::TableSchema;
use crate::value::Value;

/// One or many scalar values attached to a filter key.
///
/// A bare scalar is normalized to a one-element list before dispatch; an
/// empty list makes the key a no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    One(Value),
    Many(Vec<Value>),
}

impl FilterValue {
    fn values(&self) -> Vec<Value> {
        match self {
            FilterValue::One(v) => vec![v.clone()],
            FilterValue::Many(vs) => vs.clone(),
        }
    }
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        FilterValue::One(v)
    }
}

impl From<Vec<Value>> for FilterValue {
    fn from(vs: Vec<Value>) -> Self {
        FilterValue::Many(vs)
    }
}

/// A flat key → value(s) mapping describing a row-selection condition.
///
/// Keys may carry an operator prefix (`_gt_`, `_gte_`, `_lt_`, `_lte_`,
/// `_like_`, `_in_`); a bare key means equality. Insertion order is kept and
/// carried through to the compiled predicate.
///
/// # Example
///
/// ```
/// use relq_data::Filter;
///
/// let filter = Filter::new()
///     .with("status", "active")
///     .with("_gt_age", 18)
///     .with_all("_in_role", ["admin", "user"]);
/// assert_eq!(filter.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: Vec<(String, FilterValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, FilterValue::One(value.into()));
        self
    }

    pub fn with_all<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert(
            key,
            FilterValue::Many(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A single column predicate. Values always bind as placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    /// Pattern already carries the trailing `%` (prefix match).
    Like(String, String),
    In(String, Vec<Value>),
    IsNull(String),
}

/// Compiled conjunction of column predicates, reusable across the list and
/// count queries of one request without re-parsing the filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

#[derive(Clone, Copy)]
enum Op {
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    Eq,
}

// Ordered so the longest recognized prefix wins (`_gte_` before `_gt_`).
const PREFIXES: &[(&str, Op)] = &[
    ("_gte_", Op::Gte),
    ("_gt_", Op::Gt),
    ("_lte_", Op::Lte),
    ("_lt_", Op::Lt),
    ("_like_", Op::Like),
    ("_in_", Op::In),
];

fn classify(key: &str) -> (Op, &str) {
    for (prefix, op) in PREFIXES {
        if let Some(rest) = key.strip_prefix(prefix) {
            return (*op, rest);
        }
    }
    (Op::Eq, key)
}

impl Predicate {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Strict compilation used for reads: every stripped key must resolve to
    /// a declared column, otherwise the offending key is reported.
    pub fn compile(filter: &Filter, schema: &TableSchema) -> Result<Predicate, Error> {
        let mut conditions = Vec::new();
        for (key, fv) in filter.iter() {
            let values = fv.values();
            if values.is_empty() {
                continue;
            }
            let (op, column_key) = classify(key);
            let column = schema
                .column(column_key)
                .ok_or_else(|| Error::Schema { key: key.to_string() })?;
            push_conditions(&mut conditions, op, &column.name, values);
        }
        Ok(Predicate { conditions })
    }

    /// Lenient compilation used for update/delete WHERE mappings: keys are
    /// taken verbatim (no prefix stripping), matched as equality, and keys
    /// that do not name a column are skipped rather than failing.
    pub fn compile_lenient(filter: &Filter, schema: &TableSchema) -> Predicate {
        let mut conditions = Vec::new();
        for (key, fv) in filter.iter() {
            let Some(column) = schema.column(key) else {
                continue;
            };
            let Some(value) = fv.values().into_iter().next() else {
                continue;
            };
            conditions.push(eq_condition(&column.name, value));
        }
        Predicate { conditions }
    }
}

fn push_conditions(out: &mut Vec<Condition>, op: Op, column: &str, values: Vec<Value>) {
    match op {
        Op::Gt => out.extend(values.into_iter().map(|v| Condition::Gt(column.into(), v))),
        Op::Gte => out.extend(values.into_iter().map(|v| Condition::Gte(column.into(), v))),
        Op::Lt => out.extend(values.into_iter().map(|v| Condition::Lt(column.into(), v))),
        Op::Lte => out.extend(values.into_iter().map(|v| Condition::Lte(column.into(), v))),
        Op::Like => out.extend(
            values
                .into_iter()
                .map(|v| Condition::Like(column.into(), format!("{}%", v.render_text()))),
        ),
        Op::In => out.push(Condition::In(column.into(), values)),
        Op::Eq => {
            // only the first value participates in equality
            if let Some(value) = values.into_iter().next() {
                out.push(eq_condition(column, value));
            }
        }
    }
}

fn eq_condition(column: &str, value: Value) -> Condition {
    if value.is_null() {
        Condition::IsNull(column.to_string())
    } else {
        Condition::Eq(column.to_string(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn schema() -> TableSchema {
        TableSchema::builder("users")
            .column("id", ColumnType::Int)
            .column("name", ColumnType::Text)
            .column("age", ColumnType::Int)
            .column("deleted_at", ColumnType::Timestamp)
            .build()
            .unwrap()
    }

    #[test]
    fn test_equality_keys_keep_iteration_order() {
        let filter = Filter::new().with("name", "alice").with("age", 30);
        let pred = Predicate::compile(&filter, &schema()).unwrap();
        assert_eq!(
            pred.conditions(),
            &[
                Condition::Eq("name".into(), Value::Text("alice".into())),
                Condition::Eq("age".into(), Value::Int(30)),
            ]
        );
    }

    #[test]
    fn test_scalar_equality_uses_first_of_list() {
        let filter = Filter::new().with_all("age", [30, 40]);
        let pred = Predicate::compile(&filter, &schema()).unwrap();
        assert_eq!(
            pred.conditions(),
            &[Condition::Eq("age".into(), Value::Int(30))]
        );
    }

    #[test]
    fn test_in_compiles_to_single_clause() {
        let filter = Filter::new().with_all("_in_age", [1, 2, 3]);
        let pred = Predicate::compile(&filter, &schema()).unwrap();
        assert_eq!(
            pred.conditions(),
            &[Condition::In(
                "age".into(),
                vec![Value::Int(1), Value::Int(2), Value::Int(3)]
            )]
        );
    }

    #[test]
    fn test_gt_list_applies_every_value() {
        // redundant conditions are kept, not collapsed
        let filter = Filter::new().with_all("_gt_age", [5, 10]);
        let pred = Predicate::compile(&filter, &schema()).unwrap();
        assert_eq!(
            pred.conditions(),
            &[
                Condition::Gt("age".into(), Value::Int(5)),
                Condition::Gt("age".into(), Value::Int(10)),
            ]
        );
    }

    #[test]
    fn test_gte_wins_over_gt() {
        let filter = Filter::new().with("_gte_age", 18);
        let pred = Predicate::compile(&filter, &schema()).unwrap();
        assert_eq!(
            pred.conditions(),
            &[Condition::Gte("age".into(), Value::Int(18))]
        );
    }

    #[test]
    fn test_like_appends_percent() {
        let filter = Filter::new().with("_like_name", "ali");
        let pred = Predicate::compile(&filter, &schema()).unwrap();
        assert_eq!(
            pred.conditions(),
            &[Condition::Like("name".into(), "ali%".into())]
        );
    }

    #[test]
    fn test_null_equality_becomes_is_null() {
        let filter = Filter::new().with("deleted_at", Value::Null);
        let pred = Predicate::compile(&filter, &schema()).unwrap();
        assert_eq!(pred.conditions(), &[Condition::IsNull("deleted_at".into())]);
    }

    #[test]
    fn test_unknown_column_fails_with_offending_key() {
        let filter = Filter::new().with("_gt_height", 10);
        let err = Predicate::compile(&filter, &schema()).unwrap_err();
        match err {
            Error::Schema { key } => assert_eq!(key, "_gt_height"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_list_skips_key() {
        let filter = Filter::new()
            .with_all("_in_age", Vec::<Value>::new())
            .with("name", "alice");
        let pred = Predicate::compile(&filter, &schema()).unwrap();
        assert_eq!(pred.conditions().len(), 1);
    }

    #[test]
    fn test_lenient_skips_unknown_and_prefixed_keys() {
        let filter = Filter::new()
            .with("name", "alice")
            .with("nope", 1)
            .with("_gt_age", 5);
        let pred = Predicate::compile_lenient(&filter, &schema());
        // "_gt_age" is not a column name, so it is skipped verbatim
        assert_eq!(
            pred.conditions(),
            &[Condition::Eq("name".into(), Value::Text("alice".into()))]
        );
    }

    #[test]
    fn test_lenient_null_equality() {
        let filter = Filter::new().with("deleted_at", Value::Null);
        let pred = Predicate::compile_lenient(&filter, &schema());
        assert_eq!(pred.conditions(), &[Condition::IsNull("deleted_at".into())]);
    }
}
