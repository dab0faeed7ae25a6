use crate::error::Error;
use crate::filter::{Condition, Predicate};
use crate::page::{Pager, Sorter};
use crate::record::Record;
use crate::schema::TableSchema;
use crate::value::Value;

/// SQL placeholder style.
#[derive(Debug, Clone, Copy, Default)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }
}

/// Assembles full statements for one bound table.
///
/// Identifiers come exclusively from the validated [`TableSchema`]; caller
/// data only ever appears as bind values.
///
/// # Example
///
/// ```
/// use relq_data::{ColumnType, Filter, Predicate, QueryBuilder, TableSchema};
///
/// let schema = TableSchema::builder("users")
///     .column("id", ColumnType::Int)
///     .column("name", ColumnType::Text)
///     .build()
///     .unwrap();
/// let pred = Predicate::compile(&Filter::new().with("name", "alice"), &schema).unwrap();
/// let (sql, params) = QueryBuilder::new(&schema).select(&pred, None, None);
/// assert_eq!(sql, "SELECT id, name FROM users WHERE name = ?");
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    schema: &'a TableSchema,
    dialect: Dialect,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            dialect: Dialect::Generic,
        }
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// List query: filter + ordering + pagination.
    ///
    /// `sorter: Some(..)` (even a default one) applies ordering; `None`
    /// leaves the statement unordered (single-row lookups).
    pub fn select(
        &self,
        predicate: &Predicate,
        pager: Option<&Pager>,
        sorter: Option<&Sorter>,
    ) -> (String, Vec<Value>) {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.schema.column_list(),
            self.schema.name()
        );
        let mut params = Vec::new();
        let mut idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut idx, predicate);
        if let Some(sorter) = sorter {
            let (column, desc) = sorter.resolve(self.schema);
            let dir = if desc { "DESC" } else { "ASC" };
            sql.push_str(&format!(" ORDER BY {column} {dir}"));
        }
        if let Some(pager) = pager {
            let (limit, offset) = pager.limit_offset();
            if let Some(limit) = limit {
                sql.push_str(&format!(" LIMIT {limit}"));
            }
            if let Some(offset) = offset {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }
        (sql, params)
    }

    /// Count variant: same filter, no ordering or pagination.
    pub fn count(&self, predicate: &Predicate) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.schema.name());
        let mut params = Vec::new();
        let mut idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut idx, predicate);
        (sql, params)
    }

    /// Parameterized INSERT over the record's columns, in record order.
    /// Every column must be declared in the schema.
    pub fn insert(&self, record: &Record) -> Result<(String, Vec<Value>), Error> {
        if record.is_empty() {
            return Err(Error::Validation("insert with no columns".into()));
        }
        let mut columns = Vec::with_capacity(record.len());
        let mut placeholders = Vec::with_capacity(record.len());
        let mut params = Vec::with_capacity(record.len());
        let mut idx = 1usize;
        for (column, value) in record.iter() {
            if !self.schema.has_column(column) {
                return Err(Error::Schema { key: column.to_string() });
            }
            columns.push(column.to_string());
            placeholders.push(self.dialect.placeholder(idx));
            idx += 1;
            params.push(value.clone());
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.schema.name(),
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok((sql, params))
    }

    /// Parameterized UPDATE. SET values bind first, WHERE values after.
    /// An empty predicate updates every row, mirroring the read path's
    /// full-scan behavior.
    pub fn update(
        &self,
        where_predicate: &Predicate,
        record: &Record,
    ) -> Result<(String, Vec<Value>), Error> {
        if record.is_empty() {
            return Err(Error::Validation("update with no columns".into()));
        }
        let mut assignments = Vec::with_capacity(record.len());
        let mut params = Vec::with_capacity(record.len());
        let mut idx = 1usize;
        for (column, value) in record.iter() {
            if !self.schema.has_column(column) {
                return Err(Error::Schema { key: column.to_string() });
            }
            let placeholder = self.dialect.placeholder(idx);
            idx += 1;
            assignments.push(format!("{column} = {placeholder}"));
            params.push(value.clone());
        }
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.schema.name(),
            assignments.join(", ")
        );
        self.append_where(&mut sql, &mut params, &mut idx, where_predicate);
        Ok((sql, params))
    }

    /// Physical DELETE (the business layer's soft delete goes through
    /// [`QueryBuilder::update`] instead).
    pub fn delete(&self, where_predicate: &Predicate) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", self.schema.name());
        let mut params = Vec::new();
        let mut idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut idx, where_predicate);
        (sql, params)
    }

    fn append_where(
        &self,
        sql: &mut String,
        params: &mut Vec<Value>,
        idx: &mut usize,
        predicate: &Predicate,
    ) {
        if predicate.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        let mut first = true;
        for cond in predicate.conditions() {
            if !first {
                sql.push_str(" AND ");
            }
            first = false;
            match cond {
                Condition::Eq(col, val) => self.append_binary(sql, params, idx, col, "=", val),
                Condition::Gt(col, val) => self.append_binary(sql, params, idx, col, ">", val),
                Condition::Gte(col, val) => self.append_binary(sql, params, idx, col, ">=", val),
                Condition::Lt(col, val) => self.append_binary(sql, params, idx, col, "<", val),
                Condition::Lte(col, val) => self.append_binary(sql, params, idx, col, "<=", val),
                Condition::Like(col, pattern) => {
                    let placeholder = self.dialect.placeholder(*idx);
                    *idx += 1;
                    sql.push_str(&format!("{col} LIKE {placeholder}"));
                    params.push(Value::Text(pattern.clone()));
                }
                Condition::In(col, vals) => {
                    let placeholders: Vec<_> = vals
                        .iter()
                        .map(|_| {
                            let placeholder = self.dialect.placeholder(*idx);
                            *idx += 1;
                            placeholder
                        })
                        .collect();
                    sql.push_str(&format!("{col} IN ({})", placeholders.join(", ")));
                    params.extend(vals.iter().cloned());
                }
                Condition::IsNull(col) => {
                    sql.push_str(&format!("{col} IS NULL"));
                }
            }
        }
    }

    fn append_binary(
        &self,
        sql: &mut String,
        params: &mut Vec<Value>,
        idx: &mut usize,
        col: &str,
        op: &str,
        val: &Value,
    ) {
        let placeholder = self.dialect.placeholder(*idx);
        *idx += 1;
        sql.push_str(&format!("{col} {op} {placeholder}"));
        params.push(val.clone());
    }
}
