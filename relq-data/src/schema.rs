use crate::error::Error;
use std::collections::HashMap;

/// Declared type of a column; drives row decoding and transcoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Text,
    Timestamp,
    Bytes,
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Immutable binding to one table: name, ordered typed columns, and a lookup
/// index built once at construction.
///
/// # Example
///
/// ```
/// use relq_data::{ColumnType, TableSchema};
///
/// let schema = TableSchema::builder("users")
///     .column("id", ColumnType::Int)
///     .column("name", ColumnType::Text)
///     .build()
///     .unwrap();
/// assert!(schema.has_column("name"));
/// ```
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    id_column: String,
    columns: Vec<ColumnDef>,
    index: HashMap<String, usize>,
}

impl TableSchema {
    pub fn builder(name: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder {
            name: name.into(),
            id_column: "id".to_string(),
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identity column used for default ordering and sort fallback.
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Explicit lookup: `None` means the column does not exist.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Comma-separated projection of every declared column.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub struct TableSchemaBuilder {
    name: String,
    id_column: String,
    columns: Vec<ColumnDef>,
}

impl TableSchemaBuilder {
    pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push(ColumnDef::new(name, ty));
        self
    }

    /// Override the identity column (default `id`).
    pub fn id_column(mut self, name: impl Into<String>) -> Self {
        self.id_column = name.into();
        self
    }

    /// Adds the audit columns used by the business layer:
    /// `created_at`/`updated_at`/`deleted_at` timestamps and
    /// `created_by`/`updated_by` text.
    pub fn audit_columns(self) -> Self {
        self.column(crate::transcode::CREATED_AT, ColumnType::Timestamp)
            .column(crate::transcode::UPDATED_AT, ColumnType::Timestamp)
            .column(crate::transcode::DELETED_AT, ColumnType::Timestamp)
            .column(crate::transcode::CREATED_BY, ColumnType::Text)
            .column(crate::transcode::UPDATED_BY, ColumnType::Text)
    }

    pub fn build(self) -> Result<TableSchema, Error> {
        if self.name.is_empty() {
            return Err(Error::Binding("table name must not be empty".into()));
        }
        if !is_valid_identifier(&self.name) {
            return Err(Error::Binding(format!(
                "invalid table name: {}",
                self.name
            )));
        }
        let mut index = HashMap::with_capacity(self.columns.len());
        for (i, col) in self.columns.iter().enumerate() {
            if !is_valid_identifier(&col.name) {
                return Err(Error::Binding(format!("invalid column name: {}", col.name)));
            }
            if index.insert(col.name.clone(), i).is_some() {
                return Err(Error::Binding(format!("duplicate column: {}", col.name)));
            }
        }
        if !index.contains_key(&self.id_column) {
            return Err(Error::Binding(format!(
                "identity column {} is not declared",
                self.id_column
            )));
        }
        Ok(TableSchema {
            name: self.name,
            id_column: self.id_column,
            columns: self.columns,
            index,
        })
    }
}

fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableSchemaBuilder {
        TableSchema::builder("users")
            .column("id", ColumnType::Int)
            .column("name", ColumnType::Text)
    }

    #[test]
    fn test_lookup() {
        let schema = users().build().unwrap();
        assert_eq!(schema.column("name").unwrap().ty, ColumnType::Text);
        assert!(schema.column("nope").is_none());
        assert_eq!(schema.column_list(), "id, name");
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = users().column("name", ColumnType::Text).build().unwrap_err();
        assert!(matches!(err, Error::Binding(_)));
    }

    #[test]
    fn test_missing_identity_column_rejected() {
        let err = TableSchema::builder("users")
            .column("name", ColumnType::Text)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Binding(_)));
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        let err = TableSchema::builder("users;drop")
            .column("id", ColumnType::Int)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Binding(_)));
    }
}
