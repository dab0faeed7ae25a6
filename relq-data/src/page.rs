use crate::schema::TableSchema;
use serde::Deserialize;

/// Page size applied when a page number is given without an explicit size.
pub const DEFAULT_PAGE_SIZE: u64 = 30;

/// Pagination parameters, deserializable from query params.
///
/// - `page` without `per_page`: `LIMIT 30 OFFSET (page-1)*30`
/// - `per_page` alone: `LIMIT per_page`, no offset
/// - both: `LIMIT per_page OFFSET (page-1)*per_page`
/// - neither: no limit, no offset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pager {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl Pager {
    pub fn page(page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: None,
        }
    }

    pub fn per_page(per_page: u64) -> Self {
        Self {
            page: None,
            per_page: Some(per_page),
        }
    }

    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// `(limit, offset)` for the SQL tail. Page numbers are 1-based.
    pub fn limit_offset(&self) -> (Option<u64>, Option<u64>) {
        match (self.page, self.per_page) {
            (None, None) => (None, None),
            (None, Some(per_page)) => (Some(per_page), None),
            (Some(page), None) => (
                Some(DEFAULT_PAGE_SIZE),
                Some(page.max(1).saturating_sub(1) * DEFAULT_PAGE_SIZE),
            ),
            (Some(page), Some(per_page)) => (
                Some(per_page),
                Some(page.max(1).saturating_sub(1) * per_page),
            ),
        }
    }
}

/// Ordering parameters. The default is descending by the table's identity
/// column; `desc: false` is the only way to get ascending order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sorter {
    pub order_by: Option<String>,
    pub desc: Option<bool>,
}

impl Sorter {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            order_by: Some(column.into()),
            desc: Some(false),
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            order_by: Some(column.into()),
            desc: Some(true),
        }
    }

    /// Resolve against the schema: an absent or unrecognized column falls
    /// back to the identity column rather than failing.
    pub fn resolve(&self, schema: &TableSchema) -> (String, bool) {
        let column = self
            .order_by
            .as_deref()
            .filter(|c| schema.has_column(c))
            .unwrap_or(schema.id_column());
        (column.to_string(), self.desc.unwrap_or(true))
    }
}
