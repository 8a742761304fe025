use serde::{Deserialize, Serialize};

use crate::{DEFAULT_CURRENT_PAGE, DEFAULT_PAGE_SIZE};

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Operators a table column filter can apply.
///
/// The trailing `s` variants are the case sensitive versions of their counterparts.
pub enum CrudOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    In,
    Nin,
    Contains,
    Ncontains,
    Containss,
    Ncontainss,
    Between,
    Nbetween,
    Null,
    Nnull,
    Startswith,
    Nstartswith,
    Startswiths,
    Nstartswiths,
    Endswith,
    Nendswith,
    Endswiths,
    Nendswiths,
}

serde_plain::derive_display_from_serialize!(CrudOperator);
serde_plain::derive_fromstr_from_deserialize!(CrudOperator);

/// A single `field <operator> value` condition of a list query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudFilter {
    pub field: String,
    pub operator: CrudOperator,
    pub value: String,
}

impl CrudFilter {
    pub fn new(field: impl Into<String>, operator: CrudOperator, value: impl ToString) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.to_string(),
        }
    }

    /// Shortcut for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, CrudOperator::Eq, value)
    }

    /// Build a filter for a list operator (`in`, `between`, ...), joining the values with commas.
    pub fn list<I, T>(field: impl Into<String>, operator: CrudOperator, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let value = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");

        Self::new(field, operator, value)
    }
}

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Sort direction of a column.
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

serde_plain::derive_display_from_serialize!(SortOrder);
serde_plain::derive_fromstr_from_deserialize!(SortOrder);

/// Sort a list by `field` in the given direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudSort {
    pub field: String,
    pub order: SortOrder,
}

impl CrudSort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// Page selection of a list query. Pages are counted from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: DEFAULT_CURRENT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(current: u64, page_size: u64) -> Self {
        Self { current, page_size }
    }

    /// Same page selection with both values raised to at least 1.
    pub fn clamped(self) -> Self {
        Self {
            current: self.current.max(1),
            page_size: self.page_size.max(1),
        }
    }
}

/// Everything a list screen asks the data provider for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// The resource path segment, e.g. `events` or `notifications/templates`.
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub filters: Vec<CrudFilter>,
    #[serde(default)]
    pub sorters: Vec<CrudSort>,
}

impl QueryDescriptor {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Default::default()
        }
    }

    pub fn page(mut self, current: u64, page_size: u64) -> Self {
        self.pagination = Some(Pagination::new(current, page_size));
        self
    }

    pub fn filter(mut self, filter: CrudFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, sorter: CrudSort) -> Self {
        self.sorters.push(sorter);
        self
    }

    /// The requested page, falling back to page 1 with 10 records and never below 1.
    pub fn effective_pagination(&self) -> Pagination {
        self.pagination.unwrap_or_default().clamped()
    }
}
