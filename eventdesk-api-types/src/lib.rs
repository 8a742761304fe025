//! Types shared between the EventDesk data provider and the screens consuming it.
//!
//! A list screen describes what it wants with a [`QueryDescriptor`], the data provider answers
//! with a [`ListResponse`] or [`RecordResponse`]. Nothing else of the backend's wire format leaks
//! past the provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod query;
pub use query::{CrudFilter, CrudOperator, CrudSort, Pagination, QueryDescriptor, SortOrder};

/// Default page requested when a descriptor carries no pagination.
pub const DEFAULT_CURRENT_PAGE: u64 = 1;

/// Default page size requested when a descriptor carries no pagination.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Normalized answer of a list call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    /// The records of the requested page.
    pub data: Vec<Value>,
    /// Total number of records known to the backend, `0` if it did not tell.
    pub total: u64,
}

impl ListResponse {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Normalized answer of a single record call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResponse {
    pub data: Value,
}

impl RecordResponse {
    /// Look up a top level field of the record.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}
