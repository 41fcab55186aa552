use super::resource::Resource;
use crate::error::Result;
use crate::gateway::ReadQuery;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// Filters, sort and page: everything that decides what a read returns.
///
/// Two intents that compare equal always produce the same [`ReadQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryIntent {
    /// Normalized filter values keyed by filter name.
    pub filters: BTreeMap<String, String>,
    pub sort: SortDirection,
    /// One-based.
    pub page: u32,
}

impl QueryIntent {
    pub fn for_resource<R: Resource>() -> Self {
        Self {
            filters: BTreeMap::new(),
            sort: SortDirection::from_ascending(R::DEFAULT_ASCENDING),
            page: 1,
        }
    }

    /// Sets (or with a blank value, clears) one filter. Unknown keys and
    /// malformed values are rejected and leave the intent untouched.
    pub fn set_filter<R: Resource>(&mut self, key: &str, value: &str) -> Result<()> {
        let field = R::filter(key)?;
        match field.normalize(value)? {
            Some(value) => {
                self.filters.insert(field.key.to_string(), value);
            }
            None => {
                self.filters.remove(field.key);
            }
        }
        Ok(())
    }

    /// All matching rows, unwindowed, in the intent's order.
    pub fn to_full_query<R: Resource>(&self) -> ReadQuery {
        let mut query = R::base_query();
        // predicates follow declaration order, not key order
        for field in R::FILTERS {
            if let Some(value) = self.filters.get(field.key) {
                query = field.apply(query, value);
            }
        }
        query.order_by(R::SORT_FIELD, self.sort.is_ascending())
    }

    pub fn to_query<R: Resource>(&self, page_size: u32) -> ReadQuery {
        let offset = u64::from(self.page.saturating_sub(1)) * u64::from(page_size);
        self.to_full_query::<R>().range(offset, u64::from(page_size))
    }

    /// Human summary such as `class=pagi, search=ah`, or `all records`.
    pub fn filter_summary(&self) -> String {
        if self.filters.is_empty() {
            return "all records".to_string();
        }
        self.filters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
