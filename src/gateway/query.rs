use serde::Serialize;

/// One filter predicate of a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Predicate {
    /// Exact match.
    Eq { field: String, value: String },
    /// Case-insensitive pattern match; `%` is the wildcard.
    ILike { field: String, pattern: String },
    /// Greater than or equal (dates and numbers).
    Gte { field: String, value: String },
    /// Less than or equal (dates and numbers).
    Lte { field: String, value: String },
    /// Matches any of `values`; an empty list matches nothing.
    In { field: String, values: Vec<String> },
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::Eq { field, .. }
            | Predicate::ILike { field, .. }
            | Predicate::Gte { field, .. }
            | Predicate::Lte { field, .. }
            | Predicate::In { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

/// Zero-based row window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// A referenced row embedded under `alias`, resolved through `foreign_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub alias: String,
    pub collection: String,
    pub foreign_key: String,
    pub columns: Vec<String>,
}

/// Everything a gateway needs to answer a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadQuery {
    pub collection: String,
    /// Selected columns; empty selects all.
    pub columns: Vec<String>,
    pub embeds: Vec<Embed>,
    pub predicates: Vec<Predicate>,
    pub order: Option<Order>,
    pub window: Option<Window>,
}

impl ReadQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            columns: Vec::new(),
            embeds: Vec::new(),
            predicates: Vec::new(),
            order: None,
            window: None,
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn embed(
        mut self,
        alias: &str,
        collection: &str,
        foreign_key: &str,
        columns: &[&str],
    ) -> Self {
        self.embeds.push(Embed {
            alias: alias.to_string(),
            collection: collection.to_string(),
            foreign_key: foreign_key.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    /// Case-insensitive substring match.
    pub fn contains(mut self, field: &str, text: &str) -> Self {
        self.predicates.push(Predicate::ILike {
            field: field.to_string(),
            pattern: format!("%{}%", text),
        });
        self
    }

    pub fn gte(mut self, field: &str, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Gte {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn lte(mut self, field: &str, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Lte {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn is_in<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates.push(Predicate::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            field: field.to_string(),
            ascending,
        });
        self
    }

    pub fn range(mut self, offset: u64, limit: u64) -> Self {
        self.window = Some(Window { offset, limit });
        self
    }

    /// PostgREST `select` parameter, e.g. `id,surah,santri:santri_id(id,nama)`.
    pub fn select_clause(&self) -> String {
        let mut parts: Vec<String> = if self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.clone()
        };
        for embed in &self.embeds {
            let cols = if embed.columns.is_empty() {
                "*".to_string()
            } else {
                embed.columns.join(",")
            };
            parts.push(format!("{}:{}({})", embed.alias, embed.foreign_key, cols));
        }
        parts.join(",")
    }
}

/// A window of rows plus the exact count of all matching rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_clause_with_embed() {
        let query = ReadQuery::new("hafalan")
            .columns(&["id", "surah"])
            .embed("santri", "santri", "santri_id", &["id", "nama"]);
        assert_eq!(query.select_clause(), "id,surah,santri:santri_id(id,nama)");
    }

    #[test]
    fn test_select_clause_defaults_to_star() {
        assert_eq!(ReadQuery::new("guru").select_clause(), "*");
    }

    #[test]
    fn test_contains_wraps_wildcards() {
        let query = ReadQuery::new("santri").contains("nama", "ah");
        assert_eq!(
            query.predicates[0],
            Predicate::ILike {
                field: "nama".to_string(),
                pattern: "%ah%".to_string()
            }
        );
    }

    #[test]
    fn test_is_in_collects_values() {
        let query = ReadQuery::new("hafalan").is_in("santri_id", ["a1", "b2"]);
        assert_eq!(query.predicates[0].field(), "santri_id");
        assert_eq!(
            query.predicates[0],
            Predicate::In {
                field: "santri_id".to_string(),
                values: vec!["a1".to_string(), "b2".to_string()]
            }
        );
    }
}
