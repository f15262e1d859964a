//! Statement-level IR: `select <fields> from <index> [where ...] [sortby ...] [limit ...]`

use serde::Serialize;

use super::{FieldRef, NodeRef, QueryExpr};

/// Named index to search
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IndexRef {
    pub name: String,
}

impl IndexRef {
    pub fn new(name: impl Into<String>) -> Self {
        IndexRef { name: name.into() }
    }
}

/// Projected fields; empty means all fields (`select *`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SelectExpr {
    pub fields: Vec<FieldRef>,
}

impl SelectExpr {
    pub fn new(fields: Vec<FieldRef>) -> Self {
        SelectExpr { fields }
    }

    pub fn all() -> Self {
        SelectExpr::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limit {
    pub offset: usize,
    pub count: usize,
}

impl Limit {
    /// `count` value meaning "no upper bound"
    pub const UNBOUNDED: usize = usize::MAX;

    pub fn new(offset: usize, count: usize) -> Self {
        Limit { offset, count }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit {
            offset: 0,
            count: Limit::UNBOUNDED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortBy {
    pub order: SortOrder,
    pub field: FieldRef,
}

impl SortBy {
    pub fn new(order: SortOrder, field: FieldRef) -> Self {
        SortBy { order, field }
    }
}

/// Top-level search statement
///
/// `select` and `index` are always present; the other clauses are optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStmt {
    pub select: SelectExpr,
    pub index: IndexRef,
    pub query: Option<QueryExpr>,
    pub limit: Option<Limit>,
    pub sort_by: Option<SortBy>,
}

impl SearchStmt {
    pub fn new(select: SelectExpr, index: IndexRef) -> Self {
        SearchStmt {
            select,
            index,
            query: None,
            limit: None,
            sort_by: None,
        }
    }

    pub fn with_query(mut self, query: QueryExpr) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn as_node_ref(&self) -> NodeRef<'_> {
        NodeRef::SearchStmt(self)
    }

    pub fn dump(&self) -> String {
        self.to_string()
    }
}
