//! Semantic checks against an index schema
//!
//! Parsing only proves a statement is well formed. Before a planner can use
//! it, every index and field it names must exist and every predicate must
//! match the field's type.

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::ir::{FieldRef, QueryExpr, SearchStmt};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemaError {
    #[error("index `{0}` not found")]
    IndexNotFound(String),

    #[error("field `{field}` not found in index `{index}`")]
    FieldNotFound { field: String, index: String },

    #[error("field `{0}` is not a tag field")]
    NotTagField(String),

    #[error("field `{0}` is not a numeric field")]
    NotNumericField(String),

    #[error("tag cannot be an empty string")]
    EmptyTag,

    #[error("tag cannot contain the separator `{0}`")]
    TagContainsSeparator(char),
}

// ============ Schema ============

pub const DEFAULT_TAG_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Tag {
        #[serde(default = "default_separator")]
        separator: char,
    },
    Numeric,
}

fn default_separator() -> char {
    DEFAULT_TAG_SEPARATOR
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldInfo {
    pub fn tag(name: impl Into<String>) -> Self {
        FieldInfo {
            name: name.into(),
            kind: FieldKind::Tag {
                separator: DEFAULT_TAG_SEPARATOR,
            },
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        FieldInfo {
            name: name.into(),
            kind: FieldKind::Numeric,
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        if let FieldKind::Tag { separator: sep } = &mut self.kind {
            *sep = separator;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    /// Fields in declaration order
    pub fields: IndexMap<String, FieldInfo>,
}

impl IndexInfo {
    pub fn new(name: impl Into<String>) -> Self {
        IndexInfo {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.add(field);
        self
    }

    pub fn add(&mut self, field: FieldInfo) {
        self.fields.insert(field.name.clone(), field);
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.get(name)
    }
}

/// All indexes known to the checker
///
/// Deserializes from
/// `{"indexes": [{"name": "books", "fields": [{"name": "year", "type": "numeric"}]}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "SchemaDef")]
pub struct Schema {
    indexes: IndexMap<String, IndexInfo>,
}

#[derive(Deserialize)]
struct SchemaDef {
    #[serde(default)]
    indexes: Vec<IndexDef>,
}

#[derive(Deserialize)]
struct IndexDef {
    name: String,
    #[serde(default)]
    fields: Vec<FieldInfo>,
}

impl From<SchemaDef> for Schema {
    fn from(def: SchemaDef) -> Self {
        let mut schema = Schema::new();
        for index in def.indexes {
            let mut info = IndexInfo::new(index.name);
            for field in index.fields {
                info.add(field);
            }
            schema.add(info);
        }
        schema
    }
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    pub fn with_index(mut self, index: IndexInfo) -> Self {
        self.add(index);
        self
    }

    pub fn add(&mut self, index: IndexInfo) {
        self.indexes.insert(index.name.clone(), index);
    }

    pub fn index(&self, name: &str) -> Option<&IndexInfo> {
        self.indexes.get(name)
    }

    pub fn indexes(&self) -> impl Iterator<Item = &IndexInfo> {
        self.indexes.values()
    }
}

// ============ Checker ============

/// What a checked statement refers to
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'s> {
    pub index: &'s IndexInfo,
    /// Referenced fields, in first-use order
    pub fields: IndexMap<String, &'s FieldInfo>,
}

pub struct SemaChecker<'s> {
    schema: &'s Schema,
}

impl<'s> SemaChecker<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        SemaChecker { schema }
    }

    pub fn check(&self, stmt: &SearchStmt) -> Result<Resolution<'s>, SemaError> {
        let index = self
            .schema
            .index(&stmt.index.name)
            .ok_or_else(|| SemaError::IndexNotFound(stmt.index.name.clone()))?;
        let mut scope = Scope {
            index,
            fields: IndexMap::new(),
        };

        for field in &stmt.select.fields {
            scope.resolve(field)?;
        }
        if let Some(query) = &stmt.query {
            scope.check_query(query)?;
        }
        if let Some(sort_by) = &stmt.sort_by {
            scope.resolve(&sort_by.field)?;
        }

        log::trace!(
            "resolved {} field(s) in index `{}`",
            scope.fields.len(),
            index.name
        );
        Ok(Resolution {
            index,
            fields: scope.fields,
        })
    }

    /// Check a bare query expression against one index
    pub fn check_query(
        &self,
        index: &str,
        query: &QueryExpr,
    ) -> Result<Resolution<'s>, SemaError> {
        let index = self
            .schema
            .index(index)
            .ok_or_else(|| SemaError::IndexNotFound(index.to_string()))?;
        let mut scope = Scope {
            index,
            fields: IndexMap::new(),
        };
        scope.check_query(query)?;
        Ok(Resolution {
            index,
            fields: scope.fields,
        })
    }
}

struct Scope<'s> {
    index: &'s IndexInfo,
    fields: IndexMap<String, &'s FieldInfo>,
}

impl<'s> Scope<'s> {
    fn resolve(&mut self, field: &FieldRef) -> Result<&'s FieldInfo, SemaError> {
        let info = self
            .index
            .field(&field.name)
            .ok_or_else(|| SemaError::FieldNotFound {
                field: field.name.clone(),
                index: self.index.name.clone(),
            })?;
        self.fields.entry(field.name.clone()).or_insert(info);
        Ok(info)
    }

    fn check_query(&mut self, query: &QueryExpr) -> Result<(), SemaError> {
        match query {
            QueryExpr::And(e) => e.inners().iter().try_for_each(|q| self.check_query(q)),
            QueryExpr::Or(e) => e.inners().iter().try_for_each(|q| self.check_query(q)),
            QueryExpr::Not(e) => self.check_query(&e.inner),
            QueryExpr::Bool(_) => Ok(()),
            QueryExpr::TagContain(e) => {
                let info = self.resolve(&e.field)?;
                let FieldKind::Tag { separator } = info.kind else {
                    return Err(SemaError::NotTagField(e.field.name.clone()));
                };
                if e.tag.value.is_empty() {
                    return Err(SemaError::EmptyTag);
                }
                if e.tag.value.contains(separator) {
                    return Err(SemaError::TagContainsSeparator(separator));
                }
                Ok(())
            }
            QueryExpr::NumericCompare(e) => {
                let info = self.resolve(&e.field)?;
                if info.kind != FieldKind::Numeric {
                    return Err(SemaError::NotNumericField(e.field.name.clone()));
                }
                Ok(())
            }
        }
    }
}
