//! Index Catalog Entries
//!
//! Holds the metadata the index-pushdown rewrite matches against
//! (`planner::index_pushdown`): a name, the table and columns it covers,
//! and its type. The rewrite reads this through `get_*` accessors rather
//! than the raw `IndexInfo`, so a schema could swap in a richer `Index`
//! later without touching the planner.

use crate::catalog::ObjectMetadata;
use crate::common::error::EngineResult;

/// Index definition as given to `Schema::create_index`.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub index_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub column_names: Vec<String>,
    pub index_type: IndexType,
    pub unique: bool,
    pub options: IndexOptions,
}

/// Index type. Only `BTree` is ever chosen by the index-pushdown rewrite
/// (equality and range predicates need ordered keys); `Hash` is tracked so
/// the catalog can reject it during the rewrite's type check rather than
/// silently mis-answering a range predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    BTree,
    Hash,
}

/// Index tuning knobs. Currently just a B-tree fill factor; `validate`-time
/// checks on it live in `Schema::create_index`.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    pub fill_factor: Option<f32>,
}

/// A catalog index: its definition plus the object bookkeeping every
/// catalog entry (table, index, schema) carries.
#[derive(Debug)]
pub struct Index {
    pub info: IndexInfo,
    pub metadata: ObjectMetadata,
}

impl Index {
    pub fn new(info: IndexInfo) -> EngineResult<Self> {
        Ok(Self {
            info,
            metadata: ObjectMetadata::new(),
        })
    }

    pub fn get_name(&self) -> &str {
        &self.info.index_name
    }

    pub fn get_table_name(&self) -> &str {
        &self.info.table_name
    }

    pub fn get_column_names(&self) -> &[String] {
        &self.info.column_names
    }

    pub fn get_index_type(&self) -> &IndexType {
        &self.info.index_type
    }

    /// Number of columns the index covers; the pushdown rewrite only
    /// considers single-column indexes (see spec §4.7).
    pub fn column_count(&self) -> usize {
        self.info.column_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> IndexInfo {
        IndexInfo {
            index_name: "idx_x".to_string(),
            schema_name: "main".to_string(),
            table_name: "t".to_string(),
            column_names: vec!["x".to_string()],
            index_type: IndexType::BTree,
            unique: false,
            options: IndexOptions::default(),
        }
    }

    #[test]
    fn accessors_reflect_the_definition() {
        let index = Index::new(sample_info()).unwrap();
        assert_eq!(index.get_name(), "idx_x");
        assert_eq!(index.get_table_name(), "t");
        assert_eq!(index.get_column_names(), &["x".to_string()]);
        assert_eq!(*index.get_index_type(), IndexType::BTree);
        assert_eq!(index.column_count(), 1);
    }
}
