//! In-memory index storage backing the index-pushdown rewrite
//!
//! The catalog's `Index` type (see `catalog::index`) is metadata only --
//! name, columns, type, statistics -- with no actual entries. This module
//! supplies the missing piece: a sorted single-column index built from a
//! table's live data, queryable the way the storage engine contract
//! describes (`initialize_scan_single_predicate` / `..._two_predicates`).
//!
//! Out of scope: incremental maintenance under insert/update/delete. A
//! fresh `IndexData::build` is taken at scan-planning time.

use crate::common::error::{EngineError, EngineResult};
use crate::expression::ComparisonType;
use crate::storage::table::TableData;
use crate::types::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct IndexData {
    column_id: usize,
    /// (value, row_id), ordered by value.
    entries: Vec<(Value, usize)>,
}

impl IndexData {
    pub fn build(table: &TableData, column_id: usize) -> EngineResult<Self> {
        let column = table.get_column(column_id).ok_or_else(|| {
            EngineError::Storage(format!("column {} not found while building index", column_id))
        })?;
        let column = column
            .read()
            .map_err(|_| EngineError::Internal("column lock poisoned".to_string()))?;

        let mut entries = Vec::new();
        for row_id in 0..table.row_count() {
            let value = column.get_value(row_id)?;
            if value.is_null() {
                continue;
            }
            entries.push((value, row_id));
        }
        entries.sort_by(|a, b| a.0.compare(&b.0).unwrap_or(Ordering::Equal));

        Ok(Self { column_id, entries })
    }

    pub fn column_id(&self) -> usize {
        self.column_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn matches_bound(ordering: Ordering, cmp: ComparisonType) -> bool {
        cmp.evaluate(ordering)
    }

    /// `initialize_scan_single_predicate`: row ids where `value <cmp> bound`.
    pub fn scan_single_predicate(&self, bound: &Value, cmp: ComparisonType) -> EngineResult<Vec<usize>> {
        let mut out = Vec::new();
        for (value, row_id) in &self.entries {
            let ordering = value.compare(bound)?;
            if Self::matches_bound(ordering, cmp) {
                out.push(*row_id);
            }
        }
        Ok(out)
    }

    /// `initialize_scan_two_predicates`: row ids satisfying both bounds, e.g.
    /// `lo <lo_cmp> value` and `value <hi_cmp> hi`.
    pub fn scan_two_predicates(
        &self,
        lo: &Value,
        lo_cmp: ComparisonType,
        hi: &Value,
        hi_cmp: ComparisonType,
    ) -> EngineResult<Vec<usize>> {
        let mut out = Vec::new();
        for (value, row_id) in &self.entries {
            let lo_ordering = value.compare(lo)?;
            let hi_ordering = value.compare(hi)?;
            if Self::matches_bound(lo_ordering, lo_cmp) && Self::matches_bound(hi_ordering, hi_cmp) {
                out.push(*row_id);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::table::{ColumnInfo, TableInfo};
    use crate::types::LogicalType;

    fn table_with_column(values: &[Value]) -> TableData {
        let mut info = TableInfo::new_with_schema("main".to_string(), "t".to_string());
        info.add_column(ColumnInfo::new("x".to_string(), LogicalType::Integer, 0))
            .unwrap();
        let mut table = TableData::new(info, 16).unwrap();
        for v in values {
            table.insert_row(&[v.clone()]).unwrap();
        }
        table
    }

    #[test]
    fn test_equality_scan() {
        let table = table_with_column(&[
            Value::Integer(5),
            Value::Integer(42),
            Value::Integer(7),
            Value::Integer(42),
        ]);
        let index = IndexData::build(&table, 0).unwrap();
        let mut ids = index
            .scan_single_predicate(&Value::Integer(42), ComparisonType::Equal)
            .unwrap();
        ids.sort();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_range_scan() {
        let table = table_with_column(&[
            Value::Integer(5),
            Value::Integer(10),
            Value::Integer(15),
            Value::Integer(20),
        ]);
        let index = IndexData::build(&table, 0).unwrap();
        let mut ids = index
            .scan_two_predicates(
                &Value::Integer(10),
                ComparisonType::GreaterThanOrEqual,
                &Value::Integer(20),
                ComparisonType::LessThan,
            )
            .unwrap();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_nulls_excluded() {
        let table = table_with_column(&[Value::Integer(1), Value::Null, Value::Integer(2)]);
        let index = IndexData::build(&table, 0).unwrap();
        assert_eq!(index.len(), 2);
    }
}
