//! Index-pushdown rewrite (spec §4.7)
//!
//! Attempts to convert a sequential scan's pushed-down filters into a
//! single-range or point index scan. Filters already arrive bound to
//! `(column_id, comparator, constant)` triples (see `ScanFilter`), so this
//! rewrite only needs to match and combine them against each candidate
//! index -- no expression pattern matching is required here, that's the
//! "comparison matcher" the spec calls out as an external collaborator.

use crate::catalog::index::IndexType;
use crate::catalog::Schema;
use crate::common::constants::STANDARD_VECTOR_SIZE;
use crate::common::error::EngineResult;
use crate::expression::ComparisonType;
use crate::planner::physical_plan::PhysicalTableScan;
use crate::storage::index_data::IndexData;
use crate::storage::table::TableData;
use crate::types::Value;

/// Try to substitute an index scan for `scan`'s sequential scan. Returns
/// whether the rewrite applied; on success `scan.bind_data` is updated and
/// `scan.filters` is cleared (filter pushdown is disabled once an index
/// scan has been chosen).
pub fn try_pushdown_index_scan(
    schema: &Schema,
    table: &TableData,
    scan: &mut PhysicalTableScan,
) -> EngineResult<bool> {
    if scan.filters.is_empty() {
        return Ok(false);
    }

    for index_ref in schema.get_table_indexes(&scan.table_name) {
        let index = index_ref
            .read()
            .map_err(|_| crate::common::error::EngineError::Internal("index lock poisoned".to_string()))?;

        // Multi-column indexes are out of scope for this rewrite.
        if index.column_count() != 1 {
            log::debug!("index-pushdown: skipping {} (multi-column)", index.get_name());
            continue;
        }
        // Only ordered (B-tree) indexes support the range-scan form.
        if *index.get_index_type() != IndexType::BTree {
            log::debug!("index-pushdown: skipping {} (not a b-tree)", index.get_name());
            continue;
        }

        let column_name = &index.get_column_names()[0];
        // Rewrite the index's column reference onto this scan's projection
        // by matching column_id; skip the index if that fails.
        let column_id = match scan.schema.iter().position(|c| &c.name == column_name) {
            Some(id) => id,
            None => {
                log::debug!(
                    "index-pushdown: skipping {} (column {} not projected)",
                    index.get_name(),
                    column_name
                );
                continue;
            }
        };

        let mut equality: Option<Value> = None;
        let mut low: Option<(Value, ComparisonType)> = None;
        let mut high: Option<(Value, ComparisonType)> = None;

        for filter in &scan.filters {
            if filter.column_id != column_id {
                continue;
            }
            match filter.comparison {
                ComparisonType::Equal => {
                    equality = Some(filter.constant.clone());
                    break;
                }
                ComparisonType::GreaterThan | ComparisonType::GreaterThanOrEqual => {
                    low = Some((filter.constant.clone(), filter.comparison));
                }
                ComparisonType::LessThan | ComparisonType::LessThanOrEqual => {
                    high = Some((filter.constant.clone(), filter.comparison));
                }
                ComparisonType::NotEqual => {}
            }
        }

        if equality.is_none() && low.is_none() && high.is_none() {
            continue;
        }

        let index_data = IndexData::build(table, column_id)?;

        let matched = if let Some(value) = &equality {
            index_data.scan_single_predicate(value, ComparisonType::Equal)?
        } else if let (Some((lo, lo_cmp)), Some((hi, hi_cmp))) = (&low, &high) {
            index_data.scan_two_predicates(lo, *lo_cmp, hi, *hi_cmp)?
        } else if let Some((bound, cmp)) = low.as_ref().or(high.as_ref()) {
            index_data.scan_single_predicate(bound, *cmp)?
        } else {
            continue;
        };

        // The index scan's result set must fit in a single chunk; beyond
        // that, fall back to the sequential scan rather than truncate.
        if matched.len() > STANDARD_VECTOR_SIZE {
            continue;
        }

        let predicate_form = if equality.is_some() {
            "equality"
        } else if low.is_some() && high.is_some() {
            "range"
        } else {
            "single-bound"
        };
        log::debug!(
            "index-pushdown: rewrote scan of {} to index {} ({predicate_form})",
            scan.table_name,
            index.get_name()
        );

        scan.bind_data.is_index_scan = true;
        scan.bind_data.index_name = Some(index.get_name().to_string());
        scan.bind_data.result_ids = Some(matched);
        scan.filters.clear();
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::index::{IndexInfo, IndexOptions};
    use crate::planner::physical_plan::{PhysicalColumn, PhysicalTableScan, ScanFilter};
    use crate::storage::table::{ColumnInfo, TableInfo};
    use crate::types::LogicalType;

    fn setup() -> (Schema, TableData) {
        let mut schema = Schema::new("main".to_string());
        let mut info = TableInfo::new_with_schema("main".to_string(), "t".to_string());
        info.add_column(ColumnInfo::new("x".to_string(), LogicalType::Integer, 0))
            .unwrap();
        schema.create_table(&info).unwrap();

        let mut table = TableData::new(info, 16).unwrap();
        for v in [5, 10, 15, 20, 42] {
            table.insert_row(&[Value::Integer(v)]).unwrap();
        }

        schema
            .create_index(&IndexInfo {
                index_name: "idx_x".to_string(),
                schema_name: "main".to_string(),
                table_name: "t".to_string(),
                column_names: vec!["x".to_string()],
                index_type: IndexType::BTree,
                unique: false,
                options: IndexOptions::default(),
            })
            .unwrap();

        (schema, table)
    }

    #[test]
    fn test_equality_pushdown() {
        let (schema, table) = setup();
        let mut scan = PhysicalTableScan::new(
            "t".to_string(),
            vec![PhysicalColumn::new("x".to_string(), LogicalType::Integer)],
        )
        .with_filters(vec![ScanFilter::new(0, ComparisonType::Equal, Value::Integer(42))]);

        let applied = try_pushdown_index_scan(&schema, &table, &mut scan).unwrap();
        assert!(applied);
        assert!(scan.bind_data.is_index_scan);
        assert_eq!(scan.bind_data.result_ids, Some(vec![4]));
        assert!(scan.filters.is_empty());
    }

    #[test]
    fn test_range_pushdown() {
        let (schema, table) = setup();
        let mut scan = PhysicalTableScan::new(
            "t".to_string(),
            vec![PhysicalColumn::new("x".to_string(), LogicalType::Integer)],
        )
        .with_filters(vec![
            ScanFilter::new(0, ComparisonType::GreaterThanOrEqual, Value::Integer(10)),
            ScanFilter::new(0, ComparisonType::LessThan, Value::Integer(20)),
        ]);

        let applied = try_pushdown_index_scan(&schema, &table, &mut scan).unwrap();
        assert!(applied);
        let mut ids = scan.bind_data.result_ids.clone().unwrap();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_no_index_no_pushdown() {
        let mut schema = Schema::new("main".to_string());
        let mut info = TableInfo::new_with_schema("main".to_string(), "t".to_string());
        info.add_column(ColumnInfo::new("x".to_string(), LogicalType::Integer, 0))
            .unwrap();
        schema.create_table(&info).unwrap();
        let table = TableData::new(info, 16).unwrap();

        let mut scan = PhysicalTableScan::new(
            "t".to_string(),
            vec![PhysicalColumn::new("x".to_string(), LogicalType::Integer)],
        )
        .with_filters(vec![ScanFilter::new(0, ComparisonType::Equal, Value::Integer(1))]);

        let applied = try_pushdown_index_scan(&schema, &table, &mut scan).unwrap();
        assert!(!applied);
        assert!(!scan.bind_data.is_index_scan);
    }
}
