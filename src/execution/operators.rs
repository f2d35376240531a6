//! Execution Operators
//!
//! Streaming operators that turn a `PhysicalPlan` node into a
//! `DataChunkStream`. The nested-loop join operator lives in `join.rs`;
//! this module holds the table scan and the small stream adapter the join
//! and tests share.

use crate::common::constants::STANDARD_VECTOR_SIZE;
use crate::common::error::{EngineError, EngineResult};
use crate::execution::context::{ExecutionContext, ExecutionMode};
use crate::execution::parallel::{parallel_table_scan, ParallelContext};
use crate::planner::physical_plan::{
    DataChunkStream, ExecutionOperator, PhysicalColumn, PhysicalTableScan, ScanFilter,
};
use crate::storage::table::TableData;
use crate::types::{DataChunk, Vector};
use std::sync::{Arc, RwLock};

/// Simple iterator-based data chunk stream, backed by a pre-materialized
/// list of chunks. Used for tests and as a child operator that replays a
/// fixed set of chunks.
pub struct SimpleDataChunkStream {
    chunks: Vec<DataChunk>,
    index: usize,
}

impl SimpleDataChunkStream {
    pub fn new(chunks: Vec<DataChunk>) -> Self {
        Self { chunks, index: 0 }
    }

    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            index: 0,
        }
    }
}

impl Iterator for SimpleDataChunkStream {
    type Item = EngineResult<DataChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.chunks.len() {
            let chunk = std::mem::replace(&mut self.chunks[self.index], DataChunk::new());
            self.index += 1;
            Some(Ok(chunk))
        } else {
            None
        }
    }
}

impl DataChunkStream for SimpleDataChunkStream {}

impl ExecutionOperator for SimpleDataChunkStream {
    fn execute(&self) -> EngineResult<Box<dyn DataChunkStream>> {
        Ok(Box::new(Self {
            chunks: self.chunks.clone(),
            index: 0,
        }))
    }

    fn schema(&self) -> Vec<PhysicalColumn> {
        vec![]
    }
}

/// Gathers the projected columns of `row_ids` out of `table` into one chunk.
fn gather_chunk(
    table: &TableData,
    column_ids: &[usize],
    row_ids: &[usize],
) -> EngineResult<DataChunk> {
    let mut vectors = Vec::with_capacity(column_ids.len());
    for &column_id in column_ids {
        let column = table.get_column(column_id).ok_or_else(|| {
            EngineError::Storage(format!("column {} not found during scan", column_id))
        })?;
        let column = column
            .read()
            .map_err(|_| EngineError::Internal("column lock poisoned".to_string()))?;
        let mut vector = Vector::new(column.get_type().clone(), row_ids.len());
        for &row_id in row_ids {
            let value = column.get_value(row_id)?;
            vector.push(&value)?;
        }
        vectors.push(vector);
    }
    DataChunk::from_vectors(vectors)
}

fn row_passes_filters(
    table: &TableData,
    filters: &[ScanFilter],
    row_id: usize,
) -> EngineResult<bool> {
    for filter in filters {
        let column = table.get_column(filter.column_id).ok_or_else(|| {
            EngineError::Storage(format!("column {} not found during scan", filter.column_id))
        })?;
        let column = column
            .read()
            .map_err(|_| EngineError::Internal("column lock poisoned".to_string()))?;
        let value = column.get_value(row_id)?;
        if !filter.matches(&value)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Parallel task seeding (spec §4.6): partitions the table into morsels and
/// scans each one via the engine's morsel-driven parallelism, rather than
/// the single resumable cursor `SeqScanState` uses.
fn parallel_seq_scan(
    table: &Arc<RwLock<TableData>>,
    column_ids: &[usize],
    filters: &[ScanFilter],
    parallel_ctx: &ParallelContext,
) -> EngineResult<Vec<DataChunk>> {
    let physical_count = table
        .read()
        .map_err(|_| EngineError::Internal("table lock poisoned".to_string()))?
        .row_count();

    let table = table.clone();
    let column_ids = column_ids.to_vec();
    let filters = filters.to_vec();

    let chunks = parallel_table_scan(physical_count, parallel_ctx, move |morsel| {
        let table = table
            .read()
            .map_err(|_| EngineError::Internal("table lock poisoned".to_string()))?;
        let mut row_ids = Vec::new();
        for row_id in morsel.offset..morsel.offset + morsel.count {
            if row_passes_filters(&table, &filters, row_id)? {
                row_ids.push(row_id);
            }
        }
        gather_chunk(&table, &column_ids, &row_ids)
    })?;

    Ok(chunks.into_iter().filter(|c| c.count() > 0).collect())
}

/// Resumable sequential-scan cursor (spec §4.6, `seq_scan`). Produces up to
/// `STANDARD_VECTOR_SIZE` passing rows per chunk and reports EOF once the
/// physical row range is exhausted.
struct SeqScanState {
    table: Arc<RwLock<TableData>>,
    column_ids: Vec<usize>,
    filters: Vec<ScanFilter>,
    cursor: usize,
}

impl Iterator for SeqScanState {
    type Item = EngineResult<DataChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        let table = match self.table.read() {
            Ok(t) => t,
            Err(_) => return Some(Err(EngineError::Internal("table lock poisoned".to_string()))),
        };
        let physical_count = table.row_count();
        if self.cursor >= physical_count {
            return None;
        }

        let mut row_ids = Vec::new();
        while self.cursor < physical_count && row_ids.len() < STANDARD_VECTOR_SIZE {
            let row_id = self.cursor;
            self.cursor += 1;
            match row_passes_filters(&table, &self.filters, row_id) {
                Ok(true) => row_ids.push(row_id),
                Ok(false) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        if row_ids.is_empty() {
            return None;
        }
        Some(gather_chunk(&table, &self.column_ids, &row_ids))
    }
}

impl DataChunkStream for SeqScanState {}

/// One-shot index-scan cursor: the index-pushdown rewrite already computed
/// `result_ids`, so this just fetches them once and reports EOF.
struct IndexScanState {
    table: Arc<RwLock<TableData>>,
    column_ids: Vec<usize>,
    result_ids: Vec<usize>,
    done: bool,
}

impl Iterator for IndexScanState {
    type Item = EngineResult<DataChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.result_ids.is_empty() {
            return None;
        }
        self.done = true;
        let table = match self.table.read() {
            Ok(t) => t,
            Err(_) => return Some(Err(EngineError::Internal("table lock poisoned".to_string()))),
        };
        Some(gather_chunk(&table, &self.column_ids, &self.result_ids))
    }
}

impl DataChunkStream for IndexScanState {}

/// Table scan operator. Dispatches to a sequential or index scan cursor
/// depending on whether the index-pushdown rewrite fired on `scan`.
pub struct TableScanOperator {
    scan: PhysicalTableScan,
    context: ExecutionContext,
}

impl TableScanOperator {
    pub fn new(scan: PhysicalTableScan, context: ExecutionContext) -> Self {
        Self { scan, context }
    }

    fn table_data(&self) -> EngineResult<Arc<RwLock<TableData>>> {
        let catalog = self
            .context
            .catalog
            .read()
            .map_err(|_| EngineError::Internal("catalog lock poisoned".to_string()))?;
        let schema = catalog.get_default_schema();
        let schema = schema
            .read()
            .map_err(|_| EngineError::Internal("schema lock poisoned".to_string()))?;
        let table = schema.get_table(&self.scan.table_name)?;
        let table = table
            .read()
            .map_err(|_| EngineError::Internal("table lock poisoned".to_string()))?;
        Ok(table.get_data())
    }
}

impl ExecutionOperator for TableScanOperator {
    fn execute(&self) -> EngineResult<Box<dyn DataChunkStream>> {
        let table = self.table_data()?;
        if self.scan.bind_data.is_index_scan {
            log::trace!("table scan of {}: dispatching to index scan", self.scan.table_name);
            let result_ids = self.scan.bind_data.result_ids.clone().unwrap_or_default();
            Ok(Box::new(IndexScanState {
                table,
                column_ids: self.scan.column_ids.clone(),
                result_ids,
                done: false,
            }))
        } else if self.context.mode == ExecutionMode::Parallel {
            log::trace!("table scan of {}: dispatching to parallel scan", self.scan.table_name);
            let chunks = parallel_seq_scan(
                &table,
                &self.scan.column_ids,
                &self.scan.filters,
                &self.context.parallel_context,
            )?;
            Ok(Box::new(SimpleDataChunkStream::new(chunks)))
        } else {
            log::trace!("table scan of {}: dispatching to sequential scan", self.scan.table_name);
            Ok(Box::new(SeqScanState {
                table,
                column_ids: self.scan.column_ids.clone(),
                filters: self.scan.filters.clone(),
                cursor: 0,
            }))
        }
    }

    fn schema(&self) -> Vec<PhysicalColumn> {
        self.scan.schema.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::expression::ComparisonType;
    use crate::planner::physical_plan::PhysicalTableScan;
    use crate::storage::table::{ColumnInfo, TableInfo};
    use crate::storage::transaction::TransactionManager;
    use crate::types::{LogicalType, Value};

    fn context_with_table(values: &[i32]) -> (ExecutionContext, String) {
        let catalog = Catalog::new();
        let mut info = TableInfo::new_with_schema("main".to_string(), "t".to_string());
        info.add_column(ColumnInfo::new("x".to_string(), LogicalType::Integer, 0))
            .unwrap();
        catalog.create_table(&info).unwrap();
        {
            let table = catalog.get_table("main", "t").unwrap();
            let table = table.read().unwrap();
            let data = table.get_data();
            let mut data = data.write().unwrap();
            for v in values {
                data.insert_row(&[Value::Integer(*v)]).unwrap();
            }
        }
        let catalog = Arc::new(RwLock::new(catalog));
        let txn_manager = Arc::new(TransactionManager::new());
        (ExecutionContext::new(txn_manager, catalog), "t".to_string())
    }

    #[test]
    fn seq_scan_applies_filters() {
        let (context, table_name) = context_with_table(&[5, 10, 15, 20]);
        let schema = vec![PhysicalColumn::new("x".to_string(), LogicalType::Integer)];
        let scan = PhysicalTableScan::new(table_name, schema).with_filters(vec![ScanFilter::new(
            0,
            ComparisonType::GreaterThanOrEqual,
            Value::Integer(10),
        )]);
        let op = TableScanOperator::new(scan, context);
        let mut values = Vec::new();
        for chunk in op.execute().unwrap() {
            let chunk = chunk.unwrap();
            for row in 0..chunk.count() {
                if let Value::Integer(v) = chunk.get_value(row, 0).unwrap() {
                    values.push(v);
                }
            }
        }
        assert_eq!(values, vec![10, 15, 20]);
    }

    #[test]
    fn index_scan_matches_sequential_scan_equivalent() {
        use crate::catalog::index::{IndexInfo, IndexOptions, IndexType};
        use crate::planner::index_pushdown::try_pushdown_index_scan;

        let (context, table_name) = context_with_table(&[5, 10, 15, 20, 42]);
        {
            let catalog = context.catalog.read().unwrap();
            let schema = catalog.get_default_schema();
            schema
                .write()
                .unwrap()
                .create_index(&IndexInfo {
                    index_name: "idx_x".to_string(),
                    schema_name: "main".to_string(),
                    table_name: table_name.clone(),
                    column_names: vec!["x".to_string()],
                    index_type: IndexType::BTree,
                    unique: false,
                    options: IndexOptions::default(),
                })
                .unwrap();
        }

        let schema = vec![PhysicalColumn::new("x".to_string(), LogicalType::Integer)];

        // Sequential scan with an equivalent filter, never touching the index.
        let seq_scan = PhysicalTableScan::new(table_name.clone(), schema.clone()).with_filters(
            vec![ScanFilter::new(0, ComparisonType::GreaterThanOrEqual, Value::Integer(10))],
        );
        let seq_op = TableScanOperator::new(seq_scan, context.clone());
        let mut seq_values = Vec::new();
        for chunk in seq_op.execute().unwrap() {
            let chunk = chunk.unwrap();
            for row in 0..chunk.count() {
                if let Value::Integer(v) = chunk.get_value(row, 0).unwrap() {
                    seq_values.push(v);
                }
            }
        }
        seq_values.sort();

        // Same filter, rewritten to an index scan.
        let mut idx_scan = PhysicalTableScan::new(table_name.clone(), schema).with_filters(vec![
            ScanFilter::new(0, ComparisonType::GreaterThanOrEqual, Value::Integer(10)),
        ]);
        {
            let catalog = context.catalog.read().unwrap();
            let schema_lock = catalog.get_default_schema();
            let schema_guard = schema_lock.read().unwrap();
            let table = schema_guard.get_table(&table_name).unwrap();
            let table = table.read().unwrap();
            let table_data = table.get_data();
            let table_data = table_data.read().unwrap();
            let applied = try_pushdown_index_scan(&schema_guard, &table_data, &mut idx_scan).unwrap();
            assert!(applied, "index pushdown should have fired");
        }
        assert!(idx_scan.bind_data.is_index_scan);
        assert!(idx_scan.filters.is_empty(), "filter pushdown disabled once index scan chosen");

        let idx_op = TableScanOperator::new(idx_scan, context);
        let mut idx_values = Vec::new();
        for chunk in idx_op.execute().unwrap() {
            let chunk = chunk.unwrap();
            for row in 0..chunk.count() {
                if let Value::Integer(v) = chunk.get_value(row, 0).unwrap() {
                    idx_values.push(v);
                }
            }
        }
        idx_values.sort();

        assert_eq!(seq_values, idx_values);
        assert_eq!(idx_values, vec![10, 15, 20, 42]);
    }

    #[test]
    fn index_scan_fetches_result_ids() {
        let (context, table_name) = context_with_table(&[5, 10, 15, 20]);
        let schema = vec![PhysicalColumn::new("x".to_string(), LogicalType::Integer)];
        let mut scan = PhysicalTableScan::new(table_name, schema);
        scan.bind_data.is_index_scan = true;
        scan.bind_data.result_ids = Some(vec![1, 3]);
        let op = TableScanOperator::new(scan, context);
        let mut values = Vec::new();
        for chunk in op.execute().unwrap() {
            let chunk = chunk.unwrap();
            for row in 0..chunk.count() {
                if let Value::Integer(v) = chunk.get_value(row, 0).unwrap() {
                    values.push(v);
                }
            }
        }
        assert_eq!(values, vec![10, 20]);
    }
}
