//! Plan Executor
//!
//! Drives a `PhysicalPlan` to completion: the pull-based pipeline a caller
//! repeatedly pulls chunks from until EOF, plus a convenience collector.
//! There is no SQL layer here -- a caller constructs the `PhysicalPlan`
//! directly (a table scan or a nested-loop join) and hands it to
//! `PlanExecutor::execute`.

use crate::common::error::EngineResult;
use crate::execution::{ExecutionContext, ExecutionEngine, ExecutionStats};
use crate::planner::physical_plan::PhysicalPlan;
use crate::types::DataChunk;
use std::time::Instant;

/// Executes physical plans and reports timing/row-count statistics.
pub struct PlanExecutor {
    execution_engine: ExecutionEngine,
}

impl PlanExecutor {
    pub fn new(context: ExecutionContext) -> Self {
        Self {
            execution_engine: ExecutionEngine::new(context),
        }
    }

    /// Execute a plan, pulling every chunk from its root operator.
    pub fn execute(&mut self, plan: PhysicalPlan) -> EngineResult<QueryResult> {
        let start_time = Instant::now();

        let mut stream = self.execution_engine.execute(plan)?;
        let mut chunks = Vec::new();
        let mut rows_processed = 0;

        while let Some(chunk_result) = stream.next() {
            let chunk = chunk_result?;
            rows_processed += chunk.count();
            chunks.push(chunk);
        }

        let execution_time = start_time.elapsed();

        Ok(QueryResult {
            chunks,
            rows_processed,
            execution_time_ms: execution_time.as_millis() as u64,
            stats: ExecutionStats {
                rows_processed,
                execution_time_ms: execution_time.as_millis() as u64,
                memory_used_bytes: 0,
                operators_executed: 0,
            },
        })
    }

    /// Execute a plan and collect all rows into memory.
    pub fn execute_collect(&mut self, plan: PhysicalPlan) -> EngineResult<CollectedResult> {
        self.execute(plan)?.collect()
    }
}

/// Query result containing data chunks and statistics
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub chunks: Vec<DataChunk>,
    pub rows_processed: usize,
    pub execution_time_ms: u64,
    pub stats: ExecutionStats,
}

impl QueryResult {
    /// Get the total number of rows
    pub fn row_count(&self) -> usize {
        self.rows_processed
    }

    /// Get the number of chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Get the column count (assuming all chunks have the same structure)
    pub fn column_count(&self) -> usize {
        self.chunks.first().map(|c| c.column_count()).unwrap_or(0)
    }

    /// Collect all results into a single result set
    pub fn collect(self) -> EngineResult<CollectedResult> {
        let mut all_rows = Vec::new();

        for chunk in self.chunks {
            for row_idx in 0..chunk.count() {
                let mut row = Vec::new();
                for col_idx in 0..chunk.column_count() {
                    row.push(chunk.get_value(row_idx, col_idx)?);
                }
                all_rows.push(row);
            }
        }

        Ok(CollectedResult {
            rows: all_rows,
            stats: self.stats,
        })
    }

    /// Get the first row (if any)
    pub fn first_row(&self) -> Option<Vec<crate::types::Value>> {
        self.chunks.first().and_then(|chunk| {
            if chunk.count() > 0 {
                let mut row = Vec::new();
                for col_idx in 0..chunk.column_count() {
                    row.push(chunk.get_value(0, col_idx).ok()?);
                }
                Some(row)
            } else {
                None
            }
        })
    }
}

/// Collected result with all rows in memory
#[derive(Debug, Clone)]
pub struct CollectedResult {
    pub rows: Vec<Vec<crate::types::Value>>,
    pub stats: ExecutionStats,
}

impl CollectedResult {
    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|row| row.len()).unwrap_or(0)
    }

    /// Get a specific row
    pub fn get_row(&self, index: usize) -> Option<&[crate::types::Value]> {
        self.rows.get(index).map(|row| row.as_slice())
    }

    /// Get a specific value
    pub fn get_value(&self, row: usize, col: usize) -> Option<&crate::types::Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// Query execution options
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub parallel_execution: bool,
    pub memory_limit: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            parallel_execution: false,
            memory_limit: None,
            timeout_ms: None,
        }
    }
}
