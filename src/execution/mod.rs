//! Execution Engine
//!
//! Turns a `PhysicalPlan` (a table scan or a nested-loop join) into a tree
//! of `ExecutionOperator`s and drives the resulting chunk stream.

pub mod context;
pub mod executor;
pub mod join;
pub mod operators;
pub mod parallel;

pub use context::*;
pub use executor::*;
pub use join::*;
pub use operators::*;
pub use parallel::*;

use crate::common::error::EngineResult;
use crate::planner::physical_plan::{DataChunkStream, ExecutionOperator, PhysicalPlan};
use crate::types::DataChunk;

/// Execution engine that runs physical plans
pub struct ExecutionEngine {
    context: ExecutionContext,
}

impl ExecutionEngine {
    /// Create a new execution engine
    pub fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    /// Execute a physical plan and return a stream of results
    pub fn execute(&mut self, plan: PhysicalPlan) -> EngineResult<Box<dyn DataChunkStream>> {
        let operator = self.create_operator(plan)?;
        operator.execute()
    }

    /// Execute a physical plan and collect all results
    pub fn execute_collect(&mut self, plan: PhysicalPlan) -> EngineResult<Vec<DataChunk>> {
        let mut stream = self.execute(plan)?;
        let mut results = Vec::new();

        while let Some(chunk_result) = stream.next() {
            let chunk = chunk_result?;
            results.push(chunk);
        }

        Ok(results)
    }

    /// Create an execution operator from a physical plan
    fn create_operator(&self, plan: PhysicalPlan) -> EngineResult<Box<dyn ExecutionOperator>> {
        match plan {
            PhysicalPlan::TableScan(scan) => {
                Ok(Box::new(TableScanOperator::new(scan, self.context.clone())))
            }
            PhysicalPlan::NestedLoopJoin(join) => {
                let left = self.create_operator(*join.left)?;
                let right = self.create_operator(*join.right)?;
                Ok(Box::new(NestedLoopJoinOperator::new(
                    left,
                    right,
                    join.conditions,
                    join.join_type,
                    join.schema,
                    self.context.clone(),
                )))
            }
            PhysicalPlan::EmptyResult(_) => Ok(Box::new(SimpleDataChunkStream::empty())),
        }
    }
}

/// Execution statistics
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    pub rows_processed: usize,
    pub execution_time_ms: u64,
    pub memory_used_bytes: usize,
    pub operators_executed: usize,
}

// Re-export ExecutionMode from context to avoid duplication
pub use context::ExecutionMode;
