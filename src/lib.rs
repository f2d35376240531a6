//! A minimal analytical query engine core: vectorized chunks, a scalar
//! expression executor, table storage with index-pushdown, and the two
//! physical operators that drive a query -- a table scan and a
//! vectorized nested-loop join.

pub mod catalog;
pub mod common;
pub mod execution;
pub mod expression;
pub mod planner;
pub mod storage;
pub mod types;

// Re-export catalog system for convenience
pub use catalog::Catalog;

// Re-export common types for convenience
pub use common::{EngineError, EngineResult};

// Re-export type system for convenience
pub use types::{DataChunk, LogicalType, PhysicalType, SelectionVector, ValidityMask, Value, Vector};

// Re-export expression system for convenience
pub use expression::{
    ColumnRefExpression, ComparisonExpression, ComparisonType, ConstantExpression, Expression,
    ExpressionRef, ExpressionType,
};

// Re-export storage system for convenience
pub use storage::{
    ColumnData, ColumnInfo, ColumnStatistics, IndexData, TableData, TableInfo, TableStatistics,
    TransactionManager,
};

// Re-export planner system for convenience
pub use planner::{
    try_pushdown_index_scan, BoxedDataChunkStream, DataChunkStream, ExecutionOperator,
    JoinCondition, PhysicalColumn, PhysicalEmptyResult, PhysicalJoinType, PhysicalNestedLoopJoin,
    PhysicalPlan, PhysicalTableScan, ScanBindData, ScanFilter,
};

// Re-export execution engine for convenience
pub use execution::{ExecutionContext, ExecutionEngine, NestedLoopJoinOperator, PlanExecutor, TableScanOperator};
