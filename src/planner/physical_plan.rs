//! Physical Plan Representation
//!
//! Defines the physical representation of the two plans this engine
//! executes: a table scan (with optional index-pushdown bind data) and a
//! vectorized nested-loop join. Both are already-bound: expressions carry
//! their own types, column references already resolved to a `column_id`.

use crate::common::error::EngineResult;
use crate::expression::{ComparisonType, ExpressionRef};
use crate::types::{DataChunk, LogicalType, Value};

/// Physical plan node types
#[derive(Debug, Clone)]
pub enum PhysicalPlan {
    /// Scan data from a table, honoring projection/filter pushdown.
    TableScan(PhysicalTableScan),
    /// Vectorized nested-loop join of two relations.
    NestedLoopJoin(PhysicalNestedLoopJoin),
    /// Empty result (e.g. a scan that has no matching index and no rows).
    EmptyResult(PhysicalEmptyResult),
}

impl PhysicalPlan {
    /// Get the schema (output columns) of this plan node
    pub fn schema(&self) -> Vec<PhysicalColumn> {
        match self {
            PhysicalPlan::TableScan(scan) => scan.schema.clone(),
            PhysicalPlan::NestedLoopJoin(join) => join.schema.clone(),
            PhysicalPlan::EmptyResult(empty) => empty.schema.clone(),
        }
    }

    /// Get all child plans of this plan node
    pub fn children(&self) -> Vec<&PhysicalPlan> {
        match self {
            PhysicalPlan::TableScan(_) => vec![],
            PhysicalPlan::NestedLoopJoin(join) => vec![&join.left, &join.right],
            PhysicalPlan::EmptyResult(_) => vec![],
        }
    }
}

/// Physical column definition
#[derive(Debug, Clone)]
pub struct PhysicalColumn {
    pub name: String,
    pub data_type: LogicalType,
}

impl PhysicalColumn {
    pub fn new(name: String, data_type: LogicalType) -> Self {
        Self { name, data_type }
    }
}

/// A scalar filter pushed down to a scan: `column <comparison> constant`.
///
/// This is the already-bound form the planner hands the scan (the spec
/// treats expression matching as an external collaborator) -- the
/// index-pushdown rewrite matches directly against this shape instead of
/// pattern-matching a general expression tree.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    pub column_id: usize,
    pub comparison: ComparisonType,
    pub constant: Value,
}

impl ScanFilter {
    pub fn new(column_id: usize, comparison: ComparisonType, constant: Value) -> Self {
        Self {
            column_id,
            comparison,
            constant,
        }
    }

    /// Evaluate this filter against one scanned value. A NULL value never
    /// satisfies a filter, matching SQL three-valued-logic on WHERE clauses.
    pub fn matches(&self, value: &Value) -> EngineResult<bool> {
        if value.is_null() {
            return Ok(false);
        }
        let ordering = value.compare(&self.constant)?;
        Ok(self.comparison.evaluate(ordering))
    }
}

/// Bind data carried by a table scan: immutable, plan-time state plus the
/// mutable outcome of the index-pushdown rewrite.
#[derive(Debug, Clone, Default)]
pub struct ScanBindData {
    /// Set once the index-pushdown rewrite (see `planner::index_pushdown`)
    /// has substituted an index scan for the sequential scan.
    pub is_index_scan: bool,
    /// Name of the index chosen by the rewrite, if any.
    pub index_name: Option<String>,
    /// Row ids produced by the index scan, capped at `STANDARD_VECTOR_SIZE`.
    /// Only meaningful when `is_index_scan` is true.
    pub result_ids: Option<Vec<usize>>,
}

/// Physical table scan operator, identified by the table-function name
/// `seq_scan` until an index scan is substituted (see `to_string`).
#[derive(Debug, Clone)]
pub struct PhysicalTableScan {
    pub table_name: String,
    pub schema: Vec<PhysicalColumn>,
    pub column_ids: Vec<usize>,
    pub filters: Vec<ScanFilter>,
    pub bind_data: ScanBindData,
}

impl PhysicalTableScan {
    pub fn new(table_name: String, schema: Vec<PhysicalColumn>) -> Self {
        let schema_len = schema.len();
        Self {
            table_name,
            schema,
            column_ids: (0..schema_len).collect(),
            filters: Vec::new(),
            bind_data: ScanBindData::default(),
        }
    }

    pub fn with_filters(mut self, filters: Vec<ScanFilter>) -> Self {
        self.filters = filters;
        self
    }

    /// String form used for plan printing: `SEQ_SCAN(<table>)` or, once the
    /// index-pushdown rewrite has fired, the chosen index's name.
    pub fn to_string(&self) -> String {
        match &self.bind_data.index_name {
            Some(name) if self.bind_data.is_index_scan => {
                format!("INDEX_SCAN({}, {})", self.table_name, name)
            }
            _ => format!("SEQ_SCAN({})", self.table_name),
        }
    }
}

/// A single join condition: `left_expr <comparator> right_expr`, each
/// expression evaluated against its own side's chunk.
#[derive(Debug, Clone)]
pub struct JoinCondition {
    pub left: ExpressionRef,
    pub right: ExpressionRef,
    pub comparison: ComparisonType,
}

impl JoinCondition {
    pub fn new(left: ExpressionRef, right: ExpressionRef, comparison: ComparisonType) -> Self {
        Self {
            left,
            right,
            comparison,
        }
    }
}

/// Join types implemented by the nested-loop join operator. Other join
/// types (LEFT, SEMI, ANTI, SINGLE) are deferred -- see the operator's
/// module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalJoinType {
    Inner,
    /// Existence join: emits every LHS row plus a trailing boolean (or
    /// NULL) "found" column instead of joined RHS columns.
    Mark,
}

/// Physical nested-loop join operator.
#[derive(Debug, Clone)]
pub struct PhysicalNestedLoopJoin {
    pub left: Box<PhysicalPlan>,
    pub right: Box<PhysicalPlan>,
    pub join_type: PhysicalJoinType,
    pub conditions: Vec<JoinCondition>,
    pub schema: Vec<PhysicalColumn>,
}

impl PhysicalNestedLoopJoin {
    pub fn new(
        left: PhysicalPlan,
        right: PhysicalPlan,
        join_type: PhysicalJoinType,
        conditions: Vec<JoinCondition>,
        schema: Vec<PhysicalColumn>,
    ) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
            join_type,
            conditions,
            schema,
        }
    }
}

/// Physical empty result operator
#[derive(Debug, Clone)]
pub struct PhysicalEmptyResult {
    pub schema: Vec<PhysicalColumn>,
}

impl PhysicalEmptyResult {
    pub fn new(schema: Vec<PhysicalColumn>) -> Self {
        Self { schema }
    }
}

/// Operator contract consumed by the execution framework (§6).
pub trait ExecutionOperator: Send + Sync {
    /// Execute the operator and return a stream of data chunks
    fn execute(&self) -> EngineResult<Box<dyn DataChunkStream>>;

    /// Get the schema of the output
    fn schema(&self) -> Vec<PhysicalColumn>;
}

/// Stream of data chunks. `out.size() == 0` (i.e. `None` from `next`, or an
/// empty chunk depending on the caller's convention) signals EOF.
pub trait DataChunkStream: Iterator<Item = EngineResult<DataChunk>> + Send {}

/// Boxed data chunk stream
pub type BoxedDataChunkStream = Box<dyn DataChunkStream>;
