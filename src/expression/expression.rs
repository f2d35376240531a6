//! Core expression types for the engine
//!
//! Expressions are evaluated against a `DataChunk` to produce a `Vector`
//! (or, for single-row access, a `Value`). Join conditions and filter
//! predicates are built from these primitives.

use crate::common::error::{EngineError, EngineResult};
use crate::execution::ExecutionContext;
use crate::types::{DataChunk, LogicalType, Value, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Expression reference type
pub type ExpressionRef = Arc<dyn Expression>;

/// Expression trait that all expressions must implement
pub trait Expression: std::fmt::Debug + Send + Sync {
    /// Get the return type of this expression
    fn return_type(&self) -> &LogicalType;

    /// Evaluate this expression on a data chunk, producing one output value per row
    fn evaluate(&self, chunk: &DataChunk, context: &ExecutionContext) -> EngineResult<Vector>;

    /// Evaluate this expression on a single row
    fn evaluate_row(
        &self,
        chunk: &DataChunk,
        row_idx: usize,
        context: &ExecutionContext,
    ) -> EngineResult<Value>;

    /// Check if this expression is deterministic
    fn is_deterministic(&self) -> bool;

    /// Check if this expression can return null
    fn is_nullable(&self) -> bool;

    /// Downcast to Any for type checking
    fn as_any(&self) -> &dyn std::any::Any;

    /// Get the children of this expression
    fn children(&self) -> Vec<ExpressionRef> {
        vec![]
    }
}

/// Expression enum that encompasses the expression types the engine needs
#[derive(Debug, Clone)]
pub enum ExpressionEnum {
    Constant(ConstantExpression),
    ColumnRef(ColumnRefExpression),
    Comparison(ComparisonExpression),
}

impl Expression for ExpressionEnum {
    fn return_type(&self) -> &LogicalType {
        match self {
            ExpressionEnum::Constant(expr) => expr.return_type(),
            ExpressionEnum::ColumnRef(expr) => expr.return_type(),
            ExpressionEnum::Comparison(expr) => expr.return_type(),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn evaluate(&self, chunk: &DataChunk, context: &ExecutionContext) -> EngineResult<Vector> {
        match self {
            ExpressionEnum::Constant(expr) => expr.evaluate(chunk, context),
            ExpressionEnum::ColumnRef(expr) => expr.evaluate(chunk, context),
            ExpressionEnum::Comparison(expr) => expr.evaluate(chunk, context),
        }
    }

    fn evaluate_row(
        &self,
        chunk: &DataChunk,
        row_idx: usize,
        context: &ExecutionContext,
    ) -> EngineResult<Value> {
        match self {
            ExpressionEnum::Constant(expr) => expr.evaluate_row(chunk, row_idx, context),
            ExpressionEnum::ColumnRef(expr) => expr.evaluate_row(chunk, row_idx, context),
            ExpressionEnum::Comparison(expr) => expr.evaluate_row(chunk, row_idx, context),
        }
    }

    fn is_deterministic(&self) -> bool {
        match self {
            ExpressionEnum::Constant(expr) => expr.is_deterministic(),
            ExpressionEnum::ColumnRef(expr) => expr.is_deterministic(),
            ExpressionEnum::Comparison(expr) => expr.is_deterministic(),
        }
    }

    fn is_nullable(&self) -> bool {
        match self {
            ExpressionEnum::Constant(expr) => expr.is_nullable(),
            ExpressionEnum::ColumnRef(expr) => expr.is_nullable(),
            ExpressionEnum::Comparison(expr) => expr.is_nullable(),
        }
    }

    fn children(&self) -> Vec<ExpressionRef> {
        match self {
            ExpressionEnum::Constant(_) => vec![],
            ExpressionEnum::ColumnRef(_) => vec![],
            ExpressionEnum::Comparison(expr) => expr.children(),
        }
    }
}

/// Different kinds of expressions (kept for catalog/index rewrite matching)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionType {
    Constant,
    ColumnRef,
    Comparison,
}

/// Base expression struct
#[derive(Debug, Clone)]
pub struct BaseExpression {
    pub expression_type: ExpressionType,
    pub return_type: LogicalType,
    pub alias: Option<String>,
}

impl BaseExpression {
    pub fn new(expression_type: ExpressionType, return_type: LogicalType) -> Self {
        Self {
            expression_type,
            return_type,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: String) -> Self {
        self.alias = Some(alias);
        self
    }
}

/// Constant value expression
#[derive(Debug, Clone)]
pub struct ConstantExpression {
    base: BaseExpression,
    value: Value,
}

impl ConstantExpression {
    pub fn new(value: Value) -> EngineResult<Self> {
        let return_type = value.get_type().clone();
        Ok(Self {
            base: BaseExpression::new(ExpressionType::Constant, return_type),
            value,
        })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Expression for ConstantExpression {
    fn return_type(&self) -> &LogicalType {
        &self.base.return_type
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn evaluate(&self, chunk: &DataChunk, _context: &ExecutionContext) -> EngineResult<Vector> {
        let mut values = Vec::with_capacity(chunk.count());
        for _ in 0..chunk.count() {
            values.push(self.value.clone());
        }
        Vector::from_values(&values)
    }

    fn evaluate_row(
        &self,
        _chunk: &DataChunk,
        _row_idx: usize,
        _context: &ExecutionContext,
    ) -> EngineResult<Value> {
        Ok(self.value.clone())
    }

    fn is_deterministic(&self) -> bool {
        true
    }

    fn is_nullable(&self) -> bool {
        self.value.is_null()
    }

    fn children(&self) -> Vec<ExpressionRef> {
        vec![]
    }
}

/// Column reference expression
#[derive(Debug, Clone)]
pub struct ColumnRefExpression {
    base: BaseExpression,
    column_index: usize,
    column_name: String,
}

impl ColumnRefExpression {
    pub fn new(column_index: usize, column_name: String, return_type: LogicalType) -> Self {
        Self {
            base: BaseExpression::new(ExpressionType::ColumnRef, return_type),
            column_index,
            column_name,
        }
    }

    pub fn column_index(&self) -> usize {
        self.column_index
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }
}

impl Expression for ColumnRefExpression {
    fn return_type(&self) -> &LogicalType {
        &self.base.return_type
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn evaluate(&self, chunk: &DataChunk, _context: &ExecutionContext) -> EngineResult<Vector> {
        if self.column_index >= chunk.column_count() {
            return Err(EngineError::InvalidValue(format!(
                "Column index {} out of bounds (columns: {})",
                self.column_index,
                chunk.column_count()
            )));
        }

        match chunk.get_vector(self.column_index) {
            Some(vector) => Ok(vector.clone()),
            None => Err(EngineError::InvalidValue(format!(
                "Column {} not found",
                self.column_index
            ))),
        }
    }

    fn evaluate_row(
        &self,
        chunk: &DataChunk,
        row_idx: usize,
        _context: &ExecutionContext,
    ) -> EngineResult<Value> {
        chunk.get_value(row_idx, self.column_index)
    }

    fn is_deterministic(&self) -> bool {
        true
    }

    fn is_nullable(&self) -> bool {
        true
    }

    fn children(&self) -> Vec<ExpressionRef> {
        vec![]
    }
}

/// Comparison type enum, restricted to the comparators a join condition can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonType {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonType {
    /// Flip the comparator when its operands are swapped (used by index-pushdown
    /// when a filter's constant appears on the left, e.g. `42 = x`).
    pub fn flip(self) -> ComparisonType {
        match self {
            ComparisonType::Equal => ComparisonType::Equal,
            ComparisonType::NotEqual => ComparisonType::NotEqual,
            ComparisonType::LessThan => ComparisonType::GreaterThan,
            ComparisonType::LessThanOrEqual => ComparisonType::GreaterThanOrEqual,
            ComparisonType::GreaterThan => ComparisonType::LessThan,
            ComparisonType::GreaterThanOrEqual => ComparisonType::LessThanOrEqual,
        }
    }

    /// Apply this comparator to an already-computed ordering. Shared by
    /// expression evaluation, scan filter pushdown, index scans, and the
    /// join kernels so the six-way match lives in exactly one place.
    pub fn evaluate(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            ComparisonType::Equal => ordering == Equal,
            ComparisonType::NotEqual => ordering != Equal,
            ComparisonType::LessThan => ordering == Less,
            ComparisonType::LessThanOrEqual => ordering != Greater,
            ComparisonType::GreaterThan => ordering == Greater,
            ComparisonType::GreaterThanOrEqual => ordering != Less,
        }
    }
}

/// Comparison expression
#[derive(Debug, Clone)]
pub struct ComparisonExpression {
    base: BaseExpression,
    left: ExpressionRef,
    right: ExpressionRef,
    comparison_type: ComparisonType,
}

impl ComparisonExpression {
    pub fn new(comparison_type: ComparisonType, left: ExpressionRef, right: ExpressionRef) -> Self {
        Self {
            base: BaseExpression::new(ExpressionType::Comparison, LogicalType::Boolean),
            comparison_type,
            left,
            right,
        }
    }

    pub fn comparison_type(&self) -> ComparisonType {
        self.comparison_type
    }

    pub fn left(&self) -> &dyn Expression {
        self.left.as_ref()
    }

    pub fn right(&self) -> &dyn Expression {
        self.right.as_ref()
    }

    pub fn left_ref(&self) -> &ExpressionRef {
        &self.left
    }

    pub fn right_ref(&self) -> &ExpressionRef {
        &self.right
    }

    /// Three-valued evaluation: NULL on either side makes the comparison
    /// unknown, represented as `None` (never `Value::Null` collapsed to a
    /// bool -- callers decide what unknown means for their join semantics).
    pub fn compare_values(&self, left: &Value, right: &Value) -> EngineResult<Option<bool>> {
        if left.is_null() || right.is_null() {
            return Ok(None);
        }

        let cmp = left.compare(right)?;
        Ok(Some(self.comparison_type.evaluate(cmp)))
    }
}

impl Expression for ComparisonExpression {
    fn return_type(&self) -> &LogicalType {
        &self.base.return_type
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn evaluate(&self, chunk: &DataChunk, context: &ExecutionContext) -> EngineResult<Vector> {
        let left_result = self.left.evaluate(chunk, context)?;
        let right_result = self.right.evaluate(chunk, context)?;

        let mut results = Vec::with_capacity(chunk.count());
        for row_idx in 0..chunk.count() {
            let left_value = left_result.get_value(row_idx)?;
            let right_value = right_result.get_value(row_idx)?;
            let result = match self.compare_values(&left_value, &right_value)? {
                Some(b) => Value::Boolean(b),
                None => Value::Null,
            };
            results.push(result);
        }

        Vector::from_values(&results)
    }

    fn evaluate_row(
        &self,
        chunk: &DataChunk,
        row_idx: usize,
        context: &ExecutionContext,
    ) -> EngineResult<Value> {
        let left_value = self.left.evaluate_row(chunk, row_idx, context)?;
        let right_value = self.right.evaluate_row(chunk, row_idx, context)?;
        match self.compare_values(&left_value, &right_value)? {
            Some(b) => Ok(Value::Boolean(b)),
            None => Ok(Value::Null),
        }
    }

    fn is_deterministic(&self) -> bool {
        self.left.is_deterministic() && self.right.is_deterministic()
    }

    fn is_nullable(&self) -> bool {
        self.left.is_nullable() || self.right.is_nullable()
    }

    fn children(&self) -> Vec<ExpressionRef> {
        vec![self.left.clone(), self.right.clone()]
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonType::Equal => write!(f, "="),
            ComparisonType::NotEqual => write!(f, "<>"),
            ComparisonType::LessThan => write!(f, "<"),
            ComparisonType::LessThanOrEqual => write!(f, "<="),
            ComparisonType::GreaterThan => write!(f, ">"),
            ComparisonType::GreaterThanOrEqual => write!(f, ">="),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::TransactionManager;
    use crate::types::Value;
    use std::sync::RwLock;

    fn ctx() -> ExecutionContext {
        let transaction_manager = Arc::new(TransactionManager::new());
        let catalog = Arc::new(RwLock::new(Catalog::new()));
        ExecutionContext::new(transaction_manager, catalog)
    }

    #[test]
    fn test_constant_expression() -> EngineResult<()> {
        let expr = ConstantExpression::new(Value::integer(42))?;
        assert_eq!(expr.return_type(), &LogicalType::Integer);
        assert!(expr.is_deterministic());
        assert!(!expr.is_nullable());
        Ok(())
    }

    #[test]
    fn test_column_ref_expression() {
        let expr = ColumnRefExpression::new(0, "id".to_string(), LogicalType::Integer);
        assert_eq!(expr.return_type(), &LogicalType::Integer);
        assert_eq!(expr.column_index(), 0);
        assert_eq!(expr.column_name(), "id");
        assert!(expr.is_deterministic());
    }

    #[test]
    fn test_comparison_expression() -> EngineResult<()> {
        let left = Arc::new(ConstantExpression::new(Value::integer(10))?) as ExpressionRef;
        let right = Arc::new(ConstantExpression::new(Value::integer(20))?) as ExpressionRef;
        let expr = ComparisonExpression::new(ComparisonType::LessThan, left, right);

        assert_eq!(expr.return_type(), &LogicalType::Boolean);
        assert!(expr.is_deterministic());
        assert!(!expr.is_nullable());
        assert_eq!(
            expr.evaluate_row(&DataChunk::with_rows(1), 0, &ctx())?,
            Value::Boolean(true)
        );
        Ok(())
    }

    #[test]
    fn test_comparison_with_null_is_unknown() -> EngineResult<()> {
        let left = Arc::new(ConstantExpression::new(Value::Null)?) as ExpressionRef;
        let right = Arc::new(ConstantExpression::new(Value::integer(20))?) as ExpressionRef;
        let expr = ComparisonExpression::new(ComparisonType::Equal, left, right);
        assert_eq!(
            expr.evaluate_row(&DataChunk::with_rows(1), 0, &ctx())?,
            Value::Null
        );
        Ok(())
    }

    #[test]
    fn test_comparison_flip() {
        assert_eq!(ComparisonType::LessThan.flip(), ComparisonType::GreaterThan);
        assert_eq!(ComparisonType::Equal.flip(), ComparisonType::Equal);
    }
}
