//! Expression Execution
//!
//! Evaluates a fixed list of expressions against an input chunk and
//! writes each result into the matching column of an output chunk.

use crate::common::EngineResult;
use crate::execution::ExecutionContext;
use crate::expression::ExpressionRef;
use crate::types::DataChunk;

/// Evaluates expressions against one input chunk, under one execution context.
///
/// Holding the input chunk and context for the lifetime of the executor
/// mirrors how the join and scan operators use it: build once per produced
/// chunk, then evaluate every condition expression against the same input.
pub struct ExpressionExecutor<'a> {
    chunk: &'a DataChunk,
    context: &'a ExecutionContext,
}

impl<'a> ExpressionExecutor<'a> {
    pub fn new(chunk: &'a DataChunk, context: &'a ExecutionContext) -> Self {
        Self { chunk, context }
    }

    /// Evaluate `expressions` and write column `i`'s result into `out.columns[i]`.
    pub fn execute(&self, out: &mut DataChunk, expressions: &[ExpressionRef]) -> EngineResult<()> {
        for (i, expr) in expressions.iter().enumerate() {
            let result = expr.evaluate(self.chunk, self.context)?;
            out.set_vector(i, result)?;
        }
        out.set_count(self.chunk.count())?;
        Ok(())
    }

    /// Evaluate a single expression, returning its result vector directly.
    pub fn evaluate(&self, expr: &ExpressionRef) -> EngineResult<crate::types::Vector> {
        expr.evaluate(self.chunk, self.context)
    }
}
