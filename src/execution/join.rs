//! Vectorized nested-loop join: inner kernel, mark kernel, and the
//! streaming operator that drives them against a pair of child operators.

use crate::common::constants::STANDARD_VECTOR_SIZE;
use crate::common::error::EngineResult;
use crate::execution::context::ExecutionContext;
use crate::expression::executor::ExpressionExecutor;
use crate::expression::{ComparisonType, ExpressionRef};
use crate::planner::physical_plan::{
    DataChunkStream, ExecutionOperator, JoinCondition, PhysicalColumn, PhysicalJoinType,
};
use crate::types::{DataChunk, Value, Vector};

/// Resume point for the inner kernel: the left/right row to continue from
/// the next time it's called against the same pair of chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct InnerKernelCursor {
    pub left_row: usize,
    pub right_row: usize,
}

impl InnerKernelCursor {
    fn done(&self, left_size: usize) -> bool {
        self.left_row >= left_size
    }
}

/// A NULL on either side of a comparator is treated as non-match for join
/// output purposes -- three-valued "unknown" collapses to "false" here,
/// unlike the mark kernel which must keep it distinguishable.
fn conditions_match(
    left: &DataChunk,
    li: usize,
    right: &DataChunk,
    ri: usize,
    comparisons: &[ComparisonType],
) -> EngineResult<bool> {
    for (c, cmp) in comparisons.iter().enumerate() {
        if left.is_null(li, c) || right.is_null(ri, c) {
            return Ok(false);
        }
        let lv = left.get_value(li, c)?;
        let rv = right.get_value(ri, c)?;
        let ordering = lv.compare(&rv)?;
        if !cmp.evaluate(ordering) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Spec §4.3. Scans `left_cond` x `right_cond` starting from `cursor`,
/// stopping once `capacity` matches have been gathered or the left side is
/// exhausted against this right chunk. Output is ordered (left, right)
/// lexicographically -- every match for a given left row is contiguous.
pub fn inner_kernel(
    left_cond: &DataChunk,
    right_cond: &DataChunk,
    comparisons: &[ComparisonType],
    cursor: &mut InnerKernelCursor,
    capacity: usize,
) -> EngineResult<(Vec<usize>, Vec<usize>)> {
    let mut lvec = Vec::new();
    let mut rvec = Vec::new();
    let left_size = left_cond.count();
    let right_size = right_cond.count();

    let mut li = cursor.left_row;
    let mut ri = cursor.right_row;
    while li < left_size {
        while ri < right_size {
            if lvec.len() >= capacity {
                cursor.left_row = li;
                cursor.right_row = ri;
                return Ok((lvec, rvec));
            }
            if conditions_match(left_cond, li, right_cond, ri, comparisons)? {
                lvec.push(li);
                rvec.push(ri);
            }
            ri += 1;
        }
        ri = 0;
        li += 1;
    }
    cursor.left_row = li;
    cursor.right_row = ri;
    Ok((lvec, rvec))
}

/// Spec §4.4. For each right chunk, for each right row, marks every
/// not-yet-found left row whose condition matches. Short-circuits a left
/// row as soon as it's found once.
pub fn mark_kernel(
    left_cond: &DataChunk,
    right_chunks: &[DataChunk],
    comparisons: &[ComparisonType],
) -> EngineResult<Vec<bool>> {
    let left_size = left_cond.count();
    let mut found = vec![false; left_size];

    for right_chunk in right_chunks {
        let right_size = right_chunk.count();
        for ri in 0..right_size {
            for li in 0..left_size {
                if found[li] {
                    continue;
                }
                if conditions_match(left_cond, li, right_chunk, ri, comparisons)? {
                    found[li] = true;
                }
            }
        }
    }
    Ok(found)
}

/// Mirrors `DataChunk::remove_nulls`'s row selection, but returns the kept
/// row indices instead of mutating in place -- needed so a sibling chunk
/// (the actual output columns, evaluated separately from the condition
/// chunk) can be filtered to the exact same rows and stay aligned.
fn non_null_row_indices(chunk: &DataChunk) -> Vec<usize> {
    let mut keep = Vec::with_capacity(chunk.count());
    for row in 0..chunk.count() {
        let has_null = (0..chunk.column_count()).any(|col| chunk.is_null(row, col));
        if !has_null {
            keep.push(row);
        }
    }
    keep
}

fn combine_columns(left: &DataChunk, right: &DataChunk) -> EngineResult<DataChunk> {
    let mut out = DataChunk::new();
    for i in 0..left.column_count() {
        out.set_vector(i, left.get_vector(i).unwrap().clone())?;
    }
    let offset = left.column_count();
    for i in 0..right.column_count() {
        out.set_vector(offset + i, right.get_vector(i).unwrap().clone())?;
    }
    out.set_count(left.count())?;
    Ok(out)
}

/// Physical nested-loop join operator (spec §4.5). Holds its children as
/// already-constructed operators rather than `PhysicalPlan` trees, so it
/// doesn't need to depend back on the engine's plan-to-operator dispatch.
pub struct NestedLoopJoinOperator {
    left: Box<dyn ExecutionOperator>,
    right: Box<dyn ExecutionOperator>,
    conditions: Vec<JoinCondition>,
    join_type: PhysicalJoinType,
    schema: Vec<PhysicalColumn>,
    context: ExecutionContext,
}

impl NestedLoopJoinOperator {
    pub fn new(
        left: Box<dyn ExecutionOperator>,
        right: Box<dyn ExecutionOperator>,
        conditions: Vec<JoinCondition>,
        join_type: PhysicalJoinType,
        schema: Vec<PhysicalColumn>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            left,
            right,
            conditions,
            join_type,
            schema,
            context,
        }
    }
}

impl ExecutionOperator for NestedLoopJoinOperator {
    fn execute(&self) -> EngineResult<Box<dyn DataChunkStream>> {
        let left_stream = self.left.execute()?;
        let right_stream = self.right.execute()?;
        let comparisons = self.conditions.iter().map(|c| c.comparison).collect();
        Ok(Box::new(NestedLoopJoinState {
            left_stream,
            right_stream: Some(right_stream),
            right_data: Vec::new(),
            right_chunks: Vec::new(),
            has_null: false,
            built: false,
            left_exprs: self.conditions.iter().map(|c| c.left.clone()).collect(),
            right_exprs: self.conditions.iter().map(|c| c.right.clone()).collect(),
            comparisons,
            join_type: self.join_type,
            context: self.context.clone(),
            child_chunk: None,
            left_join_condition: None,
            right_chunk_idx: 0,
            cursor: InnerKernelCursor::default(),
            eof: false,
        }))
    }

    fn schema(&self) -> Vec<PhysicalColumn> {
        self.schema.clone()
    }
}

struct NestedLoopJoinState {
    left_stream: Box<dyn DataChunkStream>,
    right_stream: Option<Box<dyn DataChunkStream>>,

    right_data: Vec<DataChunk>,
    right_chunks: Vec<DataChunk>,
    has_null: bool,
    built: bool,

    left_exprs: Vec<ExpressionRef>,
    right_exprs: Vec<ExpressionRef>,
    comparisons: Vec<ComparisonType>,
    join_type: PhysicalJoinType,
    context: ExecutionContext,

    child_chunk: Option<DataChunk>,
    left_join_condition: Option<DataChunk>,
    right_chunk_idx: usize,
    cursor: InnerKernelCursor,
    eof: bool,
}

impl NestedLoopJoinState {
    fn build(&mut self) -> EngineResult<()> {
        if self.built {
            return Ok(());
        }
        self.built = true;

        let mut right_stream = self.right_stream.take().expect("build runs once");
        loop {
            let chunk = match right_stream.next() {
                None => break,
                Some(res) => res?,
            };
            if chunk.count() == 0 {
                break;
            }
            let mut chunk = chunk;
            chunk.flatten()?;

            let mut cc = DataChunk::new();
            {
                let executor = ExpressionExecutor::new(&chunk, &self.context);
                executor.execute(&mut cc, &self.right_exprs)?;
            }

            let keep = non_null_row_indices(&cc);
            if keep.len() != cc.count() {
                self.has_null = true;
                chunk = chunk.filter(&keep)?;
                cc = cc.filter(&keep)?;
            }

            self.right_data.push(chunk);
            self.right_chunks.push(cc);
        }
        log::debug!(
            "nested-loop join build complete: {} right chunks, has_null={}",
            self.right_chunks.len(),
            self.has_null
        );
        Ok(())
    }

    fn pull_left_chunk(&mut self) -> EngineResult<bool> {
        let chunk = match self.left_stream.next() {
            None => return Ok(false),
            Some(res) => res?,
        };
        if chunk.count() == 0 {
            return Ok(false);
        }
        let mut chunk = chunk;
        chunk.flatten()?;

        let mut lcond = DataChunk::new();
        {
            let executor = ExpressionExecutor::new(&chunk, &self.context);
            executor.execute(&mut lcond, &self.left_exprs)?;
        }

        if self.join_type != PhysicalJoinType::Mark {
            let keep = non_null_row_indices(&lcond);
            if keep.len() != lcond.count() {
                chunk = chunk.filter(&keep)?;
                lcond = lcond.filter(&keep)?;
            }
        }

        self.child_chunk = Some(chunk);
        self.left_join_condition = Some(lcond);
        self.right_chunk_idx = 0;
        self.cursor = InnerKernelCursor::default();
        Ok(true)
    }

    fn produce_mark_chunk(&self) -> EngineResult<DataChunk> {
        let chunk = self.child_chunk.as_ref().unwrap();
        let lcond = self.left_join_condition.as_ref().unwrap();
        let found = mark_kernel(lcond, &self.right_chunks, &self.comparisons)?;

        let mut flags = Vec::with_capacity(found.len());
        for (li, &matched) in found.iter().enumerate() {
            let flag = if matched {
                Value::Boolean(true)
            } else {
                let left_row_has_null = (0..lcond.column_count()).any(|c| lcond.is_null(li, c));
                if !self.has_null && !left_row_has_null {
                    Value::Boolean(false)
                } else {
                    Value::Null
                }
            };
            flags.push(flag);
        }

        let mark_vector = Vector::from_values(&flags)?;
        let mut out = DataChunk::new();
        for i in 0..chunk.column_count() {
            out.set_vector(i, chunk.get_vector(i).unwrap().clone())?;
        }
        out.set_vector(chunk.column_count(), mark_vector)?;
        out.set_count(chunk.count())?;
        Ok(out)
    }

    fn try_produce(&mut self) -> EngineResult<Option<DataChunk>> {
        self.build()?;
        if self.eof {
            return Ok(None);
        }

        loop {
            if self.child_chunk.is_none() {
                if !self.pull_left_chunk()? {
                    self.eof = true;
                    return Ok(None);
                }
            }

            match self.join_type {
                PhysicalJoinType::Inner => {
                    if self.right_chunks.is_empty() || self.right_chunk_idx >= self.right_chunks.len() {
                        self.child_chunk = None;
                        continue;
                    }

                    let chunk = self.child_chunk.as_ref().unwrap();
                    let lcond = self.left_join_condition.as_ref().unwrap();
                    let rcond = &self.right_chunks[self.right_chunk_idx];

                    let (lvec, rvec) = inner_kernel(
                        lcond,
                        rcond,
                        &self.comparisons,
                        &mut self.cursor,
                        STANDARD_VECTOR_SIZE,
                    )?;

                    if !lvec.is_empty() {
                        let left_part = chunk.filter(&lvec)?;
                        let right_part = self.right_data[self.right_chunk_idx].filter(&rvec)?;
                        return Ok(Some(combine_columns(&left_part, &right_part)?));
                    }

                    if self.cursor.done(lcond.count()) {
                        self.right_chunk_idx += 1;
                        self.cursor = InnerKernelCursor::default();
                    }
                }
                PhysicalJoinType::Mark => {
                    let out = self.produce_mark_chunk()?;
                    // Jump the RHS cursor past the end: the next call pulls
                    // a fresh left chunk rather than re-probing this one.
                    self.child_chunk = None;
                    return Ok(Some(out));
                }
            }
        }
    }
}

impl Iterator for NestedLoopJoinState {
    type Item = EngineResult<DataChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.try_produce() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl DataChunkStream for NestedLoopJoinState {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::operators::SimpleDataChunkStream;
    use crate::expression::{ColumnRefExpression, ComparisonType};
    use crate::storage::transaction::TransactionManager;
    use crate::types::LogicalType;
    use std::sync::{Arc, RwLock};

    struct StaticOperator {
        chunk: DataChunk,
        schema: Vec<PhysicalColumn>,
    }

    impl ExecutionOperator for StaticOperator {
        fn execute(&self) -> EngineResult<Box<dyn DataChunkStream>> {
            Ok(Box::new(SimpleDataChunkStream::new(vec![self.chunk.clone()])))
        }
        fn schema(&self) -> Vec<PhysicalColumn> {
            self.schema.clone()
        }
    }

    fn test_context() -> ExecutionContext {
        let catalog = Arc::new(RwLock::new(crate::catalog::Catalog::new()));
        let txn_manager = Arc::new(TransactionManager::new());
        ExecutionContext::new(txn_manager, catalog)
    }

    fn int_chunk(values: &[Option<i32>]) -> DataChunk {
        let vs: Vec<Value> = values
            .iter()
            .map(|v| v.map(Value::Integer).unwrap_or(Value::Null))
            .collect();
        let vector = Vector::from_values(&vs).unwrap();
        DataChunk::from_vectors(vec![vector]).unwrap()
    }

    fn col_expr() -> ExpressionRef {
        Arc::new(ColumnRefExpression::new(0, "a".to_string(), LogicalType::Integer))
    }

    fn make_join(
        left_chunk: DataChunk,
        right_chunk: DataChunk,
        join_type: PhysicalJoinType,
        conditions: Vec<JoinCondition>,
    ) -> NestedLoopJoinOperator {
        let left = Box::new(StaticOperator {
            chunk: left_chunk,
            schema: vec![PhysicalColumn::new("a".to_string(), LogicalType::Integer)],
        });
        let right = Box::new(StaticOperator {
            chunk: right_chunk,
            schema: vec![PhysicalColumn::new("b".to_string(), LogicalType::Integer)],
        });
        let schema = vec![
            PhysicalColumn::new("a".to_string(), LogicalType::Integer),
            PhysicalColumn::new("b".to_string(), LogicalType::Integer),
        ];
        NestedLoopJoinOperator::new(left, right, conditions, join_type, schema, test_context())
    }

    fn collect_pairs(op: &NestedLoopJoinOperator) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for chunk in op.execute().unwrap() {
            let chunk = chunk.unwrap();
            for row in 0..chunk.count() {
                let a = chunk.get_value(row, 0).unwrap();
                let b = chunk.get_value(row, 1).unwrap();
                if let (Value::Integer(a), Value::Integer(b)) = (a, b) {
                    out.push((a, b));
                }
            }
        }
        out
    }

    #[test]
    fn inner_cross_join() {
        let left = int_chunk(&[Some(1), Some(2), Some(3)]);
        let right = int_chunk(&[Some(10), Some(20)]);
        let join = make_join(left, right, PhysicalJoinType::Inner, vec![]);
        let pairs = collect_pairs(&join);
        assert_eq!(
            pairs,
            vec![(1, 10), (1, 20), (2, 10), (2, 20), (3, 10), (3, 20)]
        );
    }

    #[test]
    fn inner_equi_join_drops_nulls() {
        let left = int_chunk(&[Some(1), Some(2), Some(3), None]);
        let right = int_chunk(&[Some(2), Some(3), Some(3), None]);
        let condition = JoinCondition::new(col_expr(), col_expr(), ComparisonType::Equal);
        let join = make_join(left, right, PhysicalJoinType::Inner, vec![condition]);
        let pairs = collect_pairs(&join);
        assert_eq!(pairs, vec![(2, 2), (3, 3), (3, 3)]);
    }

    fn collect_mark_flags(op: &NestedLoopJoinOperator) -> Vec<Option<bool>> {
        let mut out = Vec::new();
        for chunk in op.execute().unwrap() {
            let chunk = chunk.unwrap();
            let mark_col = chunk.column_count() - 1;
            for row in 0..chunk.count() {
                let flag = match chunk.get_value(row, mark_col).unwrap() {
                    Value::Boolean(b) => Some(b),
                    Value::Null => None,
                    other => panic!("unexpected mark value: {:?}", other),
                };
                out.push(flag);
            }
        }
        out
    }

    #[test]
    fn mark_join_basic() {
        let left = int_chunk(&[Some(1), Some(2), Some(3), None]);
        let right = int_chunk(&[Some(2), Some(3)]);
        let condition = JoinCondition::new(col_expr(), col_expr(), ComparisonType::Equal);
        let join = make_join(left, right, PhysicalJoinType::Mark, vec![condition]);
        let flags = collect_mark_flags(&join);
        assert_eq!(flags, vec![Some(false), Some(true), Some(true), None]);
    }

    #[test]
    fn mark_join_with_null_rhs() {
        let left = int_chunk(&[Some(1), Some(2)]);
        let right = int_chunk(&[Some(2), None]);
        let condition = JoinCondition::new(col_expr(), col_expr(), ComparisonType::Equal);
        let join = make_join(left, right, PhysicalJoinType::Mark, vec![condition]);
        let flags = collect_mark_flags(&join);
        assert_eq!(flags, vec![None, Some(true)]);
    }
}
