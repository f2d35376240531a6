//! Physical plan for the execution engine
//!
//! This crate starts from already-bound physical plans: a table scan (with
//! optional index-pushdown bind data) and a nested-loop join. There is no
//! SQL binder or optimizer here; a caller constructs a `PhysicalPlan` tree
//! directly and hands it to `ExecutionEngine`.

pub mod index_pushdown;
pub mod physical_plan;

pub use index_pushdown::*;
pub use physical_plan::*;
