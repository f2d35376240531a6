//! Execution Context
//!
//! Bundles the resources an operator needs to run: the catalog (to look up
//! tables and indexes), a transaction manager handle (see
//! `storage::transaction`, a consumed external contract), and the
//! dispatch knobs the table scan reads to decide sequential vs. parallel
//! execution.

use crate::catalog::Catalog;
use crate::execution::parallel::ParallelContext;
use crate::storage::TransactionManager;
use std::sync::{Arc, RwLock};

/// Execution context for query execution
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Transaction manager handle, threaded through for when a future scan
    /// path needs one; no operator in this crate reads it back yet.
    pub transaction_manager: Arc<TransactionManager>,
    /// Catalog reference for accessing tables
    pub catalog: Arc<RwLock<Catalog>>,
    /// Execution mode; `TableScanOperator` reads this to pick its strategy.
    pub mode: ExecutionMode,
    /// Parallel execution context (worker count, partitioning knobs).
    pub parallel_context: ParallelContext,
}

/// Execution mode
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionMode {
    Standard,
    Pipeline,
    Parallel,
}

impl ExecutionContext {
    /// Create a new execution context
    pub fn new(
        transaction_manager: Arc<TransactionManager>,
        catalog: Arc<RwLock<Catalog>>,
    ) -> Self {
        Self {
            transaction_manager,
            catalog,
            mode: ExecutionMode::Parallel, // Enable parallel mode by default
            parallel_context: ParallelContext::from_system(),
        }
    }

    /// Set execution mode
    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::TransactionManager;

    fn new_context() -> ExecutionContext {
        let transaction_manager = Arc::new(TransactionManager::new());
        let catalog = Arc::new(RwLock::new(Catalog::new()));
        ExecutionContext::new(transaction_manager, catalog)
    }

    #[test]
    fn defaults_to_parallel_mode() {
        let context = new_context();
        assert_eq!(context.mode, ExecutionMode::Parallel);
    }

    #[test]
    fn set_mode_overrides_default() {
        let mut context = new_context();
        context.set_mode(ExecutionMode::Standard);
        assert_eq!(context.mode, ExecutionMode::Standard);
    }

    #[test]
    fn clone_shares_the_same_catalog() {
        let context = new_context();
        let cloned = context.clone();
        assert!(Arc::ptr_eq(&context.catalog, &cloned.catalog));
    }
}
