//! Transaction layer
//!
//! Spec scope: "only the read-transaction handle contract is specified" --
//! the scan and join operators consume a transaction manager as an
//! external collaborator, not a WAL or lock manager this crate implements.
//! `TransactionManager` is that handle source: `ExecutionContext` holds one
//! so a caller can thread a transaction through once a full engine's scan
//! path needs snapshot isolation.

/// Issues transaction handles for a running engine. A full implementation
/// would back this with a lock manager, MVCC snapshots, and a WAL; this
/// crate's scan and join operators read table state directly and never
/// acquire one.
#[derive(Debug, Default)]
pub struct TransactionManager;

impl TransactionManager {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_manager_is_constructible_and_shareable() {
        let manager = std::sync::Arc::new(TransactionManager::new());
        let other = manager.clone();
        drop(other);
    }
}
