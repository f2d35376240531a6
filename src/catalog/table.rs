//! Table Catalog Entries
//!
//! `Table` pairs a table's catalog identity (`TableInfo`, from
//! `storage::table`) with the storage-side data it owns. `Schema` consults
//! it for column existence when validating an index definition
//! (`Schema::create_index`); the scan operators read straight through
//! `get_data()` into `storage::TableData` and never go through a `Table`
//! write path, so this holds only the read-side contract those two
//! callers need.

use crate::catalog::ObjectMetadata;
use crate::common::error::EngineResult;
use crate::storage::{TableData, TableInfo};
use std::sync::{Arc, RwLock};

/// Catalog entry for one table.
#[derive(Debug)]
pub struct Table {
    pub info: TableInfo,
    data: Arc<RwLock<TableData>>,
    pub metadata: ObjectMetadata,
}

impl Table {
    pub fn new(info: TableInfo) -> EngineResult<Self> {
        let data = TableData::new(info.clone(), 1024)?;
        Ok(Self {
            info,
            data: Arc::new(RwLock::new(data)),
            metadata: ObjectMetadata::new(),
        })
    }

    pub fn get_name(&self) -> &str {
        &self.info.table_name
    }

    /// Shared handle to the table's row data, as read by the table-scan
    /// operator's `table_data()` lookup.
    pub fn get_data(&self) -> Arc<RwLock<TableData>> {
        self.data.clone()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.info.columns.iter().any(|col| col.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.data.read().unwrap().row_count()
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.read().unwrap().size_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ColumnInfo;
    use crate::types::LogicalType;

    fn table_with_column() -> Table {
        let mut info = TableInfo::new_with_schema("main".to_string(), "t".to_string());
        info.add_column(ColumnInfo::new("x".to_string(), LogicalType::Integer, 0))
            .unwrap();
        Table::new(info).unwrap()
    }

    #[test]
    fn has_column_reflects_the_schema() {
        let table = table_with_column();
        assert!(table.has_column("x"));
        assert!(!table.has_column("y"));
        assert_eq!(table.get_name(), "t");
    }

    #[test]
    fn empty_table_has_zero_rows() {
        let table = table_with_column();
        assert_eq!(table.row_count(), 0);
    }
}
