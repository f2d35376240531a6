//! Table data management for the engine
//!
//! This module provides the table storage the scan and join operators read
//! through: schema (`TableInfo`/`ColumnInfo`), row-oriented column storage
//! (`TableData`), and the statistics the planner's cost estimates and the
//! catalog's `Schema::get_stats` read. Mutation beyond append (no update or
//! delete) and the write-side machinery those would need are out of scope
//! here -- see spec's external-collaborator boundary for storage/transaction.

use crate::common::error::{EngineError, EngineResult};
use crate::storage::column::ColumnData;
use crate::types::{LogicalType, Value};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Column-level statistics, updated incrementally on every insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStatistics {
    /// Number of non-null values
    pub non_null_count: usize,
    /// Number of null values
    pub null_count: usize,
    /// Number of distinct values (estimated)
    pub distinct_count: Option<usize>,
    /// Minimum value
    pub min_value: Option<Value>,
    /// Maximum value
    pub max_value: Option<Value>,
    /// Average value length (for variable-length types)
    pub avg_value_length: Option<f64>,
    /// Column size in bytes
    pub column_size: usize,
}

impl ColumnStatistics {
    pub fn new() -> Self {
        Self {
            non_null_count: 0,
            null_count: 0,
            distinct_count: None,
            min_value: None,
            max_value: None,
            avg_value_length: None,
            column_size: 0,
        }
    }

    pub fn update_for_value(&mut self, value: &Value) {
        if value.is_null() {
            self.null_count += 1;
        } else {
            self.non_null_count += 1;

            match (&self.min_value, &self.max_value) {
                (None, None) => {
                    self.min_value = Some(value.clone());
                    self.max_value = Some(value.clone());
                }
                (Some(min), Some(max)) => {
                    if value.compare(min).unwrap_or(std::cmp::Ordering::Equal)
                        == std::cmp::Ordering::Less
                    {
                        self.min_value = Some(value.clone());
                    }
                    if value.compare(max).unwrap_or(std::cmp::Ordering::Equal)
                        == std::cmp::Ordering::Greater
                    {
                        self.max_value = Some(value.clone());
                    }
                }
                _ => {}
            }

            if let Value::Varchar(s) = value {
                let len = s.len();
                self.avg_value_length = match self.avg_value_length {
                    None => Some(len as f64),
                    Some(avg) => Some(
                        (avg * (self.non_null_count - 1) as f64 + len as f64)
                            / self.non_null_count as f64,
                    ),
                };
            }
        }

        self.column_size += value.get_size();
    }
}

impl Default for ColumnStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Table-level statistics, rolled up from its columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatistics {
    /// Number of rows in the table
    pub row_count: usize,
    /// Number of columns in the table
    pub column_count: usize,
    /// Estimated table size in bytes
    pub estimated_size: usize,
    /// Number of data pages
    pub page_count: usize,
    /// Whether statistics are up to date
    pub stats_up_to_date: bool,
    /// Column-level statistics
    pub column_stats: Vec<ColumnStatistics>,
    /// Last updated timestamp
    pub last_updated: u64,
    /// Number of inserts since last statistics update
    pub inserts_since_update: usize,
}

impl TableStatistics {
    pub fn new(column_count: usize) -> Self {
        Self {
            row_count: 0,
            column_count,
            estimated_size: 0,
            page_count: 0,
            stats_up_to_date: true,
            column_stats: vec![ColumnStatistics::new(); column_count],
            last_updated: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
            inserts_since_update: 0,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.stats_up_to_date = false;
    }

    pub fn update_for_insert(&mut self, _row_index: usize, values: &[Value]) {
        self.row_count += 1;
        self.inserts_since_update += 1;
        self.mark_dirty();

        for (i, value) in values.iter().enumerate() {
            if i < self.column_stats.len() {
                self.column_stats[i].update_for_value(value);
            }
        }

        self.update_estimated_size();
    }

    fn update_estimated_size(&mut self) {
        self.estimated_size = self.column_stats.iter().map(|s| s.column_size).sum();

        const PAGE_SIZE: usize = 4096;
        self.page_count = (self.estimated_size + PAGE_SIZE - 1) / PAGE_SIZE;
    }
}

/// Column information for tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Column type
    pub column_type: LogicalType,
    /// Column position in the table
    pub column_index: usize,
}

impl ColumnInfo {
    pub fn new(name: String, column_type: LogicalType, column_index: usize) -> Self {
        Self {
            name,
            column_type,
            column_index,
        }
    }
}

/// Table metadata: name, schema, columns, and the statistics those columns
/// accumulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name
    pub name: String,
    /// Table name (alias for compatibility)
    pub table_name: String,
    /// Schema name
    pub schema_name: String,
    /// Table columns
    pub columns: Vec<ColumnInfo>,
    /// Table statistics
    pub statistics: TableStatistics,
}

impl TableInfo {
    pub fn new_with_schema(schema_name: String, table_name: String) -> Self {
        Self {
            name: table_name.clone(),
            table_name,
            schema_name,
            columns: Vec::new(),
            statistics: TableStatistics::new(0),
        }
    }

    pub fn add_column(&mut self, column: ColumnInfo) -> EngineResult<()> {
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(EngineError::InvalidValue(format!(
                "Column '{}' already exists in table '{}'",
                column.name, self.name
            )));
        }

        self.columns.push(column);
        self.statistics.column_count = self.columns.len();
        self.statistics.column_stats.push(ColumnStatistics::new());
        Ok(())
    }
}

/// Table data storage: row-oriented columns plus the schema and statistics
/// they belong to.
#[derive(Debug)]
pub struct TableData {
    /// Table metadata
    pub info: TableInfo,
    /// Column data storage
    pub columns: Vec<Arc<RwLock<ColumnData>>>,
    /// Number of rows stored
    pub row_count: usize,
    /// Table capacity
    pub capacity: usize,
}

impl TableData {
    /// Create a new table with the given schema
    pub fn new(mut info: TableInfo, capacity: usize) -> EngineResult<Self> {
        let mut columns = Vec::with_capacity(info.columns.len());

        if info.statistics.column_stats.len() != info.columns.len() {
            info.statistics = TableStatistics::new(info.columns.len());
        }

        for column_info in &info.columns {
            let column_data = ColumnData::new(column_info.clone(), capacity)?;
            columns.push(Arc::new(RwLock::new(column_data)));
        }

        Ok(Self {
            info,
            columns,
            row_count: 0,
            capacity,
        })
    }

    /// Number of rows stored in the table.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get column data by index
    pub fn get_column(&self, index: usize) -> Option<Arc<RwLock<ColumnData>>> {
        self.columns.get(index).cloned()
    }

    /// Insert a row into the table
    pub fn insert_row(&mut self, row: &[Value]) -> EngineResult<usize> {
        if row.len() != self.columns.len() {
            return Err(EngineError::InvalidValue(format!(
                "Row has {} values but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }

        if self.row_count >= self.capacity {
            return Err(EngineError::InvalidValue(
                "Table capacity exceeded".to_string(),
            ));
        }

        for (i, value) in row.iter().enumerate() {
            let mut column_data = self.columns[i]
                .write()
                .map_err(|_| EngineError::Internal("Column lock poisoned".to_string()))?;
            column_data.push_value(value)?;
        }

        let row_id = self.row_count;
        self.row_count += 1;

        self.info.statistics.update_for_insert(row_id, row);

        Ok(row_id)
    }

    /// Get table size in bytes
    pub fn size_bytes(&self) -> u64 {
        let mut total_size = 0u64;
        for column_data in &self.columns {
            if let Ok(column) = column_data.read() {
                total_size += column.estimate_size() as u64;
            }
        }
        total_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_info() {
        let mut table = TableInfo::new_with_schema("main".to_string(), "users".to_string());

        table
            .add_column(ColumnInfo::new("id".to_string(), LogicalType::Integer, 0))
            .unwrap();
        table
            .add_column(ColumnInfo::new("name".to_string(), LogicalType::Varchar, 1))
            .unwrap();

        assert_eq!(table.columns.len(), 2);
        assert!(table
            .add_column(ColumnInfo::new("id".to_string(), LogicalType::Integer, 2))
            .is_err());
    }

    #[test]
    fn test_table_data() -> EngineResult<()> {
        let mut table_info = TableInfo::new_with_schema("main".to_string(), "test".to_string());
        table_info
            .add_column(ColumnInfo::new("id".to_string(), LogicalType::Integer, 0))
            .unwrap();
        table_info
            .add_column(ColumnInfo::new("name".to_string(), LogicalType::Varchar, 1))
            .unwrap();

        let mut table = TableData::new(table_info, 10)?;

        let row = vec![Value::integer(1), Value::varchar("Alice".to_string())];
        let row_id = table.insert_row(&row)?;
        assert_eq!(row_id, 0);
        assert_eq!(table.row_count(), 1);

        let column = table.get_column(0).unwrap();
        let value = column.read().unwrap().get_value(0)?;
        assert_eq!(value, Value::integer(1));

        Ok(())
    }
}
