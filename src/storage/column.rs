//! Column data storage
//!
//! One column's worth of row-oriented values plus a null mask. The scan
//! path (`execution::operators::gather_chunk`) reads through `get_value`
//! and `get_type`; insert/update go through `push_value`/`set_value`;
//! `create_vector` is how a table builds the per-chunk `Vector` a scan
//! emits.

use crate::common::error::{EngineError, EngineResult};
use crate::types::{LogicalType, Value, Vector};

use crate::storage::table::ColumnInfo;

/// Row-oriented storage for one column.
#[derive(Debug, Clone)]
pub struct ColumnData {
    pub info: ColumnInfo,
    values: Vec<Value>,
    null_mask: Vec<bool>,
    capacity: usize,
}

impl ColumnData {
    pub fn new(info: ColumnInfo, capacity: usize) -> EngineResult<Self> {
        Ok(Self {
            info,
            values: Vec::with_capacity(capacity),
            null_mask: Vec::with_capacity(capacity),
            capacity,
        })
    }

    pub fn get_type(&self) -> &LogicalType {
        &self.info.column_type
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_value(&self, index: usize) -> EngineResult<Value> {
        if index >= self.values.len() {
            return Err(EngineError::InvalidValue(format!(
                "Index {} out of bounds for column with {} values",
                index,
                self.values.len()
            )));
        }

        if self.null_mask[index] {
            Ok(Value::Null)
        } else {
            Ok(self.values[index].clone())
        }
    }

    pub fn set_value(&mut self, index: usize, value: &Value) -> EngineResult<()> {
        if index >= self.values.len() {
            return Err(EngineError::InvalidValue(format!(
                "Index {} out of bounds for column with {} values",
                index,
                self.values.len()
            )));
        }

        self.values[index] = value.clone();
        self.null_mask[index] = value.is_null();
        Ok(())
    }

    pub fn push_value(&mut self, value: &Value) -> EngineResult<()> {
        if self.values.len() >= self.capacity {
            return Err(EngineError::InvalidValue(
                "Column capacity exceeded".to_string(),
            ));
        }

        self.values.push(value.clone());
        self.null_mask.push(value.is_null());
        Ok(())
    }

    /// Grow the column's capacity. Never shrinks below the current length.
    pub fn resize(&mut self, new_capacity: usize) -> EngineResult<()> {
        if new_capacity < self.values.len() {
            return Err(EngineError::InvalidValue(
                "Cannot resize to smaller than current size".to_string(),
            ));
        }

        self.capacity = new_capacity;
        self.values.reserve(new_capacity - self.values.len());
        self.null_mask.reserve(new_capacity - self.null_mask.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.null_mask.clear();
    }

    pub fn estimate_size(&self) -> usize {
        let values_size = self.values.len() * std::mem::size_of::<Value>();
        let null_mask_size = self.null_mask.len() * std::mem::size_of::<bool>();
        values_size + null_mask_size + std::mem::size_of::<ColumnInfo>()
    }

    /// Materialize `[start, start + count)` into a freshly-allocated
    /// `Vector`, the unit a table scan hands a chunk one column at a time.
    pub fn create_vector(&self, start: usize, count: usize) -> EngineResult<Vector> {
        if start + count > self.values.len() {
            return Err(EngineError::InvalidValue(format!(
                "Range {}..{} out of bounds for column with {} values",
                start,
                start + count,
                self.values.len()
            )));
        }
        if count == 0 {
            return Err(EngineError::InvalidValue(
                "Cannot create vector from empty values".to_string(),
            ));
        }

        let mut vector_values = Vec::with_capacity(count);
        for i in start..start + count {
            let value = if self.null_mask[i] {
                Value::Null
            } else {
                self.values[i].clone()
            };
            vector_values.push(value);
        }

        Vector::from_values(&vector_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_basic_operations() -> EngineResult<()> {
        let info = ColumnInfo::new("test_col".to_string(), LogicalType::Integer, 0);
        let mut column = ColumnData::new(info, 5)?;

        column.push_value(&Value::Integer(42))?;
        column.push_value(&Value::Integer(84))?;
        column.push_value(&Value::Null)?;

        assert_eq!(column.len(), 3);
        assert_eq!(column.get_value(0)?, Value::Integer(42));
        assert_eq!(column.get_value(1)?, Value::Integer(84));
        assert_eq!(column.get_value(2)?, Value::Null);

        column.set_value(1, &Value::Integer(100))?;
        assert_eq!(column.get_value(1)?, Value::Integer(100));

        Ok(())
    }

    #[test]
    fn test_column_varchar() -> EngineResult<()> {
        let info = ColumnInfo::new("name".to_string(), LogicalType::Varchar, 0);
        let mut column = ColumnData::new(info, 5)?;

        column.push_value(&Value::Varchar("Alice".to_string()))?;
        column.push_value(&Value::Varchar("Bob".to_string()))?;
        column.push_value(&Value::Null)?;

        assert_eq!(column.get_value(0)?, Value::Varchar("Alice".to_string()));
        assert_eq!(column.get_value(1)?, Value::Varchar("Bob".to_string()));
        assert_eq!(column.get_value(2)?, Value::Null);

        Ok(())
    }

    #[test]
    fn test_column_vector_creation() -> EngineResult<()> {
        let info = ColumnInfo::new("test".to_string(), LogicalType::Integer, 0);
        let mut column = ColumnData::new(info, 10)?;

        for i in 0..5 {
            column.push_value(&Value::Integer(i * 10))?;
        }

        let vector = column.create_vector(0, 3)?;
        assert_eq!(vector.len(), 3);

        Ok(())
    }

    #[test]
    fn test_column_error_handling() -> EngineResult<()> {
        let info = ColumnInfo::new("test".to_string(), LogicalType::Integer, 0);
        let mut column = ColumnData::new(info, 2)?;

        column.push_value(&Value::Integer(1))?;
        column.push_value(&Value::Integer(2))?;

        assert!(column.push_value(&Value::Integer(3)).is_err());
        assert!(column.get_value(10).is_err());
        assert!(column.set_value(10, &Value::Integer(42)).is_err());

        Ok(())
    }
}
