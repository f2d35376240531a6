use crate::common::error::{EngineError, EngineResult};
use crate::types::logical_type::LogicalType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Represents a single value in the engine with type information
/// Values are the fundamental unit of data in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value (type is stored separately)
    Null,
    /// Boolean value
    Boolean(bool),
    /// 8-bit signed integer
    TinyInt(i8),
    /// 16-bit signed integer
    SmallInt(i16),
    /// 32-bit signed integer
    Integer(i32),
    /// 64-bit signed integer
    BigInt(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit double precision
    Double(f64),
    /// String value
    Varchar(String),
    /// Fixed length character string
    Char(String),
    /// Decimal value (stored as integer with scale)
    Decimal {
        value: i128,
        scale: u8,
        precision: u8,
    },
    /// Date value (days since 1970-01-01)
    Date(i32),
    /// Time value (microseconds since midnight)
    Time(i64),
    /// Timestamp value (microseconds since 1970-01-01 00:00:00 UTC)
    Timestamp(i64),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the logical type of this value
    pub fn get_type(&self) -> LogicalType {
        match self {
            Value::Null => LogicalType::Invalid, // Null needs external type info
            Value::Boolean(_) => LogicalType::Boolean,
            Value::TinyInt(_) => LogicalType::TinyInt,
            Value::SmallInt(_) => LogicalType::SmallInt,
            Value::Integer(_) => LogicalType::Integer,
            Value::BigInt(_) => LogicalType::BigInt,
            Value::Float(_) => LogicalType::Float,
            Value::Double(_) => LogicalType::Double,
            Value::Varchar(_) => LogicalType::Varchar,
            Value::Char(_) => LogicalType::Char { length: 1 }, // Default length
            Value::Decimal {
                precision, scale, ..
            } => LogicalType::Decimal {
                precision: *precision,
                scale: *scale,
            },
            Value::Date(_) => LogicalType::Date,
            Value::Time(_) => LogicalType::Time,
            Value::Timestamp(_) => LogicalType::Timestamp,
        }
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create an integer value
    pub fn integer(value: i32) -> Self {
        Value::Integer(value)
    }

    /// Create a string value
    pub fn varchar(value: String) -> Self {
        Value::Varchar(value)
    }

    /// Compare two values for ordering
    pub fn compare(&self, other: &Value) -> EngineResult<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Ok(Ordering::Equal),
            (Value::Null, _) | (_, Value::Null) => {
                // In SQL, NULL compared to anything is NULL (unknown)
                // For our purposes, we'll treat NULL as less than any value
                match (self.is_null(), other.is_null()) {
                    (true, false) => Ok(Ordering::Less),
                    (false, true) => Ok(Ordering::Greater),
                    _ => Ok(Ordering::Equal),
                }
            }
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::TinyInt(a), Value::TinyInt(b)) => Ok(a.cmp(b)),
            (Value::SmallInt(a), Value::SmallInt(b)) => Ok(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Ok(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Double(a), Value::Double(b)) => a
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Varchar(a), Value::Varchar(b)) => Ok(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Ok(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Ok(a.cmp(b)),

            // Numeric type coercion - compare different numeric types
            // Integer vs Double
            (Value::TinyInt(a), Value::Double(b)) => (*a as f64)
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::SmallInt(a), Value::Double(b)) => (*a as f64)
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Integer(a), Value::Double(b)) => (*a as f64)
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::BigInt(a), Value::Double(b)) => (*a as f64)
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),

            // Double vs Integer (reverse)
            (Value::Double(a), Value::TinyInt(b)) => a
                .partial_cmp(&(*b as f64))
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Double(a), Value::SmallInt(b)) => a
                .partial_cmp(&(*b as f64))
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Double(a), Value::Integer(b)) => a
                .partial_cmp(&(*b as f64))
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Double(a), Value::BigInt(b)) => a
                .partial_cmp(&(*b as f64))
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),

            // Integer vs Float
            (Value::TinyInt(a), Value::Float(b)) => (*a as f32)
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::SmallInt(a), Value::Float(b)) => (*a as f32)
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Integer(a), Value::Float(b)) => (*a as f32)
                .partial_cmp(b)
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),

            // Float vs Integer (reverse)
            (Value::Float(a), Value::TinyInt(b)) => a
                .partial_cmp(&(*b as f32))
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Float(a), Value::SmallInt(b)) => a
                .partial_cmp(&(*b as f32))
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),
            (Value::Float(a), Value::Integer(b)) => a
                .partial_cmp(&(*b as f32))
                .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string())),

            // Different integer widths - cast to wider type
            (Value::TinyInt(a), Value::SmallInt(b)) => Ok((*a as i16).cmp(b)),
            (Value::TinyInt(a), Value::Integer(b)) => Ok((*a as i32).cmp(b)),
            (Value::TinyInt(a), Value::BigInt(b)) => Ok((*a as i64).cmp(b)),
            (Value::SmallInt(a), Value::TinyInt(b)) => Ok(a.cmp(&(*b as i16))),
            (Value::SmallInt(a), Value::Integer(b)) => Ok((*a as i32).cmp(b)),
            (Value::SmallInt(a), Value::BigInt(b)) => Ok((*a as i64).cmp(b)),
            (Value::Integer(a), Value::TinyInt(b)) => Ok(a.cmp(&(*b as i32))),
            (Value::Integer(a), Value::SmallInt(b)) => Ok(a.cmp(&(*b as i32))),
            (Value::Integer(a), Value::BigInt(b)) => Ok((*a as i64).cmp(b)),
            (Value::BigInt(a), Value::TinyInt(b)) => Ok(a.cmp(&(*b as i64))),
            (Value::BigInt(a), Value::SmallInt(b)) => Ok(a.cmp(&(*b as i64))),
            (Value::BigInt(a), Value::Integer(b)) => Ok(a.cmp(&(*b as i64))),

            // DECIMAL vs DECIMAL - normalize to same scale
            (Value::Decimal { value: a, scale: scale_a, .. }, Value::Decimal { value: b, scale: scale_b, .. }) => {
                if scale_a == scale_b {
                    Ok(a.cmp(b))
                } else if scale_a < scale_b {
                    let multiplier = 10_i128.pow((scale_b - scale_a) as u32);
                    Ok((a * multiplier).cmp(b))
                } else {
                    let multiplier = 10_i128.pow((scale_a - scale_b) as u32);
                    Ok(a.cmp(&(b * multiplier)))
                }
            }

            // DECIMAL vs INTEGER types - convert integer to DECIMAL scale
            (Value::Decimal { value: a, scale, .. }, Value::TinyInt(b)) => {
                let b_scaled = (*b as i128) * 10_i128.pow(*scale as u32);
                Ok(a.cmp(&b_scaled))
            }
            (Value::Decimal { value: a, scale, .. }, Value::SmallInt(b)) => {
                let b_scaled = (*b as i128) * 10_i128.pow(*scale as u32);
                Ok(a.cmp(&b_scaled))
            }
            (Value::Decimal { value: a, scale, .. }, Value::Integer(b)) => {
                let b_scaled = (*b as i128) * 10_i128.pow(*scale as u32);
                Ok(a.cmp(&b_scaled))
            }
            (Value::Decimal { value: a, scale, .. }, Value::BigInt(b)) => {
                let b_scaled = (*b as i128) * 10_i128.pow(*scale as u32);
                Ok(a.cmp(&b_scaled))
            }

            // INTEGER types vs DECIMAL (reverse)
            (Value::TinyInt(a), Value::Decimal { value: b, scale, .. }) => {
                let a_scaled = (*a as i128) * 10_i128.pow(*scale as u32);
                Ok(a_scaled.cmp(b))
            }
            (Value::SmallInt(a), Value::Decimal { value: b, scale, .. }) => {
                let a_scaled = (*a as i128) * 10_i128.pow(*scale as u32);
                Ok(a_scaled.cmp(b))
            }
            (Value::Integer(a), Value::Decimal { value: b, scale, .. }) => {
                let a_scaled = (*a as i128) * 10_i128.pow(*scale as u32);
                Ok(a_scaled.cmp(b))
            }
            (Value::BigInt(a), Value::Decimal { value: b, scale, .. }) => {
                let a_scaled = (*a as i128) * 10_i128.pow(*scale as u32);
                Ok(a_scaled.cmp(b))
            }

            // DECIMAL vs DOUBLE/FLOAT - convert to f64
            (Value::Decimal { value: a, scale, .. }, Value::Double(b)) => {
                let a_as_f64 = (*a as f64) / 10_f64.powi(*scale as i32);
                a_as_f64
                    .partial_cmp(b)
                    .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string()))
            }
            (Value::Decimal { value: a, scale, .. }, Value::Float(b)) => {
                let a_as_f32 = (*a as f32) / 10_f32.powi(*scale as i32);
                a_as_f32
                    .partial_cmp(b)
                    .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string()))
            }

            // DOUBLE/FLOAT vs DECIMAL (reverse)
            (Value::Double(a), Value::Decimal { value: b, scale, .. }) => {
                let b_as_f64 = (*b as f64) / 10_f64.powi(*scale as i32);
                a
                    .partial_cmp(&b_as_f64)
                    .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string()))
            }
            (Value::Float(a), Value::Decimal { value: b, scale, .. }) => {
                let b_as_f32 = (*b as f32) / 10_f32.powi(*scale as i32);
                a
                    .partial_cmp(&b_as_f32)
                    .ok_or_else(|| EngineError::InvalidValue("Cannot compare NaN values".to_string()))
            }

            _ => Err(EngineError::InvalidType(format!(
                "Cannot compare {} and {}",
                self.get_type(),
                other.get_type()
            ))),
        }
    }

    /// Get the size of this value in bytes (approximate)
    pub fn get_size(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::TinyInt(_) => 1,
            Value::SmallInt(_) => 2,
            Value::Integer(_) => 4,
            Value::BigInt(_) => 8,
            Value::Float(_) => 4,
            Value::Double(_) => 8,
            Value::Varchar(s) => s.len(),
            Value::Char(s) => s.len(),
            Value::Decimal { .. } => 16,
            Value::Date(_) => 4,
            Value::Time(_) => 8,
            Value::Timestamp(_) => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_creation() {
        assert_eq!(Value::boolean(true), Value::Boolean(true));
        assert_eq!(Value::integer(42), Value::Integer(42));
        assert_eq!(
            Value::varchar("hi".to_string()),
            Value::Varchar("hi".to_string())
        );
    }

    #[test]
    fn test_value_types() {
        assert_eq!(Value::integer(1).get_type(), LogicalType::Integer);
        assert_eq!(
            Value::varchar("x".to_string()).get_type(),
            LogicalType::Varchar
        );
        assert_eq!(Value::Null.get_type(), LogicalType::Invalid);
    }

    #[test]
    fn test_value_comparison() {
        let int1 = Value::integer(10);
        let int2 = Value::integer(20);
        assert_eq!(int1.compare(&int2).unwrap(), Ordering::Less);

        let str1 = Value::varchar("apple".to_string());
        let str2 = Value::varchar("banana".to_string());
        assert_eq!(str1.compare(&str2).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_decimal_comparison_across_scales() {
        let a = Value::Decimal {
            value: 150,
            scale: 1,
            precision: 4,
        }; // 15.0
        let b = Value::Integer(15);
        assert_eq!(a.compare(&b).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_null_values() {
        let null_val = Value::Null;
        assert!(null_val.is_null());
        assert_eq!(null_val.get_size(), 0);
        assert!(!Value::integer(1).is_null());
    }
}
