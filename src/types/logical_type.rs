use crate::types::physical_type::PhysicalType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical types represent the SQL-level types that users interact with
/// These are mapped to physical types for storage and computation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    /// NULL type
    Null,
    /// Boolean type (TRUE/FALSE)
    Boolean,
    /// 8-bit signed integer
    TinyInt,
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInt,
    /// 32-bit floating point
    Float,
    /// 64-bit double precision
    Double,
    /// Variable length string
    Varchar,
    /// Fixed length character string
    Char { length: usize },
    /// Decimal with precision and scale
    Decimal { precision: u8, scale: u8 },
    /// Date value (days since 1970-01-01)
    Date,
    /// Time value (microseconds since midnight)
    Time,
    /// Timestamp value (microseconds since 1970-01-01 00:00:00 UTC)
    Timestamp,
    /// Invalid/unknown type
    Invalid,
}

impl LogicalType {
    /// Get the corresponding physical type for this logical type
    pub fn get_physical_type(&self) -> PhysicalType {
        match self {
            LogicalType::Boolean => PhysicalType::Bool,
            LogicalType::TinyInt => PhysicalType::Int8,
            LogicalType::SmallInt => PhysicalType::Int16,
            LogicalType::Integer => PhysicalType::Int32,
            LogicalType::BigInt => PhysicalType::Int64,
            LogicalType::Float => PhysicalType::Float,
            LogicalType::Double => PhysicalType::Double,
            LogicalType::Varchar | LogicalType::Char { .. } => PhysicalType::Varchar,
            LogicalType::Decimal { precision, scale } => PhysicalType::Decimal {
                precision: *precision,
                scale: *scale,
            },
            LogicalType::Date => PhysicalType::Date,
            LogicalType::Time => PhysicalType::Time,
            LogicalType::Timestamp => PhysicalType::Timestamp,
            LogicalType::Null => PhysicalType::Invalid, // NULL uses Invalid as physical type
            LogicalType::Invalid => PhysicalType::Invalid,
        }
    }

    /// Get the maximum size for this type (for fixed-size types)
    pub fn get_max_size(&self) -> Option<usize> {
        match self {
            LogicalType::Boolean => Some(1),
            LogicalType::TinyInt => Some(1),
            LogicalType::SmallInt => Some(2),
            LogicalType::Integer => Some(4),
            LogicalType::BigInt => Some(8),
            LogicalType::Float => Some(4),
            LogicalType::Double => Some(8),
            LogicalType::Char { length } => Some(*length),
            LogicalType::Date => Some(4),
            LogicalType::Time => Some(8),
            LogicalType::Timestamp => Some(8),
            _ => None, // Variable size types
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Boolean => write!(f, "BOOLEAN"),
            LogicalType::TinyInt => write!(f, "TINYINT"),
            LogicalType::SmallInt => write!(f, "SMALLINT"),
            LogicalType::Integer => write!(f, "INTEGER"),
            LogicalType::BigInt => write!(f, "BIGINT"),
            LogicalType::Float => write!(f, "FLOAT"),
            LogicalType::Double => write!(f, "DOUBLE"),
            LogicalType::Varchar => write!(f, "VARCHAR"),
            LogicalType::Char { length } => write!(f, "CHAR({})", length),
            LogicalType::Decimal { precision, scale } => {
                write!(f, "DECIMAL({},{})", precision, scale)
            }
            LogicalType::Date => write!(f, "DATE"),
            LogicalType::Time => write!(f, "TIME"),
            LogicalType::Timestamp => write!(f, "TIMESTAMP"),
            LogicalType::Null => write!(f, "NULL"),
            LogicalType::Invalid => write!(f, "INVALID"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_type_mapping() {
        assert_eq!(LogicalType::Integer.get_physical_type(), PhysicalType::Int32);
        assert_eq!(LogicalType::Varchar.get_physical_type(), PhysicalType::Varchar);
        assert_eq!(
            LogicalType::Char { length: 4 }.get_physical_type(),
            PhysicalType::Varchar
        );
    }

    #[test]
    fn test_max_size() {
        assert_eq!(LogicalType::Integer.get_max_size(), Some(4));
        assert_eq!(LogicalType::Varchar.get_max_size(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(LogicalType::Integer.to_string(), "INTEGER");
        assert_eq!(LogicalType::Decimal { precision: 10, scale: 2 }.to_string(), "DECIMAL(10,2)");
    }
}
