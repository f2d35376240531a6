use serde::{Deserialize, Serialize};

/// Physical types represent how data is stored internally in the engine
/// These are the low-level representations used for memory layout and storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalType {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point
    Float,
    /// 64-bit double precision
    Double,
    /// Variable length string
    Varchar,
    /// Boolean value
    Bool,
    /// Decimal type with precision and scale
    Decimal { precision: u8, scale: u8 },
    /// Date value (days since epoch)
    Date,
    /// Time value (microseconds since midnight)
    Time,
    /// Timestamp value (microseconds since epoch)
    Timestamp,
    /// Invalid/unknown type
    Invalid,
}

impl PhysicalType {
    /// Get the size of this physical type in bytes (for fixed-size types)
    pub fn get_size(&self) -> Option<usize> {
        match self {
            PhysicalType::Int8 => Some(1),
            PhysicalType::Int16 => Some(2),
            PhysicalType::Int32 => Some(4),
            PhysicalType::Int64 => Some(8),
            PhysicalType::Float => Some(4),
            PhysicalType::Double => Some(8),
            PhysicalType::Bool => Some(1),
            PhysicalType::Decimal { .. } => Some(16), // DECIMAL stored as i128
            PhysicalType::Date => Some(4),
            PhysicalType::Time => Some(8),
            PhysicalType::Timestamp => Some(8),
            _ => None, // Variable size types
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_type_sizes() {
        assert_eq!(PhysicalType::Int8.get_size(), Some(1));
        assert_eq!(PhysicalType::Int32.get_size(), Some(4));
        assert_eq!(PhysicalType::Double.get_size(), Some(8));
        assert_eq!(PhysicalType::Varchar.get_size(), None);
    }

    #[test]
    fn test_decimal_size() {
        assert_eq!(
            PhysicalType::Decimal { precision: 10, scale: 2 }.get_size(),
            Some(16)
        );
    }
}
