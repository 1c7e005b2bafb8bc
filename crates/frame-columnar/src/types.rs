#![forbid(unsafe_code)]

use crate::column::ChunkValues;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Physical element type of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    #[default]
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Boolean,
    Utf8,
}

impl DataType {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Boolean => "bool",
            DataType::Utf8 => "utf8",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell read out of a column.
///
/// Signed integers of every width surface as `Int`, unsigned as `UInt` and both float widths as
/// `Float`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Boolean(bool),
    String(Arc<str>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

/// Fixed-width element types that can back a numeric column.
pub trait NativeType: Copy + PartialOrd + Default + fmt::Debug + Send + Sync + 'static {
    const DATA_TYPE: DataType;
    /// Smallest finite value; the identity of a running maximum.
    const MIN: Self;
    /// Largest finite value; the identity of a running minimum.
    const MAX: Self;

    fn to_f64(self) -> f64;

    /// Addition in the native type. Integers wrap on overflow.
    fn add_native(self, rhs: Self) -> Self;

    /// Total order used by selection algorithms (floats order NaN last).
    fn total_cmp(&self, other: &Self) -> Ordering;

    fn into_value(self) -> Value;

    fn values_of(values: &ChunkValues) -> Option<&Arc<Vec<Self>>>;

    fn into_chunk_values(values: Arc<Vec<Self>>) -> ChunkValues;
}

macro_rules! impl_native_int {
    ($($t:ty => $variant:ident, $value:ident;)*) => {$(
        impl NativeType for $t {
            const DATA_TYPE: DataType = DataType::$variant;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn add_native(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn total_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            fn into_value(self) -> Value {
                Value::$value(self.into())
            }

            fn values_of(values: &ChunkValues) -> Option<&Arc<Vec<Self>>> {
                match values {
                    ChunkValues::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_chunk_values(values: Arc<Vec<Self>>) -> ChunkValues {
                ChunkValues::$variant(values)
            }
        }
    )*};
}

macro_rules! impl_native_float {
    ($($t:ty => $variant:ident;)*) => {$(
        impl NativeType for $t {
            const DATA_TYPE: DataType = DataType::$variant;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn add_native(self, rhs: Self) -> Self {
                self + rhs
            }

            fn total_cmp(&self, other: &Self) -> Ordering {
                <$t>::total_cmp(self, other)
            }

            fn into_value(self) -> Value {
                Value::Float(self as f64)
            }

            fn values_of(values: &ChunkValues) -> Option<&Arc<Vec<Self>>> {
                match values {
                    ChunkValues::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_chunk_values(values: Arc<Vec<Self>>) -> ChunkValues {
                ChunkValues::$variant(values)
            }
        }
    )*};
}

impl_native_int! {
    i8 => Int8, Int;
    i16 => Int16, Int;
    i32 => Int32, Int;
    i64 => Int64, Int;
    u8 => UInt8, UInt;
    u16 => UInt16, UInt;
    u32 => UInt32, UInt;
    u64 => UInt64, UInt;
}

impl_native_float! {
    f32 => Float32;
    f64 => Float64;
}
