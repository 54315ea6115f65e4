//! Tensor element types.

/// Element type of a tensor, as carried in `TensorProto.data_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DataType {
    Undefined = 0,
    Float = 1,
    Uint8 = 2,
    Int8 = 3,
    Uint16 = 4,
    Int16 = 5,
    Int32 = 6,
    Int64 = 7,
    String = 8,
    Bool = 9,
    Float16 = 10,
}

/// The typed repeated field that carries values of a data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedStorage {
    Float,
    Int32,
    String,
    Int64,
}

impl TypedStorage {
    /// Name of the TensorProto field backing this storage.
    pub fn field_name(self) -> &'static str {
        match self {
            TypedStorage::Float => "float_data",
            TypedStorage::Int32 => "int32_data",
            TypedStorage::String => "string_data",
            TypedStorage::Int64 => "int64_data",
        }
    }
}

impl DataType {
    /// Creates a DataType from its wire representation.
    pub fn from_i32(v: i32) -> Option<DataType> {
        match v {
            0 => Some(DataType::Undefined),
            1 => Some(DataType::Float),
            2 => Some(DataType::Uint8),
            3 => Some(DataType::Int8),
            4 => Some(DataType::Uint16),
            5 => Some(DataType::Int16),
            6 => Some(DataType::Int32),
            7 => Some(DataType::Int64),
            8 => Some(DataType::String),
            9 => Some(DataType::Bool),
            10 => Some(DataType::Float16),
            _ => None,
        }
    }

    /// Size in bytes of one element in `raw_data`, or None when elements
    /// have no fixed width.
    pub fn element_size(self) -> Option<usize> {
        match self {
            DataType::Float | DataType::Int32 => Some(4),
            DataType::Int64 => Some(8),
            DataType::Uint16 | DataType::Int16 | DataType::Float16 => Some(2),
            DataType::Uint8 | DataType::Int8 | DataType::Bool => Some(1),
            DataType::String | DataType::Undefined => None,
        }
    }

    /// The typed field that carries values of this type when `raw_data` is not used.
    ///
    /// FLOAT16 values are stored bit-wise as unsigned 16-bit integers in `int32_data`.
    pub fn storage(self) -> Option<TypedStorage> {
        match self {
            DataType::Float => Some(TypedStorage::Float),
            DataType::Uint8
            | DataType::Int8
            | DataType::Uint16
            | DataType::Int16
            | DataType::Int32
            | DataType::Bool
            | DataType::Float16 => Some(TypedStorage::Int32),
            DataType::Int64 => Some(TypedStorage::Int64),
            DataType::String => Some(TypedStorage::String),
            DataType::Undefined => None,
        }
    }

    /// Inclusive range of values a type narrower than 32 bits may take
    /// inside `int32_data`.
    pub fn int32_range(self) -> Option<(i32, i32)> {
        match self {
            DataType::Uint8 => Some((0, u8::MAX as i32)),
            DataType::Int8 => Some((i8::MIN as i32, i8::MAX as i32)),
            DataType::Uint16 | DataType::Float16 => Some((0, u16::MAX as i32)),
            DataType::Int16 => Some((i16::MIN as i32, i16::MAX as i32)),
            DataType::Bool => Some((0, 1)),
            _ => None,
        }
    }

    /// Check if this is an integer type
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::Uint8
                | DataType::Int8
                | DataType::Uint16
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
        )
    }

    /// Check if this is a floating point type
    pub fn is_float(self) -> bool {
        matches!(self, DataType::Float | DataType::Float16)
    }
}
