//! The cross-language type-id space.
//!
//! A type id is a 32-bit non-negative integer. The low 8 bits carry the
//! *internal kind* — one of the [`Kind`] values shared by every conforming
//! runtime — and the upper 24 bits carry the user-assigned registration id
//! (zero for built-in kinds and for kinds identified by name).
//!
//! Kinds prefixed `Ns` are "namespaced": the type travels on the wire as a
//! namespace + type-name meta-string pair instead of a numeric id.

use crate::error::{PolycodeError, Result};

/// Highest user-assignable registration id (exclusive). Keeps the reverse
/// lookup tables bounded.
pub const MAX_USER_TYPE_ID: u32 = 4096;

/// Internal kind occupying the low 8 bits of a type id.
///
/// The numeric values are part of the wire contract and shared across
/// language runtimes; they must never be renumbered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Boolean.
    Bool = 1,
    /// Signed 8-bit integer.
    Int8 = 2,
    /// Signed 16-bit integer.
    Int16 = 3,
    /// Signed 32-bit integer.
    Int32 = 4,
    /// Signed 32-bit integer, always var-encoded.
    VarInt32 = 5,
    /// Signed 64-bit integer.
    Int64 = 6,
    /// Signed 64-bit integer, always var-encoded.
    VarInt64 = 7,
    /// Signed 64-bit integer with the 4-byte small-value fast path.
    SliInt64 = 8,
    /// IEEE-754 half-precision float.
    Float16 = 9,
    /// IEEE-754 single-precision float.
    Float32 = 10,
    /// IEEE-754 double-precision float.
    Float64 = 11,
    /// Unicode string.
    String = 12,
    /// Enum registered by numeric id.
    Enum = 13,
    /// Enum registered by namespace + name.
    NsEnum = 14,
    /// Struct registered by numeric id.
    Struct = 15,
    /// Struct serialized with dynamic subtype dispatch.
    PolymorphicStruct = 16,
    /// Struct in schema-compatible mode.
    CompatibleStruct = 17,
    /// Polymorphic struct in schema-compatible mode.
    PolymorphicCompatibleStruct = 18,
    /// Struct registered by namespace + name.
    NsStruct = 19,
    /// Namespaced polymorphic struct.
    NsPolymorphicStruct = 20,
    /// Namespaced struct in schema-compatible mode.
    NsCompatibleStruct = 21,
    /// Namespaced polymorphic struct in schema-compatible mode.
    NsPolymorphicCompatibleStruct = 22,
    /// Extension type registered by numeric id.
    Ext = 23,
    /// Polymorphic extension type.
    PolymorphicExt = 24,
    /// Extension type registered by namespace + name.
    NsExt = 25,
    /// Namespaced polymorphic extension type.
    NsPolymorphicExt = 26,
    /// Ordered sequence.
    List = 27,
    /// Unordered unique collection.
    Set = 28,
    /// Key-value mapping.
    Map = 29,
    /// Signed-nanosecond duration.
    Duration = 30,
    /// Point on the time line.
    Timestamp = 31,
    /// Calendar date without a time zone.
    LocalDate = 32,
    /// Arbitrary-precision decimal.
    Decimal = 33,
    /// Raw byte sequence.
    Binary = 34,
    /// Array of references.
    Array = 35,
    /// Packed boolean array.
    BoolArray = 36,
    /// Packed `i8` array.
    Int8Array = 37,
    /// Packed `i16` array.
    Int16Array = 38,
    /// Packed `i32` array.
    Int32Array = 39,
    /// Packed `i64` array.
    Int64Array = 40,
    /// Packed half-precision float array.
    Float16Array = 41,
    /// Packed `f32` array.
    Float32Array = 42,
    /// Packed `f64` array.
    Float64Array = 43,
    /// Arrow record batch.
    ArrowRecordBatch = 44,
    /// Arrow table.
    ArrowTable = 45,
}

impl Kind {
    /// Decodes the low 8 bits of a type id.
    pub fn from_u8(value: u8) -> Option<Self> {
        if (1..=45).contains(&value) {
            // The enum is dense over 1..=45.
            Some(KIND_TABLE[(value - 1) as usize])
        } else {
            None
        }
    }

    /// Returns true if the type is identified on the wire by
    /// namespace + name rather than by numeric id.
    pub fn is_namespaced(self) -> bool {
        matches!(
            self,
            Self::NsEnum
                | Self::NsStruct
                | Self::NsPolymorphicStruct
                | Self::NsCompatibleStruct
                | Self::NsPolymorphicCompatibleStruct
                | Self::NsExt
                | Self::NsPolymorphicExt
        )
    }

    /// Returns true for the enum kinds.
    pub fn is_enum(self) -> bool {
        matches!(self, Self::Enum | Self::NsEnum)
    }

    /// Returns true for the struct kinds (all schema and dispatch variants).
    pub fn is_struct(self) -> bool {
        matches!(
            self,
            Self::Struct
                | Self::PolymorphicStruct
                | Self::CompatibleStruct
                | Self::PolymorphicCompatibleStruct
                | Self::NsStruct
                | Self::NsPolymorphicStruct
                | Self::NsCompatibleStruct
                | Self::NsPolymorphicCompatibleStruct
        )
    }

    /// Returns true for the extension kinds.
    pub fn is_ext(self) -> bool {
        matches!(
            self,
            Self::Ext | Self::PolymorphicExt | Self::NsExt | Self::NsPolymorphicExt
        )
    }
}

const KIND_TABLE: [Kind; 45] = [
    Kind::Bool,
    Kind::Int8,
    Kind::Int16,
    Kind::Int32,
    Kind::VarInt32,
    Kind::Int64,
    Kind::VarInt64,
    Kind::SliInt64,
    Kind::Float16,
    Kind::Float32,
    Kind::Float64,
    Kind::String,
    Kind::Enum,
    Kind::NsEnum,
    Kind::Struct,
    Kind::PolymorphicStruct,
    Kind::CompatibleStruct,
    Kind::PolymorphicCompatibleStruct,
    Kind::NsStruct,
    Kind::NsPolymorphicStruct,
    Kind::NsCompatibleStruct,
    Kind::NsPolymorphicCompatibleStruct,
    Kind::Ext,
    Kind::PolymorphicExt,
    Kind::NsExt,
    Kind::NsPolymorphicExt,
    Kind::List,
    Kind::Set,
    Kind::Map,
    Kind::Duration,
    Kind::Timestamp,
    Kind::LocalDate,
    Kind::Decimal,
    Kind::Binary,
    Kind::Array,
    Kind::BoolArray,
    Kind::Int8Array,
    Kind::Int16Array,
    Kind::Int32Array,
    Kind::Int64Array,
    Kind::Float16Array,
    Kind::Float32Array,
    Kind::Float64Array,
    Kind::ArrowRecordBatch,
    Kind::ArrowTable,
];

/// Packs a user registration id and an internal kind into a full 32-bit
/// type id: kind in the low 8 bits, user id in the upper 24.
#[inline]
pub fn make_type_id(user_id: u32, kind: Kind) -> u32 {
    (user_id << 8) | kind as u32
}

/// Extracts the internal kind from a full type id.
///
/// # Errors
/// Returns [`PolycodeError::Malformed`] for an unknown kind byte.
#[inline]
pub fn kind_of(type_id: u32) -> Result<Kind> {
    Kind::from_u8((type_id & 0xFF) as u8)
        .ok_or_else(|| PolycodeError::Malformed(format!("Unknown internal kind in type id {type_id}")))
}

/// Extracts the user registration id (upper 24 bits) from a full type id.
#[inline]
pub fn user_id_of(type_id: u32) -> u32 {
    type_id >> 8
}
