//! The in-memory object graph model.
//!
//! Polycode serializes dynamic graphs of [`Value`] nodes. The model is a
//! tagged union of the cross-language kinds plus an escape hatch for user
//! extension types; graphs are built from [`ValueRef`] handles
//! (`Rc<RefCell<Value>>`), so shared and cyclic references are expressible
//! and carry real object identity.
//!
//! ```rust
//! use polycode::value::{Value, ValueRef};
//!
//! let shared: ValueRef = Value::String("a".into()).into_ref();
//! let list = Value::List(vec![shared.clone(), shared.clone()]).into_ref();
//! # let _ = list;
//! ```
//!
//! Identity matters: the two list slots above point at the *same* cell, and a
//! codec with reference tracking enabled preserves that sharing on the wire.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// A shared, mutable handle to a node in the object graph.
///
/// Reference tracking keys on the `Rc` allocation address, so two handles
/// compare as "the same object" exactly when they were cloned from one
/// another.
pub type ValueRef = Rc<RefCell<Value>>;

/// A user struct: positional fields under a registered qualified name.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    /// Qualified name the type was registered under, e.g. `com.example.Point`.
    pub type_name: Arc<str>,
    /// Field values in declaration order. Names never travel on the wire.
    pub fields: Vec<ValueRef>,
}

/// A user enum constant: ordinal under a registered qualified name.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Qualified name the type was registered under.
    pub type_name: Arc<str>,
    /// Zero-based constant ordinal.
    pub ordinal: u32,
}

/// An extension value: an opaque payload owned by a user serializer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtValue {
    /// Qualified name the type was registered under.
    pub type_name: Arc<str>,
    /// Payload bytes as produced/consumed by the registered serializer.
    pub data: Vec<u8>,
}

/// A node in the dynamic object graph.
///
/// Primitive variants hold their payload inline; container and struct
/// variants hold [`ValueRef`] children so that sharing and cycles survive
/// a serialize/deserialize round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent reference.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 8-bit integer.
    Int8(i8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Single-precision float.
    Float32(f32),
    /// Double-precision float.
    Float64(f64),
    /// Unicode string.
    String(String),
    /// Raw byte sequence.
    Binary(Vec<u8>),
    /// Packed boolean array.
    BoolArray(Vec<bool>),
    /// Packed `i16` array.
    Int16Array(Vec<i16>),
    /// Packed `i32` array.
    Int32Array(Vec<i32>),
    /// Packed `i64` array.
    Int64Array(Vec<i64>),
    /// Packed `f32` array.
    Float32Array(Vec<f32>),
    /// Packed `f64` array.
    Float64Array(Vec<f64>),
    /// Signed duration in nanoseconds.
    Duration(i64),
    /// Point on the time line, nanoseconds since the Unix epoch.
    Timestamp(i64),
    /// Calendar date, days since the Unix epoch.
    LocalDate(i32),
    /// Arbitrary-precision decimal: big-endian two's-complement unscaled
    /// value and a base-10 scale.
    Decimal {
        /// Unscaled integer, big-endian two's complement.
        unscaled: Vec<u8>,
        /// Base-10 scale applied to the unscaled value.
        scale: i32,
    },
    /// Ordered sequence.
    List(Vec<ValueRef>),
    /// Unique collection. Insertion order is preserved on the wire.
    Set(Vec<ValueRef>),
    /// Key-value mapping. Insertion order is preserved on the wire.
    Map(Vec<(ValueRef, ValueRef)>),
    /// Registered user struct.
    Struct(StructValue),
    /// Registered user enum constant.
    Enum(EnumValue),
    /// Registered user extension type with an opaque payload.
    Ext(ExtValue),
}

/// The resolver's forward-map key: which registration governs a value.
///
/// Built-in kinds are structural (every `Value::List` resolves the same way);
/// user types are keyed by their registered qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// `Value::Bool`.
    Bool,
    /// `Value::Int8`.
    Int8,
    /// `Value::Int16`.
    Int16,
    /// `Value::Int32`.
    Int32,
    /// `Value::Int64`.
    Int64,
    /// `Value::Float32`.
    Float32,
    /// `Value::Float64`.
    Float64,
    /// `Value::String`.
    String,
    /// `Value::Binary`.
    Binary,
    /// `Value::BoolArray`.
    BoolArray,
    /// `Value::Int16Array`.
    Int16Array,
    /// `Value::Int32Array`.
    Int32Array,
    /// `Value::Int64Array`.
    Int64Array,
    /// `Value::Float32Array`.
    Float32Array,
    /// `Value::Float64Array`.
    Float64Array,
    /// `Value::Duration`.
    Duration,
    /// `Value::Timestamp`.
    Timestamp,
    /// `Value::LocalDate`.
    LocalDate,
    /// `Value::Decimal`.
    Decimal,
    /// `Value::List`.
    List,
    /// `Value::Set`.
    Set,
    /// `Value::Map`.
    Map,
    /// A user struct, enum or extension type, keyed by qualified name.
    Named(Arc<str>),
}

impl Value {
    /// Wraps the value in a fresh graph cell.
    #[inline]
    pub fn into_ref(self) -> ValueRef {
        Rc::new(RefCell::new(self))
    }

    /// Returns the resolver key governing this value, or `None` for `Null`
    /// (null is handled by the reference protocol, never by a serializer).
    pub fn native_type(&self) -> Option<NativeType> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => NativeType::Bool,
            Self::Int8(_) => NativeType::Int8,
            Self::Int16(_) => NativeType::Int16,
            Self::Int32(_) => NativeType::Int32,
            Self::Int64(_) => NativeType::Int64,
            Self::Float32(_) => NativeType::Float32,
            Self::Float64(_) => NativeType::Float64,
            Self::String(_) => NativeType::String,
            Self::Binary(_) => NativeType::Binary,
            Self::BoolArray(_) => NativeType::BoolArray,
            Self::Int16Array(_) => NativeType::Int16Array,
            Self::Int32Array(_) => NativeType::Int32Array,
            Self::Int64Array(_) => NativeType::Int64Array,
            Self::Float32Array(_) => NativeType::Float32Array,
            Self::Float64Array(_) => NativeType::Float64Array,
            Self::Duration(_) => NativeType::Duration,
            Self::Timestamp(_) => NativeType::Timestamp,
            Self::LocalDate(_) => NativeType::LocalDate,
            Self::Decimal { .. } => NativeType::Decimal,
            Self::List(_) => NativeType::List,
            Self::Set(_) => NativeType::Set,
            Self::Map(_) => NativeType::Map,
            Self::Struct(s) => NativeType::Named(s.type_name.clone()),
            Self::Enum(e) => NativeType::Named(e.type_name.clone()),
            Self::Ext(e) => NativeType::Named(e.type_name.clone()),
        })
    }

    /// True for the fixed-width primitive family (bool, integers, floats).
    pub fn is_basic(&self) -> bool {
        matches!(
            self,
            Self::Bool(_)
                | Self::Int8(_)
                | Self::Int16(_)
                | Self::Int32(_)
                | Self::Int64(_)
                | Self::Float32(_)
                | Self::Float64(_)
        )
    }

    /// True for string values.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// True for the time family (duration, timestamp, local date).
    pub fn is_time(&self) -> bool {
        matches!(self, Self::Duration(_) | Self::Timestamp(_) | Self::LocalDate(_))
    }
}

// --- CONSTRUCTION SUGAR ---

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}
