//! Built-in serializers for primitives, containers and strings.
//!
//! These populate the default dispatch table during resolver construction.
//! Integer payloads honor the codec's compression flags (`compress_int`,
//! `long_encoding`); container serializers recurse through the dispatch
//! core so identity tags stay interleaved with payloads.

use std::sync::Arc;

use crate::error::{PolycodeError, Result};
use crate::serializer::{CopyContext, ReadContext, Serializer, TypeShape, WriteContext};
use crate::types::Kind;
use crate::value::{EnumValue, NativeType, StructValue, Value, ValueRef};

/// Pre-allocation cap for length-prefixed reads; real lengths above this
/// grow organically instead of trusting the wire.
const PREALLOC_LIMIT: usize = 65536;

fn mismatch(serializer: &str) -> PolycodeError {
    PolycodeError::Internal(format!("Dispatch reached {serializer} with a mismatched value"))
}

// --- PRIMITIVES ---

/// Serializer for `Value::Bool`.
#[derive(Debug)]
pub struct BoolSerializer;

impl Serializer for BoolSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Bool(b) => {
                ctx.buffer.write_u8(u8::from(*b));
                Ok(())
            }
            _ => Err(mismatch("BoolSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Bool(ctx.buffer.read_u8()? != 0))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Int8`.
#[derive(Debug)]
pub struct Int8Serializer;

impl Serializer for Int8Serializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Int8(v) => {
                ctx.buffer.write_i8(*v);
                Ok(())
            }
            _ => Err(mismatch("Int8Serializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Int8(ctx.buffer.read_i8()?))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Int16`.
#[derive(Debug)]
pub struct Int16Serializer;

impl Serializer for Int16Serializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Int16(v) => {
                ctx.buffer.write_i16(*v);
                Ok(())
            }
            _ => Err(mismatch("Int16Serializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Int16(ctx.buffer.read_i16()?))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Int32`; var-encoded under `compress_int`.
#[derive(Debug)]
pub struct Int32Serializer;

impl Serializer for Int32Serializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Int32(v) => {
                if ctx.config.compress_int {
                    ctx.buffer.write_var_int32(*v);
                } else {
                    ctx.buffer.write_i32(*v);
                }
                Ok(())
            }
            _ => Err(mismatch("Int32Serializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        let v = if ctx.config.compress_int {
            ctx.buffer.read_var_int32()?
        } else {
            ctx.buffer.read_i32()?
        };
        Ok(Value::Int32(v))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Int64`; encoding selected by `long_encoding`.
#[derive(Debug)]
pub struct Int64Serializer;

impl Serializer for Int64Serializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Int64(v) => {
                match ctx.config.long_encoding {
                    crate::config::LongEncoding::Sli => ctx.buffer.write_sli_int64(*v),
                    crate::config::LongEncoding::Pvl => ctx.buffer.write_var_int64(*v),
                    crate::config::LongEncoding::LeRawBytes => ctx.buffer.write_i64(*v),
                }
                Ok(())
            }
            _ => Err(mismatch("Int64Serializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        let v = match ctx.config.long_encoding {
            crate::config::LongEncoding::Sli => ctx.buffer.read_sli_int64()?,
            crate::config::LongEncoding::Pvl => ctx.buffer.read_var_int64()?,
            crate::config::LongEncoding::LeRawBytes => ctx.buffer.read_i64()?,
        };
        Ok(Value::Int64(v))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Float32`.
#[derive(Debug)]
pub struct Float32Serializer;

impl Serializer for Float32Serializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Float32(v) => {
                ctx.buffer.write_f32(*v);
                Ok(())
            }
            _ => Err(mismatch("Float32Serializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Float32(ctx.buffer.read_f32()?))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Float64`.
#[derive(Debug)]
pub struct Float64Serializer;

impl Serializer for Float64Serializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Float64(v) => {
                ctx.buffer.write_f64(*v);
                Ok(())
            }
            _ => Err(mismatch("Float64Serializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Float64(ctx.buffer.read_f64()?))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

// --- STRINGS AND BINARY ---

/// Serializer for `Value::String`.
///
/// The length header carries an ASCII flag in its low bit when
/// `compress_string` is on, letting UTF-16 runtimes pick a narrow decode
/// path; the byte payload is UTF-8 either way.
#[derive(Debug)]
pub struct StringSerializer;

impl Serializer for StringSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => {
                let ascii = ctx.config.compress_string && s.is_ascii();
                let header = (s.len() as u32) << 1 | u32::from(ascii);
                ctx.buffer.write_var_uint32(header);
                ctx.buffer.write_bytes(s.as_bytes());
                Ok(())
            }
            _ => Err(mismatch("StringSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        let header = ctx.buffer.read_var_uint32()?;
        let len = (header >> 1) as usize;
        let bytes = ctx.buffer.read_bytes(len)?;
        let s = String::from_utf8(bytes)
            .map_err(|_| PolycodeError::Malformed("Invalid UTF-8 in string payload".into()))?;
        Ok(Value::String(s))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Binary`.
#[derive(Debug)]
pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Binary(b) => {
                ctx.buffer.write_var_uint32(b.len() as u32);
                ctx.buffer.write_bytes(b);
                Ok(())
            }
            _ => Err(mismatch("BinarySerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        let len = ctx.buffer.read_var_uint32()? as usize;
        Ok(Value::Binary(ctx.buffer.read_bytes(len)?))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

// --- TYPED ARRAYS ---

/// Serializer for `Value::BoolArray` (one byte per element).
#[derive(Debug)]
pub struct BoolArraySerializer;

impl Serializer for BoolArraySerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::BoolArray(items) => {
                ctx.buffer.write_var_uint32(items.len() as u32);
                for b in items {
                    ctx.buffer.write_u8(u8::from(*b));
                }
                Ok(())
            }
            _ => Err(mismatch("BoolArraySerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        let len = ctx.buffer.read_var_uint32()? as usize;
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            items.push(ctx.buffer.read_u8()? != 0);
        }
        Ok(Value::BoolArray(items))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

macro_rules! impl_numeric_array_serializer {
    ($name:ident, $variant:ident, $write:ident, $read:ident) => {
        /// Packed little-endian numeric array serializer.
        #[derive(Debug)]
        pub struct $name;

        impl Serializer for $name {
            fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
                match value {
                    Value::$variant(items) => {
                        ctx.buffer.write_var_uint32(items.len() as u32);
                        for v in items {
                            ctx.buffer.$write(*v);
                        }
                        Ok(())
                    }
                    _ => Err(mismatch(stringify!($name))),
                }
            }

            fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
                let len = ctx.buffer.read_var_uint32()? as usize;
                let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
                for _ in 0..len {
                    items.push(ctx.buffer.$read()?);
                }
                Ok(Value::$variant(items))
            }

            fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
                Ok(value.clone())
            }
        }
    };
}

impl_numeric_array_serializer!(Int16ArraySerializer, Int16Array, write_i16, read_i16);
impl_numeric_array_serializer!(Int32ArraySerializer, Int32Array, write_i32, read_i32);
impl_numeric_array_serializer!(Int64ArraySerializer, Int64Array, write_i64, read_i64);
impl_numeric_array_serializer!(Float32ArraySerializer, Float32Array, write_f32, read_f32);
impl_numeric_array_serializer!(Float64ArraySerializer, Float64Array, write_f64, read_f64);

// --- TIME AND DECIMAL ---

/// Serializer for `Value::Duration`: raw 8-byte nanosecond count.
#[derive(Debug)]
pub struct DurationSerializer;

impl Serializer for DurationSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Duration(nanos) => {
                ctx.buffer.write_i64(*nanos);
                Ok(())
            }
            _ => Err(mismatch("DurationSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Duration(ctx.buffer.read_i64()?))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Timestamp`: raw 8-byte epoch nanoseconds.
#[derive(Debug)]
pub struct TimestampSerializer;

impl Serializer for TimestampSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Timestamp(nanos) => {
                ctx.buffer.write_i64(*nanos);
                Ok(())
            }
            _ => Err(mismatch("TimestampSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Timestamp(ctx.buffer.read_i64()?))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::LocalDate`: raw 4-byte epoch day count.
#[derive(Debug)]
pub struct LocalDateSerializer;

impl Serializer for LocalDateSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::LocalDate(days) => {
                ctx.buffer.write_i32(*days);
                Ok(())
            }
            _ => Err(mismatch("LocalDateSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::LocalDate(ctx.buffer.read_i32()?))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

/// Serializer for `Value::Decimal`: ZigZag scale + length-prefixed
/// big-endian two's-complement unscaled value.
#[derive(Debug)]
pub struct DecimalSerializer;

impl Serializer for DecimalSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Decimal { unscaled, scale } => {
                ctx.buffer.write_var_int32(*scale);
                ctx.buffer.write_var_uint32(unscaled.len() as u32);
                ctx.buffer.write_bytes(unscaled);
                Ok(())
            }
            _ => Err(mismatch("DecimalSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        let scale = ctx.buffer.read_var_int32()?;
        let len = ctx.buffer.read_var_uint32()? as usize;
        let unscaled = ctx.buffer.read_bytes(len)?;
        Ok(Value::Decimal { unscaled, scale })
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}

// --- CONTAINERS ---

/// Serializer for `Value::List`: count + one reference slot per element.
#[derive(Debug)]
pub struct ListSerializer;

impl Serializer for ListSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::List(items) => write_children(ctx, items),
            _ => Err(mismatch("ListSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::List(read_children(ctx)?))
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        match value {
            Value::List(items) => Ok(Value::List(copy_children(ctx, items)?)),
            _ => Err(mismatch("ListSerializer")),
        }
    }
}

/// Serializer for `Value::Set`: identical layout to lists; uniqueness is a
/// property of the source graph, not of the wire.
#[derive(Debug)]
pub struct SetSerializer;

impl Serializer for SetSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Set(items) => write_children(ctx, items),
            _ => Err(mismatch("SetSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Set(read_children(ctx)?))
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        match value {
            Value::Set(items) => Ok(Value::Set(copy_children(ctx, items)?)),
            _ => Err(mismatch("SetSerializer")),
        }
    }
}

/// Serializer for `Value::Map`: count + key slot + value slot per entry,
/// insertion order preserved.
#[derive(Debug)]
pub struct MapSerializer;

impl Serializer for MapSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Map(entries) => {
                ctx.buffer.write_var_uint32(entries.len() as u32);
                for (k, v) in entries {
                    ctx.write_ref_value(k)?;
                    ctx.write_ref_value(v)?;
                }
                Ok(())
            }
            _ => Err(mismatch("MapSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        let len = ctx.buffer.read_var_uint32()? as usize;
        let mut entries = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            let k = ctx.read_ref_value()?;
            let v = ctx.read_ref_value()?;
            entries.push((k, v));
        }
        Ok(Value::Map(entries))
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        match value {
            Value::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    out.push((ctx.copy_ref_value(k)?, ctx.copy_ref_value(v)?));
                }
                Ok(Value::Map(out))
            }
            _ => Err(mismatch("MapSerializer")),
        }
    }
}

fn write_children(ctx: &mut WriteContext<'_>, items: &[ValueRef]) -> Result<()> {
    ctx.buffer.write_var_uint32(items.len() as u32);
    for item in items {
        ctx.write_ref_value(item)?;
    }
    Ok(())
}

fn read_children(ctx: &mut ReadContext<'_>) -> Result<Vec<ValueRef>> {
    let len = ctx.buffer.read_var_uint32()? as usize;
    let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    for _ in 0..len {
        items.push(ctx.read_ref_value()?);
    }
    Ok(items)
}

fn copy_children(ctx: &mut CopyContext<'_>, items: &[ValueRef]) -> Result<Vec<ValueRef>> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(ctx.copy_ref_value(item)?);
    }
    Ok(out)
}

// --- USER TYPES ---

/// Generic struct serializer: positional field slots, self-describing per
/// field. One instance exists per registered struct type.
///
/// When class version checking is enabled the payload is prefixed with the
/// type's version hash; compatible mode suppresses both emission and
/// validation. Placeholder instances (fabricated for unknown names) carry
/// no expectation and read-and-discard the hash.
#[derive(Debug)]
pub struct StructSerializer {
    type_name: Arc<str>,
    version_hash: Option<u32>,
}

impl StructSerializer {
    /// Creates the serializer for one registered (or fabricated) type.
    pub fn new(type_name: Arc<str>, version_hash: Option<u32>) -> Self {
        Self {
            type_name,
            version_hash,
        }
    }
}

impl Serializer for StructSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Struct(s) => {
                if ctx.config.check_class_version {
                    ctx.buffer.write_u32(self.version_hash.unwrap_or(0));
                }
                ctx.buffer.write_var_uint32(s.fields.len() as u32);
                for field in &s.fields {
                    ctx.write_ref_value(field)?;
                }
                Ok(())
            }
            _ => Err(mismatch("StructSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        if ctx.config.check_class_version {
            let hash = ctx.buffer.read_u32()?;
            if let Some(expected) = self.version_hash {
                if hash != expected {
                    return Err(PolycodeError::Malformed(format!(
                        "Class version mismatch for {}: {hash:#x} != {expected:#x}",
                        self.type_name
                    )));
                }
            }
        }
        let len = ctx.buffer.read_var_uint32()? as usize;
        let mut fields = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            fields.push(ctx.read_ref_value()?);
        }
        Ok(Value::Struct(StructValue {
            type_name: self.type_name.clone(),
            fields,
        }))
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        match value {
            Value::Struct(s) => Ok(Value::Struct(StructValue {
                type_name: s.type_name.clone(),
                fields: copy_children(ctx, &s.fields)?,
            })),
            _ => Err(mismatch("StructSerializer")),
        }
    }

    fn shape(&self) -> TypeShape {
        TypeShape::Struct
    }
}

/// Enum serializer: a single VarUint ordinal. One instance per registered
/// enum type. Enum constants are never reference-tracked.
#[derive(Debug)]
pub struct EnumSerializer {
    type_name: Arc<str>,
}

impl EnumSerializer {
    /// Creates the serializer for one registered enum type.
    pub fn new(type_name: Arc<str>) -> Self {
        Self { type_name }
    }
}

impl Serializer for EnumSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()> {
        match value {
            Value::Enum(e) => {
                ctx.buffer.write_var_uint32(e.ordinal);
                Ok(())
            }
            _ => Err(mismatch("EnumSerializer")),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value> {
        Ok(Value::Enum(EnumValue {
            type_name: self.type_name.clone(),
            ordinal: ctx.buffer.read_var_uint32()?,
        }))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }

    fn shape(&self) -> TypeShape {
        TypeShape::Enum
    }

    fn needs_ref_tracking(&self) -> bool {
        false
    }
}

// --- DEFAULT DISPATCH TABLE ---

/// The bootstrap registrations installed at resolver construction.
pub fn default_registrations() -> Vec<(NativeType, Kind, Arc<dyn Serializer>)> {
    vec![
        (NativeType::Bool, Kind::Bool, Arc::new(BoolSerializer)),
        (NativeType::Int8, Kind::Int8, Arc::new(Int8Serializer)),
        (NativeType::Int16, Kind::Int16, Arc::new(Int16Serializer)),
        (NativeType::Int32, Kind::Int32, Arc::new(Int32Serializer)),
        (NativeType::Int64, Kind::Int64, Arc::new(Int64Serializer)),
        (NativeType::Float32, Kind::Float32, Arc::new(Float32Serializer)),
        (NativeType::Float64, Kind::Float64, Arc::new(Float64Serializer)),
        (NativeType::String, Kind::String, Arc::new(StringSerializer)),
        (NativeType::Binary, Kind::Binary, Arc::new(BinarySerializer)),
        (NativeType::Duration, Kind::Duration, Arc::new(DurationSerializer)),
        (NativeType::Timestamp, Kind::Timestamp, Arc::new(TimestampSerializer)),
        (NativeType::LocalDate, Kind::LocalDate, Arc::new(LocalDateSerializer)),
        (NativeType::Decimal, Kind::Decimal, Arc::new(DecimalSerializer)),
        (NativeType::BoolArray, Kind::BoolArray, Arc::new(BoolArraySerializer)),
        (NativeType::Int16Array, Kind::Int16Array, Arc::new(Int16ArraySerializer)),
        (NativeType::Int32Array, Kind::Int32Array, Arc::new(Int32ArraySerializer)),
        (NativeType::Int64Array, Kind::Int64Array, Arc::new(Int64ArraySerializer)),
        (NativeType::Float32Array, Kind::Float32Array, Arc::new(Float32ArraySerializer)),
        (NativeType::Float64Array, Kind::Float64Array, Arc::new(Float64ArraySerializer)),
        (NativeType::List, Kind::List, Arc::new(ListSerializer)),
        (NativeType::Set, Kind::Set, Arc::new(SetSerializer)),
        (NativeType::Map, Kind::Map, Arc::new(MapSerializer)),
    ]
}
