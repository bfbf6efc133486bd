//! The per-type serializer contract and the dispatch core.
//!
//! Every serializer — built-in or user-supplied — exposes three operations
//! over the dynamic value model: `write`, `read` and `copy` (a deep copy in
//! the codec's semantics). The dispatch core invokes them inside a
//! reference-resolver frame: it writes the reference tag, emits type
//! metadata through the class resolver, then hands the payload to the
//! serializer. Serializers recurse into children through the same core
//! ([`WriteContext::write_ref_value`] / [`ReadContext::read_ref_value`]),
//! which is what keeps identity tags interleaved correctly with payload
//! bytes.

use std::collections::HashMap;
use std::rc::Rc;

use crate::buffer::MemoryBuffer;
use crate::config::Config;
use crate::error::{PolycodeError, Result};
use crate::meta::MetaStringResolver;
use crate::refs::{RefReader, RefTag, RefWriter};
use crate::resolver::TypeResolver;
use crate::value::{Value, ValueRef};

/// Shape hint used for internal-kind selection at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// Field-structured value.
    Struct,
    /// Ordinal constant.
    Enum,
    /// Opaque extension payload.
    Ext,
}

/// Capability set every per-type serializer must satisfy.
///
/// Implementations must not write or read reference tags themselves; child
/// values go through the dispatch core on the context.
pub trait Serializer {
    /// Writes the payload of `value` (tag and type metadata are already on
    /// the wire).
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<()>;

    /// Reads one payload back into a value.
    fn read(&self, ctx: &mut ReadContext<'_>) -> Result<Value>;

    /// Produces a deep copy of `value` in the codec's semantics.
    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value>;

    /// Shape hint for internal-kind selection.
    fn shape(&self) -> TypeShape {
        TypeShape::Ext
    }

    /// When false, the reference resolver is short-circuited for values of
    /// this type and they are always written inline.
    fn needs_ref_tracking(&self) -> bool {
        true
    }
}

// --- WRITE FRAME ---

/// Mutable state threaded through one top-level serialize call.
pub struct WriteContext<'a> {
    /// Output buffer.
    pub buffer: &'a mut MemoryBuffer,
    /// Write-side identity table.
    pub refs: &'a mut RefWriter,
    /// Type registry.
    pub resolver: &'a mut TypeResolver,
    /// Meta-string intern pool and token state.
    pub meta: &'a mut MetaStringResolver,
    /// Configuration snapshot.
    pub config: &'a Config,
    depth: usize,
}

impl<'a> WriteContext<'a> {
    /// Assembles a write frame over the codec's parts.
    pub fn new(
        buffer: &'a mut MemoryBuffer,
        refs: &'a mut RefWriter,
        resolver: &'a mut TypeResolver,
        meta: &'a mut MetaStringResolver,
        config: &'a Config,
    ) -> Self {
        Self {
            buffer,
            refs,
            resolver,
            meta,
            config,
            depth: 0,
        }
    }

    /// Serializes one reference slot: tag, type metadata, payload.
    ///
    /// # Errors
    /// [`PolycodeError::CircularRef`] when recursion exceeds the configured
    /// depth while reference tracking is off, plus any resolution or
    /// serializer error.
    pub fn write_ref_value(&mut self, value: &ValueRef) -> Result<()> {
        self.depth += 1;
        let result = self.write_slot(value);
        self.depth -= 1;
        result
    }

    fn write_slot(&mut self, value: &ValueRef) -> Result<()> {
        if !self.config.track_ref && self.depth > self.config.max_recursion_depth {
            return Err(PolycodeError::CircularRef(format!(
                "Recursion past depth {} with reference tracking off",
                self.config.max_recursion_depth
            )));
        }

        let borrowed = value.try_borrow().map_err(|_| {
            PolycodeError::Internal("Value mutably borrowed during serialization".into())
        })?;

        if matches!(*borrowed, Value::Null) {
            self.buffer.write_u8(RefTag::Null as u8);
            return Ok(());
        }

        let class_info = self.resolver.get_class_info(&borrowed)?;
        let serializer = class_info.serializer()?;

        let suppressed = (borrowed.is_basic() && self.config.ignore_basic_types_ref)
            || (borrowed.is_string() && self.config.ignore_string_ref)
            || (borrowed.is_time() && self.config.ignore_time_ref);
        let tracked = self.config.track_ref && serializer.needs_ref_tracking() && !suppressed;

        if tracked {
            if let Some(seq) = self.refs.get(value) {
                self.buffer.write_u8(RefTag::Ref as u8);
                self.buffer.write_var_uint32(seq);
                return Ok(());
            }
            self.refs.insert(value);
            self.buffer.write_u8(RefTag::TrackFirst as u8);
        } else {
            self.buffer.write_u8(RefTag::NotNullValue as u8);
        }

        self.resolver
            .write_class_info(self.buffer, self.meta, &class_info);
        serializer.write(self, &borrowed)
    }
}

// --- READ FRAME ---

/// Mutable state threaded through one top-level deserialize call.
pub struct ReadContext<'a> {
    /// Input buffer (possibly stream-backed).
    pub buffer: &'a mut MemoryBuffer,
    /// Read-side sequence table.
    pub refs: &'a mut RefReader,
    /// Type registry.
    pub resolver: &'a mut TypeResolver,
    /// Meta-string intern pool and reverse table.
    pub meta: &'a mut MetaStringResolver,
    /// Configuration snapshot.
    pub config: &'a Config,
}

impl<'a> ReadContext<'a> {
    /// Assembles a read frame over the codec's parts.
    pub fn new(
        buffer: &'a mut MemoryBuffer,
        refs: &'a mut RefReader,
        resolver: &'a mut TypeResolver,
        meta: &'a mut MetaStringResolver,
        config: &'a Config,
    ) -> Self {
        Self {
            buffer,
            refs,
            resolver,
            meta,
            config,
        }
    }

    /// Deserializes one reference slot, registering tracked objects with
    /// the sequence table *before* their children are read so cycles close.
    pub fn read_ref_value(&mut self) -> Result<ValueRef> {
        let tag_byte = self.buffer.read_u8()?;
        let tag = RefTag::from_u8(tag_byte)
            .ok_or_else(|| PolycodeError::Malformed(format!("Unknown reference tag {tag_byte}")))?;

        match tag {
            RefTag::Null => Ok(Value::Null.into_ref()),
            RefTag::Ref => {
                let seq = self.buffer.read_var_uint32()?;
                self.refs.get(seq).ok_or_else(|| {
                    PolycodeError::Malformed(format!("Back-reference to unassigned sequence {seq}"))
                })
            }
            RefTag::NotNullValue => {
                let class_info = self
                    .resolver
                    .read_class_info(self.buffer, self.meta, self.config)?;
                let serializer = class_info.serializer()?;
                Ok(serializer.read(self)?.into_ref())
            }
            RefTag::TrackFirst => {
                // Reserve the sequence slot first: child back-references
                // must resolve to this cell while it is still being filled.
                let (_seq, cell) = self.refs.reserve();
                let class_info = self
                    .resolver
                    .read_class_info(self.buffer, self.meta, self.config)?;
                let serializer = class_info.serializer()?;
                let value = serializer.read(self)?;
                *cell.try_borrow_mut().map_err(|_| {
                    PolycodeError::Internal("Sequence cell borrowed during fill".into())
                })? = value;
                Ok(cell)
            }
        }
    }
}

// --- COPY FRAME ---

/// State threaded through one deep-copy call; preserves sharing and cycles
/// through an identity-keyed memo table.
pub struct CopyContext<'a> {
    /// Type registry (read-only resolution).
    pub resolver: &'a TypeResolver,
    seen: HashMap<usize, ValueRef>,
}

impl<'a> CopyContext<'a> {
    /// Creates an empty copy frame.
    pub fn new(resolver: &'a TypeResolver) -> Self {
        Self {
            resolver,
            seen: HashMap::new(),
        }
    }

    /// Deep-copies one reference slot, preserving identity: values reached
    /// twice yield the same output cell, and cycles terminate.
    pub fn copy_ref_value(&mut self, value: &ValueRef) -> Result<ValueRef> {
        let key = Rc::as_ptr(value) as usize;
        if let Some(existing) = self.seen.get(&key) {
            return Ok(existing.clone());
        }

        // Memoize the output cell before descending so cycles resolve to it.
        let out = Value::Null.into_ref();
        self.seen.insert(key, out.clone());

        let borrowed = value.try_borrow().map_err(|_| {
            PolycodeError::Internal("Value mutably borrowed during copy".into())
        })?;
        let copied = match *borrowed {
            Value::Null => Value::Null,
            ref v => {
                let class_info = self.resolver.lookup_class_info(v)?;
                let serializer = class_info.serializer()?;
                serializer.copy(self, v)?
            }
        };
        drop(borrowed);

        *out.try_borrow_mut()
            .map_err(|_| PolycodeError::Internal("Copy cell borrowed during fill".into()))? = copied;
        Ok(out)
    }
}
