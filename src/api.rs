//! The public codec façade.
//!
//! [`Polycode`] owns the four cooperating resolvers — types, meta-strings,
//! write-side and read-side references — and is the only place where the
//! message header is written or read. One instance is single-threaded by
//! contract: registrations and serialize/deserialize calls must be
//! externally serialized.

use std::io::Read;
use std::sync::Arc;

use crate::buffer::MemoryBuffer;
use crate::config::{Config, Language, LongEncoding, PolycodeBuilder};
use crate::error::{PolycodeError, Result};
use crate::meta::MetaStringResolver;
use crate::refs::{RefReader, RefWriter};
use crate::resolver::{TypeChecker, TypeDef, TypeResolver};
use crate::serializer::{CopyContext, ReadContext, Serializer, WriteContext};
use crate::stream::StreamReader;
use crate::value::ValueRef;

/// Magic byte opening every message.
pub const MAGIC: u8 = 0xBD;

const FLAG_SINGLE_LANGUAGE: u8 = 1 << 0;
const FLAG_TRACK_REF: u8 = 1 << 1;
const FLAG_COMPRESS_INT: u8 = 1 << 2;
const FLAG_COMPRESS_LONG: u8 = 1 << 3;
const FLAG_SHARE_META: u8 = 1 << 4;

/// Message header length: magic, flags, two reserved bytes.
pub const HEADER_SIZE: usize = 4;

/// Cross-language binary object codec.
///
/// ```rust
/// use polycode::{Polycode, TypeDef};
/// use polycode::value::{StructValue, Value};
///
/// let mut codec = Polycode::builder().with_ref_tracking(true).build();
/// codec.register_by_name(&TypeDef::structure("com.example.Point"))?;
///
/// let point = Value::Struct(StructValue {
///     type_name: "com.example.Point".into(),
///     fields: vec![Value::Int32(3).into_ref(), Value::Int32(4).into_ref()],
/// })
/// .into_ref();
///
/// let bytes = codec.serialize(&point)?;
/// let decoded = codec.deserialize(&bytes)?;
/// assert_eq!(*decoded.borrow(), *point.borrow());
/// # Ok::<(), polycode::PolycodeError>(())
/// ```
#[derive(Debug)]
pub struct Polycode {
    config: Config,
    resolver: TypeResolver,
    meta: MetaStringResolver,
    ref_writer: RefWriter,
    ref_reader: RefReader,
}

impl Polycode {
    /// Starts a configuration builder.
    pub fn builder() -> PolycodeBuilder {
        PolycodeBuilder::new()
    }

    /// Creates an instance from a finished configuration. Default types are
    /// registered during construction.
    pub(crate) fn with_config(config: Config) -> Self {
        let resolver = TypeResolver::new(&config);
        Self {
            config,
            resolver,
            meta: MetaStringResolver::new(),
            ref_writer: RefWriter::new(),
            ref_reader: RefReader::new(),
        }
    }

    /// The active configuration snapshot.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- REGISTRATION ---

    /// Registers a user type with an auto-assigned id (starting at 64).
    /// Returns the assigned id.
    pub fn register(&mut self, ty: &TypeDef) -> Result<u32> {
        self.resolver.register(&mut self.meta, ty)
    }

    /// Registers a user type under an explicit id (< 4096).
    pub fn register_with_id(&mut self, ty: &TypeDef, id: u32) -> Result<()> {
        self.resolver.register_with_id(&mut self.meta, ty, id)
    }

    /// Registers a user type by namespace + name; no numeric id is
    /// consumed and the names travel on the wire as meta-strings.
    pub fn register_by_name(&mut self, ty: &TypeDef) -> Result<()> {
        self.resolver.register_by_name(&mut self.meta, ty)
    }

    /// Overrides the serializer of a previously registered type.
    pub fn register_serializer(
        &mut self,
        qualified_name: &str,
        serializer: Arc<dyn Serializer>,
    ) -> Result<()> {
        self.resolver.register_serializer(qualified_name, serializer)
    }

    /// Installs a security checker consulted at registration and at
    /// placeholder fabrication.
    pub fn set_type_checker(&mut self, checker: TypeChecker) {
        self.resolver.set_type_checker(checker);
    }

    // --- SERIALIZE ---

    /// Serializes one object graph to a byte vector.
    pub fn serialize(&mut self, root: &ValueRef) -> Result<Vec<u8>> {
        let mut buffer = MemoryBuffer::new();
        self.serialize_into(&mut buffer, root)?;
        Ok(buffer.into_vec())
    }

    /// Serializes one object graph into a caller-owned buffer.
    pub fn serialize_into(&mut self, buffer: &mut MemoryBuffer, root: &ValueRef) -> Result<()> {
        buffer.write_u8(MAGIC);
        buffer.write_u8(self.header_flags());
        buffer.write_u16(0); // reserved

        self.ref_writer.reset();
        if !self.config.share_meta_context {
            self.meta.reset_write();
        }
        let mut ctx = WriteContext::new(
            buffer,
            &mut self.ref_writer,
            &mut self.resolver,
            &mut self.meta,
            &self.config,
        );
        ctx.write_ref_value(root)
    }

    fn header_flags(&self) -> u8 {
        let mut flags = 0u8;
        if self.config.language == Language::SameRuntime {
            flags |= FLAG_SINGLE_LANGUAGE;
        }
        if self.config.track_ref {
            flags |= FLAG_TRACK_REF;
        }
        if self.config.compress_int {
            flags |= FLAG_COMPRESS_INT;
        }
        if self.config.long_encoding != LongEncoding::LeRawBytes {
            flags |= FLAG_COMPRESS_LONG;
        }
        if self.config.share_meta_context {
            flags |= FLAG_SHARE_META;
        }
        flags
    }

    // --- DESERIALIZE ---

    /// Deserializes one object graph from a byte slice.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<ValueRef> {
        let mut buffer = MemoryBuffer::from_vec(bytes.to_vec());
        self.deserialize_buffer(&mut buffer)
    }

    /// Deserializes one object graph from a blocking byte source, buffering
    /// chunks on demand.
    pub fn deserialize_from<R: Read + 'static>(&mut self, source: R) -> Result<ValueRef> {
        let mut buffer = MemoryBuffer::from_stream(StreamReader::new(source));
        self.deserialize_buffer(&mut buffer)
    }

    /// Deserializes one object graph from a caller-owned buffer. The buffer
    /// may be stream-backed; its cursor is left after the message (or
    /// undefined after an error — discard the buffer then).
    pub fn deserialize_buffer(&mut self, buffer: &mut MemoryBuffer) -> Result<ValueRef> {
        let magic = buffer.read_u8()?;
        if magic != MAGIC {
            return Err(PolycodeError::Malformed(format!(
                "Bad magic byte {magic:#04x}, expected {MAGIC:#04x}"
            )));
        }
        let flags = buffer.read_u8()?;
        buffer.read_u16()?; // reserved

        // The stream is authoritative for the wire-level toggles; the SLI
        // vs PVL choice inside "long compressed" is agreed out of band.
        let mut effective = self.config.clone();
        effective.track_ref = flags & FLAG_TRACK_REF != 0;
        effective.compress_int = flags & FLAG_COMPRESS_INT != 0;
        effective.long_encoding = if flags & FLAG_COMPRESS_LONG != 0 {
            match self.config.long_encoding {
                LongEncoding::LeRawBytes => LongEncoding::Sli,
                other => other,
            }
        } else {
            LongEncoding::LeRawBytes
        };

        self.ref_reader.reset();
        if !self.config.share_meta_context {
            self.meta.reset_read();
        }
        let mut ctx = ReadContext::new(
            buffer,
            &mut self.ref_reader,
            &mut self.resolver,
            &mut self.meta,
            &effective,
        );
        ctx.read_ref_value()
    }

    // --- COPY ---

    /// Produces a deep copy of an object graph in the codec's semantics:
    /// sharing and cycles are preserved.
    pub fn copy(&self, value: &ValueRef) -> Result<ValueRef> {
        let mut ctx = CopyContext::new(&self.resolver);
        ctx.copy_ref_value(value)
    }
}
