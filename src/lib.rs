//! # Polycode
//!
//! A cross-language binary object serialization core. Given an in-memory
//! object graph, Polycode emits a compact, self-describing byte stream that
//! any conforming runtime can decode back into an equivalent graph —
//! preserving the identity of shared and cyclic references. A faster
//! same-runtime mode omits cross-language type metadata.
//!
//! ## Overview
//!
//! The crate is the type-resolution and wire-format engine of the codec:
//!
//! *   **Type registry** ([`resolver`]): user types map to stable 32-bit
//!     type ids or to namespace + name pairs; built-in kinds (primitives,
//!     containers, strings, time types, typed arrays) are registered at
//!     construction.
//! *   **Meta-strings** ([`meta`]): namespaces and type names are bit-packed
//!     below one byte per character and interned, costing their payload
//!     exactly once per stream.
//! *   **Reference tracking** ([`refs`]): an identity-keyed table turns
//!     shared and cyclic references into compact back-reference tags.
//! *   **Memory buffer** ([`buffer`]): a growable little-endian cursor
//!     buffer with variable-length integer encodings and on-demand stream
//!     backfill ([`stream`]).
//! *   **Serializer dispatch** ([`serializer`], [`builtin`]): a per-type
//!     `{write, read, copy}` capability set invoked inside a
//!     reference-resolver frame.
//!
//! ## Wire Format
//!
//! ```text
//! header          : 4 bytes  (magic 0xBD | flags | reserved x2)
//! root_ref_tag    : 1 byte   (NULL | REF | NOT_NULL_VALUE | TRACK_FIRST)
//! if not NULL:
//!   class_info    : VarUint type id
//!                   [ namespace meta-string ]   -- namespaced kinds only
//!                   [ type-name meta-string ]   -- namespaced kinds only
//!   payload       : serializer-defined
//! ```
//!
//! Byte order is little-endian throughout.
//!
//! ## Usage
//!
//! ```rust
//! use polycode::{Polycode, TypeDef};
//! use polycode::value::Value;
//!
//! let mut codec = Polycode::builder().with_ref_tracking(true).build();
//!
//! // Shared references survive the round trip.
//! let shared = Value::String("hello".into()).into_ref();
//! let list = Value::List(vec![shared.clone(), shared]).into_ref();
//!
//! let bytes = codec.serialize(&list)?;
//! let decoded = codec.deserialize(&bytes)?;
//! # let _ = decoded;
//! # Ok::<(), polycode::PolycodeError>(())
//! ```
//!
//! ## Concurrency
//!
//! A codec instance is **single-threaded by contract**: all registration and
//! all serialize/deserialize calls on one instance must be externally
//! serialized. Wrappers that pool or thread-localize instances live outside
//! this crate.
//!
//! ## Safety and Error Handling
//!
//! *   **Encapsulated unsafe:** one documented pointer-copy path in the
//!     buffer; everything else is safe code.
//! *   **No panics:** no `unwrap()` or `panic!()` in the library (enforced
//!     by clippy lints).
//! *   **Comprehensive errors:** every failure is a [`PolycodeError`];
//!     partial buffer state is not rewound, so discard buffers on error.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod api;
pub mod buffer;
pub mod builtin;
pub mod config;
pub mod error;
pub mod meta;
pub mod refs;
pub mod resolver;
pub mod serializer;
pub mod stream;
pub mod types;
pub mod value;

// --- RE-EXPORTS ---

pub use api::Polycode;
pub use buffer::MemoryBuffer;
pub use config::{CompatibleMode, Config, Language, LongEncoding, PolycodeBuilder};
pub use error::{PolycodeError, Result};
pub use resolver::{ClassInfo, TypeDef, TypeResolver};
pub use serializer::{ReadContext, Serializer, TypeShape, WriteContext};
pub use stream::StreamReader;
pub use types::Kind;
pub use value::{Value, ValueRef};
