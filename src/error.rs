//! Centralized error handling for Polycode.
//!
//! All failure conditions are propagated through the `Result` type; the
//! library contains no panicking paths (enforced by `#![deny(clippy::panic)]`
//! and `#![deny(clippy::unwrap_used)]`).
//!
//! ## Error Categories
//!
//! Errors are categorized by the stage that produced them:
//!
//! - **I/O** ([`PolycodeError::Io`]): failures of the upstream byte source
//!   feeding a stream reader.
//! - **Truncated** ([`PolycodeError::Truncated`]): the input ended before the
//!   parser's demand was satisfied.
//! - **Malformed** ([`PolycodeError::Malformed`]): a tag, length or encoding
//!   did not satisfy a wire invariant.
//! - **Registration** ([`PolycodeError::IdOverflow`],
//!   [`PolycodeError::IdReused`], [`PolycodeError::NameConflict`],
//!   [`PolycodeError::InvalidTypeName`]): the registry rejected a type.
//! - **Resolution** ([`PolycodeError::UnregisteredType`],
//!   [`PolycodeError::UnregisteredSerializer`]): a decoded id or name has no
//!   usable registration.
//! - **Graph shape** ([`PolycodeError::CircularRef`]): recursion detected
//!   while reference tracking is off.
//! - **Policy** ([`PolycodeError::PolicyViolation`]): a type was rejected by
//!   the installed type checker.
//!
//! The type is `Clone` so errors can be stored for later analysis; the I/O
//! variant wraps its source in an `Arc` to keep cloning cheap.
//!
//! ## Example
//!
//! ```rust
//! use polycode::{Polycode, PolycodeError};
//!
//! let mut codec = Polycode::builder().build();
//! match codec.deserialize(&[0xBD]) {
//!     Err(PolycodeError::Truncated(_)) => {}
//!     other => panic!("expected truncated input, got {other:?}"),
//! }
//! ```

use std::fmt;
use std::io;
use std::sync::Arc;

/// A specialized `Result` type for Polycode operations.
pub type Result<T> = std::result::Result<T, PolycodeError>;

/// The master error enum covering all failure domains in Polycode.
#[derive(Debug, Clone)]
pub enum PolycodeError {
    /// Low-level I/O failure from the byte source behind a stream reader.
    ///
    /// The underlying `io::Error` is wrapped in an `Arc` to make the error
    /// `Clone` without copying the source.
    Io(Arc<io::Error>),

    /// The stream or byte slice ended before the parser's demand.
    Truncated(String),

    /// A tag, length or encoding violated a wire invariant: unknown internal
    /// kind, unknown meta-string encoding tag, VarUint overflow, a reference
    /// to a sequence number that was never assigned, and the like.
    Malformed(String),

    /// The decoded type id or qualified name has no registration and
    /// placeholder fabrication is disabled.
    UnregisteredType(String),

    /// An EXT-kind value arrived without a serializer. Ext payloads are
    /// opaque, so skipping is not an option.
    UnregisteredSerializer(String),

    /// A user type id was at or above the registry's bound (4096).
    IdOverflow(String),

    /// The requested type id is already taken, or the type is already
    /// registered under a different id.
    IdReused(String),

    /// A `(namespace, name)` pair is already associated with another type.
    NameConflict(String),

    /// A registration argument was rejected, e.g. a type name containing the
    /// namespace separator `.`.
    InvalidTypeName(String),

    /// The writer detected recursion while reference tracking is off.
    CircularRef(String),

    /// A type was rejected by the installed security checker.
    PolicyViolation(String),

    /// Logic error in the codec itself. Should not occur in production;
    /// please report it with a reproduction case.
    Internal(String),
}

impl fmt::Display for PolycodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O Error: {e}"),
            Self::Truncated(s) => write!(f, "Truncated Input: {s}"),
            Self::Malformed(s) => write!(f, "Malformed Data: {s}"),
            Self::UnregisteredType(s) => write!(f, "Unregistered Type: {s}"),
            Self::UnregisteredSerializer(s) => write!(f, "Unregistered Serializer: {s}"),
            Self::IdOverflow(s) => write!(f, "Type Id Overflow: {s}"),
            Self::IdReused(s) => write!(f, "Type Id Reused: {s}"),
            Self::NameConflict(s) => write!(f, "Type Name Conflict: {s}"),
            Self::InvalidTypeName(s) => write!(f, "Invalid Type Name: {s}"),
            Self::CircularRef(s) => write!(f, "Circular Reference: {s}"),
            Self::PolicyViolation(s) => write!(f, "Policy Violation: {s}"),
            Self::Internal(s) => write!(f, "Internal Logic Error: {s}"),
        }
    }
}

impl std::error::Error for PolycodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PolycodeError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
