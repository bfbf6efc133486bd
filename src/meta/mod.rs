//! Compact identifier compression for namespaces and type names.
//!
//! This module implements the "meta-string" layer of the wire format:
//!
//! - [`encoding`] packs an identifier into a byte payload using a 3-bit
//!   alphabet selector and 5/6-bit characters, falling back to UTF-8.
//! - [`resolver`] interns encoded payloads and writes them on the wire with
//!   a once-per-stream token protocol, so repeated names cost one VarUint.

pub mod encoding;
pub mod resolver;

pub use encoding::MetaEncoding;
pub use resolver::{MetaStringBytes, MetaStringResolver};
