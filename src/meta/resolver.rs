//! Interning pool and wire protocol for encoded identifiers.
//!
//! Every namespace or type name crosses the wire as a [`MetaStringBytes`]:
//! an interned, immutable payload paired with a 64-bit hash computed once at
//! intern time. The resolver guarantees one record per distinct payload, so
//! equality checks degrade to pointer comparisons and the hash is consistent
//! with payload equality.
//!
//! On the wire a record costs its full payload exactly once per stream:
//!
//! ```text
//! token = VarUint
//! token & 1 == 1   first occurrence: VarUint length + payload bytes follow
//! token & 1 == 0   back-reference: token >> 1 indexes the reverse table
//! ```

use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::Arc;

use twox_hash::XxHash64;

use crate::buffer::MemoryBuffer;
use crate::error::{PolycodeError, Result};
use crate::meta::encoding;

/// Upper bound on a single payload accepted from the wire.
const MAX_PAYLOAD_LEN: usize = 0xFFFF;

/// An interned, encoded identifier payload.
///
/// Two records are equal iff their payloads are equal; the hash is derived
/// from the payload at intern time and never recomputed. Records are created
/// on first encounter, retained by the owning resolver and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaStringBytes {
    bytes: Vec<u8>,
    hash: u64,
}

impl MetaStringBytes {
    fn new(bytes: Vec<u8>) -> Self {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        let hash = hasher.finish();
        Self { bytes, hash }
    }

    /// The encoded payload.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload hash, computed once at intern time.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Decodes the payload back to the source identifier.
    pub fn decode(&self) -> Result<String> {
        encoding::decode(&self.bytes)
    }
}

/// Intern pool plus per-stream write/read token state.
///
/// The pool lives for the codec instance and is append-only; the token maps
/// are per-message state reset between calls unless the codec shares its
/// meta context across messages.
#[derive(Debug, Default)]
pub struct MetaStringResolver {
    /// payload -> interned record. Append-only.
    pool: HashMap<Vec<u8>, Arc<MetaStringBytes>>,
    /// Interned record (by address) -> write token for the current stream.
    write_tokens: HashMap<usize, u32>,
    /// Read-side reverse table for the current stream.
    read_table: Vec<Arc<MetaStringBytes>>,
}

impl MetaStringResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the interned record for a payload, creating it on first
    /// encounter.
    pub fn get_or_intern(&mut self, payload: &[u8]) -> Arc<MetaStringBytes> {
        if let Some(existing) = self.pool.get(payload) {
            return existing.clone();
        }
        let record = Arc::new(MetaStringBytes::new(payload.to_vec()));
        self.pool.insert(payload.to_vec(), record.clone());
        record
    }

    /// Encodes and interns an identifier string.
    ///
    /// # Errors
    /// Propagates encoding failures (oversized or unencodable identifiers).
    pub fn intern_str(&mut self, s: &str) -> Result<Arc<MetaStringBytes>> {
        let payload = encoding::encode(s)?;
        Ok(self.get_or_intern(&payload))
    }

    /// Writes a record using the once-per-stream token protocol.
    pub fn write_meta_string_bytes(&mut self, buffer: &mut MemoryBuffer, record: &Arc<MetaStringBytes>) {
        let key = Arc::as_ptr(record) as usize;
        if let Some(&token) = self.write_tokens.get(&key) {
            buffer.write_var_uint32(token << 1);
            return;
        }
        let token = self.write_tokens.len() as u32;
        self.write_tokens.insert(key, token);
        buffer.write_var_uint32((token << 1) | 1);
        buffer.write_var_uint32(record.payload().len() as u32);
        buffer.write_bytes(record.payload());
    }

    /// Reads a record, populating the per-stream reverse table on first
    /// occurrences.
    ///
    /// # Errors
    /// [`PolycodeError::Malformed`] for an out-of-order first-occurrence
    /// token, an oversized payload, or a back-reference past the table.
    pub fn read_meta_string_bytes(&mut self, buffer: &mut MemoryBuffer) -> Result<Arc<MetaStringBytes>> {
        let token = buffer.read_var_uint32()?;
        let index = (token >> 1) as usize;
        if token & 1 == 1 {
            if index != self.read_table.len() {
                return Err(PolycodeError::Malformed(format!(
                    "Meta-string token {index} out of order, expected {}",
                    self.read_table.len()
                )));
            }
            let len = buffer.read_var_uint32()? as usize;
            if len > MAX_PAYLOAD_LEN {
                return Err(PolycodeError::Malformed(format!(
                    "Meta-string payload of {len} bytes exceeds limit {MAX_PAYLOAD_LEN}"
                )));
            }
            let payload = buffer.read_bytes(len)?;
            let record = self.get_or_intern(&payload);
            self.read_table.push(record.clone());
            Ok(record)
        } else {
            self.read_table.get(index).cloned().ok_or_else(|| {
                PolycodeError::Malformed(format!(
                    "Meta-string back-reference {index} past table of {}",
                    self.read_table.len()
                ))
            })
        }
    }

    /// Clears the write-side token state for a new stream.
    pub fn reset_write(&mut self) {
        self.write_tokens.clear();
    }

    /// Clears the read-side reverse table for a new stream.
    pub fn reset_read(&mut self) {
        self.read_table.clear();
    }
}
