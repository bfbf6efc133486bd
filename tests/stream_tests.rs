#![allow(missing_docs)]

//! Stream-backed deserialization, backfill behavior and the buffer growth
//! policy.

use std::cell::Cell;
use std::fs::File;
use std::io::{Read, Write};
use std::rc::Rc;

use polycode::buffer::MemoryBuffer;
use polycode::value::Value;
use polycode::{Polycode, PolycodeError, StreamReader};

// --- MOCK SOURCES ---

/// Serves at most one byte per read call, forcing the fill loop to iterate.
struct TrickleReader {
    data: Vec<u8>,
    pos: usize,
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.data[self.pos];
        self.pos += 1;
        Ok(1)
    }
}

/// Counts every byte handed out, for the exactly-once sourcing check.
struct CountingReader {
    data: Vec<u8>,
    pos: usize,
    served: Rc<Cell<usize>>,
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = (self.data.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        self.served.set(self.served.get() + n);
        Ok(n)
    }
}

fn sample_message(codec: &mut Polycode) -> polycode::Result<Vec<u8>> {
    let root = Value::List(vec![
        Value::String("stream me".into()).into_ref(),
        Value::Int64Array(vec![1, 2, 3, 4]).into_ref(),
        Value::Int32(12345).into_ref(),
    ])
    .into_ref();
    codec.serialize(&root)
}

// --- TESTS ---

#[test]
fn test_deserialize_from_file() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    let bytes = sample_message(&mut codec)?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("message.bin");
    File::create(&path)?.write_all(&bytes)?;

    let expected = codec.deserialize(&bytes)?;
    let decoded = codec.deserialize_from(File::open(&path)?)?;
    assert_eq!(*decoded.borrow(), *expected.borrow());
    Ok(())
}

#[test]
fn test_deserialize_from_trickling_source() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    let bytes = sample_message(&mut codec)?;
    let expected = codec.deserialize(&bytes)?;

    let decoded = codec.deserialize_from(TrickleReader {
        data: bytes,
        pos: 0,
    })?;
    assert_eq!(*decoded.borrow(), *expected.borrow());
    Ok(())
}

#[test]
fn test_stream_bytes_are_sourced_at_most_once() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    let bytes = sample_message(&mut codec)?;
    let len = bytes.len();

    let served = Rc::new(Cell::new(0));
    let source = CountingReader {
        data: bytes,
        pos: 0,
        served: served.clone(),
    };
    codec.deserialize_from(source)?;
    assert_eq!(served.get(), len);
    Ok(())
}

#[test]
fn test_truncated_stream_is_reported() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    let mut bytes = sample_message(&mut codec)?;
    bytes.truncate(bytes.len() / 2);

    let err = codec
        .deserialize_from(TrickleReader {
            data: bytes,
            pos: 0,
        })
        .expect_err("truncated stream");
    assert!(matches!(err, PolycodeError::Truncated(_)));
    Ok(())
}

#[test]
fn test_fill_buffer_without_source_is_truncated() {
    let mut buf = MemoryBuffer::from_vec(vec![1, 2]);
    assert!(matches!(
        buf.read_u64(),
        Err(PolycodeError::Truncated(_))
    ));
}

// --- GROWTH POLICY ---

#[test]
fn test_growth_is_monotonic_and_bounded() {
    let mut buf = MemoryBuffer::with_capacity(16);
    let mut last_capacity = buf.capacity();
    for chunk in 0..10 * 1024 {
        // 10 MiB in 1 KiB slices.
        buf.write_bytes(&[0u8; 1024]);
        assert!(buf.capacity() >= last_capacity, "capacity shrank at {chunk}");
        last_capacity = buf.capacity();
    }
    assert_eq!(buf.size(), 10 * 1024 * 1024);
    assert!(buf.capacity() < 4 * buf.size());
}

#[test]
fn test_growth_backs_off_past_threshold() {
    let mut buf = MemoryBuffer::with_capacity(16);
    // Below the 100 MiB threshold: doubles the requirement.
    buf.reserve(10 * 1024 * 1024);
    assert!(buf.capacity() >= 20 * 1024 * 1024);
    assert!(buf.capacity() < 21 * 1024 * 1024);
    // Above it: at most 1.5x the requirement.
    buf.reserve(120 * 1024 * 1024);
    assert!(buf.capacity() >= 120 * 1024 * 1024);
    assert!(buf.capacity() <= 180 * 1024 * 1024 + 1024);
}

#[test]
fn test_shrink_releases_consumed_bytes() -> polycode::Result<()> {
    let mut buf = MemoryBuffer::from_vec(vec![7u8; 1 << 20]);
    let mut scratch = vec![0u8; (1 << 20) - 64];
    buf.read_into(&mut scratch)?;

    buf.shrink();
    assert_eq!(buf.remaining(), 64);
    assert!(buf.capacity() < 1 << 20);
    assert_eq!(buf.read_u8()?, 7);
    Ok(())
}

#[test]
fn test_stream_reader_chunk_size_floor() {
    let reader = StreamReader::with_chunk_size(std::io::empty(), 0);
    assert_eq!(reader.chunk_size(), 1);
}
