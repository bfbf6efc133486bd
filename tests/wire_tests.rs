#![allow(missing_docs)]

//! Literal wire-layout checks: variable-length encodings, header bytes and
//! the end-to-end scenarios pinned by the format contract.

use polycode::buffer::MemoryBuffer;
use polycode::meta::MetaStringResolver;
use polycode::value::{StructValue, Value};
use polycode::{Polycode, PolycodeError, TypeDef};
use std::rc::Rc;

// --- ENCODING TABLES ---

#[test]
fn test_var_uint32_boundary_lengths() -> polycode::Result<()> {
    let table: &[(u32, usize)] = &[
        (0, 1),
        (127, 1),
        (128, 2),
        (16383, 2),
        (16384, 3),
        ((1 << 21) - 1, 3),
        (1 << 21, 4),
        ((1 << 28) - 1, 4),
        (1 << 28, 5),
        (u32::MAX, 5),
    ];
    for &(value, expected_len) in table {
        let mut buf = MemoryBuffer::new();
        buf.write_var_uint32(value);
        assert_eq!(buf.size(), expected_len, "length of {value}");
        assert_eq!(buf.read_var_uint32()?, value, "round trip of {value}");
    }
    Ok(())
}

#[test]
fn test_var_uint32_overflow_is_malformed() {
    let mut buf = MemoryBuffer::from_vec(vec![0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
    assert!(matches!(
        buf.read_var_uint32(),
        Err(PolycodeError::Malformed(_))
    ));
}

#[test]
fn test_sli_int64_boundaries() -> polycode::Result<()> {
    let small: &[i64] = &[0, 1, -1, 1 << 29, -(1 << 30), (1 << 30) - 1];
    for &value in small {
        let mut buf = MemoryBuffer::new();
        buf.write_sli_int64(value);
        assert_eq!(buf.size(), 4, "small encoding of {value}");
        assert_eq!(buf.read_sli_int64()?, value);
    }
    let big: &[i64] = &[1 << 30, -(1 << 30) - 1, i64::MAX, i64::MIN];
    for &value in big {
        let mut buf = MemoryBuffer::new();
        buf.write_sli_int64(value);
        assert_eq!(buf.size(), 9, "big encoding of {value}");
        assert_eq!(buf.read_sli_int64()?, value);
    }
    Ok(())
}

#[test]
fn test_var_int32_zigzag_bytes() -> polycode::Result<()> {
    let mut buf = MemoryBuffer::new();
    buf.write_var_int32(300);
    assert_eq!(buf.as_slice(), &[0xD8, 0x04]);
    assert_eq!(buf.read_var_int32()?, 300);
    Ok(())
}

#[test]
fn test_var_int64_round_trip() -> polycode::Result<()> {
    for value in [0i64, -1, 1, i64::MIN, i64::MAX, 1 << 40, -(1 << 40)] {
        let mut buf = MemoryBuffer::new();
        buf.write_var_int64(value);
        assert_eq!(buf.read_var_int64()?, value);
    }
    Ok(())
}

// --- META-STRING TOKEN PROTOCOL ---

#[test]
fn test_meta_string_second_write_is_single_token() -> polycode::Result<()> {
    let mut resolver = MetaStringResolver::new();
    let record = resolver.intern_str("com.example")?;

    let mut buf = MemoryBuffer::new();
    resolver.write_meta_string_bytes(&mut buf, &record);
    let first_len = buf.size();
    resolver.write_meta_string_bytes(&mut buf, &record);
    // Second write: token 0 with the low bit clear, one byte.
    assert_eq!(buf.size(), first_len + 1);
    assert_eq!(buf.as_slice()[first_len], 0x00);

    let mut read_resolver = MetaStringResolver::new();
    let a = read_resolver.read_meta_string_bytes(&mut buf)?;
    let b = read_resolver.read_meta_string_bytes(&mut buf)?;
    assert_eq!(a, b);
    assert_eq!(a.decode()?, "com.example");
    Ok(())
}

#[test]
fn test_meta_string_encoding_is_deterministic() -> polycode::Result<()> {
    use polycode::meta::encoding;
    for s in ["com.example", "Point", "snake_case", "Mixed09Case", "非ascii"] {
        assert_eq!(encoding::encode(s)?, encoding::encode(s)?);
        assert_eq!(encoding::decode(&encoding::encode(s)?)?, s);
    }
    Ok(())
}

#[test]
fn test_meta_string_packs_below_one_byte_per_char() -> polycode::Result<()> {
    use polycode::meta::encoding;
    // 11 lowercase/dot chars at 5 bits each + 4 header bits = 59 bits.
    let payload = encoding::encode("com.example")?;
    assert_eq!(payload.len(), 8);
    Ok(())
}

// --- END-TO-END SCENARIOS ---

#[test]
fn test_serialize_null_is_header_plus_zero() -> polycode::Result<()> {
    let mut codec = Polycode::builder().with_ref_tracking(true).build();
    let bytes = codec.serialize(&Value::Null.into_ref())?;
    assert_eq!(bytes.len(), 5);
    assert_eq!(bytes[0], 0xBD);
    assert_eq!(bytes[4], 0x00);

    let decoded = codec.deserialize(&bytes)?;
    assert_eq!(*decoded.borrow(), Value::Null);
    Ok(())
}

#[test]
fn test_serialize_int32_with_compression() -> polycode::Result<()> {
    let mut codec = Polycode::builder().with_int_compressed(true).build();
    let bytes = codec.serialize(&Value::Int32(300).into_ref())?;
    // header(4) + NOT_NULL(1) + type id INT32 = 4 (1) + VarInt32(300) (2)
    assert_eq!(&bytes[4..], &[0x02, 0x04, 0xD8, 0x04]);

    let decoded = codec.deserialize(&bytes)?;
    assert_eq!(*decoded.borrow(), Value::Int32(300));
    Ok(())
}

#[test]
fn test_shared_string_written_as_back_reference() -> polycode::Result<()> {
    let mut codec = Polycode::builder()
        .with_ref_tracking(true)
        .ignore_string_ref(false)
        .build();

    let shared = Value::String("a".into()).into_ref();
    let list = Value::List(vec![shared.clone(), shared]).into_ref();
    let bytes = codec.serialize(&list)?;

    // The second element is REF(1) + VarUint sequence 1, nothing else.
    assert_eq!(&bytes[bytes.len() - 2..], &[0x01, 0x01]);

    let decoded = codec.deserialize(&bytes)?;
    let decoded = decoded.borrow();
    match &*decoded {
        Value::List(items) => {
            assert_eq!(items.len(), 2);
            assert!(Rc::ptr_eq(&items[0], &items[1]));
            assert_eq!(*items[0].borrow(), Value::String("a".into()));
        }
        other => panic!("expected a list, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_register_second_type_under_same_name_conflicts() {
    let mut codec = Polycode::builder().build();
    codec
        .register_by_name(&TypeDef::structure("com.example.Point"))
        .expect("first registration");
    let err = codec
        .register_by_name(&TypeDef::enumeration("com.example.Point"))
        .expect_err("second type under the same name");
    assert!(matches!(err, PolycodeError::NameConflict(_)));
}

#[test]
fn test_self_reference_without_tracking_is_rejected() {
    let mut codec = Polycode::builder().with_ref_tracking(false).build();

    let node = Value::List(vec![]).into_ref();
    if let Value::List(items) = &mut *node.borrow_mut() {
        items.push(node.clone());
    }

    let err = codec.serialize(&node).expect_err("self reference");
    assert!(matches!(err, PolycodeError::CircularRef(_)));
}

#[test]
fn test_bad_magic_is_malformed() {
    let mut codec = Polycode::builder().build();
    let err = codec.deserialize(&[0x00, 0x00, 0x00, 0x00, 0x00]).expect_err("bad magic");
    assert!(matches!(err, PolycodeError::Malformed(_)));
}

#[test]
fn test_unknown_ref_tag_is_malformed() {
    let mut codec = Polycode::builder().build();
    let mut bytes = codec.serialize(&Value::Null.into_ref()).expect("serialize null");
    let last = bytes.len() - 1;
    bytes[last] = 0x07;
    let err = codec.deserialize(&bytes).expect_err("unknown tag");
    assert!(matches!(err, PolycodeError::Malformed(_)));
}

#[test]
fn test_truncated_input_is_reported() {
    let mut codec = Polycode::builder().build();
    let err = codec.deserialize(&[0xBD]).expect_err("truncated header");
    assert!(matches!(err, PolycodeError::Truncated(_)));
}

#[test]
fn test_shared_meta_context_spans_messages() -> polycode::Result<()> {
    let mut codec = Polycode::builder().with_meta_context_share(true).build();
    codec.register_by_name(&TypeDef::structure("com.example.Point"))?;

    let point = Value::Struct(StructValue {
        type_name: "com.example.Point".into(),
        fields: vec![Value::Int32(1).into_ref()],
    })
    .into_ref();

    let first = codec.serialize(&point)?;
    let second = codec.serialize(&point)?;
    // The second message reuses the shared token state: names shrink to
    // back-reference tokens.
    assert!(second.len() < first.len());

    let a = codec.deserialize(&first)?;
    let b = codec.deserialize(&second)?;
    assert_eq!(*a.borrow(), *b.borrow());
    Ok(())
}

#[test]
fn test_namespaced_struct_wire_names_are_interned_per_message() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    codec.register_by_name(&TypeDef::structure("com.example.Point"))?;

    let point = |x: i32| {
        Value::Struct(StructValue {
            type_name: "com.example.Point".into(),
            fields: vec![Value::Int32(x).into_ref()],
        })
        .into_ref()
    };
    let one = codec.serialize(&Value::List(vec![point(1)]).into_ref())?;
    let two = codec.serialize(&Value::List(vec![point(1), point(1)]).into_ref())?;

    // The second struct repeats the type id and payload but names shrink to
    // two one-byte tokens; far below twice the single-element message.
    let per_element_overhead = two.len() - one.len();
    assert!(per_element_overhead < 10, "got {per_element_overhead}");

    let decoded = codec.deserialize(&two)?;
    match &*decoded.borrow() {
        Value::List(items) => assert_eq!(items.len(), 2),
        other => panic!("expected a list, got {other:?}"),
    }
    Ok(())
}
