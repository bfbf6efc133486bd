#![allow(missing_docs)]

//! Graph round-trips: primitives, containers, user types, identity
//! preservation and the registration surface.

use std::rc::Rc;
use std::sync::Arc;

use polycode::serializer::{CopyContext, ReadContext, Serializer, TypeShape, WriteContext};
use polycode::value::{EnumValue, ExtValue, StructValue, Value};
use polycode::{LongEncoding, Polycode, PolycodeError, TypeDef};

// --- HELPERS ---

fn round_trip(codec: &mut Polycode, value: Value) -> polycode::Result<Value> {
    let bytes = codec.serialize(&value.clone().into_ref())?;
    let decoded = codec.deserialize(&bytes)?;
    let out = decoded.borrow().clone();
    Ok(out)
}

fn rect(width: i32, height: i32) -> Value {
    Value::Struct(StructValue {
        type_name: "demo.Rect".into(),
        fields: vec![Value::Int32(width).into_ref(), Value::Int32(height).into_ref()],
    })
}

// --- PRIMITIVES AND LEAVES ---

#[test]
fn test_primitive_round_trips() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    let values = vec![
        Value::Bool(true),
        Value::Bool(false),
        Value::Int8(-5),
        Value::Int16(-300),
        Value::Int32(i32::MIN),
        Value::Int32(i32::MAX),
        Value::Int64(i64::MIN),
        Value::Int64(i64::MAX),
        Value::Float32(3.5),
        Value::Float64(-2.25),
        Value::String(String::new()),
        Value::String("héllo wörld".into()),
        Value::Binary(vec![0, 1, 2, 255]),
        Value::Duration(-1_000_000_007),
        Value::Timestamp(1_700_000_000_000_000_000),
        Value::LocalDate(19_722),
        Value::Decimal {
            unscaled: vec![0x01, 0x23, 0x45],
            scale: 6,
        },
    ];
    for value in values {
        assert_eq!(round_trip(&mut codec, value.clone())?, value);
    }
    Ok(())
}

#[test]
fn test_typed_array_round_trips() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    let values = vec![
        Value::BoolArray(vec![true, false, true]),
        Value::Int16Array(vec![-1, 0, 1, i16::MAX]),
        Value::Int32Array((-5..5).collect()),
        Value::Int64Array(vec![i64::MIN, 0, i64::MAX]),
        Value::Float32Array(vec![0.5, -0.5]),
        Value::Float64Array(vec![1.0, f64::MAX]),
    ];
    for value in values {
        assert_eq!(round_trip(&mut codec, value.clone())?, value);
    }
    Ok(())
}

#[test]
fn test_long_encoding_variants() -> polycode::Result<()> {
    for encoding in [LongEncoding::Sli, LongEncoding::Pvl, LongEncoding::LeRawBytes] {
        let mut codec = Polycode::builder().with_long_encoding(encoding).build();
        for v in [0i64, 1, -1, 1 << 29, 1 << 45, i64::MIN, i64::MAX] {
            assert_eq!(round_trip(&mut codec, Value::Int64(v))?, Value::Int64(v));
        }
    }
    Ok(())
}

#[test]
fn test_uncompressed_int_round_trip() -> polycode::Result<()> {
    let mut codec = Polycode::builder().with_int_compressed(false).build();
    for v in [0, 300, -300, i32::MIN, i32::MAX] {
        assert_eq!(round_trip(&mut codec, Value::Int32(v))?, Value::Int32(v));
    }
    Ok(())
}

// --- CONTAINERS ---

#[test]
fn test_nested_container_round_trip() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    let inner = Value::List(vec![
        Value::Int32(1).into_ref(),
        Value::String("two".into()).into_ref(),
        Value::Null.into_ref(),
    ]);
    let map = Value::Map(vec![
        (
            Value::String("key".into()).into_ref(),
            inner.clone().into_ref(),
        ),
        (
            Value::Int32(7).into_ref(),
            Value::Set(vec![Value::Bool(true).into_ref()]).into_ref(),
        ),
    ]);
    assert_eq!(round_trip(&mut codec, map.clone())?, map);
    Ok(())
}

#[test]
fn test_shared_reference_identity_preserved() -> polycode::Result<()> {
    let mut codec = Polycode::builder().with_ref_tracking(true).build();

    let shared = Value::List(vec![Value::Int32(42).into_ref()]).into_ref();
    let root = Value::List(vec![shared.clone(), shared]).into_ref();

    let bytes = codec.serialize(&root)?;
    let decoded = codec.deserialize(&bytes)?;
    match &*decoded.borrow() {
        Value::List(items) => {
            assert_eq!(items.len(), 2);
            assert!(Rc::ptr_eq(&items[0], &items[1]));
        }
        other => panic!("expected a list, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_two_node_cycle_round_trip() -> polycode::Result<()> {
    let mut codec = Polycode::builder().with_ref_tracking(true).build();

    // a.next = b; b.next = a
    let a = Value::List(vec![]).into_ref();
    let b = Value::List(vec![a.clone()]).into_ref();
    if let Value::List(items) = &mut *a.borrow_mut() {
        items.push(b.clone());
    }

    let bytes = codec.serialize(&a)?;
    let decoded_a = codec.deserialize(&bytes)?;

    let decoded_b = match &*decoded_a.borrow() {
        Value::List(items) => items[0].clone(),
        other => panic!("expected a list, got {other:?}"),
    };
    match &*decoded_b.borrow() {
        Value::List(items) => assert!(Rc::ptr_eq(&items[0], &decoded_a)),
        other => panic!("expected a list, got {other:?}"),
    }
    Ok(())
}

// --- USER TYPES ---

#[test]
fn test_struct_registered_by_id_round_trip() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    codec.register_with_id(&TypeDef::structure("demo.Rect"), 100)?;
    let value = rect(640, 480);
    assert_eq!(round_trip(&mut codec, value.clone())?, value);
    Ok(())
}

#[test]
fn test_struct_registered_by_name_round_trip() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    codec.register_by_name(&TypeDef::structure("demo.Rect"))?;
    let value = rect(1, 2);
    assert_eq!(round_trip(&mut codec, value.clone())?, value);
    Ok(())
}

#[test]
fn test_enum_round_trip() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    codec.register(&TypeDef::enumeration("demo.Color"))?;
    let value = Value::Enum(EnumValue {
        type_name: "demo.Color".into(),
        ordinal: 2,
    });
    assert_eq!(round_trip(&mut codec, value.clone())?, value);
    Ok(())
}

#[test]
fn test_auto_ids_start_at_64_and_skip_taken_ids() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    codec.register_with_id(&TypeDef::structure("demo.A"), 64)?;
    codec.register_with_id(&TypeDef::structure("demo.C"), 66)?;
    assert_eq!(codec.register(&TypeDef::structure("demo.B"))?, 65);
    assert_eq!(codec.register(&TypeDef::structure("demo.D"))?, 67);
    Ok(())
}

#[test]
fn test_registration_errors() {
    let mut codec = Polycode::builder().build();
    assert!(matches!(
        codec.register_with_id(&TypeDef::structure("demo.A"), 4096),
        Err(PolycodeError::IdOverflow(_))
    ));
    codec
        .register_with_id(&TypeDef::structure("demo.A"), 70)
        .expect("first registration");
    assert!(matches!(
        codec.register_with_id(&TypeDef::structure("demo.B"), 70),
        Err(PolycodeError::IdReused(_))
    ));
    assert!(matches!(
        codec.register_with_id(&TypeDef::structure("demo.A"), 71),
        Err(PolycodeError::IdReused(_))
    ));
    assert!(matches!(
        codec.register_by_name(&TypeDef::structure_in("demo", "Has.Dot")),
        Err(PolycodeError::InvalidTypeName(_))
    ));
}

#[test]
fn test_unregistered_struct_fails_serialization() {
    let mut codec = Polycode::builder().build();
    let err = codec
        .serialize(&rect(1, 1).into_ref())
        .expect_err("unregistered type");
    assert!(matches!(err, PolycodeError::UnregisteredType(_)));
}

#[test]
fn test_placeholder_fabrication_preserves_fields() -> polycode::Result<()> {
    let mut writer = Polycode::builder().build();
    writer.register_by_name(&TypeDef::structure("com.example.Point"))?;
    let value = Value::Struct(StructValue {
        type_name: "com.example.Point".into(),
        fields: vec![Value::Int32(3).into_ref(), Value::Int32(4).into_ref()],
    });
    let bytes = writer.serialize(&value.clone().into_ref())?;

    // A receiver that never registered Point but allows fabrication.
    let mut reader = Polycode::builder()
        .with_deserialize_unexistent_class(true)
        .build();
    let decoded = reader.deserialize(&bytes)?;
    match &*decoded.borrow() {
        Value::Struct(s) => {
            assert_eq!(&*s.type_name, "com.example.Point");
            assert_eq!(*s.fields[0].borrow(), Value::Int32(3));
            assert_eq!(*s.fields[1].borrow(), Value::Int32(4));
        }
        other => panic!("expected a placeholder struct, got {other:?}"),
    }

    // Without fabrication the same stream is rejected.
    let mut strict = Polycode::builder().build();
    assert!(matches!(
        strict.deserialize(&bytes),
        Err(PolycodeError::UnregisteredType(_))
    ));
    Ok(())
}

#[test]
fn test_type_checker_rejects_fabrication() -> polycode::Result<()> {
    let mut writer = Polycode::builder().build();
    writer.register_by_name(&TypeDef::structure("com.example.Point"))?;
    let bytes = writer.serialize(&rect_named("com.example.Point").into_ref())?;

    let mut reader = Polycode::builder()
        .with_deserialize_unexistent_class(true)
        .build();
    reader.set_type_checker(Box::new(|name| !name.starts_with("com.example")));
    assert!(matches!(
        reader.deserialize(&bytes),
        Err(PolycodeError::PolicyViolation(_))
    ));
    Ok(())
}

fn rect_named(name: &str) -> Value {
    Value::Struct(StructValue {
        type_name: name.into(),
        fields: vec![Value::Int32(0).into_ref()],
    })
}

// --- EXTENSION TYPES ---

/// Pass-through extension serializer used by the tests below.
struct BlobExtSerializer {
    type_name: Arc<str>,
}

impl Serializer for BlobExtSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> polycode::Result<()> {
        match value {
            Value::Ext(e) => {
                ctx.buffer.write_var_uint32(e.data.len() as u32);
                ctx.buffer.write_bytes(&e.data);
                Ok(())
            }
            other => Err(PolycodeError::Internal(format!("not an ext value: {other:?}"))),
        }
    }

    fn read(&self, ctx: &mut ReadContext<'_>) -> polycode::Result<Value> {
        let len = ctx.buffer.read_var_uint32()? as usize;
        Ok(Value::Ext(ExtValue {
            type_name: self.type_name.clone(),
            data: ctx.buffer.read_bytes(len)?,
        }))
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> polycode::Result<Value> {
        Ok(value.clone())
    }

    fn shape(&self) -> TypeShape {
        TypeShape::Ext
    }
}

#[test]
fn test_ext_without_serializer_is_rejected() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    codec.register_by_name(&TypeDef::extension("demo.Blob"))?;
    let value = Value::Ext(ExtValue {
        type_name: "demo.Blob".into(),
        data: vec![1, 2, 3],
    });
    let err = codec.serialize(&value.into_ref()).expect_err("no serializer");
    assert!(matches!(err, PolycodeError::UnregisteredSerializer(_)));
    Ok(())
}

#[test]
fn test_ext_with_user_serializer_round_trips() -> polycode::Result<()> {
    let mut codec = Polycode::builder().build();
    codec.register_by_name(&TypeDef::extension("demo.Blob"))?;
    codec.register_serializer(
        "demo.Blob",
        Arc::new(BlobExtSerializer {
            type_name: "demo.Blob".into(),
        }),
    )?;
    let value = Value::Ext(ExtValue {
        type_name: "demo.Blob".into(),
        data: vec![9, 8, 7, 6],
    });
    assert_eq!(round_trip(&mut codec, value.clone())?, value);
    Ok(())
}

#[test]
fn test_register_serializer_requires_registration() {
    let mut codec = Polycode::builder().build();
    let err = codec
        .register_serializer(
            "demo.Blob",
            Arc::new(BlobExtSerializer {
                type_name: "demo.Blob".into(),
            }),
        )
        .expect_err("not registered");
    assert!(matches!(err, PolycodeError::UnregisteredType(_)));
}

// --- VERSION CHECK AND COMPATIBLE MODE ---

#[test]
fn test_version_hash_emitted_only_when_checking() -> polycode::Result<()> {
    let mut plain = Polycode::builder().build();
    plain.register_by_name(&TypeDef::structure("demo.Rect"))?;
    let without = plain.serialize(&rect(1, 2).into_ref())?;

    let mut checked = Polycode::builder().with_class_version_check(true).build();
    checked.register_by_name(&TypeDef::structure("demo.Rect"))?;
    let with = checked.serialize(&rect(1, 2).into_ref())?;

    assert_eq!(with.len(), without.len() + 4);
    let decoded = checked.deserialize(&with)?;
    assert_eq!(*decoded.borrow(), rect(1, 2));
    Ok(())
}

#[test]
fn test_compatible_mode_suppresses_version_hash() -> polycode::Result<()> {
    use polycode::CompatibleMode;
    let mut codec = Polycode::builder()
        .with_compatible_mode(CompatibleMode::Compatible)
        .with_class_version_check(true) // forced off by compatible mode
        .build();
    codec.register_by_name(&TypeDef::structure("demo.Rect"))?;
    assert!(!codec.config().check_class_version);
    let value = rect(3, 4);
    assert_eq!(round_trip(&mut codec, value.clone())?, value);
    Ok(())
}

// --- DEEP COPY ---

#[test]
fn test_copy_preserves_sharing_and_cycles() -> polycode::Result<()> {
    let mut codec = Polycode::builder().with_ref_tracking(true).build();
    codec.register_by_name(&TypeDef::structure("demo.Rect"))?;

    let shared = Value::Int32(9).into_ref();
    let a = Value::List(vec![shared.clone(), shared]).into_ref();
    if let Value::List(items) = &mut *a.borrow_mut() {
        let self_ref = a.clone();
        items.push(self_ref);
    }

    let copy = codec.copy(&a)?;
    assert!(!Rc::ptr_eq(&copy, &a));
    match &*copy.borrow() {
        Value::List(items) => {
            assert!(Rc::ptr_eq(&items[0], &items[1]));
            assert!(!Rc::ptr_eq(&items[0], &{
                let orig = a.borrow();
                match &*orig {
                    Value::List(orig_items) => orig_items[0].clone(),
                    _ => unreachable!(),
                }
            }));
            assert!(Rc::ptr_eq(&items[2], &copy));
        }
        other => panic!("expected a list, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_copy_is_deep() -> polycode::Result<()> {
    let codec = Polycode::builder().build();
    let inner = Value::Int32(1).into_ref();
    let original = Value::List(vec![inner.clone()]).into_ref();

    let copy = codec.copy(&original)?;
    *inner.borrow_mut() = Value::Int32(2);

    match &*copy.borrow() {
        Value::List(items) => assert_eq!(*items[0].borrow(), Value::Int32(1)),
        other => panic!("expected a list, got {other:?}"),
    }
    Ok(())
}

// --- VALUE-REF SUPPRESSION FLAGS ---

#[test]
fn test_basic_ref_tracking_can_be_enabled() -> polycode::Result<()> {
    let mut codec = Polycode::builder()
        .with_ref_tracking(true)
        .ignore_basic_types_ref(false)
        .build();

    let shared = Value::Int32(5).into_ref();
    let root = Value::List(vec![shared.clone(), shared]).into_ref();
    let bytes = codec.serialize(&root)?;
    let decoded = codec.deserialize(&bytes)?;
    match &*decoded.borrow() {
        Value::List(items) => assert!(Rc::ptr_eq(&items[0], &items[1])),
        other => panic!("expected a list, got {other:?}"),
    }
    Ok(())
}
