#![allow(missing_docs)]

//! Property-based round-trip checks for the variable-length encodings and
//! the meta-string codec.

use proptest::prelude::*;

use polycode::buffer::MemoryBuffer;
use polycode::meta::encoding;
use polycode::value::Value;
use polycode::Polycode;

proptest! {
    #[test]
    fn prop_var_uint32_round_trips(value: u32) {
        let mut buf = MemoryBuffer::new();
        buf.write_var_uint32(value);
        prop_assert!(buf.size() <= 5);
        prop_assert_eq!(buf.read_var_uint32().unwrap(), value);
    }

    #[test]
    fn prop_var_uint64_round_trips(value: u64) {
        let mut buf = MemoryBuffer::new();
        buf.write_var_uint64(value);
        prop_assert!(buf.size() <= 10);
        prop_assert_eq!(buf.read_var_uint64().unwrap(), value);
    }

    #[test]
    fn prop_var_int32_round_trips(value: i32) {
        let mut buf = MemoryBuffer::new();
        buf.write_var_int32(value);
        prop_assert_eq!(buf.read_var_int32().unwrap(), value);
    }

    #[test]
    fn prop_var_int64_round_trips(value: i64) {
        let mut buf = MemoryBuffer::new();
        buf.write_var_int64(value);
        prop_assert_eq!(buf.read_var_int64().unwrap(), value);
    }

    #[test]
    fn prop_sli_int64_round_trips(value: i64) {
        let mut buf = MemoryBuffer::new();
        buf.write_sli_int64(value);
        let in_small_range = (-(1i64 << 30)..(1i64 << 30)).contains(&value);
        prop_assert_eq!(buf.size(), if in_small_range { 4 } else { 9 });
        prop_assert_eq!(buf.read_sli_int64().unwrap(), value);
    }

    #[test]
    fn prop_identifier_meta_strings_round_trip(s in "[a-zA-Z0-9_.$]{0,48}") {
        let payload = encoding::encode(&s).unwrap();
        prop_assert_eq!(encoding::decode(&payload).unwrap(), s);
    }

    #[test]
    fn prop_arbitrary_meta_strings_round_trip(s in "\\PC{0,32}") {
        let payload = encoding::encode(&s).unwrap();
        prop_assert_eq!(encoding::decode(&payload).unwrap(), s);
    }

    #[test]
    fn prop_meta_string_encoding_is_stable(s in "[a-zA-Z0-9_.$|]{0,48}") {
        prop_assert_eq!(encoding::encode(&s).unwrap(), encoding::encode(&s).unwrap());
    }

    #[test]
    fn prop_string_values_round_trip(s in "\\PC{0,64}") {
        let mut codec = Polycode::builder().build();
        let bytes = codec.serialize(&Value::String(s.clone()).into_ref()).unwrap();
        let decoded = codec.deserialize(&bytes).unwrap();
        prop_assert_eq!(&*decoded.borrow(), &Value::String(s));
    }

    #[test]
    fn prop_int64_round_trips_under_every_encoding(value: i64) {
        for encoding in [
            polycode::LongEncoding::Sli,
            polycode::LongEncoding::Pvl,
            polycode::LongEncoding::LeRawBytes,
        ] {
            let mut codec = Polycode::builder().with_long_encoding(encoding).build();
            let bytes = codec.serialize(&Value::Int64(value).into_ref()).unwrap();
            let decoded = codec.deserialize(&bytes).unwrap();
            prop_assert_eq!(&*decoded.borrow(), &Value::Int64(value));
        }
    }
}
