use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use core::convert::Infallible;

use tracing_test::traced_test;

use crate::{
    Integer, StreamingUnpacker, UnpackerOptions, Value, ValueFactory,
    tests::encode::{encode, encode_all},
};

#[test]
fn split_array_surfaces_after_last_chunk() {
    let mut unpacker = StreamingUnpacker::new();
    let mut seen = Vec::new();

    unpacker.feed_each(&[0x92, 0x01], |v| seen.push(v)).unwrap();
    assert!(seen.is_empty());
    assert_eq!(unpacker.remaining(), 2);

    unpacker
        .feed_each(&[0xa2, b'a', b'b'], |v| seen.push(v))
        .unwrap();
    assert_eq!(
        seen,
        [Value::Array(vec![Value::from(1_u8), Value::from("ab")])]
    );
    assert_eq!(unpacker.remaining(), 0);
}

#[test]
fn values_come_out_in_order_with_trailing_partial() {
    let mut unpacker = StreamingUnpacker::new();
    unpacker.feed(&[0x01, 0xc3, 0xa3, b'x']);

    let values: Vec<Value> = unpacker.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(values, [Value::from(1_u8), Value::Boolean(true)]);
    assert_eq!(unpacker.buffered(), [0xa3, b'x']);

    unpacker.feed(b"yz");
    assert_eq!(unpacker.next_value().unwrap(), Some(Value::from("xyz")));
    assert_eq!(unpacker.next_value().unwrap(), None);
}

#[test]
fn empty_feed_is_a_no_op() {
    let mut unpacker = StreamingUnpacker::new();
    unpacker.feed(&[]);
    assert_eq!(unpacker.remaining(), 0);
    assert!(!unpacker.has_next().unwrap());
    assert_eq!(unpacker.next_value().unwrap(), None);

    unpacker.feed(&[0x91]);
    unpacker.feed(&[]);
    assert_eq!(unpacker.buffered(), [0x91]);
}

#[test]
fn for_each_chains() {
    let mut unpacker = StreamingUnpacker::new();
    let mut count = 0;
    unpacker
        .feed_each(&[0xc0, 0xc0], |_| count += 1)
        .unwrap()
        .feed_each(&[0xc0], |_| count += 1)
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn reset_drops_partial_value() {
    let mut unpacker = StreamingUnpacker::new();
    unpacker.feed(&[0x01, 0x92, 0x01]);
    assert_eq!(unpacker.next_value().unwrap(), Some(Value::from(1_u8)));

    unpacker.reset();
    assert_eq!(unpacker.remaining(), 0);

    // the old partial array must not absorb new bytes
    unpacker.feed(&[0x02]);
    assert_eq!(unpacker.next_value().unwrap(), Some(Value::from(2_u8)));
}

#[test]
fn reset_drops_complete_values() {
    let mut unpacker = StreamingUnpacker::new();
    unpacker.feed(&[0x01, 0x02]);
    unpacker.reset();

    let mut seen = Vec::new();
    unpacker.for_each(|v| seen.push(v)).unwrap();
    assert!(seen.is_empty());
    assert_eq!(unpacker.remaining(), 0);
}

#[test]
fn reset_restarts_offsets() {
    let mut unpacker = StreamingUnpacker::new();
    unpacker.feed(&[0x01, 0x02, 0x03]);
    while unpacker.next_value().unwrap().is_some() {}

    unpacker.reset().feed(&[0xc1]);
    assert_eq!(unpacker.next_value().unwrap_err().offset(), 0);
}

#[test]
fn iterator_stops_after_error() {
    let mut unpacker = StreamingUnpacker::new();
    unpacker.feed(&[0xc0, 0xc1, 0xc0]);

    let mut iter = unpacker.iter();
    assert_eq!(iter.next().unwrap().unwrap(), Value::Nil);
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn options_are_kept() {
    let options = UnpackerOptions {
        map_size_limit: 7,
        ..UnpackerOptions::default()
    };
    let unpacker = StreamingUnpacker::with_options(options);
    assert_eq!(*unpacker.options(), options);
    assert_eq!(*StreamingUnpacker::new().options(), UnpackerOptions::default());
}

#[test]
fn long_stream_survives_compaction() {
    let values: Vec<Value> = (0..5_000_u32)
        .map(|i| Value::Array(vec![Value::from(i), Value::from("payload")]))
        .collect();
    let bytes = encode_all(&values);

    let mut unpacker = StreamingUnpacker::new();
    let mut out = Vec::new();
    for chunk in bytes.chunks(37) {
        unpacker.feed_each(chunk, |v| out.push(v)).unwrap();
    }
    assert_eq!(out, values);
    assert_eq!(unpacker.remaining(), 0);
}

#[test]
fn large_binary_in_small_chunks() {
    let value = Value::Binary((0..=255).cycle().take(70_000).collect());
    let bytes = encode(&value);
    assert_eq!(bytes[0], 0xc6);

    let mut unpacker = StreamingUnpacker::new();
    let mut out = Vec::new();
    for chunk in bytes.chunks(1_000) {
        unpacker.feed_each(chunk, |v| out.push(v)).unwrap();
    }
    assert_eq!(out, [value]);
}

/// Counts how many scalar values the decoder asks for.
#[derive(Default)]
struct CountingFactory {
    scalars: usize,
}

impl ValueFactory for CountingFactory {
    type Value = ();
    type Array = ();
    type Map = ();
    type Error = Infallible;

    fn new_nil(&mut self) -> Result<(), Infallible> {
        self.scalars += 1;
        Ok(())
    }
    fn new_bool(&mut self, _: bool) -> Result<(), Infallible> {
        self.scalars += 1;
        Ok(())
    }
    fn new_integer(&mut self, _: Integer) -> Result<(), Infallible> {
        self.scalars += 1;
        Ok(())
    }
    fn new_float(&mut self, _: f64) -> Result<(), Infallible> {
        self.scalars += 1;
        Ok(())
    }
    fn new_str(&mut self, _: &[u8]) -> Result<(), Infallible> {
        self.scalars += 1;
        Ok(())
    }
    fn new_binary(&mut self, _: &[u8]) -> Result<(), Infallible> {
        self.scalars += 1;
        Ok(())
    }
    fn new_ext(&mut self, _: i8, _: &[u8]) -> Result<(), Infallible> {
        self.scalars += 1;
        Ok(())
    }
    fn new_array(&mut self, _: usize) -> Result<(), Infallible> {
        Ok(())
    }
    fn push_array(&mut self, _: &mut (), _: ()) -> Result<(), Infallible> {
        Ok(())
    }
    fn build_from_array(&mut self, _: ()) -> Result<(), Infallible> {
        Ok(())
    }
    fn new_map(&mut self, _: usize) -> Result<(), Infallible> {
        Ok(())
    }
    fn insert_map(&mut self, _: &mut (), _: (), _: ()) -> Result<(), Infallible> {
        Ok(())
    }
    fn build_from_map(&mut self, _: ()) -> Result<(), Infallible> {
        Ok(())
    }
}

#[test]
fn factory_is_not_called_for_incomplete_values() {
    let mut unpacker = StreamingUnpacker::new();
    let mut factory = CountingFactory::default();

    unpacker.feed(&[0x93, 0x01, 0x02]);
    assert_eq!(unpacker.next_value_with(&mut factory).unwrap(), None);
    assert_eq!(factory.scalars, 0);

    unpacker.feed(&[0x03]);
    assert_eq!(unpacker.next_value_with(&mut factory).unwrap(), Some(()));
    assert_eq!(factory.scalars, 3);
}

#[test]
fn raised_depth_limit_builds_deep_nesting() {
    let mut unpacker = StreamingUnpacker::with_options(UnpackerOptions {
        depth_limit: usize::MAX,
        ..Default::default()
    });
    let mut bytes = vec![0x91; 200_000];
    bytes.push(0xc0);
    unpacker.feed(&bytes);

    let mut factory = CountingFactory::default();
    assert_eq!(unpacker.next_value_with(&mut factory).unwrap(), Some(()));
    assert_eq!(factory.scalars, 1);
    assert_eq!(unpacker.remaining(), 0);
}

#[test]
fn iter_with_custom_factory() {
    let mut unpacker = StreamingUnpacker::new();
    unpacker.feed(&[0xc0, 0x81, 0x01, 0x02, 0x90]);
    assert_eq!(unpacker.iter_with(CountingFactory::default()).count(), 3);
}

#[test]
#[traced_test]
fn decode_progress_is_traced() {
    let mut unpacker = StreamingUnpacker::new();
    unpacker.feed(&[0x01, 0x92]);
    assert!(unpacker.next_value().unwrap().is_some());
    assert!(unpacker.next_value().unwrap().is_none());
    unpacker.feed(&[0xc1]);
    assert!(unpacker.next_value().is_err());
    unpacker.reset();

    assert!(logs_contain("unpacked value"));
    assert!(logs_contain("waiting for more input"));
    assert!(logs_contain("malformed input"));
    assert!(logs_contain("reset"));
}
