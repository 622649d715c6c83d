//! Decodes a stream of MessagePack records that arrives in arbitrary network
//! chunks, reacting to every record as soon as its last byte is in.
//!
//! Each record is a map `{"sensor": str, "reading": float, "flags": [bool]}`.
//! Chunk boundaries deliberately fall inside headers, inside string payloads
//! and inside the 8-byte float, so most chunks complete nothing and the
//! records surface only once their final byte has arrived.
//!
//! Run with
//!
//! ```bash
//! cargo run -p msgmodem --example chunked_stream
//! ```

use msgmodem::{StreamingUnpacker, Value};

fn record(sensor: &str, reading: f64, flags: &[bool]) -> Vec<u8> {
    let mut out = vec![0x83, 0xa6];
    out.extend_from_slice(b"sensor");
    out.push(0xa0 | u8::try_from(sensor.len()).unwrap());
    out.extend_from_slice(sensor.as_bytes());
    out.push(0xa7);
    out.extend_from_slice(b"reading");
    out.push(0xcb);
    out.extend_from_slice(&reading.to_be_bytes());
    out.push(0xa5);
    out.extend_from_slice(b"flags");
    out.push(0x90 | u8::try_from(flags.len()).unwrap());
    out.extend(flags.iter().map(|&f| if f { 0xc3 } else { 0xc2 }));
    out
}

fn main() {
    let mut wire = Vec::new();
    wire.extend(record("boiler", 71.5, &[true]));
    wire.extend(record("pump-2", -3.25, &[]));
    wire.extend(record("intake", 12.0, &[false, true]));

    let mut unpacker = StreamingUnpacker::new();
    let mut log = String::from("\n");

    // uneven chunk sizes, as a socket would deliver them
    let mut rest = wire.as_slice();
    for size in [3, 11, 1, 17, 40, 2, 9, usize::MAX] {
        let (chunk, tail) = rest.split_at(size.min(rest.len()));
        rest = tail;

        unpacker
            .feed_each(chunk, |value| {
                let sensor = value.get(&Value::from("sensor")).and_then(Value::as_str);
                let reading = value.get(&Value::from("reading")).and_then(Value::as_f64);
                println!("{sensor:?} -> {reading:?}");
                log.push_str(&format!("{value}\n"));
            })
            .expect("stream is well-formed");
        log.push_str(&format!("-- fed {} bytes, {} waiting\n", chunk.len(), unpacker.remaining()));
    }

    #[cfg(not(miri))]
    insta::assert_snapshot!(log, @r#"
    -- fed 3 bytes, 3 waiting
    -- fed 11 bytes, 14 waiting
    -- fed 1 bytes, 15 waiting
    -- fed 17 bytes, 32 waiting
    {"sensor": "boiler", "reading": 71.5, "flags": [true]}
    -- fed 40 bytes, 32 waiting
    -- fed 2 bytes, 34 waiting
    {"sensor": "pump-2", "reading": -3.25, "flags": []}
    -- fed 9 bytes, 4 waiting
    {"sensor": "intake", "reading": 12.0, "flags": [false, true]}
    -- fed 37 bytes, 0 waiting
    "#);
}
