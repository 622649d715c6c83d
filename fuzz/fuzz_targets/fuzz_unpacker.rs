#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use msgmodem::{StreamingUnpacker, UnpackerOptions};

#[derive(Arbitrary, Debug)]
struct Input {
    /// Chunk sizes; the tail of the input after the last split is fed whole.
    splits: Vec<u16>,
    array_size_limit: u16,
    raw_size_limit: u16,
    depth_limit: u8,
    bytes: Vec<u8>,
}

/// Everything the unpacker reports for a stream: each value's debug form, in
/// order, then the error if decoding stopped on one.
fn drain(unpacker: &mut StreamingUnpacker, out: &mut Vec<String>) -> bool {
    loop {
        match unpacker.next_value() {
            Ok(Some(value)) => out.push(format!("{value:?}")),
            Ok(None) => return true,
            Err(e) => {
                out.push(format!("error: {e}"));
                return false;
            }
        }
    }
}

fn unpack(input: &Input) {
    let options = UnpackerOptions {
        array_size_limit: usize::from(input.array_size_limit),
        map_size_limit: usize::from(input.array_size_limit),
        raw_size_limit: usize::from(input.raw_size_limit),
        depth_limit: usize::from(input.depth_limit),
    };

    let mut whole = StreamingUnpacker::with_options(options);
    whole.feed(&input.bytes);
    let mut expected = Vec::new();
    drain(&mut whole, &mut expected);

    let mut chunked = StreamingUnpacker::with_options(options);
    let mut actual = Vec::new();
    let mut rest = input.bytes.as_slice();
    let mut healthy = true;
    for &size in &input.splits {
        if rest.is_empty() || !healthy {
            break;
        }
        let (chunk, tail) = rest.split_at(usize::from(size).min(rest.len()));
        rest = tail;
        chunked.feed(chunk);
        healthy = drain(&mut chunked, &mut actual);
    }
    if healthy {
        chunked.feed(rest);
        drain(&mut chunked, &mut actual);
    }

    assert_eq!(expected, actual, "chunking changed the decoded stream");
    if healthy {
        assert_eq!(whole.buffered(), chunked.buffered());
    }
}

fuzz_target!(|input: Input| unpack(&input));
