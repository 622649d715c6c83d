//! Decoding of one complete value from a byte slice.
//!
//! A decode attempt makes two passes over the input. The measure pass walks
//! headers with an explicit stack, enforces every configured limit and finds
//! the exact length of the first value, without allocating per element and
//! without calling the factory. Only when the whole value is present does the
//! build pass hand it to the [`ValueFactory`]. Incomplete input is therefore
//! free to retry: nothing was built, and nothing needs to be rolled back.

use alloc::vec::Vec;

use crate::{
    DecodeError, ErrorSource, LimitKind, UnpackError, UnpackerOptions,
    factory::{StdFactory, ValueFactory},
    marker::{Header, Marker},
    value::Value,
};

/// Outcome of a decode attempt that did not hit malformed input.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<V> {
    /// A whole value, and the number of bytes it was encoded in.
    Complete(V, usize),
    /// The input ends inside the first value.
    Incomplete,
}

/// A decode error located at `offset` within the decoder input.
#[derive(Debug)]
struct Malformed {
    error: DecodeError,
    offset: usize,
}

impl Malformed {
    fn into_unpack_error<E>(self) -> UnpackError<E> {
        UnpackError::new(ErrorSource::Decode(self.error), self.offset)
    }
}

/// Stateless MessagePack value decoder.
///
/// Offsets in the errors it returns are relative to the start of the input
/// slice.
///
/// ```
/// use msgmodem::{Decoded, Decoder, Value};
///
/// let decoder = Decoder::default();
/// assert_eq!(decoder.decode(&[0x92, 0x01]).unwrap(), Decoded::Incomplete);
/// assert_eq!(
///     decoder.decode(&[0x91, 0xc3, 0xc0]).unwrap(),
///     Decoded::Complete(Value::Array(vec![Value::Boolean(true)]), 2)
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: UnpackerOptions,
}

impl Decoder {
    /// Creates a decoder enforcing the limits in `options`.
    #[must_use]
    pub fn new(options: UnpackerOptions) -> Self {
        Self { options }
    }

    /// The limits this decoder enforces.
    #[must_use]
    pub fn options(&self) -> &UnpackerOptions {
        &self.options
    }

    /// Decodes the first value of `input` into a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or exceeds a limit.
    pub fn decode(&self, input: &[u8]) -> Result<Decoded<Value>, UnpackError> {
        self.decode_one(input, &mut StdFactory)
    }

    /// Decodes the first value of `input` through `factory`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed, exceeds a limit, or the
    /// factory fails.
    pub fn decode_one<F: ValueFactory>(
        &self,
        input: &[u8],
        factory: &mut F,
    ) -> Result<Decoded<F::Value>, UnpackError<F::Error>> {
        let len = match self.measure_value(input) {
            Ok(Some(len)) => len,
            Ok(None) => return Ok(Decoded::Incomplete),
            Err(e) => return Err(e.into_unpack_error()),
        };
        let input = &input[..len];
        let value = self.build(input, factory);
        #[cfg(any(test, feature = "fuzzing"))]
        if let Err(e) = &value {
            assert!(
                e.decode_error() != Some(&DecodeError::Truncated),
                "measured a value the build pass could not read"
            );
        }
        let (value, pos) = value?;
        debug_assert_eq!(pos, len, "build and measure disagree");
        Ok(Decoded::Complete(value, len))
    }

    /// Returns the encoded length of the first value of `input`, or `None` if
    /// the input ends inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or exceeds a limit.
    pub fn measure(&self, input: &[u8]) -> Result<Option<usize>, UnpackError> {
        self.measure_value(input)
            .map_err(Malformed::into_unpack_error)
    }

    /// Reads the header at `pos`: the header, and its length including the
    /// marker. `Ok(None)` if the input ends inside the header.
    fn read_header(&self, input: &[u8], pos: usize) -> Result<Option<(Header, usize)>, Malformed> {
        let Some(&byte) = input.get(pos) else {
            return Ok(None);
        };
        let malformed = |error| Malformed { error, offset: pos };
        let marker = Marker::from_u8(byte).ok_or_else(|| malformed(DecodeError::InvalidMarker(byte)))?;
        let Some((header, len)) = Header::read(marker, &input[pos + 1..]) else {
            return Ok(None);
        };

        let (kind, declared, limit) = match header {
            Header::Array(n) => (LimitKind::Array, n, self.options.array_size_limit),
            Header::Map(n) => (LimitKind::Map, n, self.options.map_size_limit),
            Header::Str(n) | Header::Bin(n) | Header::Ext(_, n) => {
                (LimitKind::Raw, n, self.options.raw_size_limit)
            }
            _ => return Ok(Some((header, len + 1))),
        };
        if declared > limit {
            return Err(malformed(DecodeError::SizeLimitExceeded {
                kind,
                declared,
                limit,
            }));
        }
        Ok(Some((header, len + 1)))
    }

    fn measure_value(&self, input: &[u8]) -> Result<Option<usize>, Malformed> {
        let mut pos = 0;
        // values still expected by each open container, innermost last
        let mut open: Vec<usize> = Vec::new();
        loop {
            let start = pos;
            let Some((header, header_len)) = self.read_header(input, pos)? else {
                return Ok(None);
            };
            pos += header_len;
            let payload = header.payload_len();
            if input.len() - pos < payload {
                return Ok(None);
            }
            pos += payload;

            let children = match header {
                Header::Array(n) => Some(n),
                Header::Map(n) => Some(n.saturating_mul(2)),
                _ => None,
            };
            if let Some(children) = children {
                if open.len() >= self.options.depth_limit {
                    return Err(Malformed {
                        error: DecodeError::DepthLimitExceeded(self.options.depth_limit),
                        offset: start,
                    });
                }
                if children > 0 {
                    open.push(children);
                    continue;
                }
            }

            // a value just completed; close every container it completes
            loop {
                let Some(expected) = open.last_mut() else {
                    return Ok(Some(pos));
                };
                *expected -= 1;
                if *expected > 0 {
                    break;
                }
                open.pop();
            }
        }
    }

    /// Builds the first value of `input` and returns it with the position
    /// just past it. Containers are held on an explicit stack, so nesting is
    /// bounded by `depth_limit` alone.
    fn build<F: ValueFactory>(
        &self,
        input: &[u8],
        f: &mut F,
    ) -> Result<(F::Value, usize), UnpackError<F::Error>> {
        let mut pos = 0;
        let mut open: Vec<Frame<F>> = Vec::new();
        loop {
            let start = pos;
            let (header, header_len) = match self.read_header(input, start) {
                Ok(Some(h)) => h,
                Ok(None) => return Err(UnpackError::new(DecodeError::Truncated.into(), start)),
                Err(e) => return Err(e.into_unpack_error()),
            };
            pos += header_len;

            let payload_len = header.payload_len();
            let Some(payload) = input.get(pos..pos + payload_len) else {
                return Err(UnpackError::new(DecodeError::Truncated.into(), pos));
            };
            pos += payload_len;

            let mut value = match header {
                Header::Nil => f.new_nil(),
                Header::Bool(b) => f.new_bool(b),
                Header::Int(n) => f.new_integer(n),
                Header::Float(n) => f.new_float(n),
                Header::Str(_) => f.new_str(payload),
                Header::Bin(_) => f.new_binary(payload),
                Header::Ext(ty, _) => f.new_ext(ty, payload),
                Header::Array(len) => match f.new_array(len) {
                    Ok(array) if len > 0 => {
                        open.push(Frame::Array {
                            array,
                            remaining: len,
                            start,
                        });
                        continue;
                    }
                    Ok(array) => f.build_from_array(array),
                    Err(e) => Err(e),
                },
                Header::Map(len) => match f.new_map(len) {
                    Ok(map) if len > 0 => {
                        open.push(Frame::Map {
                            map,
                            remaining: len,
                            key: None,
                            start,
                        });
                        continue;
                    }
                    Ok(map) => f.build_from_map(map),
                    Err(e) => Err(e),
                },
            }
            .map_err(|e| factory_error(e, start))?;

            // hand the finished value to its parent, closing every container
            // it completes
            loop {
                let Some(mut frame) = open.pop() else {
                    return Ok((value, pos));
                };
                let complete = match &mut frame {
                    Frame::Array {
                        array,
                        remaining,
                        start,
                    } => {
                        f.push_array(array, value)
                            .map_err(|e| factory_error(e, *start))?;
                        *remaining -= 1;
                        *remaining == 0
                    }
                    Frame::Map {
                        map,
                        remaining,
                        key,
                        start,
                    } => match key.take() {
                        None => {
                            *key = Some(value);
                            false
                        }
                        Some(k) => {
                            f.insert_map(map, k, value)
                                .map_err(|e| factory_error(e, *start))?;
                            *remaining -= 1;
                            *remaining == 0
                        }
                    },
                };
                if !complete {
                    open.push(frame);
                    break;
                }
                value = match frame {
                    Frame::Array { array, start, .. } => f
                        .build_from_array(array)
                        .map_err(|e| factory_error(e, start))?,
                    Frame::Map { map, start, .. } => f
                        .build_from_map(map)
                        .map_err(|e| factory_error(e, start))?,
                };
            }
        }
    }
}

/// A container whose elements are still being built, and the offset of its
/// header.
enum Frame<F: ValueFactory> {
    Array {
        array: F::Array,
        remaining: usize,
        start: usize,
    },
    Map {
        map: F::Map,
        /// Pairs still expected.
        remaining: usize,
        /// Key of the pair in progress.
        key: Option<F::Value>,
        start: usize,
    },
}

fn factory_error<E>(e: E, offset: usize) -> UnpackError<E> {
    UnpackError::new(ErrorSource::Factory(e), offset)
}
