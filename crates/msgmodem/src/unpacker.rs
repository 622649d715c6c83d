use core::iter::FusedIterator;

use tracing::{debug, trace};

use crate::{
    UnpackError, UnpackerOptions,
    buffer::ByteBuffer,
    decoder::{Decoded, Decoder},
    factory::{StdFactory, ValueFactory},
    value::Value,
};

/// Incremental MessagePack unpacker.
///
/// Bytes are handed over in arbitrary chunks with [`feed`](Self::feed);
/// values come out one at a time, in order, once every byte of a top-level
/// value has arrived. When the buffer ends in the middle of a value the
/// unpacker reports "nothing yet" and keeps the partial bytes untouched, so
/// decoding resumes at exactly the same position after the next `feed`.
///
/// # Examples
///
/// ```
/// use msgmodem::{StreamingUnpacker, Value};
///
/// let mut unpacker = StreamingUnpacker::new();
/// let mut seen = Vec::new();
///
/// unpacker.feed(&[0x92, 0x01]);
/// unpacker.for_each(|v| seen.push(v)).unwrap();
/// assert!(seen.is_empty());
///
/// unpacker.feed(&[0xa2, b'a', b'b']);
/// unpacker.for_each(|v| seen.push(v)).unwrap();
/// assert_eq!(seen, [Value::Array(vec![Value::from(1_u8), Value::from("ab")])]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamingUnpacker {
    buffer: ByteBuffer,
    decoder: Decoder,
    /// Bytes committed since construction or the last reset.
    consumed: usize,
}

impl StreamingUnpacker {
    /// Creates an empty unpacker with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(UnpackerOptions::default())
    }

    /// Creates an empty unpacker with the given limits.
    #[must_use]
    pub fn with_options(options: UnpackerOptions) -> Self {
        Self {
            buffer: ByteBuffer::new(),
            decoder: Decoder::new(options),
            consumed: 0,
        }
    }

    /// The limits this unpacker enforces.
    #[must_use]
    pub fn options(&self) -> &UnpackerOptions {
        self.decoder.options()
    }

    /// Appends a chunk of input. Nothing is decoded here.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.append(chunk);
    }

    /// Number of buffered bytes not yet returned as values.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    /// The buffered bytes not yet returned as values.
    ///
    /// After an error this starts with the value that failed to decode.
    #[must_use]
    pub fn buffered(&self) -> &[u8] {
        self.buffer.peek()
    }

    /// Whether a whole value is buffered. Consumes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffered value is malformed or exceeds a limit.
    pub fn has_next(&self) -> Result<bool, UnpackError> {
        match self.decoder.measure(self.buffer.peek()) {
            Ok(len) => Ok(len.is_some()),
            Err(e) => Err(self.located(e)),
        }
    }

    /// Decodes the next value, or returns `Ok(None)` if the buffer ends
    /// inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffered value is malformed or exceeds a limit.
    /// The buffer is left as it was.
    pub fn next_value(&mut self) -> Result<Option<Value>, UnpackError> {
        self.next_value_with(&mut StdFactory)
    }

    /// Decodes the next value through `factory`, or returns `Ok(None)` if
    /// the buffer ends inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffered value is malformed, exceeds a limit,
    /// or the factory fails. The buffer is left as it was.
    pub fn next_value_with<F: ValueFactory>(
        &mut self,
        factory: &mut F,
    ) -> Result<Option<F::Value>, UnpackError<F::Error>> {
        match self.decoder.decode_one(self.buffer.peek(), factory) {
            Ok(Decoded::Complete(value, len)) => {
                self.buffer.advance(len);
                self.consumed += len;
                trace!(len, remaining = self.buffer.remaining(), "unpacked value");
                Ok(Some(value))
            }
            Ok(Decoded::Incomplete) => {
                trace!(buffered = self.buffer.remaining(), "waiting for more input");
                Ok(None)
            }
            Err(e) => Err(self.located(e)),
        }
    }

    /// Iterates over the values decodable from the buffered bytes.
    ///
    /// The iterator ends when the buffer runs out mid-value, or after
    /// yielding the first error.
    pub fn iter(&mut self) -> Values<'_, StdFactory> {
        self.iter_with(StdFactory)
    }

    /// Like [`iter`](Self::iter), building values with `factory`.
    pub fn iter_with<F: ValueFactory>(&mut self, factory: F) -> Values<'_, F> {
        Values {
            unpacker: self,
            factory,
            done: false,
        }
    }

    /// Calls `visitor` with every value decodable from the buffered bytes,
    /// in order, then returns. Running out of bytes mid-value is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns the first decode error. Values decoded before it have already
    /// been passed to `visitor`.
    pub fn for_each<G: FnMut(Value)>(&mut self, mut visitor: G) -> Result<&mut Self, UnpackError> {
        while let Some(value) = self.next_value()? {
            visitor(value);
        }
        Ok(self)
    }

    /// [`feed`](Self::feed) followed by [`for_each`](Self::for_each).
    ///
    /// # Errors
    ///
    /// See [`for_each`](Self::for_each).
    pub fn feed_each<G: FnMut(Value)>(
        &mut self,
        chunk: &[u8],
        visitor: G,
    ) -> Result<&mut Self, UnpackError> {
        self.feed(chunk);
        self.for_each(visitor)
    }

    /// Drops every buffered byte and restarts stream offsets at zero.
    pub fn reset(&mut self) -> &mut Self {
        trace!(dropped = self.buffer.remaining(), "reset");
        self.buffer.clear();
        self.consumed = 0;
        self
    }

    /// Rebases a decoder error onto the stream position.
    fn located<E: core::fmt::Display>(&self, mut e: UnpackError<E>) -> UnpackError<E> {
        e.offset += self.consumed;
        debug!(offset = e.offset, error = %e, "malformed input");
        e
    }
}

/// Iterator over decodable values, returned by [`StreamingUnpacker::iter`].
#[derive(Debug)]
pub struct Values<'a, F> {
    unpacker: &'a mut StreamingUnpacker,
    factory: F,
    done: bool,
}

impl<F: ValueFactory> Iterator for Values<'_, F> {
    type Item = Result<F::Value, UnpackError<F::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.unpacker.next_value_with(&mut self.factory) {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<F: ValueFactory> FusedIterator for Values<'_, F> {}
