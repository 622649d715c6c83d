use alloc::vec::Vec;

/// Consumed bytes are reclaimed once the prefix reaches this size, even if it
/// is still less than half of the storage.
const COMPACT_THRESHOLD: usize = 8192;

/// Append-only byte store with a read cursor.
///
/// Bytes before `offset` have been handed out as decoded values and are only
/// kept until the next compaction. `offset <= data.len()` always holds.
#[derive(Debug, Default, Clone)]
pub(crate) struct ByteBuffer {
    data: Vec<u8>,
    offset: usize,
}

impl ByteBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.compact();
        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// The unconsumed bytes.
    #[inline]
    pub(crate) fn peek(&self) -> &[u8] {
        &self.data[self.offset..]
    }

    /// Commits `n` bytes as consumed.
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining(), "advance past end of buffer");
        self.offset += n.min(self.remaining());
        if self.offset == self.data.len() {
            self.data.clear();
            self.offset = 0;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.data.clear();
        self.offset = 0;
    }

    fn compact(&mut self) {
        if self.offset == 0 {
            return;
        }
        if self.offset >= COMPACT_THRESHOLD || self.offset * 2 >= self.data.len() {
            self.data.drain(..self.offset);
            self.offset = 0;
        }
    }
}
