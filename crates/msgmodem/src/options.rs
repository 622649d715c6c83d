/// Default element limit for array headers and pair limit for map headers.
pub const DEFAULT_CONTAINER_SIZE_LIMIT: usize = 131_071;

/// Default payload limit for `str`, `bin` and `ext` headers (128 MiB).
pub const DEFAULT_RAW_SIZE_LIMIT: usize = 134_217_728;

/// Default maximum nesting depth of arrays and maps.
pub const DEFAULT_DEPTH_LIMIT: usize = 512;

/// Configuration options for the streaming unpacker.
///
/// The limits bound what a hostile or corrupt header can make the unpacker
/// wait for or allocate. They are checked as soon as a header is read, before
/// the payload it announces has arrived.
///
/// # Examples
///
/// ```rust
/// use msgmodem::{StreamingUnpacker, UnpackerOptions};
///
/// let options = UnpackerOptions {
///     array_size_limit: 16,
///     ..Default::default()
/// };
/// let unpacker = StreamingUnpacker::with_options(options);
/// assert_eq!(unpacker.options().map_size_limit, 131_071);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackerOptions {
    /// Maximum number of elements an array header may declare.
    ///
    /// # Default
    ///
    /// `131071`
    pub array_size_limit: usize,

    /// Maximum number of key/value pairs a map header may declare.
    ///
    /// # Default
    ///
    /// `131071`
    pub map_size_limit: usize,

    /// Maximum payload length of a single `str`, `bin` or `ext` value.
    ///
    /// # Default
    ///
    /// `134217728`
    pub raw_size_limit: usize,

    /// Maximum nesting depth of containers. A top-level array counts as depth
    /// one.
    ///
    /// Decoding does not recurse, so any limit is safe for the decoder. A
    /// [`Value`](crate::Value) tree is still dropped recursively.
    ///
    /// # Default
    ///
    /// `512`
    pub depth_limit: usize,
}

impl Default for UnpackerOptions {
    fn default() -> Self {
        Self {
            array_size_limit: DEFAULT_CONTAINER_SIZE_LIMIT,
            map_size_limit: DEFAULT_CONTAINER_SIZE_LIMIT,
            raw_size_limit: DEFAULT_RAW_SIZE_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}
