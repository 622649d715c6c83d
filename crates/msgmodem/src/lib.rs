//! A streaming, incremental MessagePack unpacker.
//!
//! Feed bytes in chunks of any size; take out fully decoded values as soon
//! as their last byte arrives. A value split across chunks is never exposed
//! half-built, and bytes are only consumed once a whole top-level value has
//! decoded.
//!
//! ```rust
//! use msgmodem::{StreamingUnpacker, Value};
//!
//! let mut unpacker = StreamingUnpacker::new();
//! unpacker.feed(&[0x01, 0xa2, b'h']);
//!
//! let values: Vec<Value> = unpacker.iter().collect::<Result<_, _>>().unwrap();
//! assert_eq!(values, [Value::from(1_u8)]);
//! assert_eq!(unpacker.remaining(), 2);
//!
//! unpacker.feed(b"i");
//! assert_eq!(unpacker.next_value().unwrap(), Some(Value::from("hi")));
//! ```
//!
//! Values are built through a [`ValueFactory`]; [`StdFactory`] produces
//! [`Value`], and bindings supply their own to build host objects directly.

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod decoder;
mod error;
mod factory;
mod marker;
mod options;
mod unpacker;
mod value;

#[cfg(test)]
mod tests;

pub use decoder::{Decoded, Decoder};
pub use error::{DecodeError, ErrorSource, LimitKind, UnpackError};
pub use factory::{StdFactory, ValueFactory};
pub use options::{
    DEFAULT_CONTAINER_SIZE_LIMIT, DEFAULT_DEPTH_LIMIT, DEFAULT_RAW_SIZE_LIMIT, UnpackerOptions,
};
pub use unpacker::{StreamingUnpacker, Values};
pub use value::{Array, Integer, Map, Value};
