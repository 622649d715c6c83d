//! MessagePack type tags.
//!
//! Every encoded value starts with a single marker byte. Some markers carry
//! their payload inline (fixints, and the lengths of fixstr/fixarray/fixmap);
//! the rest announce a fixed-width scalar or a big-endian length prefix.

use crate::value::Integer;

/// Classification of one marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    PositiveFixInt(u8),
    NegativeFixInt(i8),
    FixMap(u8),
    FixArray(u8),
    FixStr(u8),
    Nil,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    F32,
    F64,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
}

impl Marker {
    /// `None` for `0xc1`, the one byte MessagePack never assigns.
    #[inline]
    pub(crate) fn from_u8(b: u8) -> Option<Self> {
        Some(match b {
            0x00..=0x7f => Self::PositiveFixInt(b),
            0x80..=0x8f => Self::FixMap(b & 0x0f),
            0x90..=0x9f => Self::FixArray(b & 0x0f),
            0xa0..=0xbf => Self::FixStr(b & 0x1f),
            0xc0 => Self::Nil,
            0xc1 => return None,
            0xc2 => Self::False,
            0xc3 => Self::True,
            0xc4 => Self::Bin8,
            0xc5 => Self::Bin16,
            0xc6 => Self::Bin32,
            0xc7 => Self::Ext8,
            0xc8 => Self::Ext16,
            0xc9 => Self::Ext32,
            0xca => Self::F32,
            0xcb => Self::F64,
            0xcc => Self::U8,
            0xcd => Self::U16,
            0xce => Self::U32,
            0xcf => Self::U64,
            0xd0 => Self::I8,
            0xd1 => Self::I16,
            0xd2 => Self::I32,
            0xd3 => Self::I64,
            0xd4 => Self::FixExt1,
            0xd5 => Self::FixExt2,
            0xd6 => Self::FixExt4,
            0xd7 => Self::FixExt8,
            0xd8 => Self::FixExt16,
            0xd9 => Self::Str8,
            0xda => Self::Str16,
            0xdb => Self::Str32,
            0xdc => Self::Array16,
            0xdd => Self::Array32,
            0xde => Self::Map16,
            0xdf => Self::Map32,
            0xe0..=0xff => Self::NegativeFixInt(i8::from_be_bytes([b])),
        })
    }
}

/// What follows a marker once its fixed-size prefix has been read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Header {
    Nil,
    Bool(bool),
    Int(Integer),
    Float(f64),
    /// `len` payload bytes of the `str` family follow.
    Str(usize),
    /// `len` payload bytes of the `bin` family follow.
    Bin(usize),
    /// `len` payload bytes of an extension value with the given type follow.
    Ext(i8, usize),
    /// `len` values follow.
    Array(usize),
    /// `len` key/value pairs follow.
    Map(usize),
}

#[inline]
fn take<const N: usize>(rest: &[u8], at: usize) -> Option<[u8; N]> {
    rest.get(at..at + N)?.try_into().ok()
}

#[inline]
fn len8(rest: &[u8]) -> Option<usize> {
    take::<1>(rest, 0).map(|[n]| usize::from(n))
}

#[inline]
fn len16(rest: &[u8]) -> Option<usize> {
    take(rest, 0).map(|b| usize::from(u16::from_be_bytes(b)))
}

#[inline]
fn len32(rest: &[u8]) -> Option<usize> {
    // saturates on 16-bit targets; the size limits reject it either way
    take(rest, 0).map(|b| usize::try_from(u32::from_be_bytes(b)).unwrap_or(usize::MAX))
}

#[inline]
fn ext_type(rest: &[u8], at: usize) -> Option<i8> {
    take(rest, at).map(i8::from_be_bytes)
}

impl Header {
    /// Decodes the header announced by `marker` from the bytes following it.
    ///
    /// Returns the header and the number of bytes it occupies after the
    /// marker, or `None` if `rest` ends first.
    pub(crate) fn read(marker: Marker, rest: &[u8]) -> Option<(Self, usize)> {
        Some(match marker {
            Marker::PositiveFixInt(n) => (Self::Int(Integer::from(n)), 0),
            Marker::NegativeFixInt(n) => (Self::Int(Integer::from(n)), 0),
            Marker::FixMap(n) => (Self::Map(usize::from(n)), 0),
            Marker::FixArray(n) => (Self::Array(usize::from(n)), 0),
            Marker::FixStr(n) => (Self::Str(usize::from(n)), 0),
            Marker::Nil => (Self::Nil, 0),
            Marker::False => (Self::Bool(false), 0),
            Marker::True => (Self::Bool(true), 0),
            Marker::Bin8 => (Self::Bin(len8(rest)?), 1),
            Marker::Bin16 => (Self::Bin(len16(rest)?), 2),
            Marker::Bin32 => (Self::Bin(len32(rest)?), 4),
            Marker::Ext8 => (Self::Ext(ext_type(rest, 1)?, len8(rest)?), 2),
            Marker::Ext16 => (Self::Ext(ext_type(rest, 2)?, len16(rest)?), 3),
            Marker::Ext32 => (Self::Ext(ext_type(rest, 4)?, len32(rest)?), 5),
            Marker::F32 => (
                Self::Float(f64::from(f32::from_be_bytes(take(rest, 0)?))),
                4,
            ),
            Marker::F64 => (Self::Float(f64::from_be_bytes(take(rest, 0)?)), 8),
            Marker::U8 => (Self::Int(Integer::from(u8::from_be_bytes(take(rest, 0)?))), 1),
            Marker::U16 => (Self::Int(Integer::from(u16::from_be_bytes(take(rest, 0)?))), 2),
            Marker::U32 => (Self::Int(Integer::from(u32::from_be_bytes(take(rest, 0)?))), 4),
            Marker::U64 => (Self::Int(Integer::from(u64::from_be_bytes(take(rest, 0)?))), 8),
            Marker::I8 => (Self::Int(Integer::from(i8::from_be_bytes(take(rest, 0)?))), 1),
            Marker::I16 => (Self::Int(Integer::from(i16::from_be_bytes(take(rest, 0)?))), 2),
            Marker::I32 => (Self::Int(Integer::from(i32::from_be_bytes(take(rest, 0)?))), 4),
            Marker::I64 => (Self::Int(Integer::from(i64::from_be_bytes(take(rest, 0)?))), 8),
            Marker::FixExt1 => (Self::Ext(ext_type(rest, 0)?, 1), 1),
            Marker::FixExt2 => (Self::Ext(ext_type(rest, 0)?, 2), 1),
            Marker::FixExt4 => (Self::Ext(ext_type(rest, 0)?, 4), 1),
            Marker::FixExt8 => (Self::Ext(ext_type(rest, 0)?, 8), 1),
            Marker::FixExt16 => (Self::Ext(ext_type(rest, 0)?, 16), 1),
            Marker::Str8 => (Self::Str(len8(rest)?), 1),
            Marker::Str16 => (Self::Str(len16(rest)?), 2),
            Marker::Str32 => (Self::Str(len32(rest)?), 4),
            Marker::Array16 => (Self::Array(len16(rest)?), 2),
            Marker::Array32 => (Self::Array(len32(rest)?), 4),
            Marker::Map16 => (Self::Map(len16(rest)?), 2),
            Marker::Map32 => (Self::Map(len32(rest)?), 4),
        })
    }

    /// Number of raw payload bytes that trail the header.
    #[inline]
    pub(crate) fn payload_len(self) -> usize {
        match self {
            Self::Str(len) | Self::Bin(len) | Self::Ext(_, len) => len,
            _ => 0,
        }
    }
}
