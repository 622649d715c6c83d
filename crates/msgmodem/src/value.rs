//! Decoded MessagePack values.
//!
//! This module defines the [`Value`] enum produced by the default
//! [`StdFactory`](crate::StdFactory), and the [`Integer`] type that folds the
//! eight MessagePack integer encodings into one comparable representation.

use alloc::vec::Vec;
use core::fmt;

use bstr::{BStr, BString, ByteSlice};

/// Ordered key/value pairs of a decoded map. Duplicate keys are preserved.
pub type Map = Vec<(Value, Value)>;

/// Elements of a decoded array.
pub type Array = Vec<Value>;

/// A MessagePack integer of any encoded width.
///
/// Non-negative values are always [`Unsigned`](Integer::Unsigned) and
/// negative values are always [`Signed`](Integer::Signed), so the same number
/// compares equal regardless of how it was encoded.
///
/// ```
/// use msgmodem::Integer;
///
/// assert_eq!(Integer::from(1_i64), Integer::from(1_u8));
/// assert_eq!(Integer::from(-3_i8).as_i64(), Some(-3));
/// assert_eq!(Integer::from(u64::MAX).as_i64(), None);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Integer {
    /// A value in `0..=u64::MAX`.
    Unsigned(u64),
    /// A value in `i64::MIN..0`.
    Signed(i64),
}

impl Integer {
    /// Returns the value as an `i64` if it fits.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Unsigned(n) => i64::try_from(n).ok(),
            Self::Signed(n) => Some(n),
        }
    }

    /// Returns the value as a `u64` if it is non-negative.
    #[must_use]
    pub fn as_u64(self) -> Option<u64> {
        match self {
            Self::Unsigned(n) => Some(n),
            Self::Signed(_) => None,
        }
    }
}

impl From<u64> for Integer {
    fn from(n: u64) -> Self {
        Self::Unsigned(n)
    }
}

impl From<i64> for Integer {
    fn from(n: i64) -> Self {
        match u64::try_from(n) {
            Ok(n) => Self::Unsigned(n),
            Err(_) => Self::Signed(n),
        }
    }
}

macro_rules! integer_from {
    ($($unsigned:ty),* ; $($signed:ty),*) => {
        $(impl From<$unsigned> for Integer {
            fn from(n: $unsigned) -> Self {
                Self::from(u64::from(n))
            }
        })*
        $(impl From<$signed> for Integer {
            fn from(n: $signed) -> Self {
                Self::from(i64::from(n))
            }
        })*
    };
}

integer_from!(u8, u16, u32; i8, i16, i32);

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(n) => n.fmt(f),
            Self::Signed(n) => n.fmt(f),
        }
    }
}

/// A decoded MessagePack value.
///
/// # Examples
///
/// ```
/// use msgmodem::{StreamingUnpacker, Value};
///
/// let mut unpacker = StreamingUnpacker::new();
/// unpacker.feed(&[0x92, 0x01, 0xa2, b'a', b'b']);
/// let value = unpacker.next_value().unwrap().unwrap();
/// assert_eq!(value, Value::Array(vec![Value::from(1_u8), Value::from("ab")]));
/// assert_eq!(value.to_string(), r#"[1, "ab"]"#);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// `nil`
    #[default]
    Nil,
    /// `true` or `false`
    Boolean(bool),
    /// Any of the fixint, `uint` and `int` encodings.
    Integer(Integer),
    /// `float 32` (widened) or `float 64`.
    Float(f64),
    /// The `str` family. The payload is not required to be valid UTF-8.
    String(BString),
    /// The `bin` family.
    Binary(Vec<u8>),
    /// The `array` family.
    Array(Array),
    /// The `map` family, in encoded order.
    Map(Map),
    /// The `fixext`/`ext` family: an application-defined type and its payload.
    Extension(i8, Vec<u8>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

macro_rules! value_from_integer {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::Integer(Integer::from(v))
            }
        })*
    };
}

value_from_integer!(u8, u16, u32, u64, i8, i16, i32, i64, Integer);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(BString::from(v))
    }
}

impl From<BString> for Value {
    fn from(v: BString) -> Self {
        Self::String(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Map(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Nil`](Value::Nil).
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the boolean payload, if any.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float payload, if any.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the `str` payload as bytes, if any.
    ///
    /// ```
    /// use msgmodem::Value;
    ///
    /// assert_eq!(Value::from("hi").as_bstr().map(|s| s.to_vec()), Some(b"hi".to_vec()));
    /// assert!(Value::Binary(b"hi".to_vec()).as_bstr().is_none());
    /// ```
    #[must_use]
    pub fn as_bstr(&self) -> Option<&BStr> {
        match self {
            Self::String(s) => Some(s.as_bstr()),
            _ => None,
        }
    }

    /// Returns the `str` payload if it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bstr().and_then(|s| s.to_str().ok())
    }

    /// Returns the `bin` payload, if any.
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the array elements, if any.
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the map pairs, if any.
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up the first pair whose key equals `key`.
    ///
    /// Maps are ordered pair lists, so this is a linear scan.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

fn write_bytes(f: &mut fmt::Formatter<'_>, prefix: &str, bytes: &[u8]) -> fmt::Result {
    f.write_str(prefix)?;
    f.write_str("\"")?;
    for b in bytes {
        write!(f, "{}", core::ascii::escape_default(*b))?;
    }
    f.write_str("\"")
}

/// Renders a compact, human readable form: `nil`, `true`, `-1`, `1.5`,
/// `"text"`, `b"\x00"`, `[1, 2]`, `{"k": 1}`, `ext(1, b"\x01")`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => n.fmt(f),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::String(s) => match s.to_str() {
                Ok(s) => write!(f, "{s:?}"),
                Err(_) => write_bytes(f, "", s),
            },
            Value::Binary(b) => write_bytes(f, "b", b),
            Value::Array(arr) => {
                f.write_str("[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Extension(ty, data) => {
                write!(f, "ext({ty}, ")?;
                write_bytes(f, "b", data)?;
                f.write_str(")")
            }
        }
    }
}
