use alloc::vec::Vec;
use core::convert::Infallible;

use bstr::BString;

use crate::value::{Integer, Value};

/// Abstraction over decoded value construction.
///
/// The decoder never builds values itself; it asks a factory for each scalar
/// and for each container, so bindings can produce host objects directly.
/// Construction only starts once a whole top-level value is buffered, so a
/// factory is never asked to build part of a value that later turns out to be
/// incomplete.
///
/// Every method may fail with [`Self::Error`]; the failure is reported as
/// [`ErrorSource::Factory`](crate::ErrorSource::Factory) and the bytes of the
/// value stay buffered.
pub trait ValueFactory {
    /// Any decoded value.
    type Value;
    /// An array under construction.
    type Array;
    /// A map under construction.
    type Map;
    /// Construction failure, e.g. an unhashable key in a host dictionary.
    type Error: core::error::Error;

    /// Builds `nil`.
    fn new_nil(&mut self) -> Result<Self::Value, Self::Error>;
    /// Builds a boolean.
    fn new_bool(&mut self, b: bool) -> Result<Self::Value, Self::Error>;
    /// Builds an integer.
    fn new_integer(&mut self, n: Integer) -> Result<Self::Value, Self::Error>;
    /// Builds a float.
    fn new_float(&mut self, n: f64) -> Result<Self::Value, Self::Error>;
    /// Builds a `str` value from its raw payload, which may not be UTF-8.
    fn new_str(&mut self, s: &[u8]) -> Result<Self::Value, Self::Error>;
    /// Builds a `bin` value.
    fn new_binary(&mut self, b: &[u8]) -> Result<Self::Value, Self::Error>;
    /// Builds an extension value.
    fn new_ext(&mut self, ty: i8, data: &[u8]) -> Result<Self::Value, Self::Error>;

    /// Starts an array that will receive exactly `len` elements.
    fn new_array(&mut self, len: usize) -> Result<Self::Array, Self::Error>;
    /// Appends the next element.
    fn push_array(&mut self, array: &mut Self::Array, val: Self::Value)
    -> Result<(), Self::Error>;
    /// Finishes an array.
    fn build_from_array(&mut self, array: Self::Array) -> Result<Self::Value, Self::Error>;

    /// Starts a map that will receive exactly `len` pairs.
    fn new_map(&mut self, len: usize) -> Result<Self::Map, Self::Error>;
    /// Appends the next pair.
    fn insert_map(
        &mut self,
        map: &mut Self::Map,
        key: Self::Value,
        val: Self::Value,
    ) -> Result<(), Self::Error>;
    /// Finishes a map.
    fn build_from_map(&mut self, map: Self::Map) -> Result<Self::Value, Self::Error>;
}

/// Factory producing the crate's own [`Value`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StdFactory;

impl ValueFactory for StdFactory {
    type Value = Value;
    type Array = Vec<Value>;
    type Map = Vec<(Value, Value)>;
    type Error = Infallible;

    #[inline]
    fn new_nil(&mut self) -> Result<Value, Infallible> {
        Ok(Value::Nil)
    }

    #[inline]
    fn new_bool(&mut self, b: bool) -> Result<Value, Infallible> {
        Ok(Value::Boolean(b))
    }

    #[inline]
    fn new_integer(&mut self, n: Integer) -> Result<Value, Infallible> {
        Ok(Value::Integer(n))
    }

    #[inline]
    fn new_float(&mut self, n: f64) -> Result<Value, Infallible> {
        Ok(Value::Float(n))
    }

    #[inline]
    fn new_str(&mut self, s: &[u8]) -> Result<Value, Infallible> {
        Ok(Value::String(BString::from(s)))
    }

    #[inline]
    fn new_binary(&mut self, b: &[u8]) -> Result<Value, Infallible> {
        Ok(Value::Binary(b.to_vec()))
    }

    #[inline]
    fn new_ext(&mut self, ty: i8, data: &[u8]) -> Result<Value, Infallible> {
        Ok(Value::Extension(ty, data.to_vec()))
    }

    #[inline]
    fn new_array(&mut self, len: usize) -> Result<Vec<Value>, Infallible> {
        Ok(Vec::with_capacity(len))
    }

    #[inline]
    fn push_array(&mut self, array: &mut Vec<Value>, val: Value) -> Result<(), Infallible> {
        array.push(val);
        Ok(())
    }

    #[inline]
    fn build_from_array(&mut self, array: Vec<Value>) -> Result<Value, Infallible> {
        Ok(Value::Array(array))
    }

    #[inline]
    fn new_map(&mut self, len: usize) -> Result<Vec<(Value, Value)>, Infallible> {
        Ok(Vec::with_capacity(len))
    }

    #[inline]
    fn insert_map(
        &mut self,
        map: &mut Vec<(Value, Value)>,
        key: Value,
        val: Value,
    ) -> Result<(), Infallible> {
        map.push((key, val));
        Ok(())
    }

    #[inline]
    fn build_from_map(&mut self, map: Vec<(Value, Value)>) -> Result<Value, Infallible> {
        Ok(Value::Map(map))
    }
}
