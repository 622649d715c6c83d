use msgmodem::{Integer, ValueFactory};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyDict, PyFloat, PyList, PyString};

/// Factory that builds Python objects for the unpacker.
///
/// `str` payloads that are not valid UTF-8 become `bytes`; extension values
/// become a `(type, bytes)` tuple. Map keys go through `dict.__setitem__`,
/// so an unhashable key fails with Python's own `TypeError`.
#[derive(Clone, Copy)]
pub struct PyFactory<'py> {
    py: Python<'py>,
}

impl<'py> PyFactory<'py> {
    /// Creates a factory bound to the interpreter held by `py`.
    pub fn new(py: Python<'py>) -> Self {
        Self { py }
    }
}

impl<'py> ValueFactory for PyFactory<'py> {
    type Value = Bound<'py, PyAny>;
    type Array = Bound<'py, PyList>;
    type Map = Bound<'py, PyDict>;
    type Error = PyErr;

    fn new_nil(&mut self) -> PyResult<Self::Value> {
        Ok(self.py.None().into_bound(self.py))
    }

    fn new_bool(&mut self, b: bool) -> PyResult<Self::Value> {
        Ok(PyBool::new(self.py, b).to_owned().into_any())
    }

    fn new_integer(&mut self, n: Integer) -> PyResult<Self::Value> {
        Ok(match n {
            Integer::Unsigned(n) => n.into_pyobject(self.py)?.into_any(),
            Integer::Signed(n) => n.into_pyobject(self.py)?.into_any(),
        })
    }

    fn new_float(&mut self, n: f64) -> PyResult<Self::Value> {
        Ok(PyFloat::new(self.py, n).into_any())
    }

    fn new_str(&mut self, s: &[u8]) -> PyResult<Self::Value> {
        Ok(match core::str::from_utf8(s) {
            Ok(s) => PyString::new(self.py, s).into_any(),
            Err(_) => PyBytes::new(self.py, s).into_any(),
        })
    }

    fn new_binary(&mut self, b: &[u8]) -> PyResult<Self::Value> {
        Ok(PyBytes::new(self.py, b).into_any())
    }

    fn new_ext(&mut self, ty: i8, data: &[u8]) -> PyResult<Self::Value> {
        Ok((ty, PyBytes::new(self.py, data))
            .into_pyobject(self.py)?
            .into_any())
    }

    fn new_array(&mut self, _len: usize) -> PyResult<Self::Array> {
        Ok(PyList::empty(self.py))
    }

    fn push_array(&mut self, array: &mut Self::Array, val: Self::Value) -> PyResult<()> {
        array.append(val)
    }

    fn build_from_array(&mut self, array: Self::Array) -> PyResult<Self::Value> {
        Ok(array.into_any())
    }

    fn new_map(&mut self, _len: usize) -> PyResult<Self::Map> {
        Ok(PyDict::new(self.py))
    }

    fn insert_map(
        &mut self,
        map: &mut Self::Map,
        key: Self::Value,
        val: Self::Value,
    ) -> PyResult<()> {
        map.set_item(key, val)
    }

    fn build_from_map(&mut self, map: Self::Map) -> PyResult<Self::Value> {
        Ok(map.into_any())
    }
}
