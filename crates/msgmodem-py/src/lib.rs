mod pyfactory;

pub use pyfactory::PyFactory;

use msgmodem::{
    DecodeError, ErrorSource, StreamingUnpacker, UnpackError as CoreUnpackError, UnpackerOptions,
    DEFAULT_CONTAINER_SIZE_LIMIT, DEFAULT_DEPTH_LIMIT, DEFAULT_RAW_SIZE_LIMIT,
};
use pyo3::create_exception;
use pyo3::exceptions::{PyNotImplementedError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyByteArray, PyBytes};

create_exception!(
    msgmodem,
    UnpackError,
    PyValueError,
    "The buffered input is not valid MessagePack."
);
create_exception!(
    msgmodem,
    SizeLimitExceeded,
    UnpackError,
    "A header declared more elements or bytes than the unpacker allows."
);

fn into_py_err(err: CoreUnpackError<PyErr>) -> PyErr {
    let offset = err.offset();
    match err.into_source() {
        ErrorSource::Factory(e) => e,
        ErrorSource::Decode(e @ DecodeError::SizeLimitExceeded { .. }) => {
            SizeLimitExceeded::new_err(format!("{e} at byte {offset}"))
        }
        ErrorSource::Decode(e) => UnpackError::new_err(format!("{e} at byte {offset}")),
    }
}

fn unsupported(what: &str) -> PyErr {
    PyNotImplementedError::new_err(format!("Unpacker.{what} is not supported"))
}

/// Python-facing streaming unpacker.
#[pyclass(module = "msgmodem", name = "Unpacker")]
pub struct PyUnpacker {
    inner: StreamingUnpacker,
}

impl PyUnpacker {
    /// Decodes one value while the unpacker is borrowed, so callbacks are
    /// free to call back into it.
    fn next_object<'py>(slf: &Bound<'py, Self>) -> PyResult<Option<Bound<'py, PyAny>>> {
        let mut factory = PyFactory::new(slf.py());
        slf.try_borrow_mut()?
            .inner
            .next_value_with(&mut factory)
            .map_err(into_py_err)
    }
}

#[pymethods]
impl PyUnpacker {
    #[new]
    #[pyo3(signature = (
        io = None,
        *,
        array_size_limit = DEFAULT_CONTAINER_SIZE_LIMIT,
        map_size_limit = DEFAULT_CONTAINER_SIZE_LIMIT,
        raw_size_limit = DEFAULT_RAW_SIZE_LIMIT,
        depth_limit = DEFAULT_DEPTH_LIMIT
    ))]
    fn new(
        io: Option<&Bound<'_, PyAny>>,
        array_size_limit: usize,
        map_size_limit: usize,
        raw_size_limit: usize,
        depth_limit: usize,
    ) -> PyResult<Self> {
        if io.is_some_and(|io| !io.is_none()) {
            return Err(unsupported("__init__(io)"));
        }
        let options = UnpackerOptions {
            array_size_limit,
            map_size_limit,
            raw_size_limit,
            depth_limit,
        };
        Ok(Self {
            inner: StreamingUnpacker::with_options(options),
        })
    }

    /// Appends `data`, which must be `bytes` or `bytearray`.
    fn feed(&mut self, data: &Bound<'_, PyAny>) -> PyResult<()> {
        if let Ok(bytes) = data.downcast::<PyBytes>() {
            self.inner.feed(bytes.as_bytes());
        } else if let Ok(array) = data.downcast::<PyByteArray>() {
            self.inner.feed(&array.to_vec());
        } else {
            return Err(PyTypeError::new_err(format!(
                "expected bytes or bytearray, got {}",
                data.get_type().name()?
            )));
        }
        Ok(())
    }

    /// Calls `callback` with every value decodable from the buffered bytes.
    fn each<'py>(slf: Bound<'py, Self>, callback: &Bound<'py, PyAny>) -> PyResult<Bound<'py, Self>> {
        while let Some(value) = Self::next_object(&slf)? {
            callback.call1((value,))?;
        }
        Ok(slf)
    }

    fn feed_each<'py>(
        slf: Bound<'py, Self>,
        data: &Bound<'py, PyAny>,
        callback: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, Self>> {
        slf.try_borrow_mut()?.feed(data)?;
        Self::each(slf, callback)
    }

    fn reset(mut slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf.inner.reset();
        slf
    }

    fn __iter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __next__<'py>(slf: &Bound<'py, Self>) -> PyResult<Option<Bound<'py, PyAny>>> {
        Self::next_object(slf)
    }

    // Legacy resumable-parser and stream-binding surface: always raises
    // NotImplementedError.
    fn data(&self) -> PyResult<PyObject> {
        Err(unsupported("data"))
    }

    #[allow(unused_variables)]
    #[pyo3(signature = (data, offset))]
    fn execute(&self, data: &Bound<'_, PyAny>, offset: usize) -> PyResult<usize> {
        Err(unsupported("execute"))
    }

    #[allow(unused_variables)]
    #[pyo3(signature = (data, offset, limit))]
    fn execute_limit(&self, data: &Bound<'_, PyAny>, offset: usize, limit: usize) -> PyResult<usize> {
        Err(unsupported("execute_limit"))
    }

    #[allow(unused_variables)]
    fn fill(&self, data: &Bound<'_, PyAny>) -> PyResult<()> {
        Err(unsupported("fill"))
    }

    fn finished(&self) -> PyResult<bool> {
        Err(unsupported("finished"))
    }

    #[getter]
    fn stream(&self) -> PyResult<PyObject> {
        Err(unsupported("stream"))
    }

    #[allow(unused_variables)]
    #[setter]
    fn set_stream(&mut self, io: Bound<'_, PyAny>) -> PyResult<()> {
        Err(unsupported("stream"))
    }
}

/// Adds the `msgmodem` classes and exceptions to `m`.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    m.add_class::<PyUnpacker>()?;
    m.add("UnpackError", py.get_type::<UnpackError>())?;
    m.add("SizeLimitExceeded", py.get_type::<SizeLimitExceeded>())?;
    Ok(())
}

#[pymodule]
#[pyo3(name = "msgmodem")]
fn msgmodem_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    register(m)
}
