use std::ffi::CStr;

use pyo3::{
    Python,
    types::{PyDict, PyDictMethods, PyModule},
};

/// Runs `code` with a freshly registered `msgmodem` module in scope.
fn run_python(code: &CStr) {
    Python::with_gil(|py| {
        let module = PyModule::new(py, "msgmodem").unwrap();
        msgmodem_py::register(&module).unwrap();
        let globals = PyDict::new(py);
        globals.set_item("msgmodem", module).unwrap();
        if let Err(e) = py.run(code, Some(&globals), None) {
            e.print(py);
            panic!("python code failed: {e}");
        }
    });
}

#[test]
fn split_array_scenario() {
    run_python(cr#"
u = msgmodem.Unpacker()
seen = []
u.feed(b"\x92\x01")
assert u.each(seen.append) is u
assert seen == []
assert u.feed_each(bytearray(b"\xa2ab"), seen.append) is u
assert seen == [[1, "ab"]], seen
"#);
}

#[test]
fn value_mapping() {
    run_python(cr#"
u = msgmodem.Unpacker()
u.feed(b"\xc0\xc2\xc3\xcf\xff\xff\xff\xff\xff\xff\xff\xff\xd0\x80")
u.feed(b"\xcb\x3f\xf8\x00\x00\x00\x00\x00\x00\xa2\xff\xfe\xc4\x01\x00")
u.feed(b"\xd4\x05\x01\x82\xa1k\x90\x01\xc0")
values = list(u)
assert values == [
    None, False, True, 2**64 - 1, -128, 1.5,
    b"\xff\xfe", b"\x00", (5, b"\x01"), {"k": [], 1: None},
], values
assert type(values[1]) is bool
assert type(values[3]) is int
assert type(values[6]) is bytes
"#);
}

#[test]
fn iteration_resumes_after_more_input() {
    run_python(cr#"
u = msgmodem.Unpacker()
u.feed(b"\x01\xa3ab")
assert list(u) == [1]
assert next(u, "pending") == "pending"
u.feed(b"c")
assert next(u) == "abc"
assert next(u, "pending") == "pending"
"#);
}

#[test]
fn decode_errors() {
    run_python(cr#"
assert issubclass(msgmodem.UnpackError, ValueError)
assert issubclass(msgmodem.SizeLimitExceeded, msgmodem.UnpackError)

u = msgmodem.Unpacker()
u.feed(b"\x01\xc1")
seen = []
try:
    u.each(seen.append)
except msgmodem.UnpackError as e:
    assert not isinstance(e, msgmodem.SizeLimitExceeded)
    assert str(e) == "invalid type marker 0xc1 at byte 1", str(e)
else:
    raise AssertionError("expected UnpackError")
assert seen == [1]

# the error repeats until reset
try:
    next(u)
except msgmodem.UnpackError:
    pass
else:
    raise AssertionError("expected UnpackError")
assert u.reset() is u
u.feed(b"\x02")
assert list(u) == [2]
"#);
}

#[test]
fn size_limits() {
    run_python(cr#"
u = msgmodem.Unpacker()
u.feed(b"\xdd\x00\x02\x00\x00")
try:
    next(u)
except msgmodem.SizeLimitExceeded as e:
    assert "131072" in str(e) and "131071" in str(e), str(e)
else:
    raise AssertionError("expected SizeLimitExceeded")

u = msgmodem.Unpacker(array_size_limit=2, map_size_limit=1)
u.feed(b"\x92\x01\x02\x81\x01\x02")
assert list(u) == [[1, 2], {1: 2}]
u.feed(b"\x82\x01\x02\x03\x04")
try:
    next(u)
except msgmodem.SizeLimitExceeded:
    pass
else:
    raise AssertionError("expected SizeLimitExceeded")

u = msgmodem.Unpacker(raw_size_limit=2)
u.feed(b"\xa2ab\xc4\x03")
assert next(u) == "ab"
try:
    next(u)
except msgmodem.SizeLimitExceeded as e:
    assert str(e) == "raw payload of size 3 exceeds the limit of 2 at byte 3", str(e)
else:
    raise AssertionError("expected SizeLimitExceeded")

u = msgmodem.Unpacker(depth_limit=2)
u.feed(b"\x91\x91\x01\x91\x91\x91\x01")
assert next(u) == [[1]]
try:
    next(u)
except msgmodem.SizeLimitExceeded:
    raise AssertionError("depth is not a size limit")
except msgmodem.UnpackError as e:
    assert str(e).endswith("at byte 5"), str(e)
else:
    raise AssertionError("expected UnpackError")
"#);
}

#[test]
fn feed_rejects_non_bytes() {
    run_python(cr#"
u = msgmodem.Unpacker()
for bad in ["text", 1, None, [1, 2]]:
    try:
        u.feed(bad)
    except TypeError:
        pass
    else:
        raise AssertionError(f"accepted {bad!r}")
u.feed(b"")
u.feed(bytearray())
assert list(u) == []
"#);
}

#[test]
fn unhashable_key_raises_type_error() {
    run_python(cr#"
u = msgmodem.Unpacker()
u.feed(b"\x81\x91\x01\x02")
try:
    next(u)
except TypeError:
    pass
else:
    raise AssertionError("expected TypeError")
"#);
}

#[test]
fn callbacks_may_feed_the_unpacker() {
    run_python(cr#"
u = msgmodem.Unpacker()
out = []
def callback(v):
    out.append(v)
    if v == 1:
        u.feed(b"\x02")
u.feed_each(b"\x01", callback)
assert out == [1, 2], out
"#);
}

#[test]
fn legacy_surface_is_unsupported() {
    run_python(cr#"
import io

try:
    msgmodem.Unpacker(io.BytesIO(b""))
except NotImplementedError:
    pass
else:
    raise AssertionError("io binding accepted")

u = msgmodem.Unpacker(None)
calls = [
    lambda: u.data(),
    lambda: u.execute(b"\x01", 0),
    lambda: u.execute_limit(b"\x01", 0, 1),
    lambda: u.fill(b"\x01"),
    lambda: u.finished(),
    lambda: u.stream,
    lambda: setattr(u, "stream", None),
]
for call in calls:
    try:
        call()
    except NotImplementedError:
        pass
    else:
        raise AssertionError("legacy call succeeded")
"#);
}
