//! Value conversion between JSON and the embedded interpreter
//!
//! Test inputs arrive as `serde_json::Value` and return values travel back
//! the same way so that reporting never holds interpreter references.
//! Python values with no JSON counterpart fall back to their `str()` form.

use num_traits::ToPrimitive;
use rustpython_vm::builtins::{PyBaseExceptionRef, PyFloat, PyInt, PyList, PyStr, PyTuple};
use rustpython_vm::{AsObject, PyObjectRef, PyResult, VirtualMachine};
use serde_json::Value;

/// Build a Python object from a JSON value.
pub fn json_to_py(vm: &VirtualMachine, value: &Value) -> PyObjectRef {
    match value {
        Value::Null => vm.ctx.none(),
        Value::Bool(b) => vm.ctx.new_bool(*b).into(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                vm.ctx.new_int(i).into()
            } else {
                vm.ctx.new_float(n.as_f64().unwrap_or(0.0)).into()
            }
        }
        Value::String(s) => vm.ctx.new_str(s.as_str()).into(),
        Value::Array(items) => {
            let elements = items.iter().map(|v| json_to_py(vm, v)).collect();
            vm.ctx.new_list(elements).into()
        }
        Value::Object(map) => {
            let dict = vm.ctx.new_dict();
            for (key, v) in map {
                // set_item on a fresh dict with string keys cannot fail
                let _ = dict.set_item(key.as_str(), json_to_py(vm, v), vm);
            }
            dict.into()
        }
    }
}

/// Convert a Python return value to JSON for reporting.
pub fn py_to_json(vm: &VirtualMachine, obj: &PyObjectRef) -> PyResult<Value> {
    if vm.is_none(obj) {
        return Ok(Value::Null);
    }
    if obj.class().is(vm.ctx.types.bool_type) {
        let truthy = obj
            .downcast_ref::<PyInt>()
            .map(|i| i.as_bigint().to_i64().unwrap_or(0) != 0)
            .unwrap_or(false);
        return Ok(Value::Bool(truthy));
    }
    if let Some(int) = obj.downcast_ref::<PyInt>() {
        if let Some(i) = int.as_bigint().to_i64() {
            return Ok(Value::from(i));
        }
        // Out-of-range ints render as text rather than losing precision
        return Ok(Value::String(obj.str(vm)?.as_str().to_owned()));
    }
    if let Some(float) = obj.downcast_ref::<PyFloat>() {
        return Ok(serde_json::Number::from_f64(float.to_f64())
            .map(Value::Number)
            .unwrap_or(Value::Null));
    }
    if let Some(s) = obj.downcast_ref::<PyStr>() {
        return Ok(Value::String(s.as_str().to_owned()));
    }
    if let Some(list) = obj.downcast_ref::<PyList>() {
        let items: Vec<PyObjectRef> = list.borrow_vec().to_vec();
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            out.push(py_to_json(vm, item)?);
        }
        return Ok(Value::Array(out));
    }
    if let Some(tuple) = obj.downcast_ref::<PyTuple>() {
        let mut out = Vec::with_capacity(tuple.len());
        for item in tuple.as_slice() {
            out.push(py_to_json(vm, item)?);
        }
        return Ok(Value::Array(out));
    }
    Ok(Value::String(obj.str(vm)?.as_str().to_owned()))
}

/// One-line rendering of a Python exception, e.g. `TypeError: bad operand`.
pub fn format_exception(vm: &VirtualMachine, exc: &PyBaseExceptionRef) -> String {
    let class_name = exc.as_object().class().name().to_string();
    let args = exc.args();
    let detail = args
        .as_slice()
        .first()
        .and_then(|arg| arg.str(vm).ok())
        .map(|s| s.as_str().to_owned())
        .unwrap_or_default();
    if detail.is_empty() {
        class_name
    } else {
        format!("{class_name}: {detail}")
    }
}

/// Extract a Rust string from a Python str.
pub fn expect_str(vm: &VirtualMachine, obj: &PyObjectRef) -> PyResult<String> {
    Ok(obj.str(vm)?.as_str().to_owned())
}

/// Extract a u64 from a Python int.
pub fn expect_u64(vm: &VirtualMachine, obj: &PyObjectRef) -> PyResult<u64> {
    obj.downcast_ref::<PyInt>()
        .and_then(|i| i.as_bigint().to_u64())
        .ok_or_else(|| vm.new_type_error("expected a non-negative integer".to_owned()))
}

/// Extract an f64 from a Python float or int.
pub fn expect_f64(vm: &VirtualMachine, obj: &PyObjectRef) -> PyResult<f64> {
    if let Some(float) = obj.downcast_ref::<PyFloat>() {
        return Ok(float.to_f64());
    }
    obj.downcast_ref::<PyInt>()
        .and_then(|i| i.as_bigint().to_f64())
        .ok_or_else(|| vm.new_type_error("expected a number".to_owned()))
}
