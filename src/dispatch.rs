//! Calling-convention dispatch for test inputs
//!
//! A JSON object expands to keyword arguments; anything else is passed as a
//! single positional argument. Classification happens exactly once at the
//! boundary and the resulting [`CallArgs`] is threaded unchanged through
//! every instrumentation mode, so enabling a profiler never changes calling
//! semantics.

use rustpython_vm::function::{FuncArgs, KwArgs};
use rustpython_vm::{PyObjectRef, PyResult, VirtualMachine};
use serde_json::{Map, Value};

use crate::convert::json_to_py;

/// How the entry point will be invoked
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    /// One positional argument
    Positional(Value),
    /// Keyword expansion of a JSON object
    Keyword(Map<String, Value>),
}

impl CallArgs {
    /// Decide the calling convention for a resolved test input.
    pub fn classify(input: Value) -> Self {
        match input {
            Value::Object(map) => CallArgs::Keyword(map),
            other => CallArgs::Positional(other),
        }
    }

    /// Render as interpreter call arguments for a direct invocation.
    pub fn to_func_args(&self, vm: &VirtualMachine) -> FuncArgs {
        match self {
            CallArgs::Positional(value) => {
                FuncArgs::new(vec![json_to_py(vm, value)], KwArgs::default())
            }
            CallArgs::Keyword(map) => {
                let kwargs: KwArgs = map
                    .iter()
                    .map(|(key, value)| (key.clone(), json_to_py(vm, value)))
                    .collect();
                FuncArgs::new(Vec::<PyObjectRef>::new(), kwargs)
            }
        }
    }

    /// Render as an `(args_tuple, kwargs_dict)` pair for the tracing
    /// harnesses, which re-expand them with `fn(*args, **kwargs)`.
    pub fn to_py_pair(&self, vm: &VirtualMachine) -> PyResult<(PyObjectRef, PyObjectRef)> {
        match self {
            CallArgs::Positional(value) => {
                let args = vm.ctx.new_tuple(vec![json_to_py(vm, value)]);
                Ok((args.into(), vm.ctx.new_dict().into()))
            }
            CallArgs::Keyword(map) => {
                let kwargs = vm.ctx.new_dict();
                for (key, value) in map {
                    kwargs.set_item(key.as_str(), json_to_py(vm, value), vm)?;
                }
                Ok((vm.ctx.new_tuple(Vec::new()).into(), kwargs.into()))
            }
        }
    }
}

/// Invoke `method` with the classified input, propagating any Python
/// exception to the caller.
pub fn call_entry(
    vm: &VirtualMachine,
    method: &PyObjectRef,
    args: &CallArgs,
) -> PyResult<PyObjectRef> {
    method.call(args.to_func_args(vm), vm)
}
