//! Interpreter tracing capability probe
//!
//! Line- and call-level profiling ride on `sys.settrace` / `sys.setprofile`.
//! Support for those hooks varies with the embedded interpreter build, so it
//! is probed once at startup against a throwaway interpreter and the result
//! is carried through the run. A requested mode whose hook is absent
//! downgrades to unwrapped timing with a warning instead of failing.

use rustpython_vm::builtins::PyInt;
use rustpython_vm::compiler::Mode;
use rustpython_vm::{Interpreter, PyResult, VirtualMachine};

use num_traits::ToPrimitive;

/// Which tracing hooks actually deliver events in this build
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceCapability {
    /// `sys.setprofile` delivers call/return events
    pub call_events: bool,
    /// `sys.settrace` delivers line events
    pub line_events: bool,
}

const PROBE_SRC: &str = concat!(
    "import sys\n",
    "\n",
    "def __probe():\n",
    "    x = 1\n",
    "    return x\n",
    "\n",
    "__trace_events = []\n",
    "\n",
    "def __trace_cb(frame, event, arg):\n",
    "    __trace_events.append(event)\n",
    "    return __trace_cb\n",
    "\n",
    "sys.settrace(__trace_cb)\n",
    "__probe()\n",
    "sys.settrace(None)\n",
    "\n",
    "__profile_events = []\n",
    "\n",
    "def __profile_cb(frame, event, arg):\n",
    "    __profile_events.append(event)\n",
    "    return __profile_cb\n",
    "\n",
    "sys.setprofile(__profile_cb)\n",
    "__probe()\n",
    "sys.setprofile(None)\n",
    "\n",
    "__line_ok = 1 if 'line' in __trace_events else 0\n",
    "__call_ok = 1 if 'call' in __profile_events else 0\n",
);

/// Probe the tracing hooks once; any probe failure means "absent".
pub fn probe() -> TraceCapability {
    Interpreter::without_stdlib(Default::default()).enter(|vm| {
        run_probe(vm).unwrap_or_else(|_| {
            tracing::debug!("tracing hooks unavailable in this interpreter build");
            TraceCapability::default()
        })
    })
}

fn run_probe(vm: &VirtualMachine) -> PyResult<TraceCapability> {
    let scope = vm.new_scope_with_builtins();
    let code = vm
        .compile(PROBE_SRC, Mode::Exec, "<capability-probe>".to_owned())
        .map_err(|e| vm.new_syntax_error(&e, Some(PROBE_SRC)))?;
    vm.run_code_obj(code, scope.clone())?;

    let flag = |name: &str| -> bool {
        scope
            .globals
            .get_item_opt(name, vm)
            .ok()
            .flatten()
            .and_then(|obj| {
                obj.downcast_ref::<PyInt>()
                    .map(|i| i.as_bigint().to_i64().unwrap_or(0) != 0)
            })
            .unwrap_or(false)
    };

    Ok(TraceCapability {
        call_events: flag("__call_ok"),
        line_events: flag("__line_ok"),
    })
}
