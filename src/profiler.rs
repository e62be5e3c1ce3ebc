//! Instrumentation wrapper around a single entry-point invocation
//!
//! Performs exactly one call per notebook, optionally under a per-call
//! (`sys.setprofile`) or per-line (`sys.settrace`) harness, and always
//! records wall-clock time plus resident-memory samples around the whole
//! instrumented call. The wall clock is a monotonic [`Instant`], immune to
//! system clock adjustments.
//!
//! Memory figures are whole-process RSS deltas and therefore noisy; they
//! are reported as a rough signal, not an exact per-call attribution.
//!
//! A Python exception from the solution is converted into a failure result
//! with the partial timing discarded; it never escapes to the batch runner.

use std::time::Instant;

use rustpython_vm::builtins::{PyList, PyTuple};
use rustpython_vm::compiler::Mode;
use rustpython_vm::{PyObjectRef, PyResult, VirtualMachine};
use serde::Serialize;
use serde_json::Value;

use crate::capability::TraceCapability;
use crate::convert::{expect_f64, expect_str, expect_u64, format_exception, py_to_json};
use crate::dispatch::{call_entry, CallArgs};
use crate::memory;

/// Entries shown in rendered per-call statistics
pub const CALL_STATS_LIMIT: usize = 20;

/// Requested instrumentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMode {
    /// Per-function call counts and cumulative/own time
    PerCall,
    /// Per-line hit counts and time for the entry-point function
    PerLine,
    /// Wall clock and memory only (default)
    Unwrapped,
}

impl ProfileMode {
    /// Resolve CLI-style flags into a mode. The two instrumented modes use
    /// different attachment mechanisms and never combine in one invocation;
    /// per-call wins when a caller requests both.
    pub fn from_flags(per_call: bool, per_line: bool) -> Self {
        if per_call {
            ProfileMode::PerCall
        } else if per_line {
            ProfileMode::PerLine
        } else {
            ProfileMode::Unwrapped
        }
    }

    /// Downgrade to unwrapped timing when the interpreter build lacks the
    /// hook this mode needs.
    pub fn effective(self, caps: TraceCapability) -> Self {
        match self {
            ProfileMode::PerCall if !caps.call_events => {
                tracing::warn!("sys.setprofile unavailable; falling back to plain timing");
                ProfileMode::Unwrapped
            }
            ProfileMode::PerLine if !caps.line_events => {
                tracing::warn!("sys.settrace unavailable; falling back to plain timing");
                ProfileMode::Unwrapped
            }
            other => other,
        }
    }
}

/// Aggregated timing for one profiled function (per-call mode)
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    pub function: String,
    pub calls: u64,
    pub cumulative_ms: f64,
    pub own_ms: f64,
}

/// Aggregated timing for one source line (per-line mode)
#[derive(Debug, Clone, Serialize)]
pub struct LineRecord {
    pub line: u32,
    pub hits: u64,
    pub total_ms: f64,
}

/// Outcome of one profiled invocation
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResult {
    /// Name of the profiled method
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_before_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_after_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used_mb: Option<f64>,
    /// Return value of the call, rendered as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_stats: Option<Vec<CallRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_stats: Option<Vec<LineRecord>>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfileResult {
    /// Failure result for a call that raised; timing is discarded.
    pub fn failure(method: &str, error: String) -> Self {
        Self {
            method: method.to_string(),
            execution_time_ms: None,
            memory_before_mb: None,
            memory_after_mb: None,
            memory_used_mb: None,
            result: None,
            call_stats: None,
            line_stats: None,
            success: false,
            error: Some(error),
        }
    }
}

// Both harnesses receive the bound method plus the dispatcher's
// (args, kwargs) pair and re-expand it with fn(*args, **kwargs), so the
// calling convention is identical to an unwrapped invocation. `__perf` is a
// native monotonic clock injected into the harness scope.

const CALL_HARNESS_SRC: &str = concat!(
    "import sys\n",
    "\n",
    "def __profile_calls(fn, args, kwargs):\n",
    "    stats = {}\n",
    "    stack = []\n",
    "\n",
    "    def profiler(frame, event, arg):\n",
    "        now = __perf()\n",
    "        if event == 'call':\n",
    "            stack.append([frame.f_code.co_name, now, 0.0])\n",
    "        elif event == 'return':\n",
    "            if stack:\n",
    "                name, started, child = stack.pop()\n",
    "                total = now - started\n",
    "                entry = stats.setdefault(name, [0, 0.0, 0.0])\n",
    "                entry[0] += 1\n",
    "                entry[1] += total\n",
    "                entry[2] += total - child\n",
    "                if stack:\n",
    "                    stack[-1][2] += total\n",
    "        return profiler\n",
    "\n",
    "    sys.setprofile(profiler)\n",
    "    try:\n",
    "        result = fn(*args, **kwargs)\n",
    "    finally:\n",
    "        sys.setprofile(None)\n",
    "    return result, [(name, s[0], s[1], s[2]) for name, s in stats.items()]\n",
);

const LINE_HARNESS_SRC: &str = concat!(
    "import sys\n",
    "\n",
    "def __profile_lines(fn, args, kwargs):\n",
    "    func = getattr(fn, '__func__', fn)\n",
    "    target = func.__code__\n",
    "    hits = {}\n",
    "    state = [None, 0.0]\n",
    "\n",
    "    def tracer(frame, event, arg):\n",
    "        now = __perf()\n",
    "        line, started = state\n",
    "        if line is not None:\n",
    "            entry = hits.setdefault(line, [0, 0.0])\n",
    "            entry[0] += 1\n",
    "            entry[1] += now - started\n",
    "            state[0] = None\n",
    "        if event == 'line' and frame.f_code is target:\n",
    "            state[0] = frame.f_lineno\n",
    "            state[1] = __perf()\n",
    "        return tracer\n",
    "\n",
    "    sys.settrace(tracer)\n",
    "    try:\n",
    "        result = fn(*args, **kwargs)\n",
    "    finally:\n",
    "        sys.settrace(None)\n",
    "    return result, sorted((ln, h[0], h[1]) for ln, h in hits.items())\n",
);

/// Profile one invocation of `method` under the requested mode.
pub fn profile_entry(
    vm: &VirtualMachine,
    method: &PyObjectRef,
    method_name: &str,
    input: &CallArgs,
    mode: ProfileMode,
    caps: TraceCapability,
) -> ProfileResult {
    let mode = mode.effective(caps);

    let memory_before = memory::resident_mb();
    let started = Instant::now();
    let outcome = match mode {
        ProfileMode::Unwrapped => call_entry(vm, method, input).map(|value| (value, None, None)),
        ProfileMode::PerCall => run_harness(vm, CALL_HARNESS_SRC, "__profile_calls", method, input)
            .and_then(|(value, stats)| {
                Ok((value, Some(parse_call_records(vm, &stats)?), None))
            }),
        ProfileMode::PerLine => run_harness(vm, LINE_HARNESS_SRC, "__profile_lines", method, input)
            .and_then(|(value, stats)| {
                Ok((value, None, Some(parse_line_records(vm, &stats)?)))
            }),
    };

    match outcome {
        Ok((value, call_stats, line_stats)) => {
            let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;
            let memory_after = memory::resident_mb();
            let result = py_to_json(vm, &value).unwrap_or(Value::Null);
            ProfileResult {
                method: method_name.to_string(),
                execution_time_ms: Some(execution_time_ms),
                memory_before_mb: Some(memory_before),
                memory_after_mb: Some(memory_after),
                memory_used_mb: Some(memory_after - memory_before),
                result: Some(result),
                call_stats,
                line_stats,
                success: true,
                error: None,
            }
        }
        Err(exc) => ProfileResult::failure(method_name, format_exception(vm, &exc)),
    }
}

/// Execute one of the tracing harnesses and split its `(result, stats)`
/// return pair.
fn run_harness(
    vm: &VirtualMachine,
    harness_src: &str,
    harness_name: &str,
    method: &PyObjectRef,
    input: &CallArgs,
) -> PyResult<(PyObjectRef, PyObjectRef)> {
    let scope = vm.new_scope_with_builtins();

    let clock_start = Instant::now();
    let perf = vm.new_function("__perf", move || clock_start.elapsed().as_secs_f64());
    scope.globals.set_item("__perf", perf.into(), vm)?;

    let code = vm
        .compile(harness_src, Mode::Exec, "<profiler-harness>".to_owned())
        .map_err(|e| vm.new_syntax_error(&e, Some(harness_src)))?;
    vm.run_code_obj(code, scope.clone())?;

    let harness = scope
        .globals
        .get_item_opt(harness_name, vm)?
        .ok_or_else(|| vm.new_runtime_error(format!("harness {harness_name} not defined")))?;

    let (args, kwargs) = input.to_py_pair(vm)?;
    let out = harness.call((method.clone(), args, kwargs), vm)?;

    let pair = out
        .downcast::<PyTuple>()
        .map_err(|_| vm.new_type_error("harness returned a non-tuple".to_owned()))?;
    let slice = pair.as_slice();
    if slice.len() != 2 {
        return Err(vm.new_type_error("harness returned a malformed pair".to_owned()));
    }
    Ok((slice[0].clone(), slice[1].clone()))
}

fn parse_call_records(vm: &VirtualMachine, stats: &PyObjectRef) -> PyResult<Vec<CallRecord>> {
    let rows = stats
        .downcast_ref::<PyList>()
        .ok_or_else(|| vm.new_type_error("per-call stats are not a list".to_owned()))?;
    let rows: Vec<PyObjectRef> = rows.borrow_vec().to_vec();

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let row = row
            .downcast_ref::<PyTuple>()
            .ok_or_else(|| vm.new_type_error("per-call stats row is not a tuple".to_owned()))?;
        let fields = row.as_slice();
        if fields.len() != 4 {
            return Err(vm.new_type_error("per-call stats row is malformed".to_owned()));
        }
        records.push(CallRecord {
            function: expect_str(vm, &fields[0])?,
            calls: expect_u64(vm, &fields[1])?,
            cumulative_ms: expect_f64(vm, &fields[2])? * 1000.0,
            own_ms: expect_f64(vm, &fields[3])? * 1000.0,
        });
    }
    records.sort_by(|a, b| b.cumulative_ms.total_cmp(&a.cumulative_ms));
    Ok(records)
}

fn parse_line_records(vm: &VirtualMachine, stats: &PyObjectRef) -> PyResult<Vec<LineRecord>> {
    let rows = stats
        .downcast_ref::<PyList>()
        .ok_or_else(|| vm.new_type_error("per-line stats are not a list".to_owned()))?;
    let rows: Vec<PyObjectRef> = rows.borrow_vec().to_vec();

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let row = row
            .downcast_ref::<PyTuple>()
            .ok_or_else(|| vm.new_type_error("per-line stats row is not a tuple".to_owned()))?;
        let fields = row.as_slice();
        if fields.len() != 3 {
            return Err(vm.new_type_error("per-line stats row is malformed".to_owned()));
        }
        records.push(LineRecord {
            line: expect_u64(vm, &fields[0])? as u32,
            hits: expect_u64(vm, &fields[1])?,
            total_ms: expect_f64(vm, &fields[2])? * 1000.0,
        });
    }
    Ok(records)
}

/// Render per-call statistics, sorted by cumulative time, top 20 entries.
pub fn render_call_stats(records: &[CallRecord]) -> Vec<String> {
    let mut lines = Vec::new();
    if records.is_empty() {
        lines.push("  No per-call profiling data collected.".to_string());
        return lines;
    }
    lines.push(format!(
        "  {:<36} {:>8} {:>14} {:>14}",
        "Function", "Calls", "Cumulative", "Own"
    ));
    lines.push(format!("  {}", "─".repeat(76)));
    for record in records.iter().take(CALL_STATS_LIMIT) {
        lines.push(format!(
            "  {:<36} {:>8} {:>12.4}ms {:>12.4}ms",
            record.function, record.calls, record.cumulative_ms, record.own_ms
        ));
    }
    lines.push(format!("  {}", "─".repeat(76)));
    lines
}

/// Render per-line statistics in source-line order.
pub fn render_line_stats(records: &[LineRecord]) -> Vec<String> {
    let mut lines = Vec::new();
    if records.is_empty() {
        lines.push("  No per-line profiling data collected.".to_string());
        return lines;
    }
    lines.push(format!("  {:>6} {:>8} {:>14}", "Line", "Hits", "Time"));
    lines.push(format!("  {}", "─".repeat(32)));
    for record in records {
        lines.push(format!(
            "  {:>6} {:>8} {:>12.4}ms",
            record.line, record.hits, record.total_ms
        ));
    }
    lines.push(format!("  {}", "─".repeat(32)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability;
    use crate::loader::load_solution;
    use rustpython_vm::{AsObject, Interpreter};
    use serde_json::json;

    const RAIN_WATER: &str = concat!(
        "class Solution:\n",
        "    def trap(self, height):\n",
        "        if not height:\n",
        "            return 0\n",
        "        left, right = 0, len(height) - 1\n",
        "        left_max, right_max = 0, 0\n",
        "        total = 0\n",
        "        while left < right:\n",
        "            if height[left] < height[right]:\n",
        "                if height[left] >= left_max:\n",
        "                    left_max = height[left]\n",
        "                else:\n",
        "                    total += left_max - height[left]\n",
        "                left += 1\n",
        "            else:\n",
        "                if height[right] >= right_max:\n",
        "                    right_max = height[right]\n",
        "                else:\n",
        "                    total += right_max - height[right]\n",
        "                right -= 1\n",
        "        return total\n",
    );

    const RAISER: &str = concat!(
        "class Solution:\n",
        "    def trap(self, height):\n",
        "        raise ValueError('intentional failure')\n",
    );

    fn profile(fragment: &str, input: Value, mode: ProfileMode) -> ProfileResult {
        let caps = capability::probe();
        Interpreter::without_stdlib(Default::default()).enter(|vm| {
            let class = load_solution(vm, fragment).expect("fragment loads");
            let instance = class.as_object().call((), vm).expect("instantiates");
            let method = instance.get_attr("trap", vm).expect("method exists");
            let args = CallArgs::classify(input);
            profile_entry(vm, &method, "trap", &args, mode, caps)
        })
    }

    #[test]
    fn test_unwrapped_success_measures_time_and_memory() {
        let result = profile(RAIN_WATER, json!([2, 0, 2]), ProfileMode::Unwrapped);
        assert!(result.success);
        assert_eq!(result.result, Some(json!(2)));
        assert!(result.execution_time_ms.unwrap() >= 0.0);
        // Memory figures are noisy; assert shape, not values
        assert!(result.memory_before_mb.is_some());
        assert!(result.memory_after_mb.is_some());
        assert!(result.memory_used_mb.is_some());
        assert!(result.call_stats.is_none());
        assert!(result.line_stats.is_none());
    }

    #[test]
    fn test_elapsed_time_never_negative_across_runs() {
        for _ in 0..2 {
            let result = profile(RAIN_WATER, json!([0, 1, 0, 2]), ProfileMode::Unwrapped);
            assert!(result.execution_time_ms.unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_raising_entry_point_is_failure_without_timing() {
        let result = profile(RAISER, json!([1, 2]), ProfileMode::Unwrapped);
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("intentional failure"));
        assert!(result.execution_time_ms.is_none());
        assert!(result.result.is_none());
    }

    #[test]
    fn test_per_call_mode_still_returns_correct_value() {
        // With the hook present this exercises the harness; without it the
        // mode downgrades. The call result must be identical either way.
        let result = profile(RAIN_WATER, json!([2, 0, 2]), ProfileMode::PerCall);
        assert!(result.success);
        assert_eq!(result.result, Some(json!(2)));
        if capability::probe().call_events {
            let stats = result.call_stats.expect("harness collected stats");
            assert!(stats.iter().any(|r| r.function == "trap"));
        }
    }

    #[test]
    fn test_per_line_mode_still_returns_correct_value() {
        let result = profile(RAIN_WATER, json!([2, 0, 2]), ProfileMode::PerLine);
        assert!(result.success);
        assert_eq!(result.result, Some(json!(2)));
        if capability::probe().line_events {
            let stats = result.line_stats.expect("harness collected stats");
            assert!(!stats.is_empty());
            assert!(stats.iter().all(|r| r.hits > 0));
        }
    }

    #[test]
    fn test_mode_resolution_prefers_per_call() {
        assert_eq!(ProfileMode::from_flags(true, true), ProfileMode::PerCall);
        assert_eq!(ProfileMode::from_flags(false, true), ProfileMode::PerLine);
        assert_eq!(
            ProfileMode::from_flags(false, false),
            ProfileMode::Unwrapped
        );
    }

    #[test]
    fn test_missing_capability_downgrades_to_unwrapped() {
        let absent = TraceCapability::default();
        assert_eq!(
            ProfileMode::PerCall.effective(absent),
            ProfileMode::Unwrapped
        );
        assert_eq!(
            ProfileMode::PerLine.effective(absent),
            ProfileMode::Unwrapped
        );
    }

    #[test]
    fn test_render_call_stats_caps_at_limit() {
        let records: Vec<CallRecord> = (0..30)
            .map(|i| CallRecord {
                function: format!("fn_{i}"),
                calls: 1,
                cumulative_ms: f64::from(i),
                own_ms: f64::from(i),
            })
            .collect();
        let lines = render_call_stats(&records);
        // header + rule + 20 rows + rule
        assert_eq!(lines.len(), 2 + CALL_STATS_LIMIT + 1);
    }

    #[test]
    fn test_render_empty_stats() {
        assert_eq!(render_call_stats(&[]).len(), 1);
        assert_eq!(render_line_stats(&[]).len(), 1);
    }
}
