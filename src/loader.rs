//! Solution loading via the embedded interpreter
//!
//! Each notebook's extracted code runs in a fresh scope of a fresh
//! interpreter, never against shared globals, so solutions processed in the
//! same batch cannot collide through module-level names.
//!
//! This executes notebook-sourced code without restriction. Notebooks are
//! trusted first-party inputs; sandboxing is explicitly out of scope.

use rustpython_vm::builtins::{PyType, PyTypeRef};
use rustpython_vm::compiler::Mode;
use rustpython_vm::VirtualMachine;

use crate::convert::format_exception;
use crate::error::ProfileError;
use crate::notebook::SOLUTION_CLASS_NAME;

/// Compile and execute an extracted code fragment, returning the `Solution`
/// class it defines.
///
/// Syntax errors and module-level runtime errors surface as
/// [`ProfileError::Load`] with the Python message preserved. A fragment
/// that runs but binds no `Solution` class (or binds a non-class) is
/// [`ProfileError::SolutionNotFound`].
pub fn load_solution(vm: &VirtualMachine, fragment: &str) -> Result<PyTypeRef, ProfileError> {
    let scope = vm.new_scope_with_builtins();

    let code = vm
        .compile(fragment, Mode::Exec, "<solution>".to_owned())
        .map_err(|e| ProfileError::Load(e.to_string()))?;
    vm.run_code_obj(code, scope.clone())
        .map_err(|e| ProfileError::Load(format_exception(vm, &e)))?;

    let binding = scope
        .globals
        .get_item_opt(SOLUTION_CLASS_NAME, vm)
        .ok()
        .flatten()
        .ok_or(ProfileError::SolutionNotFound)?;
    binding
        .downcast::<PyType>()
        .map_err(|_| ProfileError::SolutionNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustpython_vm::Interpreter;

    fn load(fragment: &str) -> Result<String, ProfileError> {
        Interpreter::without_stdlib(Default::default()).enter(|vm| {
            load_solution(vm, fragment).map(|cls| cls.name().to_string())
        })
    }

    #[test]
    fn test_loads_solution_class() {
        let name = load("class Solution:\n    def trap(self, height):\n        return 0\n")
            .unwrap();
        assert_eq!(name, "Solution");
    }

    #[test]
    fn test_last_binding_wins() {
        let fragment = concat!(
            "class Solution:\n",
            "    def first(self):\n",
            "        return 1\n",
            "\n",
            "class Solution:\n",
            "    def second(self):\n",
            "        return 2\n",
        );
        assert!(load(fragment).is_ok());
    }

    #[test]
    fn test_syntax_error_is_load_error() {
        let err = load("class Solution\n    broken").unwrap_err();
        assert!(matches!(err, ProfileError::Load(_)));
    }

    #[test]
    fn test_module_level_raise_is_load_error() {
        let err = load("raise ValueError('boom')\nclass Solution:\n    pass\n").unwrap_err();
        match err {
            ProfileError::Load(message) => assert!(message.contains("boom")),
            other => panic!("expected load error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_class_is_not_found() {
        let err = load("x = 1\n").unwrap_err();
        assert!(matches!(err, ProfileError::SolutionNotFound));
    }

    #[test]
    fn test_non_class_binding_is_not_found() {
        let err = load("Solution = 42\n").unwrap_err();
        assert!(matches!(err, ProfileError::SolutionNotFound));
    }
}
