//! Entry-point selection on a loaded Solution class
//!
//! Notebooks name their solution methods after the problem at hand, so
//! there is no fixed contract to call. Selection runs an ordered list of
//! rules: the conventional `trap` name first, then the first public method
//! in declaration order. The class attribute table is insertion-ordered, so
//! "first" means source order, not alphabetical.

use rustpython_vm::builtins::PyType;
use rustpython_vm::Py;

/// Method name favored by the dominant problem type in this corpus
pub const PREFERRED_METHOD: &str = "trap";

/// Pick the method to profile, or `None` when the class defines no public
/// callable of its own (inherited members are not considered).
pub fn resolve_entry_point(class: &Py<PyType>) -> Option<String> {
    let attributes = class.attributes.read();

    let mut first_public: Option<String> = None;
    for (name, value) in attributes.iter() {
        let name = name.as_str();
        if name.starts_with('_') || !value.is_callable() {
            continue;
        }
        if name == PREFERRED_METHOD {
            return Some(PREFERRED_METHOD.to_string());
        }
        if first_public.is_none() {
            first_public = Some(name.to_string());
        }
    }
    first_public
}
