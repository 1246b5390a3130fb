//! Lexically-scoped symbol table: a parent-linked chain of frames.
//!
//! Shared via `Rc<RefCell<_>>` so a `Function` value can capture the frame
//! it was defined in and still observe later writes into that frame made
//! through any other handle (the closure aliasing the spec calls for).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

struct EnvInner {
    symbols: HashMap<String, Value>,
    parent: Option<Env>,
}

#[derive(Clone)]
pub struct Env(Rc<RefCell<EnvInner>>);

impl Env {
    pub fn new_root() -> Self {
        Env(Rc::new(RefCell::new(EnvInner {
            symbols: HashMap::new(),
            parent: None,
        })))
    }

    pub fn child_of(parent: &Env) -> Self {
        Env(Rc::new(RefCell::new(EnvInner {
            symbols: HashMap::new(),
            parent: Some(parent.clone()),
        })))
    }

    /// Walk the parent chain looking for `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        let inner = self.0.borrow();
        match inner.symbols.get(name) {
            Some(value) => Some(value.clone()),
            None => inner.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Bind `name` in this frame, shadowing any binding of the same name in
    /// an outer frame. Used both for fresh `assign` and for reassignment
    /// through the bare `name = value` form, which the grammar treats the
    /// same way (no implicit write-through to an outer scope).
    pub fn set(&self, name: &str, value: Value) {
        self.0.borrow_mut().symbols.insert(name.to_owned(), value);
    }

    /// Walk to the outermost frame - used by `launch` so a sub-script
    /// shares the running program's global bindings rather than the local
    /// call frame it happened to be invoked from.
    pub fn root(&self) -> Env {
        let parent = self.0.borrow().parent.clone();
        match parent {
            Some(parent) => parent.root(),
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    #[test]
    fn lookup_walks_parent_chain() {
        let root = Env::new_root();
        root.set("x", Value::Number(Number::Int(1)));
        let child = Env::child_of(&root);
        assert!(matches!(child.get("x"), Some(Value::Number(Number::Int(1)))));
    }

    #[test]
    fn set_in_child_does_not_leak_to_parent() {
        let root = Env::new_root();
        let child = Env::child_of(&root);
        child.set("y", Value::Number(Number::Int(2)));
        assert!(root.get("y").is_none());
    }

    #[test]
    fn missing_symbol_is_none() {
        let root = Env::new_root();
        assert!(root.get("nope").is_none());
    }
}
