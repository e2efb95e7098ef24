//! Lexical scope chain.
//!
//! Scopes are shared, interior-mutable tables: a task value keeps its
//! defining scope alive, and a call's child scope parents there, not
//! at the caller.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::Value;

struct Scope {
    bindings: FxHashMap<String, Value>,
    parent: Option<ScopeRef>,
}

/// Shared handle to one scope in the chain.
#[derive(Clone)]
pub struct ScopeRef(Rc<RefCell<Scope>>);

impl ScopeRef {
    /// A scope with no parent, used for the global frame.
    pub fn root() -> Self {
        ScopeRef(Rc::new(RefCell::new(Scope {
            bindings: FxHashMap::default(),
            parent: None,
        })))
    }

    /// A fresh scope chained under `self`.
    pub fn child(&self) -> Self {
        ScopeRef(Rc::new(RefCell::new(Scope {
            bindings: FxHashMap::default(),
            parent: Some(self.clone()),
        })))
    }

    /// Resolve a name, walking outward through the chain.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let scope = self.0.borrow();
        if let Some(value) = scope.bindings.get(name) {
            return Some(value.clone());
        }
        scope.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Bind a name in this scope. Always writes the innermost table,
    /// shadowing any outer binding of the same name.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }
}

impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.0.borrow();
        f.debug_struct("ScopeRef")
            .field("bindings", &scope.bindings.len())
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}
