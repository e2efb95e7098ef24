//! Runtime values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use flex_ir::{NodeId, Program, Source, Span};

use crate::environment::ScopeRef;

/// A user-defined task (function).
///
/// Carries its own program arena and source so a task defined in one
/// REPL submission stays callable from later ones.
#[derive(Debug)]
pub struct TaskFn {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: NodeId,
    pub auto_return: bool,
    pub program: Rc<Program>,
    pub source: Rc<Source>,
    pub def_span: Span,
    /// Defining scope; call scopes chain here, not at the caller.
    pub scope: ScopeRef,
}

impl TaskFn {
    /// Name used in tracebacks and display forms.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

/// A runtime value. Lists share their element storage through `Rc`,
/// so snapshots of a binding copy the outer list but keep elements
/// reference-shared.
#[derive(Clone, Debug)]
pub enum Value {
    Number(f64),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Task(Rc<TaskFn>),
}

impl Value {
    /// The null sentinel.
    pub fn null() -> Value {
        Value::Number(0.0)
    }

    pub fn bool(value: bool) -> Value {
        Value::Number(if value { 1.0 } else { 0.0 })
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn str(text: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(text.as_ref()))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Task(_) => true,
        }
    }

    /// Snapshot for variable access: scalars copy, a list copies its
    /// outer sequence while elements stay shared, tasks are shared.
    pub fn snapshot(&self) -> Value {
        match self {
            Value::List(items) => Value::List(Rc::new(RefCell::new(items.borrow().clone()))),
            other => other.clone(),
        }
    }

    /// Quoted/bracketed form for debug output.
    pub fn repr(&self) -> String {
        match self {
            Value::Number(_) | Value::Task(_) => self.to_string(),
            Value::Str(s) => format!("\"{s}\""),
            Value::List(items) => {
                let inner: Vec<String> = items.borrow().iter().map(Value::repr).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }
}

/// Render a number the way the display form requires: integral finite
/// doubles keep a trailing `.0`.
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 {
        write!(f, "{n:.1}")
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => fmt_number(*n, f),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Task(task) => write!(f, "<function {}>", task.display_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => *a.borrow() == *b.borrow(),
            (Value::Task(a), Value::Task(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
