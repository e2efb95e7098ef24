//! Value operations.
//!
//! Pure functions over [`Value`] pairs. They return the error kind
//! only; the interpreter attaches spans and frames.

use std::rc::Rc;

use flex_ir::BinaryOp;

use crate::error::RuntimeErrorKind;
use crate::value::Value;

/// Apply a binary operator. `and`/`or` land here with both operands
/// already evaluated; neither short-circuits.
pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeErrorKind> {
    use BinaryOp::*;

    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => number_op(op, *a, *b),
        (Value::Str(a), Value::Str(b)) if op == Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::str(joined))
        }
        (Value::Str(s), Value::Number(n)) if op == Mul => Ok(Value::str(s.repeat(repeat_count(*n)))),
        (Value::List(items), _) => list_op(op, items, rhs),
        _ => Err(RuntimeErrorKind::IllegalOperation),
    }
}

/// Unary minus, defined as multiplication by -1 so it follows the
/// same operand rules as `*`.
pub fn negate(value: &Value) -> Result<Value, RuntimeErrorKind> {
    binary(BinaryOp::Mul, value, &Value::Number(-1.0))
}

/// Logical `not`. Only numbers carry a logical value directly.
pub fn not(value: &Value) -> Result<Value, RuntimeErrorKind> {
    match value {
        Value::Number(n) => Ok(Value::bool(*n == 0.0)),
        _ => Err(RuntimeErrorKind::IllegalOperation),
    }
}

fn number_op(op: BinaryOp, a: f64, b: f64) -> Result<Value, RuntimeErrorKind> {
    use BinaryOp::*;

    let value = match op {
        Add => Value::Number(a + b),
        Sub => Value::Number(a - b),
        Mul => Value::Number(a * b),
        Div => {
            if b == 0.0 {
                return Err(RuntimeErrorKind::DivisionByZero);
            }
            Value::Number(a / b)
        }
        Pow => Value::Number(a.powf(b)),
        Eq => Value::bool(a == b),
        Ne => Value::bool(a != b),
        Lt => Value::bool(a < b),
        Gt => Value::bool(a > b),
        LtEq => Value::bool(a <= b),
        GtEq => Value::bool(a >= b),
        And => Value::bool(a != 0.0 && b != 0.0),
        Or => Value::bool(a != 0.0 || b != 0.0),
    };
    Ok(value)
}

fn list_op(
    op: BinaryOp,
    items: &Rc<std::cell::RefCell<Vec<Value>>>,
    rhs: &Value,
) -> Result<Value, RuntimeErrorKind> {
    use BinaryOp::*;

    match (op, rhs) {
        // Append builds a new outer list; elements stay shared.
        (Add, _) => {
            let mut appended = items.borrow().clone();
            appended.push(rhs.clone());
            Ok(Value::list(appended))
        }
        (Sub, Value::Number(n)) => {
            let mut removed = items.borrow().clone();
            let index =
                element_index(*n, removed.len()).ok_or(RuntimeErrorKind::RemoveIndexOutOfBounds)?;
            removed.remove(index);
            Ok(Value::list(removed))
        }
        (Mul, Value::List(other)) => {
            let mut joined = items.borrow().clone();
            joined.extend(other.borrow().iter().cloned());
            Ok(Value::list(joined))
        }
        // Indexing hands back the live element, not a copy.
        (Div, Value::Number(n)) => {
            let elements = items.borrow();
            let index =
                element_index(*n, elements.len()).ok_or(RuntimeErrorKind::IndexOutOfBounds)?;
            Ok(elements[index].clone())
        }
        _ => Err(RuntimeErrorKind::IllegalOperation),
    }
}

/// Truncate a numeric index and range-check it.
fn element_index(n: f64, len: usize) -> Option<usize> {
    if !n.is_finite() {
        return None;
    }
    let index = n as i64;
    if index < 0 || index as u64 >= len as u64 {
        return None;
    }
    Some(index as usize)
}

/// String repetition count: non-positive counts give the empty
/// string, fractional counts round up.
fn repeat_count(n: f64) -> usize {
    if n <= 0.0 || !n.is_finite() {
        0
    } else {
        n.ceil() as usize
    }
}
