//! The tree-walking interpreter.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use flex_ir::{NodeId, NodeKind, Program, Source, Span, UnaryOp};

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::frame::Frame;
use crate::ops;
use crate::value::{TaskFn, Value};

/// Calls nested deeper than this abort with a runtime error instead
/// of overflowing the native stack.
const CALL_DEPTH_LIMIT: usize = 500;

/// Non-local exit travelling up the walk. `give`, `proceed` and
/// `stop` ride the error channel until a loop or call boundary
/// catches them; reaching the top unconverted is a runtime error.
#[derive(Debug)]
pub enum Unwind {
    Error(RuntimeError),
    Return(Value),
    Continue(Span),
    Break(Span),
}

type Exec = Result<Value, Unwind>;

pub struct Interpreter {
    program: Rc<Program>,
    source: Rc<Source>,
    /// Shared across the sub-interpreters created for calls.
    depth: Rc<Cell<usize>>,
}

impl Interpreter {
    pub fn new(program: Program, source: Rc<Source>) -> Self {
        Interpreter {
            program: Rc::new(program),
            source,
            depth: Rc::new(Cell::new(0)),
        }
    }

    /// Run the program's root statement sequence in `frame`.
    ///
    /// A top-level `give` yields its payload as the program value.
    /// `proceed` and `stop` escaping every loop are runtime errors.
    pub fn evaluate(&self, frame: &Rc<Frame>) -> Result<Value, RuntimeError> {
        trace!(source = %self.source.name, "evaluate");
        match self.eval(self.program.root, frame) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Continue(span)) => {
                Err(self.runtime_error(RuntimeErrorKind::ProceedOutsideLoop, span, frame))
            }
            Err(Unwind::Break(span)) => {
                Err(self.runtime_error(RuntimeErrorKind::StopOutsideLoop, span, frame))
            }
            Err(Unwind::Error(error)) => Err(error),
        }
    }

    fn eval(&self, id: NodeId, frame: &Rc<Frame>) -> Exec {
        let span = self.program.arena.span(id);
        match self.program.arena.kind(id) {
            NodeKind::Number(n) => Ok(Value::Number(*n)),
            NodeKind::Str(s) => Ok(Value::str(s)),
            NodeKind::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(*item, frame)?);
                }
                Ok(Value::list(values))
            }
            NodeKind::Unary { op, operand } => {
                let value = self.eval(*operand, frame)?;
                let result = match op {
                    UnaryOp::Pos => Ok(value),
                    UnaryOp::Neg => ops::negate(&value),
                    UnaryOp::Not => ops::not(&value),
                };
                result.map_err(|kind| self.raise(kind, span, frame))
            }
            NodeKind::Binary { op, lhs, rhs } => {
                let left = self.eval(*lhs, frame)?;
                let right = self.eval(*rhs, frame)?;
                ops::binary(*op, &left, &right).map_err(|kind| self.raise(kind, span, frame))
            }
            NodeKind::Assign { name, value } => {
                let value = self.eval(*value, frame)?;
                frame.scope.define(name.clone(), value.clone());
                Ok(value)
            }
            NodeKind::Access { name } => match frame.scope.lookup(name) {
                Some(value) => Ok(value.snapshot()),
                None => Err(self.raise(
                    RuntimeErrorKind::UndefinedVariable(name.clone()),
                    span,
                    frame,
                )),
            },
            NodeKind::If {
                cases,
                else_body,
                else_block,
            } => {
                for case in cases {
                    if self.eval(case.cond, frame)?.is_truthy() {
                        let value = self.eval(case.body, frame)?;
                        return Ok(if case.block { Value::null() } else { value });
                    }
                }
                match else_body {
                    Some(body) => {
                        let value = self.eval(*body, frame)?;
                        Ok(if *else_block { Value::null() } else { value })
                    }
                    None => Ok(Value::null()),
                }
            }
            NodeKind::For {
                var,
                start,
                end,
                step,
                body,
                block,
            } => self.eval_for(var, *start, *end, *step, *body, *block, frame),
            NodeKind::While { cond, body, block } => {
                let mut collected = Vec::new();
                loop {
                    if !self.eval(*cond, frame)?.is_truthy() {
                        break;
                    }
                    match self.eval(*body, frame) {
                        Ok(value) => collected.push(value),
                        Err(Unwind::Continue(_)) => continue,
                        Err(Unwind::Break(_)) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(loop_result(collected, *block))
            }
            NodeKind::TaskDef {
                name,
                params,
                body,
                auto_return,
            } => {
                let task = Value::Task(Rc::new(TaskFn {
                    name: name.clone(),
                    params: params.clone(),
                    body: *body,
                    auto_return: *auto_return,
                    program: Rc::clone(&self.program),
                    source: Rc::clone(&self.source),
                    def_span: span,
                    scope: frame.scope.clone(),
                }));
                if let Some(name) = name {
                    frame.scope.define(name.clone(), task.clone());
                }
                Ok(task)
            }
            NodeKind::Call { callee, args } => {
                let callee = self.eval(*callee, frame)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(*arg, frame)?);
                }
                self.call(&callee, arg_values, span, frame)
            }
            NodeKind::Return { value } => {
                let payload = match value {
                    Some(value) => self.eval(*value, frame)?,
                    None => Value::null(),
                };
                Err(Unwind::Return(payload))
            }
            NodeKind::Continue => Err(Unwind::Continue(span)),
            NodeKind::Break => Err(Unwind::Break(span)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn eval_for(
        &self,
        var: &str,
        start: NodeId,
        end: NodeId,
        step: Option<NodeId>,
        body: NodeId,
        block: bool,
        frame: &Rc<Frame>,
    ) -> Exec {
        let start_value = self.eval_number(start, frame)?;
        let end_value = self.eval_number(end, frame)?;
        let step_value = match step {
            Some(step) => {
                let value = self.eval_number(step, frame)?;
                if value == 0.0 {
                    let span = self.program.arena.span(step);
                    return Err(self.raise(RuntimeErrorKind::ZeroStep, span, frame));
                }
                value
            }
            None => 1.0,
        };

        let mut collected = Vec::new();
        let mut counter = start_value;
        loop {
            let in_range = if step_value >= 0.0 {
                counter < end_value
            } else {
                counter > end_value
            };
            if !in_range {
                break;
            }
            frame.scope.define(var.to_owned(), Value::Number(counter));
            match self.eval(body, frame) {
                Ok(value) => collected.push(value),
                // `proceed` still advances the counter.
                Err(Unwind::Continue(_)) => {}
                Err(Unwind::Break(_)) => break,
                Err(other) => return Err(other),
            }
            counter += step_value;
        }
        Ok(loop_result(collected, block))
    }

    /// Evaluate a loop bound, which must be a number.
    fn eval_number(&self, id: NodeId, frame: &Rc<Frame>) -> Result<f64, Unwind> {
        match self.eval(id, frame)? {
            Value::Number(n) => Ok(n),
            _ => {
                let span = self.program.arena.span(id);
                Err(self.raise(RuntimeErrorKind::IllegalOperation, span, frame))
            }
        }
    }

    fn call(&self, callee: &Value, args: Vec<Value>, call_span: Span, frame: &Rc<Frame>) -> Exec {
        let Value::Task(task) = callee else {
            return Err(self.raise(RuntimeErrorKind::IllegalOperation, call_span, frame));
        };
        trace!(task = task.display_name(), args = args.len(), "call");

        // Arity errors name the callee in its display form.
        if args.len() < task.params.len() {
            let kind = RuntimeErrorKind::TooFewArgs {
                missing: task.params.len() - args.len(),
                callee: callee.to_string(),
            };
            return Err(self.raise(kind, call_span, frame));
        }
        if args.len() > task.params.len() {
            let kind = RuntimeErrorKind::TooManyArgs {
                extra: args.len() - task.params.len(),
                callee: callee.to_string(),
            };
            return Err(self.raise(kind, call_span, frame));
        }
        if self.depth.get() >= CALL_DEPTH_LIMIT {
            return Err(self.raise(RuntimeErrorKind::RecursionLimit, call_span, frame));
        }

        // The call scope chains under the task's defining scope, not
        // the caller's.
        let scope = task.scope.child();
        for (param, arg) in task.params.iter().zip(args) {
            scope.define(param.clone(), arg);
        }
        let callee_frame = Frame::child(
            task.display_name(),
            frame,
            (Rc::clone(&self.source), call_span),
            scope,
        );

        // The body runs against the arena and source the task was
        // defined in, which may differ from ours in the REPL.
        let body_interp = Interpreter {
            program: Rc::clone(&task.program),
            source: Rc::clone(&task.source),
            depth: Rc::clone(&self.depth),
        };
        self.depth.set(self.depth.get() + 1);
        let outcome = body_interp.eval(task.body, &callee_frame);
        self.depth.set(self.depth.get() - 1);

        let result = match outcome {
            Ok(value) if task.auto_return => value,
            Ok(_) => Value::null(),
            Err(Unwind::Return(value)) => value,
            Err(Unwind::Continue(span)) => {
                return Err(body_interp.raise(
                    RuntimeErrorKind::ProceedOutsideLoop,
                    span,
                    &callee_frame,
                ));
            }
            Err(Unwind::Break(span)) => {
                return Err(body_interp.raise(
                    RuntimeErrorKind::StopOutsideLoop,
                    span,
                    &callee_frame,
                ));
            }
            Err(other) => return Err(other),
        };
        Ok(result.snapshot())
    }

    #[cold]
    fn runtime_error(
        &self,
        kind: RuntimeErrorKind,
        span: Span,
        frame: &Rc<Frame>,
    ) -> RuntimeError {
        RuntimeError {
            frames: frame.traceback(&self.source, span),
            kind,
            span,
            source: Rc::clone(&self.source),
        }
    }

    #[cold]
    fn raise(&self, kind: RuntimeErrorKind, span: Span, frame: &Rc<Frame>) -> Unwind {
        Unwind::Error(self.runtime_error(kind, span, frame))
    }
}

/// Block-shaped loop bodies collect one value per iteration; inline
/// bodies evaluate to the null sentinel.
fn loop_result(collected: Vec<Value>, block: bool) -> Value {
    if block {
        Value::list(collected)
    } else {
        Value::null()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use flex_lexer::tokenize;
    use flex_parse::parse;

    use super::*;

    fn run_in(frame: &Rc<Frame>, text: &str) -> Result<Value, RuntimeError> {
        let source = Source::new("<test>", text);
        let tokens = tokenize(&source).unwrap();
        let program = parse(&source, &tokens).unwrap();
        Interpreter::new(program, source).evaluate(frame)
    }

    fn run(text: &str) -> Result<Value, RuntimeError> {
        run_in(&Frame::global("<program>"), text)
    }

    /// Value of the last statement of a successful run.
    fn last(text: &str) -> Value {
        match run(text).unwrap() {
            Value::List(items) => items.borrow().last().cloned().unwrap(),
            other => other,
        }
    }

    fn error_kind(text: &str) -> RuntimeErrorKind {
        run(text).unwrap_err().kind
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(last("2 + 3 * 4"), Value::Number(14.0));
        assert_eq!(last("2 ^ 10"), Value::Number(1024.0));
        assert_eq!(last("2 ^ 3 ^ 2"), Value::Number(512.0));
        assert_eq!(last("-2 ^ 2"), Value::Number(-4.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(error_kind("5 / 0"), RuntimeErrorKind::DivisionByZero);
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            error_kind("x"),
            RuntimeErrorKind::UndefinedVariable("x".to_owned())
        );
    }

    #[test]
    fn test_assignment_yields_value_and_persists() {
        assert_eq!(last("this x is 5\nx + 1"), Value::Number(6.0));
        assert_eq!(last("this x is 5"), Value::Number(5.0));
    }

    #[test]
    fn test_state_survives_across_runs_on_one_frame() {
        let frame = Frame::global("<program>");
        run_in(&frame, "this x is 41").unwrap();
        let result = run_in(&frame, "x + 1").unwrap();
        let Value::List(items) = result else {
            panic!("expected statement list");
        };
        assert_eq!(items.borrow()[0], Value::Number(42.0));
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(last("\"a\" + \"b\""), Value::str("ab"));
        assert_eq!(last("\"ab\" * 2.5"), Value::str("ababab"));
        assert_eq!(error_kind("\"a\" + 1"), RuntimeErrorKind::IllegalOperation);
    }

    #[test]
    fn test_list_indexing() {
        assert_eq!(last("[10, 20, 30] / 1"), Value::Number(20.0));
        assert_eq!(
            error_kind("[10, 20, 30] / 5"),
            RuntimeErrorKind::IndexOutOfBounds
        );
    }

    #[test]
    fn test_logic_and_comparisons() {
        assert_eq!(last("1 < 2 and 3 < 4"), Value::Number(1.0));
        assert_eq!(last("not 0"), Value::Number(1.0));
        assert_eq!(last("1 = 2"), Value::Number(0.0));
        assert_eq!(last("1 ! 2"), Value::Number(1.0));
    }

    #[test]
    fn test_inline_if_yields_branch_value() {
        assert_eq!(last("if 1 do 7"), Value::Number(7.0));
        assert_eq!(last("if 0 do 7"), Value::null());
    }

    #[test]
    fn test_block_if_yields_null() {
        assert_eq!(last("if 1 do\n7\nenclose"), Value::null());
    }

    #[test]
    fn test_elif_and_else_chain() {
        let text = "this x is 2\nif x = 1 do\n10\nelif x = 2 do\n20\nelse\n30\nenclose";
        // Block arms still evaluate for effect only.
        assert_eq!(last(text), Value::null());
        assert_eq!(
            last("this x is 3\nif x = 1 do 10 elif x = 2 do 20 else 30"),
            Value::Number(30.0)
        );
    }

    #[test]
    fn test_for_collects_block_iterations() {
        let result = last("for i is 0 to 3 do\ni * 2\nenclose");
        let Value::List(iterations) = result else {
            panic!("expected collected list");
        };
        // Each iteration contributes its statement list.
        assert_eq!(iterations.borrow().len(), 3);
        assert_eq!(
            iterations.borrow()[2],
            Value::list(vec![Value::Number(4.0)])
        );
    }

    #[test]
    fn test_inline_for_yields_null() {
        assert_eq!(last("for i is 0 to 3 do i"), Value::null());
    }

    #[test]
    fn test_for_step_applies() {
        let result = last("for i is 0 to 10 step 4 do\ni\nenclose");
        let Value::List(iterations) = result else {
            panic!("expected collected list");
        };
        assert_eq!(iterations.borrow().len(), 3); // 0, 4, 8
    }

    #[test]
    fn test_for_descends_with_negative_step() {
        let result = last("for i is 3 to 0 step -1 do\ni\nenclose");
        let Value::List(iterations) = result else {
            panic!("expected collected list");
        };
        assert_eq!(iterations.borrow().len(), 3); // 3, 2, 1
    }

    #[test]
    fn test_for_zero_step_is_an_error() {
        assert_eq!(
            error_kind("for i is 0 to 3 step 0 do i"),
            RuntimeErrorKind::ZeroStep
        );
    }

    #[test]
    fn test_proceed_in_for_advances_counter() {
        let text = "for i is 0 to 4 do\nif i = 2 do proceed\ni\nenclose";
        let Value::List(iterations) = last(text) else {
            panic!("expected collected list");
        };
        // Iteration 2 is skipped but the loop still terminates.
        assert_eq!(iterations.borrow().len(), 3);
    }

    #[test]
    fn test_stop_shortens_collected_list() {
        let text = "for i is 0 to 10 do\nif i = 3 do stop\ni\nenclose";
        let Value::List(iterations) = last(text) else {
            panic!("expected collected list");
        };
        assert_eq!(iterations.borrow().len(), 3);
    }

    #[test]
    fn test_until_loops_while_true() {
        let text = "this i is 0\nuntil i < 3 do\nthis i is i + 1\nenclose\ni";
        assert_eq!(last(text), Value::Number(3.0));
    }

    #[test]
    fn test_loop_var_visible_after_loop() {
        assert_eq!(last("for i is 0 to 3 do i\ni"), Value::Number(2.0));
    }

    #[test]
    fn test_proceed_and_stop_outside_loops() {
        assert_eq!(error_kind("proceed"), RuntimeErrorKind::ProceedOutsideLoop);
        assert_eq!(error_kind("stop"), RuntimeErrorKind::StopOutsideLoop);
        assert_eq!(
            error_kind("task f()\nstop\nenclose\nf()"),
            RuntimeErrorKind::StopOutsideLoop
        );
    }

    #[test]
    fn test_top_level_give_yields_payload() {
        assert_eq!(run("give 5\n99").unwrap(), Value::Number(5.0));
        assert_eq!(run("give").unwrap(), Value::null());
    }

    #[test]
    fn test_task_call_and_give() {
        let text = "task add(a, b)\ngive a + b\nenclose\nadd(2, 3)";
        assert_eq!(last(text), Value::Number(5.0));
    }

    #[test]
    fn test_task_without_give_yields_null() {
        assert_eq!(last("task f()\n1 + 1\nenclose\nf()"), Value::null());
    }

    #[test]
    fn test_call_arity_errors() {
        let text = "task f(a, b)\ngive a\nenclose\n";
        let too_few = error_kind(&format!("{text}f(1)"));
        assert_eq!(
            too_few,
            RuntimeErrorKind::TooFewArgs {
                missing: 1,
                callee: "<function f>".to_owned()
            }
        );
        assert_eq!(too_few.to_string(), "1 too few args passed into <function f>");
        assert_eq!(
            error_kind(&format!("{text}f(1, 2, 3, 4)")),
            RuntimeErrorKind::TooManyArgs {
                extra: 2,
                callee: "<function f>".to_owned()
            }
        );
    }

    #[test]
    fn test_calling_a_number_is_illegal() {
        assert_eq!(
            error_kind("this x is 3\nx(1)"),
            RuntimeErrorKind::IllegalOperation
        );
    }

    #[test]
    fn test_task_locals_stay_local() {
        let text = "task f()\nthis local is 1\nenclose\nf()\nlocal";
        assert_eq!(
            error_kind(text),
            RuntimeErrorKind::UndefinedVariable("local".to_owned())
        );
    }

    #[test]
    fn test_closure_captures_defining_scope() {
        let text = "this n is 10\ntask f()\ngive n\nenclose\ntask g()\nthis n is 99\ngive f()\nenclose\ng()";
        // f resolves n where it was defined, not in g's call scope.
        assert_eq!(last(text), Value::Number(10.0));
    }

    #[test]
    fn test_recursion_depth_limit() {
        assert_eq!(
            error_kind("task f()\ngive f()\nenclose\nf()"),
            RuntimeErrorKind::RecursionLimit
        );
    }

    #[test]
    fn test_recursive_countdown() {
        let text = "task down(n)\nif n <= 0 do give 0\ngive down(n - 1)\nenclose\ndown(5)";
        assert_eq!(last(text), Value::Number(0.0));
    }

    #[test]
    fn test_traceback_names_call_chain() {
        let text = "task inner()\ngive 1 / 0\nenclose\ntask outer()\ngive inner()\nenclose\nouter()";
        let error = run(text).unwrap_err();
        let names: Vec<&str> = error.frames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["<program>", "outer", "inner"]);
    }

    #[test]
    fn test_anonymous_task_display() {
        assert_eq!(last("task (x)\ngive x\nenclose").to_string(), "<function <anonymous>>");
    }

    #[test]
    fn test_list_returned_from_task_is_snapshot() {
        let text = "task make()\nthis xs is [1, 2]\ngive xs\nenclose\nthis a is make()\nthis b is a + 3\na";
        // Appending built a new list; `a` still has two elements.
        let Value::List(items) = last(text) else {
            panic!("expected list");
        };
        assert_eq!(items.borrow().len(), 2);
    }
}
