//! End-to-end pipeline tests over full program texts, checking the
//! exact rendered diagnostic output.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use flex_eval::Frame;
use flex_ir::Source;
use flexc::commands::eval_source;

fn global() -> Rc<Frame> {
    Frame::global("<program>")
}

#[test]
fn test_program_value_display() {
    let source = Source::new("main.flx", "this x is 2\nx ^ 10 / 2 + 1");
    let value = eval_source(&source, &global()).unwrap();
    // Statement list: the assignment's value, then the expression.
    assert_eq!(value.to_string(), "2.0, 513.0");
}

#[test]
fn test_syntax_error_render() {
    let source = Source::new("main.flx", "1 +");
    let diag = eval_source(&source, &global()).unwrap_err();
    assert_eq!(
        diag.render(),
        "Invalid Syntax: Expected int, float, identifier, '+', '-', '(', '[', 'if', 'for', 'until' or 'task'\n\
         File main.flx, line 1\n\
         \n\
         1 +\n\
         \x20\x20\x20^"
    );
}

#[test]
fn test_illegal_character_render() {
    let source = Source::new("main.flx", "1 @ 2");
    let diag = eval_source(&source, &global()).unwrap_err();
    assert_eq!(
        diag.render(),
        "Illegal Character: '@'\n\
         File main.flx, line 1\n\
         \n\
         1 @ 2\n\
         \x20\x20^"
    );
}

#[test]
fn test_traceback_render_across_calls() {
    let text = "task inner(n)\n\
                give n / 0\n\
                enclose\n\
                task outer()\n\
                give inner(9)\n\
                enclose\n\
                outer()";
    let source = Source::new("main.flx", text);
    let diag = eval_source(&source, &global()).unwrap_err();
    assert_eq!(
        diag.render(),
        "Traceback (most recent call last):\n\
         File main.flx, line 7, in <program>\n\
         File main.flx, line 5, in outer\n\
         File main.flx, line 2, in inner\n\
         Runtime Error: Division by zero\n\
         \n\
         give n / 0\n\
         \x20\x20\x20\x20\x20^^^^^"
    );
}

#[test]
fn test_runtime_error_at_top_level_names_program_frame() {
    let source = Source::new("main.flx", "this x is 1\ny");
    let diag = eval_source(&source, &global()).unwrap_err();
    assert_eq!(
        diag.render(),
        "Traceback (most recent call last):\n\
         File main.flx, line 2, in <program>\n\
         Runtime Error: 'y' is not defined\n\
         \n\
         y\n\
         ^"
    );
}

#[test]
fn test_repl_style_session_keeps_definitions() {
    let frame = global();
    eval_source(&Source::new("<stdin>", "task twice(n)\ngive n * 2\nenclose"), &frame).unwrap();
    let value = eval_source(&Source::new("<stdin>", "twice(21)"), &frame).unwrap();
    assert_eq!(value.to_string(), "42.0");
}
