//! Command handlers for the Flex CLI.
//!
//! Each command reads a file, pushes it through the pipeline and
//! reports diagnostics on stderr. The shared `eval_source` pipeline
//! is also what the REPL drives, one submission at a time.

use std::rc::Rc;

use tracing::debug;

use flex_diagnostic::Diagnostic;
use flex_eval::{Frame, Interpreter, Value};
use flex_ir::Source;

/// Lex, parse and evaluate one source against `frame`.
///
/// The frame is the caller's: file commands pass a fresh global
/// frame, the REPL keeps one alive across submissions so bindings
/// persist.
pub fn eval_source(source: &Rc<Source>, frame: &Rc<Frame>) -> Result<Value, Box<Diagnostic>> {
    let tokens = flex_lexer::tokenize(source).map_err(|err| Box::new(err.to_diagnostic(source)))?;
    let program =
        flex_parse::parse(source, &tokens).map_err(|err| Box::new(err.to_diagnostic(source)))?;
    debug!(source = %source.name, nodes = program.arena.len(), "evaluating");
    Interpreter::new(program, Rc::clone(source))
        .evaluate(frame)
        .map_err(|err| Box::new(err.to_diagnostic()))
}

/// Evaluate a program file and print its value.
pub fn run_file(path: &str) {
    let Some(text) = read_file(path) else {
        std::process::exit(1);
    };
    let source = Source::new(path, text);
    let frame = Frame::global("<program>");
    match eval_source(&source, &frame) {
        Ok(value) => println!("{value}"),
        Err(diag) => {
            eprintln!("{}", diag.render());
            std::process::exit(1);
        }
    }
}

/// Tokenize a file and print one token per line.
pub fn lex_file(path: &str) {
    let Some(text) = read_file(path) else {
        std::process::exit(1);
    };
    let source = Source::new(path, text);
    match flex_lexer::tokenize(&source) {
        Ok(tokens) => {
            for token in &tokens {
                println!("{:<10} {}", token.span.to_string(), token.kind.render());
            }
        }
        Err(err) => {
            eprintln!("{}", err.to_diagnostic(&source).render());
            std::process::exit(1);
        }
    }
}

/// Parse a file and dump the node arena.
pub fn parse_file(path: &str) {
    let Some(text) = read_file(path) else {
        std::process::exit(1);
    };
    let source = Source::new(path, text);
    let parsed = flex_lexer::tokenize(&source)
        .map_err(|err| Box::new(err.to_diagnostic(&source)))
        .and_then(|tokens| {
            flex_parse::parse(&source, &tokens).map_err(|err| Box::new(err.to_diagnostic(&source)))
        });
    match parsed {
        Ok(program) => {
            println!("root: {:?}", program.root);
            println!("{:#?}", program.arena);
        }
        Err(diag) => {
            eprintln!("{}", diag.render());
            std::process::exit(1);
        }
    }
}

fn read_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            eprintln!("error: cannot read {path}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_eval_source_reports_each_stage() {
        let frame = Frame::global("<program>");

        let ok = eval_source(&Source::new("<test>", "1 + 1"), &frame).unwrap();
        assert_eq!(ok.to_string(), "2.0");

        let lex = eval_source(&Source::new("<test>", "1 @ 2"), &frame).unwrap_err();
        assert!(lex.render().starts_with("Illegal Character"));

        let parse = eval_source(&Source::new("<test>", "1 +"), &frame).unwrap_err();
        assert!(parse.render().starts_with("Invalid Syntax"));

        let runtime = eval_source(&Source::new("<test>", "1 / 0"), &frame).unwrap_err();
        assert!(runtime.render().contains("Division by zero"));
    }

    #[test]
    fn test_eval_source_keeps_frame_state() {
        let frame = Frame::global("<program>");
        eval_source(&Source::new("<stdin>", "this x is 2"), &frame).unwrap();
        let value = eval_source(&Source::new("<stdin>", "x * 21"), &frame).unwrap();
        assert_eq!(value.to_string(), "42.0");
    }
}
