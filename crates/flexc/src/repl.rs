//! Interactive shell.
//!
//! One line is one submission. The global frame survives across
//! submissions, so variables and tasks defined earlier stay usable.

use std::io::{BufRead, Write};

use flex_eval::Frame;
use flex_ir::Source;

use crate::commands::eval_source;

const PROMPT: &str = "FLEX >> ";

pub fn run() {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let frame = Frame::global("<program>");
    let mut line = String::new();

    loop {
        if stdout.write_all(PROMPT.as_bytes()).is_err() || stdout.flush().is_err() {
            break;
        }

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("error: {err}");
                break;
            }
        }

        let submission = line.trim();
        if submission == "exit" {
            break;
        }
        if submission.is_empty() {
            continue;
        }

        let source = Source::new("<stdin>", submission);
        match eval_source(&source, &frame) {
            Ok(value) => println!("{value}"),
            Err(diag) => println!("{}", diag.render()),
        }
    }
}
