//! Flex CLI entry point.

use flexc::commands::{lex_file, parse_file, run_file};
use flexc::repl;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        repl::run();
        return;
    }

    let command = &args[1];
    match command.as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: flex run <file.flx>");
                std::process::exit(1);
            }
            run_file(&args[2]);
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: flex lex <file.flx>");
                std::process::exit(1);
            }
            lex_file(&args[2]);
        }
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: flex parse <file.flx>");
                std::process::exit(1);
            }
            parse_file(&args[2]);
        }
        "repl" => {
            repl::run();
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Flex {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // A bare file path runs it
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("flx"))
            {
                run_file(command);
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("Flex interpreter");
    println!();
    println!("Usage: flex [command] [options]");
    println!();
    println!("Commands:");
    println!("  run <file.flx>    Evaluate a Flex program and print its value");
    println!("  lex <file.flx>    Tokenize and display tokens");
    println!("  parse <file.flx>  Parse and dump the syntax tree");
    println!("  repl              Start the interactive shell (default)");
    println!("  help              Show this help message");
    println!("  version           Show version information");
    println!();
    println!("Examples:");
    println!("  flex                  # interactive shell");
    println!("  flex run main.flx");
    println!("  flex lex main.flx");
}
