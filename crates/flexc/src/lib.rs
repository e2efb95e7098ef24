//! Flex interpreter CLI.
//!
//! The binary dispatches to [`commands`] for one-shot file commands
//! and to [`repl`] for the interactive shell.

pub mod commands;
pub mod repl;
