//! I/O utilities for loading queue scenario scripts.
//!
//! Provides the data model and parser for a small line-oriented workload
//! format that drives a queue through its public operations, and a loader
//! that reads such scripts from disk. The host binary executes the parsed
//! steps against a live queue.

/// File loading utilities for scenario scripts.
///
/// Reads a script from disk and hands the text to the parser, attaching the
/// path to any error so failures point at the offending file.
pub mod loader;

/// Parser for the scenario script format.
///
/// Turns each non-blank, non-comment line into a [`Command`], recording the
/// source line number so execution errors can be reported against the
/// script.
pub mod parser;

use cq_core::Slot;

/// A single queue operation requested by a script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create <capacity>`: build a fresh queue, releasing any previous one.
    Create(usize),
    /// `append <v>...`: append each value in order.
    Append(Vec<Slot>),
    /// `fetch <max> <timeout_ms>`: drain up to `max` values; a negative
    /// timeout waits indefinitely.
    Fetch { max: usize, timeout_ms: i64 },
    /// `expect <v>...`: the last fetch must have returned exactly these
    /// values. With no values, it must have returned none.
    Expect(Vec<Slot>),
    /// `empty`: report whether the queue is empty.
    Empty,
    /// `clear`: discard every buffered value.
    Clear,
    /// `running <true|false>`: set the cooperative running flag.
    Running(bool),
    /// `release`: tear down the queue.
    Release,
}

/// A command together with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub command: Command,
}

/// Parsed scenario script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub steps: Vec<Step>,
}

/// Errors produced while parsing a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: cannot parse `{text}`")]
    Syntax { line: usize, text: String },
}
