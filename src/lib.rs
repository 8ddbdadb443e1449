//! A small interactive command interpreter with background job control.
//!
//! One command per prompt cycle: the line is tokenized into an argument
//! vector, then dispatched either to a builtin (`exit`, `history`, `fg`)
//! or launched as a child process, optionally detached with a trailing
//! `&`. Background jobs live in a bounded table and can be promoted back
//! to the foreground; keyboard interrupts terminate the whole foreground
//! process group without touching the interpreter itself.
//!
//! The main entry point is [`Interpreter`]; [`ShellConfig`] carries the
//! tunables (line length, history and job capacities, prompt). The public
//! modules expose the building blocks for embedding or testing individual
//! pieces: the tokenizer, the job table, the history log and the
//! foreground slot.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod external;
pub mod foreground;
pub mod history;
mod interpreter;
pub mod jobs;
pub mod lexer;
pub mod state;

pub use config::ShellConfig;
pub use error::ShellError;
pub use interpreter::Interpreter;
