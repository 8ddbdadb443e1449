use crate::lexer::ArgumentVector;
use crate::state::ShellState;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells.
pub type ExitCode = i32;

/// Object-safe trait for anything the dispatcher can run: builtins and
/// external command launches alike.
pub trait ExecutableCommand {
    /// Executes the command. `stdout` receives normal output (diagnostics
    /// go to standard error); `state` gives access to the job table,
    /// history and foreground slot.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, state: &mut ShellState)
    -> Result<ExitCode>;
}

/// Factory that tries to create a command from a parsed argument vector.
///
/// Returns `None` when the factory doesn't recognize the command name.
/// Builtin factories match on the first token; the external factory
/// resolves the name against the search path.
pub trait CommandFactory {
    fn try_create(&self, argv: &ArgumentVector) -> Option<Box<dyn ExecutableCommand>>;
}
