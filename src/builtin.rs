use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::external::{report_if_signaled, terminated_by_signal};
use crate::interpreter::Factory;
use crate::lexer::ArgumentVector;
use crate::state::ShellState;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process. They intercept
/// dispatch before any external launch.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "exit" or "fg".
    fn name() -> &'static str;

    /// Executes the command against the interpreter state.
    ///
    /// Return value should follow shell conventions: 0 for success,
    /// non-zero for error.
    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<ExitCode> {
        match BuiltinCommand::execute(*self, stdout, state) {
            Ok(x) => Ok(x),
            Err(e) => {
                eprintln!("{e:#}");
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _state: &mut ShellState,
    ) -> Result<ExitCode> {
        if self.is_error {
            eprint!("{}", self.output);
            Ok(1)
        } else {
            stdout.write_all(self.output.as_bytes())?;
            Ok(0)
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, argv: &ArgumentVector) -> Option<Box<dyn ExecutableCommand>> {
        if argv.name() == Some(T::name()) {
            if argv.background {
                log::debug!("ignoring trailing '&' on builtin {}", T::name());
            }
            Some(match T::from_args(&[T::name()], &argv.tail()) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Leave the shell, refusing while background jobs are still running.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        // Sweep out jobs that already finished before deciding.
        for (pid, line) in state.jobs.reap_finished() {
            writeln!(stdout, "[{pid}] done  {line}")?;
        }
        let remaining = state.jobs.count();
        if remaining > 0 {
            writeln!(stdout, "exit: {remaining} job(s) remaining")?;
            return Ok(1);
        }
        state.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List recently issued commands, or re-execute one of them.
pub struct History {
    #[argh(option, short = 'i')]
    /// re-execute the command stored at this index
    pub index: Option<usize>,
}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        match self.index {
            Some(index) => {
                let line = state
                    .history
                    .get(index)
                    .map_err(|e| anyhow!("history: {e}"))?
                    .to_string();
                writeln!(stdout, "{line}")?;
                // The dispatcher runs the recalled line after this builtin
                // returns; executing it here would recurse into dispatch.
                state.pending_recall = Some(line);
                Ok(0)
            }
            None => {
                for (i, line) in state.history.iter() {
                    writeln!(stdout, "{i}  {line}")?;
                }
                Ok(0)
            }
        }
    }
}

#[derive(FromArgs)]
/// List the background jobs currently tracked by the shell.
pub struct Jobs {}

impl BuiltinCommand for Jobs {
    fn name() -> &'static str {
        "jobs"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        if state.jobs.is_empty() {
            writeln!(stdout, "no background jobs")?;
            return Ok(0);
        }
        // Indices shown here are the ones `fg %N` accepts, valid until the
        // next removal.
        for (index, job) in state.jobs.iter() {
            writeln!(stdout, "[{index}] {}  {}", job.pid(), job.command_line())?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Promote a background job to the foreground and wait for it.
pub struct Fg {
    #[argh(positional)]
    /// job to promote, written %<index> (a bare index is accepted too)
    pub job: String,
}

impl BuiltinCommand for Fg {
    fn name() -> &'static str {
        "fg"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<ExitCode> {
        let spec = self.job.strip_prefix('%').unwrap_or(&self.job);
        let index: usize = spec
            .parse()
            .map_err(|_| anyhow!("fg: invalid job '{}', expected %<index>", self.job))?;

        // remove() checks bounds before mutating, so a bad index leaves
        // both the table and the foreground slot untouched.
        let mut job = state.jobs.remove(index).map_err(|e| anyhow!("fg: {e}"))?;
        let pid = job.pid();
        writeln!(stdout, "{}", job.command_line())?;
        log::debug!("promoting pid {pid} to foreground");

        state.foreground.occupy(pid);
        let waited = job.wait();
        state.foreground.release();

        let status = waited.with_context(|| format!("waiting for pid {pid}"))?;
        report_if_signaled(stdout, pid, status)?;
        Ok(status.code().unwrap_or_else(|| terminated_by_signal(status)))
    }
}
