use crate::builtin::{Exit, Fg, History, Jobs};
use crate::command::{CommandFactory, ExitCode};
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::foreground::install_signal_forwarding;
use crate::lexer;
use crate::state::ShellState;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate — builtins and
/// ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The command dispatcher and its read-eval-print loop.
///
/// Each input line is tokenized and offered to the command factories in
/// order: builtins first (`exit`, `history`, `fg`), then the external
/// launcher. The interpreter owns all job-control state; see
/// [`ShellState`].
///
/// Example
/// ```no_run
/// use myshell::{Interpreter, ShellConfig};
/// let mut sh = Interpreter::new(ShellConfig::default());
/// sh.repl().unwrap();
/// ```
pub struct Interpreter {
    state: ShellState,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter with the default command set.
    pub fn new(config: ShellConfig) -> Self {
        Self::with_factories(
            config,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<History>::default()),
                Box::new(Factory::<Fg>::default()),
                Box::new(Factory::<Jobs>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    /// Create an interpreter with a custom set of command factories.
    pub fn with_factories(config: ShellConfig, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            state: ShellState::new(config),
            commands,
        }
    }

    /// Parse and run one input line, writing command output to stdout.
    pub fn dispatch_line(&mut self, line: &str) -> Result<ExitCode> {
        let mut stdout = std::io::stdout();
        self.dispatch_line_with_output(line, &mut stdout)
    }

    /// Like [`dispatch_line`](Self::dispatch_line) with a caller-supplied
    /// output sink, so tests can capture what the user would see.
    pub fn dispatch_line_with_output(
        &mut self,
        line: &str,
        out: &mut dyn Write,
    ) -> Result<ExitCode> {
        let code = self.run_line(line, out)?;

        // `history -i` leaves the recalled line here instead of running it
        // itself; one level of recall is honored, deeper nesting refused.
        if let Some(recalled) = self.state.pending_recall.take() {
            let code = self.run_line(&recalled, out)?;
            if self.state.pending_recall.take().is_some() {
                eprintln!("history: nested re-execution is not supported");
            }
            return Ok(code);
        }
        Ok(code)
    }

    fn run_line(&mut self, line: &str, out: &mut dyn Write) -> Result<ExitCode> {
        let argv = lexer::split_line(line, self.state.config.max_line);
        if argv.is_empty() {
            return Ok(0);
        }
        log::debug!(
            "dispatching {:?} (background={})",
            argv.argv,
            argv.background
        );
        let result = self.dispatch_argv(&argv, out);
        // Recorded only now: `history -i N` must resolve N against the log
        // exactly as the listing the user just saw, before this line lands
        // in it. The stored form is the truncated line that actually ran.
        self.state.history.record(&argv.line);
        result
    }

    fn dispatch_argv(
        &mut self,
        argv: &lexer::ArgumentVector,
        out: &mut dyn Write,
    ) -> Result<ExitCode> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(argv) {
                return cmd.execute(out, &mut self.state);
            }
        }
        Err(ShellError::CommandNotFound {
            name: argv.name().unwrap_or_default().to_string(),
        }
        .into())
    }

    /// The interactive read-eval-print loop.
    ///
    /// Returns `Ok(())` on `exit` or end-of-input; any other read failure
    /// is propagated and terminates the interpreter with a non-zero
    /// status.
    pub fn repl(&mut self) -> Result<()> {
        install_signal_forwarding(self.state.foreground.clone())?;
        let mut rl = DefaultEditor::new()?;
        let prompt = self.state.config.prompt.clone();

        loop {
            // Announce jobs that finished since the last prompt.
            for (pid, line) in self.state.jobs.reap_finished() {
                println!("[{pid}] done  {line}");
            }

            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.as_str());
                    if let Err(e) = self.dispatch_line(&line) {
                        eprintln!("myshell: {e:#}");
                    }
                    if self.state.should_exit {
                        break;
                    }
                }
                // ^C at the prompt interrupts the read, nothing more:
                // prompt again.
                Err(ReadlineError::Interrupted) => continue,
                // ^D: orderly shutdown.
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
