use argh::FromArgs;

#[derive(FromArgs, Debug, Clone)]
/// An interactive command interpreter with background job control.
///
/// Reads one command per prompt cycle, runs it as a child process (or as
/// one of the builtins: exit, history, fg) and tracks jobs launched with a
/// trailing `&`.
pub struct ShellConfig {
    #[argh(option, default = "80")]
    /// maximum accepted input line length, in characters; longer lines are
    /// truncated
    pub max_line: usize,

    #[argh(option, default = "10")]
    /// number of command lines retained by the history builtin
    pub history_capacity: usize,

    #[argh(option, default = "10")]
    /// maximum number of tracked background jobs
    pub job_capacity: usize,

    #[argh(option, default = "String::from(\"myshell: \")")]
    /// prompt printed before each command
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_line: 80,
            history_capacity: 10,
            job_capacity: 10,
            prompt: String::from("myshell: "),
        }
    }
}
