use myshell::{Interpreter, ShellConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let config: ShellConfig = argh::from_env();

    let mut sh = Interpreter::new(config);
    match sh.repl() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("myshell: {e:#}");
            ExitCode::FAILURE
        }
    }
}
