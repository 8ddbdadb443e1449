use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::interpreter::Factory;
use crate::jobs::Job;
use crate::lexer::ArgumentVector;
use crate::state::ShellState;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Command that is not a builtin: a child process to be launched.
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<String>,
    background: bool,
    command_line: String,
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(&self, argv: &ArgumentVector) -> Option<Box<dyn ExecutableCommand>> {
        let name = argv.name()?;
        let search_paths = std::env::var_os("PATH").unwrap_or_default();
        let executable = find_command_path(&search_paths, Path::new(name))?;
        Some(Box::new(ExternalCommand {
            program: executable.into_owned(),
            args: argv.argv[1..].to_vec(),
            background: argv.background,
            command_line: argv.line.clone(),
        }))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<ExitCode> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        // The child leads its own process group so that a forced
        // termination of the foreground takes its descendants with it,
        // and so keyboard signals reach the shell alone.
        spawn_in_own_group(&mut cmd);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to launch {}", self.program.display()))?;
        let pid = child.id();
        log::debug!(
            "spawned pid {} ({}), background={}",
            pid,
            self.program.display(),
            self.background
        );

        if self.background {
            match state.jobs.register(Job::new(child, self.command_line)) {
                Ok(index) => writeln!(stdout, "[{index}] {pid}")?,
                Err(e) => {
                    // The process is already running; it just cannot be
                    // tracked. Known limitation of the bounded table.
                    eprintln!("myshell: {e}; pid {pid} left running untracked");
                }
            }
            Ok(0)
        } else {
            state.foreground.occupy(pid);
            let waited = child.wait();
            state.foreground.release();
            let status = waited.context("waiting for foreground process")?;
            report_if_signaled(stdout, pid, status)?;
            Ok(status.code().unwrap_or_else(|| terminated_by_signal(status)))
        }
    }
}

#[cfg(unix)]
fn spawn_in_own_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn spawn_in_own_group(_cmd: &mut Command) {}

#[cfg(unix)]
pub(crate) fn report_if_signaled(stdout: &mut dyn Write, pid: u32, status: ExitStatus) -> Result<()> {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
        writeln!(stdout, "[{pid}] terminated by signal {signal}")?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn report_if_signaled(
    _stdout: &mut dyn Write,
    _pid: u32,
    _status: ExitStatus,
) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
pub(crate) fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
pub(crate) fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it names an executable.
/// - Relative with multiple components (e.g., `bin/sh`): likewise.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: likewise.
/// - Single path component (no separators): try each directory in
///   `search_paths` (PATH) in order and return the first candidate that is
///   both present and executable.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned
/// `PathBuf` when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && is_executable(path) {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => {
            // Empty path -> not found
            None
        }
        (Some(x), None) => {
            // Single component -> search in PATH
            find_in_path(search_paths, x.as_os_str()).map(Cow::Owned)
        }
        _ => {
            // Multiple components -> search in current dir
            find_by_path(path).map(Cow::Borrowed)
        }
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable(path) { Some(path) } else { None }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::fs;
    use std::fs::File;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    #[cfg(unix)]
    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod +x");
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let res = find_command_path(osstr("/bin"), path);
        assert!(res.is_some(), "Expected to find /bin/sh via absolute path");
        let found = res.unwrap();
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let path = Path::new("/bin/nonexisting");
        let res = find_command_path(osstr("/bin"), path);
        assert!(
            res.is_none(),
            "Expected not to find /bin/nonexisting via absolute path"
        );
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        // Search for "sh" in PATH that includes /bin
        let path = Path::new("sh");
        let res = find_command_path(osstr("/bin"), path);
        let found = res.expect("Expected to find 'sh' in /bin via PATH search");
        assert!(
            found.as_ref().ends_with("sh"),
            "Found path should end with 'sh' but was {:?}",
            found
        );
        assert!(
            found.as_ref().starts_with("/bin"),
            "Expected path in /bin, got {:?}",
            found
        );
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let path = Path::new("nonexisting");
        let res = find_command_path(osstr("/bin"), path);
        assert!(res.is_none(), "Expected not to find 'nonexisting' in PATH");
    }

    #[test]
    #[cfg(unix)]
    fn path_candidate_must_be_executable() {
        let tmp_base =
            std::env::temp_dir().join(format!("external_tests_{}_xok", std::process::id()));
        let _ = fs::remove_dir_all(&tmp_base);
        fs::create_dir_all(&tmp_base).expect("create temp dir");
        let candidate = tmp_base.join("tool");
        File::create(&candidate).expect("touch tool");

        let search = tmp_base.as_os_str();
        assert!(
            find_command_path(search, Path::new("tool")).is_none(),
            "non-executable file must not be selected"
        );

        make_executable(&candidate);
        let found =
            find_command_path(search, Path::new("tool")).expect("executable must be selected");
        assert_eq!(found.as_ref(), candidate.as_path());

        let _ = fs::remove_dir_all(tmp_base);
    }

    #[test]
    #[cfg(unix)]
    fn path_search_takes_first_executable_candidate() {
        let tmp_base =
            std::env::temp_dir().join(format!("external_tests_{}_order", std::process::id()));
        let _ = fs::remove_dir_all(&tmp_base);
        let (first, second) = (tmp_base.join("first"), tmp_base.join("second"));
        fs::create_dir_all(&first).expect("create first dir");
        fs::create_dir_all(&second).expect("create second dir");
        File::create(second.join("tool")).expect("touch second/tool");
        make_executable(&second.join("tool"));
        File::create(first.join("tool")).expect("touch first/tool");
        make_executable(&first.join("tool"));

        let search = std::env::join_paths([&first, &second]).expect("join paths");
        let found = find_command_path(&search, Path::new("tool")).expect("must resolve");
        assert!(found.as_ref().starts_with(&first));

        let _ = fs::remove_dir_all(tmp_base);
    }

    #[test]
    #[cfg(unix)]
    fn multiple_components_relative_existing() {
        // Create a temporary working directory with a nested file: bin/tool
        let _lock = lock_current_dir();
        let cwd_before = std::env::current_dir().expect("cwd");
        let tmp_base =
            std::env::temp_dir().join(format!("external_tests_{}_mc", std::process::id()));
        let _ = fs::remove_dir_all(&tmp_base);
        fs::create_dir_all(tmp_base.join("bin")).expect("create temp bin dir");
        let file_path = tmp_base.join("bin").join("tool");
        File::create(&file_path).expect("touch bin/tool");
        make_executable(&file_path);

        std::env::set_current_dir(&tmp_base).expect("set cwd");
        let res = find_command_path(osstr("/does/not/matter"), Path::new("bin/tool"));
        // Restore cwd early to avoid interference even on failure
        std::env::set_current_dir(&cwd_before).ok();

        let found = res.expect("Expected to find relative 'bin/tool' in current dir");
        assert!(found.as_ref().ends_with("bin/tool"));
        // Clean up
        let _ = fs::remove_dir_all(tmp_base);
    }

    #[test]
    #[cfg(unix)]
    fn current_dir_with_dot_prefix() {
        // Create a temporary working directory with a file: ./foo
        let _lock = lock_current_dir();
        let cwd_before = std::env::current_dir().expect("cwd");
        let tmp_base =
            std::env::temp_dir().join(format!("external_tests_{}_dot", std::process::id()));
        let _ = fs::remove_dir_all(&tmp_base);
        fs::create_dir_all(&tmp_base).expect("create temp dir");
        let file_path = tmp_base.join("foo");
        File::create(&file_path).expect("touch foo");
        make_executable(&file_path);

        std::env::set_current_dir(&tmp_base).expect("set cwd");
        let res = find_command_path(osstr("/bin"), Path::new("./foo"));
        // Restore cwd
        std::env::set_current_dir(&cwd_before).ok();

        let found = res.expect("Expected to find './foo' in current dir");
        assert_eq!(found.as_ref(), Path::new("./foo"));
        // Clean up
        let _ = fs::remove_dir_all(tmp_base);
    }

    #[test]
    #[cfg(unix)]
    fn empty_path_is_none() {
        let res = find_command_path(osstr("/bin"), Path::new(""));
        assert!(res.is_none(), "Empty path should not resolve to anything");
    }
}
