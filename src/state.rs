use crate::config::ShellConfig;
use crate::foreground::ForegroundSlot;
use crate::history::HistoryLog;
use crate::jobs::JobTable;

/// Mutable interpreter state threaded through every command execution.
///
/// Everything here is owned and only ever touched from the dispatch loop;
/// the one exception is [`ForegroundSlot`], whose clone inside the signal
/// thread reads it concurrently.
pub struct ShellState {
    pub config: ShellConfig,
    pub jobs: JobTable,
    pub history: HistoryLog,
    pub foreground: ForegroundSlot,
    /// Set by the `exit` builtin once no background jobs remain.
    pub should_exit: bool,
    /// A history line scheduled for re-execution by `history -i`; the
    /// dispatcher picks it up after the builtin returns.
    pub pending_recall: Option<String>,
}

impl ShellState {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            jobs: JobTable::new(config.job_capacity),
            history: HistoryLog::new(config.history_capacity),
            foreground: ForegroundSlot::new(),
            should_exit: false,
            pending_recall: None,
            config,
        }
    }
}
