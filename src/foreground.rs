//! Tracking of the single foreground process and signal-driven
//! termination of it.
//!
//! The slot is the only state shared between the dispatcher and the
//! signal-delivery thread, so it is a bare atomic: no locks, nothing to
//! poison, nothing allocated on the signal path.

use anyhow::Context;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use signal_hook::consts::signal::{SIGINT, SIGTSTP};
use signal_hook::iterator::Signals;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::thread;

/// At most one process group owns the foreground at any time.
///
/// Zero means Idle; any other value is the process-group id of the child
/// currently blocking the dispatcher. Only the dispatcher writes it
/// (occupy before a blocking wait, release after); the signal thread only
/// reads it.
#[derive(Debug, Clone, Default)]
pub struct ForegroundSlot {
    pgid: Arc<AtomicI32>,
}

impl ForegroundSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition Idle -> Occupied. The pid doubles as the process-group
    /// id because children are spawned as group leaders.
    pub fn occupy(&self, pid: u32) {
        self.pgid.store(pid as i32, Ordering::SeqCst);
    }

    /// Transition Occupied -> Idle.
    pub fn release(&self) {
        self.pgid.store(0, Ordering::SeqCst);
    }

    /// Process-group id of the current foreground child, if any.
    pub fn current(&self) -> Option<i32> {
        let pgid = self.pgid.load(Ordering::SeqCst);
        (pgid != 0).then_some(pgid)
    }
}

/// Start the thread that turns keyboard signals into termination of the
/// foreground process group.
///
/// SIGINT is forwarded as SIGINT; SIGTSTP is forwarded as SIGTERM, since
/// this shell has no stopped-job state and treats ^Z as a termination
/// request. Signalling the whole group takes the child's own descendants
/// down with it. When the slot is idle the signal is ignored. The thread
/// never prints; the dispatcher reports the death when its blocking wait
/// returns.
pub fn install_signal_forwarding(slot: ForegroundSlot) -> anyhow::Result<()> {
    let mut signals =
        Signals::new([SIGINT, SIGTSTP]).context("registering signal handlers")?;

    thread::Builder::new()
        .name("signal-forwarder".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                let Some(pgid) = slot.current() else {
                    log::debug!("signal {signal} with idle foreground, ignored");
                    continue;
                };
                let forwarded = match signal {
                    SIGINT => Signal::SIGINT,
                    SIGTSTP => Signal::SIGTERM,
                    _ => continue,
                };
                match killpg(Pid::from_raw(pgid), forwarded) {
                    Ok(()) => log::debug!("forwarded {forwarded:?} to group {pgid}"),
                    // The group can be gone already; the dispatcher is
                    // about to reap it either way.
                    Err(e) => log::debug!("killpg({pgid}, {forwarded:?}): {e}"),
                }
            }
        })
        .context("spawning signal-forwarder thread")?;

    Ok(())
}
