//! Foreground child execution.
//!
//! Children inherit stdin/stdout/stderr. On Unix the parent ignores SIGINT and
//! SIGQUIT while a child runs (the `system(3)` discipline): a terminal
//! interrupt reaches the whole foreground process group, so the child dies
//! from it while we survive long enough to observe the failure and drop the
//! staged artifact. The child gets the original dispositions back before exec.

use std::io;
use std::process::{Command, ExitStatus};

/// Spawn `command` with inherited stdio and block until it exits.
pub fn run_foreground(command: &mut Command) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        let shield = unix::InterruptShield::raise()?;
        shield.restore_in_child(command);
        let status = command.status();
        drop(shield);
        status
    }

    #[cfg(not(unix))]
    {
        command.status()
    }
}

#[cfg(unix)]
mod unix {
    use std::io;
    use std::os::unix::process::CommandExt;
    use std::process::Command;
    use std::sync::{Mutex, PoisonError};

    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    const SHIELDED: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

    struct ShieldState {
        depth: usize,
        saved: Vec<(Signal, SigAction)>,
    }

    // Dispositions are process-wide; nested shields share one saved set.
    static STATE: Mutex<ShieldState> = Mutex::new(ShieldState {
        depth: 0,
        saved: Vec::new(),
    });

    pub struct InterruptShield {
        saved: Vec<(Signal, SigAction)>,
    }

    impl InterruptShield {
        pub fn raise() -> io::Result<Self> {
            let mut state = STATE.lock().unwrap_or_else(PoisonError::into_inner);

            if state.depth == 0 {
                let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
                let mut saved = Vec::with_capacity(SHIELDED.len());
                for signal in SHIELDED {
                    // SAFETY: installs SIG_IGN, no handler code runs.
                    let previous = unsafe { sigaction(signal, &ignore) }.map_err(io::Error::from);
                    match previous {
                        Ok(previous) => saved.push((signal, previous)),
                        Err(err) => {
                            restore(&saved);
                            return Err(err);
                        }
                    }
                }
                state.saved = saved;
            }

            state.depth += 1;
            Ok(Self {
                saved: state.saved.clone(),
            })
        }

        /// Reinstate the pre-shield dispositions in the child between fork and exec.
        pub fn restore_in_child(&self, command: &mut Command) {
            let saved = self.saved.clone();
            // SAFETY: sigaction is async-signal-safe and the closure does not allocate.
            unsafe {
                command.pre_exec(move || {
                    for (signal, action) in &saved {
                        sigaction(*signal, action).map_err(io::Error::from)?;
                    }
                    Ok(())
                });
            }
        }
    }

    impl Drop for InterruptShield {
        fn drop(&mut self) {
            let mut state = STATE.lock().unwrap_or_else(PoisonError::into_inner);
            state.depth = state.depth.saturating_sub(1);
            if state.depth == 0 {
                restore(&state.saved);
                state.saved.clear();
            }
        }
    }

    /// Run `f` once no shield is raised, holding the state lock so none can be.
    #[cfg(test)]
    pub fn when_idle<R>(f: impl FnOnce() -> R) -> R {
        loop {
            let state = STATE.lock().unwrap_or_else(PoisonError::into_inner);
            if state.depth == 0 {
                return f();
            }
            drop(state);
            std::thread::yield_now();
        }
    }

    /// Install `handler` for `signal`, returning the handler it replaced.
    #[cfg(test)]
    pub fn swap_handler(signal: Signal, handler: SigHandler) -> SigHandler {
        let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
        // SAFETY: only SIG_DFL/SIG_IGN are installed by the tests.
        unsafe { sigaction(signal, &action) }
            .expect("sigaction")
            .handler()
    }

    fn restore(saved: &[(Signal, SigAction)]) {
        for (signal, action) in saved {
            // SAFETY: reinstates a disposition previously returned by sigaction.
            if let Err(err) = unsafe { sigaction(*signal, action) } {
                tracing::warn!(?signal, "failed to restore signal disposition: {err}");
            }
        }
    }
}
