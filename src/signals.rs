//! Termination signals end the session the same way the quit key does, so
//! the config still gets restored when the terminal is closed or the
//! process is killed.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

/// Set by the signal handler, polled by the event loop.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn handle_termination(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Catch SIGINT, SIGTERM and SIGHUP instead of dying on them.
#[cfg(unix)]
pub fn install() -> Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM, libc::SIGHUP] {
        unsafe {
            // SAFETY: handle_termination only flips an atomic flag, which is
            // async-signal-safe.
            let handler = handle_termination as *const () as libc::sighandler_t;
            if libc::signal(signal, handler) == libc::SIG_ERR {
                anyhow::bail!("failed to install handler for signal {signal}");
            }
        }
    }
    tracing::debug!("termination signal handlers installed");
    Ok(())
}

#[cfg(not(unix))]
pub fn install() -> Result<()> {
    Ok(())
}

/// Whether a termination signal arrived since the last call.
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}
