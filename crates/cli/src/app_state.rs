//! Application run-state and interrupt handling.
//!
//! `AppState` is the single owner of the process's interrupt disposition:
//! - in `Load`, an interrupt exits the process with status 1
//! - in `MainLoop`, an interrupt clears `running` so the main loop can
//!   turn every channel off in order
//! - while a [`SignalSuppression`] guard is alive, interrupts are ignored

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::CliError;

/// Application phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Channels are being constructed and started
    Load,
    /// The main loop is drawing frames
    MainLoop,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Phase::Load,
            _ => Phase::MainLoop,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Phase::Load => 0,
            Phase::MainLoop => 1,
        }
    }
}

/// What an interrupt does in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Handling is suspended
    Ignore,
    /// Terminate the process with this status
    Exit(i32),
    /// Ask the main loop to finish
    StopMainLoop,
}

/// Process-wide run-state shared by the main loop and channel startup
#[derive(Debug)]
pub struct AppState {
    phase: AtomicU8,
    running: watch::Sender<bool>,
    suppressed: AtomicUsize,
    handler_installed: AtomicBool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Fresh state: `Load` phase, running
    pub fn new() -> Self {
        let (running, _) = watch::channel(true);
        Self {
            phase: AtomicU8::new(Phase::Load.as_u8()),
            running,
            suppressed: AtomicUsize::new(0),
            handler_installed: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Startup is complete; interrupts now stop the main loop
    pub fn enter_main_loop(&self) {
        self.phase.store(Phase::MainLoop.as_u8(), Ordering::SeqCst);
        info!("Entered main loop");
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    pub fn stop_main_loop(&self) {
        self.running.send_replace(false);
    }

    /// Resolves once `running` is false
    pub async fn wait_stopped(&self) {
        let mut rx = self.running.subscribe();
        // The sender lives in `self`, so the channel cannot close while borrowed
        let _ = rx.wait_for(|running| !running).await;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::SeqCst) > 0
    }

    /// Ignore interrupts until the returned guard is dropped
    ///
    /// Guards nest; handling resumes when the last one goes away, including
    /// on early return or unwinding.
    pub fn suspend_signal_handling(&self) -> SignalSuppression<'_> {
        self.suppressed.fetch_add(1, Ordering::SeqCst);
        debug!("Signal handling suspended");
        SignalSuppression { state: self }
    }

    /// Decide what an interrupt means right now
    pub fn interrupt_action(&self) -> InterruptAction {
        if self.is_suppressed() {
            return InterruptAction::Ignore;
        }
        match self.phase() {
            Phase::Load => InterruptAction::Exit(1),
            Phase::MainLoop => InterruptAction::StopMainLoop,
        }
    }

    /// Apply the current interrupt action
    pub fn handle_interrupt(&self) -> InterruptAction {
        let action = self.interrupt_action();
        match action {
            InterruptAction::Ignore => {
                debug!("Interrupt ignored while signal handling is suspended");
            }
            InterruptAction::Exit(code) => {
                warn!(code, "Interrupt during load, exiting");
                std::process::exit(code);
            }
            InterruptAction::StopMainLoop => {
                info!("Interrupt received, stopping main loop");
                self.stop_main_loop();
            }
        }
        action
    }

    /// Route SIGINT (and SIGTERM on unix) to [`AppState::handle_interrupt`]
    ///
    /// Must be called from within a tokio runtime, at most once per state.
    pub fn install_signal_handler(self: &Arc<Self>) -> Result<(), CliError> {
        if self.handler_installed.swap(true, Ordering::SeqCst) {
            return Err(CliError::SignalHandlerInstalled);
        }

        #[cfg(unix)]
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        let state = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                #[cfg(unix)]
                let received = tokio::select! {
                    result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
                    _ = terminate.recv() => Ok("SIGTERM"),
                };

                #[cfg(not(unix))]
                let received = tokio::signal::ctrl_c().await.map(|_| "SIGINT");

                match received {
                    Ok(signal) => {
                        debug!(signal, phase = ?state.phase(), "Signal received");
                        state.handle_interrupt();
                    }
                    Err(e) => {
                        error!(error = %e, "Signal listener failed");
                        break;
                    }
                }
            }
        });

        debug!("Signal handler installed");
        Ok(())
    }
}

/// RAII guard returned by [`AppState::suspend_signal_handling`]
#[must_use = "signal handling resumes as soon as the guard is dropped"]
pub struct SignalSuppression<'a> {
    state: &'a AppState,
}

impl Drop for SignalSuppression<'_> {
    fn drop(&mut self) {
        self.state.suppressed.fetch_sub(1, Ordering::SeqCst);
        debug!("Signal handling restored");
    }
}
