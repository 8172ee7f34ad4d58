use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("no cycle count given")]
    MissingInput,

    #[error("invalid cycle count '{0}': input must be a positive number")]
    InvalidCycleCount(String),

    #[error("a swap run is already active")]
    AlreadyRunning,
}

/// Parses the per-wallet cycle count typed by the user.
pub fn parse_cycles(input: &str) -> Result<u32, StartError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(StartError::MissingInput);
    }
    match input.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(StartError::InvalidCycleCount(input.to_string())),
    }
}

/// What an interactive front end may offer right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
    pub running: bool,
}

/// Run-state owned by one orchestrator. A present token means a run is
/// active; begin, stop and finish all serialize on the same lock.
#[derive(Debug, Default)]
pub struct RunControl {
    active: Mutex<Option<CancellationToken>>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flips Idle to Running and hands out a fresh token. `None` when a run
    /// is already active; its token is left alone.
    pub fn try_begin(&self) -> Option<CancellationToken> {
        let mut slot = self.slot();
        if slot.is_some() {
            return None;
        }
        let token = CancellationToken::new();
        *slot = Some(token.clone());
        Some(token)
    }

    /// Fires the active token. Returns `false` when idle.
    pub fn request_stop(&self) -> bool {
        match self.slot().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn finish(&self) {
        *self.slot() = None;
    }

    pub fn is_running(&self) -> bool {
        self.slot().is_some()
    }
}

/// Returns the control to Idle when dropped, so a panicking run cannot leave
/// the flag stuck.
pub struct RunGuard<'a> {
    control: &'a RunControl,
}

impl<'a> RunGuard<'a> {
    pub fn new(control: &'a RunControl) -> Self {
        Self { control }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.control.finish();
    }
}
