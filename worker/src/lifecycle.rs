//! Worker lifecycle
//!
//! State transitions for one worker version, from parse through
//! activation to redundancy, plus the skip-waiting gate that decides when
//! an installed version may take over from its predecessor.

/// Worker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Initial state, being parsed
    Parsed,
    /// Installing (install event fired)
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Activating (activate event fired)
    Activating,
    /// Active and controlling pages
    Activated,
    /// Marked for removal
    Redundant,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::Parsed
    }
}

/// Lifecycle error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// State transition invalid
    InvalidTransition,
}

/// Check if a state transition is valid
fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Installed)
            | (Installing, Redundant)
            | (Installed, Activating)
            | (Activating, Activated)
            | (Activating, Redundant)
            | (Activated, Redundant)
    )
}

/// Lifecycle state for one worker version
#[derive(Debug, Default)]
pub struct Lifecycle {
    /// Current state
    state: WorkerState,
    /// Whether waiting should be skipped at activation time
    skip_waiting: bool,
}

impl Lifecycle {
    /// Create a freshly parsed lifecycle
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Check if the worker is active
    pub fn is_active(&self) -> bool {
        self.state == WorkerState::Activated
    }

    /// Transition to a new state
    pub fn transition(&mut self, to: WorkerState) -> Result<(), LifecycleError> {
        if !is_valid_transition(self.state, to) {
            log::warn!("[worker] invalid transition {:?} -> {:?}", self.state, to);
            return Err(LifecycleError::InvalidTransition);
        }
        log::debug!("[worker] {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Request that activation not wait for open pages to close
    pub fn request_skip_waiting(&mut self) {
        self.skip_waiting = true;
    }

    /// Check if skip-waiting was requested
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting
    }

    /// Whether activation may proceed
    ///
    /// An installed worker waits for every controlled page to close unless
    /// skip-waiting was requested.
    pub fn ready_to_activate(&self, open_clients: usize) -> bool {
        self.state == WorkerState::Installed && (self.skip_waiting || open_clients == 0)
    }
}
