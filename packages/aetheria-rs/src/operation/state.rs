//! Operation State Machine
//!
//! One [`Operation`] per UI surface. It owns the current phase, publishes
//! every transition on a `watch` channel and refuses to start a second flow
//! while one is in flight.

use alloy::primitives::B256;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::OrchestratorError;

/// Phase of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum OperationState {
    Idle,
    Quoting,
    /// Vault path only
    Approving,
    Sending,
    /// Vault path only
    Minting,
    /// Battle-send path only, between submission and confirmation
    Battling,
    Complete,
    Error(String),
}

impl OperationState {
    pub fn name(&self) -> &'static str {
        match self {
            OperationState::Idle => "idle",
            OperationState::Quoting => "quoting",
            OperationState::Approving => "approving",
            OperationState::Sending => "sending",
            OperationState::Minting => "minting",
            OperationState::Battling => "battling",
            OperationState::Complete => "complete",
            OperationState::Error(_) => "error",
        }
    }

    /// `complete` and `error` stay put until reset
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Complete | OperationState::Error(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OperationState::Error(_))
    }

    /// Error message, if in the error state
    pub fn error_message(&self) -> Option<&str> {
        match self {
            OperationState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Status line for progress output
    pub fn describe(&self) -> String {
        match self {
            OperationState::Idle => "Idle".to_string(),
            OperationState::Quoting => "Calculating fees...".to_string(),
            OperationState::Approving => "Approving token...".to_string(),
            OperationState::Sending => "Sending cross-chain...".to_string(),
            OperationState::Minting => "Burning energy and minting...".to_string(),
            OperationState::Battling => "Battle in progress...".to_string(),
            OperationState::Complete => "Complete".to_string(),
            OperationState::Error(msg) => format!("Error: {}", msg),
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Flow Kinds
// ============================================================================

/// The flow variants sharing the state shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    BattleSend,
    Bridge,
    VaultBurn,
    ComposeSend,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::BattleSend => "battle-send",
            FlowKind::Bridge => "bridge",
            FlowKind::VaultBurn => "vault-burn",
            FlowKind::ComposeSend => "send-compose",
        }
    }

    /// Whether this flow may move from `from` to `to`
    pub fn permits(&self, from: &OperationState, to: &OperationState) -> bool {
        use OperationState::*;

        if to.is_error() {
            return !from.is_terminal();
        }

        match self {
            FlowKind::BattleSend => matches!(
                (from, to),
                (Idle, Quoting) | (Quoting, Sending) | (Sending, Battling) | (Battling, Complete)
            ),
            FlowKind::Bridge | FlowKind::ComposeSend => matches!(
                (from, to),
                (Idle, Quoting) | (Quoting, Sending) | (Sending, Complete)
            ),
            FlowKind::VaultBurn => matches!(
                (from, to),
                (Idle, Approving) | (Idle, Minting) | (Approving, Minting) | (Minting, Complete)
            ),
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Operation
// ============================================================================

/// Progress of one flow on one surface
#[derive(Debug)]
pub struct Operation {
    kind: FlowKind,
    state: watch::Sender<OperationState>,
    in_flight: AtomicBool,
    /// Transitions of the current (or last) run, starting at `idle`
    history: Mutex<Vec<OperationState>>,
    last_tx_hash: Mutex<Option<B256>>,
}

/// Marks an operation as in flight; released on drop
#[derive(Debug)]
pub struct FlightGuard<'a> {
    operation: &'a Operation,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.operation.in_flight.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Operation {
    /// Create an idle operation for a flow kind
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            state: watch::Sender::new(OperationState::Idle),
            in_flight: AtomicBool::new(false),
            history: Mutex::new(vec![OperationState::Idle]),
            last_tx_hash: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// Current state
    pub fn state(&self) -> OperationState {
        self.state.borrow().clone()
    }

    /// Observe transitions
    pub fn subscribe(&self) -> watch::Receiver<OperationState> {
        self.state.subscribe()
    }

    /// States visited by the current (or last) run
    pub fn history(&self) -> Vec<OperationState> {
        lock(&self.history).clone()
    }

    /// Hash of the last transaction submitted by this operation
    pub fn last_tx_hash(&self) -> Option<B256> {
        *lock(&self.last_tx_hash)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Return a terminal operation to `idle`.
    ///
    /// No-op (returns false) while a flow is in flight.
    pub fn reset(&self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        let reset = self.state.send_if_modified(|state| {
            if state.is_terminal() {
                *state = OperationState::Idle;
                true
            } else {
                false
            }
        });
        if reset {
            info!(kind = %self.kind, "Operation reset to idle");
            *lock(&self.history) = vec![OperationState::Idle];
        }
        reset || self.state.borrow().eq(&OperationState::Idle)
    }

    /// Claim the operation for a new run
    pub(crate) fn begin(&self, requested: FlowKind) -> Result<FlightGuard<'_>, OrchestratorError> {
        if requested != self.kind {
            return Err(OrchestratorError::FlowMismatch {
                expected: self.kind,
                actual: requested,
            });
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(OrchestratorError::Busy(self.kind));
        }
        let guard = FlightGuard { operation: self };

        // A failed run may be restarted directly; a completed one needs a reset
        let startable = self.state.send_if_modified(|state| match state {
            OperationState::Idle => false,
            OperationState::Error(_) => {
                *state = OperationState::Idle;
                true
            }
            _ => false,
        }) || *self.state.borrow() == OperationState::Idle;

        if !startable {
            return Err(OrchestratorError::AwaitingReset(self.kind));
        }

        *lock(&self.history) = vec![OperationState::Idle];
        *lock(&self.last_tx_hash) = None;
        Ok(guard)
    }

    /// Move to the next state of this flow
    pub(crate) fn advance(&self, next: OperationState) -> Result<(), OrchestratorError> {
        let mut rejected = None;
        self.state.send_if_modified(|current| {
            if self.kind.permits(current, &next) {
                *current = next.clone();
                true
            } else {
                rejected = Some(current.name());
                false
            }
        });

        if let Some(from) = rejected {
            return Err(OrchestratorError::InvalidTransition {
                kind: self.kind,
                from,
                to: next.name(),
            });
        }

        info!(kind = %self.kind, state = %next, "Operation advanced");
        lock(&self.history).push(next);
        Ok(())
    }

    /// Move to `error` carrying the failure's message
    pub(crate) fn fail(&self, error: &OrchestratorError) {
        let failed = OperationState::Error(error.to_string());
        if let Err(e) = self.advance(failed) {
            warn!(kind = %self.kind, error = %e, "Could not record operation failure");
        }
    }

    pub(crate) fn record_tx(&self, tx_hash: B256) {
        *lock(&self.last_tx_hash) = Some(tx_hash);
    }
}
