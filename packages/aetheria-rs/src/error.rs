//! Orchestrator error taxonomy
//!
//! Every flow failure ends up as one of these variants; its `Display` text is
//! the message carried by the `error` operation state.

use alloy::primitives::B256;
use std::time::Duration;
use thiserror::Error;

use crate::amount::AmountError;
use crate::operation::FlowKind;
use crate::types::ContractRole;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    // ------------------------------------------------------------------
    // Configuration errors (detected before any network call)
    // ------------------------------------------------------------------
    #[error("{role} not deployed on {chain}")]
    NotDeployed { role: ContractRole, chain: String },

    #[error("Invalid destination chain: {0}")]
    InvalidDestination(String),

    #[error("Unsupported chain: {0}")]
    UnknownChain(u64),

    // ------------------------------------------------------------------
    // Precondition errors (state machine is never entered)
    // ------------------------------------------------------------------
    #[error("Please connect your wallet")]
    NotConnected,

    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    #[error("Another {0} operation is already in flight")]
    Busy(FlowKind),

    #[error("{actual} request submitted to a {expected} operation")]
    FlowMismatch { expected: FlowKind, actual: FlowKind },

    #[error("Completed {0} operation must be reset before starting another")]
    AwaitingReset(FlowKind),

    // ------------------------------------------------------------------
    // Read failures
    // ------------------------------------------------------------------
    #[error("Failed to read {what}: {reason}")]
    Read { what: &'static str, reason: String },

    #[error("Failed to quote send: {0}")]
    Quote(String),

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: String, need: String },

    // ------------------------------------------------------------------
    // Submission / confirmation failures
    // ------------------------------------------------------------------
    #[error("Failed to submit {action}: {reason}")]
    Submission { action: &'static str, reason: String },

    #[error("{action} transaction {tx_hash} reverted")]
    Reverted { action: &'static str, tx_hash: B256 },

    #[error("Failed to confirm transaction {tx_hash}: {reason}")]
    Confirmation { tx_hash: B256, reason: String },

    #[error("Transaction {tx_hash} not confirmed after {after:?}")]
    ConfirmationTimeout { tx_hash: B256, after: Duration },

    #[error("Illegal {kind} transition: {from} -> {to}")]
    InvalidTransition {
        kind: FlowKind,
        from: &'static str,
        to: &'static str,
    },
}

impl OrchestratorError {
    /// Errors raised before the state machine is entered
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            OrchestratorError::NotConnected
                | OrchestratorError::InvalidAmount(_)
                | OrchestratorError::Busy(_)
                | OrchestratorError::FlowMismatch { .. }
                | OrchestratorError::AwaitingReset(_)
        )
    }
}
