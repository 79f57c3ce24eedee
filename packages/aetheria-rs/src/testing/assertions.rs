//! Common Operation Assertions
//!
//! Helpers returning `eyre::Result` so failures carry the observed history.

use eyre::{eyre, Result};

use crate::gateway::ContractWrite;
use crate::operation::{Operation, OperationState};

/// Assert the operation visited exactly `expected`, in order
pub fn assert_transitions(operation: &Operation, expected: &[OperationState]) -> Result<()> {
    let history = operation.history();
    if history != expected {
        return Err(eyre!(
            "Transition mismatch: expected {:?}, got {:?}",
            expected.iter().map(|s| s.name()).collect::<Vec<_>>(),
            history.iter().map(|s| s.name()).collect::<Vec<_>>()
        ));
    }
    Ok(())
}

/// Assert the operation ended in `error` with a message containing `needle`
pub fn assert_failed_with(operation: &Operation, needle: &str) -> Result<()> {
    match operation.state() {
        OperationState::Error(msg) if msg.contains(needle) => Ok(()),
        OperationState::Error(msg) => Err(eyre!(
            "Error message mismatch: expected to contain '{}', got '{}'",
            needle,
            msg
        )),
        other => Err(eyre!("Expected error state, got {}", other)),
    }
}

/// Assert the submitted writes have exactly these actions, in order
pub fn assert_actions(writes: &[ContractWrite], expected: &[&str]) -> Result<()> {
    let actions: Vec<&str> = writes.iter().map(|w| w.action()).collect();
    if actions != expected {
        return Err(eyre!(
            "Submitted actions mismatch: expected {:?}, got {:?}",
            expected,
            actions
        ));
    }
    Ok(())
}
