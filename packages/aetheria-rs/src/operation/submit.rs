//! Submit-and-confirm primitive shared by every flow

use alloy::primitives::B256;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::OrchestratorError;
use crate::gateway::{ChainGateway, ContractWrite, TxReceipt};

/// Confirmation policy for submitted transactions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitSettings {
    /// Upper bound on waiting for a receipt; `None` waits indefinitely
    pub confirmation_timeout: Option<Duration>,
}

impl SubmitSettings {
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = Some(timeout);
        self
    }
}

/// Submit `write`, run `on_submitted` with its hash, then wait for a
/// successful receipt.
///
/// `on_submitted` runs after the provider accepted the transaction and before
/// confirmation; an error from it aborts the wait.
pub async fn submit_and_await<G, F>(
    gateway: &G,
    settings: &SubmitSettings,
    write: &ContractWrite,
    on_submitted: F,
) -> Result<TxReceipt, OrchestratorError>
where
    G: ChainGateway + ?Sized,
    F: FnOnce(B256) -> Result<(), OrchestratorError>,
{
    let action = write.action();
    debug!(action, target = %write.target(), value = %write.value(), "Submitting transaction");

    let tx_hash = gateway
        .submit(write)
        .await
        .map_err(|e| OrchestratorError::Submission {
            action,
            reason: e.to_string(),
        })?;

    info!(action, tx_hash = %tx_hash, "Transaction submitted");
    on_submitted(tx_hash)?;

    let wait = gateway.wait_for_receipt(tx_hash);
    let outcome = match settings.confirmation_timeout {
        Some(after) => tokio::time::timeout(after, wait)
            .await
            .map_err(|_| OrchestratorError::ConfirmationTimeout { tx_hash, after })?,
        None => wait.await,
    };

    let receipt = outcome.map_err(|e| OrchestratorError::Confirmation {
        tx_hash,
        reason: e.to_string(),
    })?;

    if !receipt.success {
        return Err(OrchestratorError::Reverted { action, tx_hash });
    }

    info!(
        action,
        tx_hash = %tx_hash,
        block = ?receipt.block_number,
        gas_used = receipt.gas_used,
        "Transaction confirmed"
    );

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGateway;
    use alloy::primitives::{Address, U256};

    fn approve() -> ContractWrite {
        ContractWrite::Approve {
            token: Address::repeat_byte(1),
            spender: Address::repeat_byte(2),
            amount: U256::from(5u64),
        }
    }

    #[tokio::test]
    async fn test_submit_and_await_success() {
        let gateway = MockGateway::connected(Address::repeat_byte(9), 421614);
        let mut seen = None;
        let receipt = submit_and_await(&gateway, &SubmitSettings::default(), &approve(), |h| {
            seen = Some(h);
            Ok(())
        })
        .await
        .unwrap();

        assert!(receipt.success);
        assert_eq!(seen, Some(receipt.tx_hash));
        assert_eq!(gateway.submitted(), vec![approve()]);
    }

    #[tokio::test]
    async fn test_rejected_submission_never_calls_hook() {
        let gateway = MockGateway::connected(Address::repeat_byte(9), 421614);
        gateway.reject_submissions("user rejected");

        let mut called = false;
        let err = submit_and_await(&gateway, &SubmitSettings::default(), &approve(), |_| {
            called = true;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(!called);
        assert_eq!(
            err,
            OrchestratorError::Submission {
                action: "approve",
                reason: "user rejected".into()
            }
        );
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_an_error() {
        let gateway = MockGateway::connected(Address::repeat_byte(9), 421614);
        gateway.revert_action("approve");

        let err = submit_and_await(&gateway, &SubmitSettings::default(), &approve(), |_| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Reverted { action: "approve", .. }));
    }

    #[tokio::test]
    async fn test_confirmation_timeout() {
        let gateway = MockGateway::connected(Address::repeat_byte(9), 421614);
        gateway.stall_confirmations();

        let settings = SubmitSettings::default().with_confirmation_timeout(Duration::from_millis(20));
        let err = submit_and_await(&gateway, &settings, &approve(), |_| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::ConfirmationTimeout { .. }));
    }
}
