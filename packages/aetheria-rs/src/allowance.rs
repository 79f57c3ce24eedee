//! Token Allowance Management
//!
//! Reads the current ERC20 allowance and, when it falls short, submits an
//! approval for exactly the required amount and waits for it to confirm.

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use crate::error::OrchestratorError;
use crate::gateway::{ChainGateway, ContractWrite, TxReceipt};
use crate::operation::{submit_and_await, SubmitSettings};

/// `token.allowance(owner, spender)`
pub async fn read_allowance<G>(
    gateway: &G,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, OrchestratorError>
where
    G: ChainGateway + ?Sized,
{
    gateway
        .allowance(token, owner, spender)
        .await
        .map_err(|e| OrchestratorError::Read {
            what: "allowance",
            reason: e.to_string(),
        })
}

/// Make sure `spender` may pull `required` of `token` from `owner`.
///
/// Returns the approval receipt, or `None` when the existing allowance was
/// already sufficient.
pub async fn ensure_allowance<G>(
    gateway: &G,
    settings: &SubmitSettings,
    token: Address,
    owner: Address,
    spender: Address,
    required: U256,
) -> Result<Option<TxReceipt>, OrchestratorError>
where
    G: ChainGateway + ?Sized,
{
    ensure_allowance_with(gateway, settings, token, owner, spender, required, || Ok(())).await
}

/// [`ensure_allowance`], calling `before_approve` only when an approval is needed
#[allow(clippy::too_many_arguments)]
pub async fn ensure_allowance_with<G, F>(
    gateway: &G,
    settings: &SubmitSettings,
    token: Address,
    owner: Address,
    spender: Address,
    required: U256,
    before_approve: F,
) -> Result<Option<TxReceipt>, OrchestratorError>
where
    G: ChainGateway + ?Sized,
    F: FnOnce() -> Result<(), OrchestratorError>,
{
    let current = read_allowance(gateway, token, owner, spender).await?;
    if current >= required {
        debug!(token = %token, spender = %spender, allowance = %current, "Allowance sufficient");
        return Ok(None);
    }

    info!(
        token = %token,
        spender = %spender,
        current = %current,
        required = %required,
        "Approving token"
    );
    before_approve()?;

    let write = ContractWrite::Approve {
        token,
        spender,
        amount: required,
    };
    let receipt = submit_and_await(gateway, settings, &write, |_| Ok(())).await?;
    Ok(Some(receipt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGateway;

    const OWNER: Address = Address::new([0xaa; 20]);
    const TOKEN: Address = Address::new([0x01; 20]);
    const SPENDER: Address = Address::new([0x02; 20]);

    #[tokio::test]
    async fn test_sufficient_allowance_skips_approval() {
        let gateway = MockGateway::connected(OWNER, 421614);
        gateway.set_allowance(TOKEN, OWNER, SPENDER, U256::from(100u64));

        let mut hook_called = false;
        let receipt = ensure_allowance_with(
            &gateway,
            &SubmitSettings::default(),
            TOKEN,
            OWNER,
            SPENDER,
            U256::from(100u64),
            || {
                hook_called = true;
                Ok(())
            },
        )
        .await
        .unwrap();

        assert!(receipt.is_none());
        assert!(!hook_called);
        assert!(gateway.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_allowance_approves_exact_amount() {
        let gateway = MockGateway::connected(OWNER, 421614);
        gateway.set_allowance(TOKEN, OWNER, SPENDER, U256::from(10u64));

        let receipt = ensure_allowance(
            &gateway,
            &SubmitSettings::default(),
            TOKEN,
            OWNER,
            SPENDER,
            U256::from(250u64),
        )
        .await
        .unwrap();

        assert!(receipt.is_some());
        assert_eq!(
            gateway.submitted(),
            vec![ContractWrite::Approve {
                token: TOKEN,
                spender: SPENDER,
                amount: U256::from(250u64),
            }]
        );
        assert_eq!(gateway.allowance_of(TOKEN, OWNER, SPENDER), U256::from(250u64));
    }

    #[tokio::test]
    async fn test_read_failure_is_reported() {
        let gateway = MockGateway::connected(OWNER, 421614);
        gateway.fail_reads("rpc unavailable");

        let err = read_allowance(&gateway, TOKEN, OWNER, SPENDER).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to read allowance: rpc unavailable");
    }
}
