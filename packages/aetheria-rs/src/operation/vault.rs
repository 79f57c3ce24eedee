//! Vault burn: convert energy into wood or ore on the active chain.

use alloy::primitives::U256;
use tracing::info;

use super::{submit_and_await, FlowKind, FlowReceipt, Operation, OperationState, Orchestrator};
use crate::allowance::ensure_allowance_with;
use crate::amount::{parse_positive_amount, AmountError, DEFAULT_DECIMALS};
use crate::error::OrchestratorError;
use crate::gateway::{ChainGateway, ContractWrite, Session};
use crate::types::{ContractRole, Resource, VaultResource};

/// Burn `energy_amount` of energy to mint `resource`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultRequest {
    pub resource: VaultResource,
    pub energy_amount: U256,
}

impl VaultRequest {
    pub fn new(resource: VaultResource, energy_amount: U256) -> Self {
        Self {
            resource,
            energy_amount,
        }
    }

    /// Build from a user-entered decimal energy amount
    pub fn parse(resource: VaultResource, energy_amount: &str) -> Result<Self, OrchestratorError> {
        Ok(Self::new(
            resource,
            parse_positive_amount(energy_amount, DEFAULT_DECIMALS)?,
        ))
    }

    pub fn validate(&self) -> Result<(), OrchestratorError> {
        if self.energy_amount.is_zero() {
            return Err(AmountError::Zero.into());
        }
        Ok(())
    }
}

impl<G> Orchestrator<G>
where
    G: ChainGateway + ?Sized,
{
    /// `idle -> [approving ->] minting -> complete`
    pub async fn vault_burn(
        &self,
        operation: &Operation,
        request: VaultRequest,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let session = self.session()?;
        request.validate()?;
        let _flight = operation.begin(FlowKind::VaultBurn)?;

        info!(
            chain_id = session.chain_id,
            resource = %request.resource,
            amount = %request.energy_amount,
            "Starting vault burn"
        );

        let result = self.run_vault(operation, session, request).await;
        self.finish(operation, result)
    }

    async fn run_vault(
        &self,
        operation: &Operation,
        session: Session,
        request: VaultRequest,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let energy = self
            .registry
            .require_address(session.chain_id, ContractRole::Energy)?;
        let resource = self
            .registry
            .require_address(session.chain_id, Resource::from(request.resource).role())?;

        let mut transactions = Vec::with_capacity(2);

        // The resource contract pulls energy from the caller
        let approval = ensure_allowance_with(
            self.gateway.as_ref(),
            &self.settings,
            energy,
            session.account,
            resource,
            request.energy_amount,
            || operation.advance(OperationState::Approving),
        )
        .await?;
        transactions.extend(approval);

        operation.advance(OperationState::Minting)?;
        let write = ContractWrite::BurnEnergyAndMint {
            resource,
            energy_amount: request.energy_amount,
        };
        let receipt = submit_and_await(self.gateway.as_ref(), &self.settings, &write, |tx_hash| {
            operation.record_tx(tx_hash);
            Ok(())
        })
        .await?;
        transactions.push(receipt);

        Ok(FlowReceipt {
            kind: FlowKind::VaultBurn,
            chain_id: session.chain_id,
            transactions,
            native_fee: None,
        })
    }
}
