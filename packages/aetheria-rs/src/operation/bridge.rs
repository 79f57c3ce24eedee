//! Bridge: move a resource token or a player NFT to another chain, delivered
//! back to the sender's own account.

use alloy::primitives::U256;
use tracing::info;

use super::{submit_and_await, FlowKind, FlowReceipt, Operation, OperationState, Orchestrator};
use crate::amount::{
    account_to_destination_id, parse_positive_amount, parse_token_id, AmountError, DEFAULT_DECIMALS,
};
use crate::error::OrchestratorError;
use crate::fees::{self, Slippage};
use crate::gateway::{ChainGateway, ContractWrite, Session};
use crate::transfer::{FungibleTransfer, NftTransfer, TransferDescriptor};
use crate::types::{BridgeAsset, Resource};

/// Bridge `asset` to `destination_chain`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeRequest {
    pub asset: BridgeAsset,
    pub destination_chain: u64,
}

impl BridgeRequest {
    pub fn new(asset: BridgeAsset, destination_chain: u64) -> Self {
        Self {
            asset,
            destination_chain,
        }
    }

    /// Fungible bridge from a user-entered decimal amount
    pub fn fungible(
        resource: Resource,
        amount: &str,
        destination_chain: u64,
    ) -> Result<Self, OrchestratorError> {
        let amount = parse_positive_amount(amount, DEFAULT_DECIMALS)?;
        Ok(Self::new(BridgeAsset::Fungible { resource, amount }, destination_chain))
    }

    /// NFT bridge from a user-entered token id
    pub fn player_nft(token_id: &str, destination_chain: u64) -> Result<Self, OrchestratorError> {
        let token_id: U256 = parse_token_id(token_id)?;
        Ok(Self::new(BridgeAsset::PlayerNft { token_id }, destination_chain))
    }

    /// Reject a fungible bridge of nothing
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        match self.asset {
            BridgeAsset::Fungible { amount, .. } if amount.is_zero() => Err(AmountError::Zero.into()),
            _ => Ok(()),
        }
    }
}

impl<G> Orchestrator<G>
where
    G: ChainGateway + ?Sized,
{
    /// `idle -> quoting -> sending -> complete`
    pub async fn bridge(
        &self,
        operation: &Operation,
        request: BridgeRequest,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let session = self.session()?;
        request.validate()?;
        let _flight = operation.begin(FlowKind::Bridge)?;

        info!(
            chain_id = session.chain_id,
            asset = %request.asset.role(),
            destination = request.destination_chain,
            "Starting bridge"
        );

        let result = self.run_bridge(operation, session, request).await;
        self.finish(operation, result)
    }

    async fn run_bridge(
        &self,
        operation: &Operation,
        session: Session,
        request: BridgeRequest,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let contract = self
            .registry
            .require_address(session.chain_id, request.asset.role())?;
        let destination = self.destination(&session, request.destination_chain)?;

        operation.advance(OperationState::Quoting)?;
        let to = account_to_destination_id(session.account);
        let descriptor: TransferDescriptor = match request.asset {
            BridgeAsset::Fungible { amount, .. } => {
                FungibleTransfer::new(destination.endpoint_id, to, amount, Slippage::Bridge).into()
            }
            BridgeAsset::PlayerNft { token_id } => {
                NftTransfer::new(destination.endpoint_id, to, token_id).into()
            }
        };
        let quote = fees::quote(self.gateway.as_ref(), contract, &descriptor).await?;

        operation.advance(OperationState::Sending)?;
        let write = ContractWrite::send(contract, descriptor, &quote, session.account);
        let native_fee = write.value();
        let receipt = submit_and_await(self.gateway.as_ref(), &self.settings, &write, |tx_hash| {
            operation.record_tx(tx_hash);
            Ok(())
        })
        .await?;

        Ok(FlowReceipt {
            kind: FlowKind::Bridge,
            chain_id: session.chain_id,
            transactions: vec![receipt],
            native_fee: Some(native_fee),
        })
    }
}
