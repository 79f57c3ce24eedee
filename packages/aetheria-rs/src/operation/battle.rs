//! Battle-send: move a player NFT to the opposing arena and trigger a battle
//! through the destination composer.

use alloy::primitives::U256;
use tracing::info;

use super::{submit_and_await, FlowKind, FlowReceipt, Operation, OperationState, Orchestrator};
use crate::amount::{account_to_destination_id, parse_token_id};
use crate::compose::battle_compose_msg;
use crate::error::OrchestratorError;
use crate::fees;
use crate::gateway::{ChainGateway, ContractWrite, Session};
use crate::transfer::{NftTransfer, TransferDescriptor};
use crate::types::ContractRole;

/// Send `token_id` to battle on `destination_chain`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleRequest {
    pub token_id: U256,
    pub destination_chain: u64,
}

impl BattleRequest {
    pub fn new(token_id: U256, destination_chain: u64) -> Self {
        Self {
            token_id,
            destination_chain,
        }
    }

    /// Build from the user-entered token id
    pub fn parse(token_id: &str, destination_chain: u64) -> Result<Self, OrchestratorError> {
        Ok(Self::new(parse_token_id(token_id)?, destination_chain))
    }
}

impl<G> Orchestrator<G>
where
    G: ChainGateway + ?Sized,
{
    /// `idle -> quoting -> sending -> battling -> complete`
    pub async fn battle_send(
        &self,
        operation: &Operation,
        request: BattleRequest,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let session = self.session()?;
        let _flight = operation.begin(FlowKind::BattleSend)?;

        info!(
            chain_id = session.chain_id,
            token_id = %request.token_id,
            destination = request.destination_chain,
            "Starting battle-send"
        );

        let result = self.run_battle(operation, session, request).await;
        self.finish(operation, result)
    }

    async fn run_battle(
        &self,
        operation: &Operation,
        session: Session,
        request: BattleRequest,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let onft = self
            .registry
            .require_address(session.chain_id, ContractRole::PlayerNft)?;
        let destination = self.destination(&session, request.destination_chain)?;
        if !destination.is_arena() {
            return Err(OrchestratorError::InvalidDestination(format!(
                "{} is not an arena chain",
                destination.name
            )));
        }
        let composer = self
            .registry
            .require_address(destination.chain_id, ContractRole::Composer)?;

        operation.advance(OperationState::Quoting)?;
        let descriptor: TransferDescriptor = NftTransfer::new(
            destination.endpoint_id,
            account_to_destination_id(composer),
            request.token_id,
        )
        .with_compose_msg(battle_compose_msg(request.token_id))
        .into();
        let quote = fees::quote(self.gateway.as_ref(), onft, &descriptor).await?;

        operation.advance(OperationState::Sending)?;
        let write = ContractWrite::send(onft, descriptor, &quote, session.account);
        let native_fee = write.value();
        let receipt = submit_and_await(self.gateway.as_ref(), &self.settings, &write, |tx_hash| {
            operation.record_tx(tx_hash);
            operation.advance(OperationState::Battling)
        })
        .await?;

        Ok(FlowReceipt {
            kind: FlowKind::BattleSend,
            chain_id: session.chain_id,
            transactions: vec![receipt],
            native_fee: Some(native_fee),
        })
    }
}
