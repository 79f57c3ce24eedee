//! Send-and-compose: operator tooling that sends a resource to a composer on
//! another chain with a routing payload and explicit executor gas.

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use super::{submit_and_await, FlowKind, FlowReceipt, Operation, OperationState, Orchestrator};
use crate::amount::{
    account_to_destination_id, from_fixed_point, parse_positive_amount, AmountError, DEFAULT_DECIMALS,
};
use crate::compose::{ExecutorOptions, ResourceComposeMsg};
use crate::error::OrchestratorError;
use crate::fees::{self, Slippage};
use crate::gateway::{ChainGateway, ContractWrite, Session};
use crate::transfer::{FungibleTransfer, TransferDescriptor};
use crate::types::{EndpointId, Resource};

/// Send `amount` of `resource` to `composer` on `dst_eid`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeSendRequest {
    pub resource: Resource,
    pub dst_eid: EndpointId,
    pub composer: Address,
    pub amount: U256,
    /// Final recipient decoded by the composer; defaults to the sender
    pub recipient: Option<Address>,
    /// Ask the composer to route output back to the source chain
    pub send_back: bool,
    pub options: ExecutorOptions,
}

impl ComposeSendRequest {
    pub fn new(resource: Resource, dst_eid: EndpointId, composer: Address, amount: U256) -> Self {
        Self {
            resource,
            dst_eid,
            composer,
            amount,
            recipient: None,
            send_back: true,
            options: ExecutorOptions::default(),
        }
    }

    /// Build from a user-entered decimal amount
    pub fn parse(
        resource: Resource,
        dst_eid: EndpointId,
        composer: Address,
        amount: &str,
    ) -> Result<Self, OrchestratorError> {
        let amount = parse_positive_amount(amount, DEFAULT_DECIMALS)?;
        Ok(Self::new(resource, dst_eid, composer, amount))
    }

    pub fn validate(&self) -> Result<(), OrchestratorError> {
        if self.amount.is_zero() {
            return Err(AmountError::Zero.into());
        }
        Ok(())
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_send_back(mut self, send_back: bool) -> Self {
        self.send_back = send_back;
        self
    }

    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }
}

impl<G> Orchestrator<G>
where
    G: ChainGateway + ?Sized,
{
    /// `idle -> quoting -> sending -> complete`, zero slippage
    pub async fn send_with_compose(
        &self,
        operation: &Operation,
        request: ComposeSendRequest,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let session = self.session()?;
        request.validate()?;
        let _flight = operation.begin(FlowKind::ComposeSend)?;

        info!(
            chain_id = session.chain_id,
            resource = %request.resource,
            dst_eid = %request.dst_eid,
            composer = %request.composer,
            amount = %request.amount,
            "Starting send-and-compose"
        );

        let result = self.run_compose_send(operation, session, request).await;
        self.finish(operation, result)
    }

    async fn run_compose_send(
        &self,
        operation: &Operation,
        session: Session,
        request: ComposeSendRequest,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let contract = self
            .registry
            .require_address(session.chain_id, request.resource.role())?;
        if self.registry.resolve_endpoint_id(session.chain_id) == Some(request.dst_eid) {
            return Err(OrchestratorError::InvalidDestination(format!(
                "endpoint {} is the current chain",
                request.dst_eid
            )));
        }

        operation.advance(OperationState::Quoting)?;
        let compose = ResourceComposeMsg {
            recipient: request.recipient.unwrap_or(session.account),
            dst_eid: request.dst_eid,
            send_back: request.send_back,
        };
        let descriptor: TransferDescriptor = FungibleTransfer::new(
            request.dst_eid,
            account_to_destination_id(request.composer),
            request.amount,
            Slippage::Exact,
        )
        .with_extra_options(request.options.encode())
        .with_compose_msg(compose.encode())
        .into();
        let quote = fees::quote(self.gateway.as_ref(), contract, &descriptor).await?;

        let balance = self.read_balance(contract, session.account).await?;
        debug!(balance = %balance, amount = %request.amount, "Checked sender balance");
        if balance < request.amount {
            return Err(OrchestratorError::InsufficientBalance {
                have: from_fixed_point(balance, DEFAULT_DECIMALS),
                need: from_fixed_point(request.amount, DEFAULT_DECIMALS),
            });
        }

        operation.advance(OperationState::Sending)?;
        let write = ContractWrite::send(contract, descriptor, &quote, session.account);
        let native_fee = write.value();
        let receipt = submit_and_await(self.gateway.as_ref(), &self.settings, &write, |tx_hash| {
            operation.record_tx(tx_hash);
            Ok(())
        })
        .await?;

        Ok(FlowReceipt {
            kind: FlowKind::ComposeSend,
            chain_id: session.chain_id,
            transactions: vec![receipt],
            native_fee: Some(native_fee),
        })
    }
}
