//! Cross-Chain Operations
//!
//! The [`Orchestrator`] drives every flow against a [`ChainGateway`] and
//! reports progress through an [`Operation`]. All flows follow the same
//! skeleton:
//!
//! 1. Preconditions (connected wallet, well-formed request, nothing in
//!    flight). Failures return an error without touching the operation.
//! 2. Registry resolution. Failures move the operation straight to `error`.
//! 3. Quote and/or approve, submit, await confirmation.
//! 4. `complete`, or `error` carrying the failure's message.

mod battle;
mod bridge;
mod compose_send;
mod state;
mod submit;
mod vault;


pub use battle::BattleRequest;
pub use bridge::BridgeRequest;
pub use compose_send::ComposeSendRequest;
pub use state::{FlowKind, Operation, OperationState};
pub use submit::{submit_and_await, SubmitSettings};
pub use vault::VaultRequest;

use alloy::primitives::{Address, B256, U256};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::OrchestratorError;
use crate::gateway::{ChainGateway, Session, TxReceipt};
use crate::registry::{ChainDescriptor, Registry};
use crate::types::{ContractRole, Resource};

/// Outcome of a completed flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowReceipt {
    pub kind: FlowKind,
    /// Chain the transactions were submitted on
    pub chain_id: u64,
    /// Confirmed transactions in submission order
    pub transactions: Vec<TxReceipt>,
    /// Native fee attached to the send, for cross-chain flows
    pub native_fee: Option<U256>,
}

impl FlowReceipt {
    /// Hash of the last confirmed transaction
    pub fn final_tx_hash(&self) -> Option<B256> {
        self.transactions.last().map(|r| r.tx_hash)
    }
}

/// Balance of one resource token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceBalance {
    pub resource: Resource,
    pub amount: U256,
}

/// Holdings of the connected account on the active chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portfolio {
    pub account: Address,
    pub chain_id: u64,
    /// Resources deployed on this chain
    pub resources: Vec<ResourceBalance>,
    /// Player NFTs held, `None` where the NFT is not deployed
    pub player_nfts: Option<U256>,
}

impl Portfolio {
    pub fn balance(&self, resource: Resource) -> Option<U256> {
        self.resources
            .iter()
            .find(|b| b.resource == resource)
            .map(|b| b.amount)
    }
}

/// Drives cross-chain flows for the connected wallet
#[derive(Debug)]
pub struct Orchestrator<G: ?Sized> {
    gateway: Arc<G>,
    registry: Arc<Registry>,
    settings: SubmitSettings,
}

impl<G: ?Sized> Clone for Orchestrator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            registry: Arc::clone(&self.registry),
            settings: self.settings.clone(),
        }
    }
}

impl<G> Orchestrator<G>
where
    G: ChainGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>, registry: Arc<Registry>) -> Self {
        Self {
            gateway,
            registry,
            settings: SubmitSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SubmitSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn settings(&self) -> &SubmitSettings {
        &self.settings
    }

    /// Active chain descriptor, if the wallet is connected to a known chain
    pub fn current_chain(&self) -> Option<&ChainDescriptor> {
        let session = self.gateway.session()?;
        self.registry.chain(session.chain_id)
    }

    /// Chains a bridge may target from the active chain
    pub fn bridge_destinations(&self) -> Vec<&ChainDescriptor> {
        match self.gateway.session() {
            Some(session) => self.registry.bridge_destinations(session.chain_id),
            None => Vec::new(),
        }
    }

    /// The arena a battle-send targets from the active chain
    pub fn battle_destination(&self) -> Option<&ChainDescriptor> {
        let session = self.gateway.session()?;
        self.registry.arena_opponent(session.chain_id)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Resource and NFT balances of the connected account
    pub async fn portfolio(&self) -> Result<Portfolio, OrchestratorError> {
        let session = self.session()?;
        let mut resources = Vec::new();

        for resource in Resource::ALL {
            let Some(token) = self.registry.resolve_address(session.chain_id, resource.role())
            else {
                continue;
            };
            let amount = self.read_balance(token, session.account).await?;
            resources.push(ResourceBalance { resource, amount });
        }

        let player_nfts = match self
            .registry
            .resolve_address(session.chain_id, ContractRole::PlayerNft)
        {
            Some(nft) => Some(self.read_balance(nft, session.account).await?),
            None => None,
        };

        Ok(Portfolio {
            account: session.account,
            chain_id: session.chain_id,
            resources,
            player_nfts,
        })
    }

    /// Current owner of a player NFT on the active chain
    pub async fn owner_of(&self, token_id: U256) -> Result<Address, OrchestratorError> {
        let session = self.session()?;
        let nft = self
            .registry
            .require_address(session.chain_id, ContractRole::PlayerNft)?;
        self.gateway
            .owner_of(nft, token_id)
            .await
            .map_err(|e| OrchestratorError::Read {
                what: "owner",
                reason: e.to_string(),
            })
    }

    // =========================================================================
    // Shared flow plumbing
    // =========================================================================

    pub(crate) fn session(&self) -> Result<Session, OrchestratorError> {
        self.gateway.session().ok_or(OrchestratorError::NotConnected)
    }

    pub(crate) async fn read_balance(
        &self,
        token: Address,
        account: Address,
    ) -> Result<U256, OrchestratorError> {
        self.gateway
            .balance_of(token, account)
            .await
            .map_err(|e| OrchestratorError::Read {
                what: "balance",
                reason: e.to_string(),
            })
    }

    /// Destination chain of a cross-chain send, which must differ from the source
    pub(crate) fn destination(
        &self,
        session: &Session,
        chain_id: u64,
    ) -> Result<&ChainDescriptor, OrchestratorError> {
        if chain_id == session.chain_id {
            return Err(OrchestratorError::InvalidDestination(format!(
                "chain {} is the current chain",
                chain_id
            )));
        }
        self.registry
            .chain(chain_id)
            .ok_or_else(|| OrchestratorError::InvalidDestination(format!("chain {}", chain_id)))
    }

    /// Settle a run: `complete` on success, `error` otherwise
    pub(crate) fn finish(
        &self,
        operation: &Operation,
        result: Result<FlowReceipt, OrchestratorError>,
    ) -> Result<FlowReceipt, OrchestratorError> {
        let result = result.and_then(|receipt| {
            operation.advance(OperationState::Complete)?;
            Ok(receipt)
        });

        match &result {
            Ok(receipt) => info!(
                kind = %operation.kind(),
                chain_id = receipt.chain_id,
                tx_hash = ?receipt.final_tx_hash(),
                "Operation complete"
            ),
            Err(e) => {
                warn!(kind = %operation.kind(), error = %e, "Operation failed");
                operation.fail(e);
            }
        }

        result
    }
}
