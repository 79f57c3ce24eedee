//! Chain Gateway
//!
//! The seam between the orchestrator and the wallet/provider collaborator.
//! Reads are side-effect free and safe to retry; writes are signed by the
//! connected wallet and return the transaction hash as soon as the provider
//! accepts them.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use eyre::Result;
use serde::Serialize;

use crate::fees::buffered_native_fee;
use crate::transfer::TransferDescriptor;
use crate::types::FeeQuote;

/// Active wallet session: connected account and selected network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    pub account: Address,
    pub chain_id: u64,
}

/// A contract write the orchestrator submits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractWrite {
    /// `token.approve(spender, amount)`
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    /// `contract.send(sendParam, fee, refund)` with `msg.value = fee.native_fee`
    Send {
        contract: Address,
        descriptor: TransferDescriptor,
        fee: FeeQuote,
        refund: Address,
    },
    /// `resource.burnEnergyAndMint(energyAmount)`
    BurnEnergyAndMint {
        resource: Address,
        energy_amount: U256,
    },
}

impl ContractWrite {
    /// Prepare a send paying the buffered native fee and no LayerZero token fee
    pub fn send(
        contract: Address,
        descriptor: TransferDescriptor,
        quote: &FeeQuote,
        refund: Address,
    ) -> Self {
        ContractWrite::Send {
            contract,
            descriptor,
            fee: FeeQuote::native(buffered_native_fee(quote.native_fee)),
            refund,
        }
    }

    /// Native value attached to the transaction
    pub fn value(&self) -> U256 {
        match self {
            ContractWrite::Send { fee, .. } => fee.native_fee,
            ContractWrite::Approve { .. } | ContractWrite::BurnEnergyAndMint { .. } => U256::ZERO,
        }
    }

    /// Contract the transaction is sent to
    pub fn target(&self) -> Address {
        match self {
            ContractWrite::Approve { token, .. } => *token,
            ContractWrite::Send { contract, .. } => *contract,
            ContractWrite::BurnEnergyAndMint { resource, .. } => *resource,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            ContractWrite::Approve { .. } => "approve",
            ContractWrite::Send { .. } => "send",
            ContractWrite::BurnEnergyAndMint { .. } => "burnEnergyAndMint",
        }
    }
}

/// Confirmed transaction summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// `false` when the transaction reverted
    pub success: bool,
}

/// Wallet-backed access to the contracts of the active chain
#[async_trait]
pub trait ChainGateway: Send + Sync + std::fmt::Debug {
    /// Connected account and active chain, `None` when no wallet is connected
    fn session(&self) -> Option<Session>;

    /// `token.balanceOf(account)` (ERC20 or ERC721)
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256>;

    /// `token.allowance(owner, spender)`
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// `nft.ownerOf(tokenId)`
    async fn owner_of(&self, nft: Address, token_id: U256) -> Result<Address>;

    /// `contract.quoteSend(sendParam, false)`
    async fn quote_send(&self, contract: Address, descriptor: &TransferDescriptor)
        -> Result<FeeQuote>;

    /// Sign and broadcast a write, returning its transaction hash
    async fn submit(&self, write: &ContractWrite) -> Result<B256>;

    /// Wait until the transaction is included and return its receipt
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::NftTransfer;
    use crate::types::EndpointId;

    #[test]
    fn test_send_write_carries_buffered_fee() {
        let descriptor = NftTransfer::new(EndpointId(40232), B256::ZERO, U256::from(7u64)).into();
        let quote = FeeQuote {
            native_fee: U256::from(1_000u64),
            lz_token_fee: U256::from(55u64),
        };
        let write = ContractWrite::send(Address::ZERO, descriptor, &quote, Address::ZERO);

        assert_eq!(write.value(), U256::from(1_200u64));
        match write {
            ContractWrite::Send { fee, .. } => {
                assert_eq!(fee.native_fee, U256::from(1_200u64));
                assert_eq!(fee.lz_token_fee, U256::ZERO);
            }
            other => panic!("unexpected write {other:?}"),
        }
    }

    #[test]
    fn test_non_send_writes_carry_no_value() {
        let approve = ContractWrite::Approve {
            token: Address::ZERO,
            spender: Address::ZERO,
            amount: U256::from(3u64),
        };
        assert_eq!(approve.value(), U256::ZERO);
        assert_eq!(approve.action(), "approve");
    }
}
