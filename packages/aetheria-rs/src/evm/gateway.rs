//! EVM Chain Gateway
//!
//! [`ChainGateway`] over JSON-RPC. Reads go through a plain HTTP provider;
//! writes build a wallet provider with the recommended fillers so nonce, gas
//! and fees are populated automatically.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, B256, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::contracts::{ONFTSendParam, PlayerONFT, ResourceOFT, SendParam};
use crate::gateway::{ChainGateway, ContractWrite, Session, TxReceipt};
use crate::transfer::TransferDescriptor;
use crate::types::FeeQuote;

/// Receipt polling interval unless overridden
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Wallet-backed gateway for one EVM chain
pub struct EvmGateway {
    chain_id: u64,
    rpc_url: Url,
    signer: Option<PrivateKeySigner>,
    provider: RootProvider<Http<Client>>,
    poll_interval: Duration,
}

impl fmt::Debug for EvmGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmGateway")
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url.as_str())
            .field("account", &self.signer.as_ref().map(|s| s.address()))
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl EvmGateway {
    /// Connect to `rpc_url` and verify it serves `chain_id`.
    ///
    /// Without a private key the gateway is read-only and reports no session.
    pub async fn connect(rpc_url: &str, chain_id: u64, private_key: Option<&str>) -> Result<Self> {
        let rpc_url: Url = rpc_url
            .parse()
            .map_err(|e| eyre!("Invalid RPC URL: {}", e))?;

        let signer = private_key
            .map(|pk| {
                pk.parse::<PrivateKeySigner>()
                    .map_err(|e| eyre!("Invalid private key: {}", e))
            })
            .transpose()?;

        let provider = ProviderBuilder::new().on_http(rpc_url.clone());

        let remote_chain_id = provider
            .get_chain_id()
            .await
            .wrap_err("Failed to get chain ID")?;
        if remote_chain_id != chain_id {
            return Err(eyre!(
                "RPC {} serves chain {}, expected {}",
                rpc_url,
                remote_chain_id,
                chain_id
            ));
        }

        info!(
            rpc_url = %rpc_url,
            chain_id = chain_id,
            account = ?signer.as_ref().map(|s| s.address()),
            "Connected EVM gateway"
        );

        Ok(Self {
            chain_id,
            rpc_url,
            signer,
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Read-only provider for ad-hoc queries
    pub fn provider(&self) -> &RootProvider<Http<Client>> {
        &self.provider
    }

    fn wallet_provider(&self) -> Result<impl Provider<Http<Client>>> {
        let signer = self
            .signer
            .clone()
            .ok_or_else(|| eyre!("No private key configured"))?;
        Ok(ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .on_http(self.rpc_url.clone()))
    }
}

#[async_trait]
impl ChainGateway for EvmGateway {
    fn session(&self) -> Option<Session> {
        self.signer.as_ref().map(|s| Session {
            account: s.address(),
            chain_id: self.chain_id,
        })
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256> {
        let contract = ResourceOFT::new(token, &self.provider);
        let balance = contract
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| eyre!("balanceOf on {}: {}", token, e))?;
        Ok(balance._0)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let contract = ResourceOFT::new(token, &self.provider);
        let allowance = contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| eyre!("allowance on {}: {}", token, e))?;
        Ok(allowance._0)
    }

    async fn owner_of(&self, nft: Address, token_id: U256) -> Result<Address> {
        let contract = PlayerONFT::new(nft, &self.provider);
        let owner = contract
            .ownerOf(token_id)
            .call()
            .await
            .map_err(|e| eyre!("ownerOf({}) on {}: {}", token_id, nft, e))?;
        Ok(owner._0)
    }

    async fn quote_send(
        &self,
        contract: Address,
        descriptor: &TransferDescriptor,
    ) -> Result<FeeQuote> {
        let fee = match descriptor {
            TransferDescriptor::Fungible(t) => {
                ResourceOFT::new(contract, &self.provider)
                    .quoteSend(SendParam::from(t), false)
                    .call()
                    .await
                    .map_err(|e| eyre!("quoteSend on {}: {}", contract, e))?
                    .fee
            }
            TransferDescriptor::NonFungible(t) => {
                PlayerONFT::new(contract, &self.provider)
                    .quoteSend(ONFTSendParam::from(t), false)
                    .call()
                    .await
                    .map_err(|e| eyre!("quoteSend on {}: {}", contract, e))?
                    .fee
            }
        };
        Ok(fee.into())
    }

    async fn submit(&self, write: &ContractWrite) -> Result<B256> {
        let provider = self.wallet_provider()?;
        let action = write.action();

        let pending = match write {
            ContractWrite::Approve {
                token,
                spender,
                amount,
            } => ResourceOFT::new(*token, &provider)
                .approve(*spender, *amount)
                .send()
                .await,
            ContractWrite::Send {
                contract,
                descriptor: TransferDescriptor::Fungible(t),
                fee,
                refund,
            } => ResourceOFT::new(*contract, &provider)
                .send(SendParam::from(t), (*fee).into(), *refund)
                .value(fee.native_fee)
                .send()
                .await,
            ContractWrite::Send {
                contract,
                descriptor: TransferDescriptor::NonFungible(t),
                fee,
                refund,
            } => PlayerONFT::new(*contract, &provider)
                .send(ONFTSendParam::from(t), (*fee).into(), *refund)
                .value(fee.native_fee)
                .send()
                .await,
            ContractWrite::BurnEnergyAndMint {
                resource,
                energy_amount,
            } => ResourceOFT::new(*resource, &provider)
                .burnEnergyAndMint(*energy_amount)
                .send()
                .await,
        }
        .map_err(|e| eyre!("{}: {}", action, e))?;

        let tx_hash = *pending.tx_hash();
        debug!(action, tx_hash = %tx_hash, value = %write.value(), "Transaction broadcast");
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .wrap_err("Failed to get transaction receipt")?;

            if let Some(receipt) = receipt {
                return Ok(TxReceipt {
                    tx_hash,
                    block_number: receipt.block_number,
                    gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
                    success: receipt.status(),
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
