//! Stats hub reader

use alloy::{
    primitives::{Address, U256},
    providers::{ProviderBuilder, RootProvider},
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result};
use tracing::debug;

use super::contracts::AetheriaHub;
use crate::registry::Registry;
use crate::stats::{PlayerStats, StatsHub};
use crate::types::ContractRole;

/// Read-only client for the hub chain's `AetheriaHub`
#[derive(Clone)]
pub struct HubClient {
    address: Address,
    provider: RootProvider<Http<Client>>,
}

impl HubClient {
    pub fn new(rpc_url: &str, address: Address) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL: {}", e))?,
        );
        Ok(Self { address, provider })
    }

    /// The hub deployed on the registry's hub chain
    pub fn from_registry(registry: &Registry) -> Result<Self> {
        let hub = registry
            .hub()
            .ok_or_else(|| eyre!("No hub chain configured"))?;
        let address = registry.require_address(hub.chain_id, ContractRole::StatsHub)?;
        Self::new(&hub.rpc_url, address)
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl StatsHub for HubClient {
    async fn player_stats(&self, token_id: U256) -> Result<PlayerStats> {
        let hub = AetheriaHub::new(self.address, &self.provider);
        let stats = hub
            .getPlayerStats(token_id)
            .call()
            .await
            .map_err(|e| eyre!("Failed to get player stats: {}", e))?;

        debug!(token_id = %token_id, total_battles = stats.totalBattles, "Read player stats");

        Ok(PlayerStats::new(
            stats.totalBattles,
            stats.goblinsKilled,
            stats.battlesLost,
        ))
    }

    async fn total_goblins_killed(&self) -> Result<U256> {
        let hub = AetheriaHub::new(self.address, &self.provider);
        let total = hub
            .totalGoblinsKilled()
            .call()
            .await
            .map_err(|e| eyre!("Failed to get total goblins killed: {}", e))?;
        Ok(total._0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_registry_uses_hub_chain() {
        let registry = Registry::aetheria_testnet();
        let client = HubClient::from_registry(&registry).unwrap();
        assert_eq!(
            Some(client.address()),
            registry.resolve_address(crate::registry::BASE_SEPOLIA, ContractRole::StatsHub)
        );
    }

    #[test]
    fn test_from_registry_without_hub_address() {
        let registry = Registry::aetheria_testnet()
            .without_contract(crate::registry::BASE_SEPOLIA, ContractRole::StatsHub);
        let Err(err) = HubClient::from_registry(&registry) else {
            panic!("hub address should be missing");
        };
        assert!(err.to_string().contains("hub not deployed on Base Sepolia"));
    }
}
