//! Chain & Contract Registry
//!
//! Static mapping from EVM chain id to its LayerZero endpoint id and to the
//! deployed address of each contract role on that chain. Pure lookup: a
//! missing (chain, role) pair is reported as `None`, never as another chain's
//! address.

use alloy::primitives::{address, Address};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::OrchestratorError;
use crate::types::{ChainRole, ContractRole, EndpointId};

// ============================================================================
// Deployment Constants
// ============================================================================

pub const BASE_SEPOLIA: u64 = 84532;
pub const ARBITRUM_SEPOLIA: u64 = 421614;
pub const OPTIMISM_SEPOLIA: u64 = 11155420;

/// Immutable description of a supported chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainDescriptor {
    /// Native EVM chain ID
    pub chain_id: u64,
    /// LayerZero endpoint ID
    pub endpoint_id: EndpointId,
    /// Human-readable name
    pub name: String,
    /// Hub or arena
    pub role: ChainRole,
    /// Default JSON-RPC URL
    pub rpc_url: String,
    /// Block explorer base URL
    pub explorer_url: String,
}

impl ChainDescriptor {
    pub fn new(chain_id: u64, endpoint_id: u32, name: &str, role: ChainRole) -> Self {
        Self {
            chain_id,
            endpoint_id: EndpointId(endpoint_id),
            name: name.to_string(),
            role,
            rpc_url: String::new(),
            explorer_url: String::new(),
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: &str) -> Self {
        self.rpc_url = rpc_url.to_string();
        self
    }

    pub fn with_explorer_url(mut self, explorer_url: &str) -> Self {
        self.explorer_url = explorer_url.to_string();
        self
    }

    pub fn is_arena(&self) -> bool {
        self.role == ChainRole::Arena
    }

    /// Explorer link for a transaction hash
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        if self.explorer_url.is_empty() {
            return None;
        }
        Some(format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash))
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Chain descriptors plus the per-chain contract set
#[derive(Debug, Clone, Default)]
pub struct Registry {
    chains: Vec<ChainDescriptor>,
    /// Native chain ID -> position in `chains`
    chain_index: HashMap<u64, usize>,
    contracts: HashMap<u64, HashMap<ContractRole, Address>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The Aetheria testnet deployment (one hub, two arenas)
    pub fn aetheria_testnet() -> Self {
        Self::new()
            .with_chain(
                ChainDescriptor::new(BASE_SEPOLIA, 40245, "Base Sepolia", ChainRole::Hub)
                    .with_rpc_url("https://sepolia.base.org")
                    .with_explorer_url("https://sepolia.basescan.org"),
            )
            .with_chain(
                ChainDescriptor::new(ARBITRUM_SEPOLIA, 40231, "Arbitrum Sepolia", ChainRole::Arena)
                    .with_rpc_url("https://sepolia-rollup.arbitrum.io/rpc")
                    .with_explorer_url("https://sepolia.arbiscan.io"),
            )
            .with_chain(
                ChainDescriptor::new(OPTIMISM_SEPOLIA, 40232, "Optimism Sepolia", ChainRole::Arena)
                    .with_rpc_url("https://sepolia.optimism.io")
                    .with_explorer_url("https://sepolia-optimism.etherscan.io"),
            )
            // Arbitrum Sepolia (arena)
            .with_contract(ARBITRUM_SEPOLIA, ContractRole::PlayerNft, address!("A6555f2b9c83F0feE91A2E83B9005f3c593bfB64"))
            .with_contract(ARBITRUM_SEPOLIA, ContractRole::Composer, address!("3902aE560287C47343f69258A85A9F2FcF7CaA9A"))
            .with_contract(ARBITRUM_SEPOLIA, ContractRole::Energy, address!("CDF5Aaf7226B36f298940F506732ee33E6f46539"))
            .with_contract(ARBITRUM_SEPOLIA, ContractRole::Wood, address!("5AEb971504e46906a4fD0f1557395DDF5e4B4D58"))
            .with_contract(ARBITRUM_SEPOLIA, ContractRole::Ore, address!("1AC1664b2a96AE8a7b06bee8f6Fab67E8643EAb8"))
            // Optimism Sepolia (arena)
            .with_contract(OPTIMISM_SEPOLIA, ContractRole::PlayerNft, address!("1B0200bCc3bc9359E402966f7AD19eF9C9376B53"))
            .with_contract(OPTIMISM_SEPOLIA, ContractRole::Composer, address!("540B335Cda479Db15e56c80905361EccB5DD03Ac"))
            .with_contract(OPTIMISM_SEPOLIA, ContractRole::Energy, address!("038Ea81DC7046Ce07318E890003C92FC0D82A17e"))
            .with_contract(OPTIMISM_SEPOLIA, ContractRole::Wood, address!("0Ebd3313C0eEDe3B231a3cdf790092F8DE81DF1A"))
            .with_contract(OPTIMISM_SEPOLIA, ContractRole::Ore, address!("AC6A4dD697b7a0830D832c8040c92d7F3122d9b0"))
            // Base Sepolia (hub)
            .with_contract(BASE_SEPOLIA, ContractRole::StatsHub, address!("42f04F060B6854E33F9C0f674dDF035a0Ea8bB9C"))
            .with_contract(BASE_SEPOLIA, ContractRole::Energy, address!("694aA977052e9a654dd929ec41F0206F33a5b744"))
            .with_contract(BASE_SEPOLIA, ContractRole::Wood, address!("095b2D8F0B11333a6230857d7560c8365015CaBA"))
            .with_contract(BASE_SEPOLIA, ContractRole::Ore, address!("01B86FF5C7B18E76796E52189179d6e4f3EfAD29"))
    }

    /// Add (or replace) a chain descriptor
    pub fn with_chain(mut self, chain: ChainDescriptor) -> Self {
        match self.chain_index.get(&chain.chain_id) {
            Some(&idx) => self.chains[idx] = chain,
            None => {
                self.chain_index.insert(chain.chain_id, self.chains.len());
                self.chains.push(chain);
            }
        }
        self
    }

    /// Register a contract address for a role on a chain
    pub fn with_contract(mut self, chain_id: u64, role: ContractRole, address: Address) -> Self {
        self.contracts.entry(chain_id).or_default().insert(role, address);
        self
    }

    /// Remove a contract role from a chain
    pub fn without_contract(mut self, chain_id: u64, role: ContractRole) -> Self {
        if let Some(set) = self.contracts.get_mut(&chain_id) {
            set.remove(&role);
        }
        self
    }

    /// Override the RPC URL of a known chain; returns false for unknown chains
    pub fn set_rpc_url(&mut self, chain_id: u64, rpc_url: &str) -> bool {
        match self.chain_index.get(&chain_id) {
            Some(&idx) => {
                self.chains[idx].rpc_url = rpc_url.to_string();
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// All chains, in registration order
    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    /// Get a chain descriptor by native chain ID
    pub fn chain(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.chain_index.get(&chain_id).map(|&idx| &self.chains[idx])
    }

    /// Get a chain descriptor by LayerZero endpoint ID
    pub fn chain_by_endpoint(&self, endpoint_id: EndpointId) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|c| c.endpoint_id == endpoint_id)
    }

    /// Get a chain descriptor by name (case-insensitive)
    pub fn chain_by_name(&self, name: &str) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The hub chain, if configured
    pub fn hub(&self) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|c| c.role == ChainRole::Hub)
    }

    /// Address deployed for `role` on `chain_id`, if any
    pub fn resolve_address(&self, chain_id: u64, role: ContractRole) -> Option<Address> {
        self.contracts.get(&chain_id)?.get(&role).copied()
    }

    /// LayerZero endpoint of `chain_id`, if known
    pub fn resolve_endpoint_id(&self, chain_id: u64) -> Option<EndpointId> {
        self.chain(chain_id).map(|c| c.endpoint_id)
    }

    /// Resolve an address or produce the "not deployed" configuration error
    pub fn require_address(
        &self,
        chain_id: u64,
        role: ContractRole,
    ) -> Result<Address, OrchestratorError> {
        self.resolve_address(chain_id, role)
            .ok_or_else(|| OrchestratorError::NotDeployed {
                role,
                chain: self.display_name(chain_id),
            })
    }

    /// Resolve a chain or produce the "unsupported chain" configuration error
    pub fn require_chain(&self, chain_id: u64) -> Result<&ChainDescriptor, OrchestratorError> {
        self.chain(chain_id)
            .ok_or(OrchestratorError::UnknownChain(chain_id))
    }

    /// Chains selectable as a bridge destination from `chain_id` (every other chain)
    pub fn bridge_destinations(&self, chain_id: u64) -> Vec<&ChainDescriptor> {
        self.chains.iter().filter(|c| c.chain_id != chain_id).collect()
    }

    /// The other arena chain, when `chain_id` is an arena
    pub fn arena_opponent(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        if !self.chain(chain_id)?.is_arena() {
            return None;
        }
        self.chains
            .iter()
            .find(|c| c.is_arena() && c.chain_id != chain_id)
    }

    fn display_name(&self, chain_id: u64) -> String {
        self.chain(chain_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("chain {}", chain_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testnet_has_three_chains() {
        let registry = Registry::aetheria_testnet();
        assert_eq!(registry.chains().len(), 3);
        assert_eq!(registry.hub().unwrap().chain_id, BASE_SEPOLIA);
        assert_eq!(
            registry.resolve_endpoint_id(ARBITRUM_SEPOLIA),
            Some(EndpointId(40231))
        );
        assert_eq!(
            registry.resolve_endpoint_id(OPTIMISM_SEPOLIA),
            Some(EndpointId(40232))
        );
        assert_eq!(registry.resolve_endpoint_id(BASE_SEPOLIA), Some(EndpointId(40245)));
    }

    #[test]
    fn test_absent_role_is_none_not_another_chains_address() {
        let registry = Registry::aetheria_testnet();
        // Hub hosts neither the NFT nor a composer
        assert_eq!(registry.resolve_address(BASE_SEPOLIA, ContractRole::PlayerNft), None);
        assert_eq!(registry.resolve_address(BASE_SEPOLIA, ContractRole::Composer), None);
        // Arenas have no stats hub
        assert_eq!(registry.resolve_address(ARBITRUM_SEPOLIA, ContractRole::StatsHub), None);
        // Unknown chain
        assert_eq!(registry.resolve_address(1, ContractRole::Energy), None);
        assert_eq!(registry.resolve_endpoint_id(1), None);
    }

    #[test]
    fn test_same_role_differs_per_chain() {
        let registry = Registry::aetheria_testnet();
        let arb = registry.resolve_address(ARBITRUM_SEPOLIA, ContractRole::Energy).unwrap();
        let op = registry.resolve_address(OPTIMISM_SEPOLIA, ContractRole::Energy).unwrap();
        let base = registry.resolve_address(BASE_SEPOLIA, ContractRole::Energy).unwrap();
        assert_ne!(arb, op);
        assert_ne!(arb, base);
    }

    #[test]
    fn test_require_address_error_names_chain() {
        let registry = Registry::aetheria_testnet();
        let err = registry
            .require_address(BASE_SEPOLIA, ContractRole::PlayerNft)
            .unwrap_err();
        assert_eq!(err.to_string(), "onft not deployed on Base Sepolia");

        let err = registry.require_address(5, ContractRole::Wood).unwrap_err();
        assert_eq!(err.to_string(), "wood not deployed on chain 5");
    }

    #[test]
    fn test_bridge_destinations_exclude_current_chain() {
        let registry = Registry::aetheria_testnet();
        let dests: Vec<u64> = registry
            .bridge_destinations(ARBITRUM_SEPOLIA)
            .iter()
            .map(|c| c.chain_id)
            .collect();
        assert_eq!(dests, vec![BASE_SEPOLIA, OPTIMISM_SEPOLIA]);
    }

    #[test]
    fn test_arena_opponent() {
        let registry = Registry::aetheria_testnet();
        assert_eq!(
            registry.arena_opponent(ARBITRUM_SEPOLIA).unwrap().chain_id,
            OPTIMISM_SEPOLIA
        );
        assert_eq!(
            registry.arena_opponent(OPTIMISM_SEPOLIA).unwrap().chain_id,
            ARBITRUM_SEPOLIA
        );
        assert!(registry.arena_opponent(BASE_SEPOLIA).is_none());
    }

    #[test]
    fn test_without_contract_and_overrides() {
        let mut registry = Registry::aetheria_testnet()
            .without_contract(OPTIMISM_SEPOLIA, ContractRole::Composer);
        assert_eq!(registry.resolve_address(OPTIMISM_SEPOLIA, ContractRole::Composer), None);

        assert!(registry.set_rpc_url(BASE_SEPOLIA, "http://localhost:8545"));
        assert_eq!(registry.chain(BASE_SEPOLIA).unwrap().rpc_url, "http://localhost:8545");
        assert!(!registry.set_rpc_url(1, "http://localhost:8545"));
    }

    #[test]
    fn test_lookup_by_endpoint_and_name() {
        let registry = Registry::aetheria_testnet();
        assert_eq!(
            registry.chain_by_endpoint(EndpointId(40232)).unwrap().chain_id,
            OPTIMISM_SEPOLIA
        );
        assert_eq!(
            registry.chain_by_name("base sepolia").unwrap().chain_id,
            BASE_SEPOLIA
        );
    }

    #[test]
    fn test_tx_url() {
        let registry = Registry::aetheria_testnet();
        let arb = registry.chain(ARBITRUM_SEPOLIA).unwrap();
        assert_eq!(
            arb.tx_url("0xabc").unwrap(),
            "https://sepolia.arbiscan.io/tx/0xabc"
        );
        assert!(ChainDescriptor::new(1, 1, "x", ChainRole::Arena).tx_url("0x").is_none());
    }
}
