//! Common types for cross-chain operations
//!
//! Closed enumerations for chain roles, contract roles and asset kinds, plus
//! the LayerZero endpoint id and fee quote value types.

use alloy::primitives::U256;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// LayerZero Endpoint ID
// ============================================================================

/// LayerZero endpoint identifier of a destination network.
///
/// Distinct from the chain's own EVM chain id (e.g. Base Sepolia is chain
/// 84532 but endpoint 40245).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointId(pub u32);

impl EndpointId {
    /// Get the raw u32
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EndpointId {
    fn from(eid: u32) -> Self {
        EndpointId(eid)
    }
}

impl FromStr for EndpointId {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u32>()
            .map(EndpointId)
            .map_err(|e| eyre!("Invalid endpoint id '{}': {}", s, e))
    }
}

// ============================================================================
// Chain Role
// ============================================================================

/// Role a chain plays in the deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainRole {
    /// Statistics hub chain (no NFT, no composer)
    Hub,
    /// Battle arena chain (hosts the NFT and a composer)
    Arena,
}

impl ChainRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainRole::Hub => "hub",
            ChainRole::Arena => "arena",
        }
    }
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Fungible Resources
// ============================================================================

/// Fungible resource tokens (LayerZero OFTs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Energy,
    Wood,
    Ore,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Energy, Resource::Wood, Resource::Ore];

    /// Get the resource as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Energy => "energy",
            Resource::Wood => "wood",
            Resource::Ore => "ore",
        }
    }

    /// Contract role holding this resource's token
    pub fn role(&self) -> ContractRole {
        match self {
            Resource::Energy => ContractRole::Energy,
            Resource::Wood => ContractRole::Wood,
            Resource::Ore => ContractRole::Ore,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Resource {
    type Err = eyre::Error;

    /// Accepts the short names as well as the hardhat deployment names
    /// (`EnergyOFT`, `WoodResourceOFT`, `OreResourceOFT`).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "energy" | "energyoft" => Ok(Resource::Energy),
            "wood" | "woodresourceoft" => Ok(Resource::Wood),
            "ore" | "oreresourceoft" => Ok(Resource::Ore),
            other => Err(eyre!("Unknown resource: {}", other)),
        }
    }
}

/// Resources that can be minted from energy in the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultResource {
    Wood,
    Ore,
}

impl VaultResource {
    pub fn as_str(&self) -> &'static str {
        Resource::from(*self).as_str()
    }
}

impl From<VaultResource> for Resource {
    fn from(resource: VaultResource) -> Self {
        match resource {
            VaultResource::Wood => Resource::Wood,
            VaultResource::Ore => Resource::Ore,
        }
    }
}

impl fmt::Display for VaultResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VaultResource {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        match Resource::from_str(s)? {
            Resource::Wood => Ok(VaultResource::Wood),
            Resource::Ore => Ok(VaultResource::Ore),
            Resource::Energy => Err(eyre!("Energy cannot be minted from the vault")),
        }
    }
}

// ============================================================================
// Contract Roles
// ============================================================================

/// Asset-kind tag of a deployed contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRole {
    Energy,
    Wood,
    Ore,
    /// Player-character ONFT721
    PlayerNft,
    /// lzCompose receiver that runs the battle
    Composer,
    /// Statistics hub (hub chain only)
    StatsHub,
}

impl ContractRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractRole::Energy => "energy",
            ContractRole::Wood => "wood",
            ContractRole::Ore => "ore",
            ContractRole::PlayerNft => "onft",
            ContractRole::Composer => "composer",
            ContractRole::StatsHub => "hub",
        }
    }
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Resource> for ContractRole {
    fn from(resource: Resource) -> Self {
        resource.role()
    }
}

impl FromStr for ContractRole {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onft" | "nft" | "player_nft" => Ok(ContractRole::PlayerNft),
            "composer" => Ok(ContractRole::Composer),
            "hub" | "stats_hub" => Ok(ContractRole::StatsHub),
            other => Resource::from_str(other).map(ContractRole::from),
        }
    }
}

// ============================================================================
// Bridge Asset
// ============================================================================

/// What a bridge operation moves; each arm carries exactly the fields its
/// transfer descriptor needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BridgeAsset {
    Fungible { resource: Resource, amount: U256 },
    PlayerNft { token_id: U256 },
}

impl BridgeAsset {
    /// Contract role of the source contract for this asset
    pub fn role(&self) -> ContractRole {
        match self {
            BridgeAsset::Fungible { resource, .. } => resource.role(),
            BridgeAsset::PlayerNft { .. } => ContractRole::PlayerNft,
        }
    }
}

// ============================================================================
// Fee Quote
// ============================================================================

/// Messaging fee as returned by `quoteSend`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeQuote {
    /// Fee in the source chain's native currency
    pub native_fee: U256,
    /// Fee in the LayerZero token (always zero in submissions)
    pub lz_token_fee: U256,
}

impl FeeQuote {
    pub fn native(native_fee: U256) -> Self {
        Self {
            native_fee,
            lz_token_fee: U256::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_from_str_accepts_deployment_names() {
        assert_eq!(Resource::from_str("ore").unwrap(), Resource::Ore);
        assert_eq!(Resource::from_str("OreResourceOFT").unwrap(), Resource::Ore);
        assert_eq!(Resource::from_str("WoodResourceOFT").unwrap(), Resource::Wood);
        assert_eq!(Resource::from_str(" Energy ").unwrap(), Resource::Energy);
        assert!(Resource::from_str("gold").is_err());
    }

    #[test]
    fn test_vault_resource_rejects_energy() {
        assert_eq!(VaultResource::from_str("wood").unwrap(), VaultResource::Wood);
        assert!(VaultResource::from_str("energy").is_err());
        assert_eq!(Resource::from(VaultResource::Ore), Resource::Ore);
    }

    #[test]
    fn test_contract_role_from_str() {
        assert_eq!(ContractRole::from_str("onft").unwrap(), ContractRole::PlayerNft);
        assert_eq!(ContractRole::from_str("hub").unwrap(), ContractRole::StatsHub);
        assert_eq!(ContractRole::from_str("wood").unwrap(), ContractRole::Wood);
        assert!(ContractRole::from_str("bridge").is_err());
    }

    #[test]
    fn test_bridge_asset_role() {
        let fungible = BridgeAsset::Fungible {
            resource: Resource::Energy,
            amount: U256::from(1u64),
        };
        let nft = BridgeAsset::PlayerNft {
            token_id: U256::from(7u64),
        };
        assert_eq!(fungible.role(), ContractRole::Energy);
        assert_eq!(nft.role(), ContractRole::PlayerNft);
    }

    #[test]
    fn test_endpoint_id_parse() {
        assert_eq!(EndpointId::from_str("40231").unwrap(), EndpointId(40231));
        assert!(EndpointId::from_str("-1").is_err());
        assert_eq!(EndpointId(40245).to_string(), "40245");
    }
}
