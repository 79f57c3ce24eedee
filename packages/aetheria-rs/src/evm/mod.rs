//! EVM Chain Support Module
//!
//! alloy-backed implementations of the gateway and stats hub seams.
//!
//! ## Submodules
//!
//! - `contracts` - OFT/ONFT, resource vault and hub bindings using alloy sol! macro
//! - `gateway` - Wallet-backed [`crate::gateway::ChainGateway`]
//! - `hub` - Read-only stats hub client

pub mod contracts;
pub mod gateway;
pub mod hub;

pub use contracts::{AetheriaHub, PlayerONFT, ResourceOFT};
pub use gateway::{EvmGateway, DEFAULT_POLL_INTERVAL};
pub use hub::HubClient;
