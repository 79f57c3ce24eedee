//! Testing Utilities Module
//!
//! Provides an in-memory gateway and assertions for exercising the flows
//! without a node.
//!
//! ## Submodules
//!
//! - `mock_gateway` - In-memory [`crate::gateway::ChainGateway`] with failure injection
//! - `assertions` - Common operation assertions

pub mod assertions;
pub mod mock_gateway;

pub use assertions::*;
pub use mock_gateway::*;
