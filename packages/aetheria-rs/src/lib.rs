//! Aetheria-RS: Cross-Chain Operation Orchestrator
//!
//! This crate turns a player intent ("send token X, amount/id Y, to chain Z")
//! into a sequenced, fee-quoted, allowance-checked submission against the
//! LayerZero messaging layer, exposing a single observable state machine per
//! operation:
//!
//! - **Registry** - Static chain descriptors and per-chain contract addresses
//! - **Amount Codec** - Decimal string <-> fixed-point conversion, bytes32 destination ids
//! - **Compose Builder** - Payloads decoded by the destination composer contracts
//! - **Fees** - Quoting, the 20% native fee buffer and slippage floors
//! - **Allowance** - Exact-amount ERC20 approvals for the resource vault
//! - **Operation** - Battle-send, bridge, vault-burn and send-and-compose flows
//! - **Stats** - Battle records kept on the hub chain
//! - **EVM Module** - alloy bindings, the wallet-backed gateway and the stats hub reader
//! - **Testing Module** - In-memory gateway for flow tests
//!
//! ## Feature Flags
//!
//! - `evm` - Enable the alloy-backed gateway (default)
//! - `testing` - Enable the in-memory [`testing::MockGateway`]
//! - `full` - Enable all features

// Core modules (always available)
pub mod allowance;
pub mod amount;
pub mod compose;
pub mod error;
pub mod fees;
pub mod gateway;
pub mod operation;
pub mod registry;
pub mod stats;
pub mod transfer;
pub mod types;

#[cfg(feature = "evm")]
pub mod evm;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use allowance::{ensure_allowance, ensure_allowance_with, read_allowance};
pub use amount::{
    account_to_destination_id, destination_id_to_account, from_fixed_point, parse_positive_amount,
    parse_token_id, to_fixed_point, AmountError, DEFAULT_DECIMALS,
};
pub use compose::{battle_compose_msg, ExecutorOptions, ResourceComposeMsg};
pub use error::OrchestratorError;
pub use fees::{buffered_native_fee, Slippage};
pub use gateway::{ChainGateway, ContractWrite, Session, TxReceipt};
pub use operation::{
    submit_and_await, BattleRequest, BridgeRequest, ComposeSendRequest, FlowKind, FlowReceipt,
    Operation, OperationState, Orchestrator, Portfolio, ResourceBalance, SubmitSettings,
    VaultRequest,
};
pub use registry::{ChainDescriptor, Registry};
pub use stats::{PlayerStats, StatsHub};
pub use transfer::{FungibleTransfer, NftTransfer, TransferDescriptor};
pub use types::{BridgeAsset, ChainRole, ContractRole, EndpointId, FeeQuote, Resource, VaultResource};
