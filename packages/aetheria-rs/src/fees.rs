//! Fee Quoting
//!
//! Quotes are read-only `quoteSend` calls with `payInLzToken = false`. The
//! quoted value is returned unmodified; the 20% buffer is applied only when a
//! send is prepared (see [`crate::gateway::ContractWrite::send`]).

use alloy::primitives::{Address, U256};
use tracing::debug;

use crate::error::OrchestratorError;
use crate::gateway::ChainGateway;
use crate::transfer::TransferDescriptor;
use crate::types::FeeQuote;

/// Percentage of the quoted native fee attached to a send
pub const FEE_BUFFER_PERCENT: u64 = 120;

/// Percentage of the amount that a bridge transfer must deliver
pub const BRIDGE_MIN_PERCENT: u64 = 95;

/// `ceil(quoted * 1.2)`, computed without intermediate overflow
pub fn buffered_native_fee(quoted: U256) -> U256 {
    let hundred = U256::from(100u64);
    let pct = U256::from(FEE_BUFFER_PERCENT);

    let whole = (quoted / hundred).saturating_mul(pct);
    let rem = (quoted % hundred) * pct;
    let rem_ceil = (rem + hundred - U256::from(1u64)) / hundred;

    whole.saturating_add(rem_ceil)
}

/// Slippage floor policy for fungible transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slippage {
    /// Interactive bridge: deliver at least 95% (`floor(amount * 0.95)`)
    Bridge,
    /// Operator compose tooling: deliver exactly `amount`
    Exact,
}

impl Slippage {
    /// Minimum acceptable delivered amount; never exceeds `amount`
    pub fn minimum(&self, amount: U256) -> U256 {
        match self {
            Slippage::Bridge => {
                let hundred = U256::from(100u64);
                let pct = U256::from(BRIDGE_MIN_PERCENT);
                (amount / hundred) * pct + (amount % hundred) * pct / hundred
            }
            Slippage::Exact => amount,
        }
    }
}

/// Ask the source contract what delivering `descriptor` costs
pub async fn quote<G>(
    gateway: &G,
    contract: Address,
    descriptor: &TransferDescriptor,
) -> Result<FeeQuote, OrchestratorError>
where
    G: ChainGateway + ?Sized,
{
    let quote = gateway
        .quote_send(contract, descriptor)
        .await
        .map_err(|e| OrchestratorError::Quote(e.to_string()))?;

    debug!(
        contract = %contract,
        dst_eid = %descriptor.dst_eid(),
        native_fee = %quote.native_fee,
        "Quoted cross-chain send"
    );

    Ok(quote)
}
