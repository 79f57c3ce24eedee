//! Transfer Descriptors
//!
//! Per-operation `SendParam` values, one arm per asset kind. Built fresh for
//! every quote/send and never persisted.

use alloy::primitives::{Bytes, B256, U256};
use serde::Serialize;

use crate::fees::Slippage;
use crate::types::EndpointId;

/// OFT transfer: `SendParam { dstEid, to, amountLD, minAmountLD, extraOptions, composeMsg, oftCmd }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FungibleTransfer {
    pub dst_eid: EndpointId,
    /// Destination account in 32-byte form
    pub to: B256,
    /// Amount in the smallest unit
    pub amount: U256,
    /// Slippage floor, always `<= amount`
    pub min_amount: U256,
    pub extra_options: Bytes,
    pub compose_msg: Bytes,
    pub oft_cmd: Bytes,
}

impl FungibleTransfer {
    pub fn new(dst_eid: EndpointId, to: B256, amount: U256, slippage: Slippage) -> Self {
        Self {
            dst_eid,
            to,
            amount,
            min_amount: slippage.minimum(amount),
            extra_options: Bytes::new(),
            compose_msg: Bytes::new(),
            oft_cmd: Bytes::new(),
        }
    }

    pub fn with_compose_msg(mut self, compose_msg: Bytes) -> Self {
        self.compose_msg = compose_msg;
        self
    }

    pub fn with_extra_options(mut self, extra_options: Bytes) -> Self {
        self.extra_options = extra_options;
        self
    }
}

/// ONFT transfer: `SendParam { dstEid, to, tokenId, extraOptions, composeMsg, onftCmd }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftTransfer {
    pub dst_eid: EndpointId,
    pub to: B256,
    pub token_id: U256,
    pub extra_options: Bytes,
    pub compose_msg: Bytes,
    pub onft_cmd: Bytes,
}

impl NftTransfer {
    pub fn new(dst_eid: EndpointId, to: B256, token_id: U256) -> Self {
        Self {
            dst_eid,
            to,
            token_id,
            extra_options: Bytes::new(),
            compose_msg: Bytes::new(),
            onft_cmd: Bytes::new(),
        }
    }

    pub fn with_compose_msg(mut self, compose_msg: Bytes) -> Self {
        self.compose_msg = compose_msg;
        self
    }
}

/// Transfer descriptor discriminated by asset kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferDescriptor {
    Fungible(FungibleTransfer),
    NonFungible(NftTransfer),
}

impl TransferDescriptor {
    pub fn dst_eid(&self) -> EndpointId {
        match self {
            TransferDescriptor::Fungible(t) => t.dst_eid,
            TransferDescriptor::NonFungible(t) => t.dst_eid,
        }
    }

    pub fn to(&self) -> B256 {
        match self {
            TransferDescriptor::Fungible(t) => t.to,
            TransferDescriptor::NonFungible(t) => t.to,
        }
    }

    pub fn compose_msg(&self) -> &Bytes {
        match self {
            TransferDescriptor::Fungible(t) => &t.compose_msg,
            TransferDescriptor::NonFungible(t) => &t.compose_msg,
        }
    }
}

impl From<FungibleTransfer> for TransferDescriptor {
    fn from(transfer: FungibleTransfer) -> Self {
        TransferDescriptor::Fungible(transfer)
    }
}

impl From<NftTransfer> for TransferDescriptor {
    fn from(transfer: NftTransfer) -> Self {
        TransferDescriptor::NonFungible(transfer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fungible_transfer_defaults_are_empty() {
        let t = FungibleTransfer::new(
            EndpointId(40232),
            B256::ZERO,
            U256::from(100u64),
            Slippage::Bridge,
        );
        assert_eq!(t.min_amount, U256::from(95u64));
        assert!(t.extra_options.is_empty());
        assert!(t.compose_msg.is_empty());
        assert!(t.oft_cmd.is_empty());
    }

    #[test]
    fn test_descriptor_accessors() {
        let compose = Bytes::from(vec![1u8, 2, 3]);
        let d: TransferDescriptor = NftTransfer::new(EndpointId(40231), B256::repeat_byte(1), U256::from(7u64))
            .with_compose_msg(compose.clone())
            .into();
        assert_eq!(d.dst_eid(), EndpointId(40231));
        assert_eq!(d.to(), B256::repeat_byte(1));
        assert_eq!(d.compose_msg(), &compose);
    }
}
