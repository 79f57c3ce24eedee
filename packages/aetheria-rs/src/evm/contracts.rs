//! Contract ABI Definitions
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the LayerZero
//! OFT/ONFT contracts, the resource vault and the stats hub.

use alloy::sol;

use crate::transfer::{FungibleTransfer, NftTransfer};
use crate::types::FeeQuote;

sol! {
    /// OFT `SendParam`
    #[derive(Debug, PartialEq, Eq)]
    struct SendParam {
        uint32 dstEid;
        bytes32 to;
        uint256 amountLD;
        uint256 minAmountLD;
        bytes extraOptions;
        bytes composeMsg;
        bytes oftCmd;
    }

    /// ONFT721 `SendParam` (token id instead of amounts)
    #[derive(Debug, PartialEq, Eq)]
    struct ONFTSendParam {
        uint32 dstEid;
        bytes32 to;
        uint256 tokenId;
        bytes extraOptions;
        bytes composeMsg;
        bytes onftCmd;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct MessagingFee {
        uint256 nativeFee;
        uint256 lzTokenFee;
    }

    struct MessagingReceipt {
        bytes32 guid;
        uint64 nonce;
        MessagingFee fee;
    }

    struct OFTReceipt {
        uint256 amountSentLD;
        uint256 amountReceivedLD;
    }

    /// Energy, wood and ore tokens. Wood and ore add the vault entry point.
    #[sol(rpc)]
    contract ResourceOFT {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);

        function quoteSend(SendParam calldata _sendParam, bool _payInLzToken)
            external view returns (MessagingFee memory fee);

        function send(SendParam calldata _sendParam, MessagingFee calldata _fee, address _refundAddress)
            external payable returns (MessagingReceipt memory msgReceipt, OFTReceipt memory oftReceipt);

        /// Burn energy held by the caller and mint this resource
        function burnEnergyAndMint(uint256 energyAmount) external;
    }

    /// Player-character ONFT721
    #[sol(rpc)]
    contract PlayerONFT {
        function balanceOf(address owner) external view returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);

        function quoteSend(ONFTSendParam calldata _sendParam, bool _payInLzToken)
            external view returns (MessagingFee memory fee);

        function send(ONFTSendParam calldata _sendParam, MessagingFee calldata _fee, address _refundAddress)
            external payable returns (MessagingReceipt memory msgReceipt);
    }

    /// Battle statistics on the hub chain
    #[sol(rpc)]
    contract AetheriaHub {
        function getPlayerStats(uint256 _tokenId)
            external view returns (uint32 totalBattles, uint32 goblinsKilled, uint32 battlesLost);

        function totalGoblinsKilled() external view returns (uint256);
    }
}

impl From<&FungibleTransfer> for SendParam {
    fn from(t: &FungibleTransfer) -> Self {
        SendParam {
            dstEid: t.dst_eid.as_u32(),
            to: t.to,
            amountLD: t.amount,
            minAmountLD: t.min_amount,
            extraOptions: t.extra_options.clone(),
            composeMsg: t.compose_msg.clone(),
            oftCmd: t.oft_cmd.clone(),
        }
    }
}

impl From<&NftTransfer> for ONFTSendParam {
    fn from(t: &NftTransfer) -> Self {
        ONFTSendParam {
            dstEid: t.dst_eid.as_u32(),
            to: t.to,
            tokenId: t.token_id,
            extraOptions: t.extra_options.clone(),
            composeMsg: t.compose_msg.clone(),
            onftCmd: t.onft_cmd.clone(),
        }
    }
}

impl From<FeeQuote> for MessagingFee {
    fn from(fee: FeeQuote) -> Self {
        MessagingFee {
            nativeFee: fee.native_fee,
            lzTokenFee: fee.lz_token_fee,
        }
    }
}

impl From<MessagingFee> for FeeQuote {
    fn from(fee: MessagingFee) -> Self {
        FeeQuote {
            native_fee: fee.nativeFee,
            lz_token_fee: fee.lzTokenFee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::Slippage;
    use crate::types::EndpointId;
    use alloy::primitives::{Bytes, B256, U256};
    use alloy::sol_types::{SolCall, SolValue};

    #[test]
    fn test_send_param_from_fungible_transfer() {
        let t = FungibleTransfer::new(EndpointId(40232), B256::repeat_byte(7), U256::from(100u64), Slippage::Bridge)
            .with_compose_msg(Bytes::from(vec![1u8]));
        let param = SendParam::from(&t);

        assert_eq!(param.dstEid, 40232);
        assert_eq!(param.to, B256::repeat_byte(7));
        assert_eq!(param.amountLD, U256::from(100u64));
        assert_eq!(param.minAmountLD, U256::from(95u64));
        assert_eq!(param.composeMsg, Bytes::from(vec![1u8]));
        assert!(param.oftCmd.is_empty());
    }

    #[test]
    fn test_onft_send_param_from_nft_transfer() {
        let t = NftTransfer::new(EndpointId(40231), B256::repeat_byte(2), U256::from(7u64));
        let param = ONFTSendParam::from(&t);
        assert_eq!(param.tokenId, U256::from(7u64));
        assert_eq!(param.dstEid, 40231);
    }

    #[test]
    fn test_quote_send_selectors_match_layerzero() {
        // quoteSend((uint32,bytes32,uint256,uint256,bytes,bytes,bytes),bool)
        assert_eq!(ResourceOFT::quoteSendCall::SELECTOR, [0x3b, 0x6f, 0x74, 0x3b]);
        // send((uint32,bytes32,uint256,uint256,bytes,bytes,bytes),(uint256,uint256),address)
        assert_eq!(ResourceOFT::sendCall::SELECTOR, [0xc7, 0xc7, 0xf5, 0xb3]);
    }

    #[test]
    fn test_fee_round_trips_through_abi_struct() {
        let quote = FeeQuote {
            native_fee: U256::from(12u64),
            lz_token_fee: U256::ZERO,
        };
        let fee = MessagingFee::from(quote);
        assert_eq!(fee.abi_encode().len(), 64);
        assert_eq!(FeeQuote::from(fee), quote);
    }
}
