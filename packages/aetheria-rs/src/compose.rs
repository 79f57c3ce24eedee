//! Compose Message Builder
//!
//! Payloads attached to a LayerZero send that the destination composer
//! decodes positionally, with no tagging. Field order and widths must match
//! the receiving contracts exactly.
//!
//! ## Battle payload (`abi.encodePacked(uint256 tokenId)`)
//!
//! ```text
//! | tokenId, big-endian (32 bytes) |
//! ```
//!
//! ## Resource payload (`abi.encode(address, uint32, bool)`)
//!
//! ```text
//! | recipient, left-padded (32) | dstEid, left-padded (32) | sendBack 0/1 (32) |
//! ```

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolValue;
use eyre::{eyre, Result};

use crate::types::EndpointId;

/// Width of one ABI word
const WORD: usize = 32;

/// Build the battle compose payload: the token id as a single 32-byte word
pub fn battle_compose_msg(token_id: U256) -> Bytes {
    Bytes::from(token_id.to_be_bytes::<WORD>().to_vec())
}

/// Decode a battle compose payload back into its token id
pub fn decode_battle_compose_msg(payload: &[u8]) -> Result<U256> {
    if payload.len() != WORD {
        return Err(eyre!(
            "Battle compose payload must be {} bytes, got {}",
            WORD,
            payload.len()
        ));
    }
    Ok(U256::from_be_slice(payload))
}

// ============================================================================
// Resource Compose Message
// ============================================================================

/// Routing instructions for the resource processing composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceComposeMsg {
    /// Account that receives the processed resources
    pub recipient: Address,
    /// Endpoint the processed output is forwarded to
    pub dst_eid: EndpointId,
    /// Whether the composer sends the output back to the source chain
    pub send_back: bool,
}

impl ResourceComposeMsg {
    /// Encode as three ABI words (96 bytes)
    pub fn encode(&self) -> Bytes {
        Bytes::from((self.recipient, self.dst_eid.0, self.send_back).abi_encode_params())
    }

    /// Decode a payload produced by [`ResourceComposeMsg::encode`]
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != 3 * WORD {
            return Err(eyre!(
                "Resource compose payload must be {} bytes, got {}",
                3 * WORD,
                payload.len()
            ));
        }

        let (recipient_word, rest) = payload.split_at(WORD);
        let (eid_word, flag_word) = rest.split_at(WORD);

        if recipient_word[..12].iter().any(|&b| b != 0)
            || eid_word[..WORD - 4].iter().any(|&b| b != 0)
            || flag_word[..WORD - 1].iter().any(|&b| b != 0)
            || flag_word[WORD - 1] > 1
        {
            return Err(eyre!("Resource compose payload has non-canonical padding"));
        }

        let mut eid = [0u8; 4];
        eid.copy_from_slice(&eid_word[WORD - 4..]);

        Ok(Self {
            recipient: Address::from_slice(&recipient_word[12..]),
            dst_eid: EndpointId(u32::from_be_bytes(eid)),
            send_back: flag_word[WORD - 1] == 1,
        })
    }
}

// ============================================================================
// Executor Options
// ============================================================================

/// Gas limits for remote execution, packed the way the resource tooling does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Gas for `lzReceive` on the destination
    pub receive_gas: u128,
    /// Gas for `lzCompose` on the destination
    pub compose_gas: u128,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            receive_gas: 200_000,
            compose_gas: 500_000,
        }
    }
}

impl ExecutorOptions {
    /// Options type tag of the receive section
    const TYPE_3: u16 = 3;
    /// Option type tag of the compose section
    const COMPOSE: u16 = 1;

    /// Pack as `(uint16 3, uint128 receiveGas, uint128 0)` followed by
    /// `(uint16 1, uint16 0, uint128 composeGas, uint128 0)`.
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(70);

        out.extend_from_slice(&Self::TYPE_3.to_be_bytes());
        out.extend_from_slice(&self.receive_gas.to_be_bytes());
        out.extend_from_slice(&0u128.to_be_bytes());

        out.extend_from_slice(&Self::COMPOSE.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // compose index
        out.extend_from_slice(&self.compose_gas.to_be_bytes());
        out.extend_from_slice(&0u128.to_be_bytes());

        Bytes::from(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_battle_compose_msg() {
        let payload = battle_compose_msg(U256::from(7u64));
        assert_eq!(payload.len(), 32);
        assert!(payload[..31].iter().all(|&b| b == 0));
        assert_eq!(payload[31], 7);
        assert_eq!(decode_battle_compose_msg(&payload).unwrap(), U256::from(7u64));
    }

    #[test]
    fn test_battle_compose_msg_large_id_is_big_endian() {
        let payload = battle_compose_msg(U256::from(0x0102u64));
        assert_eq!(payload[30], 0x01);
        assert_eq!(payload[31], 0x02);
        assert!(decode_battle_compose_msg(&payload[..31]).is_err());
    }

    #[test]
    fn test_resource_compose_msg_layout() {
        let recipient = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let msg = ResourceComposeMsg {
            recipient,
            dst_eid: EndpointId(40231),
            send_back: true,
        };
        let payload = msg.encode();

        assert_eq!(payload.len(), 96);
        // Word 0: address, left-padded
        assert!(payload[..12].iter().all(|&b| b == 0));
        assert_eq!(&payload[12..32], recipient.as_slice());
        // Word 1: uint32 endpoint id in the low bytes
        assert_eq!(&payload[60..64], &40231u32.to_be_bytes());
        assert!(payload[32..60].iter().all(|&b| b == 0));
        // Word 2: bool
        assert_eq!(payload[95], 1);

        assert_eq!(ResourceComposeMsg::decode(&payload).unwrap(), msg);
    }

    #[test]
    fn test_resource_compose_msg_send_back_false() {
        let msg = ResourceComposeMsg {
            recipient: Address::ZERO,
            dst_eid: EndpointId(40245),
            send_back: false,
        };
        let payload = msg.encode();
        assert_eq!(payload[95], 0);
        assert!(!ResourceComposeMsg::decode(&payload).unwrap().send_back);
    }

    #[test]
    fn test_resource_compose_msg_rejects_dirty_padding() {
        let mut payload = ResourceComposeMsg {
            recipient: Address::ZERO,
            dst_eid: EndpointId(1),
            send_back: true,
        }
        .encode()
        .to_vec();
        payload[95] = 2;
        assert!(ResourceComposeMsg::decode(&payload).is_err());
    }

    #[test]
    fn test_executor_options_encoding() {
        let options = ExecutorOptions::default().encode();
        assert_eq!(options.len(), 70);
        assert_eq!(&options[0..2], &[0, 3]);
        assert_eq!(&options[2..18], &200_000u128.to_be_bytes());
        assert_eq!(&options[18..34], &[0u8; 16]);
        assert_eq!(&options[34..36], &[0, 1]);
        assert_eq!(&options[36..38], &[0, 0]);
        assert_eq!(&options[38..54], &500_000u128.to_be_bytes());
        assert_eq!(&options[54..70], &[0u8; 16]);
    }
}
