//! In-Memory Chain Gateway
//!
//! A single-chain stand-in for the wallet/provider pair. Writes are applied to
//! in-memory balances and allowances the moment they are submitted, and every
//! submitted write is recorded for assertions.
//!
//! Failure injection:
//!
//! - `fail_reads()` - balance/allowance/owner reads error
//! - `fail_quotes()` - `quoteSend` errors
//! - `reject_submissions()` - the wallet rejects every write
//! - `revert_action()` - writes with that action confirm with a failed receipt
//! - `stall_confirmations()` - receipts never arrive

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::gateway::{ChainGateway, ContractWrite, Session, TxReceipt};
use crate::transfer::TransferDescriptor;
use crate::types::FeeQuote;

/// Quoted native fee used unless overridden (0.001 ETH)
pub const DEFAULT_MOCK_FEE: u64 = 1_000_000_000_000_000;

/// Gas reported on every mock receipt
const MOCK_GAS_USED: u64 = 21_000;

#[derive(Debug)]
struct MockChain {
    session: Option<Session>,
    /// (token, account) -> balance
    balances: HashMap<(Address, Address), U256>,
    /// (token, owner, spender) -> allowance
    allowances: HashMap<(Address, Address, Address), U256>,
    /// (nft, token id) -> owner
    owners: HashMap<(Address, U256), Address>,
    /// resource contract -> energy token it burns
    vaults: HashMap<Address, Address>,
    quote: FeeQuote,
    read_error: Option<String>,
    quote_error: Option<String>,
    submit_error: Option<String>,
    reverting: HashSet<&'static str>,
    stall: bool,
    submitted: Vec<ContractWrite>,
    quote_requests: Vec<(Address, TransferDescriptor)>,
    receipts: HashMap<B256, TxReceipt>,
    block_number: u64,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            session: None,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            owners: HashMap::new(),
            vaults: HashMap::new(),
            quote: FeeQuote::native(U256::from(DEFAULT_MOCK_FEE)),
            read_error: None,
            quote_error: None,
            submit_error: None,
            reverting: HashSet::new(),
            stall: false,
            submitted: Vec::new(),
            quote_requests: Vec::new(),
            receipts: HashMap::new(),
            block_number: 1,
        }
    }
}

impl MockChain {
    fn apply(&mut self, account: Address, write: &ContractWrite) {
        match write {
            ContractWrite::Approve {
                token,
                spender,
                amount,
            } => {
                self.allowances.insert((*token, account, *spender), *amount);
            }
            ContractWrite::Send {
                contract,
                descriptor,
                ..
            } => match descriptor {
                TransferDescriptor::Fungible(t) => {
                    let balance = self.balances.entry((*contract, account)).or_default();
                    *balance = balance.saturating_sub(t.amount);
                }
                TransferDescriptor::NonFungible(t) => {
                    self.owners.remove(&(*contract, t.token_id));
                }
            },
            ContractWrite::BurnEnergyAndMint {
                resource,
                energy_amount,
            } => {
                if let Some(&energy) = self.vaults.get(resource) {
                    let allowance = self.allowances.entry((energy, account, *resource)).or_default();
                    *allowance = allowance.saturating_sub(*energy_amount);
                    let spent = self.balances.entry((energy, account)).or_default();
                    *spent = spent.saturating_sub(*energy_amount);
                }
                let minted = self.balances.entry((*resource, account)).or_default();
                *minted = minted.saturating_add(*energy_amount);
            }
        }
    }
}

/// In-memory [`ChainGateway`]
#[derive(Debug, Default)]
pub struct MockGateway {
    chain: Mutex<MockChain>,
}

impl MockGateway {
    /// A gateway with no wallet connected
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway with `account` connected on `chain_id`
    pub fn connected(account: Address, chain_id: u64) -> Self {
        let gateway = Self::new();
        gateway.set_session(Some(Session { account, chain_id }));
        gateway
    }

    fn chain(&self) -> MutexGuard<'_, MockChain> {
        self.chain.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Setup
    // =========================================================================

    pub fn set_session(&self, session: Option<Session>) {
        self.chain().session = session;
    }

    pub fn disconnect(&self) {
        self.set_session(None);
    }

    pub fn set_balance(&self, token: Address, account: Address, amount: U256) {
        self.chain().balances.insert((token, account), amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.chain().allowances.insert((token, owner, spender), amount);
    }

    pub fn set_owner(&self, nft: Address, token_id: U256, owner: Address) {
        self.chain().owners.insert((nft, token_id), owner);
    }

    /// Make `burnEnergyAndMint` on `resource` burn `energy`
    pub fn register_vault(&self, resource: Address, energy: Address) {
        self.chain().vaults.insert(resource, energy);
    }

    pub fn set_quote(&self, native_fee: U256) {
        self.chain().quote = FeeQuote::native(native_fee);
    }

    pub fn fail_reads(&self, message: &str) {
        self.chain().read_error = Some(message.to_string());
    }

    pub fn fail_quotes(&self, message: &str) {
        self.chain().quote_error = Some(message.to_string());
    }

    pub fn reject_submissions(&self, message: &str) {
        self.chain().submit_error = Some(message.to_string());
    }

    pub fn revert_action(&self, action: &'static str) {
        self.chain().reverting.insert(action);
    }

    pub fn stall_confirmations(&self) {
        self.chain().stall = true;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Every write submitted so far, in order
    pub fn submitted(&self) -> Vec<ContractWrite> {
        self.chain().submitted.clone()
    }

    /// Every `quoteSend` call so far: (contract, descriptor)
    pub fn quote_requests(&self) -> Vec<(Address, TransferDescriptor)> {
        self.chain().quote_requests.clone()
    }

    pub fn balance(&self, token: Address, account: Address) -> U256 {
        self.chain()
            .balances
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance_of(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.chain()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn check_reads(&self) -> Result<()> {
        match &self.chain().read_error {
            Some(msg) => Err(eyre!("{}", msg)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChainGateway for MockGateway {
    fn session(&self) -> Option<Session> {
        self.chain().session
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256> {
        self.check_reads()?;
        Ok(self.balance(token, account))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.check_reads()?;
        Ok(self.allowance_of(token, owner, spender))
    }

    async fn owner_of(&self, nft: Address, token_id: U256) -> Result<Address> {
        self.check_reads()?;
        self.chain()
            .owners
            .get(&(nft, token_id))
            .copied()
            .ok_or_else(|| eyre!("ERC721NonexistentToken({})", token_id))
    }

    async fn quote_send(
        &self,
        contract: Address,
        descriptor: &TransferDescriptor,
    ) -> Result<FeeQuote> {
        let mut chain = self.chain();
        chain.quote_requests.push((contract, descriptor.clone()));
        match &chain.quote_error {
            Some(msg) => Err(eyre!("{}", msg)),
            None => Ok(chain.quote),
        }
    }

    async fn submit(&self, write: &ContractWrite) -> Result<B256> {
        let mut chain = self.chain();
        if let Some(msg) = &chain.submit_error {
            return Err(eyre!("{}", msg));
        }
        let account = chain
            .session
            .map(|s| s.account)
            .ok_or_else(|| eyre!("No wallet connected"))?;

        chain.submitted.push(write.clone());
        let nonce = chain.submitted.len() as u64;
        let tx_hash = B256::left_padding_from(&nonce.to_be_bytes());

        let success = !chain.reverting.contains(write.action());
        if success {
            chain.apply(account, write);
        }

        chain.block_number += 1;
        let receipt = TxReceipt {
            tx_hash,
            block_number: Some(chain.block_number),
            gas_used: MOCK_GAS_USED,
            success,
        };
        chain.receipts.insert(tx_hash, receipt);

        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt> {
        let stall = self.chain().stall;
        if stall {
            std::future::pending::<()>().await;
        }
        self.chain()
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| eyre!("Unknown transaction {}", tx_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: Address = Address::new([0xaa; 20]);
    const ENERGY: Address = Address::new([0x01; 20]);
    const WOOD: Address = Address::new([0x02; 20]);

    #[tokio::test]
    async fn test_burn_consumes_allowance_and_mints() {
        let gateway = MockGateway::connected(ACCOUNT, 421614);
        gateway.register_vault(WOOD, ENERGY);
        gateway.set_balance(ENERGY, ACCOUNT, U256::from(10u64));
        gateway.set_allowance(ENERGY, ACCOUNT, WOOD, U256::from(4u64));

        let write = ContractWrite::BurnEnergyAndMint {
            resource: WOOD,
            energy_amount: U256::from(3u64),
        };
        let tx = gateway.submit(&write).await.unwrap();
        let receipt = gateway.wait_for_receipt(tx).await.unwrap();

        assert!(receipt.success);
        assert_eq!(gateway.balance(ENERGY, ACCOUNT), U256::from(7u64));
        assert_eq!(gateway.balance(WOOD, ACCOUNT), U256::from(3u64));
        assert_eq!(gateway.allowance_of(ENERGY, ACCOUNT, WOOD), U256::from(1u64));
    }

    #[tokio::test]
    async fn test_reverted_write_has_no_effect() {
        let gateway = MockGateway::connected(ACCOUNT, 421614);
        gateway.revert_action("approve");

        let write = ContractWrite::Approve {
            token: ENERGY,
            spender: WOOD,
            amount: U256::from(3u64),
        };
        let tx = gateway.submit(&write).await.unwrap();
        assert!(!gateway.wait_for_receipt(tx).await.unwrap().success);
        assert_eq!(gateway.allowance_of(ENERGY, ACCOUNT, WOOD), U256::ZERO);
    }

    #[tokio::test]
    async fn test_submit_requires_session() {
        let gateway = MockGateway::new();
        let write = ContractWrite::Approve {
            token: ENERGY,
            spender: WOOD,
            amount: U256::from(1u64),
        };
        assert!(gateway.submit(&write).await.is_err());
        assert!(gateway.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_owner_of_unknown_token_errors() {
        let gateway = MockGateway::connected(ACCOUNT, 421614);
        gateway.set_owner(WOOD, U256::from(7u64), ACCOUNT);
        assert_eq!(gateway.owner_of(WOOD, U256::from(7u64)).await.unwrap(), ACCOUNT);
        assert!(gateway.owner_of(WOOD, U256::from(8u64)).await.is_err());
    }
}
