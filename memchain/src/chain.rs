//! The in-memory chain environment.
//!
//! `MemoryChain` models just enough of a chain for harness suites: funded
//! identities, balance transfers, contract deployment with key/value storage,
//! block mining with clock-driven timestamps, and exact full-state
//! snapshot/restore behind the harness's `Environment` trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use sha3::{Digest, Keccak256};
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use testbed_harness::{
    Address, Environment, EnvironmentError, Identity, RestoreError, SnapshotToken, ADDRESS_LEN,
};

use crate::clock::Clock;
use crate::state::ChainState;

/// Chain operation failure.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Sender cannot cover the transfer.
    #[error("insufficient balance for {address}: have {balance}, need {required}")]
    InsufficientBalance {
        /// Sender address.
        address: Address,
        /// Current balance.
        balance: u64,
        /// Amount the operation required.
        required: u64,
    },

    /// No contract is deployed at the address.
    #[error("no contract deployed at {0}")]
    UnknownContract(Address),
}

/// Handle to a deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractHandle {
    address: Address,
}

impl ContractHandle {
    /// The contract's address.
    pub const fn address(&self) -> Address {
        self.address
    }
}

/// Derive a deterministic address from the chain seed, a domain label, and
/// an index: first 20 bytes of keccak256(seed || domain || index).
pub(crate) fn derive_address(seed: u64, domain: &str, index: u64) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(seed.to_be_bytes());
    hasher.update(domain.as_bytes());
    hasher.update(index.to_be_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; ADDRESS_LEN];
    bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
    Address::new(bytes)
}

/// In-memory chain with exact snapshot/restore.
///
/// Snapshots are full clones of [`ChainState`], so every token stays valid
/// for the lifetime of the chain — including across restores, which is a
/// strictly stronger guarantee than the fixture cache requires.
pub struct MemoryChain {
    identities: Vec<Identity>,
    seed: u64,
    clock: Arc<dyn Clock>,
    started: Instant,
    genesis_timestamp: u64,
    state: RwLock<ChainState>,
    snapshots: Mutex<HashMap<u64, ChainState>>,
    next_snapshot: AtomicU64,
}

impl MemoryChain {
    pub(crate) fn new(
        identities: Vec<Identity>,
        seed: u64,
        clock: Arc<dyn Clock>,
        genesis_timestamp: u64,
        genesis: ChainState,
    ) -> Self {
        Self {
            identities,
            seed,
            started: clock.now(),
            clock,
            genesis_timestamp,
            state: RwLock::new(genesis),
            snapshots: Mutex::new(HashMap::new()),
            next_snapshot: AtomicU64::new(1),
        }
    }

    /// The provisioned identity pool, in derivation order.
    pub fn identity_pool(&self) -> &[Identity] {
        &self.identities
    }

    /// The seed identities and contract addresses derive from. Record it to
    /// replay a run against an identically-provisioned chain.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Spendable balance of `address` (zero when unknown).
    pub fn balance(&self, address: Address) -> u64 {
        self.state
            .read()
            .accounts
            .get(&address)
            .map(|a| a.balance)
            .unwrap_or(0)
    }

    /// Confirmed-operation count of `address` (zero when unknown).
    pub fn nonce(&self, address: Address) -> u64 {
        self.state
            .read()
            .accounts
            .get(&address)
            .map(|a| a.nonce)
            .unwrap_or(0)
    }

    /// Move `amount` base units from `from` to `to`, bumping the sender's
    /// nonce.
    pub fn transfer(&self, from: &Identity, to: Address, amount: u64) -> Result<(), ChainError> {
        let mut state = self.state.write();
        let sender = state.accounts.entry(from.address()).or_default();
        if sender.balance < amount {
            return Err(ChainError::InsufficientBalance {
                address: from.address(),
                balance: sender.balance,
                required: amount,
            });
        }
        sender.balance -= amount;
        sender.nonce += 1;
        state.accounts.entry(to).or_default().balance += amount;
        debug!(from = %from.address(), %to, amount, "transfer applied");
        Ok(())
    }

    /// Deploy a contract authorized by `deployer`, returning its handle.
    /// Contract addresses derive deterministically from the chain seed and a
    /// deployment counter.
    pub fn deploy_contract(&self, deployer: &Identity) -> ContractHandle {
        let mut state = self.state.write();
        let index = state.contracts_deployed;
        state.contracts_deployed += 1;

        let address = derive_address(self.seed, "contract", index);
        state.storage.insert(address, HashMap::new());
        state.accounts.entry(deployer.address()).or_default().nonce += 1;
        debug!(%address, deployer = %deployer.address(), "contract deployed");
        ContractHandle { address }
    }

    /// Write `value` under `key` in the contract's storage.
    pub fn storage_write(
        &self,
        contract: ContractHandle,
        key: &str,
        value: u64,
    ) -> Result<(), ChainError> {
        let mut state = self.state.write();
        let slots = state
            .storage
            .get_mut(&contract.address())
            .ok_or(ChainError::UnknownContract(contract.address()))?;
        slots.insert(key.to_string(), value);
        Ok(())
    }

    /// Read the value under `key` in the contract's storage.
    pub fn storage_read(
        &self,
        contract: ContractHandle,
        key: &str,
    ) -> Result<Option<u64>, ChainError> {
        let state = self.state.read();
        let slots = state
            .storage
            .get(&contract.address())
            .ok_or(ChainError::UnknownContract(contract.address()))?;
        Ok(slots.get(key).copied())
    }

    /// Mine one block: bump height and stamp it from the injected clock.
    /// Returns the new height.
    pub fn mine_block(&self) -> u64 {
        let elapsed = (self.clock.now() - self.started).as_secs();
        let mut state = self.state.write();
        state.height += 1;
        state.timestamp = self.genesis_timestamp + elapsed;
        debug!(height = state.height, timestamp = state.timestamp, "block mined");
        state.height
    }

    /// Current block height.
    pub fn height(&self) -> u64 {
        self.state.read().height
    }

    /// Timestamp of the latest block, seconds.
    pub fn timestamp(&self) -> u64 {
        self.state.read().timestamp
    }

}

#[async_trait]
impl Environment for MemoryChain {
    async fn identities(&self) -> Result<Vec<Identity>, EnvironmentError> {
        Ok(self.identities.clone())
    }

    async fn checkpoint(&self) -> Result<SnapshotToken, EnvironmentError> {
        let id = self.next_snapshot.fetch_add(1, Ordering::SeqCst);
        let captured = self.state.read().clone();
        self.snapshots.lock().insert(id, captured);
        debug!(snapshot = id, "state checkpointed");
        Ok(SnapshotToken::new(id))
    }

    async fn restore(&self, token: SnapshotToken) -> Result<(), RestoreError> {
        let captured = self
            .snapshots
            .lock()
            .get(&token.id())
            .cloned()
            .ok_or(RestoreError::UnknownSnapshot(token))?;
        *self.state.write() = captured;
        debug!(%token, "state restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MemoryChainBuilder;
    use crate::clock::PausedClock;
    use tokio::time::Duration;

    fn chain() -> MemoryChain {
        MemoryChainBuilder::new()
            .with_identity_count(3)
            .with_default_balance(1_000)
            .with_seed(42)
            .build()
    }

    #[test]
    fn transfer_moves_balance_and_bumps_nonce() {
        let chain = chain();
        let alice = chain.identity_pool()[0].clone();
        let bob = chain.identity_pool()[1].clone();

        chain.transfer(&alice, bob.address(), 250).unwrap();

        assert_eq!(chain.balance(alice.address()), 750);
        assert_eq!(chain.balance(bob.address()), 1_250);
        assert_eq!(chain.nonce(alice.address()), 1);
        assert_eq!(chain.nonce(bob.address()), 0);
    }

    #[test]
    fn transfer_rejects_overdraft() {
        let chain = chain();
        let alice = chain.identity_pool()[0].clone();
        let bob = chain.identity_pool()[1].clone();

        let err = chain.transfer(&alice, bob.address(), 5_000).unwrap_err();
        assert!(matches!(err, ChainError::InsufficientBalance { required: 5_000, .. }));
        assert_eq!(chain.balance(alice.address()), 1_000, "failed transfer must not debit");
    }

    #[test]
    fn contract_storage_roundtrip() {
        let chain = chain();
        let deployer = chain.identity_pool()[0].clone();

        let token = chain.deploy_contract(&deployer);
        chain.storage_write(token, "totalSupply", 21_000_000).unwrap();

        assert_eq!(chain.storage_read(token, "totalSupply").unwrap(), Some(21_000_000));
        assert_eq!(chain.storage_read(token, "paused").unwrap(), None);
        assert_eq!(chain.nonce(deployer.address()), 1);
    }

    #[test]
    fn storage_on_undeployed_contract_errors() {
        let chain = chain();
        let ghost = ContractHandle {
            address: derive_address(7, "contract", 99),
        };
        assert!(matches!(
            chain.storage_read(ghost, "x").unwrap_err(),
            ChainError::UnknownContract(_)
        ));
    }

    #[test]
    fn contract_addresses_are_distinct_and_deterministic() {
        let a = chain();
        let b = chain();
        let deployer_a = a.identity_pool()[0].clone();
        let deployer_b = b.identity_pool()[0].clone();

        let first_a = a.deploy_contract(&deployer_a);
        let second_a = a.deploy_contract(&deployer_a);
        let first_b = b.deploy_contract(&deployer_b);

        assert_ne!(first_a.address(), second_a.address());
        // Same seed, same counter: both chains derive the same address.
        assert_eq!(first_a.address(), first_b.address());
    }

    #[tokio::test]
    async fn restore_is_exact_and_tokens_stay_valid() {
        let chain = chain();
        let alice = chain.identity_pool()[0].clone();
        let bob = chain.identity_pool()[1].clone();

        let snap = chain.checkpoint().await.unwrap();

        chain.transfer(&alice, bob.address(), 400).unwrap();
        chain.mine_block();
        chain.restore(snap).await.unwrap();

        assert_eq!(chain.balance(alice.address()), 1_000);
        assert_eq!(chain.balance(bob.address()), 1_000);
        assert_eq!(chain.height(), 0);

        // Full-clone snapshots survive a restore; the same token works twice.
        chain.transfer(&alice, bob.address(), 1).unwrap();
        chain.restore(snap).await.unwrap();
        assert_eq!(chain.balance(alice.address()), 1_000);
    }

    #[tokio::test]
    async fn unknown_token_is_a_restore_error() {
        let chain = chain();
        let err = chain.restore(SnapshotToken::new(999)).await.unwrap_err();
        assert!(matches!(err, RestoreError::UnknownSnapshot(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn block_timestamps_follow_the_clock() {
        let clock = Arc::new(PausedClock::new());
        let chain = MemoryChainBuilder::new()
            .with_identity_count(1)
            .with_seed(1)
            .with_genesis_timestamp(1_700_000_000)
            .with_clock(clock.clone())
            .build();

        chain.mine_block();
        assert_eq!(chain.timestamp(), 1_700_000_000);

        clock.advance(Duration::from_secs(86_400)).await;
        chain.mine_block();
        assert_eq!(chain.timestamp(), 1_700_000_000 + 86_400);
        assert_eq!(chain.height(), 2);
    }
}
