//! Chain state: the clonable value that snapshots capture wholesale.

use std::collections::HashMap;

use testbed_harness::Address;

/// Balance and confirmed-operation count for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountState {
    /// Spendable balance, in base units.
    pub balance: u64,
    /// Number of state-mutating operations this account has authorized.
    pub nonce: u64,
}

/// Full mutable chain state.
///
/// Snapshots clone this struct wholesale, which is what makes restoration
/// exact: a restored state is byte-for-byte the captured one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ChainState {
    /// Account states by address.
    pub accounts: HashMap<Address, AccountState>,
    /// Per-contract key/value storage.
    pub storage: HashMap<Address, HashMap<String, u64>>,
    /// Current block height.
    pub height: u64,
    /// Timestamp of the latest block, seconds.
    pub timestamp: u64,
    /// Counter for deriving fresh contract addresses.
    pub contracts_deployed: u64,
}
