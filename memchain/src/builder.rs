//! Fluent builder for [`MemoryChain`].

use std::collections::HashMap;
use std::sync::Arc;

use testbed_harness::Identity;

use crate::chain::{derive_address, MemoryChain};
use crate::clock::{Clock, SystemClock};
use crate::state::{AccountState, ChainState};

/// Environment variable consulted for a replay seed.
pub const SEED_ENV: &str = "TESTBED_SEED";

const DEFAULT_IDENTITY_COUNT: usize = 10;
const DEFAULT_BALANCE: u64 = 1_000_000_000_000;
const DEFAULT_GENESIS_TIMESTAMP: u64 = 1_600_000_000;

/// Builder for [`MemoryChain`] instances.
///
/// # Example
///
/// ```rust,ignore
/// let chain = MemoryChainBuilder::new()
///     .with_identity_count(5)
///     .with_default_balance(1_000_000)
///     .with_seed(42)
///     .build();
/// ```
pub struct MemoryChainBuilder {
    identity_count: usize,
    default_balance: u64,
    seed: Option<u64>,
    clock: Option<Arc<dyn Clock>>,
    genesis_timestamp: u64,
}

impl MemoryChainBuilder {
    /// Builder with defaults: 10 identities, 1e12 base units each,
    /// seed from `TESTBED_SEED` or random, system clock.
    pub fn new() -> Self {
        Self {
            identity_count: DEFAULT_IDENTITY_COUNT,
            default_balance: DEFAULT_BALANCE,
            seed: None,
            clock: None,
            genesis_timestamp: DEFAULT_GENESIS_TIMESTAMP,
        }
    }

    /// Number of identities to derive. Zero is allowed, for exercising the
    /// harness's empty-pool failure path.
    pub fn with_identity_count(mut self, count: usize) -> Self {
        self.identity_count = count;
        self
    }

    /// Genesis balance of every derived identity.
    pub fn with_default_balance(mut self, balance: u64) -> Self {
        self.default_balance = balance;
        self
    }

    /// Fix the derivation seed, overriding `TESTBED_SEED`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Inject a clock for block timestamps. Defaults to [`SystemClock`].
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Timestamp of the genesis block, seconds.
    pub fn with_genesis_timestamp(mut self, timestamp: u64) -> Self {
        self.genesis_timestamp = timestamp;
        self
    }

    /// Build the chain. Identities derive deterministically from the seed,
    /// which is logged so a failed run can be replayed.
    pub fn build(self) -> MemoryChain {
        let seed = self.seed.unwrap_or_else(seed_from_env_or_random);
        log::info!("memchain seed: {seed:#018x} (replay with {SEED_ENV}={seed:#x})");

        let identities: Vec<Identity> = (0..self.identity_count)
            .map(|i| Identity::new(derive_address(seed, "identity", i as u64)))
            .collect();

        let mut accounts = HashMap::new();
        for identity in &identities {
            accounts.insert(
                identity.address(),
                AccountState {
                    balance: self.default_balance,
                    nonce: 0,
                },
            );
        }

        let genesis = ChainState {
            accounts,
            storage: HashMap::new(),
            height: 0,
            timestamp: self.genesis_timestamp,
            contracts_deployed: 0,
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        MemoryChain::new(identities, seed, clock, self.genesis_timestamp, genesis)
    }
}

impl Default for MemoryChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_from_env_or_random() -> u64 {
    match std::env::var(SEED_ENV) {
        Ok(raw) => parse_seed(&raw).unwrap_or_else(|| {
            log::warn!("ignoring unparseable {SEED_ENV}={raw}");
            rand::random()
        }),
        Err(_) => rand::random(),
    }
}

/// Accepts decimal or `0x`-prefixed hex.
fn parse_seed(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        raw.parse().ok()
    }
}
