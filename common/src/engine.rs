//! The sync engine, as seen from the launcher.
//!
//! Engines are driven through a cloneable handle. The launcher only ever enables chains,
//! opens the public sync listener and reads statistics; everything else is up to the engine.
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::net;
use std::path::PathBuf;

use thiserror::Error;

use crate::chain::{Chain, Height};

/// An error returned by the engine.
#[derive(Error, Debug)]
pub enum Error {
    /// The chain was disabled by the operator and cannot be enabled.
    #[error("{0} is disabled")]
    Disabled(Chain),
    /// The sync listener was already started.
    #[error("sync listener already running")]
    ListenerRunning,
    /// The engine was shut down.
    #[error("engine is shut down")]
    Shutdown,
    /// An I/O error occured.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Block persistence level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum BlockStorage {
    /// Don't save any blocks.
    None,
    /// Save blocks downloaded by the wallet.
    #[default]
    Wallet,
    /// Download and save all blocks. Required to serve sync clients.
    All,
}

impl BlockStorage {
    /// Get the storage level from its numeric form.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1 => Some(Self::Wallet),
            2 => Some(Self::All),
            _ => None,
        }
    }

    /// Numeric level.
    pub fn level(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Wallet => 1,
            Self::All => 2,
        }
    }
}

impl fmt::Display for BlockStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Wallet => write!(f, "wallet"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Engine settings, fixed at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Data directory.
    pub home: PathBuf,
    /// Block persistence level.
    pub block_storage: BlockStorage,
    /// Chains the operator turned off.
    pub disabled: BTreeSet<Chain>,
    /// Whether a public sync server will be started.
    pub sync_server: bool,
}

/// A TCP endpoint, eg. `tcp://0.0.0.0:8814`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Endpoint on the wildcard address.
    pub fn wildcard(port: u16) -> Self {
        Self {
            host: net::Ipv4Addr::UNSPECIFIED.to_string(),
            port,
        }
    }

    /// Create a new endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcp://{}:{}", self.host, self.port)
    }
}

/// The four endpoints of a sync listener: two local sockets, each paired with the address
/// clients use to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEndpoints {
    /// First local endpoint.
    pub local: Endpoint,
    /// Public address of the first local endpoint.
    pub public: Endpoint,
    /// Second local endpoint.
    pub local_next: Endpoint,
    /// Public address of the second local endpoint.
    pub public_next: Endpoint,
}

impl SyncEndpoints {
    /// Derive the endpoints for a listener starting at `port`, reachable at `public`.
    /// Returns `None` if `port + 1` is not a valid port.
    pub fn derive(port: u16, public: &str) -> Option<Self> {
        let next = port.checked_add(1)?;

        Some(Self {
            local: Endpoint::wildcard(port),
            public: Endpoint::new(public, port),
            local_next: Endpoint::wildcard(next),
            public_next: Endpoint::new(public, next),
        })
    }
}

/// Sync progress of a single chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ChainStatus {
    /// Number of verified peers.
    pub peers: usize,
    /// Best local header height.
    pub headers: Height,
    /// Best downloaded block height.
    pub blocks: Height,
    /// Best compact filter height.
    pub filters: Height,
    /// Best sync server height.
    pub sync: Height,
}

/// A snapshot of the engine's per-chain statistics.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    chains: HashMap<Chain, ChainStatus>,
}

impl Stats {
    /// Status of the given chain. Chains the engine knows nothing about are reported at zero.
    pub fn get(&self, chain: Chain) -> ChainStatus {
        self.chains.get(&chain).copied().unwrap_or_default()
    }

    /// Record the status of a chain.
    pub fn insert(&mut self, chain: Chain, status: ChainStatus) {
        self.chains.insert(chain, status);
    }

    /// Number of chains with a recorded status.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether no chain has a recorded status.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl FromIterator<(Chain, ChainStatus)> for Stats {
    fn from_iter<I: IntoIterator<Item = (Chain, ChainStatus)>>(iter: I) -> Self {
        Self {
            chains: iter.into_iter().collect(),
        }
    }
}

/// A handle for driving a running sync engine.
pub trait Engine: Sized + Send + Sync + Clone {
    /// Start synchronizing a chain. An empty `seed` means the engine's default seeds.
    fn enable(&self, chain: Chain, seed: &str) -> Result<(), Error>;
    /// Start the public sync listener.
    fn start_sync_listener(&self, endpoints: &SyncEndpoints) -> Result<(), Error>;
    /// Take a snapshot of per-chain statistics.
    fn stats(&self) -> Stats;
    /// Shutdown the engine.
    fn shutdown(self) -> Result<(), Error>;
}
