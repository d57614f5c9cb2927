//! In-process engine host.
//!
//! Owns the data directory, the registry of enabled chains and the sockets of the public
//! sync listener, and serves statistics snapshots from the per-chain status that sync
//! workers publish through [`Node::update`].
use std::collections::BTreeMap;
use std::fs;
use std::net;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use metier_common::chain::Chain;
use metier_common::engine::{ChainStatus, Engine, Error, Settings, Stats, SyncEndpoints};

/// An enabled chain.
#[derive(Debug, Clone)]
struct Entry {
    seed: String,
    dir: PathBuf,
    status: ChainStatus,
}

#[derive(Debug)]
struct Inner {
    settings: Settings,
    chains: RwLock<BTreeMap<Chain, Entry>>,
    listeners: Mutex<Vec<net::TcpListener>>,
    shutdown: AtomicBool,
}

/// A node handle. Clones share the same node.
#[derive(Debug, Clone)]
pub struct Node {
    inner: Arc<Inner>,
}

impl Node {
    /// Initialize a node, creating its data directory.
    pub fn new(settings: Settings) -> Result<Self, Error> {
        fs::create_dir_all(&settings.home)?;

        log::info!("Initializing node in {:?}..", settings.home);
        log::debug!("{:?}", settings);

        Ok(Self {
            inner: Arc::new(Inner {
                settings,
                chains: RwLock::new(BTreeMap::new()),
                listeners: Mutex::new(Vec::new()),
                shutdown: AtomicBool::new(false),
            }),
        })
    }

    /// Data directory of a chain.
    pub fn chain_dir(&self, chain: Chain) -> PathBuf {
        chain_dir(&self.inner.settings.home, chain)
    }

    /// Enabled chains.
    pub fn chains(&self) -> Vec<Chain> {
        self.read().keys().copied().collect()
    }

    /// Seed node address of an enabled chain.
    pub fn seed(&self, chain: Chain) -> Option<String> {
        self.read().get(&chain).map(|e| e.seed.clone())
    }

    /// Local addresses of the sync listener, if running.
    pub fn listen_addrs(&self) -> Vec<net::SocketAddr> {
        self.listeners()
            .iter()
            .filter_map(|l| l.local_addr().ok())
            .collect()
    }

    /// Publish the sync status of a chain. Returns `false` if the chain is not enabled.
    pub fn update(&self, chain: Chain, status: ChainStatus) -> bool {
        let mut chains = self
            .inner
            .chains
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match chains.get_mut(&chain) {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Chain, Entry>> {
        self.inner
            .chains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<net::TcpListener>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Engine for Node {
    fn enable(&self, chain: Chain, seed: &str) -> Result<(), Error> {
        if self.is_shutdown() {
            return Err(Error::Shutdown);
        }
        if self.inner.settings.disabled.contains(&chain) {
            return Err(Error::Disabled(chain));
        }
        let dir = self.chain_dir(chain);
        fs::create_dir_all(&dir)?;

        let mut chains = self
            .inner
            .chains
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = chains.entry(chain).or_insert_with(|| Entry {
            seed: String::new(),
            dir,
            status: ChainStatus::default(),
        });
        entry.seed = seed.to_owned();

        log::debug!("{} enabled ({:?})", chain, entry.dir);

        Ok(())
    }

    fn start_sync_listener(&self, endpoints: &SyncEndpoints) -> Result<(), Error> {
        if self.is_shutdown() {
            return Err(Error::Shutdown);
        }
        let mut listeners = self.listeners();

        if !listeners.is_empty() {
            return Err(Error::ListenerRunning);
        }
        let first = net::TcpListener::bind((endpoints.local.host.as_str(), endpoints.local.port))?;
        let second = net::TcpListener::bind((
            endpoints.local_next.host.as_str(),
            endpoints.local_next.port,
        ))?;

        log::info!("Sync server listening on {}", first.local_addr()?);
        log::info!("Sync server listening on {}", second.local_addr()?);

        listeners.push(first);
        listeners.push(second);

        Ok(())
    }

    fn stats(&self) -> Stats {
        self.read()
            .iter()
            .map(|(chain, entry)| (*chain, entry.status))
            .collect()
    }

    fn shutdown(self) -> Result<(), Error> {
        if self.inner.shutdown.swap(true, Ordering::SeqCst) {
            return Err(Error::Shutdown);
        }
        let closed = self.listeners().drain(..).count();

        log::info!("Node shut down ({} listener(s) closed)", closed);

        Ok(())
    }
}

fn chain_dir(home: &Path, chain: Chain) -> PathBuf {
    home.join(chain.ticker().to_lowercase())
}
