//! Option resolution.
//!
//! Turns command-line `(name, value)` pairs into a [`Config`]. Options are applied strictly
//! left to right, so later options override earlier ones for the same chain, with one
//! exception: once a chain is turned `off`, nothing re-enables it.
//!
//! A malformed value only affects its own option, which is ignored. Resolution never fails.
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::PathBuf;

use metier_common::chain::{Catalog, Chain};
use metier_common::engine::{BlockStorage, Settings};

use crate::options;

/// Value that turns a chain off.
pub const OFF: &str = "off";
/// Name of the default data directory, under the user's home.
pub const HOME_DIR: &str = ".metier-server";

/// Enabled chains, with their seed node address. An empty address means default seeds.
pub type Enabled = BTreeMap<Chain, String>;
/// Chains explicitly turned off.
pub type Disabled = BTreeSet<Chain>;

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chains to enable.
    pub enabled: Enabled,
    /// Chains turned off. Never overlaps with `enabled`.
    pub disabled: Disabled,
    /// First sync server port. Zero if there is no sync server.
    pub sync_port: u16,
    /// Public address of the sync server.
    pub public_addr: String,
    /// Data directory.
    pub home: PathBuf,
    /// Block persistence level.
    pub block_storage: BlockStorage,
    /// Whether usage was requested.
    pub help: bool,
}

impl Config {
    /// Whether a sync server was requested.
    pub fn sync_server(&self) -> bool {
        self.sync_port != 0
    }

    /// Engine settings for this configuration.
    pub fn settings(&self) -> Settings {
        Settings {
            home: self.home.clone(),
            block_storage: self.block_storage,
            disabled: self.disabled.clone(),
            sync_server: self.sync_server(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: Enabled::new(),
            disabled: Disabled::new(),
            sync_port: 0,
            public_addr: String::new(),
            home: default_home(),
            block_storage: BlockStorage::default(),
            help: false,
        }
    }
}

/// The default data directory.
pub fn default_home() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_default()).join(HOME_DIR)
}

/// Resolve a sequence of options, in the order they were supplied.
pub fn resolve<I, N, V>(catalog: &Catalog, pairs: I) -> Config
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut resolver = Resolver::new(catalog);

    for (name, value) in pairs {
        resolver.apply(name.as_ref(), value.as_ref());
    }
    resolver.finish()
}

/// Incremental option resolver.
#[derive(Debug)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    config: Config,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the given chain catalog, starting from the default config.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            config: Config::default(),
        }
    }

    /// The configuration resolved so far.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply a single option.
    pub fn apply(&mut self, name: &str, value: &str) {
        if self.config.help {
            return;
        }

        match name {
            options::HELP => {
                self.config.help = true;
            }
            options::ALL => {
                for chain in self.catalog.chains() {
                    if !self.config.disabled.contains(&chain) {
                        self.config.enabled.entry(chain).or_default();
                    }
                }
            }
            options::HOME => {
                if value.is_empty() {
                    log::warn!("Ignoring empty --{}", options::HOME);
                } else {
                    self.config.home = PathBuf::from(value);
                }
            }
            options::SYNC_SERVER => match value.parse::<u16>() {
                Ok(0) => {
                    self.config.sync_port = 0;
                }
                Ok(u16::MAX) => {
                    log::warn!(
                        "Ignoring --{}={}: two consecutive ports are required",
                        options::SYNC_SERVER,
                        value
                    );
                }
                Ok(port) => {
                    self.config.sync_port = port;
                    self.config.block_storage = self.config.block_storage.max(BlockStorage::All);
                }
                Err(err) => {
                    log::warn!("Ignoring --{}={}: {}", options::SYNC_SERVER, value, err);
                }
            },
            options::PUBLIC_ADDR => {
                self.config.public_addr = value.to_owned();
            }
            options::BLOCK_STORAGE => {
                match value.parse::<i64>().ok().and_then(BlockStorage::from_level) {
                    Some(level) => self.config.block_storage = level,
                    None => log::warn!("Ignoring --{}={}", options::BLOCK_STORAGE, value),
                }
            }
            _ => match self.catalog.lookup(name) {
                Some(chain) if value == OFF => {
                    self.config.enabled.remove(&chain);
                    self.config.disabled.insert(chain);
                }
                Some(chain) if self.config.disabled.contains(&chain) => {
                    log::debug!("Not enabling {}: chain was turned off", chain);
                }
                Some(chain) => {
                    self.config.enabled.insert(chain, value.to_owned());
                }
                None => {
                    log::trace!("Ignoring option --{}", name);
                }
            },
        }
    }

    /// Finish resolution and return the configuration.
    pub fn finish(mut self) -> Config {
        // Serving sync clients needs every block, whatever `--block_storage` said.
        if self.config.sync_server() {
            self.config.block_storage = BlockStorage::All;
        }
        self.config
    }
}
