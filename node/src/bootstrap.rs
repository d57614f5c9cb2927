//! Applies a resolved configuration to a sync engine.
use thiserror::Error;

use metier_common::chain::Chain;
use metier_common::engine::{self, Engine, Settings, SyncEndpoints};

use crate::options;
use crate::resolver::Config;

/// A bootstrap error.
#[derive(Error, Debug)]
pub enum Error {
    /// A sync server was requested without a public address.
    #[error("Mandatory argument --{} not specified", options::PUBLIC_ADDR)]
    MissingPublicAddr,
    /// The sync server port leaves no room for the second port.
    #[error("invalid --{} port {0}: two consecutive ports are required", options::SYNC_SERVER)]
    InvalidPort(u16),
    /// The engine failed.
    #[error(transparent)]
    Engine(#[from] engine::Error),
}

/// Outcome of a launch.
#[derive(Debug)]
pub enum Launch<E> {
    /// Usage was requested; the engine was not started.
    Help,
    /// The engine is running.
    Running(Running<E>),
}

/// A running engine, with the chains that were enabled at startup.
#[derive(Debug)]
pub struct Running<E> {
    /// Engine handle.
    pub engine: E,
    /// Enabled chains.
    pub chains: Vec<Chain>,
}

/// Start an engine using `init` and configure it.
///
/// Nothing is done when help was requested, and `init` is never called if the
/// configuration is unusable. Engine failures are returned as they are; there are no retries.
pub fn launch<E, F>(cfg: &Config, init: F) -> Result<Launch<E>, Error>
where
    E: Engine,
    F: FnOnce(Settings) -> Result<E, engine::Error>,
{
    if cfg.help {
        return Ok(Launch::Help);
    }
    let endpoints = if cfg.sync_server() {
        if cfg.public_addr.is_empty() {
            return Err(Error::MissingPublicAddr);
        }
        let endpoints = SyncEndpoints::derive(cfg.sync_port, &cfg.public_addr)
            .ok_or(Error::InvalidPort(cfg.sync_port))?;

        Some(endpoints)
    } else {
        None
    };

    log::info!("Initializing engine in {:?}..", cfg.home);
    log::info!("Block storage level is {}", cfg.block_storage);

    for chain in cfg.disabled.iter() {
        log::info!("{} is turned off", chain);
    }

    let engine = init(cfg.settings())?;

    for (chain, seed) in cfg.enabled.iter() {
        if seed.is_empty() {
            log::info!("Enabling {} with default seeds", chain);
        } else {
            log::info!("Enabling {} with seed node {}", chain, seed);
        }
        engine.enable(*chain, seed)?;
    }
    if cfg.enabled.is_empty() {
        log::warn!("No blockchains enabled");
    }

    if let Some(endpoints) = endpoints {
        log::info!(
            "Starting sync server on {} and {}, advertised as {} and {}",
            endpoints.local,
            endpoints.local_next,
            endpoints.public,
            endpoints.public_next
        );
        engine.start_sync_listener(&endpoints)?;
    }

    Ok(Launch::Running(Running {
        engine,
        chains: cfg.enabled.keys().copied().collect(),
    }))
}
