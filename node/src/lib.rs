//! Multi-chain sync node launcher.
//!
//! Resolves which chains to run from the command line, starts the sync engine, optionally
//! opens a public sync server, and periodically prints per-chain sync progress.
#![deny(missing_docs, unsafe_code)]
pub mod bootstrap;
pub mod error;
pub mod logger;
pub mod monitor;
pub mod node;
pub mod options;
pub mod resolver;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crossbeam_channel as chan;

use metier_common::chain::Catalog;
use metier_common::engine::{self, Engine, Settings};

pub use bootstrap::Launch;
pub use error::Error;
pub use node::Node;
pub use resolver::Config;

/// Run the node until a termination signal is received.
pub fn run(cfg: Config, catalog: &Catalog) -> Result<(), Error> {
    run_with(cfg, catalog, Node::new)
}

/// Run with the engine created by `init`, until a termination signal is received.
pub fn run_with<E, F>(cfg: Config, catalog: &Catalog, init: F) -> Result<(), Error>
where
    E: Engine + 'static,
    F: FnOnce(Settings) -> Result<E, engine::Error>,
{
    let running = match bootstrap::launch(&cfg, init)? {
        Launch::Help => {
            println!("{}", options::usage(catalog));
            return Ok(());
        }
        Launch::Running(running) => running,
    };

    let (signal, signals) = chan::bounded::<()>(1);
    ctrlc::set_handler(move || {
        signal.try_send(()).ok();
    })?;

    let monitor = Arc::new(monitor::Monitor::new(
        running.engine.clone(),
        running.chains.iter().copied(),
    ));
    let scheduler = monitor::Scheduler::spawn(monitor, monitor::INTERVAL, |report| {
        println!("{}", report);
    })?;

    log::info!("Running with {} chain(s) enabled", running.chains.len());

    signals.recv()?;

    log::info!("Shutting down..");

    if scheduler.shutdown().is_err() {
        log::error!("Monitor thread panicked");
    }
    running.engine.shutdown()?;

    Ok(())
}
