//! Node error module.
use std::io;

use crossbeam_channel as chan;
use thiserror::Error;

use metier_common::engine;

use crate::bootstrap;

/// A node error.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration could not be applied.
    #[error(transparent)]
    Bootstrap(#[from] bootstrap::Error),
    /// An error coming from the engine.
    #[error(transparent)]
    Engine(#[from] engine::Error),
    /// The signal handler could not be installed.
    #[error("error setting signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
    /// An I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A communication channel error.
    #[error("signal channel disconnected")]
    Channel,
}

impl From<chan::RecvError> for Error {
    fn from(_: chan::RecvError) -> Self {
        Self::Channel
    }
}
