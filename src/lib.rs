//! Metier is a launcher for a multi-chain blockchain sync node.
//!
//! The project is broken down into the following crates:
//!
//! * [`node`]: option resolution, engine bootstrap and status reporting
//! * [`common`]: the chain catalog and the engine interface
//!
//! The `metier-server` binary lives in the [`node`] crate.

#[cfg(feature = "metier-common")]
pub use metier_common as common;
#[cfg(feature = "metier-node")]
pub use metier_node as node;
