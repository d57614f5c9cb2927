//! Library of functionality shared by all metier crates: the chain catalog and the
//! interface to the sync engine.
#![warn(missing_docs)]
pub mod chain;
pub mod engine;

pub use chain::{Catalog, Chain, Height};
