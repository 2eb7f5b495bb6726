//! bandmark-store: attempt store backends.
//!
//! Implements the `AttemptStore` trait for the hosted REST data service and
//! provides an in-memory store for tests.

pub mod config;
pub mod memory;
pub mod rest;

pub use config::{create_store, load_config, BandmarkConfig, StoreConfig};
pub use memory::MemoryStore;
pub use rest::RestStore;
