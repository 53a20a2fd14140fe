#![deny(unused_variables)]

pub mod config;
pub mod data_processor;
pub mod error;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use store::ChunkStore;
