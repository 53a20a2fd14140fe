pub mod bootstrap;
pub mod history;
pub mod offline;
pub mod qa;
pub mod server;

pub use qa::{QaAnswer, QaError, QaPipeline};
