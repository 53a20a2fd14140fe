pub mod flat;
pub mod persist;
pub mod writer;

pub use flat::{squared_l2, FlatL2Index};
pub use writer::StoreWriter;
