//! Index construction and sharded persistence: forward index, inverted
//! index, and the barrel store.

pub mod barrel;
pub mod forward;
pub mod inverted;

pub use barrel::{BarrelStore, barrel_of, bucket_of};
pub use forward::ForwardBatch;
