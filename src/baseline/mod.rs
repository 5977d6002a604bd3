//! Training-time reference distributions.

mod store;

pub use store::BaselineStore;
