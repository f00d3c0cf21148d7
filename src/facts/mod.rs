// ABOUTME: Facts exchanged between units and the stores that hold them.
// ABOUTME: Exports the catalog, value types, store backends and the resolution adapter.

mod adapter;
mod catalog;
mod file;
mod memory;
mod store;
mod value;

pub use adapter::{
    DeferredFact, FactError, PublishOutcome, publish, resolve_deferred, resolve_eager,
};
pub use catalog::Fact;
pub use file::FileFactStore;
pub use memory::MemoryFactStore;
pub use store::{FactRecord, FactStore, StoreError};
pub use value::{FactShape, FactValue};
