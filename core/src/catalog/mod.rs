// shoebox/src/catalog/mod.rs

//! Product records, the storage seam and the read/delete service.

pub mod memory;
pub mod model;
pub mod outcome;
pub mod service;
pub mod store;

pub use memory::MemoryProductStore;
pub use model::{NewProduct, Product, ProductArrays, ProductChanges, ProductRecord, ProductSkeleton, ScalarFields};
pub use outcome::{DeleteOutcome, Failure, ListOutcome, WriteOutcome};
pub use service::Catalog;
pub use store::{ProductStore, StoreFault};
