//! Per-property entity descriptors
//!
//! Each declared property becomes an [`EntityDescriptor`] bundling its
//! entity name, merge strategy, extractor (normalize direction) and
//! retriever (denormalize direction).

pub mod accessor;
pub mod descriptor;
pub mod extractor;
pub mod retriever;

pub use accessor::{accessor_for, Accessor};
pub use descriptor::{entities_for, EntityDescriptor};
pub use extractor::{extractor_for, Extract};
pub use retriever::{retriever_for, Retrieve};
