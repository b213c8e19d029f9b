//! Normalize, denormalize and entity collection over descriptor lists

pub mod collect;
pub mod process;

pub use collect::entities_in;
pub use process::{denormalize, normalize, process};
