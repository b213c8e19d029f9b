//! Key declarations
//!
//! A schema property is declared with a [`Declaration`], a small closed
//! grammar of keys, arrays, aliases and mergers. Each declaration is
//! resolved once, at schema construction, into a [`KeyDescriptor`].

pub mod declaration;
pub mod resolve;

pub use declaration::Declaration;
pub use resolve::{resolve, Key, KeyDescriptor};
