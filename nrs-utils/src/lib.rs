//!
//! Utilities for NRS
//!
//! The main usage of this crate is turning messages back into the PML
//! that travels between components.
//!

#![deny(missing_docs)]

pub mod encoding;
pub use encoding::{encode, EncodingError};
