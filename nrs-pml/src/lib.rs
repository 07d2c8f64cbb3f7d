//!
//! NRS PML Decoder
//!
//! Turns buffers of PML received on a comms route into [`Message`]s and
//! hands each one to the component's inbound chain.  One top-level element
//! becomes one message; its attributes become PML or NRS fields depending
//! on their namespace.
//!
//! [`Message`]: nrs_core::Message
//!

#![deny(missing_docs)]

pub mod error;
pub use error::DecodeError;

pub mod registry;
pub use registry::ElementRegistry;

pub mod policy;
pub use policy::{DecoderPolicy, ElementPolicy, NamespacePolicy};

mod csl;
mod event_processor;

pub mod parser;
pub use parser::{DecodeReport, PmlParser};
