//!
//! NRS Pipelines
//!
//! The stages a component wires together between its routes and its
//! dispatcher.  Inbound, a decoded message passes the [`InboundRouteFixer`]
//! (and optionally an [`InterceptStage`]) before a [`ChannelSink`] hands it
//! to the dispatcher.  Outbound, the [`OutboundRouteFixer`] picks the port
//! a message leaves through and the [`PortSink`] encodes it for that port.
//!

#![deny(missing_docs)]

pub mod route_fixer;
pub use route_fixer::{InboundRouteFixer, OutboundRouteFixer};

pub mod sink;
pub use sink::{ChannelSink, Frame, PortSink};

pub mod intercept;
pub use intercept::{InterceptHandle, InterceptStage, InterceptState};
