//!
//! Comms Routes.
//!
//! A comms route is one of a component's connections to the outside
//! world.  It hands the component whatever complete buffers of PML it has
//! received and writes the buffers the component wants to send.
//!

use crate::{error::TransportError, message::Message, route::PortId};

/// A hook a route can use to look at (and modify) every message decoded
/// from its bytes before the component's inbound chain sees it.
pub trait PreProcessor {
    /// Inspect or modify a freshly decoded message
    fn pre_process(&mut self, message: &mut Message);
}

/// A connection to another component.
pub trait CommsRoute: Send {
    /// The port this route is attached to
    fn port(&self) -> PortId;

    /// Write one encoded buffer to the far end
    fn send(&mut self, buffer: &[u8]) -> Result<(), TransportError>;

    /// Take every complete buffer received since the last poll.
    ///
    /// Each returned buffer holds zero or more whole PML elements.
    fn poll(&mut self) -> Vec<Vec<u8>>;

    /// The CID of the component on the far end, when it is known
    fn connected_cid(&self) -> Option<&str> {
        None
    }

    /// The route's message pre-processing hook, if it has one
    fn pre_processor(&mut self) -> Option<&mut dyn PreProcessor> {
        None
    }
}
