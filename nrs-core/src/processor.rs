//!
//! Message Processor Chains.
//!
//! Every stage of a component's inbound and outbound pipelines is a
//! [`MessageProcessor`].  A stage either handles a message completely,
//! modifies it and hands it to the stage it was wired to at startup, or
//! holds on to it and forwards it later.  Ownership of the message moves
//! with every `deliver` call.
//!

use crate::{message::Message, route::PortId};

/// Who handed a message to a stage.
///
/// A stage that receives `None` has no reply context and must still
/// process the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SenderHandle {
    /// The message was decoded from bytes received on a port
    Port(PortId),
    /// The message came from another named stage
    Stage(&'static str),
    /// The message was built by application code
    Application,
}

/// A stage in a message pipeline.
pub trait MessageProcessor: Send {
    /// Take ownership of a message
    fn deliver(&mut self, message: Message, sender: Option<&SenderHandle>);
}

impl MessageProcessor for Box<dyn MessageProcessor> {
    fn deliver(&mut self, message: Message, sender: Option<&SenderHandle>) {
        (**self).deliver(message, sender)
    }
}

