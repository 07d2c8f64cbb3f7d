//!
//! Terminal Stages.
//!
//! A sink ends a chain by handing the message to whoever owns the other
//! end of a crossbeam channel.  The component drains those channels on
//! every update, which keeps the dispatcher and the routes out of the
//! chains themselves.
//!

use crossbeam::channel::Sender;
use tracing::warn;

use nrs_core::{Message, MessageProcessor, PortId, SenderHandle};

/// An encoded message and the port it should be written to.
pub type Frame = (PortId, Vec<u8>);

/// Forwards every message into a channel.
pub struct ChannelSink {
    /// The sending end of the channel
    tx: Sender<Message>,
}

impl ChannelSink {
    /// Create a sink in front of a channel
    pub fn new(tx: Sender<Message>) -> Self {
        Self { tx }
    }
}

impl MessageProcessor for ChannelSink {
    fn deliver(&mut self, message: Message, _sender: Option<&SenderHandle>) {
        if let Err(err) = self.tx.send(message) {
            warn!(message_type = err.0.msg_type(), "channel closed, dropping message");
        }
    }
}

/// Encodes outbound messages as PML and queues them for their port.
///
/// The port is read from [`nrs_core::Aux::output_port`], which the
/// [`crate::OutboundRouteFixer`] fills in.
pub struct PortSink {
    /// Where encoded frames are queued
    frames: Sender<Frame>,
}

impl PortSink {
    /// Create a sink in front of a frame channel
    pub fn new(frames: Sender<Frame>) -> Self {
        Self { frames }
    }
}

impl MessageProcessor for PortSink {
    fn deliver(&mut self, message: Message, _sender: Option<&SenderHandle>) {
        let Some(port) = message.aux().output_port else {
            warn!(message_type = message.msg_type(), "message has no output port");
            return;
        };

        match nrs_utils::encode(&message) {
            Ok(pml) => {
                if self.frames.send((port, pml.into_bytes())).is_err() {
                    warn!(port = %port, "frame channel closed, dropping message");
                }
            }
            Err(err) => {
                warn!(message_type = message.msg_type(), port = %port, "cannot encode message: {err}");
            }
        }
    }
}
