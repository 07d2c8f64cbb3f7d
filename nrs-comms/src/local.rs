//!
//! Local Routes
//!
//! Local routes connect two components living in the same process with a
//! pair of crossbeam channels, one for each direction.
//!

use crossbeam::channel::{self, Receiver, Sender};

use nrs_core::{CommsRoute, PortId, PreProcessor, TransportError};

use crate::BoxedPreProcessor;

/// One end of an in-process connection
pub struct LocalRoute {
    /// The port of the owning component this end is attached to
    port: PortId,
    /// Buffers written to the far end
    tx: Sender<Vec<u8>>,
    /// Buffers written by the far end
    rx: Receiver<Vec<u8>>,
    /// The CID of the component at the far end
    connected_cid: Option<String>,
    /// Inspects messages decoded from this route
    pre_processor: Option<BoxedPreProcessor>,
}

impl LocalRoute {
    /// Create both ends of a connection.  The first end is attached to
    /// `port_a` of its component and the second to `port_b` of its own.
    pub fn pair(port_a: PortId, port_b: PortId) -> (Self, Self) {
        let (a_tx, b_rx) = channel::unbounded();
        let (b_tx, a_rx) = channel::unbounded();

        (
            Self {
                port: port_a,
                tx: a_tx,
                rx: a_rx,
                connected_cid: None,
                pre_processor: None,
            },
            Self {
                port: port_b,
                tx: b_tx,
                rx: b_rx,
                connected_cid: None,
                pre_processor: None,
            },
        )
    }

    /// Record the CID of the component at the far end
    pub fn with_cid(mut self, cid: impl Into<String>) -> Self {
        self.connected_cid = Some(cid.into());
        self
    }

    /// Inspect every message decoded from this route
    pub fn with_pre_processor(mut self, pre_processor: BoxedPreProcessor) -> Self {
        self.pre_processor = Some(pre_processor);
        self
    }
}

impl CommsRoute for LocalRoute {
    fn port(&self) -> PortId {
        self.port
    }

    fn send(&mut self, buffer: &[u8]) -> Result<(), TransportError> {
        self.tx
            .send(buffer.to_vec())
            .map_err(|_| TransportError::Disconnected(self.port))
    }

    fn poll(&mut self) -> Vec<Vec<u8>> {
        self.rx.try_iter().collect()
    }

    fn connected_cid(&self) -> Option<&str> {
        self.connected_cid.as_deref()
    }

    fn pre_processor(&mut self) -> Option<&mut dyn PreProcessor> {
        self.pre_processor
            .as_deref_mut()
            .map(|pre_processor| pre_processor as &mut dyn PreProcessor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nrs_core::Message;
    use rand::random;

    fn port(number: u32) -> PortId {
        PortId::new(number).unwrap()
    }

    #[test]
    fn test_pair_carries_buffers_both_ways() {
        let (mut a, mut b) = LocalRoute::pair(port(1), port(2));
        assert_eq!(a.port(), port(1));
        assert_eq!(b.port(), port(2));

        let buffers: Vec<Vec<u8>> = (0..10)
            .map(|_| random::<[u8; 16]>().to_vec())
            .collect();
        for buffer in buffers.iter() {
            a.send(buffer).unwrap();
        }
        b.send(b"<QueryCID/>").unwrap();

        assert_eq!(b.poll(), buffers);
        assert_eq!(a.poll(), vec![b"<QueryCID/>".to_vec()]);
        assert!(a.poll().is_empty());
    }

    #[test]
    fn test_send_to_dropped_end_is_disconnected() {
        let (mut a, b) = LocalRoute::pair(port(1), port(2));
        drop(b);

        match a.send(b"<Reset/>") {
            Err(TransportError::Disconnected(p)) => assert_eq!(p, port(1)),
            other => panic!("expected a disconnect, got {other:?}"),
        }
    }

    #[test]
    fn test_cid_and_pre_processor() {
        struct Tag;

        impl PreProcessor for Tag {
            fn pre_process(&mut self, message: &mut Message) {
                message.set_nrs_field("hopCount", "1");
            }
        }

        let (a, _b) = LocalRoute::pair(port(1), port(2));
        let mut a = a.with_cid("plotter").with_pre_processor(Box::new(Tag));
        assert_eq!(a.connected_cid(), Some("plotter"));

        let mut message = Message::new("Float");
        a.pre_processor().unwrap().pre_process(&mut message);
        assert_eq!(message.nrs_field("hopCount"), Some("1"));
    }
}
