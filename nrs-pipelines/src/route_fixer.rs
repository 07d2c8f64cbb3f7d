//!
//! Route Fixers.
//!
//! Routes are consumed hop by hop.  Every component that forwards a
//! message removes the first token of its NRS `route` and writes the
//! message to the port that token names.  On the way in, a component
//! records the port a request arrived on at the front of its PML
//! `returnRoute`, so by the time a request reaches its target the return
//! route retraces its path back to the sender.
//!

use std::collections::HashSet;

use tracing::{debug, warn};

use nrs_core::{
    constants::{self, field, message_type, nrs_field},
    Direction, Message, MessageProcessor, PortId, Route, SenderHandle,
};

/// Records the port a message arrived on in its return route and peels
/// off messages that are only passing through.
pub struct InboundRouteFixer {
    /// Where messages addressed further along their route go
    transit: Box<dyn MessageProcessor>,
    /// Where messages for this component go
    next: Box<dyn MessageProcessor>,
}

impl InboundRouteFixer {
    /// The name the fixer hands messages on under
    pub const STAGE_NAME: &'static str = "inbound-route-fixer";

    /// Create an inbound fixer
    pub fn new(transit: Box<dyn MessageProcessor>, next: Box<dyn MessageProcessor>) -> Self {
        Self { transit, next }
    }
}

fn requests_reply(message: &Message) -> bool {
    message.has_field(field::RETURN_ROUTE)
        || message.has_field(field::MSG_ID)
        || message.has_field(field::RETURN_TO_VNID)
}

impl MessageProcessor for InboundRouteFixer {
    fn deliver(&mut self, mut message: Message, sender: Option<&SenderHandle>) {
        // The port this hop arrived on wins over one recorded earlier.
        let port = match sender {
            Some(SenderHandle::Port(port)) => Some(*port),
            _ => message.aux().received_port,
        };

        message.aux_mut().direction = Direction::Inbound;
        if let Some(port) = port {
            message.aux_mut().received_port = Some(port);
            if requests_reply(&message) {
                let mut return_route = String::from(port.token());
                return_route.push_str(message.field(field::RETURN_ROUTE).unwrap_or_default());
                message.set_field(field::RETURN_ROUTE, return_route);
            }
        }

        let handle = SenderHandle::Stage(Self::STAGE_NAME);
        if message
            .nrs_field(nrs_field::ROUTE)
            .is_some_and(|route| !route.is_empty())
        {
            debug!(message_type = message.msg_type(), "forwarding message in transit");
            self.transit.deliver(message, Some(&handle));
        } else {
            self.next.deliver(message, Some(&handle));
        }
    }
}

/// Selects the port an outbound message leaves through.
pub struct OutboundRouteFixer {
    /// The ports that have a route attached
    ports: HashSet<PortId>,
    /// Where intelligently routed messages without a route are sent
    intelligent_port: Option<PortId>,
    /// Where messages that have arrived are handed back to this component
    loopback: Box<dyn MessageProcessor>,
    /// Where routed messages go
    next: Box<dyn MessageProcessor>,
}

impl OutboundRouteFixer {
    /// The name the fixer hands messages on under
    pub const STAGE_NAME: &'static str = "outbound-route-fixer";

    /// Create an outbound fixer with no ports
    pub fn new(loopback: Box<dyn MessageProcessor>, next: Box<dyn MessageProcessor>) -> Self {
        Self {
            ports: HashSet::new(),
            intelligent_port: None,
            loopback,
            next,
        }
    }

    /// Builder-style [`OutboundRouteFixer::set_intelligent_port`]
    pub fn with_intelligent_port(mut self, port: Option<PortId>) -> Self {
        self.intelligent_port = port;
        self
    }

    /// Set the port intelligently routed messages are sent to
    pub fn set_intelligent_port(&mut self, port: Option<PortId>) {
        self.intelligent_port = port;
    }

    /// Allow messages to leave through a port
    pub fn add_port(&mut self, port: PortId) {
        self.ports.insert(port);
    }

    /// Stop routing messages through a port
    pub fn remove_port(&mut self, port: PortId) -> bool {
        self.ports.remove(&port)
    }

    /// The ports messages may leave through
    pub fn ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.ports.iter().copied()
    }
}

impl MessageProcessor for OutboundRouteFixer {
    fn deliver(&mut self, mut message: Message, _sender: Option<&SenderHandle>) {
        let handle = SenderHandle::Stage(Self::STAGE_NAME);

        let raw = message.nrs_field(nrs_field::ROUTE).unwrap_or_default();
        let mut route = match Route::parse(raw) {
            Ok(route) => route,
            Err(err) => {
                warn!(message_type = message.msg_type(), route = raw, "dropping message: {err}");
                return;
            }
        };

        let port = match route.pop_front() {
            Some(port) => port,
            None => {
                let intelligent =
                    message.nrs_field(nrs_field::INTELLIGENT) == Some(constants::TRUE);
                match self.intelligent_port {
                    Some(port) if intelligent => port,
                    _ => {
                        message.aux_mut().direction = Direction::Inbound;
                        message.aux_mut().output_port = None;
                        self.loopback.deliver(message, Some(&handle));
                        return;
                    }
                }
            }
        };

        if !self.ports.contains(&port) {
            warn!(message_type = message.msg_type(), port = %port, "no route on port, dropping message");
            return;
        }

        message.set_nrs_field(nrs_field::ROUTE, route.to_string());
        if message.msg_type() == message_type::QUERY_ROUTE {
            let mut forward_route = message.field(field::FORWARD_ROUTE).unwrap_or_default().to_string();
            forward_route.push(port.token());
            message.set_field(field::FORWARD_ROUTE, forward_route);
        }

        message.aux_mut().direction = Direction::Outbound;
        message.aux_mut().output_port = Some(port);
        self.next.deliver(message, Some(&handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crossbeam::channel::{unbounded, Receiver};

    use crate::ChannelSink;

    fn sink() -> (Box<dyn MessageProcessor>, Receiver<Message>) {
        let (tx, rx) = unbounded();
        (Box::new(ChannelSink::new(tx)), rx)
    }

    fn port(number: u32) -> PortId {
        PortId::new(number).unwrap()
    }

    #[test]
    fn test_inbound_prepends_arrival_port() {
        let (transit, transit_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = InboundRouteFixer::new(transit, next);

        let request = Message::new("QueryCID")
            .with_field("returnRoute", "42")
            .with_field("msgID", "m")
            .with_nrs_field("route", "");
        fixer.deliver(request, Some(&SenderHandle::Port(port(11))));

        let delivered = next_rx.try_recv().unwrap();
        assert_eq!(delivered.field("returnRoute"), Some("B42"));
        assert_eq!(delivered.aux().received_port, Some(port(11)));
        assert_eq!(delivered.aux().direction, Direction::Inbound);
        assert!(transit_rx.try_recv().is_err());
    }

    #[test]
    fn test_inbound_starts_return_route_for_requests() {
        let (transit, _transit_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = InboundRouteFixer::new(transit, next);

        let mut request = Message::new("QueryVNID").with_field("returnToVNID", "3");
        request.aux_mut().received_port = Some(port(2));
        fixer.deliver(request, None);

        let plain = Message::new("Float").with_field("value", "1");
        fixer.deliver(plain, Some(&SenderHandle::Port(port(2))));

        assert_eq!(next_rx.try_recv().unwrap().field("returnRoute"), Some("2"));
        assert_eq!(next_rx.try_recv().unwrap().field("returnRoute"), None);
    }

    #[test]
    fn test_inbound_without_port_leaves_return_route() {
        let (transit, _transit_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = InboundRouteFixer::new(transit, next);

        fixer.deliver(
            Message::new("QueryCID").with_field("returnRoute", "7"),
            Some(&SenderHandle::Application),
        );
        assert_eq!(next_rx.try_recv().unwrap().field("returnRoute"), Some("7"));
    }

    #[test]
    fn test_inbound_forwards_transit() {
        let (transit, transit_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = InboundRouteFixer::new(transit, next);

        let message = Message::new("Float")
            .with_nrs_field("route", "34")
            .with_field("returnRoute", "");
        fixer.deliver(message, Some(&SenderHandle::Port(port(1))));

        let forwarded = transit_rx.try_recv().unwrap();
        assert_eq!(forwarded.nrs_field("route"), Some("34"));
        assert_eq!(forwarded.field("returnRoute"), Some("1"));
        assert!(next_rx.try_recv().is_err());
    }

    #[test]
    fn test_outbound_pops_first_hop() {
        let (loopback, loopback_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = OutboundRouteFixer::new(loopback, next);
        fixer.add_port(port(3));

        fixer.deliver(Message::new("Float").with_nrs_field("route", "3A"), None);

        let routed = next_rx.try_recv().unwrap();
        assert_eq!(routed.nrs_field("route"), Some("A"));
        assert_eq!(routed.aux().output_port, Some(port(3)));
        assert_eq!(routed.aux().direction, Direction::Outbound);
        assert!(loopback_rx.try_recv().is_err());
    }

    #[test]
    fn test_outbound_query_route_records_forward_route() {
        let (loopback, _loopback_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = OutboundRouteFixer::new(loopback, next);
        fixer.add_port(port(5));

        let query = Message::new("QueryRoute")
            .with_nrs_field("route", "5")
            .with_field("forwardRoute", "21");
        fixer.deliver(query, None);

        let routed = next_rx.try_recv().unwrap();
        assert_eq!(routed.field("forwardRoute"), Some("215"));
        assert_eq!(routed.nrs_field("route"), Some(""));
    }

    #[test]
    fn test_outbound_empty_route_loops_back() {
        let (loopback, loopback_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = OutboundRouteFixer::new(loopback, next);
        fixer.add_port(port(1));

        fixer.deliver(Message::new("ReplyCID").with_nrs_field("route", ""), None);
        fixer.deliver(Message::new("ReplyCID"), None);
        fixer.deliver(
            Message::new("ReplyVNID")
                .with_nrs_field("route", "")
                .with_nrs_field("intelligent", "true"),
            None,
        );

        assert_eq!(loopback_rx.try_iter().count(), 3);
        assert!(next_rx.try_recv().is_err());
    }

    #[test]
    fn test_outbound_intelligent_port() {
        let (loopback, loopback_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = OutboundRouteFixer::new(loopback, next).with_intelligent_port(Some(port(9)));
        fixer.add_port(port(9));

        fixer.deliver(
            Message::new("ReplyVNID")
                .with_nrs_field("route", "")
                .with_nrs_field("intelligent", "true"),
            None,
        );
        fixer.deliver(Message::new("ReplyVNID").with_nrs_field("route", ""), None);

        assert_eq!(next_rx.try_recv().unwrap().aux().output_port, Some(port(9)));
        assert_eq!(loopback_rx.try_iter().count(), 1);
    }

    #[test]
    fn test_outbound_drops_unknown_and_invalid_routes() {
        let (loopback, loopback_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = OutboundRouteFixer::new(loopback, next);
        fixer.add_port(port(1));

        fixer.deliver(Message::new("Float").with_nrs_field("route", "2"), None);
        fixer.deliver(Message::new("Float").with_nrs_field("route", "1!"), None);
        assert!(fixer.remove_port(port(1)));
        fixer.deliver(Message::new("Float").with_nrs_field("route", "1"), None);

        assert!(next_rx.try_recv().is_err());
        assert!(loopback_rx.try_recv().is_err());
    }

    #[test]
    fn test_route_retraces_random_paths() {
        for _ in 0..16 {
            let hops: Vec<PortId> = (0..1 + rand::random::<usize>() % 6)
                .map(|_| port(rand::random::<u32>() % 64))
                .collect();

            // Each hop records its arrival port in the return route.
            let mut request = Message::new("QueryCID").with_field("msgID", "m");
            for hop in hops.iter() {
                let (transit, _transit_rx) = sink();
                let (next, next_rx) = sink();
                let mut fixer = InboundRouteFixer::new(transit, next);
                fixer.deliver(request, Some(&SenderHandle::Port(*hop)));
                request = next_rx.try_recv().unwrap();
            }

            let return_route = Route::parse(request.field("returnRoute").unwrap()).unwrap();
            let expected: Vec<PortId> = hops.iter().rev().copied().collect();
            assert_eq!(return_route.iter().collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn test_arrival_port_replaces_an_earlier_one() {
        let (transit, _transit_rx) = sink();
        let (next, next_rx) = sink();
        let mut fixer = InboundRouteFixer::new(transit, next);

        let mut request = Message::new("QueryCID").with_field("msgID", "m");
        request.aux_mut().received_port = Some(port(60));
        fixer.deliver(request, Some(&SenderHandle::Port(port(7))));
        let request = next_rx.try_recv().unwrap();
        assert_eq!(request.aux().received_port, Some(port(7)));
        assert_eq!(request.field("returnRoute"), Some(port(7).token().to_string().as_str()));

        // Without a port handle the recorded port is used.
        fixer.deliver(request, None);
        let request = next_rx.try_recv().unwrap();
        let return_route = Route::parse(request.field("returnRoute").unwrap()).unwrap();
        assert_eq!(return_route.iter().collect::<Vec<_>>(), [port(7), port(7)]);
    }
}
