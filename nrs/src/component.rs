//!
//! The Process Component.
//!
//! One [`ProcessComponent`] is everything a process needs to take part
//! in an NRS network.  It is wired together once, at construction:
//!
//! ```text
//! route -> PmlParser -> InboundRouteFixer -> [InterceptStage] -> dispatch queue
//!                               |
//!                               +-- in transit --> outbound queue
//! dispatch queue -> Dispatcher -> outbound queue
//! outbound queue -> OutboundRouteFixer -> PortSink -> frame queue -> route
//!                               |
//!                               +-- arrived --> dispatch queue
//! ```
//!
//! The queues are crossbeam channels the component drains on every
//! update, so no stage ever needs a reference to the component itself.
//!

use std::collections::BTreeMap;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, info, warn};

use nrs_comms::TcpRoute;
use nrs_core::{CommsRoute, Component, Message, MessageProcessor, PortId, SenderHandle};
use nrs_pml::{DecodeReport, ElementRegistry, PmlParser};
use nrs_pipelines::{
    ChannelSink, Frame, InboundRouteFixer, InterceptHandle, InterceptStage, OutboundRouteFixer,
    PortSink,
};
use nrs_variables::{Dispatcher, NodeType};

use crate::{
    config::{ComponentConfig, RouteKind},
    error::ComponentError,
};

/// The most times the dispatch and outbound queues are drained in one
/// update.  Whatever is left waits for the next update.
const MAX_ROUNDS: usize = 64;

/// The name the component hands queued outbound messages on under
const STAGE_NAME: &str = "process";

/// A component: its routes, its pipelines and its dispatcher.
pub struct ProcessComponent {
    /// The delay between updates (in us)
    update_delay_us: u128,
    /// Decodes buffers into the inbound chain
    parser: PmlParser,
    /// Delivers messages to nodes and variables
    dispatcher: Dispatcher,
    /// Messages waiting for the dispatcher
    dispatch_rx: Receiver<Message>,
    /// Chooses the port outbound messages leave through
    outbound: OutboundRouteFixer,
    /// Hands messages to the outbound chain
    outbound_tx: Sender<Message>,
    /// Messages waiting for the outbound chain
    outbound_rx: Receiver<Message>,
    /// Encoded messages waiting for their route
    frames_rx: Receiver<Frame>,
    /// The component's routes by port
    routes: BTreeMap<PortId, Box<dyn CommsRoute>>,
    /// Controls the interception stage, if there is one
    intercept: Option<InterceptHandle>,
}

impl ProcessComponent {
    /// Build a component and open the routes its configuration lists
    pub fn new(config: &ComponentConfig) -> Result<Self, ComponentError> {
        let mut component = Self::without_routes(config)?;

        for route_config in config.routes.iter() {
            let port = PortId::new(route_config.port)?;
            let route = match route_config.kind {
                RouteKind::Tcp => {
                    let mut route = TcpRoute::bind(port, route_config.bind)?;
                    if let Some(peer) = route_config.peer {
                        route.set_peer(peer);
                    }
                    if let Some(cid) = route_config.cid.as_ref() {
                        route = route.with_cid(cid.as_str());
                    }
                    route
                }
            };
            info!(port = %port, bind = %route_config.bind, "opened route");
            component.add_route(Box::new(route));
        }

        Ok(component)
    }

    /// Build a component without opening any of the configured routes.
    /// Routes are attached with [`ProcessComponent::add_route`].
    pub fn without_routes(config: &ComponentConfig) -> Result<Self, ComponentError> {
        config.validate()?;

        let (dispatch_tx, dispatch_rx) = channel::unbounded();
        let (outbound_tx, outbound_rx) = channel::unbounded();
        let (frames_tx, frames_rx) = channel::unbounded();

        let to_dispatcher: Box<dyn MessageProcessor> =
            Box::new(ChannelSink::new(dispatch_tx.clone()));
        let (to_dispatcher, intercept) = if config.intercept {
            let stage = InterceptStage::new(to_dispatcher);
            let handle = stage.handle();
            (Box::new(stage) as Box<dyn MessageProcessor>, Some(handle))
        } else {
            (to_dispatcher, None)
        };
        let inbound = InboundRouteFixer::new(
            Box::new(ChannelSink::new(outbound_tx.clone())),
            to_dispatcher,
        );

        let dispatcher = Dispatcher::new(
            config.component_info(),
            Box::new(ChannelSink::new(outbound_tx.clone())),
        )?
        .with_type_mismatch(config.strictness.type_mismatch);

        let mut registry = ElementRegistry::new();
        for kind in dispatcher.factory().variable_kinds() {
            registry.register(kind.type_name());
        }
        let parser = PmlParser::with_policy(
            registry,
            config.strictness.decoder_policy(),
            Box::new(inbound),
        );

        let intelligent_port = config.intelligent_port.map(PortId::new).transpose()?;
        let outbound = OutboundRouteFixer::new(
            Box::new(ChannelSink::new(dispatch_tx)),
            Box::new(PortSink::new(frames_tx)),
        )
        .with_intelligent_port(intelligent_port);

        Ok(Self {
            update_delay_us: config.update_delay_us as u128,
            parser,
            dispatcher,
            dispatch_rx,
            outbound,
            outbound_tx,
            outbound_rx,
            frames_rx,
            routes: BTreeMap::new(),
            intercept,
        })
    }

    /// Hand replies, errors and acknowledgements addressed to this
    /// component to `application`
    pub fn with_application(mut self, application: Box<dyn MessageProcessor>) -> Self {
        self.dispatcher = self.dispatcher.with_application(application);
        self
    }

    /// Attach a route, replacing any route already on its port
    pub fn add_route(&mut self, route: Box<dyn CommsRoute>) {
        let port = route.port();
        self.dispatcher
            .set_port(port, route.connected_cid().map(str::to_string));
        self.outbound.add_port(port);
        if self.routes.insert(port, route).is_some() {
            warn!(port = %port, "replaced route");
        }
    }

    /// Detach the route on a port
    pub fn remove_route(&mut self, port: PortId) -> Option<Box<dyn CommsRoute>> {
        self.dispatcher.remove_port(port);
        self.outbound.remove_port(port);
        self.routes.remove(&port)
    }

    /// Send intelligently routed messages without a route through `port`
    pub fn set_intelligent_port(&mut self, port: Option<PortId>) {
        self.outbound.set_intelligent_port(port);
    }

    /// Teach the component a node layout `CreateNode` can build.
    ///
    /// Only the layout's variable kinds are message types; the node type
    /// itself is never decoded as one.
    pub fn register_node_type(&mut self, node_type: NodeType) {
        for (_, kind) in &node_type.variables {
            self.parser.registry_mut().register(kind.type_name());
        }
        self.dispatcher.factory_mut().register_node_type(node_type);
    }

    /// The dispatcher, for inspecting nodes, variables and links
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Mutable access to the dispatcher
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// The parser, for inspecting the recognised message types
    pub fn parser(&self) -> &PmlParser {
        &self.parser
    }

    /// Controls the interception stage, if the component has one
    pub fn intercept(&self) -> Option<InterceptHandle> {
        self.intercept.clone()
    }

    /// A sender application code can hand outbound messages to.  They
    /// are routed on the next update.
    pub fn sender(&self) -> Sender<Message> {
        self.outbound_tx.clone()
    }

    /// Queue a message built by application code for routing
    pub fn send(&mut self, message: Message) {
        self.outbound
            .deliver(message, Some(&SenderHandle::Application));
    }

    /// Decode a buffer as if it had arrived on `port`, then run every
    /// resulting message to completion.
    pub fn message_event(&mut self, buffer: &[u8], port: Option<PortId>) -> DecodeReport {
        let pre_processor = port
            .and_then(|port| self.routes.get_mut(&port))
            .and_then(|route| route.pre_processor());
        let report = self.parser.message_event(buffer, port, pre_processor);
        self.pump();
        report
    }

    /// Drain the dispatch and outbound queues and write every encoded
    /// message to its route.  Returns the number of messages dispatched.
    pub fn pump(&mut self) -> usize {
        let handle = SenderHandle::Stage(STAGE_NAME);
        let mut dispatched = 0;

        for _ in 0..MAX_ROUNDS {
            let mut progressed = false;
            while let Ok(message) = self.dispatch_rx.try_recv() {
                self.dispatcher.dispatch(message);
                dispatched += 1;
                progressed = true;
            }
            while let Ok(message) = self.outbound_rx.try_recv() {
                self.outbound.deliver(message, Some(&handle));
                progressed = true;
            }
            if !progressed {
                break;
            }
        }

        if !self.dispatch_rx.is_empty() || !self.outbound_rx.is_empty() {
            debug!(
                dispatch = self.dispatch_rx.len(),
                outbound = self.outbound_rx.len(),
                "messages left for the next update"
            );
        }

        self.flush_frames();
        dispatched
    }

    fn flush_frames(&mut self) {
        while let Ok((port, frame)) = self.frames_rx.try_recv() {
            match self.routes.get_mut(&port) {
                Some(route) => {
                    if let Err(err) = route.send(&frame) {
                        warn!(port = %port, "send failed: {err}");
                    }
                }
                None => warn!(port = %port, "no route on port, dropping frame"),
            }
        }
    }
}

impl Component for ProcessComponent {
    fn get_update_delay_us(&self) -> u128 {
        self.update_delay_us
    }

    fn start(&mut self) {
        info!(
            cid = self.dispatcher.info().cid.as_str(),
            routes = self.routes.len(),
            "component started"
        );
    }

    fn update(&mut self) {
        for (port, route) in self.routes.iter_mut() {
            for buffer in route.poll() {
                self.parser
                    .message_event(&buffer, Some(*port), route.pre_processor());
            }
        }
        self.pump();
    }

    fn shutdown(&mut self) {
        self.pump();
        info!(cid = self.dispatcher.info().cid.as_str(), "component stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nrs_comms::LocalRoute;
    use nrs_core::{Value, VariableKind};

    fn config() -> ComponentConfig {
        ComponentConfig {
            cid: "arm".into(),
            ..Default::default()
        }
    }

    fn port(number: u32) -> PortId {
        PortId::new(number).unwrap()
    }

    fn decode_all(buffers: Vec<Vec<u8>>) -> Vec<Message> {
        let (sink_tx, sink_rx) = channel::unbounded();
        let mut registry = ElementRegistry::new();
        for kind in VariableKind::ALL {
            registry.register(kind.type_name());
        }
        let mut parser = PmlParser::new(registry, Box::new(ChannelSink::new(sink_tx)));
        for buffer in buffers {
            parser.message_event(&buffer, None, None);
        }
        sink_rx.try_iter().collect()
    }

    #[test]
    fn test_create_and_set_through_pml() {
        let mut component = ProcessComponent::without_routes(&config()).unwrap();

        let report = component.message_event(
            br#"<CreateNode xmlns="http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/pml/1.0/"
                 xmlns:nrsa="http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/attributes/1.0/"
                 nrsa:route="" nrsa:toVNID="1" vnType="Float" vnName="elbow" vnid="12"/>
               <Float xmlns="http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/pml/1.0/"
                 xmlns:nrsa="http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/attributes/1.0/"
                 nrsa:toVNID="12" value="0.25"/>"#,
            None,
        );
        assert_eq!(report.delivered, 2);

        let elbow = component.dispatcher().manager().get(12).unwrap();
        assert_eq!(elbow.kind(), VariableKind::Float);
        assert_eq!(elbow.value(), Value::Float(0.25));
    }

    #[test]
    fn test_query_is_answered_on_arrival_port() {
        let mut component = ProcessComponent::without_routes(&config()).unwrap();
        let (route, mut peer) = LocalRoute::pair(port(3), port(1));
        component.add_route(Box::new(route));

        let mut query = Message::new("QueryCID")
            .with_nrs_field("route", "")
            .with_nrs_field("toVNID", "1")
            .with_field("msgID", "q1")
            .with_field("returnToVNID", "9");
        query.set_field("returnRoute", "");
        peer.send(nrs_utils::encode(&query).unwrap().as_bytes()).unwrap();

        component.update();

        let replies = decode_all(peer.poll());
        assert_eq!(replies.len(), 1);
        let reply = &replies[0];
        assert_eq!(reply.msg_type(), "ReplyCID");
        assert_eq!(reply.field("cid"), Some("arm"));
        assert_eq!(reply.field("replyMsgID"), Some("q1"));
        assert_eq!(reply.nrs_field("toVNID"), Some("9"));
        assert_eq!(reply.nrs_field("route"), Some(""));
    }

    #[test]
    fn test_transit_messages_are_forwarded() {
        let mut component = ProcessComponent::without_routes(&config()).unwrap();
        let (a, mut a_peer) = LocalRoute::pair(port(1), port(1));
        let (b, mut b_peer) = LocalRoute::pair(port(2), port(1));
        component.add_route(Box::new(a));
        component.add_route(Box::new(b));

        let message = Message::new("Float")
            .with_nrs_field("route", "2")
            .with_nrs_field("toVNID", "40")
            .with_field("value", "3");
        a_peer
            .send(nrs_utils::encode(&message).unwrap().as_bytes())
            .unwrap();
        component.update();

        let forwarded = decode_all(b_peer.poll());
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].nrs_field("route"), Some(""));
        assert_eq!(forwarded[0].nrs_field("toVNID"), Some("40"));
        assert!(a_peer.poll().is_empty());
    }

    #[test]
    fn test_application_messages_loop_back() {
        let mut component = ProcessComponent::without_routes(&config()).unwrap();
        component.send(
            Message::new("CreateNode")
                .with_nrs_field("route", "")
                .with_nrs_field("toVNID", "1")
                .with_field("vnType", "Integer")
                .with_field("vnName", "count")
                .with_field("vnid", "2"),
        );
        component
            .sender()
            .send(
                Message::new("Integer")
                    .with_nrs_field("toVNID", "2")
                    .with_field("value", "41"),
            )
            .unwrap();

        assert_eq!(component.pump(), 2);
        let count = component.dispatcher().manager().get(2).unwrap();
        assert_eq!(count.value(), Value::Integer(41));
    }

    #[test]
    fn test_only_variable_kinds_are_decoded() {
        let mut component = ProcessComponent::without_routes(&config()).unwrap();
        component.register_node_type(NodeType::new("Joint").with_variable("angle", VariableKind::Float));
        assert!(!component.parser().registry().contains("Joint"));
        for kind in VariableKind::ALL {
            assert!(component.parser().registry().contains(kind.type_name()));
        }

        let report = component.message_event(br#"<Joint angle="1"/><Float value="1"/>"#, None);
        assert_eq!(report.unknown_elements, 1);
        assert_eq!(report.delivered, 1);
    }

    #[test]
    fn test_remove_route() {
        let mut component = ProcessComponent::without_routes(&config()).unwrap();
        let (route, _peer) = LocalRoute::pair(port(4), port(1));
        component.add_route(Box::new(route));

        assert!(component.remove_route(port(4)).is_some());
        assert!(component.remove_route(port(4)).is_none());
    }
}
