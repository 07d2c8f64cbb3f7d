//!
//! The Dispatcher.
//!
//! The dispatcher is the last stage of a component's inbound chain.  It
//! works out which node or variable a message is for, from its NRS
//! `toVNID` or, for intelligent messages, its `iTargetVNName`, and then:
//!
//! - builds or removes nodes for `CreateNode`, `DeleteNode` and `Reset`;
//! - maintains the link table and the error route;
//! - answers every `Query*` message through reply addressing;
//! - hands `Reply*`, `Error` and acknowledgement messages to the
//!   application;
//! - delivers everything else to the addressed variable and copies it
//!   along the variable's links once the variable has accepted it.
//!
//! Nothing the dispatcher is handed can fail past it: a message that
//! cannot be handled is logged, reported along the error route if one is
//! set and dropped.
//!

use std::collections::BTreeMap;

use nrs_core::{
    constants::{self, field, message_type, nrs_field},
    messages, CslPayload, DeliverError, Direction, Message, MessageProcessor, PortId,
    SenderHandle, Vnid,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::DispatchError,
    factory::NodeFactory,
    links::{Link, LinkEnd, LinkTable},
    manager::{Node, VariableManager},
    reply,
};

/// The name the dispatcher signs outgoing messages with.
pub const STAGE_NAME: &str = "dispatcher";

/// What to do when a message's type differs from the variable's type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeMismatchPolicy {
    /// Log the mismatch and deliver anyway
    #[default]
    Advisory,
    /// Refuse the message with [`DeliverError::TypeMismatch`]
    Reject,
}

/// The limits a component reports through the `QueryMax*` messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// The largest VNID
    pub max_vnid: Vnid,
    /// The number of ports
    pub max_port: u32,
    /// The number of links per variable
    pub max_link: u32,
    /// The number of log ports
    pub max_log: u32,
    /// The number of connections
    pub max_connection: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_vnid: 65_535,
            max_port: PortId::MAX as u32 + 1,
            max_link: 64,
            max_log: 16,
            max_connection: 64,
        }
    }
}

/// Who a component is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    /// The component's CID
    pub cid: String,
    /// The component type reported by `ReplyCType`
    pub c_type: String,
    /// The component version reported by `ReplyCType`
    pub c_version: String,
    /// The VNID of the root node
    pub root_vnid: Vnid,
    /// The name of the root node
    pub root_name: String,
    /// See [`Limits`]
    pub limits: Limits,
    /// The CSL description sent with `ReplyCSL`, if the component has one
    pub csl: Option<CslPayload>,
}

impl Default for ComponentInfo {
    fn default() -> Self {
        Self {
            cid: "nrs-component".into(),
            c_type: "NRS.component".into(),
            c_version: env!("CARGO_PKG_VERSION").into(),
            root_vnid: 1,
            root_name: "root".into(),
            limits: Limits::default(),
            csl: None,
        }
    }
}

/// Where errors are reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ErrorRoute {
    pub min_priority: u32,
    pub route: String,
    pub to_vnid: String,
}

/// Delivers inbound messages to the nodes and variables of a component.
pub struct Dispatcher {
    /// Who this component is
    pub(crate) info: ComponentInfo,
    /// Every node and variable
    pub(crate) manager: VariableManager,
    /// How `CreateNode` builds things
    pub(crate) factory: NodeFactory,
    /// Every link
    pub(crate) links: LinkTable,
    /// The component's ports and the CID connected to each, if known
    pub(crate) ports: BTreeMap<PortId, Option<String>>,
    /// Where errors are reported, set by `SetErrorRoute`
    pub(crate) error_route: Option<ErrorRoute>,
    /// See [`TypeMismatchPolicy`]
    type_mismatch: TypeMismatchPolicy,
    /// The entry point of the outbound chain
    outbound: Box<dyn MessageProcessor>,
    /// Receives replies and errors addressed to this component
    application: Option<Box<dyn MessageProcessor>>,
}

impl Dispatcher {
    /// Create a dispatcher whose replies go to `outbound`.
    ///
    /// The root node is registered straight away, so this fails if
    /// `info.root_vnid` cannot be registered.
    pub fn new(
        info: ComponentInfo,
        outbound: Box<dyn MessageProcessor>,
    ) -> Result<Self, DispatchError> {
        let mut manager = VariableManager::new(info.limits.max_vnid);
        manager.register_node(
            Node::new(info.root_vnid, info.root_name.as_str(), info.c_type.as_str()),
            None,
        )?;

        Ok(Self {
            info,
            manager,
            factory: NodeFactory::new(),
            links: LinkTable::new(),
            ports: BTreeMap::new(),
            error_route: None,
            type_mismatch: TypeMismatchPolicy::default(),
            outbound,
            application: None,
        })
    }

    /// Use a different node factory
    pub fn with_factory(mut self, factory: NodeFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Set the type mismatch policy
    pub fn with_type_mismatch(mut self, policy: TypeMismatchPolicy) -> Self {
        self.type_mismatch = policy;
        self
    }

    /// Hand replies and errors addressed to this component to `application`
    pub fn with_application(mut self, application: Box<dyn MessageProcessor>) -> Self {
        self.application = Some(application);
        self
    }

    /// Who this component is
    pub fn info(&self) -> &ComponentInfo {
        &self.info
    }

    /// The component's nodes and variables
    pub fn manager(&self) -> &VariableManager {
        &self.manager
    }

    /// Mutable access to the component's nodes and variables
    pub fn manager_mut(&mut self) -> &mut VariableManager {
        &mut self.manager
    }

    /// The node factory
    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    /// Mutable access to the node factory
    pub fn factory_mut(&mut self) -> &mut NodeFactory {
        &mut self.factory
    }

    /// The component's links
    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Record a port and the CID connected to it
    pub fn set_port(&mut self, port: PortId, cid: Option<String>) {
        self.ports.insert(port, cid);
    }

    /// Forget a port
    pub fn remove_port(&mut self, port: PortId) {
        self.ports.remove(&port);
    }

    /// Handle one message to completion.
    pub fn dispatch(&mut self, message: Message) {
        if let Some(ack) = reply::acknowledgement(&message) {
            self.send(ack);
        }

        let result = self
            .resolve_target(&message)
            .and_then(|target| self.dispatch_to(target, &message));
        if let Err(err) = result {
            self.report(&message, err);
        }
    }

    /// Work out which entry a message is addressed to.
    fn resolve_target(&self, message: &Message) -> Result<Vnid, DispatchError> {
        let to_vnid = match message.nrs_field(nrs_field::TO_VNID) {
            Some(raw) => raw
                .trim()
                .parse::<Vnid>()
                .map_err(|_| DispatchError::InvalidVnid(raw.to_string()))?,
            None => {
                debug!(
                    message_type = message.msg_type(),
                    "message has no toVNID, delivering to the root node"
                );
                return Ok(self.info.root_vnid);
            }
        };

        if to_vnid != constants::INTELLIGENT_VNID {
            if !self.manager.contains(to_vnid) {
                return Err(DispatchError::UnknownVnid(to_vnid));
            }
            return Ok(to_vnid);
        }

        if let Some(cid) = message.nrs_field(nrs_field::I_TARGET_CID) {
            if !cid.is_empty() && cid != self.info.cid {
                return Err(DispatchError::ForeignComponent(cid.to_string()));
            }
        }

        match message.nrs_field(nrs_field::I_TARGET_VNNAME) {
            Some(name) if !name.is_empty() => match self.manager.lookup(name) {
                Some(vnid) => Ok(vnid),
                // Replies to requests without a return VNID name their own
                // type and belong to the component.
                None if name == message.msg_type() => Ok(self.info.root_vnid),
                None => Err(DispatchError::UnknownName(name.to_string())),
            },
            // An intelligent message without a target name is for the
            // component itself.
            _ => Ok(self.info.root_vnid),
        }
    }

    fn dispatch_to(&mut self, target: Vnid, message: &Message) -> Result<(), DispatchError> {
        match message.msg_type() {
            message_type::CREATE_NODE => self.create_node(target, message),
            message_type::DELETE_NODE => self.delete_node(target, message),
            message_type::RESET => {
                self.reset();
                Ok(())
            }
            message_type::CREATE_LINK
            | message_type::DELETE_LINK
            | message_type::CREATE_LOG_LINK
            | message_type::DELETE_LOG_LINK => self.update_links(target, message),
            message_type::SET_ERROR_ROUTE => self.set_error_route(message),
            message_type::ACKNOWLEDGE_MESSAGE
            | message_type::ERROR
            | message_type::FAILED_ROUTE => {
                self.to_application(message);
                Ok(())
            }
            msg_type if msg_type.starts_with("Reply") => {
                self.to_application(message);
                Ok(())
            }
            msg_type if msg_type.starts_with("Query") => self.query(target, message),
            _ => self.deliver_to_variable(target, message),
        }
    }

    fn create_node(&mut self, parent: Vnid, message: &Message) -> Result<(), DispatchError> {
        let vn_type = message.check_field(field::VN_TYPE)?;
        let vn_name = message.check_field(field::VN_NAME)?;
        let vnid = parse_field::<Vnid>(message, field::VNID)?;

        if self.manager.node(parent).is_none() {
            return Err(DispatchError::Unsupported {
                message_type: message.msg_type().to_string(),
                vnid: parent,
            });
        }

        let blueprint = self.factory.build(vn_type, vnid, vn_name)?;
        let created = self.manager.install(blueprint, Some(parent))?;
        info!(vnid, vn_name, vn_type, created = created.len(), "created node");
        Ok(())
    }

    fn delete_node(&mut self, target: Vnid, message: &Message) -> Result<(), DispatchError> {
        if target == self.info.root_vnid {
            return Err(DispatchError::Unsupported {
                message_type: message.msg_type().to_string(),
                vnid: target,
            });
        }

        let removed = self.manager.remove(target);
        self.links.forget(&removed);
        info!(vnid = target, removed = removed.len(), "deleted node");
        Ok(())
    }

    /// Remove everything but the root node.
    fn reset(&mut self) {
        let children = self
            .manager
            .node(self.info.root_vnid)
            .map(|root| root.children().to_vec())
            .unwrap_or_default();

        let mut removed = Vec::new();
        for child in children {
            removed.extend(self.manager.remove(child));
        }
        self.links.clear();
        info!(removed = removed.len(), "reset component");
    }

    fn update_links(&mut self, target: Vnid, message: &Message) -> Result<(), DispatchError> {
        if self.manager.get(target).is_none() {
            return Err(DispatchError::Unsupported {
                message_type: message.msg_type().to_string(),
                vnid: target,
            });
        }

        let cid = message.check_field(field::CID)?;
        let far_vnid = parse_field::<Vnid>(message, field::VNID)?;

        match message.msg_type() {
            message_type::CREATE_LINK | message_type::DELETE_LINK => {
                let source_not_target = parse_flag(message, field::SOURCE_NOT_TARGET)?;
                let end = LinkEnd::from_source_not_target(source_not_target);

                if message.msg_type() == message_type::DELETE_LINK {
                    if !self.links.remove(target, end, cid, far_vnid) {
                        warn!(vnid = target, cid, far_vnid, "no such link to delete");
                    }
                    return Ok(());
                }

                let max = self.info.limits.max_link;
                if self.links.count(target, end) >= max as usize {
                    return Err(DispatchError::LinkLimit { vnid: target, max });
                }
                let temporary = match message.field(field::TEMPORARY) {
                    Some(_) => parse_flag(message, field::TEMPORARY)?,
                    None => false,
                };
                let link = Link {
                    cid: cid.to_string(),
                    vnid: far_vnid,
                    temporary,
                };
                if !self.links.add(target, end, link) {
                    warn!(vnid = target, cid, far_vnid, "link already exists");
                }
            }
            _ => {
                let log_port = parse_field::<u32>(message, field::LOG_PORT)?;
                if log_port >= self.info.limits.max_log {
                    let raw = log_port.to_string();
                    return Err(DeliverError::invalid_field(field::LOG_PORT, &raw).into());
                }

                if message.msg_type() == message_type::DELETE_LOG_LINK {
                    if !self.links.remove_log(log_port, target, cid, far_vnid) {
                        warn!(vnid = target, log_port, cid, far_vnid, "no such log link to delete");
                    }
                    return Ok(());
                }

                let link = Link {
                    cid: cid.to_string(),
                    vnid: far_vnid,
                    temporary: false,
                };
                if !self.links.add_log(log_port, target, link) {
                    warn!(vnid = target, log_port, cid, far_vnid, "log link already exists");
                }
            }
        }
        Ok(())
    }

    fn set_error_route(&mut self, message: &Message) -> Result<(), DispatchError> {
        let min_priority = parse_field::<u32>(message, field::MIN_PRIORITY)?;
        let route = message.check_field(field::ERROR_ROUTE)?;
        let to_vnid = message.check_field(field::ERROR_TO_VNID)?;

        info!(min_priority, route, to_vnid, "error route set");
        self.error_route = Some(ErrorRoute {
            min_priority,
            route: route.to_string(),
            to_vnid: to_vnid.to_string(),
        });
        Ok(())
    }

    fn to_application(&mut self, message: &Message) {
        match self.application.as_mut() {
            Some(application) => {
                application.deliver(message.clone(), Some(&SenderHandle::Stage(STAGE_NAME)))
            }
            None => debug!(
                message_type = message.msg_type(),
                "no application stage, dropping message"
            ),
        }
    }

    fn deliver_to_variable(&mut self, target: Vnid, message: &Message) -> Result<(), DispatchError> {
        let policy = self.type_mismatch;
        let Some(variable) = self.manager.get_mut(target) else {
            return Err(DispatchError::Unsupported {
                message_type: message.msg_type().to_string(),
                vnid: target,
            });
        };

        if variable.is_diff(message) {
            let vn_type = variable.kind().type_name();
            if policy == TypeMismatchPolicy::Reject {
                return Err(DeliverError::TypeMismatch {
                    vnid: target,
                    message_type: message.msg_type().to_string(),
                    vn_type: vn_type.to_string(),
                }
                .into());
            }
            warn!(
                vnid = target,
                message_type = message.msg_type(),
                vn_type,
                "message type differs from variable type, delivering anyway"
            );
        }

        variable.deliver(message)?;
        self.forward_to_links(target, message);
        Ok(())
    }

    /// Copy an accepted message to every far end linked to `source`.
    fn forward_to_links(&mut self, source: Vnid, message: &Message) {
        for link in self.links.targets(source) {
            let mut copy = Message::new(message.msg_type());
            for (name, value) in message.fields() {
                copy.set_field(name, value);
            }
            copy.set_nrs_field(nrs_field::ROUTE, "");
            copy.set_nrs_field(nrs_field::TO_VNID, link.vnid.to_string());
            copy.set_nrs_field(nrs_field::FROM_VNID, source.to_string());
            if link.cid != self.info.cid {
                copy.set_nrs_field(nrs_field::INTELLIGENT, constants::TRUE);
                copy.set_nrs_field(nrs_field::I_TARGET_CID, link.cid.as_str());
            }
            self.send(copy);
        }
    }

    /// Log a failed message and report it along the error route.
    fn report(&mut self, message: &Message, err: DispatchError) {
        let priority = err.priority();
        warn!(
            message_type = message.msg_type(),
            to_vnid = message.nrs_field(nrs_field::TO_VNID),
            priority,
            error = %err,
            "dropping message"
        );

        // Errors about errors would bounce forever.
        if message.msg_type() == message_type::ERROR {
            return;
        }
        let Some(error_route) = self.error_route.as_ref() else {
            return;
        };
        if priority < error_route.min_priority {
            return;
        }

        let mut error = Message::default();
        messages::Error::set_fields(
            &mut error,
            &error_route.route,
            &error_route.to_vnid,
            &priority.to_string(),
            &err.error_id().to_string(),
            &err.to_string(),
        );
        self.send(error);
    }

    /// Hand a message to the outbound chain.
    pub(crate) fn send(&mut self, mut message: Message) {
        message.aux_mut().direction = Direction::Outbound;
        self.outbound
            .deliver(message, Some(&SenderHandle::Stage(STAGE_NAME)));
    }
}

impl MessageProcessor for Dispatcher {
    fn deliver(&mut self, message: Message, _sender: Option<&SenderHandle>) {
        self.dispatch(message);
    }
}

/// Parse a required PML field.
pub(crate) fn parse_field<T: std::str::FromStr>(
    message: &Message,
    name: &str,
) -> Result<T, DeliverError> {
    let raw = message.check_field(name)?;
    raw.trim()
        .parse()
        .map_err(|_| DeliverError::invalid_field(name, raw))
}

/// Parse a required `true`/`false` PML field.
pub(crate) fn parse_flag(message: &Message, name: &str) -> Result<bool, DeliverError> {
    match message.check_field(name)? {
        constants::TRUE => Ok(true),
        constants::FALSE => Ok(false),
        raw => Err(DeliverError::invalid_field(name, raw)),
    }
}
