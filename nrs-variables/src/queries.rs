//!
//! Answers to the `Query*` messages.
//!

use nrs_core::{
    constants::{self, field, message_type},
    messages::{
        ReplyCType, ReplyCid, ReplyConnectedCids, ReplyCsl, ReplyLanguage, ReplyLink, ReplyLog,
        ReplyMaxConnection, ReplyMaxLink, ReplyMaxLog, ReplyMaxPort, ReplyMaxVnid,
        ReplyNumberType, ReplyPort, ReplyRoute,
    },
    DeliverError, Message, PortId, Vnid,
};

use crate::{
    dispatcher::{parse_field, parse_flag, Dispatcher},
    error::DispatchError,
    links::LinkEnd,
    manager::Entry,
    reply,
};

impl Dispatcher {
    /// Answer a query.  Queries are about the component, so it does not
    /// matter which of its nodes or variables one is addressed to.
    pub(crate) fn query(&mut self, target: Vnid, message: &Message) -> Result<(), DispatchError> {
        let mut answer = Message::default();
        match message.msg_type() {
            message_type::QUERY_CID => ReplyCid::set_fields(&mut answer, "", "", "", &self.info.cid),
            message_type::QUERY_CTYPE => ReplyCType::set_fields(
                &mut answer,
                "",
                "",
                "",
                &self.info.c_type,
                &self.info.c_version,
            ),
            message_type::QUERY_CSL => {
                ReplyCsl::set_fields(&mut answer, "", "", "");
                answer.aux_mut().csl = self.info.csl.clone();
            }
            message_type::QUERY_LANGUAGE => ReplyLanguage::set_fields(
                &mut answer,
                "",
                "",
                "",
                constants::PML_VERSION,
                constants::CSL_VERSION,
            ),
            message_type::QUERY_CONNECTED_CIDS => {
                let cids = self.connected_cids(message)?;
                ReplyConnectedCids::set_fields(&mut answer, "", "", "", &cids);
            }
            message_type::QUERY_PORT => {
                let port = parse_port(message)?;
                let cid = self.ports.get(&port).cloned().flatten().unwrap_or_default();
                ReplyPort::set_fields(&mut answer, "", "", "", &port.to_string(), &cid);
            }
            message_type::QUERY_LINK => {
                let vnid = parse_field::<Vnid>(message, field::VNID)?;
                let end = LinkEnd::from_source_not_target(parse_flag(
                    message,
                    field::SOURCE_NOT_TARGET,
                )?);
                let index = parse_field::<usize>(message, field::LINK)?;
                let (cid, far_vnid, temporary) = match self.links.link(vnid, end, index) {
                    Some(link) => (
                        link.cid.clone(),
                        link.vnid.to_string(),
                        link.temporary.to_string(),
                    ),
                    None => Default::default(),
                };
                ReplyLink::set_fields(&mut answer, "", "", "", &cid, &far_vnid, &temporary);
            }
            message_type::QUERY_LOG => {
                let log_port = parse_field::<u32>(message, field::LOG_PORT)?;
                let index = parse_field::<usize>(message, field::LINK)?;
                let (cid, far_vnid) = match self.links.log(log_port, index) {
                    Some(link) => (link.cid.clone(), link.vnid.to_string()),
                    None => Default::default(),
                };
                ReplyLog::set_fields(&mut answer, "", "", "", &cid, &far_vnid);
            }
            message_type::QUERY_MAX_CONNECTION => {
                let n = self.info.limits.max_connection.to_string();
                ReplyMaxConnection::set_fields(&mut answer, "", "", "", &n);
            }
            message_type::QUERY_MAX_LINK => {
                let n = self.info.limits.max_link.to_string();
                ReplyMaxLink::set_fields(&mut answer, "", "", "", &n);
            }
            message_type::QUERY_MAX_LOG => {
                let n = self.info.limits.max_log.to_string();
                ReplyMaxLog::set_fields(&mut answer, "", "", "", &n);
            }
            message_type::QUERY_MAX_PORT => {
                let n = self.info.limits.max_port.to_string();
                ReplyMaxPort::set_fields(&mut answer, "", "", "", &n);
            }
            message_type::QUERY_MAX_VNID => {
                let n = self.info.limits.max_vnid.to_string();
                ReplyMaxVnid::set_fields(&mut answer, "", "", "", &n);
            }
            message_type::QUERY_NUMBER_TYPE => {
                let vnid = parse_field::<Vnid>(message, field::VNID)?;
                let number_type = self
                    .manager
                    .get(vnid)
                    .and_then(|variable| variable.kind().number_type());
                let (name, bits) = match number_type {
                    Some((name, bits)) => (name, bits.to_string()),
                    None => ("", String::new()),
                };
                ReplyNumberType::set_fields(&mut answer, "", "", "", name, &bits);
            }
            message_type::QUERY_ROUTE => {
                // Both routes were completed hop by hop on the way here.
                let forward_route = message.field(field::FORWARD_ROUTE).unwrap_or_default();
                let return_route = message.field(field::RETURN_ROUTE).unwrap_or_default();
                let translation_count = message.field(field::TRANSLATION_COUNT).unwrap_or("0");
                ReplyRoute::set_fields(
                    &mut answer,
                    "",
                    "",
                    "",
                    forward_route,
                    return_route,
                    translation_count,
                );
            }
            message_type::QUERY_VNID => {
                let vn_name = message.check_field(field::VN_NAME)?;
                answer = reply::reply_vnid(message, self.manager.lookup(vn_name));
            }
            message_type::QUERY_VNNAME => {
                let vnid = parse_field::<Vnid>(message, field::VNID)?;
                let vn_name = self.manager.entry(vnid).map(Entry::vn_name);
                answer = reply::reply_vn_name(message, vn_name);
            }
            message_type::QUERY_VNTYPE => {
                let vnid = parse_field::<Vnid>(message, field::VNID)?;
                let vn_type = self.manager.entry(vnid).map(Entry::vn_type);
                answer = reply::reply_vn_type(message, vn_type);
            }
            _ => {
                return Err(DispatchError::Unsupported {
                    message_type: message.msg_type().to_string(),
                    vnid: target,
                })
            }
        }

        reply::address_reply(message, &mut answer);
        self.send(answer);
        Ok(())
    }

    /// The CIDs reachable through one port, or through every port when the
    /// `port` field is empty, separated by spaces
    fn connected_cids(&self, message: &Message) -> Result<String, DispatchError> {
        let cids: Vec<&str> = if message.check_field(field::PORT)?.trim().is_empty() {
            self.ports.values().flatten().map(String::as_str).collect()
        } else {
            let port = parse_port(message)?;
            self.ports
                .get(&port)
                .and_then(Option::as_deref)
                .into_iter()
                .collect()
        };
        Ok(cids.join(" "))
    }
}

fn parse_port(message: &Message) -> Result<PortId, DispatchError> {
    let number = parse_field::<u32>(message, field::PORT)?;
    PortId::new(number).map_err(|_| {
        DispatchError::from(DeliverError::invalid_field(field::PORT, &number.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use nrs_core::{
        messages::{CreateNode, QueryCid, QueryNumberType, QueryRoute, QueryVnid},
        MessageProcessor, SenderHandle,
    };

    use crate::dispatcher::ComponentInfo;

    use super::*;

    #[derive(Clone, Default)]
    struct Outbox(Arc<Mutex<Vec<Message>>>);

    impl MessageProcessor for Outbox {
        fn deliver(&mut self, message: Message, _sender: Option<&SenderHandle>) {
            self.0.lock().unwrap().push(message);
        }
    }

    fn ask(dispatcher: &mut Dispatcher, outbox: &Outbox, query: Message) -> Message {
        dispatcher.dispatch(query);
        outbox.0.lock().unwrap().pop().expect("a reply")
    }

    fn setup() -> (Dispatcher, Outbox) {
        let outbox = Outbox::default();
        let info = ComponentInfo {
            cid: "arm-controller".into(),
            c_type: "ArmController".into(),
            c_version: "2.1".into(),
            ..Default::default()
        };
        let mut dispatcher = Dispatcher::new(info, Box::new(outbox.clone())).unwrap();

        let mut create = Message::default();
        CreateNode::set_fields(&mut create, "", "1", "Float", "root.elbow", "12");
        dispatcher.dispatch(create);
        (dispatcher, outbox)
    }

    #[test]
    fn test_query_cid() {
        let (mut dispatcher, outbox) = setup();
        let mut query = Message::default();
        QueryCid::set_fields(&mut query, "", "1", "3", "4", "m1");

        let reply = ask(&mut dispatcher, &outbox, query);
        assert_eq!(reply.msg_type(), "ReplyCID");
        assert_eq!(reply.field("cid"), Some("arm-controller"));
        assert_eq!(reply.field("replyMsgID"), Some("m1"));
        assert_eq!(reply.nrs_field("route"), Some("3"));
        assert_eq!(reply.nrs_field("toVNID"), Some("4"));
    }

    #[test]
    fn test_query_vnid_found_and_missing() {
        let (mut dispatcher, outbox) = setup();

        let mut query = Message::default();
        QueryVnid::set_fields(&mut query, "", "1", "", "4", "a", "root.elbow");
        let reply = ask(&mut dispatcher, &outbox, query);
        assert_eq!(reply.field("vnid"), Some("12"));

        let mut query = Message::default();
        QueryVnid::set_fields(&mut query, "", "1", "", "4", "b", "root.wrist");
        let reply = ask(&mut dispatcher, &outbox, query);
        assert_eq!(reply.field("vnid"), Some(""));
        assert_eq!(reply.field("replyMsgID"), Some("b"));
    }

    #[test]
    fn test_query_names_and_types() {
        let (mut dispatcher, outbox) = setup();
        let query = |msg_type: &str, vnid: &str| {
            Message::new(msg_type)
                .with_nrs_field("toVNID", "1")
                .with_field("msgID", "q")
                .with_field("vnid", vnid)
        };

        let reply = ask(&mut dispatcher, &outbox, query("QueryVNName", "12"));
        assert_eq!(reply.field("vnName"), Some("root.elbow"));
        let reply = ask(&mut dispatcher, &outbox, query("QueryVNType", "12"));
        assert_eq!(reply.field("vnType"), Some("Float"));
        let reply = ask(&mut dispatcher, &outbox, query("QueryVNType", "1"));
        assert_eq!(reply.field("vnType"), Some("ArmController"));
        let reply = ask(&mut dispatcher, &outbox, query("QueryVNName", "77"));
        assert_eq!(reply.field("vnName"), Some(""));
        // Without returnToVNID the reply is routed by name.
        assert_eq!(reply.nrs_field("intelligent"), Some("true"));
    }

    #[test]
    fn test_query_number_type() {
        let (mut dispatcher, outbox) = setup();
        let mut query = Message::default();
        QueryNumberType::set_fields(&mut query, "", "1", "", "4", "n", "12");

        let reply = ask(&mut dispatcher, &outbox, query);
        assert_eq!(reply.field("numberType"), Some("float"));
        assert_eq!(reply.field("bits"), Some("64"));
    }

    #[test]
    fn test_query_limits_and_language() {
        let (mut dispatcher, outbox) = setup();
        let query = |msg_type: &str| {
            Message::new(msg_type)
                .with_nrs_field("toVNID", "1")
                .with_field("msgID", "q")
                .with_field("returnToVNID", "2")
        };

        let reply = ask(&mut dispatcher, &outbox, query("QueryMaxVNID"));
        assert_eq!(reply.msg_type(), "ReplyMaxVNID");
        assert_eq!(reply.field("n"), Some("65535"));
        let reply = ask(&mut dispatcher, &outbox, query("QueryMaxPort"));
        assert_eq!(reply.field("n"), Some("64"));
        let reply = ask(&mut dispatcher, &outbox, query("QueryLanguage"));
        assert_eq!(reply.field("pmlVersion"), Some("1.0"));
        let reply = ask(&mut dispatcher, &outbox, query("QueryCType"));
        assert_eq!(reply.field("cType"), Some("ArmController"));
        assert_eq!(reply.field("cVersion"), Some("2.1"));
    }

    #[test]
    fn test_query_ports_and_connections() {
        let (mut dispatcher, outbox) = setup();
        dispatcher.set_port(PortId::new(1).unwrap(), Some("gui".into()));
        dispatcher.set_port(PortId::new(2).unwrap(), None);
        dispatcher.set_port(PortId::new(3).unwrap(), Some("plotter".into()));

        let query = |msg_type: &str, port: &str| {
            Message::new(msg_type)
                .with_nrs_field("toVNID", "1")
                .with_field("msgID", "q")
                .with_field("port", port)
        };

        let reply = ask(&mut dispatcher, &outbox, query("QueryPort", "1"));
        assert_eq!(reply.field("cid"), Some("gui"));
        let reply = ask(&mut dispatcher, &outbox, query("QueryPort", "2"));
        assert_eq!(reply.field("cid"), Some(""));
        let reply = ask(&mut dispatcher, &outbox, query("QueryConnectedCIDs", ""));
        assert_eq!(reply.field("cids"), Some("gui plotter"));
        let reply = ask(&mut dispatcher, &outbox, query("QueryConnectedCIDs", "3"));
        assert_eq!(reply.field("cids"), Some("plotter"));
    }

    #[test]
    fn test_query_route_echoes_both_routes() {
        let (mut dispatcher, outbox) = setup();
        let mut query = Message::default();
        QueryRoute::set_fields(&mut query, "", "1", "21", "", "r", "45", "0");

        let reply = ask(&mut dispatcher, &outbox, query);
        assert_eq!(reply.field("forwardRoute"), Some("45"));
        assert_eq!(reply.field("returnRoute"), Some("21"));
        assert_eq!(reply.nrs_field("route"), Some("21"));
    }

    #[test]
    fn test_query_link() {
        let (mut dispatcher, outbox) = setup();
        dispatcher.dispatch(
            Message::new("CreateLink")
                .with_nrs_field("toVNID", "12")
                .with_field("sourceNotTarget", "true")
                .with_field("cid", "plotter")
                .with_field("vnid", "3")
                .with_field("temporary", "true"),
        );

        let query = Message::new("QueryLink")
            .with_nrs_field("toVNID", "1")
            .with_field("msgID", "l")
            .with_field("vnid", "12")
            .with_field("sourceNotTarget", "true")
            .with_field("link", "0");
        let reply = ask(&mut dispatcher, &outbox, query);
        assert_eq!(reply.field("cid"), Some("plotter"));
        assert_eq!(reply.field("vnid"), Some("3"));
        assert_eq!(reply.field("temporary"), Some("true"));
    }
}
