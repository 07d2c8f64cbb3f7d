//!
//! Behaviour every NRS component relies on, checked across the crates.
//!

use std::collections::HashMap;

use crossbeam::channel::{self, Receiver};
use rand::{distributions::Alphanumeric, random, thread_rng, Rng};

use nrs::{
    core::{constants::message_type, messages::DeleteNode, Message, MessageProcessor},
    pipelines::ChannelSink,
    pml::{DecodeError, ElementRegistry, PmlParser},
    variables::{reply, ComponentInfo, Dispatcher},
    ComponentConfig, ProcessComponent,
};

/// A parser that also knows the `Float` variable messages
fn parser() -> (PmlParser, Receiver<Message>) {
    let (tx, rx) = channel::unbounded();
    let mut registry = ElementRegistry::new();
    registry.register("Float");
    (
        PmlParser::new(registry, Box::new(ChannelSink::new(tx))),
        rx,
    )
}

fn random_name() -> String {
    let len = 1 + random::<usize>() % 12;
    let tail: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();
    format!("f{tail}")
}

fn random_value() -> String {
    const SPECIAL: &[char] = &['&', '<', '>', '"', '\'', ' ', '\t', '\n', 'é', '/'];
    let len = random::<usize>() % 24;
    (0..len)
        .map(|_| {
            if random::<u8>() % 4 == 0 {
                SPECIAL[random::<usize>() % SPECIAL.len()]
            } else {
                char::from(thread_rng().sample(Alphanumeric))
            }
        })
        .collect()
}

fn fields(message: &Message) -> HashMap<String, String> {
    message
        .fields()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn nrs_fields(message: &Message) -> HashMap<String, String> {
    message
        .nrs_fields()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[test]
fn test_namespace_round_trip() {
    let (parser, _) = parser();

    for _ in 0..64 {
        let msg_type = message_type::ALL[random::<usize>() % message_type::ALL.len()];
        let mut message = Message::new(msg_type);
        for _ in 0..random::<usize>() % 8 {
            message.set_field(random_name(), random_value());
        }
        for _ in 0..random::<usize>() % 4 {
            message.set_nrs_field(random_name(), random_value());
        }

        let pml = nrs::utils::encode(&message).unwrap();
        let (decoded, report) = parser.decode(pml.as_bytes());
        assert_eq!(report.error, None, "{pml}");
        assert_eq!(decoded.len(), 1, "{pml}");

        let decoded = &decoded[0];
        assert_eq!(decoded.msg_type(), msg_type);
        assert_eq!(fields(decoded), fields(&message));
        assert_eq!(nrs_fields(decoded), nrs_fields(&message));
    }
}

#[test]
fn test_attribute_order_is_irrelevant() {
    let (parser, _) = parser();
    let forward = r#"<Float xmlns:nrsa="http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/attributes/1.0/" nrsa:toVNID="4" value="1" nrsa:route="2"/>"#;
    let backward = r#"<Float nrsa:route="2" value="1" nrsa:toVNID="4" xmlns:nrsa="http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/attributes/1.0/"/>"#;

    let (a, _) = parser.decode(forward.as_bytes());
    let (b, _) = parser.decode(backward.as_bytes());
    assert_eq!(fields(&a[0]), fields(&b[0]));
    assert_eq!(nrs_fields(&a[0]), nrs_fields(&b[0]));
}

#[test]
fn test_reply_addressing() {
    let request = Message::new("QueryVNID")
        .with_field("returnToVNID", "7")
        .with_field("returnRoute", "R")
        .with_field("msgID", "m1")
        .with_field("vnName", "arm");

    let reply = reply::reply_vnid(&request, Some(12));
    assert_eq!(reply.nrs_field("toVNID"), Some("7"));
    assert_eq!(reply.nrs_field("route"), Some("R"));
    assert_eq!(reply.field("replyMsgID"), Some("m1"));
    assert_eq!(reply.field("vnid"), Some("12"));
}

#[test]
fn test_intelligent_routing_fallback() {
    let request = Message::new("QueryVNType")
        .with_field("msgID", "m2")
        .with_field("vnid", "3");

    let reply = reply::reply_vn_type(&request, None);
    assert_eq!(reply.nrs_field("toVNID"), Some("0"));
    assert_eq!(reply.nrs_field("intelligent"), Some("true"));
    assert_eq!(reply.nrs_field("iTargetVNName"), Some(reply.msg_type()));
    assert_eq!(reply.field("vnType"), Some(""));
}

#[test]
fn test_decoder_resilience() {
    let (mut parser, rx) = parser();

    let report = parser.message_event(b"<QueryCID msgID=\"ok\"/><QueryCType msgID=", None, None);
    assert_eq!(report.delivered, 1);
    assert!(matches!(report.error, Some(DecodeError::Xml { .. })));
    assert_eq!(rx.try_recv().unwrap().field("msgID"), Some("ok"));

    let report = parser.message_event(b"<QueryCType msgID=\"next\"/>", None, None);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.error, None);
    assert_eq!(rx.try_recv().unwrap().field("msgID"), Some("next"));
}

#[test]
fn test_mid_build_discard() {
    let (mut parser, rx) = parser();

    let report = parser.message_event(
        b"<QueryVNID msgID=\"a\"><QueryCID msgID=\"b\"/></QueryVNID>",
        None,
        None,
    );
    assert_eq!(report.delivered, 1);
    assert_eq!(report.discarded, 1);

    let delivered: Vec<Message> = rx.try_iter().collect();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].msg_type(), "QueryCID");
    assert_eq!(delivered[0].field("msgID"), Some("b"));

    // The outer message never closes.  The inner one is still delivered
    // the moment its end tag is read.
    let report = parser.message_event(b"<QueryVNID msgID=\"a\"><QueryCID msgID=\"c\"/>", None, None);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.discarded, 1);
    assert_eq!(rx.try_recv().unwrap().field("msgID"), Some("c"));
}

struct Discard;

impl MessageProcessor for Discard {
    fn deliver(&mut self, _message: Message, _sender: Option<&nrs::core::SenderHandle>) {}
}

#[test]
fn test_dispatch_miss() {
    let mut dispatcher = Dispatcher::new(ComponentInfo::default(), Box::new(Discard)).unwrap();

    let vnid = 2 + random::<u32>() % 1000;
    assert!(dispatcher.manager().get(vnid).is_none());

    let before = dispatcher.manager().len();
    let mut delete = Message::default();
    DeleteNode::set_fields(&mut delete, "", &vnid.to_string());
    dispatcher.dispatch(delete);

    assert_eq!(dispatcher.manager().len(), before);
    assert!(dispatcher.manager().get(vnid).is_none());
}

#[test]
fn test_field_namespace_isolation() {
    let mut message = Message::new("Float");
    message.set_field("route", "pml-route");
    message.set_nrs_field("route", "12");

    assert_eq!(message.field("route"), Some("pml-route"));
    assert_eq!(message.nrs_field("route"), Some("12"));

    // The isolation survives the wire.
    let (parser, _) = parser();
    let (decoded, _) = parser.decode(nrs::utils::encode(&message).unwrap().as_bytes());
    assert_eq!(decoded[0].field("route"), Some("pml-route"));
    assert_eq!(decoded[0].nrs_field("route"), Some("12"));
}

#[test]
fn test_component_survives_garbage() {
    let mut component = ProcessComponent::without_routes(&ComponentConfig::default()).unwrap();

    for _ in 0..32 {
        let garbage: Vec<u8> = (0..random::<usize>() % 256).map(|_| random()).collect();
        component.message_event(&garbage, None);
    }

    let report = component.message_event(b"<QueryCID msgID=\"alive\"/>", None);
    assert_eq!(report.delivered, 1);
}
