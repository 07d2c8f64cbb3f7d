//!
//! Two components talking over a local route.
//!

use std::{thread::sleep, time::Duration};

use crossbeam::channel::{self, Receiver};
use rand::random;

use nrs::{
    core::{Component, Message, PortId, Value},
    pipelines::ChannelSink,
    prelude::LocalRoute,
    ComponentConfig, ProcessComponent,
};

fn port(number: u32) -> PortId {
    PortId::new(number).unwrap()
}

fn component(cid: &str, intercept: bool) -> (ProcessComponent, Receiver<Message>) {
    let (tx, rx) = channel::unbounded();
    let config = ComponentConfig {
        cid: cid.into(),
        intercept,
        ..Default::default()
    };
    let component = ProcessComponent::without_routes(&config)
        .unwrap()
        .with_application(Box::new(ChannelSink::new(tx)));
    (component, rx)
}

/// `a` and `b` are each attached to the other on their port 1.
fn connected(
    b_intercepts: bool,
) -> (
    (ProcessComponent, Receiver<Message>),
    (ProcessComponent, Receiver<Message>),
) {
    let (mut a, a_rx) = component("a", false);
    let (mut b, b_rx) = component("b", b_intercepts);

    let (a_end, b_end) = LocalRoute::pair(port(1), port(1));
    a.add_route(Box::new(a_end.with_cid("b")));
    b.add_route(Box::new(b_end.with_cid("a")));
    a.set_intelligent_port(Some(port(1)));
    b.set_intelligent_port(Some(port(1)));

    ((a, a_rx), (b, b_rx))
}

fn create_node(route: &str, vn_type: &str, vn_name: &str, vnid: u32) -> Message {
    Message::new("CreateNode")
        .with_nrs_field("route", route)
        .with_nrs_field("toVNID", "1")
        .with_field("vnType", vn_type)
        .with_field("vnName", vn_name)
        .with_field("vnid", vnid.to_string())
}

fn float(route: &str, vnid: u32, value: f64) -> Message {
    Message::new("Float")
        .with_nrs_field("route", route)
        .with_nrs_field("toVNID", vnid.to_string())
        .with_field("value", value.to_string())
}

#[test]
fn test_remote_create_and_set() {
    let ((mut a, _), (mut b, _)) = connected(false);

    a.send(create_node("1", "Float", "gain", 5));
    let value = random::<f64>();
    a.send(float("1", 5, value));
    a.pump();
    b.update();

    let gain = b.dispatcher().manager().get(5).unwrap();
    assert_eq!(gain.value(), Value::Float(value));
    assert!(a.dispatcher().manager().get(5).is_none());
}

#[test]
fn test_query_reply_reaches_the_application() {
    let ((mut a, a_rx), (mut b, _)) = connected(false);

    a.send(create_node("1", "Boolean", "enabled", 9));
    a.send(
        Message::new("QueryVNID")
            .with_nrs_field("route", "1")
            .with_nrs_field("toVNID", "1")
            .with_field("msgID", "q7")
            .with_field("returnRoute", "")
            .with_field("vnName", "enabled"),
    );
    a.pump();
    b.update();
    a.update();

    let replies: Vec<Message> = a_rx.try_iter().collect();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].msg_type(), "ReplyVNID");
    assert_eq!(replies[0].field("replyMsgID"), Some("q7"));
    assert_eq!(replies[0].field("vnid"), Some("9"));
}

#[test]
fn test_links_forward_between_components() {
    let ((mut a, _), (mut b, _)) = connected(false);

    // The far end of the link lives in `a`.
    a.send(create_node("", "Float", "mirror", 7));
    a.send(create_node("1", "Float", "gain", 5));
    a.send(
        Message::new("CreateLink")
            .with_nrs_field("route", "1")
            .with_nrs_field("toVNID", "5")
            .with_field("sourceNotTarget", "true")
            .with_field("cid", "a")
            .with_field("vnid", "7")
            .with_field("temporary", "false"),
    );
    a.send(float("1", 5, 2.0));
    a.pump();
    b.update();
    a.update();

    assert_eq!(b.dispatcher().manager().get(5).unwrap().value(), Value::Float(2.0));
    assert_eq!(a.dispatcher().manager().get(7).unwrap().value(), Value::Float(2.0));
}

#[test]
fn test_errors_follow_the_error_route() {
    let ((mut a, a_rx), (mut b, _)) = connected(false);

    a.send(
        Message::new("SetErrorRoute")
            .with_nrs_field("route", "1")
            .with_nrs_field("toVNID", "1")
            .with_field("minPriority", "0")
            .with_field("errorRoute", "1")
            .with_field("errorToVNID", "1"),
    );
    a.send(float("1", 99, 1.0));
    a.pump();
    b.update();
    a.update();

    let errors: Vec<Message> = a_rx.try_iter().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].msg_type(), "Error");
    assert!(errors[0].field("errorString").unwrap().contains("99"));
}

#[test]
fn test_intercepted_messages_wait_for_a_step() {
    let ((mut a, _), (mut b, _)) = connected(true);
    let intercept = b.intercept().unwrap();

    a.send(create_node("1", "Integer", "count", 3));
    a.pump();
    intercept.pause();
    b.update();
    assert_eq!(intercept.pending(), 1);
    assert!(b.dispatcher().manager().get(3).is_none());

    assert!(intercept.step());
    let mut created = false;
    for _ in 0..100 {
        b.pump();
        if b.dispatcher().manager().get(3).is_some() {
            created = true;
            break;
        }
        sleep(Duration::from_millis(10));
    }
    assert!(created);
    sleep(Duration::from_millis(20));
    assert_eq!(intercept.pending(), 0);

    a.send(
        Message::new("Integer")
            .with_nrs_field("route", "1")
            .with_nrs_field("toVNID", "3")
            .with_field("value", "12"),
    );
    a.pump();
    b.update();
    sleep(Duration::from_millis(50));
    b.pump();
    assert_eq!(b.dispatcher().manager().get(3).unwrap().value(), Value::Integer(0));
    assert_eq!(intercept.pending(), 1);

    assert!(intercept.step());
    let mut value = Value::Integer(0);
    for _ in 0..100 {
        b.pump();
        value = b.dispatcher().manager().get(3).unwrap().value();
        if value != Value::Integer(0) {
            break;
        }
        sleep(Duration::from_millis(10));
    }
    assert_eq!(value, Value::Integer(12));
}
