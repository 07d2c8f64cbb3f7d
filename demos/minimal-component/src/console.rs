//!
//! The console is a second component that keeps prodding the first one
//! and logs whatever comes back.
//!

use crossbeam::channel::{unbounded, Receiver};
use tracing::{info, warn};

use nrs::{
    core::{Component, Message},
    pipelines::ChannelSink,
    prelude::LocalRoute,
    ComponentConfig, ComponentError, ProcessComponent,
};

/// The VNID of the variable the console creates in the other component
const GAIN_VNID: u32 = 2;

/// A component that writes to and queries the component at the other
/// end of its route on port 1
pub struct Console {
    component: ProcessComponent,
    replies: Receiver<Message>,
    count: u64,
}

impl Console {
    /// Create a console attached to `route`
    pub fn new(route: LocalRoute) -> Result<Self, ComponentError> {
        let (tx, replies) = unbounded();
        let config = ComponentConfig {
            cid: "console".into(),
            update_delay_us: 500_000,
            ..Default::default()
        };

        let mut component = ProcessComponent::without_routes(&config)?
            .with_application(Box::new(ChannelSink::new(tx)));
        component.add_route(Box::new(route));

        Ok(Self {
            component,
            replies,
            count: 0,
        })
    }
}

impl Component for Console {
    fn get_update_delay_us(&self) -> u128 {
        self.component.get_update_delay_us()
    }

    fn start(&mut self) {
        self.component.start();
        self.component.send(
            Message::new("CreateNode")
                .with_nrs_field("route", "1")
                .with_nrs_field("toVNID", "1")
                .with_field("vnType", "Float")
                .with_field("vnName", "gain")
                .with_field("vnid", GAIN_VNID.to_string()),
        );
    }

    fn update(&mut self) {
        self.component.update();
        for reply in self.replies.try_iter() {
            match reply.msg_type() {
                "ReplyCID" => info!(
                    cid = reply.field("cid").unwrap_or_default(),
                    msg_id = reply.field("replyMsgID").unwrap_or_default(),
                    "got a reply"
                ),
                msg_type => warn!(msg_type, "unexpected message"),
            }
        }

        self.count += 1;
        self.component.send(
            Message::new("Float")
                .with_nrs_field("route", "1")
                .with_nrs_field("toVNID", GAIN_VNID.to_string())
                .with_field("value", (self.count as f64 / 10.0).to_string()),
        );
        self.component.send(
            Message::new("QueryCID")
                .with_nrs_field("route", "1")
                .with_nrs_field("toVNID", "1")
                .with_field("msgID", format!("console-{}", self.count))
                .with_field("returnRoute", ""),
        );
    }

    fn shutdown(&mut self) {
        self.component.shutdown();
    }
}
