//!
//! Reply addressing.
//!
//! A request names its way home with the PML fields `returnRoute`,
//! `returnToVNID` and `msgID`.  A reply is addressed from them:
//!
//! - with a non-empty `returnToVNID`, the reply's NRS `toVNID` is that VNID and its
//!   NRS `route` is the request's `returnRoute`;
//! - without one, the reply asks for intelligent routing: NRS `toVNID` is
//!   0, `intelligent` is `true` and `iTargetVNName` is the reply's own
//!   type, so whoever routes it resolves the target by name;
//! - `replyMsgID` always repeats the request's `msgID`.
//!
//! Everything in here is a pure function of its arguments.
//!

use nrs_core::{
    constants::{self, field, nrs_field},
    messages::{AcknowledgeMessage, ReplyVnName, ReplyVnType, ReplyVnid},
    Message, Vnid,
};

/// Whether a request expects an answer
pub fn wants_reply(request: &Message) -> bool {
    request.has_field(field::MSG_ID) || request.has_field(field::RETURN_TO_VNID)
}

/// Set the NRS addressing fields of a message going back to the sender
/// of `request`.
pub fn address(request: &Message, reply: &mut Message) {
    let route = request.field(field::RETURN_ROUTE).unwrap_or_default();
    reply.set_nrs_field(nrs_field::ROUTE, route);

    match request
        .field(field::RETURN_TO_VNID)
        .filter(|to_vnid| !to_vnid.is_empty())
    {
        Some(to_vnid) => {
            reply.set_nrs_field(nrs_field::TO_VNID, to_vnid);
            reply.remove_nrs_field(nrs_field::INTELLIGENT);
            reply.remove_nrs_field(nrs_field::I_TARGET_VNNAME);
        }
        None => {
            let target = reply.msg_type().to_string();
            reply.set_nrs_field(nrs_field::TO_VNID, constants::INTELLIGENT_VNID.to_string());
            reply.set_nrs_field(nrs_field::INTELLIGENT, constants::TRUE);
            reply.set_nrs_field(nrs_field::I_TARGET_VNNAME, target);
        }
    }
}

/// Address `reply` as the answer to `request` and copy its `msgID`.
pub fn address_reply(request: &Message, reply: &mut Message) {
    address(request, reply);
    let msg_id = request.field(field::MSG_ID).unwrap_or_default();
    reply.set_field(field::REPLY_MSG_ID, msg_id);
}

/// The acknowledgement a request asked for with NRS `ackMsg="true"`, if
/// any.  The acknowledged id is the NRS `msgID`, falling back to the PML
/// one.
pub fn acknowledgement(request: &Message) -> Option<Message> {
    if request.nrs_field(nrs_field::ACK_MSG) != Some(constants::TRUE) {
        return None;
    }

    let msg_id = request
        .nrs_field(nrs_field::MSG_ID)
        .or_else(|| request.field(field::MSG_ID))
        .unwrap_or_default();
    let mut ack = Message::default();
    AcknowledgeMessage::set_fields(&mut ack, "", "", msg_id);
    address(request, &mut ack);
    Some(ack)
}

fn vnid_or_empty(vnid: Option<Vnid>) -> String {
    vnid.map(|vnid| vnid.to_string()).unwrap_or_default()
}

/// Answer a `QueryVNID` with the VNID it resolved to, or an empty `vnid`
/// if the name is unknown
pub fn reply_vnid(request: &Message, resolved: Option<Vnid>) -> Message {
    let mut reply = Message::default();
    ReplyVnid::set_fields(&mut reply, "", "", "", &vnid_or_empty(resolved));
    address_reply(request, &mut reply);
    reply
}

/// Answer a `QueryVNName`
pub fn reply_vn_name(request: &Message, resolved: Option<&str>) -> Message {
    let mut reply = Message::default();
    ReplyVnName::set_fields(&mut reply, "", "", "", resolved.unwrap_or_default());
    address_reply(request, &mut reply);
    reply
}

/// Answer a `QueryVNType`
pub fn reply_vn_type(request: &Message, resolved: Option<&str>) -> Message {
    let mut reply = Message::default();
    ReplyVnType::set_fields(&mut reply, "", "", "", resolved.unwrap_or_default());
    address_reply(request, &mut reply);
    reply
}
