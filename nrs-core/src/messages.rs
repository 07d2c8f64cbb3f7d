//!
//! Message Builders.
//!
//! One zero-sized builder per built-in message type.  Each builder's
//! `set_fields` writes exactly the standard field set of its type, NRS
//! fields first and then PML fields, in the order listed by its
//! `NRS_FIELDS` and `FIELDS` constants.
//!
//! ```rust
//! use nrs_core::{messages::QueryVnid, Message};
//!
//! let mut message = Message::default();
//! QueryVnid::set_fields(&mut message, "4", "12", "", "3", "m1", "arm.elbow");
//! assert_eq!(message.msg_type(), "QueryVNID");
//! assert_eq!(message.nrs_field("toVNID"), Some("12"));
//! assert_eq!(message.field("vnName"), Some("arm.elbow"));
//! ```
//!

use crate::{
    constants::{field, message_type, nrs_field},
    error::FieldNotFound,
    message::Message,
};

macro_rules! message_builders {
    ($(
        $(#[$doc:meta])*
        $name:ident => $msg_type:ident {
            nrs: [$($nrs_arg:ident: $nrs_field:ident),* $(,)?],
            pml: [$($arg:ident: $field:ident),* $(,)?] $(,)?
        }
    )*) => {
        $(
            $(#[$doc])*
            #[derive(Clone, Copy, Debug, Default)]
            pub struct $name;

            impl $name {
                /// The message type written by this builder
                pub const TYPE: &'static str = message_type::$msg_type;
                /// The NRS fields written by `set_fields`, in parameter order
                pub const NRS_FIELDS: &'static [&'static str] = &[$(nrs_field::$nrs_field),*];
                /// The PML fields written by `set_fields`, in parameter order
                pub const FIELDS: &'static [&'static str] = &[$(field::$field),*];

                /// Set the message type and write the standard field set
                #[allow(clippy::too_many_arguments)]
                pub fn set_fields(message: &mut Message, $($nrs_arg: &str,)* $($arg: &str,)*) {
                    message.set_type(Self::TYPE);
                    $(message.set_nrs_field(nrs_field::$nrs_field, $nrs_arg);)*
                    $(message.set_field(field::$field, $arg);)*
                }
            }
        )*

        /// Check that a message of a built-in type carries its whole
        /// standard field set.  Messages of other types always pass.
        pub fn validate(message: &Message) -> Result<(), FieldNotFound> {
            match message.msg_type() {
                $(
                    message_type::$msg_type => {
                        $(message.check_nrs_field(nrs_field::$nrs_field)?;)*
                        $(message.check_field(field::$field)?;)*
                        Ok(())
                    }
                )*
                _ => Ok(()),
            }
        }
    };
}

message_builders! {
    /// `AcknowledgeMessage`
    AcknowledgeMessage => ACKNOWLEDGE_MESSAGE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [ack_msg_id: ACK_MSG_ID],
    }
    /// `CreateLink`
    CreateLink => CREATE_LINK {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [source_not_target: SOURCE_NOT_TARGET, cid: CID, vnid: VNID, temporary: TEMPORARY],
    }
    /// `CreateLogLink`
    CreateLogLink => CREATE_LOG_LINK {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [cid: CID, log_port: LOG_PORT, vnid: VNID],
    }
    /// `CreateNode`
    CreateNode => CREATE_NODE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [vn_type: VN_TYPE, vn_name: VN_NAME, vnid: VNID],
    }
    /// `DeleteLink`
    DeleteLink => DELETE_LINK {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [source_not_target: SOURCE_NOT_TARGET, cid: CID, vnid: VNID],
    }
    /// `DeleteLogLink`
    DeleteLogLink => DELETE_LOG_LINK {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [cid: CID, log_port: LOG_PORT, vnid: VNID],
    }
    /// `DeleteNode`
    DeleteNode => DELETE_NODE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [],
    }
    /// `Error`
    Error => ERROR {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [priority: PRIORITY, error_id: ERROR_ID, error_string: ERROR_STRING],
    }
    /// `FailedRoute`
    FailedRoute => FAILED_ROUTE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [failed_route: FAILED_ROUTE],
    }
    /// `QueryCID`
    QueryCid => QUERY_CID {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryCSL`
    QueryCsl => QUERY_CSL {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryCType`
    QueryCType => QUERY_CTYPE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryConnectedCIDs`
    QueryConnectedCids => QUERY_CONNECTED_CIDS {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID, port: PORT],
    }
    /// `QueryLanguage`
    QueryLanguage => QUERY_LANGUAGE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryLink`
    QueryLink => QUERY_LINK {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [
            return_route: RETURN_ROUTE,
            return_to_vnid: RETURN_TO_VNID,
            msg_id: MSG_ID,
            vnid: VNID,
            source_not_target: SOURCE_NOT_TARGET,
            link: LINK,
        ],
    }
    /// `QueryLog`
    QueryLog => QUERY_LOG {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [
            return_route: RETURN_ROUTE,
            return_to_vnid: RETURN_TO_VNID,
            msg_id: MSG_ID,
            log_port: LOG_PORT,
            link: LINK,
        ],
    }
    /// `QueryMaxConnection`
    QueryMaxConnection => QUERY_MAX_CONNECTION {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryMaxLink`
    QueryMaxLink => QUERY_MAX_LINK {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryMaxLog`
    QueryMaxLog => QUERY_MAX_LOG {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryMaxPort`
    QueryMaxPort => QUERY_MAX_PORT {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryMaxVNID`
    QueryMaxVnid => QUERY_MAX_VNID {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID],
    }
    /// `QueryNumberType`
    QueryNumberType => QUERY_NUMBER_TYPE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID, vnid: VNID],
    }
    /// `QueryPort`
    QueryPort => QUERY_PORT {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID, port: PORT],
    }
    /// `QueryRoute`
    QueryRoute => QUERY_ROUTE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [
            return_route: RETURN_ROUTE,
            return_to_vnid: RETURN_TO_VNID,
            msg_id: MSG_ID,
            forward_route: FORWARD_ROUTE,
            translation_count: TRANSLATION_COUNT,
        ],
    }
    /// `QueryVNID`
    QueryVnid => QUERY_VNID {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID, vn_name: VN_NAME],
    }
    /// `QueryVNName`
    QueryVnName => QUERY_VNNAME {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID, vnid: VNID],
    }
    /// `QueryVNType`
    QueryVnType => QUERY_VNTYPE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [return_route: RETURN_ROUTE, return_to_vnid: RETURN_TO_VNID, msg_id: MSG_ID, vnid: VNID],
    }
    /// `ReplyCID`
    ReplyCid => REPLY_CID {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, cid: CID],
    }
    /// `ReplyCSL`; the CSL document itself travels in the message's aux data
    ReplyCsl => REPLY_CSL {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID],
    }
    /// `ReplyCType`
    ReplyCType => REPLY_CTYPE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, c_type: CTYPE, c_version: CVERSION],
    }
    /// `ReplyConnectedCIDs`; `cids` is a space separated list
    ReplyConnectedCids => REPLY_CONNECTED_CIDS {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, cids: CIDS],
    }
    /// `ReplyLanguage`
    ReplyLanguage => REPLY_LANGUAGE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, pml_version: PML_VERSION, csl_version: CSL_VERSION],
    }
    /// `ReplyLink`
    ReplyLink => REPLY_LINK {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, cid: CID, vnid: VNID, temporary: TEMPORARY],
    }
    /// `ReplyLog`
    ReplyLog => REPLY_LOG {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, cid: CID, vnid: VNID],
    }
    /// `ReplyMaxConnection`
    ReplyMaxConnection => REPLY_MAX_CONNECTION {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, n: N],
    }
    /// `ReplyMaxLink`
    ReplyMaxLink => REPLY_MAX_LINK {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, n: N],
    }
    /// `ReplyMaxLog`
    ReplyMaxLog => REPLY_MAX_LOG {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, n: N],
    }
    /// `ReplyMaxPort`
    ReplyMaxPort => REPLY_MAX_PORT {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, n: N],
    }
    /// `ReplyMaxVNID`
    ReplyMaxVnid => REPLY_MAX_VNID {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, n: N],
    }
    /// `ReplyNumberType`
    ReplyNumberType => REPLY_NUMBER_TYPE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, number_type: NUMBER_TYPE, bits: BITS],
    }
    /// `ReplyPort`
    ReplyPort => REPLY_PORT {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, port: PORT, cid: CID],
    }
    /// `ReplyRoute`
    ReplyRoute => REPLY_ROUTE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [
            reply_msg_id: REPLY_MSG_ID,
            forward_route: FORWARD_ROUTE,
            return_route: RETURN_ROUTE,
            translation_count: TRANSLATION_COUNT,
        ],
    }
    /// `ReplyVNID`
    ReplyVnid => REPLY_VNID {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, vnid: VNID],
    }
    /// `ReplyVNName`
    ReplyVnName => REPLY_VNNAME {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, vn_name: VN_NAME],
    }
    /// `ReplyVNType`
    ReplyVnType => REPLY_VNTYPE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [reply_msg_id: REPLY_MSG_ID, vn_type: VN_TYPE],
    }
    /// `Reset`
    Reset => RESET {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [],
    }
    /// `SetErrorRoute`
    SetErrorRoute => SET_ERROR_ROUTE {
        nrs: [route: ROUTE, to_vnid: TO_VNID],
        pml: [min_priority: MIN_PRIORITY, error_route: ERROR_ROUTE, error_to_vnid: ERROR_TO_VNID],
    }
}
