//!
//! The closed vocabulary of the NRS wire protocol.
//!
//! Everything in here is data: the namespaces the PML decoder classifies
//! attributes against, the names of the message types a component
//! understands out of the box and the field names those messages carry.
//! Adding a message type means adding a name here (or registering one at
//! runtime with the element registry) and a builder in [`crate::messages`].
//!

/// XML namespace URIs used on the wire.
pub mod namespace {
    /// Namespace of ordinary PML message fields.
    pub const PML: &str = "http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/pml/1.0/";
    /// Namespace of CSL capability descriptions.
    pub const CSL: &str = "http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/csl/1.0/";
    /// Namespace of DNL network descriptions.
    pub const DNL: &str = "http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/dnl/1.0/";
    /// Namespace of NRS routing and addressing attributes.
    pub const NRSA: &str = "http://www.ipab.inf.ed.ac.uk/cricketlab/nrs/attributes/1.0/";
    /// Conventional prefix bound to [`NRSA`].
    pub const NRSA_PREFIX: &str = "nrsa";
}

/// Message type names, which double as the PML element names.
pub mod message_type {
    /// Acknowledgement of a message sent with `ackMsg`.
    pub const ACKNOWLEDGE_MESSAGE: &str = "AcknowledgeMessage";
    /// Create a link between two variables.
    pub const CREATE_LINK: &str = "CreateLink";
    /// Create a log link from a variable to a log port.
    pub const CREATE_LOG_LINK: &str = "CreateLogLink";
    /// Create a node beneath the addressed node.
    pub const CREATE_NODE: &str = "CreateNode";
    /// Delete a link between two variables.
    pub const DELETE_LINK: &str = "DeleteLink";
    /// Delete a log link.
    pub const DELETE_LOG_LINK: &str = "DeleteLogLink";
    /// Delete the addressed node.
    pub const DELETE_NODE: &str = "DeleteNode";
    /// An error report.
    pub const ERROR: &str = "Error";
    /// A message could not be routed.
    pub const FAILED_ROUTE: &str = "FailedRoute";
    /// Ask for a component's CID.
    pub const QUERY_CID: &str = "QueryCID";
    /// Ask for a component's CSL description.
    pub const QUERY_CSL: &str = "QueryCSL";
    /// Ask for a component's type and version.
    pub const QUERY_CTYPE: &str = "QueryCType";
    /// Ask which components are reachable from a port.
    pub const QUERY_CONNECTED_CIDS: &str = "QueryConnectedCIDs";
    /// Ask which language versions a component speaks.
    pub const QUERY_LANGUAGE: &str = "QueryLanguage";
    /// Ask for one link of a variable.
    pub const QUERY_LINK: &str = "QueryLink";
    /// Ask for one log link of a log port.
    pub const QUERY_LOG: &str = "QueryLog";
    /// Ask for the maximum number of connections.
    pub const QUERY_MAX_CONNECTION: &str = "QueryMaxConnection";
    /// Ask for the maximum number of links.
    pub const QUERY_MAX_LINK: &str = "QueryMaxLink";
    /// Ask for the maximum number of log ports.
    pub const QUERY_MAX_LOG: &str = "QueryMaxLog";
    /// Ask for the maximum number of ports.
    pub const QUERY_MAX_PORT: &str = "QueryMaxPort";
    /// Ask for the maximum VNID.
    pub const QUERY_MAX_VNID: &str = "QueryMaxVNID";
    /// Ask how a variable represents numbers.
    pub const QUERY_NUMBER_TYPE: &str = "QueryNumberType";
    /// Ask about one of the component's ports.
    pub const QUERY_PORT: &str = "QueryPort";
    /// Ask for the forward and return route to a component.
    pub const QUERY_ROUTE: &str = "QueryRoute";
    /// Ask for the VNID of a named variable.
    pub const QUERY_VNID: &str = "QueryVNID";
    /// Ask for the name of a VNID.
    pub const QUERY_VNNAME: &str = "QueryVNName";
    /// Ask for the type of a VNID.
    pub const QUERY_VNTYPE: &str = "QueryVNType";
    /// Reply to [`QUERY_CID`].
    pub const REPLY_CID: &str = "ReplyCID";
    /// Reply to [`QUERY_CSL`]; carries a nested CSL document.
    pub const REPLY_CSL: &str = "ReplyCSL";
    /// Reply to [`QUERY_CTYPE`].
    pub const REPLY_CTYPE: &str = "ReplyCType";
    /// Reply to [`QUERY_CONNECTED_CIDS`].
    pub const REPLY_CONNECTED_CIDS: &str = "ReplyConnectedCIDs";
    /// Reply to [`QUERY_LANGUAGE`].
    pub const REPLY_LANGUAGE: &str = "ReplyLanguage";
    /// Reply to [`QUERY_LINK`].
    pub const REPLY_LINK: &str = "ReplyLink";
    /// Reply to [`QUERY_LOG`].
    pub const REPLY_LOG: &str = "ReplyLog";
    /// Reply to [`QUERY_MAX_CONNECTION`].
    pub const REPLY_MAX_CONNECTION: &str = "ReplyMaxConnection";
    /// Reply to [`QUERY_MAX_LINK`].
    pub const REPLY_MAX_LINK: &str = "ReplyMaxLink";
    /// Reply to [`QUERY_MAX_LOG`].
    pub const REPLY_MAX_LOG: &str = "ReplyMaxLog";
    /// Reply to [`QUERY_MAX_PORT`].
    pub const REPLY_MAX_PORT: &str = "ReplyMaxPort";
    /// Reply to [`QUERY_MAX_VNID`].
    pub const REPLY_MAX_VNID: &str = "ReplyMaxVNID";
    /// Reply to [`QUERY_NUMBER_TYPE`].
    pub const REPLY_NUMBER_TYPE: &str = "ReplyNumberType";
    /// Reply to [`QUERY_PORT`].
    pub const REPLY_PORT: &str = "ReplyPort";
    /// Reply to [`QUERY_ROUTE`].
    pub const REPLY_ROUTE: &str = "ReplyRoute";
    /// Reply to [`QUERY_VNID`].
    pub const REPLY_VNID: &str = "ReplyVNID";
    /// Reply to [`QUERY_VNNAME`].
    pub const REPLY_VNNAME: &str = "ReplyVNName";
    /// Reply to [`QUERY_VNTYPE`].
    pub const REPLY_VNTYPE: &str = "ReplyVNType";
    /// Remove every node the component created.
    pub const RESET: &str = "Reset";
    /// Set where error messages are sent.
    pub const SET_ERROR_ROUTE: &str = "SetErrorRoute";

    /// Every built-in message type.
    pub const ALL: &[&str] = &[
        ACKNOWLEDGE_MESSAGE,
        CREATE_LINK,
        CREATE_LOG_LINK,
        CREATE_NODE,
        DELETE_LINK,
        DELETE_LOG_LINK,
        DELETE_NODE,
        ERROR,
        FAILED_ROUTE,
        QUERY_CID,
        QUERY_CSL,
        QUERY_CTYPE,
        QUERY_CONNECTED_CIDS,
        QUERY_LANGUAGE,
        QUERY_LINK,
        QUERY_LOG,
        QUERY_MAX_CONNECTION,
        QUERY_MAX_LINK,
        QUERY_MAX_LOG,
        QUERY_MAX_PORT,
        QUERY_MAX_VNID,
        QUERY_NUMBER_TYPE,
        QUERY_PORT,
        QUERY_ROUTE,
        QUERY_VNID,
        QUERY_VNNAME,
        QUERY_VNTYPE,
        REPLY_CID,
        REPLY_CSL,
        REPLY_CTYPE,
        REPLY_CONNECTED_CIDS,
        REPLY_LANGUAGE,
        REPLY_LINK,
        REPLY_LOG,
        REPLY_MAX_CONNECTION,
        REPLY_MAX_LINK,
        REPLY_MAX_LOG,
        REPLY_MAX_PORT,
        REPLY_MAX_VNID,
        REPLY_NUMBER_TYPE,
        REPLY_PORT,
        REPLY_ROUTE,
        REPLY_VNID,
        REPLY_VNNAME,
        REPLY_VNTYPE,
        RESET,
        SET_ERROR_ROUTE,
    ];
}

/// PML-namespace field names.
#[allow(missing_docs)]
pub mod field {
    pub const ACK_MSG_ID: &str = "ackMsgID";
    pub const BITS: &str = "bits";
    pub const CID: &str = "cid";
    pub const CIDS: &str = "cids";
    pub const CSL_VERSION: &str = "cslVersion";
    pub const CTYPE: &str = "cType";
    pub const CVERSION: &str = "cVersion";
    pub const DATA: &str = "data";
    pub const DIR_NAME: &str = "dirName";
    pub const ERROR_ID: &str = "errorID";
    pub const ERROR_ROUTE: &str = "errorRoute";
    pub const ERROR_STRING: &str = "errorString";
    pub const ERROR_TO_VNID: &str = "errorToVNID";
    pub const FAILED_ROUTE: &str = "failedRoute";
    pub const FILE_NAME: &str = "fileName";
    pub const FORWARD_ROUTE: &str = "forwardRoute";
    pub const LINK: &str = "link";
    pub const LOG_PORT: &str = "logPort";
    pub const MIN_PRIORITY: &str = "minPriority";
    pub const MSG_ID: &str = "msgID";
    pub const N: &str = "n";
    pub const NUMBER_TYPE: &str = "numberType";
    pub const PML_VERSION: &str = "pmlVersion";
    pub const PORT: &str = "port";
    pub const PRIORITY: &str = "priority";
    pub const REPLY_MSG_ID: &str = "replyMsgID";
    pub const RETURN_ROUTE: &str = "returnRoute";
    pub const RETURN_TO_VNID: &str = "returnToVNID";
    pub const SOURCE_NOT_TARGET: &str = "sourceNotTarget";
    pub const TEMPORARY: &str = "temporary";
    pub const TRANSLATION_COUNT: &str = "translationCount";
    pub const VALUE: &str = "value";
    pub const VNID: &str = "vnid";
    pub const VN_NAME: &str = "vnName";
    pub const VN_TYPE: &str = "vnType";
}

/// NRS-namespace (routing and addressing) field names.
#[allow(missing_docs)]
pub mod nrs_field {
    pub const ACK_MSG: &str = "ackMsg";
    pub const FROM_VNID: &str = "fromVNID";
    pub const HOP_COUNT: &str = "hopCount";
    pub const INTELLIGENT: &str = "intelligent";
    pub const I_TARGET_CID: &str = "iTargetCID";
    pub const I_TARGET_VNNAME: &str = "iTargetVNName";
    pub const MSG_ID: &str = "msgID";
    pub const ROUTE: &str = "route";
    pub const TO_VNID: &str = "toVNID";
}

/// The VNID that means "unspecified, resolve by name".
pub const INTELLIGENT_VNID: u32 = 0;

/// Language versions reported in `ReplyLanguage`.
pub const PML_VERSION: &str = "1.0";
/// See [`PML_VERSION`].
pub const CSL_VERSION: &str = "1.0";

/// The literal used for boolean fields on the wire.
pub const TRUE: &str = "true";
/// See [`TRUE`].
pub const FALSE: &str = "false";
