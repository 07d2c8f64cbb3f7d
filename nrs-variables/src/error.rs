//!
//! Addressing and dispatch errors.
//!
//! None of these ever reach a route's read loop: the dispatcher logs them,
//! optionally reports them along the component's error route and drops
//! the message that caused them.
//!

use nrs_core::{DeliverError, FieldNotFound, Vnid};
use thiserror::Error;

/// A node or variable could not be registered.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// VNID 0 means "resolve by name" and can never be registered
    #[error("vnid 0 is reserved for intelligent routing")]
    Reserved,
    /// The VNID is above the component's maximum
    #[error("vnid {vnid} exceeds the maximum of {max}")]
    OutOfRange {
        /// The requested VNID
        vnid: Vnid,
        /// The largest VNID the component hands out
        max: Vnid,
    },
    /// Something is already registered under the VNID
    #[error("vnid {0} is already registered")]
    VnidInUse(Vnid),
    /// Something is already registered under the name
    #[error("name `{0}` is already registered")]
    NameInUse(String),
    /// The parent is not a registered node
    #[error("parent {0} is not a registered node")]
    UnknownParent(Vnid),
}

/// Why the dispatcher dropped a message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The target variable refused the message
    #[error(transparent)]
    Deliver(#[from] DeliverError),
    /// A create could not be registered
    #[error(transparent)]
    Register(#[from] RegisterError),
    /// `toVNID` is not a number
    #[error("`{0}` is not a valid vnid")]
    InvalidVnid(String),
    /// No node or variable has the VNID
    #[error("no node or variable has vnid {0}")]
    UnknownVnid(Vnid),
    /// No node or variable has the name an intelligent message asked for
    #[error("no node or variable is named `{0}`")]
    UnknownName(String),
    /// An intelligent message named another component
    #[error("message is intended for component `{0}`")]
    ForeignComponent(String),
    /// `CreateNode` asked for a type the factory cannot build
    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),
    /// The target does not handle messages of this type
    #[error("{message_type} is not supported by {vnid}")]
    Unsupported {
        /// The type of the message
        message_type: String,
        /// The VNID it was addressed to
        vnid: Vnid,
    },
    /// The variable already has as many links as the component allows
    #[error("variable {vnid} already has the maximum of {max} links")]
    LinkLimit {
        /// The variable
        vnid: Vnid,
        /// The configured maximum
        max: u32,
    },
}

impl From<FieldNotFound> for DispatchError {
    fn from(err: FieldNotFound) -> Self {
        Self::Deliver(err.into())
    }
}

impl DispatchError {
    /// The priority the error is reported with on the error route.
    /// Higher is more severe.
    pub fn priority(&self) -> u32 {
        match self {
            Self::Deliver(DeliverError::Io(_)) => 4,
            Self::Deliver(DeliverError::Configuration { .. }) => 3,
            Self::Deliver(DeliverError::TypeMismatch { .. }) | Self::Unsupported { .. } => 1,
            Self::ForeignComponent(_) => 1,
            _ => 2,
        }
    }

    /// The numeric identifier sent as `errorID`
    pub fn error_id(&self) -> u32 {
        match self {
            Self::Deliver(DeliverError::MissingField(_)) => 1,
            Self::Deliver(DeliverError::InvalidField { .. }) => 2,
            Self::Deliver(DeliverError::Configuration { .. }) => 3,
            Self::Deliver(DeliverError::TypeMismatch { .. }) => 4,
            Self::Deliver(DeliverError::Io(_)) => 5,
            Self::Register(_) => 6,
            Self::InvalidVnid(_) => 7,
            Self::UnknownVnid(_) => 8,
            Self::UnknownName(_) => 9,
            Self::ForeignComponent(_) => 10,
            Self::UnknownNodeType(_) => 11,
            Self::Unsupported { .. } => 12,
            Self::LinkLimit { .. } => 13,
        }
    }
}
