//!
//! Errors shared by every NRS crate.
//!

use std::io;

use thiserror::Error;

use crate::{route::PortId, variable::Vnid};

/// A required field was absent from a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("field `{field}` not found in {message_type} message")]
pub struct FieldNotFound {
    /// The name of the missing field
    pub field: String,
    /// The type of the message that lacked it
    pub message_type: String,
}

/// Why a variable or node refused a delivered message.
#[derive(Debug, Error)]
pub enum DeliverError {
    /// The message lacked a field the handler cannot proceed without
    #[error(transparent)]
    MissingField(#[from] FieldNotFound),
    /// A field was present but its value could not be interpreted
    #[error("field `{field}` has invalid value `{value}`")]
    InvalidField {
        /// The name of the offending field
        field: String,
        /// The raw value on the wire
        value: String,
    },
    /// The sender violated the contract of the handler (e.g. an empty
    /// mandatory field); this is a caller-side error, not a runtime fault
    #[error("configuration error: {reason}")]
    Configuration {
        /// What was wrong with the request
        reason: String,
    },
    /// The message type did not match the variable and strict checking
    /// is enabled
    #[error("{message_type} message refused by {vn_type} variable {vnid}")]
    TypeMismatch {
        /// The VNID of the refusing variable
        vnid: Vnid,
        /// The type of the message
        message_type: String,
        /// The type of the variable
        vn_type: String,
    },
    /// The handler's side effect failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl DeliverError {
    /// Build an [`DeliverError::InvalidField`].
    pub fn invalid_field(field: &str, value: &str) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Build a [`DeliverError::Configuration`].
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

/// A route string or port number could not be used.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// A character of a route string is not a port token
    #[error("invalid route token `{0}`")]
    InvalidToken(char),
    /// The port number cannot be expressed as a route token
    #[error("port {0} is out of range")]
    PortOutOfRange(u32),
}

/// A route could not move bytes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// An io operation on the underlying socket failed
    #[error("io error on port {port}: {source}")]
    Io {
        /// The port the error happened on
        port: PortId,
        /// The underlying error
        #[source]
        source: io::Error,
    },
    /// The far end of the route has gone away
    #[error("port {0} is disconnected")]
    Disconnected(PortId),
}
