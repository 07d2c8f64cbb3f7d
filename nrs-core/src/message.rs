//!
//! The NRS Message.
//!
//! A message is a type name plus two independent string maps: the PML
//! fields that make up its payload and the NRS fields that carry routing
//! and addressing information (`route`, `toVNID`, ...).  The two maps
//! never share storage, so a PML field and an NRS field may have the same
//! name without interfering with each other.
//!
//! A message performs no coercion of its own; callers that need a number
//! parse the string they get back and report a malformed value themselves.
//!

use std::collections::HashMap;

use crate::{error::FieldNotFound, route::PortId};

/// Which way a message is travelling through its component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Decoded from a route and heading for a variable
    Inbound,
    /// Built by the component and heading for a route
    #[default]
    Outbound,
}

/// A CSL document nested inside a `ReplyCSL` message.
///
/// The document is kept verbatim together with the names of its
/// top-level elements; interpreting it is left to the receiver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CslPayload {
    /// The raw markup found between the `ReplyCSL` tags
    pub source: String,
    /// Local names of the top-level CSL elements, in document order
    pub elements: Vec<String>,
}

/// Metadata that travels with a message but is never put on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aux {
    /// The port the message was received on, if it came from a route
    pub received_port: Option<PortId>,
    /// The port an outbound message has been routed to
    pub output_port: Option<PortId>,
    /// Which way the message is travelling
    pub direction: Direction,
    /// The nested CSL document of a `ReplyCSL` message
    pub csl: Option<CslPayload>,
}

/// The structured, field-addressable unit of NRS communication.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// The message type (and PML element name)
    msg_type: String,
    /// PML-namespace fields
    fields: HashMap<String, String>,
    /// NRS-namespace fields
    nrs_fields: HashMap<String, String>,
    /// Out-of-band metadata
    aux: Aux,
}

impl Message {
    /// Create an empty message of a given type
    pub fn new(msg_type: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            ..Default::default()
        }
    }

    /// The type of the message
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    /// Set the type of the message
    pub fn set_type(&mut self, msg_type: impl Into<String>) {
        self.msg_type = msg_type.into();
    }

    /// Set a PML field, replacing any previous value
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Set an NRS field, replacing any previous value
    pub fn set_nrs_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.nrs_fields.insert(name.into(), value.into());
    }

    /// Builder-style [`Message::set_field`]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Builder-style [`Message::set_nrs_field`]
    pub fn with_nrs_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_nrs_field(name, value);
        self
    }

    /// Get a PML field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Get an NRS field
    pub fn nrs_field(&self, name: &str) -> Option<&str> {
        self.nrs_fields.get(name).map(String::as_str)
    }

    /// Get a PML field the caller cannot do without
    pub fn check_field(&self, name: &str) -> Result<&str, FieldNotFound> {
        self.field(name).ok_or_else(|| self.not_found(name))
    }

    /// Get an NRS field the caller cannot do without
    pub fn check_nrs_field(&self, name: &str) -> Result<&str, FieldNotFound> {
        self.nrs_field(name).ok_or_else(|| self.not_found(name))
    }

    /// Whether a PML field is present
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Whether an NRS field is present
    pub fn has_nrs_field(&self, name: &str) -> bool {
        self.nrs_fields.contains_key(name)
    }

    /// Remove a PML field, returning its value
    pub fn remove_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// Remove an NRS field, returning its value
    pub fn remove_nrs_field(&mut self, name: &str) -> Option<String> {
        self.nrs_fields.remove(name)
    }

    /// Iterate over the PML fields in no particular order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over the NRS fields in no particular order
    pub fn nrs_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nrs_fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Empty both field maps, the type and the metadata so the message can
    /// be reused
    pub fn clear(&mut self) {
        self.msg_type.clear();
        self.fields.clear();
        self.nrs_fields.clear();
        self.aux = Aux::default();
    }

    /// The out-of-band metadata of the message
    pub fn aux(&self) -> &Aux {
        &self.aux
    }

    /// Mutable access to the out-of-band metadata of the message
    pub fn aux_mut(&mut self) -> &mut Aux {
        &mut self.aux
    }

    fn not_found(&self, name: &str) -> FieldNotFound {
        FieldNotFound {
            field: name.to_string(),
            message_type: self.msg_type.clone(),
        }
    }
}
