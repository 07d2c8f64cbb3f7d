//!
//! Variables.
//!
//! A variable is one addressable endpoint of a component: it has a
//! process-unique VNID, a hierarchical name and a kind that decides which
//! messages it understands and what it does with them.
//!

use std::fmt;

use crate::{error::DeliverError, message::Message};

/// Variable Numeric ID.  Zero is reserved for "resolve by name".
pub type Vnid = u32;

/// The concrete kinds of variable a component can host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Holds a `true`/`false` value
    Boolean,
    /// Holds a 64-bit floating point value
    Float,
    /// Holds a 64-bit signed integer value
    Integer,
    /// Holds a string
    String,
    /// Holds nothing; receiving a message is the event
    Void,
    /// Appends received data to a file
    FileWriter,
}

impl VariableKind {
    /// Every kind of variable.
    pub const ALL: [VariableKind; 6] = [
        VariableKind::Boolean,
        VariableKind::Float,
        VariableKind::Integer,
        VariableKind::String,
        VariableKind::Void,
        VariableKind::FileWriter,
    ];

    /// The type name of the variable, which is also the type of the
    /// messages it expects
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Float => "Float",
            Self::Integer => "Integer",
            Self::String => "String",
            Self::Void => "Void",
            Self::FileWriter => "FileWriter",
        }
    }

    /// Look a kind up by its type name
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    /// How the variable represents numbers, as reported by
    /// `ReplyNumberType`: a type name and a bit width
    pub fn number_type(&self) -> Option<(&'static str, u32)> {
        match self {
            Self::Float => Some(("float", 64)),
            Self::Integer => Some(("integer", 64)),
            Self::Boolean => Some(("boolean", 1)),
            _ => None,
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The current value of a variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// See [`VariableKind::Boolean`]
    Boolean(bool),
    /// See [`VariableKind::Float`]
    Float(f64),
    /// See [`VariableKind::Integer`]
    Integer(i64),
    /// See [`VariableKind::String`] and [`VariableKind::FileWriter`]
    String(String),
    /// See [`VariableKind::Void`]
    Void,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Void => Ok(()),
        }
    }
}

/// An addressable endpoint inside a component.
pub trait Variable: Send {
    /// The VNID the variable is registered under
    fn vnid(&self) -> Vnid;

    /// The full hierarchical name of the variable
    fn vn_name(&self) -> &str;

    /// The kind of the variable
    fn kind(&self) -> VariableKind;

    /// The variable's current value
    fn value(&self) -> Value;

    /// Handle a message addressed to this variable.
    ///
    /// Required fields should be pulled out with [`Message::check_field`]
    /// so that a missing field surfaces as [`DeliverError::MissingField`].
    fn deliver(&mut self, message: &Message) -> Result<(), DeliverError>;

    /// Whether a message's type differs from the type this variable
    /// expects.  The comparison is case-sensitive.
    fn is_diff(&self, message: &Message) -> bool {
        message.msg_type() != self.kind().type_name()
    }
}
