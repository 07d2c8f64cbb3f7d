//!
//! How forgiving the decoder is.
//!
//! Both defaults are permissive: a field in a namespace the decoder does
//! not know is dropped with a warning and the rest of the message is
//! delivered, and an element that is not a registered message type is
//! skipped with a warning.
//!

use serde::Deserialize;

/// What to do with an attribute in an unrecognised namespace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespacePolicy {
    /// Drop the field and keep the message
    #[default]
    Drop,
    /// Drop the whole message
    Reject,
}

/// What to do with an element that is not a registered message type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementPolicy {
    /// Skip it silently (trace level only)
    Ignore,
    /// Skip it and log a warning
    #[default]
    Warn,
}

/// The decoder's strictness settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecoderPolicy {
    /// See [`NamespacePolicy`]
    pub unknown_namespace: NamespacePolicy,
    /// See [`ElementPolicy`]
    pub unknown_element: ElementPolicy,
}
