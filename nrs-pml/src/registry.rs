//!
//! The PML Element Registry.
//!
//! The set of element names the decoder turns into messages.  It starts
//! out holding every built-in message type; components add the message
//! types their variables understand with [`ElementRegistry::register`].
//!

use std::collections::HashSet;

use nrs_core::constants::message_type;

/// The message types a decoder recognises.
#[derive(Clone, Debug)]
pub struct ElementRegistry {
    /// The registered element names
    names: HashSet<String>,
}

impl ElementRegistry {
    /// A registry holding the built-in message types
    pub fn new() -> Self {
        Self {
            names: message_type::ALL.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// A registry that recognises nothing
    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    /// Recognise another message type.  Returns false if it was already
    /// registered.
    pub fn register(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Stop recognising a message type
    pub fn deregister(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    /// Whether a name is a registered message type
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// The number of registered message types
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no message types are registered
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = ElementRegistry::new();
        assert_eq!(registry.len(), message_type::ALL.len());
        assert!(registry.contains("CreateNode"));
        assert!(registry.contains("ReplyMaxLink"));
        assert!(!registry.contains("createnode"));
        assert!(!registry.contains("Float"));
    }

    #[test]
    fn test_register_and_deregister() {
        let mut registry = ElementRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.register("Float"));
        assert!(!registry.register("Float"));
        assert!(registry.contains("Float"));
        assert!(registry.deregister("Float"));
        assert!(!registry.contains("Float"));
    }
}
