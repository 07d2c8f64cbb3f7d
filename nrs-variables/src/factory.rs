//!
//! The Node Factory.
//!
//! `CreateNode` names the type of the thing to create.  The factory keeps
//! the table that turns that name into concrete objects: one constructor
//! per [`VariableKind`] and any number of [`NodeType`]s, each listing the
//! variables a node of that type is made of.
//!
//! Creating a variable kind directly (`vnType="Float"`) yields a single
//! variable.  Creating a node type yields the node plus its variables,
//! which are numbered consecutively after the node's own VNID and named
//! `<node name>.<suffix>`.
//!

use std::collections::HashMap;

use nrs_core::{Variable, VariableKind, Vnid};

use crate::{
    error::{DispatchError, RegisterError},
    kinds::{
        BooleanVariable, FileWriterVariable, FloatVariable, IntegerVariable, StringVariable,
        VoidVariable,
    },
    manager::Node,
};

/// Builds a variable of one kind from its VNID and name.
pub type Constructor = fn(Vnid, String) -> Box<dyn Variable>;

/// A named node layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeType {
    /// The `vnType` that selects this layout
    pub name: String,
    /// The variables of the node as (name suffix, kind), in VNID order
    pub variables: Vec<(String, VariableKind)>,
}

impl NodeType {
    /// Create a node type without variables
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
        }
    }

    /// Add a variable to the layout
    pub fn with_variable(mut self, suffix: impl Into<String>, kind: VariableKind) -> Self {
        self.variables.push((suffix.into(), kind));
        self
    }
}

/// What the factory built for one `CreateNode`.
pub enum Blueprint {
    /// A lone variable
    Variable(Box<dyn Variable>),
    /// A node and the variables inside it
    Node {
        /// The node
        node: Node,
        /// Its variables
        variables: Vec<Box<dyn Variable>>,
    },
}

/// The table of everything a component can create.
pub struct NodeFactory {
    /// One constructor per variable kind
    constructors: HashMap<VariableKind, Constructor>,
    /// Registered node layouts by name
    node_types: HashMap<String, NodeType>,
}

impl NodeFactory {
    /// A factory that can build every built-in variable kind
    pub fn new() -> Self {
        let mut factory = Self {
            constructors: HashMap::new(),
            node_types: HashMap::new(),
        };
        factory.register_kind(VariableKind::Boolean, |vnid, name| {
            Box::new(BooleanVariable::new(vnid, name))
        });
        factory.register_kind(VariableKind::Float, |vnid, name| {
            Box::new(FloatVariable::new(vnid, name))
        });
        factory.register_kind(VariableKind::Integer, |vnid, name| {
            Box::new(IntegerVariable::new(vnid, name))
        });
        factory.register_kind(VariableKind::String, |vnid, name| {
            Box::new(StringVariable::new(vnid, name))
        });
        factory.register_kind(VariableKind::Void, |vnid, name| {
            Box::new(VoidVariable::new(vnid, name))
        });
        factory.register_kind(VariableKind::FileWriter, |vnid, name| {
            Box::new(FileWriterVariable::new(vnid, name))
        });
        factory
    }

    /// Replace the constructor used for a variable kind
    pub fn register_kind(&mut self, kind: VariableKind, constructor: Constructor) {
        self.constructors.insert(kind, constructor);
    }

    /// Add (or replace) a node layout
    pub fn register_node_type(&mut self, node_type: NodeType) {
        self.node_types.insert(node_type.name.clone(), node_type);
    }

    /// Whether `vn_type` names something the factory can build
    pub fn knows(&self, vn_type: &str) -> bool {
        self.node_types.contains_key(vn_type)
            || VariableKind::from_type_name(vn_type)
                .is_some_and(|kind| self.constructors.contains_key(&kind))
    }

    /// The variable kinds the factory can build.  These are also the
    /// message types that carry a variable's value.
    pub fn variable_kinds(&self) -> impl Iterator<Item = VariableKind> + '_ {
        self.constructors.keys().copied()
    }

    /// Build the objects for a `CreateNode`.  Node types take precedence
    /// over variable kinds.
    ///
    /// A node whose variables would be numbered past the largest VNID is
    /// out of range.
    pub fn build(&self, vn_type: &str, vnid: Vnid, vn_name: &str) -> Result<Blueprint, DispatchError> {
        let unknown = || DispatchError::UnknownNodeType(vn_type.to_string());

        if let Some(node_type) = self.node_types.get(vn_type) {
            let count = Vnid::try_from(node_type.variables.len()).unwrap_or(Vnid::MAX);
            if vnid.checked_add(count).is_none() {
                return Err(RegisterError::OutOfRange {
                    vnid,
                    max: Vnid::MAX - count,
                }
                .into());
            }

            let mut variables = Vec::with_capacity(node_type.variables.len());
            for (offset, (suffix, kind)) in node_type.variables.iter().enumerate() {
                let constructor = self.constructors.get(kind).ok_or_else(unknown)?;
                let child_vnid = vnid + offset as Vnid + 1;
                variables.push(constructor(child_vnid, format!("{vn_name}.{suffix}")));
            }
            return Ok(Blueprint::Node {
                node: Node::new(vnid, vn_name, vn_type),
                variables,
            });
        }

        let constructor = VariableKind::from_type_name(vn_type)
            .and_then(|kind| self.constructors.get(&kind))
            .ok_or_else(unknown)?;
        Ok(Blueprint::Variable(constructor(vnid, vn_name.to_string())))
    }
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_every_kind() {
        let factory = NodeFactory::new();
        for kind in VariableKind::ALL {
            assert!(factory.knows(kind.type_name()));
            match factory.build(kind.type_name(), 9, "root.v") {
                Ok(Blueprint::Variable(variable)) => {
                    assert_eq!(variable.kind(), kind);
                    assert_eq!(variable.vnid(), 9);
                    assert_eq!(variable.vn_name(), "root.v");
                }
                _ => panic!("{kind} should build a variable"),
            }
        }
        assert!(!factory.knows("Neuron"));
        assert!(matches!(
            factory.build("Neuron", 9, "root.n"),
            Err(DispatchError::UnknownNodeType(name)) if name == "Neuron"
        ));
    }

    #[test]
    fn test_node_type_numbers_variables_after_the_node() {
        let mut factory = NodeFactory::new();
        factory.register_node_type(
            NodeType::new("Joint")
                .with_variable("angle", VariableKind::Float)
                .with_variable("locked", VariableKind::Boolean),
        );

        let Ok(Blueprint::Node { node, variables }) = factory.build("Joint", 40, "arm.elbow")
        else {
            panic!("Joint should build a node");
        };
        assert_eq!(node.vnid(), 40);
        assert_eq!(node.vn_type(), "Joint");
        let layout: Vec<(Vnid, &str, VariableKind)> = variables
            .iter()
            .map(|v| (v.vnid(), v.vn_name(), v.kind()))
            .collect();
        assert_eq!(
            layout,
            [
                (41, "arm.elbow.angle", VariableKind::Float),
                (42, "arm.elbow.locked", VariableKind::Boolean)
            ]
        );
    }

    #[test]
    fn test_node_numbered_past_the_last_vnid_is_out_of_range() {
        let mut factory = NodeFactory::new();
        factory.register_node_type(
            NodeType::new("Joint")
                .with_variable("angle", VariableKind::Float)
                .with_variable("locked", VariableKind::Boolean),
        );

        let vnid = Vnid::MAX - rand::random::<Vnid>() % 2;
        match factory.build("Joint", vnid, "arm.elbow") {
            Err(DispatchError::Register(RegisterError::OutOfRange { vnid: got, max })) => {
                assert_eq!(got, vnid);
                assert_eq!(max, Vnid::MAX - 2);
            }
            Err(err) => panic!("expected out of range, got {err}"),
            Ok(_) => panic!("expected out of range, got a blueprint"),
        }
        assert!(factory.build("Joint", Vnid::MAX - 2, "arm.wrist").is_ok());
    }
}
