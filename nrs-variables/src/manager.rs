//!
//! The Variable Manager.
//!
//! Every node and variable of a component is registered here under its
//! VNID, which makes address-based dispatch a single map lookup.  Nodes
//! form a tree: each entry records its parent and every node records its
//! children, so deleting a node removes everything beneath it.
//!
//! Looking up an unknown VNID is routine (it is how duplicate creates are
//! detected) and simply returns `None`.
//!

use std::collections::HashMap;

use nrs_core::{Variable, Vnid};

use crate::{error::RegisterError, factory::Blueprint};

/// A container of variables and other nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// The VNID of the node
    vnid: Vnid,
    /// The full hierarchical name of the node
    vn_name: String,
    /// The node type it was created as
    vn_type: String,
    /// The VNIDs of the node's direct children
    children: Vec<Vnid>,
}

impl Node {
    /// Create a node without children
    pub fn new(vnid: Vnid, vn_name: impl Into<String>, vn_type: impl Into<String>) -> Self {
        Self {
            vnid,
            vn_name: vn_name.into(),
            vn_type: vn_type.into(),
            children: Vec::new(),
        }
    }

    /// The VNID of the node
    pub fn vnid(&self) -> Vnid {
        self.vnid
    }

    /// The name of the node
    pub fn vn_name(&self) -> &str {
        &self.vn_name
    }

    /// The type of the node
    pub fn vn_type(&self) -> &str {
        &self.vn_type
    }

    /// The VNIDs of the node's direct children, oldest first
    pub fn children(&self) -> &[Vnid] {
        &self.children
    }
}

/// Something registered under a VNID.
pub enum Entry {
    /// A node
    Node(Node),
    /// A variable
    Variable(Box<dyn Variable>),
}

impl Entry {
    /// The name the entry is registered under
    pub fn vn_name(&self) -> &str {
        match self {
            Self::Node(node) => node.vn_name(),
            Self::Variable(variable) => variable.vn_name(),
        }
    }

    /// The node type or variable kind of the entry
    pub fn vn_type(&self) -> &str {
        match self {
            Self::Node(node) => node.vn_type(),
            Self::Variable(variable) => variable.kind().type_name(),
        }
    }
}

struct Slot {
    parent: Option<Vnid>,
    entry: Entry,
}

/// The VNID to node/variable map of a component.
pub struct VariableManager {
    /// Every registered entry
    slots: HashMap<Vnid, Slot>,
    /// Name to VNID index
    names: HashMap<String, Vnid>,
    /// The largest VNID that may be registered
    max_vnid: Vnid,
}

impl VariableManager {
    /// Create an empty manager accepting VNIDs up to `max_vnid`
    pub fn new(max_vnid: Vnid) -> Self {
        Self {
            slots: HashMap::new(),
            names: HashMap::new(),
            max_vnid,
        }
    }

    /// The largest VNID that may be registered
    pub fn max_vnid(&self) -> Vnid {
        self.max_vnid
    }

    /// Register a variable, optionally beneath a node
    pub fn register(
        &mut self,
        variable: Box<dyn Variable>,
        parent: Option<Vnid>,
    ) -> Result<(), RegisterError> {
        self.check_parent(parent)?;
        self.check_free(variable.vnid(), variable.vn_name())?;
        self.insert(variable.vnid(), Entry::Variable(variable), parent);
        Ok(())
    }

    /// Register a node, optionally beneath another node
    pub fn register_node(&mut self, node: Node, parent: Option<Vnid>) -> Result<(), RegisterError> {
        self.check_parent(parent)?;
        self.check_free(node.vnid(), node.vn_name())?;
        self.insert(node.vnid(), Entry::Node(node), parent);
        Ok(())
    }

    /// Register everything a [`Blueprint`] describes, or nothing at all.
    ///
    /// Returns the VNIDs that were registered.
    pub fn install(
        &mut self,
        blueprint: Blueprint,
        parent: Option<Vnid>,
    ) -> Result<Vec<Vnid>, RegisterError> {
        self.check_parent(parent)?;
        match blueprint {
            Blueprint::Variable(variable) => {
                let vnid = variable.vnid();
                self.register(variable, parent)?;
                Ok(vec![vnid])
            }
            Blueprint::Node { node, variables } => {
                self.check_free(node.vnid(), node.vn_name())?;
                for (idx, variable) in variables.iter().enumerate() {
                    self.check_free(variable.vnid(), variable.vn_name())?;
                    // The blueprint must not collide with itself either.
                    let clashes = variables[..idx]
                        .iter()
                        .any(|other| other.vnid() == variable.vnid());
                    if clashes || variable.vnid() == node.vnid() {
                        return Err(RegisterError::VnidInUse(variable.vnid()));
                    }
                }

                let node_vnid = node.vnid();
                let mut installed = vec![node_vnid];
                self.insert(node_vnid, Entry::Node(node), parent);
                for variable in variables {
                    installed.push(variable.vnid());
                    self.insert(variable.vnid(), Entry::Variable(variable), Some(node_vnid));
                }
                Ok(installed)
            }
        }
    }

    /// Check that a VNID and name could be registered
    pub fn check_free(&self, vnid: Vnid, vn_name: &str) -> Result<(), RegisterError> {
        if vnid == 0 {
            return Err(RegisterError::Reserved);
        }
        if vnid > self.max_vnid {
            return Err(RegisterError::OutOfRange {
                vnid,
                max: self.max_vnid,
            });
        }
        if self.slots.contains_key(&vnid) {
            return Err(RegisterError::VnidInUse(vnid));
        }
        if self.names.contains_key(vn_name) {
            return Err(RegisterError::NameInUse(vn_name.to_string()));
        }
        Ok(())
    }

    fn check_parent(&self, parent: Option<Vnid>) -> Result<(), RegisterError> {
        match parent {
            Some(vnid) if self.node(vnid).is_none() => Err(RegisterError::UnknownParent(vnid)),
            _ => Ok(()),
        }
    }

    fn insert(&mut self, vnid: Vnid, entry: Entry, parent: Option<Vnid>) {
        if let Some(Slot {
            entry: Entry::Node(node),
            ..
        }) = parent.and_then(|parent| self.slots.get_mut(&parent))
        {
            node.children.push(vnid);
        }
        self.names.insert(entry.vn_name().to_string(), vnid);
        self.slots.insert(vnid, Slot { parent, entry });
    }

    /// The variable registered under a VNID
    pub fn get(&self, vnid: Vnid) -> Option<&dyn Variable> {
        match self.entry(vnid) {
            Some(Entry::Variable(variable)) => Some(&**variable),
            _ => None,
        }
    }

    /// Mutable access to the variable registered under a VNID
    pub fn get_mut(&mut self, vnid: Vnid) -> Option<&mut Box<dyn Variable>> {
        match self.slots.get_mut(&vnid) {
            Some(Slot {
                entry: Entry::Variable(variable),
                ..
            }) => Some(variable),
            _ => None,
        }
    }

    /// The node registered under a VNID
    pub fn node(&self, vnid: Vnid) -> Option<&Node> {
        match self.entry(vnid) {
            Some(Entry::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// Whatever is registered under a VNID
    pub fn entry(&self, vnid: Vnid) -> Option<&Entry> {
        self.slots.get(&vnid).map(|slot| &slot.entry)
    }

    /// The parent node of an entry
    pub fn parent(&self, vnid: Vnid) -> Option<Vnid> {
        self.slots.get(&vnid).and_then(|slot| slot.parent)
    }

    /// The VNID registered under a name
    pub fn lookup(&self, vn_name: &str) -> Option<Vnid> {
        self.names.get(vn_name).copied()
    }

    /// Whether anything is registered under a VNID
    pub fn contains(&self, vnid: Vnid) -> bool {
        self.slots.contains_key(&vnid)
    }

    /// The number of registered nodes and variables
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove an entry and everything beneath it.
    ///
    /// Returns the removed VNIDs, which is empty if nothing was registered
    /// under `vnid`.
    pub fn remove(&mut self, vnid: Vnid) -> Vec<Vnid> {
        let parent = match self.slots.get(&vnid) {
            Some(slot) => slot.parent,
            None => return Vec::new(),
        };

        if let Some(Slot {
            entry: Entry::Node(parent),
            ..
        }) = parent.and_then(|parent| self.slots.get_mut(&parent))
        {
            parent.children.retain(|child| *child != vnid);
        }

        let mut removed = Vec::new();
        let mut pending = vec![vnid];
        while let Some(vnid) = pending.pop() {
            if let Some(slot) = self.slots.remove(&vnid) {
                self.names.remove(slot.entry.vn_name());
                if let Entry::Node(node) = slot.entry {
                    pending.extend(node.children);
                }
                removed.push(vnid);
            }
        }
        removed
    }
}
