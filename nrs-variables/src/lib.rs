//!
//! NRS Variables
//!
//! The addressable side of a component: the [`VariableManager`] that maps
//! VNIDs to nodes and variables, the concrete variable kinds, the
//! [`NodeFactory`] that builds them from `CreateNode` messages and the
//! [`Dispatcher`] that delivers every inbound message to its target and
//! answers the component-level queries.
//!

#![deny(missing_docs)]

pub mod error;
pub use error::{DispatchError, RegisterError};

pub mod manager;
pub use manager::{Entry, Node, VariableManager};

pub mod kinds;
pub use kinds::{
    BooleanVariable, FileWriterVariable, FloatVariable, IntegerVariable, Scalar, ScalarVariable,
    StringVariable, VoidVariable,
};

pub mod factory;
pub use factory::{Blueprint, Constructor, NodeFactory, NodeType};

pub mod links;
pub use links::{Link, LinkEnd, LinkTable};

pub mod reply;

pub mod dispatcher;
pub use dispatcher::{ComponentInfo, Dispatcher, Limits, TypeMismatchPolicy};

mod queries;
