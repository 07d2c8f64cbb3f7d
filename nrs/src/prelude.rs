//!
//! The types most components need.
//!

pub use nrs_comms::{LocalRoute, TcpRoute};
pub use nrs_core::{
    constants, messages, CommsRoute, Component, DeliverError, Executor, Message,
    MessageProcessor, PortId, PreProcessor, SenderHandle, Value, Variable, VariableKind, Vnid,
};
pub use nrs_executors::SimpleExecutor;
pub use nrs_variables::{NodeFactory, NodeType};

pub use crate::{ComponentConfig, ProcessComponent};
