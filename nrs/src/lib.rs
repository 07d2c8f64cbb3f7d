//!
//! # NRS
//!
//! NRS is the message routing core of a Neural Robotics Simulation
//! component.  A component hosts a tree of nodes and variables, each
//! addressed by a VNID, and talks to other components by exchanging PML
//! messages over its routes.
//!
//! ## Technical Overview
//!
//! A [`ProcessComponent`] owns everything a component needs and is built
//! once from a [`ComponentConfig`]:
//!
//! * the element registry and the PML parser, which turn buffers received
//!   on a route into messages;
//! * the inbound chain, which records where each message came from in its
//!   return route and forwards messages that are only passing through;
//! * the dispatcher, which delivers each message to the node or variable
//!   it is addressed to and answers queries;
//! * the outbound chain, which picks the port each message leaves through
//!   and encodes it as PML.
//!
//! The component implements [`core::Component`] so an executor from
//! [`executors`] can drive it.  Every update polls the routes and runs
//! every message received to completion.
//!

#![deny(missing_docs)]

pub mod prelude;

pub mod config;
pub use config::{ComponentConfig, ConfigError, RouteConfig, RouteKind, Strictness};

pub mod error;
pub use error::ComponentError;

pub mod logging;

pub mod component;
pub use component::ProcessComponent;

/// NRS Comms Routes
pub use nrs_comms as comms;
/// NRS Core Types and Traits
pub use nrs_core as core;
/// NRS Executors
pub use nrs_executors as executors;
/// NRS Message Processor Stages
pub use nrs_pipelines as pipelines;
/// NRS PML Decoder
pub use nrs_pml as pml;
/// NRS PML Encoder
pub use nrs_utils as utils;
/// NRS Variables, Nodes and Dispatch
pub use nrs_variables as variables;
