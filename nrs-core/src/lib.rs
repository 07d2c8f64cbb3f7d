//!
//! Nrs-Core is the collection of data types and traits that every
//! part of an NRS component agrees on.
//!
//! A component receives PML messages over its routes, decodes them into
//! [`Message`]s, pushes them through a chain of [`MessageProcessor`]s and
//! finally delivers them to the [`Variable`] addressed by the message's
//! VNID.  Replies travel the same chain in the opposite direction.
//!

#![deny(unsafe_code)]
#![deny(missing_docs)]

pub mod constants;

pub mod error;
pub use error::{DeliverError, FieldNotFound, RouteError, TransportError};

pub mod message;
pub use message::{Aux, CslPayload, Direction, Message};

pub mod messages;

pub mod route;
pub use route::{PortId, Route};

pub mod processor;
pub use processor::{MessageProcessor, SenderHandle};

pub mod variable;
pub use variable::{Value, Variable, VariableKind, Vnid};

pub mod comms;
pub use comms::{CommsRoute, PreProcessor};

pub mod component;
pub use component::Component;

pub mod executor;
pub use executor::{Executor, ExecutorState};
