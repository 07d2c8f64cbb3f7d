//!
//! Errors building a component.
//!
//! Once a component is running nothing fails past it: every per-message
//! problem is logged and the message dropped.  These errors only come out
//! of [`crate::ProcessComponent::new`] and friends.
//!

use nrs_core::{RouteError, TransportError};
use nrs_variables::DispatchError;
use thiserror::Error;

use crate::config::ConfigError;

/// A component could not be built.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// The configuration is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A configured port number cannot be used
    #[error(transparent)]
    Route(#[from] RouteError),
    /// A route could not be opened
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The root node could not be registered
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
