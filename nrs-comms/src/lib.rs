//!
//! NRS Comms Routes
//!
//! Implementations of [`nrs_core::CommsRoute`] that move PML between
//! components: a pair of in-process routes joined by crossbeam channels
//! and a TCP route that accepts buffers on a nonblocking listener.
//!

#![deny(missing_docs)]

use nrs_core::PreProcessor;

pub mod local;
pub use local::LocalRoute;

pub mod tcp;
pub use tcp::TcpRoute;

/// A pre-processor a route can own and carry across threads.
pub type BoxedPreProcessor = Box<dyn PreProcessor + Send>;
