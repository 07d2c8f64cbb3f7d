//!
//! Nrs-Executors provides the executors that drive NRS components.
//!
//! A component does all of its work in `update`: it polls its routes and
//! runs everything it received to completion.  An executor decides when
//! each component gets to do that.
//!

#![deny(missing_docs)]

pub mod simple_executor;
pub use simple_executor::SimpleExecutor;

use std::cmp::{Ord, Ordering};

use nrs_core::Component;

/// The ComponentWrapper gives a component a priority based on the
/// timestamp of its next update.
pub(crate) struct ComponentWrapper {
    /// The timestamp (in us since the executor started) of the next update
    pub priority: u128,
    /// The wrapped component
    pub component: Box<dyn Component>,
}

impl Ord for ComponentWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority).reverse()
    }
}

impl PartialOrd for ComponentWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ComponentWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}

impl Eq for ComponentWrapper {}

/// Binary search insertion of `component` into the sorted vector `vec`.
/// A component with the same priority as an existing one is inserted
/// after it.
#[inline(always)]
pub(crate) fn insert_into(vec: &mut Vec<ComponentWrapper>, component: ComponentWrapper) {
    match vec.binary_search(&component) {
        Ok(idx) => vec.insert(idx + 1, component),
        Err(idx) => vec.insert(idx, component),
    }
}
