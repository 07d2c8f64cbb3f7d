//!
//! Executors drive components.
//!
//! An executor owns a set of [`Component`]s and calls their `update` at
//! the rate each one asks for.  A component runs every message it
//! received to completion inside `update`, so an executor never needs to
//! know about messages, routes or variables.
//!

use crate::component::Component;

/// Where an executor is in its life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutorState {
    /// No component has been started, or every component has been shut
    /// down again
    Stopped,
    /// Every component has been started but none has been updated yet
    Started,
    /// Components are being updated
    Running,
}

/// Schedules the updates of a set of components.
pub trait Executor {
    /// Start every component and reset the schedule
    fn start(&mut self);

    /// Start, update components for `ms` milliseconds, then shut every
    /// component down.  An interrupt ends the run early.
    fn update_for_ms(&mut self, ms: u128);

    /// Start and update components until interrupted, then shut every
    /// component down
    fn update_loop(&mut self);

    /// Whether the executor has been asked to stop.  Checked between two
    /// component updates, never during one.
    fn check_interrupt(&mut self) -> bool;

    /// Hand a component to the executor
    fn add_component(&mut self, component: Box<dyn Component>);
}
