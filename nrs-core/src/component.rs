//!
//! A Running Component.
//!
//! In NRS every process is a component: it owns its routes, decodes the
//! PML arriving on them and dispatches the resulting messages to its
//! variables.  Executors drive components the same way regardless of
//! what the component hosts.
//!

/// A process that is periodically given the chance to read its routes and
/// dispatch what it received
pub trait Component: Send {
    /// How long to wait between two updates (in us)
    fn get_update_delay_us(&self) -> u128;

    /// Called once before the first update of a run
    fn start(&mut self);

    /// Poll the component's routes and run every received message to
    /// completion before returning
    fn update(&mut self);

    /// Called once after the last update of a run.  Anything still queued
    /// should be flushed here.
    fn shutdown(&mut self);
}
