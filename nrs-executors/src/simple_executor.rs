//!
//! The Simple Executor
//!
//! The simple executor runs every component on the calling thread.  It
//! keeps the components in a vector sorted by the time of their next
//! update, pops the one that is due, updates it and reinserts it with its
//! next update time.
//!
//! A component's update runs every message it received to completion, so
//! a slow variable holds up every other component on the same executor.
//!

use crossbeam::channel::Receiver;

use quanta::{Clock, Instant};

use tracing::{debug, info};

use nrs_core::{Component, Executor, ExecutorState};

use crate::{insert_into, ComponentWrapper};

/// Runs components on the calling thread in the order their updates fall
/// due.
///
/// The backing vector is kept sorted so that its last element is the
/// component whose next update is earliest.  Sending `true` over the
/// interrupt channel ends `update_loop` (or `update_for_ms` early) after
/// the current component update.  Between updates the executor spins.
pub struct SimpleExecutor {
    // Components, latest next update first
    backing: Vec<ComponentWrapper>,
    clock: Clock,
    state: ExecutorState,
    // Update times are measured from here
    start_instant: Instant,
    interrupt: Receiver<bool>,
    interrupted: bool,
}

impl SimpleExecutor {
    /// Create a new Simple Executor without any components
    pub fn new(interrupt: Receiver<bool>) -> Self {
        Self::new_with(interrupt, Vec::new())
    }

    /// Create a new Simple Executor with a number of components
    pub fn new_with(interrupt: Receiver<bool>, components: Vec<Box<dyn Component>>) -> Self {
        let backing = components
            .into_iter()
            .map(|component| ComponentWrapper {
                priority: 0,
                component,
            })
            .collect();

        let clock = Clock::new();
        let now = clock.now();

        Self {
            backing,
            clock,
            start_instant: now,
            state: ExecutorState::Stopped,
            interrupt,
            interrupted: false,
        }
    }

    /// The current state of the executor
    pub fn state(&self) -> ExecutorState {
        self.state
    }

    /// The number of components the executor drives
    pub fn len(&self) -> usize {
        self.backing.len()
    }

    /// Whether the executor drives no components
    pub fn is_empty(&self) -> bool {
        self.backing.is_empty()
    }

    fn elapsed_us(&self) -> u128 {
        self.clock.now().duration_since(self.start_instant).as_micros()
    }

    /// Update the next due component, if one is due
    fn update_next(&mut self) {
        let due = self
            .backing
            .last()
            .is_some_and(|wrapper| self.elapsed_us() >= wrapper.priority);
        if !due {
            return;
        }

        if let Some(mut wrapper) = self.backing.pop() {
            wrapper.component.update();
            wrapper.priority += wrapper.component.get_update_delay_us();
            insert_into(&mut self.backing, wrapper);
        }
    }

    fn stop(&mut self) {
        for wrapper in self.backing.iter_mut() {
            wrapper.priority = 0;
            wrapper.component.shutdown();
        }
        self.state = ExecutorState::Stopped;
        info!(interrupted = self.interrupted, "executor stopped");
    }
}

impl Executor for SimpleExecutor {
    /// Reset every component's priority, start every component and record
    /// the start instant.
    ///
    /// Note: `update_for_ms` and `update_loop` call this themselves.
    fn start(&mut self) {
        for wrapper in self.backing.iter_mut() {
            wrapper.priority = 0;
            wrapper.component.start();
        }

        self.interrupted = false;
        self.state = ExecutorState::Started;
        self.start_instant = self.clock.now();
        debug!(components = self.backing.len(), "executor started");
    }

    /// Start the executor and run it for a given number of milliseconds.
    /// An interrupt stops the executor early.
    fn update_for_ms(&mut self, ms: u128) {
        self.start();

        self.state = ExecutorState::Running;
        while self.elapsed_us() < ms * 1000 && !self.check_interrupt() {
            self.update_next();
        }

        self.stop();
    }

    /// Start the executor and run until an interrupt is received.
    fn update_loop(&mut self) {
        self.start();

        self.state = ExecutorState::Running;
        while !self.check_interrupt() {
            self.update_next();
        }

        self.stop();
    }

    /// Check the interrupt receiver for an interrupt
    fn check_interrupt(&mut self) -> bool {
        if let Ok(interrupt) = self.interrupt.try_recv() {
            self.interrupted = interrupt;
        }
        self.interrupted
    }

    /// Add a component to the Simple Executor.
    ///
    /// Note: a component added while the executor is started is scheduled
    /// for an update right away.
    fn add_component(&mut self, component: Box<dyn Component>) {
        if self.state == ExecutorState::Stopped {
            self.backing.push(ComponentWrapper {
                priority: 0,
                component,
            });
        } else {
            let priority = self.elapsed_us();
            insert_into(
                &mut self.backing,
                ComponentWrapper {
                    priority,
                    component,
                },
            );
        }
    }
}
