//!
//! The Interception Stage.
//!
//! An interception stage lets a person (or a test) hold messages on their
//! way through a chain and release them at their own pace.  Delivered
//! messages are queued and a consumer thread forwards them to the next
//! stage in the order they arrived.  While the stage is paused the
//! consumer sleeps on a condition variable until it is resumed or a
//! single message is stepped through.
//!

use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, warn};

use nrs_core::{Message, MessageProcessor, SenderHandle};

/// Whether an interception stage is forwarding messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterceptState {
    /// Messages are forwarded as soon as they arrive
    #[default]
    Running,
    /// Messages are held until they are stepped through or the stage is
    /// resumed
    Paused,
}

#[derive(Debug, Default)]
struct GateState {
    state: InterceptState,
    /// Messages released while paused
    permits: usize,
    /// Messages delivered but not yet released
    pending: usize,
    /// The stage has been dropped and held messages are abandoned
    closing: bool,
}

#[derive(Debug, Default)]
struct Gate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl Gate {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the consumer may forward one message, then count it as
    /// released.  Returns false if the stage was dropped while paused.
    fn enter(&self) -> bool {
        let mut gate = self.lock();
        loop {
            match gate.state {
                InterceptState::Running => {
                    gate.pending = gate.pending.saturating_sub(1);
                    return true;
                }
                InterceptState::Paused if gate.permits > 0 => {
                    gate.permits -= 1;
                    gate.pending = gate.pending.saturating_sub(1);
                    return true;
                }
                InterceptState::Paused if gate.closing => return false,
                InterceptState::Paused => {
                    gate = self
                        .changed
                        .wait(gate)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }
}

/// Controls an [`InterceptStage`] from another thread.
#[derive(Clone, Debug)]
pub struct InterceptHandle {
    gate: Arc<Gate>,
}

impl InterceptHandle {
    /// Hold every message from now on
    pub fn pause(&self) {
        self.gate.lock().state = InterceptState::Paused;
    }

    /// Forward every held message and stop holding new ones
    pub fn resume(&self) {
        let mut gate = self.gate.lock();
        gate.state = InterceptState::Running;
        gate.permits = 0;
        self.gate.changed.notify_all();
    }

    /// Release exactly one held message.  Returns false if the stage is
    /// running or nothing is waiting to be released.
    pub fn step(&self) -> bool {
        let mut gate = self.gate.lock();
        if gate.state == InterceptState::Running || gate.permits >= gate.pending {
            return false;
        }
        gate.permits += 1;
        self.gate.changed.notify_all();
        true
    }

    /// The current state of the stage
    pub fn state(&self) -> InterceptState {
        self.gate.lock().state
    }

    /// Whether the stage is holding messages
    pub fn is_paused(&self) -> bool {
        self.state() == InterceptState::Paused
    }

    /// The number of messages delivered but not yet released
    pub fn pending(&self) -> usize {
        self.gate.lock().pending
    }
}

/// A stage that forwards messages from its own thread, pausably.
pub struct InterceptStage {
    /// The queue to the consumer thread
    tx: Option<Sender<(Message, Option<SenderHandle>)>>,
    /// Shared with every handle
    handle: InterceptHandle,
    /// The consumer thread
    consumer: Option<JoinHandle<()>>,
}

impl InterceptStage {
    /// The name the stage hands messages on under when they arrived
    /// without a sender
    pub const STAGE_NAME: &'static str = "intercept";

    /// Start an interception stage in front of `next`
    pub fn new(next: Box<dyn MessageProcessor>) -> Self {
        let (tx, rx) = channel::unbounded();
        let handle = InterceptHandle {
            gate: Arc::new(Gate::default()),
        };

        let gate = handle.gate.clone();
        let consumer = thread::spawn(move || consume(rx, gate, next));

        Self {
            tx: Some(tx),
            handle,
            consumer: Some(consumer),
        }
    }

    /// A handle that can pause, resume and step the stage
    pub fn handle(&self) -> InterceptHandle {
        self.handle.clone()
    }
}

fn consume(
    rx: Receiver<(Message, Option<SenderHandle>)>,
    gate: Arc<Gate>,
    mut next: Box<dyn MessageProcessor>,
) {
    for (message, sender) in rx.iter() {
        if !gate.enter() {
            break;
        }
        let sender = sender.unwrap_or(SenderHandle::Stage(InterceptStage::STAGE_NAME));
        next.deliver(message, Some(&sender));
    }
}

impl MessageProcessor for InterceptStage {
    fn deliver(&mut self, message: Message, sender: Option<&SenderHandle>) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };

        self.handle.gate.lock().pending += 1;
        if let Err(err) = tx.send((message, sender.cloned())) {
            self.handle.gate.lock().pending -= 1;
            warn!(message_type = (err.0).0.msg_type(), "interception stage stopped, dropping message");
        }
    }
}

impl Drop for InterceptStage {
    fn drop(&mut self) {
        {
            let mut gate = self.handle.gate.lock();
            gate.closing = true;
            if gate.state == InterceptState::Paused && gate.pending > 0 {
                debug!(pending = gate.pending, "dropping held messages");
            }
            self.handle.gate.changed.notify_all();
        }

        // A running stage drains its queue before the consumer sees the
        // channel close.
        self.tx.take();
        if let Some(consumer) = self.consumer.take() {
            if consumer.join().is_err() {
                warn!("interception consumer panicked");
            }
        }
    }
}
