//! Controller actor: one Tokio task that owns the [`BuzzerSystem`].
//!
//! Every input source (the terminal reader thread, a test, a pipe) holds
//! a cloneable [`BuzzerHandle`] and sends intents through one channel.
//! The actor applies them one at a time in arrival order, so the system
//! itself never needs a lock.
//!
//! Two [`TickScheduler`]s live in the same `select!` loop:
//!
//! | scheduler | rate                   | runs while     | emits |
//! |-----------|------------------------|----------------|-------|
//! | display   | `displayRefreshHz` (30)| round is armed | `Elapsed` |
//! | session   | 1 Hz                   | host logged in | `SessionTicked` / `SessionExpired` |
//!
//! After every intent and every tick the actor pauses or resumes each
//! scheduler to match the new state. Each is a single long-lived
//! instance, so entering a state twice can't start a second timer.

use quizbuzz_protocol::{Event, Intent, RoundPhase};
use quizbuzz_tick::{TickConfig, TickScheduler};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{BuzzerSystem, Clock, QuizbuzzError};

/// Capacity of the intent channel. Key presses arrive at human speed, so
/// this only fills if the actor has stopped.
pub const INTENT_CHANNEL_CAPACITY: usize = 64;

/// Session countdown rate.
const SESSION_TICK_HZ: u32 = 1;

/// Channel the adapter reads events from.
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// Handle to a running controller. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BuzzerHandle {
    sender: mpsc::Sender<Intent>,
}

impl BuzzerHandle {
    /// Queues an intent.
    ///
    /// # Errors
    /// [`QuizbuzzError::ControllerClosed`] once the actor has stopped.
    pub async fn send(&self, intent: Intent) -> Result<(), QuizbuzzError> {
        self.sender
            .send(intent)
            .await
            .map_err(|_| QuizbuzzError::ControllerClosed)
    }

    /// Queues an intent from a thread outside the runtime (a blocking key
    /// reader).
    ///
    /// # Errors
    /// [`QuizbuzzError::ControllerClosed`] once the actor has stopped.
    pub fn blocking_send(&self, intent: Intent) -> Result<(), QuizbuzzError> {
        self.sender
            .blocking_send(intent)
            .map_err(|_| QuizbuzzError::ControllerClosed)
    }

    /// Asks the actor to stop after the intents already queued.
    ///
    /// # Errors
    /// [`QuizbuzzError::ControllerClosed`] if it has already stopped.
    pub async fn shutdown(&self) -> Result<(), QuizbuzzError> {
        self.send(Intent::Shutdown).await
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A spawned controller: the handle to drive it, the stream of events it
/// produces, and its task. Awaiting the task returns the final system.
#[derive(Debug)]
pub struct Controller {
    pub handle: BuzzerHandle,
    pub events: EventReceiver,
    pub task: JoinHandle<BuzzerSystem>,
}

impl Controller {
    /// Moves `system` into a new task and starts the loop.
    ///
    /// The first events on the stream describe the starting state: the
    /// idle round, then the session if one was restored.
    pub fn spawn<C: Clock>(system: BuzzerSystem, clock: C) -> Self {
        let (intent_tx, intent_rx) = mpsc::channel(INTENT_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let actor = ControllerActor {
            display: TickScheduler::new(TickConfig::paused(system.display_refresh_hz())),
            session: TickScheduler::new(TickConfig::paused(SESSION_TICK_HZ)),
            system,
            clock,
            intents: intent_rx,
            events: event_tx,
        };

        Self {
            handle: BuzzerHandle { sender: intent_tx },
            events: event_rx,
            task: tokio::spawn(actor.run()),
        }
    }
}

/// The actor state. Runs inside a Tokio task.
struct ControllerActor<C: Clock> {
    system: BuzzerSystem,
    clock: C,
    intents: mpsc::Receiver<Intent>,
    events: mpsc::UnboundedSender<Event>,
    display: TickScheduler,
    session: TickScheduler,
}

impl<C: Clock> ControllerActor<C> {
    /// Runs until a `Shutdown` intent, every handle is dropped, or the
    /// event receiver is dropped. Returns the system for inspection.
    async fn run(mut self) -> BuzzerSystem {
        info!("buzzer controller started");

        let mut initial = vec![Event::RoundChanged(
            self.system.round_snapshot(self.clock.monotonic()),
        )];
        if self.system.is_authenticated() {
            initial.push(Event::SessionTicked(
                self.system.session_snapshot(self.clock.wall()),
            ));
        }
        let mut open = self.emit(initial);
        self.sync_schedulers();

        while open {
            let events = tokio::select! {
                intent = self.intents.recv() => match intent {
                    Some(Intent::Shutdown) | None => break,
                    Some(intent) => {
                        debug!(?intent, "intent");
                        self.system.dispatch(intent, &self.clock)
                    }
                },
                _ = self.display.wait_for_tick() => {
                    self.system.display_tick(self.clock.monotonic()).into_iter().collect()
                }
                _ = self.session.wait_for_tick() => {
                    self.system.session_tick(self.clock.wall())
                }
            };

            open = self.emit(events);
            self.sync_schedulers();
        }

        info!("buzzer controller stopped");
        self.system
    }

    /// Sends events to the adapter. Returns `false` once nobody is
    /// listening.
    fn emit(&self, events: Vec<Event>) -> bool {
        for event in events {
            if self.events.send(event).is_err() {
                debug!("event receiver dropped; stopping");
                return false;
            }
        }
        true
    }

    fn sync_schedulers(&mut self) {
        if self.system.phase() == RoundPhase::Armed {
            self.display.resume();
        } else {
            self.display.pause();
        }

        if self.system.is_authenticated() {
            self.session.resume();
        } else {
            self.session.pause();
        }
    }
}
