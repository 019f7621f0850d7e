//! The event store: the single source of truth for calendar events
//!
//! Actions are pushed into a queue, that is consumed in order by a dispatcher task.
//! For every action, the dispatcher applies the [`reduce`](crate::reducer::reduce) function, publishes the new state, then publishes the action itself.
//! Intents are also handed to the [`Effects`], in a separate task each, and their outcome is pushed back into the queue.
//!
//! Every dispatched action is given a [`Ticket`]. Outcomes carry the ticket of the intent they answer,
//! so that callers can tell their own outcome from the outcome of a similar intent.
//!
//! Effects are not serialized: two mutating intents dispatched before either resolves both work on the same snapshot,
//! and the last persistence write wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::action::Action;
use crate::effects::Effects;
use crate::reducer::{self, CalendarState};
use crate::traits::EventPersistence;
use crate::StoreError;

/// How many actions a slow action listener may lag behind before missing some
const ACTION_CHANNEL_CAPACITY: usize = 256;

/// See [`Store::subscribe`]
pub type StateReceiver = watch::Receiver<CalendarState>;
/// See [`Store::subscribe_actions`]
pub type ActionReceiver = broadcast::Receiver<Dispatched>;

/// Identifies an action dispatched to a store
pub type Ticket = u64;

/// An action, as it goes through the store
#[derive(Clone, Debug)]
pub struct Dispatched {
    /// For outcomes, this is the ticket of the intent they answer
    pub ticket: Ticket,
    pub action: Action,
}

/// A handle to the event store. Cloning it gives another handle to the same store.
#[derive(Clone, Debug)]
pub struct Store {
    queue: mpsc::UnboundedSender<Dispatched>,
    next_ticket: Arc<AtomicU64>,
    state: StateReceiver,
    actions: broadcast::Sender<Dispatched>,
}

impl Store {
    /// Create an empty store, and start its dispatcher.
    ///
    /// The dispatcher stops once every handle to this store has been dropped and every pending effect has resolved.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime
    pub fn new(persistence: Arc<dyn EventPersistence>) -> Self {
        let (queue, queue_receiver) = mpsc::unbounded_channel();
        let (state_sender, state) = watch::channel(CalendarState::default());
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);

        let dispatcher = Dispatcher {
            queue: queue.downgrade(),
            state: state_sender,
            actions: actions.clone(),
            effects: Effects::new(persistence),
        };
        tokio::spawn(dispatcher.run(queue_receiver));

        Self { queue, next_ticket: Arc::new(AtomicU64::new(1)), state, actions }
    }

    /// Returns a copy of the current state
    pub fn get_state(&self) -> CalendarState {
        self.state.borrow().clone()
    }

    /// Compute a derived view of the current state
    pub fn select<T, F>(&self, selector: F) -> T
    where
        F: FnOnce(&CalendarState) -> T,
    {
        selector(&self.state.borrow())
    }

    /// Push an action into the queue. This returns immediately, with the ticket of this action.
    pub fn dispatch(&self, action: Action) -> Result<Ticket, StoreError> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        log::trace!("Dispatching {} (ticket {})", action.label(), ticket);
        self.queue.send(Dispatched { ticket, action })
            .map_err(|err| format!("Unable to dispatch {}: the dispatcher has stopped", err.0.action.label()))?;
        Ok(ticket)
    }

    /// Dispatch an intent, and wait for its outcome
    pub async fn dispatch_and_wait(&self, intent: Action) -> Result<Action, StoreError> {
        if intent.is_intent() == false {
            return Err(format!("{} is not an intent, it will never have an outcome", intent.label()).into());
        }

        let mut actions = self.subscribe_actions();
        let ticket = self.dispatch(intent)?;
        wait_for_outcome(&mut actions, ticket).await
    }

    /// Get notified every time the state changes
    pub fn subscribe(&self) -> StateReceiver {
        self.state.clone()
    }

    /// Call `listener` on every state change, until the returned task is aborted or the store stops
    pub fn on_change<F>(&self, mut listener: F) -> JoinHandle<()>
    where
        F: FnMut(&CalendarState) + Send + 'static,
    {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let state = receiver.borrow_and_update().clone();
                listener(&state);
            }
        })
    }

    /// Get every action processed by the store from now on (including failures), after the state has been updated
    pub fn subscribe_actions(&self) -> ActionReceiver {
        self.actions.subscribe()
    }
}

/// Wait until the next outcome (success or failure) goes through the store.
///
/// This fails if the receiver has lagged behind, since the outcome the caller cares about may have been missed.
pub async fn next_outcome(actions: &mut ActionReceiver) -> Result<Dispatched, StoreError> {
    loop {
        match actions.recv().await {
            Ok(dispatched) if dispatched.action.is_outcome() => return Ok(dispatched),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(n_missed)) => {
                return Err(format!("Action listener lagged behind, {} actions were missed", n_missed).into());
            },
            Err(broadcast::error::RecvError::Closed) => return Err("The store dispatcher has stopped".into()),
        }
    }
}

/// Wait for the outcome of the intent that has been given this ticket
pub async fn wait_for_outcome(actions: &mut ActionReceiver, ticket: Ticket) -> Result<Action, StoreError> {
    loop {
        let outcome = next_outcome(actions).await?;
        if outcome.ticket == ticket {
            return Ok(outcome.action);
        }
    }
}

struct Dispatcher {
    /// Used to send outcomes back. This is weak, so that the queue closes when every `Store` is gone
    queue: mpsc::WeakUnboundedSender<Dispatched>,
    state: watch::Sender<CalendarState>,
    actions: broadcast::Sender<Dispatched>,
    effects: Effects,
}

impl Dispatcher {
    async fn run(self, mut queue_receiver: mpsc::UnboundedReceiver<Dispatched>) {
        log::debug!("Store dispatcher started");
        while let Some(dispatched) = queue_receiver.recv().await {
            self.handle(dispatched);
        }
        log::debug!("Store dispatcher stopped");
    }

    fn handle(&self, dispatched: Dispatched) {
        let action = &dispatched.action;
        match action.error() {
            Some(_) => log::warn!("{}", action),
            None => log::debug!("{}", action),
        }

        if action.is_outcome() {
            self.state.send_if_modified(|state| {
                let next = reducer::reduce(state, action);
                if next == *state {
                    return false;
                }
                *state = next;
                true
            });
        } else {
            self.spawn_effect(dispatched.ticket, action.clone());
        }

        // Nobody listening is fine
        let _ = self.actions.send(dispatched);
    }

    fn spawn_effect(&self, ticket: Ticket, intent: Action) {
        let queue = match self.queue.upgrade() {
            Some(queue) => queue,
            None => {
                log::warn!("The store has been dropped, ignoring {}", intent.label());
                return;
            },
        };
        let snapshot = self.state.borrow().events.clone();
        let effects = self.effects.clone();

        tokio::spawn(async move {
            if let Some(outcome) = effects.run(&intent, &snapshot).await {
                if let Err(err) = queue.send(Dispatched { ticket, action: outcome }) {
                    log::warn!("Unable to deliver {}: the dispatcher has stopped", err.0.action.label());
                }
            }
        });
    }
}
