//! Generic finite state machine
//!
//! Holds the current/previous state, an adjacency map of legal transitions and
//! per-state enter/update/exit handlers. Handlers receive a caller-supplied
//! context `C` (an animator, a test probe, `()`) so the machine itself owns no
//! game object.
//!
//! A state with no entry in the transition table may move anywhere. Handler
//! panics are caught at this boundary and logged; `current`/`previous` are
//! always updated before `on_enter` runs so they stay consistent.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::{AssertUnwindSafe, catch_unwind};

type EnterFn<S, C> = Box<dyn FnMut(&mut C, Option<S>)>;
type UpdateFn<C> = Box<dyn FnMut(&mut C, f32)>;
type ExitFn<S, C> = Box<dyn FnMut(&mut C, Option<S>)>;
type ChangeFn<S> = Box<dyn FnMut(S, Option<S>)>;

/// Enter/update/exit callbacks for one state
pub struct StateHandler<S, C: ?Sized = ()> {
    on_enter: Option<EnterFn<S, C>>,
    on_update: Option<UpdateFn<C>>,
    on_exit: Option<ExitFn<S, C>>,
}

impl<S, C: ?Sized> Default for StateHandler<S, C> {
    fn default() -> Self {
        Self {
            on_enter: None,
            on_update: None,
            on_exit: None,
        }
    }
}

impl<S, C: ?Sized> StateHandler<S, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the previous state (`None` on construction and reset)
    pub fn on_enter(mut self, f: impl FnMut(&mut C, Option<S>) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl FnMut(&mut C, f32) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Called with the target state (`None` on reset)
    pub fn on_exit(mut self, f: impl FnMut(&mut C, Option<S>) + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }
}

/// Handle returned by [`StateMachine::on_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Builder collecting the transition table and handlers before the initial
/// state is entered.
pub struct StateMachineBuilder<S, C: ?Sized = ()> {
    initial: S,
    transitions: HashMap<S, Vec<S>>,
    handlers: HashMap<S, StateHandler<S, C>>,
    logging: bool,
}

impl<S, C> StateMachineBuilder<S, C>
where
    S: Copy + Eq + Hash + Debug,
    C: ?Sized,
{
    /// Allow `from -> each of to`
    pub fn transitions(mut self, from: S, to: &[S]) -> Self {
        let allowed = self.transitions.entry(from).or_default();
        for &s in to {
            if !allowed.contains(&s) {
                allowed.push(s);
            }
        }
        self
    }

    /// Replace the whole transition table
    pub fn table(mut self, table: HashMap<S, Vec<S>>) -> Self {
        self.transitions = table;
        self
    }

    pub fn handler(mut self, state: S, handler: StateHandler<S, C>) -> Self {
        self.handlers.insert(state, handler);
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Build the machine, running the initial state's `on_enter(None)`
    pub fn build(self, ctx: &mut C) -> StateMachine<S, C> {
        let mut machine = StateMachine {
            current: self.initial,
            previous: None,
            transitions: self.transitions,
            handlers: self.handlers,
            listeners: Vec::new(),
            next_listener: 0,
            logging: self.logging,
        };
        machine.run_enter(ctx, None);
        machine
    }
}

/// Finite state machine over a closed set of states `S`
pub struct StateMachine<S, C: ?Sized = ()> {
    current: S,
    previous: Option<S>,
    transitions: HashMap<S, Vec<S>>,
    handlers: HashMap<S, StateHandler<S, C>>,
    listeners: Vec<(ListenerId, ChangeFn<S>)>,
    next_listener: u32,
    logging: bool,
}

impl<S, C> StateMachine<S, C>
where
    S: Copy + Eq + Hash + Debug,
    C: ?Sized,
{
    pub fn builder(initial: S) -> StateMachineBuilder<S, C> {
        StateMachineBuilder {
            initial,
            transitions: HashMap::new(),
            handlers: HashMap::new(),
            logging: false,
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    pub fn is_in_state(&self, state: S) -> bool {
        self.current == state
    }

    pub fn was_in_state(&self, state: S) -> bool {
        self.previous == Some(state)
    }

    /// True if the current state is unrestricted or lists `target`
    pub fn can_transition_to(&self, target: S) -> bool {
        match self.transitions.get(&self.current) {
            None => true,
            Some(allowed) => allowed.contains(&target),
        }
    }

    /// Move to `target`. Returns false (and does nothing) when `target` is the
    /// current state, or when the move is illegal and `force` is not set.
    pub fn transition_to(&mut self, ctx: &mut C, target: S, force: bool) -> bool {
        if target == self.current {
            return false;
        }

        if !force && !self.can_transition_to(target) {
            if self.logging {
                log::warn!("Invalid transition from {:?} to {:?}", self.current, target);
            }
            return false;
        }

        let old = self.current;
        self.run_exit(ctx, Some(target));

        self.previous = Some(old);
        self.current = target;

        self.run_enter(ctx, Some(old));

        for (_, listener) in self.listeners.iter_mut() {
            listener(target, Some(old));
        }

        if self.logging {
            log::debug!("State transition: {:?} -> {:?}", old, target);
        }

        true
    }

    /// Run the current state's `on_update`
    pub fn update(&mut self, ctx: &mut C, dt: f32) {
        let state = self.current;
        let Some(f) = self.handlers.get_mut(&state).and_then(|h| h.on_update.as_mut()) else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| f(ctx, dt))).is_err() {
            log::error!("on_update handler for {:?} panicked", state);
        }
    }

    /// Restart the machine: exit the current state, forget the previous one
    /// and enter `state` (or re-enter the current one).
    pub fn reset(&mut self, ctx: &mut C, state: Option<S>) {
        self.run_exit(ctx, None);
        self.previous = None;
        self.current = state.unwrap_or(self.current);
        self.run_enter(ctx, None);
    }

    pub fn set_handler(&mut self, state: S, handler: StateHandler<S, C>) {
        self.handlers.insert(state, handler);
    }

    pub fn add_transition(&mut self, from: S, to: S) {
        let allowed = self.transitions.entry(from).or_default();
        if !allowed.contains(&to) {
            allowed.push(to);
        }
    }

    /// Register a listener called with `(new, old)` after every transition
    pub fn on_change(&mut self, f: impl FnMut(S, Option<S>) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(f)));
        id
    }

    /// Returns false if the listener was already removed
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn run_enter(&mut self, ctx: &mut C, previous: Option<S>) {
        let state = self.current;
        let Some(f) = self.handlers.get_mut(&state).and_then(|h| h.on_enter.as_mut()) else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| f(ctx, previous))).is_err() {
            log::error!("on_enter handler for {:?} panicked", state);
        }
    }

    fn run_exit(&mut self, ctx: &mut C, next: Option<S>) {
        let state = self.current;
        let Some(f) = self.handlers.get_mut(&state).and_then(|h| h.on_exit.as_mut()) else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| f(ctx, next))).is_err() {
            log::error!("on_exit handler for {:?} panicked", state);
        }
    }
}

impl<S, C: ?Sized> std::fmt::Debug for StateMachine<S, C>
where
    S: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
