// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The animation lifecycle state machine.
//!
//! A [`StateMachine`] wraps a type-specific [`Behavior`] and applies the same sequence to
//! every transition:
//!
//! 1. run the guard (a logged no-op when the transition is not allowed),
//! 2. call the behavior hook,
//! 3. fire the transition event on the machine's [`EventBus`],
//! 4. update the lifecycle flags,
//! 5. log (and swallow) any error raised by steps 2–3.
//!
//! `init`, `play` and `destroy` are additionally gated by a [`Throttle`]. Timers are
//! deadlines: the behavior reports due `start`/`process`/`end` steps from
//! [`Behavior::poll`], which the machine calls on `play` and on every `tick`.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;
use tracing::{debug, error, trace, warn};

use crate::animation::PropertyUpdate;
use crate::throttle::{Gate, Throttle};
use crate::time::{Duration, Time};
use crate::{AnimationError, EventBus};

/// Transition event names fired on every machine's bus.
pub mod names {
    /// Fired after a successful `init`.
    pub const INIT: &str = "init";
    /// Fired after a successful `play`.
    pub const PLAY: &str = "play";
    /// Fired when the active phase begins (after any delay).
    pub const START: &str = "start";
    /// Fired on each tick of the active phase.
    pub const PROCESS: &str = "process";
    /// Fired when the active phase completes.
    pub const END: &str = "end";
    /// Fired after `destroy`.
    pub const DESTROY: &str = "destroy";
}

/// Identity of an animation or queue.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(String);

impl AnimationId {
    /// Creates an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnimationId {
    fn from(value: &str) -> Self {
        Self(String::from(value))
    }
}

impl From<String> for AnimationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Observable lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Constructed, never initialized.
    Uninitialized,
    /// Initialized and idle.
    Initialized,
    /// Between `play` and `end`.
    Playing,
    /// Initialized, and the last run reached `end`.
    Ended,
    /// Destroyed; unavailable until re-initialized.
    Destroyed,
}

/// Which active-phase transition a queue member reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The member started.
    Start,
    /// The member made progress.
    Process,
    /// The member ended.
    End,
}

/// Payload carried by transition events.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventData {
    /// No payload.
    #[default]
    None,
    /// Eased progress of the active phase, in `[0, 1]`.
    Progress(f64),
    /// A queue member's transition, republished by its queue.
    Member(Box<MemberProgress>),
}

/// A member transition republished as a queue `process` event.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberProgress {
    /// The member that transitioned.
    pub id: AnimationId,
    /// The member's priority rank.
    pub priority: usize,
    /// Which transition it was.
    pub state: Phase,
    /// The member's own payload.
    pub data: EventData,
}

/// An event fired on a machine's bus.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationEvent {
    /// The machine that fired it.
    pub source: AnimationId,
    /// Clock time of the transition.
    pub at: Time,
    /// Transition payload.
    pub data: EventData,
}

/// A due transition reported by [`Behavior::poll`].
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Enter the active phase.
    Start(EventData),
    /// Report progress.
    Process(EventData),
    /// Leave the active phase.
    End(EventData),
}

/// Steps collected from one poll.
pub type Steps = SmallVec<[Step; 4]>;

/// Type-specific transition behavior wrapped by a [`StateMachine`].
///
/// `start`, `process` and `end` receive the payload about to be fired and return the
/// payload to fire; the defaults pass it through unchanged.
pub trait Behavior: fmt::Debug {
    /// Prepares targets for a run.
    fn init(&mut self, _now: Time) -> Result<(), AnimationError> {
        Ok(())
    }

    /// Arms timers for a run beginning at `now`.
    fn play(&mut self, now: Time) -> Result<(), AnimationError>;

    /// Hook for the start transition.
    fn start(&mut self, _now: Time, data: EventData) -> Result<EventData, AnimationError> {
        Ok(data)
    }

    /// Hook for each progress transition.
    fn process(&mut self, _now: Time, data: EventData) -> Result<EventData, AnimationError> {
        Ok(data)
    }

    /// Hook for the end transition.
    fn end(&mut self, _now: Time, data: EventData) -> Result<EventData, AnimationError> {
        Ok(data)
    }

    /// Stops timers and releases targets.
    fn destroy(&mut self, now: Time) -> Result<(), AnimationError>;

    /// Appends the transitions due at `now`.
    fn poll(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError>;

    /// Whether a looping machine may replay after `end`.
    fn can_loop(&self) -> bool {
        true
    }

    /// Moves pending property updates into `out`.
    fn drain_updates(&mut self, _out: &mut Vec<PropertyUpdate>) {}
}

impl<B: Behavior + ?Sized> Behavior for Box<B> {
    fn init(&mut self, now: Time) -> Result<(), AnimationError> {
        (**self).init(now)
    }

    fn play(&mut self, now: Time) -> Result<(), AnimationError> {
        (**self).play(now)
    }

    fn start(&mut self, now: Time, data: EventData) -> Result<EventData, AnimationError> {
        (**self).start(now, data)
    }

    fn process(&mut self, now: Time, data: EventData) -> Result<EventData, AnimationError> {
        (**self).process(now, data)
    }

    fn end(&mut self, now: Time, data: EventData) -> Result<EventData, AnimationError> {
        (**self).end(now, data)
    }

    fn destroy(&mut self, now: Time) -> Result<(), AnimationError> {
        (**self).destroy(now)
    }

    fn poll(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
        (**self).poll(now, steps)
    }

    fn can_loop(&self) -> bool {
        (**self).can_loop()
    }

    fn drain_updates(&mut self, out: &mut Vec<PropertyUpdate>) {
        (**self).drain_updates(out);
    }
}

/// The lifecycle contract shared by animations and queues.
///
/// Every method returns `Err` only for fatal errors (see
/// [`AnimationError::is_fatal`]); all other failures are logged and recovered.
pub trait Lifecycle: fmt::Debug {
    /// Identity.
    fn id(&self) -> &AnimationId;
    /// Current state.
    fn state(&self) -> LifecycleState;
    /// Whether `end` replays the run.
    fn is_looping(&self) -> bool;
    /// Initializes (throttled).
    fn init(&mut self, now: Time) -> Result<(), AnimationError>;
    /// Plays, initializing first if needed (throttled).
    fn play(&mut self, now: Time) -> Result<(), AnimationError>;
    /// Destroys (throttled).
    fn destroy(&mut self, now: Time) -> Result<(), AnimationError>;
    /// Runs parked calls and due timers.
    fn tick(&mut self, now: Time) -> Result<(), AnimationError>;
    /// The transition event bus.
    fn events(&mut self) -> &mut EventBus<AnimationEvent>;
    /// Moves pending property updates into `out`.
    fn drain_updates(&mut self, out: &mut Vec<PropertyUpdate>);
}

#[derive(Clone, Copy, Debug)]
struct Flags {
    initialized: bool,
    started: bool,
    available: bool,
    ended: bool,
}

/// Guarded, throttled, error-isolating wrapper around a [`Behavior`].
#[derive(Debug)]
pub struct StateMachine<B> {
    id: AnimationId,
    behavior: B,
    events: EventBus<AnimationEvent>,
    looping: bool,
    throttle: Throttle,
    flags: Flags,
}

fn emit(
    events: &mut EventBus<AnimationEvent>,
    id: &AnimationId,
    name: &str,
    now: Time,
    data: EventData,
) -> Result<(), AnimationError> {
    let event = AnimationEvent {
        source: id.clone(),
        at: now,
        data,
    };
    events.fire(name, &event)?;
    Ok(())
}

impl<B: Behavior> StateMachine<B> {
    /// Wraps `behavior`, throttling `init`/`play`/`destroy` within `window`.
    pub fn new(id: AnimationId, behavior: B, looping: bool, window: Duration) -> Self {
        Self {
            id,
            behavior,
            events: EventBus::new(),
            looping,
            throttle: Throttle::new(window),
            flags: Flags {
                initialized: false,
                started: false,
                available: true,
                ended: false,
            },
        }
    }

    /// Returns the wrapped behavior.
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Returns the wrapped behavior mutably.
    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }

    /// Returns `true` unless destroyed and not re-initialized.
    pub fn is_available(&self) -> bool {
        self.flags.available
    }

    fn log_failure(&self, transition: &str, err: &AnimationError) {
        error!(id = %self.id, transition, %err, "animation transition failed");
    }

    fn run_init(&mut self, now: Time) {
        if self.flags.initialized {
            warn!(id = %self.id, "init skipped: already initialized");
            return;
        }
        let result = self
            .behavior
            .init(now)
            .and_then(|()| emit(&mut self.events, &self.id, names::INIT, now, EventData::None));
        match result {
            Ok(()) => {
                self.flags.initialized = true;
                self.flags.available = true;
                self.flags.ended = false;
                trace!(id = %self.id, "initialized");
            }
            Err(err) => self.log_failure(names::INIT, &err),
        }
    }

    fn run_play(&mut self, now: Time) -> Result<(), AnimationError> {
        if !self.flags.available {
            warn!(id = %self.id, "play skipped: animation is not available");
            return Ok(());
        }
        if self.flags.started {
            warn!(id = %self.id, "play skipped: already playing");
            return Ok(());
        }
        if !self.flags.initialized {
            self.run_init(now);
            if !self.flags.initialized {
                return Ok(());
            }
        }
        let result = self
            .behavior
            .play(now)
            .and_then(|()| emit(&mut self.events, &self.id, names::PLAY, now, EventData::None));
        match result {
            Ok(()) => {
                self.flags.started = true;
                self.flags.ended = false;
                debug!(id = %self.id, at = now.millis(), "playing");
                self.advance(now)
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.log_failure(names::PLAY, &err);
                Ok(())
            }
        }
    }

    fn run_destroy(&mut self, now: Time) -> Result<(), AnimationError> {
        let result = self.behavior.destroy(now).and_then(|()| {
            emit(
                &mut self.events,
                &self.id,
                names::DESTROY,
                now,
                EventData::None,
            )
        });
        self.flags = Flags {
            initialized: false,
            started: false,
            available: false,
            ended: false,
        };
        match result {
            Ok(()) => {
                trace!(id = %self.id, "destroyed");
                Ok(())
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.log_failure(names::DESTROY, &err);
                Ok(())
            }
        }
    }

    fn run_start(&mut self, now: Time, data: EventData) {
        let result = self
            .behavior
            .start(now, data)
            .and_then(|data| emit(&mut self.events, &self.id, names::START, now, data));
        if let Err(err) = result {
            self.log_failure(names::START, &err);
        }
    }

    fn run_process(&mut self, now: Time, data: EventData) {
        let result = self
            .behavior
            .process(now, data)
            .and_then(|data| emit(&mut self.events, &self.id, names::PROCESS, now, data));
        if let Err(err) = result {
            self.log_failure(names::PROCESS, &err);
        }
    }

    fn run_end(&mut self, now: Time, data: EventData) -> Result<(), AnimationError> {
        let result = self
            .behavior
            .end(now, data)
            .and_then(|data| emit(&mut self.events, &self.id, names::END, now, data));
        // A failing end hook still leaves the machine stopped.
        self.flags.started = false;
        self.flags.ended = true;
        match result {
            Ok(()) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => self.log_failure(names::END, &err),
        }
        if self.looping && self.flags.available && self.behavior.can_loop() {
            debug!(id = %self.id, at = now.millis(), "looping");
            return self.play(now);
        }
        Ok(())
    }

    fn advance(&mut self, now: Time) -> Result<(), AnimationError> {
        let mut steps = Steps::new();
        if let Err(err) = self.behavior.poll(now, &mut steps) {
            if err.is_fatal() {
                return Err(err);
            }
            self.log_failure("poll", &err);
        }
        for step in steps {
            if !self.flags.started {
                break;
            }
            match step {
                Step::Start(data) => self.run_start(now, data),
                Step::Process(data) => self.run_process(now, data),
                Step::End(data) => self.run_end(now, data)?,
            }
        }
        Ok(())
    }
}

impl<B: Behavior> Lifecycle for StateMachine<B> {
    fn id(&self) -> &AnimationId {
        &self.id
    }

    fn state(&self) -> LifecycleState {
        let f = self.flags;
        if !f.available {
            LifecycleState::Destroyed
        } else if f.started {
            LifecycleState::Playing
        } else if f.ended {
            LifecycleState::Ended
        } else if f.initialized {
            LifecycleState::Initialized
        } else {
            LifecycleState::Uninitialized
        }
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn init(&mut self, now: Time) -> Result<(), AnimationError> {
        if self.throttle.admit(Gate::Init, now) {
            self.run_init(now);
        } else {
            trace!(id = %self.id, "init coalesced");
        }
        Ok(())
    }

    fn play(&mut self, now: Time) -> Result<(), AnimationError> {
        if self.throttle.admit(Gate::Play, now) {
            self.run_play(now)
        } else {
            trace!(id = %self.id, "play coalesced");
            Ok(())
        }
    }

    fn destroy(&mut self, now: Time) -> Result<(), AnimationError> {
        if self.throttle.admit(Gate::Destroy, now) {
            self.run_destroy(now)
        } else {
            trace!(id = %self.id, "destroy coalesced");
            Ok(())
        }
    }

    fn tick(&mut self, now: Time) -> Result<(), AnimationError> {
        while let Some(gate) = self.throttle.take_due(now) {
            match gate {
                Gate::Init => self.run_init(now),
                Gate::Play => self.run_play(now)?,
                Gate::Destroy => self.run_destroy(now)?,
            }
        }
        if self.flags.started {
            self.advance(now)?;
        }
        Ok(())
    }

    fn events(&mut self) -> &mut EventBus<AnimationEvent> {
        &mut self.events
    }

    fn drain_updates(&mut self, out: &mut Vec<PropertyUpdate>) {
        self.behavior.drain_updates(out);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;
    use crate::ListenerError;

    /// A behavior that ends `length` ms after play and can be told to fail.
    #[derive(Debug, Default)]
    struct Probe {
        armed_at: Option<Time>,
        length: u64,
        fail_start: bool,
        destroyed: usize,
    }

    impl Behavior for Probe {
        fn play(&mut self, now: Time) -> Result<(), AnimationError> {
            self.armed_at = Some(now);
            Ok(())
        }

        fn start(&mut self, _now: Time, data: EventData) -> Result<EventData, AnimationError> {
            if self.fail_start {
                return Err(AnimationError::hook(&AnimationId::from("probe"), "start"));
            }
            Ok(data)
        }

        fn destroy(&mut self, _now: Time) -> Result<(), AnimationError> {
            self.armed_at = None;
            self.destroyed += 1;
            Ok(())
        }

        fn poll(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
            let Some(at) = self.armed_at else {
                return Ok(());
            };
            if now == at {
                steps.push(Step::Start(EventData::None));
            }
            if now.saturating_since(at).millis() >= self.length {
                self.armed_at = None;
                steps.push(Step::End(EventData::None));
            }
            Ok(())
        }
    }

    fn machine(length: u64, looping: bool) -> StateMachine<Probe> {
        StateMachine::new(
            AnimationId::from("probe"),
            Probe {
                length,
                ..Probe::default()
            },
            looping,
            Duration(100),
        )
    }

    fn record(m: &mut StateMachine<Probe>) -> Rc<RefCell<Vec<(&'static str, u64)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in [
            names::INIT,
            names::PLAY,
            names::START,
            names::END,
            names::DESTROY,
        ] {
            let sink = log.clone();
            m.events().on(name, "test", move |e: &AnimationEvent| {
                sink.borrow_mut().push((name, e.at.millis()));
                Ok(())
            });
        }
        log
    }

    #[test]
    fn play_initializes_then_runs_to_end() {
        let mut m = machine(200, false);
        let log = record(&mut m);
        assert_eq!(m.state(), LifecycleState::Uninitialized);

        m.play(Time(0)).unwrap();
        assert_eq!(m.state(), LifecycleState::Playing);
        m.tick(Time(100)).unwrap();
        m.tick(Time(200)).unwrap();
        assert_eq!(m.state(), LifecycleState::Ended);
        assert_eq!(
            *log.borrow(),
            vec![("init", 0), ("play", 0), ("start", 0), ("end", 200)]
        );
    }

    #[test]
    fn guards_skip_without_side_effects() {
        let mut m = machine(500, false);
        let log = record(&mut m);
        m.init(Time(0)).unwrap();
        // Second init is outside the throttle window but already initialized.
        m.init(Time(200)).unwrap();
        m.play(Time(200)).unwrap();
        // Already playing.
        m.play(Time(400)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![("init", 0), ("play", 200), ("start", 200)]
        );
    }

    #[test]
    fn play_after_destroy_is_skipped_until_reinit() {
        let mut m = machine(0, false);
        m.destroy(Time(0)).unwrap();
        assert_eq!(m.state(), LifecycleState::Destroyed);
        m.play(Time(0)).unwrap();
        assert_eq!(m.state(), LifecycleState::Destroyed);

        m.init(Time(0)).unwrap();
        assert!(m.is_available());
        m.play(Time(200)).unwrap();
        assert_eq!(m.state(), LifecycleState::Ended);
    }

    #[test]
    fn hook_errors_are_isolated() {
        let mut m = machine(50, false);
        m.behavior_mut().fail_start = true;
        let log = record(&mut m);

        m.play(Time(0)).unwrap();
        m.tick(Time(50)).unwrap();
        // No start event, but the run still completed and the machine is reusable.
        assert_eq!(*log.borrow(), vec![("init", 0), ("play", 0), ("end", 50)]);
        m.behavior_mut().fail_start = false;
        m.play(Time(200)).unwrap();
        assert_eq!(m.state(), LifecycleState::Playing);
    }

    #[test]
    fn listener_errors_are_isolated() {
        let mut m = machine(10, false);
        m.events()
            .on(names::PLAY, "bad", |_: &AnimationEvent| {
                Err(ListenerError::new("listener broke"))
            });
        m.play(Time(0)).unwrap();
        // The failed play left the flags untouched.
        assert_eq!(m.state(), LifecycleState::Initialized);
    }

    #[test]
    fn rapid_plays_coalesce() {
        let mut m = machine(0, false);
        let log = record(&mut m);
        for t in 0..10 {
            m.play(Time(t * 5)).unwrap();
        }
        let plays = log.borrow().iter().filter(|(n, _)| *n == "play").count();
        assert_eq!(plays, 1);
        // The parked call runs once the window has passed.
        m.tick(Time(100)).unwrap();
        let plays = log.borrow().iter().filter(|(n, _)| *n == "play").count();
        assert_eq!(plays, 2);
    }

    #[test]
    fn looping_machine_replays_on_end() {
        let mut m = machine(150, true);
        let log = record(&mut m);
        m.play(Time(0)).unwrap();
        m.tick(Time(150)).unwrap();
        m.tick(Time(300)).unwrap();
        let plays: Vec<u64> = log
            .borrow()
            .iter()
            .filter(|(n, _)| *n == "play")
            .map(|(_, t)| *t)
            .collect();
        assert_eq!(plays, vec![0, 150, 300]);
        assert_eq!(m.state(), LifecycleState::Playing);
    }
}
