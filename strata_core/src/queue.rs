// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Priority-grouped sequencing of animations.
//!
//! An [`AnimationQueue`] is an ordered list of members headed by a zero-duration
//! sentinel. [`AnimationQueue::connect`] groups the non-sentinel members into priority
//! buckets; playing the queue plays the sentinel, whose `end` opens bucket 0. Every member
//! of a bucket is played in the same tick, and bucket `k + 1` opens only once every member
//! of bucket `k` has fired `end`. The last bucket's completion ends the queue.
//!
//! Members report back through their own event buses. The queue's forwarders only append
//! to an inbox, which the queue drains while it is polled; member transitions are
//! republished as the queue's own `process` events carrying a [`MemberProgress`].
//!
//! A queue is itself a [`Lifecycle`], so queues nest.

extern crate alloc;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, error, trace};

use crate::animation::{AnimationContext, AnimationSpec, Empty, Engine, PropertyUpdate};
use crate::lifecycle::{
    AnimationEvent, Behavior, EventData, MemberProgress, Phase, StateMachine, Step, Steps, names,
};
use crate::registry::AnimationRegistry;
use crate::throttle::Throttle;
use crate::time::{Duration, Time};
use crate::{AnimationError, AnimationId, EventBus, Lifecycle, ListenerError};

/// Computes one rank per non-sentinel member from the members' ids.
pub type RankFn = dyn Fn(&[AnimationId]) -> Vec<usize>;

/// How members are grouped into priority buckets.
#[derive(Clone, Default)]
pub enum Priority {
    /// Each member's position is its rank: a strict chain.
    #[default]
    Sequential,
    /// Explicit ranks in member order; missing entries fall back to the position.
    Ranks(Vec<usize>),
    /// Ranks computed from the current members; missing entries fall back to the position.
    Computed(Rc<RankFn>),
}

impl fmt::Debug for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("Sequential"),
            Self::Ranks(ranks) => f.debug_tuple("Ranks").field(ranks).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl Priority {
    /// Creates a priority from a rank function.
    pub fn computed(f: impl Fn(&[AnimationId]) -> Vec<usize> + 'static) -> Self {
        Self::Computed(Rc::new(f))
    }

    fn ranks(&self, ids: &[AnimationId]) -> Vec<usize> {
        let given = match self {
            Self::Sequential => Vec::new(),
            Self::Ranks(ranks) => ranks.clone(),
            Self::Computed(f) => f(ids),
        };
        (0..ids.len())
            .map(|index| given.get(index).copied().unwrap_or(index))
            .collect()
    }
}

/// Queue configuration.
#[derive(Clone, Debug)]
pub struct QueueOptions {
    /// Queue id; also prefixes generated member ids.
    pub id: AnimationId,
    /// Whether the whole sequence replays after the last bucket ends.
    pub looping: bool,
    /// Coalescing window for the queue and the members it builds.
    pub throttle: Duration,
    /// Bound on the tail-pop loop in `destroy`.
    pub max_destroy_iterations: usize,
    /// Rendering engine of the members' targets.
    pub engine: Engine,
}

impl QueueOptions {
    /// Default bound on the tail-pop loop in `destroy`.
    pub const DEFAULT_MAX_DESTROY_ITERATIONS: usize = 4096;

    /// Creates options with defaults.
    pub fn new(id: impl Into<AnimationId>) -> Self {
        Self {
            id: id.into(),
            looping: false,
            throttle: Throttle::DEFAULT_WINDOW,
            max_destroy_iterations: Self::DEFAULT_MAX_DESTROY_ITERATIONS,
            engine: Engine::default(),
        }
    }

    /// Enables or disables looping.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Sets the coalescing window.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Sets the destroy iteration bound.
    pub fn with_max_destroy_iterations(mut self, limit: usize) -> Self {
        self.max_destroy_iterations = limit;
        self
    }

    /// Sets the rendering engine.
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }
}

#[derive(Clone, Debug)]
struct Signal {
    id: AnimationId,
    phase: Phase,
    data: EventData,
    /// `false` for joins synthesized by `remove`.
    republish: bool,
}

type Inbox = Rc<RefCell<Vec<Signal>>>;

/// The queue's behavior: membership, wiring and the bucket join.
struct QueueCore {
    id: AnimationId,
    category: String,
    looping: bool,
    max_destroy_iterations: usize,
    members: Vec<Box<dyn Lifecycle>>,
    priority: Priority,
    connected: bool,
    ranks: HashMap<AnimationId, usize>,
    buckets: Vec<Vec<AnimationId>>,
    active: Option<usize>,
    pending: usize,
    ended: HashSet<AnimationId>,
    inbox: Inbox,
}

impl fmt::Debug for QueueCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueCore")
            .field("id", &self.id)
            .field("members", &self.members.len())
            .field("connected", &self.connected)
            .field("buckets", &self.buckets)
            .field("active", &self.active)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

fn forward(
    inbox: &Inbox,
    phase: Phase,
) -> impl FnMut(&AnimationEvent) -> Result<(), ListenerError> + 'static {
    let inbox = inbox.clone();
    move |event: &AnimationEvent| {
        inbox.borrow_mut().push(Signal {
            id: event.source.clone(),
            phase,
            data: event.data.clone(),
            republish: true,
        });
        Ok(())
    }
}

const MEMBER_EVENTS: [(&str, Phase); 3] = [
    (names::START, Phase::Start),
    (names::PROCESS, Phase::Process),
    (names::END, Phase::End),
];

impl QueueCore {
    fn sentinel_id(&self) -> &AnimationId {
        self.members[0].id()
    }

    fn position(&self, id: &AnimationId) -> Option<usize> {
        self.members
            .iter()
            .skip(1)
            .position(|m| m.id() == id)
            .map(|p| p + 1)
    }

    fn unwire(&self, member: &mut dyn Lifecycle) {
        for (name, _) in MEMBER_EVENTS {
            member.events().off_category(name, &self.category);
        }
    }

    fn reset_run(&mut self) {
        self.active = None;
        self.pending = 0;
        self.ended.clear();
        self.inbox.borrow_mut().clear();
    }

    fn connect(&mut self, priority: Priority) {
        let ids: Vec<AnimationId> = self.members[1..].iter().map(|m| m.id().clone()).collect();
        let ranks = priority.ranks(&ids);

        // Ranks may be sparse; only the distinct ones become buckets, in rank order.
        let mut buckets: BTreeMap<usize, Vec<AnimationId>> = BTreeMap::new();
        self.ranks.clear();
        for (id, rank) in ids.iter().zip(&ranks) {
            buckets.entry(*rank).or_default().push(id.clone());
            self.ranks.insert(id.clone(), *rank);
        }
        self.buckets = buckets.into_values().collect();

        for member in &mut self.members[1..] {
            for (name, phase) in MEMBER_EVENTS {
                member
                    .events()
                    .on_with_off(name, &self.category, forward(&self.inbox, phase));
            }
        }
        let sentinel = &mut self.members[0];
        sentinel
            .events()
            .on_with_off(names::END, &self.category, forward(&self.inbox, Phase::End));

        self.priority = priority;
        self.connected = true;
        debug!(id = %self.id, buckets = self.buckets.len(), "queue connected");
    }

    /// Plays bucket `index` (skipping buckets whose members were all removed), or
    /// finishes the run once past the last bucket.
    fn open_bucket(
        &mut self,
        mut index: usize,
        now: Time,
        steps: &mut Steps,
    ) -> Result<(), AnimationError> {
        self.ended.clear();
        while index < self.buckets.len() {
            let mut started = 0;
            for id in self.buckets[index].clone() {
                if let Some(pos) = self.position(&id) {
                    trace!(queue = %self.id, member = %id, bucket = index, "member play");
                    self.members[pos].play(now)?;
                    started += 1;
                }
            }
            if started > 0 {
                self.active = Some(index);
                self.pending = started;
                return Ok(());
            }
            index += 1;
        }
        self.active = None;
        self.pending = 0;
        steps.push(Step::End(EventData::None));
        Ok(())
    }

    fn handle(&mut self, signal: Signal, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
        if &signal.id == self.sentinel_id() {
            if signal.phase == Phase::End && self.active.is_none() {
                steps.push(Step::Start(EventData::None));
                self.open_bucket(0, now, steps)?;
            }
            return Ok(());
        }
        if signal.republish {
            let priority = self.ranks.get(&signal.id).copied().unwrap_or_default();
            steps.push(Step::Process(EventData::Member(Box::new(MemberProgress {
                id: signal.id.clone(),
                priority,
                state: signal.phase,
                data: signal.data,
            }))));
        }
        if signal.phase != Phase::End {
            return Ok(());
        }
        let Some(active) = self.active else {
            return Ok(());
        };
        if !self.buckets[active].contains(&signal.id) || !self.ended.insert(signal.id) {
            return Ok(());
        }
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            self.open_bucket(active + 1, now, steps)?;
        }
        Ok(())
    }

    fn pump(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
        // Each pass either drains signals or stops; members only signal when played.
        let bound = 4 * (self.members.len() + 1) * (self.buckets.len() + 1);
        for _ in 0..bound {
            let batch = core::mem::take(&mut *self.inbox.borrow_mut());
            if batch.is_empty() {
                return Ok(());
            }
            for signal in batch {
                self.handle(signal, now, steps)?;
            }
        }
        error!(id = %self.id, "queue signals did not settle within one tick");
        Ok(())
    }
}

impl Behavior for QueueCore {
    fn play(&mut self, now: Time) -> Result<(), AnimationError> {
        if !self.connected {
            self.connect(self.priority.clone());
        }
        self.reset_run();
        // The sentinel's `end` lands in the inbox and opens bucket 0 on the next poll,
        // which the state machine runs in this same tick.
        self.members[0].play(now)
    }

    fn end(&mut self, now: Time, data: EventData) -> Result<EventData, AnimationError> {
        if self.looping && self.members.len() > 1 {
            for member in &mut self.members {
                member.destroy(now)?;
                member.init(now)?;
            }
        }
        Ok(data)
    }

    fn destroy(&mut self, now: Time) -> Result<(), AnimationError> {
        let mut iterations = 0;
        while self.members.len() > 1 {
            if iterations >= self.max_destroy_iterations {
                return Err(AnimationError::DestroyOverflow {
                    queue: self.id.clone(),
                    limit: self.max_destroy_iterations,
                });
            }
            iterations += 1;
            if let Some(mut member) = self.members.pop() {
                self.unwire(member.as_mut());
                member.destroy(now)?;
            }
        }
        let category = self.category.clone();
        self.members[0].events().off_category(names::END, &category);
        self.connected = false;
        self.ranks.clear();
        self.buckets.clear();
        self.reset_run();
        Ok(())
    }

    fn poll(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
        for member in &mut self.members {
            member.tick(now)?;
        }
        self.pump(now, steps)
    }

    fn can_loop(&self) -> bool {
        self.members.len() > 1
    }

    fn drain_updates(&mut self, out: &mut Vec<PropertyUpdate>) {
        for member in &mut self.members {
            member.drain_updates(out);
        }
    }
}

/// An ordered, priority-grouped sequence of animations and nested queues.
#[derive(Debug)]
pub struct AnimationQueue {
    machine: StateMachine<QueueCore>,
    registry: AnimationRegistry,
    ctx: AnimationContext,
    next_seq: usize,
}

impl AnimationQueue {
    /// Creates an empty queue (just the sentinel).
    pub fn new(options: QueueOptions) -> Self {
        let ctx = AnimationContext {
            engine: options.engine,
            throttle: options.throttle,
        };
        let sentinel_id = AnimationId::from(format!("{}/sentinel", options.id));
        let sentinel: Box<dyn Behavior> = Box::new(Empty::new(Duration::ZERO, Duration::ZERO));
        let sentinel = StateMachine::new(sentinel_id, sentinel, false, options.throttle);
        let core = QueueCore {
            id: options.id.clone(),
            category: format!("queue:{}", options.id),
            looping: options.looping,
            max_destroy_iterations: options.max_destroy_iterations,
            members: alloc::vec![Box::new(sentinel) as Box<dyn Lifecycle>],
            priority: Priority::default(),
            connected: false,
            ranks: HashMap::new(),
            buckets: Vec::new(),
            active: None,
            pending: 0,
            ended: HashSet::new(),
            inbox: Rc::default(),
        };
        Self {
            machine: StateMachine::new(options.id, core, options.looping, options.throttle),
            registry: AnimationRegistry::default(),
            ctx,
            next_seq: 0,
        }
    }

    /// Uses `registry` to build members pushed from now on.
    pub fn with_registry(mut self, registry: AnimationRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Number of members, not counting the sentinel.
    pub fn len(&self) -> usize {
        self.machine.behavior().members.len() - 1
    }

    /// Returns `true` if only the sentinel remains.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the members in order, not counting the sentinel.
    pub fn member_ids(&self) -> impl Iterator<Item = &AnimationId> + '_ {
        self.machine.behavior().members[1..].iter().map(|m| m.id())
    }

    /// Id of the sentinel.
    pub fn sentinel_id(&self) -> &AnimationId {
        self.machine.behavior().sentinel_id()
    }

    /// Returns `true` while the priority wiring matches the membership.
    pub fn is_connected(&self) -> bool {
        self.machine.behavior().connected
    }

    fn push_member(&mut self, member: Box<dyn Lifecycle>) -> Option<AnimationId> {
        let core = self.machine.behavior_mut();
        let id = member.id().clone();
        if &id == core.sentinel_id() || core.position(&id).is_some() {
            error!(queue = %core.id, member = %id, "duplicate member id; member skipped");
            return None;
        }
        core.members.push(member);
        core.connected = false;
        trace!(queue = %core.id, member = %id, "member pushed");
        Some(id)
    }

    /// Builds an animation from `spec` and appends it.
    ///
    /// Returns the member id, or `None` (after logging) if the kind cannot be built.
    pub fn push_animation(&mut self, spec: AnimationSpec) -> Option<AnimationId> {
        let id = match &spec.id {
            Some(id) => id.clone(),
            None => {
                let id = AnimationId::from(format!("{}/{}", self.machine.id(), self.next_seq));
                self.next_seq += 1;
                id
            }
        };
        match self.registry.build(id, &spec, &self.ctx) {
            Ok(animation) => self.push_member(Box::new(animation)),
            Err(err) => {
                error!(queue = %self.machine.id(), %err, "animation skipped");
                None
            }
        }
    }

    /// Appends a nested queue as a single member.
    pub fn push_queue(&mut self, queue: Self) -> Option<AnimationId> {
        self.push_member(Box::new(queue))
    }

    /// Removes a member by id and returns it.
    ///
    /// A member removed mid-run counts as ended for its bucket's join.
    pub fn remove(&mut self, id: &AnimationId) -> Option<Box<dyn Lifecycle>> {
        let core = self.machine.behavior_mut();
        if id == core.sentinel_id() {
            error!(queue = %core.id, "the sentinel cannot be removed");
            return None;
        }
        let Some(pos) = core.position(id) else {
            let err = AnimationError::NotFound(id.clone());
            error!(queue = %core.id, %err, "remove failed");
            return None;
        };
        let mut member = core.members.remove(pos);
        core.unwire(member.as_mut());
        core.connected = false;
        if let Some(active) = core.active {
            if core.buckets[active].contains(id) {
                core.inbox.borrow_mut().push(Signal {
                    id: id.clone(),
                    phase: Phase::End,
                    data: EventData::None,
                    republish: false,
                });
            }
        }
        Some(member)
    }

    /// Groups members into buckets by `priority` and wires their events.
    ///
    /// Reconnecting replaces the previous wiring, so no member reports twice.
    pub fn connect(&mut self, priority: Priority) {
        self.machine.behavior_mut().connect(priority);
    }
}

impl Lifecycle for AnimationQueue {
    fn id(&self) -> &AnimationId {
        self.machine.id()
    }

    fn state(&self) -> crate::LifecycleState {
        self.machine.state()
    }

    fn is_looping(&self) -> bool {
        self.machine.is_looping()
    }

    fn init(&mut self, now: Time) -> Result<(), AnimationError> {
        self.machine.init(now)
    }

    fn play(&mut self, now: Time) -> Result<(), AnimationError> {
        self.machine.play(now)
    }

    fn destroy(&mut self, now: Time) -> Result<(), AnimationError> {
        self.machine.destroy(now)
    }

    fn tick(&mut self, now: Time) -> Result<(), AnimationError> {
        self.machine.tick(now)
    }

    fn events(&mut self) -> &mut EventBus<AnimationEvent> {
        self.machine.events()
    }

    fn drain_updates(&mut self, out: &mut Vec<PropertyUpdate>) {
        self.machine.drain_updates(out);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::animation::{AnimationKind, AnimationParams, RampParams, RotateParams};
    use crate::lifecycle::LifecycleState;

    type Log = Rc<RefCell<Vec<(String, Phase, u64)>>>;

    fn fade(id: &str, ms: u64) -> AnimationSpec {
        AnimationSpec::new(AnimationParams::Fade(RampParams::default()))
            .with_id(id)
            .with_duration(Duration(ms))
    }

    /// Records member starts/ends from the queue's process stream, plus the queue's own
    /// start/end under its id.
    fn record(queue: &mut AnimationQueue) -> Log {
        let log: Log = Rc::default();
        let sink = log.clone();
        queue.events().on(names::PROCESS, "test", move |e| {
            if let EventData::Member(m) = &e.data {
                if m.state != Phase::Process {
                    sink.borrow_mut()
                        .push((m.id.as_str().into(), m.state, e.at.millis()));
                }
            }
            Ok(())
        });
        for (name, phase) in [(names::START, Phase::Start), (names::END, Phase::End)] {
            let sink = log.clone();
            queue.events().on(name, "test", move |e| {
                sink.borrow_mut()
                    .push((e.source.as_str().into(), phase, e.at.millis()));
                Ok(())
            });
        }
        log
    }

    fn entries(log: &Log) -> Vec<(String, Phase, u64)> {
        log.borrow().clone()
    }

    fn owned(expected: &[(&str, Phase, u64)]) -> Vec<(String, Phase, u64)> {
        expected
            .iter()
            .map(|(id, phase, at)| (String::from(*id), *phase, *at))
            .collect()
    }

    fn run(queue: &mut AnimationQueue, until: u64) {
        let mut t = 0;
        while t <= until {
            if t == 0 {
                queue.play(Time(0)).unwrap();
            } else {
                queue.tick(Time(t)).unwrap();
            }
            t += 50;
        }
    }

    #[test]
    fn default_priority_is_a_strict_chain() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        for id in ["a", "b", "c"] {
            q.push_animation(fade(id, 100)).unwrap();
        }
        let log = record(&mut q);
        run(&mut q, 300);
        assert_eq!(
            entries(&log),
            owned(&[
                ("q", Phase::Start, 0),
                ("a", Phase::Start, 0),
                ("a", Phase::End, 100),
                ("b", Phase::Start, 100),
                ("b", Phase::End, 200),
                ("c", Phase::Start, 200),
                ("c", Phase::End, 300),
                ("q", Phase::End, 300),
            ])
        );
        assert!(q.is_connected());
        assert_eq!(q.state(), LifecycleState::Ended);
    }

    #[test]
    fn shared_rank_starts_together_and_joins() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        q.push_animation(fade("a", 100)).unwrap();
        q.push_animation(fade("b", 100)).unwrap();
        q.push_animation(fade("c", 200)).unwrap();
        q.connect(Priority::Ranks(vec![0, 1, 1]));
        let log = record(&mut q);
        run(&mut q, 300);
        assert_eq!(
            entries(&log),
            owned(&[
                ("q", Phase::Start, 0),
                ("a", Phase::Start, 0),
                ("a", Phase::End, 100),
                ("b", Phase::Start, 100),
                ("c", Phase::Start, 100),
                ("b", Phase::End, 200),
                ("c", Phase::End, 300),
                ("q", Phase::End, 300),
            ])
        );
    }

    #[test]
    fn sparse_ranks_keep_their_order() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        for id in ["a", "b", "c"] {
            q.push_animation(fade(id, 100)).unwrap();
        }
        q.connect(Priority::Ranks(vec![7, 1_000_000_000, 7]));
        let log = record(&mut q);
        run(&mut q, 300);
        assert_eq!(q.state(), LifecycleState::Ended);

        let at = |id: &str, phase: Phase| {
            entries(&log)
                .iter()
                .find(|(i, p, _)| *i == id && *p == phase)
                .map(|(_, _, at)| *at)
                .unwrap()
        };
        assert_eq!(at("a", Phase::Start), 0);
        assert_eq!(at("c", Phase::Start), 0);
        assert_eq!(at("b", Phase::Start), 100);
        assert_eq!(at("q", Phase::End), 200);
    }

    #[test]
    fn extreme_rank_connects_without_a_dense_table() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        q.push_animation(fade("a", 100)).unwrap();
        q.push_animation(fade("b", 100)).unwrap();
        q.connect(Priority::Ranks(vec![usize::MAX, 0]));
        let log = record(&mut q);
        run(&mut q, 200);
        assert_eq!(q.state(), LifecycleState::Ended);
        let starts: Vec<String> = entries(&log)
            .into_iter()
            .filter(|(id, phase, _)| *phase == Phase::Start && id != "q")
            .map(|(id, _, _)| id)
            .collect();
        assert_eq!(starts, vec![String::from("b"), String::from("a")]);
    }

    #[test]
    fn process_events_carry_the_member_rank() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        q.push_animation(fade("a", 0)).unwrap();
        q.push_animation(fade("b", 0)).unwrap();
        q.connect(Priority::computed(|ids| vec![0; ids.len()]));
        let ranks: Rc<RefCell<Vec<(String, usize)>>> = Rc::default();
        let sink = ranks.clone();
        q.events().on(names::PROCESS, "test", move |e| {
            if let EventData::Member(m) = &e.data {
                if m.state == Phase::Start {
                    sink.borrow_mut().push((m.id.as_str().into(), m.priority));
                }
            }
            Ok(())
        });
        q.play(Time(0)).unwrap();
        assert_eq!(
            *ranks.borrow(),
            vec![(String::from("a"), 0), (String::from("b"), 0)]
        );
        assert_eq!(q.state(), LifecycleState::Ended);
    }

    #[test]
    fn reconnecting_never_double_reports() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        q.push_animation(fade("a", 0)).unwrap();
        q.connect(Priority::Sequential);
        q.connect(Priority::Sequential);
        let log = record(&mut q);
        q.play(Time(0)).unwrap();
        let starts = entries(&log)
            .iter()
            .filter(|(id, phase, _)| *id == "a" && *phase == Phase::Start)
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn generated_ids_use_the_queue_prefix() {
        let mut q = AnimationQueue::new(QueueOptions::new("bars"));
        let id = q
            .push_animation(AnimationSpec::from_tag("zoom").unwrap())
            .unwrap();
        assert_eq!(id.as_str(), "bars/0");
        assert_eq!(q.sentinel_id().as_str(), "bars/sentinel");
        // Ids are unique within a queue.
        assert_eq!(q.push_animation(fade("bars/0", 10)), None);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn unknown_kind_is_skipped() {
        let mut registry = AnimationRegistry::default();
        registry.unregister(AnimationKind::Rotate);
        let mut q = AnimationQueue::new(QueueOptions::new("q")).with_registry(registry);
        q.push_animation(fade("a", 10)).unwrap();
        let spin = AnimationSpec::new(AnimationParams::Rotate(RotateParams::default()));
        assert_eq!(q.push_animation(spin), None);
        assert_eq!(q.len(), 1);
        assert!("spin".parse::<AnimationKind>().is_err());
    }

    #[test]
    fn remove_reports_missing_ids_and_protects_the_sentinel() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        q.push_animation(fade("a", 10)).unwrap();
        assert!(q.remove(&AnimationId::from("nope")).is_none());
        let sentinel = q.sentinel_id().clone();
        assert!(q.remove(&sentinel).is_none());
        q.connect(Priority::Sequential);
        let removed = q.remove(&AnimationId::from("a")).unwrap();
        assert_eq!(removed.id().as_str(), "a");
        assert!(q.is_empty());
        assert!(!q.is_connected());
    }

    #[test]
    fn removing_a_running_member_releases_the_join() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        q.push_animation(fade("a", 100)).unwrap();
        q.push_animation(fade("b", 1000)).unwrap();
        q.push_animation(fade("c", 100)).unwrap();
        q.connect(Priority::Ranks(vec![0, 0, 1]));
        let log = record(&mut q);
        q.play(Time(0)).unwrap();
        q.remove(&AnimationId::from("b")).unwrap();
        q.tick(Time(50)).unwrap();
        q.tick(Time(100)).unwrap();
        assert!(entries(&log).contains(&("c".into(), Phase::Start, 100)));
    }

    #[test]
    fn destroy_leaves_only_the_sentinel() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        for id in ["a", "b", "c"] {
            q.push_animation(fade(id, 100)).unwrap();
        }
        q.play(Time(0)).unwrap();
        q.destroy(Time(10)).unwrap();
        assert!(q.is_empty());
        assert_eq!(q.member_ids().count(), 0);
        assert_eq!(q.state(), LifecycleState::Destroyed);
        assert!(!q.is_connected());
    }

    #[test]
    fn destroy_overflow_is_fatal() {
        let options = QueueOptions::new("q").with_max_destroy_iterations(2);
        let mut q = AnimationQueue::new(options);
        for id in ["a", "b", "c"] {
            q.push_animation(fade(id, 100)).unwrap();
        }
        let err = q.destroy(Time(0)).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err,
            AnimationError::DestroyOverflow {
                queue: AnimationId::from("q"),
                limit: 2,
            }
        );
    }

    #[test]
    fn nested_queue_runs_as_one_member() {
        let mut inner = AnimationQueue::new(QueueOptions::new("inner"));
        inner.push_animation(fade("i1", 100)).unwrap();
        inner.push_animation(fade("i2", 100)).unwrap();

        let mut outer = AnimationQueue::new(QueueOptions::new("outer"));
        outer.push_animation(fade("x", 100)).unwrap();
        outer.push_queue(inner).unwrap();
        let log = record(&mut outer);
        run(&mut outer, 300);
        let got = entries(&log);
        assert!(got.contains(&("inner".into(), Phase::Start, 100)));
        assert!(got.contains(&("inner".into(), Phase::End, 300)));
        assert_eq!(got.last(), Some(&("outer".into(), Phase::End, 300)));
    }

    #[test]
    fn looping_queue_restarts_from_the_top() {
        let options = QueueOptions::new("q").with_looping(true);
        let mut q = AnimationQueue::new(options);
        q.push_animation(fade("a", 150)).unwrap();
        let log = record(&mut q);
        q.play(Time(0)).unwrap();
        q.tick(Time(150)).unwrap();
        q.tick(Time(300)).unwrap();
        let starts: Vec<u64> = entries(&log)
            .iter()
            .filter(|(id, phase, _)| *id == "a" && *phase == Phase::Start)
            .map(|(_, _, at)| *at)
            .collect();
        assert_eq!(starts, vec![0, 150, 300]);
        assert_eq!(q.state(), LifecycleState::Playing);
    }

    #[test]
    fn empty_looping_queue_does_not_spin() {
        let mut q = AnimationQueue::new(QueueOptions::new("q").with_looping(true));
        q.play(Time(0)).unwrap();
        assert_eq!(q.state(), LifecycleState::Ended);
    }

    #[test]
    fn updates_drain_from_every_member() {
        let mut q = AnimationQueue::new(QueueOptions::new("q"));
        q.push_animation(fade("a", 100).with_targets([crate::Handle(1), crate::Handle(2)]))
            .unwrap();
        q.play(Time(0)).unwrap();
        let mut out = Vec::new();
        q.drain_updates(&mut out);
        // Init resets both targets, then the first progress step updates both.
        assert_eq!(out.len(), 4);
    }
}
