// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation descriptions and the shared timing helper.
//!
//! An [`AnimationSpec`] describes one animation: its targets, timing, and the
//! kind-specific [`AnimationParams`]. The [`AnimationRegistry`](crate::AnimationRegistry)
//! turns a spec into an [`Animation`], a [`StateMachine`] wrapping the kind's behavior.
//!
//! Animations never touch a rendering backend. They emit [`PropertyUpdate`]s which the
//! owner drains with [`Lifecycle::drain_updates`](crate::Lifecycle::drain_updates) and
//! applies to its targets.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use kurbo::{BezPath, Vec2};

use crate::ease::Ease;
use crate::lifecycle::{Behavior, EventData, StateMachine, Step, Steps};
use crate::throttle::Throttle;
use crate::time::{Duration, Time};
use crate::{AnimationError, AnimationId};

/// A wrapped animation of any kind.
pub type Animation = StateMachine<Box<dyn Behavior>>;

/// Opaque handle to a rendering target, owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

/// Rendering engine family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Declarative element tree.
    #[default]
    Svg,
    /// Retained scene graph.
    Canvas,
}

/// An animatable visual property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Property {
    /// Opacity in `[0, 1]`.
    Opacity(f64),
    /// Uniform scale factor.
    Scale(f64),
    /// Rotation in degrees.
    Rotation(f64),
    /// Offset from the target's resting position.
    Translate(Vec2),
}

/// A property value to apply to one target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyUpdate {
    /// The target to update.
    pub target: Handle,
    /// The new value.
    pub property: Property,
}

/// The closed set of animation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// No visual effect; timing only.
    Empty,
    /// Opacity ramp.
    Fade,
    /// Scale ramp.
    Zoom,
    /// Rotation.
    Rotate,
    /// Motion along a guide path.
    Path,
}

impl AnimationKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [Self::Empty, Self::Fade, Self::Zoom, Self::Rotate, Self::Path];

    /// Returns the type tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Fade => "fade",
            Self::Zoom => "zoom",
            Self::Rotate => "rotate",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationKind {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AnimationError::UnknownKind(s.into()))
    }
}

/// Parameters shared by the opacity and scale ramps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RampParams {
    /// Value at the start of the ramp.
    pub from: f64,
    /// Value at the end of the forward trip.
    pub to: f64,
    /// Whether to return to `from` after reaching `to`.
    pub alternate: bool,
    /// Start offset between consecutive targets.
    pub stagger: Duration,
}

impl Default for RampParams {
    fn default() -> Self {
        Self {
            from: 0.0,
            to: 1.0,
            alternate: false,
            stagger: Duration::ZERO,
        }
    }
}

impl RampParams {
    /// Creates a ramp from `from` to `to`.
    pub fn new(from: f64, to: f64) -> Self {
        Self {
            from,
            to,
            ..Self::default()
        }
    }

    /// Enables or disables the return trip.
    pub fn with_alternate(mut self, alternate: bool) -> Self {
        self.alternate = alternate;
        self
    }

    /// Sets the per-target start offset.
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }
}

/// Rotation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotateParams {
    /// Spin by whole or fractional turns over the duration.
    Continuous {
        /// Number of turns.
        turns: f64,
    },
    /// Ramp from 0 to a fixed angle.
    Fixed {
        /// Final angle in degrees.
        degrees: f64,
    },
}

impl Default for RotateParams {
    fn default() -> Self {
        Self::Continuous { turns: 1.0 }
    }
}

/// Path motion parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PathParams {
    /// The guide path, in the targets' coordinate space.
    pub path: BezPath,
    /// Arc-length accuracy.
    pub accuracy: f64,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            path: BezPath::new(),
            accuracy: 1e-3,
        }
    }
}

impl PathParams {
    /// Creates path motion along `path`.
    pub fn new(path: BezPath) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }
}

/// Kind-specific parameters; the variant selects the kind.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationParams {
    /// See [`AnimationKind::Empty`].
    Empty,
    /// See [`AnimationKind::Fade`].
    Fade(RampParams),
    /// See [`AnimationKind::Zoom`].
    Zoom(RampParams),
    /// See [`AnimationKind::Rotate`].
    Rotate(RotateParams),
    /// See [`AnimationKind::Path`].
    Path(PathParams),
}

impl AnimationParams {
    /// Returns the kind these parameters belong to.
    pub fn kind(&self) -> AnimationKind {
        match self {
            Self::Empty => AnimationKind::Empty,
            Self::Fade(_) => AnimationKind::Fade,
            Self::Zoom(_) => AnimationKind::Zoom,
            Self::Rotate(_) => AnimationKind::Rotate,
            Self::Path(_) => AnimationKind::Path,
        }
    }

    /// Returns default parameters for `kind`.
    pub fn default_for(kind: AnimationKind) -> Self {
        match kind {
            AnimationKind::Empty => Self::Empty,
            AnimationKind::Fade => Self::Fade(RampParams::default()),
            AnimationKind::Zoom => Self::Zoom(RampParams::default()),
            AnimationKind::Rotate => Self::Rotate(RotateParams::default()),
            AnimationKind::Path => Self::Path(PathParams::default()),
        }
    }
}

/// Describes one animation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSpec {
    /// Explicit id; queues generate one when absent.
    pub id: Option<AnimationId>,
    /// Rendering targets.
    pub targets: Vec<Handle>,
    /// Length of one forward run.
    pub duration: Duration,
    /// Wait between `play` and `start`.
    pub delay: Duration,
    /// Easing of the progress.
    pub ease: Ease,
    /// Whether `end` replays the animation.
    pub looping: bool,
    /// Kind-specific parameters.
    pub params: AnimationParams,
}

impl AnimationSpec {
    /// Default duration of a run.
    pub const DEFAULT_DURATION: Duration = Duration(1000);

    /// Creates a spec with default timing.
    pub fn new(params: AnimationParams) -> Self {
        Self {
            id: None,
            targets: Vec::new(),
            duration: Self::DEFAULT_DURATION,
            delay: Duration::ZERO,
            ease: Ease::default(),
            looping: false,
            params,
        }
    }

    /// Creates a spec with default parameters from a type tag such as `"fade"`.
    pub fn from_tag(tag: &str) -> Result<Self, AnimationError> {
        let kind = tag.parse::<AnimationKind>()?;
        Ok(Self::new(AnimationParams::default_for(kind)))
    }

    /// Returns the kind selected by the parameters.
    pub fn kind(&self) -> AnimationKind {
        self.params.kind()
    }

    /// Sets the id.
    pub fn with_id(mut self, id: impl Into<AnimationId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the targets.
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Handle>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Sets the run duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the start delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the easing.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Enables or disables looping.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::new(AnimationParams::Empty)
    }
}

/// Environment in which animations are built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationContext {
    /// Rendering engine the targets belong to.
    pub engine: Engine,
    /// Coalescing window for `init`/`play`/`destroy`.
    pub throttle: Duration,
}

impl Default for AnimationContext {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            throttle: Throttle::DEFAULT_WINDOW,
        }
    }
}

/// Delay/active-phase deadline tracking shared by every timed behavior.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Schedule {
    delay: Duration,
    length: Duration,
    ease: Ease,
    armed: Option<Time>,
    started: bool,
}

impl Schedule {
    pub(crate) fn new(delay: Duration, length: Duration, ease: Ease) -> Self {
        Self {
            delay,
            length,
            ease,
            armed: None,
            started: false,
        }
    }

    pub(crate) fn length(&self) -> Duration {
        self.length
    }

    pub(crate) fn arm(&mut self, now: Time) {
        self.armed = Some(now);
        self.started = false;
    }

    pub(crate) fn disarm(&mut self) {
        self.armed = None;
        self.started = false;
    }

    /// Pushes the steps due at `now` and returns the elapsed active time.
    ///
    /// Returns `None` while disarmed or still inside the delay.
    pub(crate) fn poll(&mut self, now: Time, steps: &mut Steps) -> Option<Duration> {
        let begin = self.armed? + self.delay;
        if now < begin {
            return None;
        }
        if !self.started {
            self.started = true;
            steps.push(Step::Start(EventData::None));
        }
        let elapsed = now.saturating_since(begin);
        if elapsed >= self.length {
            self.disarm();
            steps.push(Step::Process(EventData::Progress(1.0)));
            steps.push(Step::End(EventData::None));
            return Some(self.length);
        }
        let t = elapsed.as_f64() / self.length.as_f64();
        steps.push(Step::Process(EventData::Progress(self.ease.apply(t))));
        Some(elapsed)
    }
}

/// The no-op animation: timing only.
#[derive(Debug)]
pub(crate) struct Empty {
    schedule: Schedule,
}

impl Empty {
    pub(crate) fn new(delay: Duration, duration: Duration) -> Self {
        Self {
            schedule: Schedule::new(delay, duration, Ease::Linear),
        }
    }
}

impl Behavior for Empty {
    fn play(&mut self, now: Time) -> Result<(), AnimationError> {
        self.schedule.arm(now);
        Ok(())
    }

    fn destroy(&mut self, _now: Time) -> Result<(), AnimationError> {
        self.schedule.disarm();
        Ok(())
    }

    fn poll(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
        self.schedule.poll(now, steps);
        Ok(())
    }
}
