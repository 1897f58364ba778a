// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event and animation plumbing for `strata` charts.
//!
//! This crate holds the timing half of chart composition:
//! - **[`EventBus`]**: named, category-tagged publish/subscribe with idempotent rewiring.
//! - **[`StateMachine`]**: the guarded, throttled, error-isolating animation lifecycle.
//! - **Animation kinds** (empty, fade, zoom, rotate, path) built through an
//!   [`AnimationRegistry`], emitting [`PropertyUpdate`]s rather than drawing.
//! - **[`AnimationQueue`]**: priority-grouped sequencing with bucket joins, nesting and
//!   looping.
//!
//! There is no wall clock. Every lifecycle call takes the current [`Time`], and timers
//! advance only when the owner calls [`Lifecycle::tick`].
//!
//! Diagnostics go through `tracing`; the crate never installs a subscriber.

#![no_std]

extern crate alloc;

mod animation;
mod ease;
mod error;
mod event;
#[cfg(not(feature = "std"))]
mod float;
mod lifecycle;
mod path_motion;
mod queue;
mod ramp;
mod registry;
mod rotate;
mod throttle;
mod time;

pub use animation::{
    Animation, AnimationContext, AnimationKind, AnimationParams, AnimationSpec, Engine, Handle,
    PathParams, Property, PropertyUpdate, RampParams, RotateParams,
};
pub use ease::Ease;
pub use error::{AnimationError, ListenerError};
pub use event::{Callback, EventBus, ListenerId};
pub use lifecycle::{
    AnimationEvent, AnimationId, Behavior, EventData, Lifecycle, LifecycleState, MemberProgress,
    Phase, StateMachine, Step, Steps, names,
};
pub use queue::{AnimationQueue, Priority, QueueOptions, RankFn};
pub use registry::{AnimationFactory, AnimationRegistry};
pub use throttle::{Gate, Throttle};
pub use time::{Duration, Time};
