// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opacity and scale ramps (the `fade` and `zoom` kinds).

extern crate alloc;

use alloc::vec::Vec;

use crate::animation::{Handle, Property, PropertyUpdate, RampParams, Schedule};
use crate::ease::Ease;
use crate::lifecycle::{Behavior, Steps};
use crate::time::{Duration, Time};
use crate::AnimationError;

/// Which property a ramp drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RampProperty {
    Opacity,
    Scale,
}

impl RampProperty {
    fn make(self, value: f64) -> Property {
        match self {
            Self::Opacity => Property::Opacity(value),
            Self::Scale => Property::Scale(value),
        }
    }
}

/// A staggered, optionally alternating ramp over several targets.
#[derive(Debug)]
pub(crate) struct Ramp {
    property: RampProperty,
    targets: Vec<Handle>,
    params: RampParams,
    duration: Duration,
    ease: Ease,
    schedule: Schedule,
    updates: Vec<PropertyUpdate>,
}

impl Ramp {
    pub(crate) fn new(
        property: RampProperty,
        targets: Vec<Handle>,
        params: RampParams,
        duration: Duration,
        delay: Duration,
        ease: Ease,
    ) -> Self {
        let run = if params.alternate {
            duration * 2
        } else {
            duration
        };
        let spread = params.stagger * (targets.len().saturating_sub(1) as u64);
        Self {
            property,
            targets,
            params,
            duration,
            ease,
            schedule: Schedule::new(delay, spread + run, ease),
            updates: Vec::new(),
        }
    }

    /// Value for the target at `index` when the active phase has run for `elapsed`.
    fn value_at(&self, index: usize, elapsed: Duration) -> f64 {
        let RampParams {
            from,
            to,
            alternate,
            stagger,
        } = self.params;
        let local = elapsed.saturating_sub(stagger * index as u64);
        let t = if self.duration.is_zero() {
            if alternate { 0.0 } else { 1.0 }
        } else {
            let x = local.as_f64() / self.duration.as_f64();
            if alternate {
                let x = x.min(2.0);
                if x > 1.0 { 2.0 - x } else { x }
            } else {
                x.min(1.0)
            }
        };
        from + (to - from) * self.ease.apply(t)
    }

    fn emit_all(&mut self, value: impl Fn(usize) -> f64) {
        for (index, target) in self.targets.iter().enumerate() {
            self.updates.push(PropertyUpdate {
                target: *target,
                property: self.property.make(value(index)),
            });
        }
    }
}

impl Behavior for Ramp {
    fn init(&mut self, _now: Time) -> Result<(), AnimationError> {
        let from = self.params.from;
        self.emit_all(|_| from);
        Ok(())
    }

    fn play(&mut self, now: Time) -> Result<(), AnimationError> {
        self.schedule.arm(now);
        Ok(())
    }

    fn destroy(&mut self, _now: Time) -> Result<(), AnimationError> {
        self.schedule.disarm();
        self.emit_all(|_| 1.0);
        Ok(())
    }

    fn poll(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
        let Some(elapsed) = self.schedule.poll(now, steps) else {
            return Ok(());
        };
        let values: Vec<f64> = (0..self.targets.len())
            .map(|index| self.value_at(index, elapsed))
            .collect();
        self.emit_all(|index| values[index]);
        Ok(())
    }

    fn drain_updates(&mut self, out: &mut Vec<PropertyUpdate>) {
        out.append(&mut self.updates);
    }
}
