// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotation (the `rotate` kind).

extern crate alloc;

use alloc::vec::Vec;

use crate::animation::{Handle, Property, PropertyUpdate, RotateParams, Schedule};
use crate::ease::Ease;
use crate::lifecycle::{Behavior, Steps};
use crate::time::{Duration, Time};
use crate::AnimationError;

#[derive(Debug)]
pub(crate) struct Rotate {
    targets: Vec<Handle>,
    params: RotateParams,
    ease: Ease,
    schedule: Schedule,
    updates: Vec<PropertyUpdate>,
}

impl Rotate {
    pub(crate) fn new(
        targets: Vec<Handle>,
        params: RotateParams,
        duration: Duration,
        delay: Duration,
        ease: Ease,
    ) -> Self {
        Self {
            targets,
            params,
            ease,
            schedule: Schedule::new(delay, duration, ease),
            updates: Vec::new(),
        }
    }

    fn degrees_at(&self, elapsed: Duration) -> f64 {
        let length = self.schedule.length();
        let t = if length.is_zero() {
            1.0
        } else {
            (elapsed.as_f64() / length.as_f64()).min(1.0)
        };
        match self.params {
            // A spin keeps a constant angular speed.
            RotateParams::Continuous { turns } => 360.0 * turns * t,
            RotateParams::Fixed { degrees } => degrees * self.ease.apply(t),
        }
    }

    fn emit(&mut self, degrees: f64) {
        self.updates
            .extend(self.targets.iter().map(|target| PropertyUpdate {
                target: *target,
                property: Property::Rotation(degrees),
            }));
    }
}

impl Behavior for Rotate {
    fn init(&mut self, _now: Time) -> Result<(), AnimationError> {
        self.emit(0.0);
        Ok(())
    }

    fn play(&mut self, now: Time) -> Result<(), AnimationError> {
        self.schedule.arm(now);
        Ok(())
    }

    fn destroy(&mut self, _now: Time) -> Result<(), AnimationError> {
        self.schedule.disarm();
        self.emit(0.0);
        Ok(())
    }

    fn poll(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
        if let Some(elapsed) = self.schedule.poll(now, steps) {
            let degrees = self.degrees_at(elapsed);
            self.emit(degrees);
        }
        Ok(())
    }

    fn drain_updates(&mut self, out: &mut Vec<PropertyUpdate>) {
        out.append(&mut self.updates);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn last_rotation(r: &mut Rotate) -> Option<f64> {
        let mut out = Vec::new();
        r.drain_updates(&mut out);
        out.last().map(|u| match u.property {
            Property::Rotation(d) => d,
            other => panic!("unexpected property {other:?}"),
        })
    }

    #[test]
    fn continuous_spin_is_linear_in_time() {
        let mut r = Rotate::new(
            alloc::vec![Handle(1)],
            RotateParams::Continuous { turns: 2.0 },
            Duration(400),
            Duration::ZERO,
            Ease::InCubic,
        );
        let mut steps = Steps::new();
        r.play(Time(0)).unwrap();
        r.poll(Time(100), &mut steps).unwrap();
        assert_eq!(last_rotation(&mut r), Some(180.0));
        r.poll(Time(400), &mut steps).unwrap();
        assert_eq!(last_rotation(&mut r), Some(720.0));
    }

    #[test]
    fn fixed_rotation_eases_to_target() {
        let mut r = Rotate::new(
            alloc::vec![Handle(1)],
            RotateParams::Fixed { degrees: 90.0 },
            Duration(100),
            Duration::ZERO,
            Ease::Linear,
        );
        let mut steps = Steps::new();
        r.play(Time(0)).unwrap();
        r.poll(Time(50), &mut steps).unwrap();
        assert_eq!(last_rotation(&mut r), Some(45.0));
        r.destroy(Time(60)).unwrap();
        assert_eq!(last_rotation(&mut r), Some(0.0));
    }
}
