// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Motion along a guide path (the `path` kind).
//!
//! Targets are translated by the offset between the path start and the point at eased
//! arc-length fraction `t`. The canvas engine cannot drive path motion; there the
//! animation keeps its timing but emits nothing.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{ParamCurve, ParamCurveArclen, PathSeg, Point, Vec2};
use tracing::warn;

use crate::animation::{Engine, Handle, PathParams, Property, PropertyUpdate, Schedule};
use crate::ease::Ease;
use crate::lifecycle::{Behavior, Steps};
use crate::time::{Duration, Time};
use crate::{AnimationError, AnimationId};

#[derive(Debug)]
pub(crate) struct PathMotion {
    id: AnimationId,
    targets: Vec<Handle>,
    segments: Vec<(PathSeg, f64)>,
    total: f64,
    accuracy: f64,
    supported: bool,
    ease: Ease,
    schedule: Schedule,
    updates: Vec<PropertyUpdate>,
}

impl PathMotion {
    pub(crate) fn new(
        id: AnimationId,
        targets: Vec<Handle>,
        params: &PathParams,
        engine: Engine,
        duration: Duration,
        delay: Duration,
        ease: Ease,
    ) -> Self {
        let segments: Vec<(PathSeg, f64)> = params
            .path
            .segments()
            .map(|seg| (seg, seg.arclen(params.accuracy)))
            .collect();
        let total = segments.iter().map(|(_, len)| len).sum();
        Self {
            id,
            targets,
            segments,
            total,
            accuracy: params.accuracy,
            supported: engine != Engine::Canvas,
            ease,
            schedule: Schedule::new(delay, duration, ease),
            updates: Vec::new(),
        }
    }

    fn origin(&self) -> Option<Point> {
        self.segments.first().map(|(seg, _)| seg.start())
    }

    /// Point at arc-length fraction `fraction` of the whole path.
    fn point_at(&self, fraction: f64) -> Option<Point> {
        let mut remaining = self.total * fraction.clamp(0.0, 1.0);
        for (seg, len) in &self.segments {
            if remaining <= *len {
                let t = if *len > 0.0 {
                    seg.inv_arclen(remaining, self.accuracy)
                } else {
                    0.0
                };
                return Some(seg.eval(t));
            }
            remaining -= len;
        }
        self.segments.last().map(|(seg, _)| seg.end())
    }

    fn emit(&mut self, offset: Vec2) {
        self.updates
            .extend(self.targets.iter().map(|target| PropertyUpdate {
                target: *target,
                property: Property::Translate(offset),
            }));
    }
}

impl Behavior for PathMotion {
    fn play(&mut self, now: Time) -> Result<(), AnimationError> {
        if !self.supported {
            warn!(id = %self.id, "path motion is not supported on the canvas engine");
        }
        self.schedule.arm(now);
        Ok(())
    }

    fn destroy(&mut self, _now: Time) -> Result<(), AnimationError> {
        self.schedule.disarm();
        if self.supported {
            self.emit(Vec2::ZERO);
        }
        Ok(())
    }

    fn poll(&mut self, now: Time, steps: &mut Steps) -> Result<(), AnimationError> {
        let Some(elapsed) = self.schedule.poll(now, steps) else {
            return Ok(());
        };
        if !self.supported {
            return Ok(());
        }
        let length = self.schedule.length();
        let t = if length.is_zero() {
            1.0
        } else {
            elapsed.as_f64() / length.as_f64()
        };
        if let (Some(origin), Some(point)) = (self.origin(), self.point_at(self.ease.apply(t))) {
            self.emit(point - origin);
        }
        Ok(())
    }

    fn drain_updates(&mut self, out: &mut Vec<PropertyUpdate>) {
        out.append(&mut self.updates);
    }
}
