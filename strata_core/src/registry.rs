// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kind-tag dispatch from [`AnimationSpec`]s to behaviors.

extern crate alloc;

use alloc::boxed::Box;
use core::fmt;

use hashbrown::HashMap;
use tracing::trace;

use crate::animation::{
    Animation, AnimationContext, AnimationKind, AnimationParams, AnimationSpec, Empty,
    PathParams, RampParams, RotateParams,
};
use crate::lifecycle::{Behavior, StateMachine};
use crate::path_motion::PathMotion;
use crate::ramp::{Ramp, RampProperty};
use crate::rotate::Rotate;
use crate::{AnimationError, AnimationId};

/// Builds the behavior for one animation kind.
pub type AnimationFactory =
    fn(&AnimationId, &AnimationSpec, &AnimationContext) -> Box<dyn Behavior>;

/// Maps animation kinds to factories.
///
/// Every built-in kind is registered by default. New behavior for a kind is added by
/// registering a factory, never by branching at the call site.
#[derive(Clone)]
pub struct AnimationRegistry {
    factories: HashMap<AnimationKind, AnimationFactory>,
}

impl fmt::Debug for AnimationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl Default for AnimationRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(AnimationKind::Empty, build_empty);
        registry.register(AnimationKind::Fade, build_fade);
        registry.register(AnimationKind::Zoom, build_zoom);
        registry.register(AnimationKind::Rotate, build_rotate);
        registry.register(AnimationKind::Path, build_path);
        registry
    }
}

impl AnimationRegistry {
    /// Creates a registry with no factories.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers (or replaces) the factory for `kind`.
    pub fn register(&mut self, kind: AnimationKind, factory: AnimationFactory) {
        self.factories.insert(kind, factory);
    }

    /// Removes the factory for `kind`, returning whether one was registered.
    pub fn unregister(&mut self, kind: AnimationKind) -> bool {
        self.factories.remove(&kind).is_some()
    }

    /// Returns `true` if `kind` can be built.
    pub fn contains(&self, kind: AnimationKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Builds an animation from `spec`.
    pub fn build(
        &self,
        id: AnimationId,
        spec: &AnimationSpec,
        ctx: &AnimationContext,
    ) -> Result<Animation, AnimationError> {
        let kind = spec.kind();
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| AnimationError::UnknownKind(kind.as_str().into()))?;
        trace!(%id, %kind, "building animation");
        let behavior = factory(&id, spec, ctx);
        Ok(StateMachine::new(id, behavior, spec.looping, ctx.throttle))
    }
}

fn build_empty(_: &AnimationId, spec: &AnimationSpec, _: &AnimationContext) -> Box<dyn Behavior> {
    Box::new(Empty::new(spec.delay, spec.duration))
}

fn ramp(property: RampProperty, params: RampParams, spec: &AnimationSpec) -> Box<dyn Behavior> {
    Box::new(Ramp::new(
        property,
        spec.targets.clone(),
        params,
        spec.duration,
        spec.delay,
        spec.ease,
    ))
}

fn build_fade(_: &AnimationId, spec: &AnimationSpec, _: &AnimationContext) -> Box<dyn Behavior> {
    let params = match spec.params {
        AnimationParams::Fade(p) => p,
        _ => RampParams::default(),
    };
    ramp(RampProperty::Opacity, params, spec)
}

fn build_zoom(_: &AnimationId, spec: &AnimationSpec, _: &AnimationContext) -> Box<dyn Behavior> {
    let params = match spec.params {
        AnimationParams::Zoom(p) => p,
        _ => RampParams::default(),
    };
    ramp(RampProperty::Scale, params, spec)
}

fn build_rotate(_: &AnimationId, spec: &AnimationSpec, _: &AnimationContext) -> Box<dyn Behavior> {
    let params = match spec.params {
        AnimationParams::Rotate(p) => p,
        _ => RotateParams::default(),
    };
    Box::new(Rotate::new(
        spec.targets.clone(),
        params,
        spec.duration,
        spec.delay,
        spec.ease,
    ))
}

fn build_path(id: &AnimationId, spec: &AnimationSpec, ctx: &AnimationContext) -> Box<dyn Behavior> {
    let default;
    let params = match &spec.params {
        AnimationParams::Path(p) => p,
        _ => {
            default = PathParams::default();
            &default
        }
    };
    Box::new(PathMotion::new(
        id.clone(),
        spec.targets.clone(),
        params,
        ctx.engine,
        spec.duration,
        spec.delay,
        spec.ease,
    ))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::Lifecycle;
    use crate::lifecycle::LifecycleState;
    use crate::time::{Duration, Time};

    #[test]
    fn builds_every_registered_kind() {
        let registry = AnimationRegistry::default();
        let ctx = AnimationContext::default();
        for kind in AnimationKind::ALL {
            let spec = AnimationSpec::new(AnimationParams::default_for(kind))
                .with_duration(Duration(10));
            let mut anim = registry
                .build(AnimationId::from(kind.as_str()), &spec, &ctx)
                .unwrap();
            anim.play(Time(0)).unwrap();
            anim.tick(Time(10)).unwrap();
            assert_eq!(anim.state(), LifecycleState::Ended, "{kind}");
        }
    }

    #[test]
    fn unregistered_kind_is_unknown() {
        let mut registry = AnimationRegistry::default();
        assert!(registry.unregister(AnimationKind::Rotate));
        let spec = AnimationSpec::new(AnimationParams::Rotate(RotateParams::default()));
        let err = registry
            .build(AnimationId::from("r"), &spec, &AnimationContext::default())
            .unwrap_err();
        assert_eq!(err, AnimationError::UnknownKind("rotate".into()));
    }
}
