// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kind-tag dispatch from layer kinds to behaviors.

extern crate alloc;

use alloc::boxed::Box;
use core::fmt;

use hashbrown::HashMap;

use crate::arc_layer::ArcLayer;
use crate::axis_layer::AxisLayer;
use crate::basemap_layer::BasemapLayer;
use crate::brush_layer::BrushLayer;
use crate::layer::{LayerBehavior, LayerKind, LayerSpec};
use crate::legend_layer::LegendLayer;
use crate::line_layer::LineLayer;
use crate::point_layer::PointLayer;
use crate::rect_layer::RectLayer;
use crate::text_layer::TextLayer;
use crate::ComposeError;

/// Builds the behavior for one layer kind.
pub type LayerFactory = fn(&LayerSpec) -> Box<dyn LayerBehavior>;

/// Maps layer kinds to factories.
///
/// Every built-in kind is registered by default; replacing a factory changes how that kind
/// draws for every chart using the registry.
#[derive(Clone)]
pub struct LayerRegistry {
    factories: HashMap<LayerKind, LayerFactory>,
}

impl fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(LayerKind::Axis, |_| Box::new(AxisLayer::default()));
        registry.register(LayerKind::Legend, |_| Box::new(LegendLayer::default()));
        registry.register(LayerKind::Rect, |_| Box::new(RectLayer));
        registry.register(LayerKind::Line, |_| Box::new(LineLayer));
        registry.register(LayerKind::Point, |_| Box::new(PointLayer));
        registry.register(LayerKind::Arc, |_| Box::new(ArcLayer::default()));
        registry.register(LayerKind::Basemap, |_| Box::new(BasemapLayer::default()));
        registry.register(LayerKind::Brush, |_| Box::new(BrushLayer::default()));
        registry.register(LayerKind::Text, |_| Box::new(TextLayer));
        registry
    }
}

impl LayerRegistry {
    /// Creates a registry with no factories.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers (or replaces) the factory for `kind`.
    pub fn register(&mut self, kind: LayerKind, factory: LayerFactory) {
        self.factories.insert(kind, factory);
    }

    /// Returns `true` if `kind` can be built.
    pub fn contains(&self, kind: LayerKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Builds the behavior for `spec`.
    pub fn build(&self, spec: &LayerSpec) -> Result<Box<dyn LayerBehavior>, ComposeError> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| ComposeError::UnknownKind(spec.kind.as_str().into()))?;
        Ok(factory(spec))
    }
}
