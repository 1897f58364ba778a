// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart: layer composition over one backend.
//!
//! A [`Chart`] owns its layers, the backend they draw into, the shared [`Tooltip`] and the
//! chart-wide pointer [`EventBus`]. It creates layers through a [`LayerRegistry`], runs
//! [`ScaleReconciler`] passes, and orders drawing so guides reflect the merged scales:
//! marks first, then the axis, then the legend.

extern crate alloc;

use alloc::format;
use alloc::vec::Vec;

use peniko::Color;
use strata_core::{AnimationError, Duration, Engine, EventBus, Throttle, Time};
use tracing::{debug, error, warn};

use crate::backend::Backend;
use crate::layer::{Layer, LayerCx, LayerData, LayerId, LayerKind, LayerSpec, PointerEvent};
use crate::layer_registry::LayerRegistry;
use crate::layout::{ChartLayout, Padding};
use crate::reconcile::{self, ScaleReconciler};
use crate::tooltip::{Tooltip, TooltipOptions};
use crate::{ChartError, ComposeError, ReconcileError};

/// Computes the chart regions from its configuration.
pub type LayoutCreator = fn(&ChartConfig) -> ChartLayout;

/// Category colors used when a chart sets none.
pub const DEFAULT_PALETTE: [Color; 10] = [
    Color::from_rgb8(0x1f, 0x77, 0xb4),
    Color::from_rgb8(0xff, 0x7f, 0x0e),
    Color::from_rgb8(0x2c, 0xa0, 0x2c),
    Color::from_rgb8(0xd6, 0x27, 0x28),
    Color::from_rgb8(0x94, 0x67, 0xbd),
    Color::from_rgb8(0x8c, 0x56, 0x4b),
    Color::from_rgb8(0xe3, 0x77, 0xc2),
    Color::from_rgb8(0x7f, 0x7f, 0x7f),
    Color::from_rgb8(0xbc, 0xbd, 0x22),
    Color::from_rgb8(0x17, 0xbe, 0xcf),
];

/// Chart construction options.
#[derive(Clone, Debug)]
pub struct ChartConfig {
    /// Width in scene units.
    pub width: f64,
    /// Height in scene units.
    pub height: f64,
    /// Shrink padding that does not fit.
    pub adjust: bool,
    /// Rendering engine family.
    pub engine: Engine,
    /// Padding around the main region.
    pub padding: Padding,
    /// Category colors.
    pub palette: Vec<Color>,
    /// Shared tooltip options.
    pub tooltip: TooltipOptions,
    /// Coalescing window for layer animation queues.
    pub throttle: Duration,
    /// Replaces the default arrange pass.
    pub layout_creator: Option<LayoutCreator>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::new(640.0, 400.0)
    }
}

impl ChartConfig {
    /// Creates a configuration with default padding, palette and timing.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            adjust: false,
            engine: Engine::default(),
            padding: Padding::default(),
            palette: DEFAULT_PALETTE.to_vec(),
            tooltip: TooltipOptions::default(),
            throttle: Throttle::DEFAULT_WINDOW,
            layout_creator: None,
        }
    }

    /// Sets shrink-to-fit padding.
    pub fn with_adjust(mut self, adjust: bool) -> Self {
        self.adjust = adjust;
        self
    }

    /// Sets the engine.
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Sets the padding.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the palette.
    pub fn with_palette(mut self, palette: impl IntoIterator<Item = Color>) -> Self {
        self.palette = palette.into_iter().collect();
        self
    }

    /// Sets the tooltip options.
    pub fn with_tooltip(mut self, tooltip: TooltipOptions) -> Self {
        self.tooltip = tooltip;
        self
    }

    /// Sets the animation coalescing window.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Replaces the arrange pass.
    pub fn with_layout_creator(mut self, creator: LayoutCreator) -> Self {
        self.layout_creator = Some(creator);
        self
    }

    /// Runs the layout creator, or the default arrange pass.
    pub fn layout(&self) -> ChartLayout {
        match self.layout_creator {
            Some(creator) => creator(self),
            None => ChartLayout::arrange(self),
        }
    }
}

/// Logs a rejected operation and hands the error back.
fn rejected<E: Into<ChartError> + core::fmt::Display>(op: &str, err: E) -> E {
    error!(op, %err, "chart operation rejected");
    err
}

/// A layered chart.
#[derive(Debug)]
pub struct Chart<B> {
    config: ChartConfig,
    layout: ChartLayout,
    backend: B,
    registry: LayerRegistry,
    layers: Vec<Layer>,
    tooltip: Tooltip,
    events: EventBus<PointerEvent>,
    next_id: usize,
}

impl<B: Backend> Chart<B> {
    /// Creates an empty chart drawing into `backend`.
    pub fn new(config: ChartConfig, backend: B) -> Self {
        if backend.engine() != config.engine {
            warn!(
                configured = ?config.engine,
                backend = ?backend.engine(),
                "backend engine differs from the configured engine"
            );
        }
        Self {
            layout: config.layout(),
            tooltip: Tooltip::new(config.tooltip),
            config,
            backend,
            registry: LayerRegistry::default(),
            layers: Vec::new(),
            events: EventBus::new(),
            next_id: 0,
        }
    }

    /// Builds layers through `registry` from now on.
    pub fn with_registry(mut self, registry: LayerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Current regions.
    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Layers in creation order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Looks up a layer.
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Looks up a layer mutably.
    pub fn layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    /// The shared tooltip.
    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// The chart-wide pointer bus; event names are [`PointerKind::as_str`](crate::PointerKind::as_str).
    pub fn events(&mut self) -> &mut EventBus<PointerEvent> {
        &mut self.events
    }

    fn position(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    fn find_kind(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind() == kind)
    }

    fn generate_id(&mut self, kind: LayerKind) -> LayerId {
        loop {
            let id = LayerId::from(format!("{kind}-{}", self.next_id));
            self.next_id += 1;
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    /// Creates a layer and appends it.
    ///
    /// Rejects a duplicate id, a second axis or legend layer, and kinds the registry cannot
    /// build; a rejected spec leaves the chart unchanged.
    pub fn create_layer(&mut self, spec: LayerSpec) -> Result<LayerId, ComposeError> {
        if let Some(id) = &spec.options.id {
            if self.position(id).is_some() {
                return Err(rejected("create_layer", ComposeError::DuplicateId(id.clone())));
            }
        }
        match spec.kind {
            LayerKind::Axis => {
                if let Some(axis) = self.find_kind(LayerKind::Axis) {
                    let err = ComposeError::DuplicateAxis(axis.id().clone());
                    return Err(rejected("create_layer", err));
                }
            }
            LayerKind::Legend => {
                if let Some(legend) = self.find_kind(LayerKind::Legend) {
                    let err = ComposeError::DuplicateLegend(legend.id().clone());
                    return Err(rejected("create_layer", err));
                }
            }
            _ => {}
        }
        let behavior = self
            .registry
            .build(&spec)
            .map_err(|err| rejected("create_layer", err))?;
        let id = match &spec.options.id {
            Some(id) => id.clone(),
            None => self.generate_id(spec.kind),
        };
        debug!(layer = %id, kind = %spec.kind, "layer created");
        self.layers.push(Layer::new(id.clone(), spec, behavior));
        Ok(id)
    }

    /// Draws every layer.
    ///
    /// Requests are refreshed from the data and reconciled without redraw (the legend, if
    /// any, is the trigger). Then marks are drawn, then the axis, then the legend, bound to
    /// the final merged scales.
    pub fn draw(&mut self, now: Time) -> Result<(), ChartError> {
        for layer in self.layers.iter_mut().filter(|l| l.kind().is_independent()) {
            layer.update();
        }
        let trigger = self.find_kind(LayerKind::Legend).map(|l| l.id().clone());
        let mut cx = LayerCx {
            backend: &mut self.backend,
            layout: self.layout,
            palette: &self.config.palette,
            throttle: self.config.throttle,
            now,
        };
        ScaleReconciler::new()
            .with_trigger(trigger)
            .run(&mut self.layers, &mut cx)
            .map_err(|err| rejected("draw", ChartError::from(err)))?;

        for layer in self.layers.iter_mut().filter(|l| !l.kind().is_unique()) {
            layer.draw(&mut cx)?;
        }
        if let Some(axis) = self.layers.iter_mut().find(|l| l.kind() == LayerKind::Axis) {
            axis.draw(&mut cx)?;
        }
        let entries = reconcile::legend_entries(&self.layers);
        if let Some(legend) = self
            .layers
            .iter_mut()
            .find(|l| l.kind() == LayerKind::Legend)
        {
            legend.bind_legend(entries);
            legend.draw(&mut cx)?;
        }
        Ok(())
    }

    /// Replaces one layer's data and propagates the new scales.
    ///
    /// The layer is the trigger of a redrawing pass, so every other layer picks up the
    /// merged scales and redraws. The layer itself then adopts the merged scales and is
    /// redrawn together with the axis.
    pub fn set_data(&mut self, id: &LayerId, data: LayerData, now: Time) -> Result<(), ChartError> {
        let Some(index) = self.position(id) else {
            return Err(rejected("set_data", ComposeError::UnknownLayer(id.clone())).into());
        };
        // Without an axis nothing can be merged; the layer keeps its old data.
        let Some(axis) = self.layers.iter().position(|l| l.kind() == LayerKind::Axis) else {
            return Err(rejected("set_data", ReconcileError::MissingAxis).into());
        };
        self.layers[index].set_data(data);
        let mut cx = LayerCx {
            backend: &mut self.backend,
            layout: self.layout,
            palette: &self.config.palette,
            throttle: self.config.throttle,
            now,
        };
        ScaleReconciler::new()
            .with_trigger(Some(id.clone()))
            .with_redraw(true)
            .run(&mut self.layers, &mut cx)
            .map_err(|err| rejected("set_data", ChartError::from(err)))?;

        let merged = self.layers[axis].scales().clone();
        let layer = &mut self.layers[index];
        layer.set_scales(reconcile::working(&merged, layer.axis_role()));
        if index != axis {
            layer.draw(&mut cx)?;
        }
        self.layers[axis].draw(&mut cx)?;
        Ok(())
    }

    /// Shows or hides a layer.
    pub fn set_visible(&mut self, id: &LayerId, visible: bool) -> Result<(), ComposeError> {
        let Some(index) = self.position(id) else {
            return Err(rejected("set_visible", ComposeError::UnknownLayer(id.clone())));
        };
        self.layers[index].set_visible(&mut self.backend, visible);
        Ok(())
    }

    /// Destroys a layer and removes it.
    pub fn remove_layer(&mut self, id: &LayerId, now: Time) -> Result<(), ChartError> {
        let Some(index) = self.position(id) else {
            return Err(rejected("remove_layer", ComposeError::UnknownLayer(id.clone())).into());
        };
        let mut layer = self.layers.remove(index);
        self.tooltip.hide(layer.id());
        layer.destroy(&mut self.backend, now)?;
        Ok(())
    }

    /// Fires `event` on the chart bus, then lets every layer hit-test it in draw order.
    pub fn dispatch_pointer(&mut self, event: PointerEvent) {
        if let Err(err) = self.events.fire(event.kind.as_str(), &event) {
            error!(event = event.kind.as_str(), %err, "chart listener failed");
        }
        for layer in &mut self.layers {
            layer.pointer(&event, &mut self.tooltip);
        }
    }

    /// Advances every layer's animations and applies their updates.
    pub fn tick(&mut self, now: Time) -> Result<(), AnimationError> {
        for layer in &mut self.layers {
            layer.tick(&mut self.backend, now)?;
        }
        Ok(())
    }

    /// Destroys every layer and empties the chart.
    ///
    /// A layer that fails to destroy does not stop the others; the first error is
    /// returned once every layer is gone.
    pub fn destroy(&mut self, now: Time) -> Result<(), AnimationError> {
        let mut first = None;
        for mut layer in self.layers.drain(..) {
            self.tooltip.hide(layer.id());
            if let Err(err) = layer.destroy(&mut self.backend, now) {
                error!(layer = %layer.id(), %err, "layer destroy failed");
                first.get_or_insert(err);
            }
        }
        self.events.clear();
        first.map_or(Ok(()), Err)
    }
}
