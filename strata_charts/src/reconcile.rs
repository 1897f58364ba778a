// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared scale reconciliation.
//!
//! One pass:
//! 1. merges every independent layer's request into an accumulator, by role: minor-axis
//!    layers feed `y_minor`, polar layers feed `angle`/`radius`, geographic layers feed
//!    `x`/`y`;
//! 2. hands the accumulator to the axis layer, which assigns ranges and normalizes;
//! 3. gives every layer except the axis and the trigger the merged scales, redrawing it
//!    when asked to;
//! 4. rebinds and redraws the legend, unless the legend is the trigger.
//!
//! The trigger is skipped so that a redraw it caused cannot start another pass.

extern crate alloc;

use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::layer::{AxisRole, Coordinate, Layer, LayerCx, LayerId, LayerKind, LegendEntry};
use crate::scale::{merge_slot, NiceSet, ScaleSet};
use crate::ReconcileError;

/// One reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScaleReconciler {
    /// The layer whose update started the pass.
    pub trigger: Option<LayerId>,
    /// Whether redistributed layers are redrawn immediately.
    pub redraw: bool,
}

/// The scales a layer with `role` works with.
pub(crate) fn working(merged: &ScaleSet, role: AxisRole) -> ScaleSet {
    let mut scales = merged.clone();
    if role == AxisRole::Minor {
        scales.y = merged.y_minor.clone();
    }
    scales
}

/// Merges one layer's request and normalization options into the accumulators.
fn accumulate(merged: &mut ScaleSet, nice: &mut NiceSet, layer: &Layer) {
    let request = layer.requested_scales();
    let own = layer.nice();
    match layer.coordinate() {
        Coordinate::Cartesian => {
            merge_slot(&mut merged.x, request.x.as_ref());
            nice.x.overlay(&own.x);
            match layer.axis_role() {
                AxisRole::Major => {
                    merge_slot(&mut merged.y, request.y.as_ref());
                    nice.y.overlay(&own.y);
                }
                AxisRole::Minor => {
                    merge_slot(&mut merged.y_minor, request.y.as_ref());
                    nice.y_minor.overlay(&own.y);
                }
            }
        }
        Coordinate::Polar => {
            merge_slot(&mut merged.angle, request.angle.as_ref());
            merge_slot(&mut merged.radius, request.radius.as_ref());
            nice.angle.overlay(&own.angle);
            nice.radius.overlay(&own.radius);
        }
        Coordinate::Geographic => {
            merge_slot(&mut merged.x, request.x.as_ref());
            merge_slot(&mut merged.y, request.y.as_ref());
            nice.x.overlay(&own.x);
            nice.y.overlay(&own.y);
        }
    }
    match (&mut merged.color, &request.color) {
        (Some(acc), Some(color)) => acc.merge(color),
        (None, Some(color)) => merged.color = Some(color.clone()),
        (_, None) => {}
    }
}

/// Legend rows from every layer except the guides, deduplicated by label.
pub(crate) fn legend_entries(layers: &[Layer]) -> Vec<LegendEntry> {
    let mut out: Vec<LegendEntry> = Vec::new();
    for layer in layers.iter().filter(|l| !l.kind().is_unique()) {
        for entry in layer.legend_entries() {
            if !out.iter().any(|e| e.label == entry.label) {
                out.push(entry);
            }
        }
    }
    out
}

impl ScaleReconciler {
    /// A pass with no trigger and no redraw.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trigger.
    pub fn with_trigger(mut self, trigger: Option<LayerId>) -> Self {
        self.trigger = trigger;
        self
    }

    /// Enables or disables immediate redraw.
    pub fn with_redraw(mut self, redraw: bool) -> Self {
        self.redraw = redraw;
        self
    }

    fn is_trigger(&self, layer: &Layer) -> bool {
        self.trigger.as_ref() == Some(layer.id())
    }

    /// Runs the pass over `layers`.
    ///
    /// Fails with [`ReconcileError::MissingAxis`] before touching any layer when there is
    /// no axis layer.
    pub fn run(&self, layers: &mut [Layer], cx: &mut LayerCx<'_>) -> Result<(), ReconcileError> {
        let axis = layers
            .iter()
            .position(|l| l.kind() == LayerKind::Axis)
            .ok_or(ReconcileError::MissingAxis)?;

        let mut merged = ScaleSet::default();
        let mut nice = *layers[axis].nice();
        for layer in layers.iter().filter(|l| l.kind().is_independent()) {
            accumulate(&mut merged, &mut nice, layer);
        }

        let layout = cx.layout;
        layers[axis].normalize(merged, &nice, &layout, cx.palette);
        let merged = layers[axis].scales().clone();
        debug!(axis = %layers[axis].id(), trigger = ?self.trigger, "scales merged");

        for (index, layer) in layers.iter_mut().enumerate() {
            if index == axis || self.is_trigger(layer) {
                continue;
            }
            layer.set_scales(working(&merged, layer.axis_role()));
            // The legend is redrawn once, below.
            if self.redraw && layer.kind() != LayerKind::Legend {
                trace!(layer = %layer.id(), "redrawing after reconciliation");
                layer.draw(cx)?;
            }
        }

        let Some(legend) = layers.iter().position(|l| l.kind() == LayerKind::Legend) else {
            return Ok(());
        };
        if self.is_trigger(&layers[legend]) {
            return Ok(());
        }
        let entries = legend_entries(layers);
        layers[legend].bind_legend(entries);
        layers[legend].draw(cx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::scale::Scale;

    #[test]
    fn minor_layers_work_on_the_minor_scale() {
        let merged = ScaleSet {
            y: Some(Scale::continuous(0.0, 10.0)),
            y_minor: Some(Scale::continuous(0.0, 1.0)),
            ..ScaleSet::default()
        };
        assert_eq!(working(&merged, AxisRole::Major).y, merged.y);
        assert_eq!(working(&merged, AxisRole::Minor).y, merged.y_minor);
        assert_eq!(working(&merged, AxisRole::Minor).y_minor, merged.y_minor);
    }
}
