// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layered chart composition on top of `strata_core`.
//!
//! A [`Chart`] is a stack of [`Layer`]s drawn into one [`Backend`]:
//! - **Marks** (bars, lines, points, arcs, basemap sites) request scales from their data.
//! - **[`ScaleReconciler`]** merges those requests into the unique axis layer, normalizes
//!   them, and hands the merged scales back to every layer.
//! - **Guides** (the axis and the legend) are drawn last so they reflect the merged state.
//! - **Animation plans** replay on every draw through an
//!   [`AnimationQueue`](strata_core::AnimationQueue) per layer.
//!
//! Pointer input fans out from the chart's bus to every layer, which share one [`Tooltip`].
//! Text is never shaped; text primitives carry unshaped strings.

#![no_std]

extern crate alloc;

mod arc_layer;
mod axis_layer;
mod backend;
mod basemap_layer;
mod brush_layer;
mod chart;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod layer;
mod layer_registry;
mod layout;
mod legend_layer;
mod line_layer;
mod measure;
mod point_layer;
mod reconcile;
mod rect_layer;
mod scale;
mod text_layer;
mod tooltip;

#[cfg(test)]
mod compose_tests;

pub use arc_layer::ArcLayer;
pub use axis_layer::AxisLayer;
pub use backend::{Backend, Node, Primitive, SceneTree, Transform};
pub use basemap_layer::BasemapLayer;
pub use brush_layer::BrushLayer;
pub use chart::{Chart, ChartConfig, DEFAULT_PALETTE, LayoutCreator};
pub use error::{ChartError, ComposeError, ReconcileError};
pub use layer::{
    AnimationPlan, AxisRole, Coordinate, Datum, Layer, LayerAnimation, LayerBehavior, LayerCx,
    LayerData, LayerEvent, LayerId, LayerKind, LayerMode, LayerOptions, LayerSpec, LayerStyle,
    LegendEntry, Painter, PointerEvent, PointerKind, ScaleOptions, Shape,
};
pub use layer_registry::{LayerFactory, LayerRegistry};
pub use layout::{ChartLayout, LayoutRegion, Padding};
pub use legend_layer::LegendLayer;
pub use line_layer::LineLayer;
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use point_layer::PointLayer;
pub use reconcile::ScaleReconciler;
pub use rect_layer::RectLayer;
pub use scale::{
    ColorScale, Domain, FixedBoundary, NiceConfig, NiceSet, Scale, ScaleBand, ScaleLinear,
    ScaleSet, nice_ticks, normalize,
};
pub use text_layer::TextLayer;
pub use tooltip::{Tooltip, TooltipOptions};
