// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The axis layer.
//!
//! The axis layer owns the chart's merged scales. During reconciliation it assigns their
//! ranges from the main region and normalizes them; when drawn it renders a domain rule,
//! ticks and labels for `x` (bottom), `y` (left) and `y_minor` (right), plus a ring for
//! polar radius.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{BezPath, Circle, Point, Rect, Shape as _};
use peniko::Color;

#[cfg(not(feature = "std"))]
#[cfg_attr(
    test,
    allow(
        unused_imports,
        reason = "test builds link `std`, whose inherent float methods take precedence"
    )
)]
use crate::float::FloatExt;

use crate::backend::Primitive;
use crate::layer::{LayerBehavior, Painter};
use crate::layout::ChartLayout;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::scale::{self, Domain, NiceSet, Scale, ScaleSet};

/// Which side of the main region an axis sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Orient {
    Bottom,
    Left,
    Right,
}

/// Tick and label parameters of the axis layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisLayer {
    /// Target tick count for continuous scales.
    pub tick_count: usize,
    /// Tick length.
    pub tick_size: f64,
    /// Gap between tick end and label.
    pub label_padding: f64,
    /// Rule and tick color.
    pub rule: Color,
}

impl Default for AxisLayer {
    fn default() -> Self {
        Self {
            tick_count: 5,
            tick_size: 5.0,
            label_padding: 3.0,
            rule: Color::from_rgb8(0x88, 0x88, 0x88),
        }
    }
}

/// Smallest distance between adjacent ticks.
fn tick_step(ticks: &[f64]) -> f64 {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() { step } else { 0.0 }
}

fn decimals(step: f64) -> usize {
    if !(step > 0.0 && step < 1.0) {
        return 0;
    }
    let d = (-step.log10()).ceil().clamp(0.0, 10.0);
    #[allow(
        clippy::cast_possible_truncation,
        reason = "value is clamped to a small non-negative range"
    )]
    {
        d as usize
    }
}

/// Formats `v` with just enough decimals to tell ticks `step` apart.
pub(crate) fn format_tick(v: f64, step: f64) -> String {
    let decimals = decimals(step);
    // Avoid printing "-0".
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v:.decimals$}")
}

/// Tick positions along the scale's range, with their labels.
fn ticks(scale: &Scale, count: usize) -> Vec<(f64, String)> {
    match scale.domain() {
        Domain::Ordinal(categories) => categories
            .iter()
            .filter_map(|c| {
                let (start, width) = scale.band(c)?;
                Some((start + 0.5 * width, c.clone()))
            })
            .collect(),
        Domain::Continuous(..) => {
            let values = scale.ticks(count);
            let step = tick_step(&values);
            values
                .into_iter()
                .map(|v| (scale.map(v), format_tick(v, step)))
                .collect()
        }
    }
}

fn rule(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

impl AxisLayer {
    fn stroke(&self, path: BezPath) -> Primitive {
        Primitive::Path {
            path,
            stroke: self.rule,
            width: 1.0,
        }
    }

    fn axis(&self, painter: &mut Painter<'_>, scale: &Scale, orient: Orient) {
        let plot = painter.layout.main;
        let size = painter.style.font_size;
        let fill = painter.style.text_color;
        let (a, b) = match orient {
            Orient::Bottom => (Point::new(plot.x0, plot.y1), Point::new(plot.x1, plot.y1)),
            Orient::Left => (Point::new(plot.x0, plot.y0), Point::new(plot.x0, plot.y1)),
            Orient::Right => (Point::new(plot.x1, plot.y0), Point::new(plot.x1, plot.y1)),
        };
        painter.draw("axis-domain", self.stroke(rule(a, b)));

        let gap = self.tick_size + self.label_padding;
        for (pos, label) in ticks(scale, self.tick_count) {
            let (tick, origin) = match orient {
                Orient::Bottom => {
                    let (w, h) = HeuristicTextMeasurer.measure(&label, size);
                    (
                        rule(Point::new(pos, plot.y1), Point::new(pos, plot.y1 + self.tick_size)),
                        Point::new(pos - 0.5 * w, plot.y1 + gap + h),
                    )
                }
                Orient::Left => {
                    let (w, h) = HeuristicTextMeasurer.measure(&label, size);
                    (
                        rule(Point::new(plot.x0 - self.tick_size, pos), Point::new(plot.x0, pos)),
                        Point::new(plot.x0 - gap - w, pos + 0.5 * h),
                    )
                }
                Orient::Right => {
                    let (_, h) = HeuristicTextMeasurer.measure(&label, size);
                    (
                        rule(Point::new(plot.x1, pos), Point::new(plot.x1 + self.tick_size, pos)),
                        Point::new(plot.x1 + gap, pos + 0.5 * h),
                    )
                }
            };
            painter.draw("axis-tick", self.stroke(tick));
            painter.draw(
                "axis-label",
                Primitive::Text {
                    origin,
                    text: label,
                    size,
                    fill,
                },
            );
        }
    }

    fn ring(&self, painter: &mut Painter<'_>, radius: &Scale) {
        let plot: Rect = painter.layout.main;
        let (_, r) = radius.range();
        let path = Circle::new(plot.center(), r).to_path(0.1);
        painter.draw("axis-ring", self.stroke(path));
    }
}

impl LayerBehavior for AxisLayer {
    fn normalize(
        &self,
        scales: &mut ScaleSet,
        nice: &NiceSet,
        layout: &ChartLayout,
        palette: &[Color],
    ) {
        scale::normalize(scales, nice, layout.main, palette);
    }

    fn draw(&self, painter: &mut Painter<'_>) {
        let scales = painter.scales;
        if let Some(x) = &scales.x {
            self.axis(painter, x, Orient::Bottom);
        }
        if let Some(y) = &scales.y {
            self.axis(painter, y, Orient::Left);
        }
        if let Some(y) = &scales.y_minor {
            self.axis(painter, y, Orient::Right);
        }
        if let Some(r) = &scales.radius {
            self.ring(painter, r);
        }
    }
}
