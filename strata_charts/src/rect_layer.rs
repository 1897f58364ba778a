// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bars.
//!
//! Categories are placed in the bands of the `x` scale. In [`LayerMode::Group`] each series
//! gets an equal slice of the band; in [`LayerMode::Stack`] series stack from the baseline,
//! positive values upwards and negative values downwards.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::backend::Primitive;
use crate::layer::{self, Datum, LayerBehavior, LayerMode, Painter};
use crate::scale::{ColorScale, Scale, ScaleSet};

/// Bar marks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectLayer;

/// Value the bars grow from: zero when the domain holds it, else the nearest bound.
fn baseline(y: &Scale) -> f64 {
    y.bounds().map_or(0.0, |(min, max)| 0.0_f64.clamp(min, max))
}

fn label(d: &Datum) -> String {
    match &d.series {
        Some(series) => format!("{}/{series}", d.category),
        None => d.category.clone(),
    }
}

impl LayerBehavior for RectLayer {
    fn request(&self, data: &[Datum], mode: LayerMode) -> ScaleSet {
        if data.is_empty() {
            return ScaleSet::default();
        }
        ScaleSet {
            x: Some(Scale::ordinal(layer::categories(data))),
            y: layer::value_domain(data, mode),
            color: Some(ColorScale::new(layer::keys(data))),
            ..ScaleSet::default()
        }
    }

    fn draw(&self, painter: &mut Painter<'_>) {
        let scales = painter.scales;
        let (Some(x), Some(y)) = (&scales.x, &scales.y) else {
            return;
        };
        let data = painter.data;
        let keys = layer::keys(data);
        let base = baseline(y);
        // Running (negative, positive) totals per category when stacking.
        let mut stacks: Vec<(&str, f64, f64)> = Vec::new();

        for d in data {
            let Some((band_start, band_width)) = x.band(&d.category) else {
                continue;
            };
            let (x0, width, v0, v1) = match painter.mode {
                LayerMode::Group => {
                    let n = keys.len().max(1) as f64;
                    let slot = keys.iter().position(|k| *k == d.key()).unwrap_or(0) as f64;
                    let width = band_width / n;
                    (band_start + slot * width, width, base, d.value)
                }
                LayerMode::Stack => {
                    let index = match stacks.iter().position(|(c, ..)| *c == d.category) {
                        Some(index) => index,
                        None => {
                            stacks.push((d.category.as_str(), 0.0, 0.0));
                            stacks.len() - 1
                        }
                    };
                    let (_, neg, pos) = &mut stacks[index];
                    let total = if d.value < 0.0 { neg } else { pos };
                    let v0 = *total;
                    *total += d.value;
                    (band_start, band_width, v0, *total)
                }
            };
            let rect = Rect::new(x0, y.map(v0), x0 + width, y.map(v1)).abs();
            let fill = painter.color(d.key());
            painter.mark("bar", Primitive::Rect { rect, fill }, label(d), d.value);
        }
    }
}
