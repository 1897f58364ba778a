// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polylines, one per series, through the band centers of the `x` scale.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{BezPath, Point};

use crate::backend::Primitive;
use crate::layer::{self, Datum, LayerBehavior, LayerMode, Painter};
use crate::scale::{ColorScale, Scale, ScaleSet};

/// Line marks with a hit point at every vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineLayer;

impl LayerBehavior for LineLayer {
    fn request(&self, data: &[Datum], _mode: LayerMode) -> ScaleSet {
        if data.is_empty() {
            return ScaleSet::default();
        }
        ScaleSet {
            x: Some(Scale::ordinal(layer::categories(data))),
            y: layer::value_domain(data, LayerMode::Group),
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
        let width = painter.style.stroke_width;
        let radius = painter.style.point_radius;
        for key in layer::keys(data) {
            let points: Vec<(Point, &Datum)> = data
                .iter()
                .filter(|d| d.key() == key)
                .filter_map(|d| {
                    let (start, band) = x.band(&d.category)?;
                    Some((Point::new(start + 0.5 * band, y.map(d.value)), d))
                })
                .collect();
            let Some(((first, _), rest)) = points.split_first() else {
                continue;
            };
            let color = painter.color(key);
            let mut path = BezPath::new();
            path.move_to(*first);
            for (p, _) in rest {
                path.line_to(*p);
            }
            painter.draw(
                "line",
                Primitive::Path {
                    path,
                    stroke: color,
                    width,
                },
            );
            for (center, d) in points {
                painter.mark(
                    "line-point",
                    Primitive::Circle {
                        center,
                        radius,
                        fill: color,
                    },
                    d.category.as_str(),
                    d.value,
                );
            }
        }
    }
}
