// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scatter points on two continuous scales.

use kurbo::Point;

use crate::backend::Primitive;
use crate::layer::{self, Datum, LayerBehavior, LayerMode, Painter};
use crate::scale::{ColorScale, Domain, Scale, ScaleSet};

/// Point marks at `(x, value)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointLayer;

/// Requests continuous `x` over `Datum::x` and `y` over `Datum::value`.
pub(crate) fn scatter_request(data: &[Datum]) -> ScaleSet {
    if data.is_empty() {
        return ScaleSet::default();
    }
    ScaleSet {
        x: Domain::extent(data.iter().map(|d| d.x)).map(Scale::new),
        y: Domain::extent(data.iter().map(|d| d.value)).map(Scale::new),
        color: Some(ColorScale::new(layer::keys(data))),
        ..ScaleSet::default()
    }
}

/// Draws one circle per row with `class`.
pub(crate) fn scatter(painter: &mut Painter<'_>, class: &str) {
    let scales = painter.scales;
    let (Some(x), Some(y)) = (&scales.x, &scales.y) else {
        return;
    };
    let radius = painter.style.point_radius;
    let data = painter.data;
    for d in data {
        let center = Point::new(x.map(d.x), y.map(d.value));
        let fill = painter.color(d.key());
        painter.mark(
            class,
            Primitive::Circle {
                center,
                radius,
                fill,
            },
            d.category.as_str(),
            d.value,
        );
    }
}

impl LayerBehavior for PointLayer {
    fn request(&self, data: &[Datum], _mode: LayerMode) -> ScaleSet {
        scatter_request(data)
    }

    fn draw(&self, painter: &mut Painter<'_>) {
        scatter(painter, "point");
    }
}
