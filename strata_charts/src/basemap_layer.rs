// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geographic sites: longitude on `x`, latitude on `y`, over a graticule.

use kurbo::{BezPath, Point};
use peniko::Color;

use crate::backend::Primitive;
use crate::layer::{Datum, LayerBehavior, LayerMode, Painter};
use crate::point_layer::{scatter, scatter_request};
use crate::scale::ScaleSet;

/// Site marks at `(longitude, latitude)` rows (`Datum::x`, `Datum::value`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasemapLayer {
    /// Graticule line count per direction.
    pub graticule: usize,
    /// Graticule color.
    pub grid: Color,
}

impl Default for BasemapLayer {
    fn default() -> Self {
        Self {
            graticule: 5,
            grid: Color::from_rgb8(0xdd, 0xdd, 0xdd),
        }
    }
}

impl LayerBehavior for BasemapLayer {
    fn request(&self, data: &[Datum], _mode: LayerMode) -> ScaleSet {
        scatter_request(data)
    }

    fn draw(&self, painter: &mut Painter<'_>) {
        let scales = painter.scales;
        let region = painter.region;
        if let Some(x) = &scales.x {
            for lon in x.ticks(self.graticule) {
                let mut path = BezPath::new();
                path.move_to(Point::new(x.map(lon), region.y0));
                path.line_to(Point::new(x.map(lon), region.y1));
                painter.draw(
                    "graticule",
                    Primitive::Path {
                        path,
                        stroke: self.grid,
                        width: 0.5,
                    },
                );
            }
        }
        if let Some(y) = &scales.y {
            for lat in y.ticks(self.graticule) {
                let mut path = BezPath::new();
                path.move_to(Point::new(region.x0, y.map(lat)));
                path.line_to(Point::new(region.x1, y.map(lat)));
                painter.draw(
                    "graticule",
                    Primitive::Path {
                        path,
                        stroke: self.grid,
                        width: 0.5,
                    },
                );
            }
        }
        scatter(painter, "site");
    }
}
