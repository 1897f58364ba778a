// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A selection band across the main region.
//!
//! The first row selects: on a continuous `x` scale the band spans `[x, value]` in data
//! units; on an ordinal scale it spans from the band of the first row's category to the
//! band of the last row's category.

use kurbo::Rect;
use peniko::Color;

use crate::backend::Primitive;
use crate::layer::{LayerBehavior, Painter};
use crate::scale::Domain;

/// The brush band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushLayer {
    /// Band fill used when the style sets no color.
    pub fill: Color,
}

impl Default for BrushLayer {
    fn default() -> Self {
        Self {
            fill: Color::from_rgba8(0x44, 0x88, 0xcc, 0x40),
        }
    }
}

impl LayerBehavior for BrushLayer {
    fn draw(&self, painter: &mut Painter<'_>) {
        let scales = painter.scales;
        let data = painter.data;
        let (Some(x), Some(first)) = (&scales.x, data.first()) else {
            return;
        };
        let span = match x.domain() {
            Domain::Continuous(..) => Some((x.map(first.x), x.map(first.value))),
            Domain::Ordinal(_) => data.last().and_then(|last| {
                let (s0, _) = x.band(&first.category)?;
                let (s1, w1) = x.band(&last.category)?;
                Some((s0, s1 + w1))
            }),
        };
        let Some((x0, x1)) = span else {
            return;
        };
        let region = painter.region;
        let rect = Rect::new(x0, region.y0, x1, region.y1).abs();
        let fill = painter.style.color.unwrap_or(self.fill);
        painter.draw("brush", Primitive::Rect { rect, fill });
    }
}
