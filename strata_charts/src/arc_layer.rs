// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pie and donut sectors on the polar `angle` and `radius` scales.
//!
//! The angle request spans `[0, Σvalue]`. Sectors are laid out by their share of the total
//! so the ring always closes, whatever rounding normalization applied to the domain.

use kurbo::{Circle, Shape as _};

use crate::backend::Primitive;
use crate::layer::{self, Datum, LayerBehavior, LayerMode, Painter};
use crate::scale::{ColorScale, Scale, ScaleSet};

/// Sector marks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcLayer {
    /// Flattening tolerance when converting sectors to paths.
    pub tolerance: f64,
}

impl Default for ArcLayer {
    fn default() -> Self {
        Self { tolerance: 0.1 }
    }
}

impl LayerBehavior for ArcLayer {
    fn request(&self, data: &[Datum], _mode: LayerMode) -> ScaleSet {
        if data.is_empty() {
            return ScaleSet::default();
        }
        let total: f64 = data.iter().map(|d| d.value.max(0.0)).sum();
        let max = data.iter().map(|d| d.value).fold(0.0, f64::max);
        ScaleSet {
            angle: Some(Scale::continuous(0.0, total)),
            radius: Some(Scale::continuous(0.0, max)),
            color: Some(ColorScale::new(layer::categories(data))),
            ..ScaleSet::default()
        }
    }

    fn draw(&self, painter: &mut Painter<'_>) {
        let scales = painter.scales;
        let (Some(angle), Some(radius)) = (&scales.angle, &scales.radius) else {
            return;
        };
        let data = painter.data;
        let total: f64 = data.iter().map(|d| d.value.max(0.0)).sum();
        if total <= 0.0 {
            return;
        }
        let (a0, a1) = angle.range();
        let outer = radius.range().1;
        let inner = painter.style.inner_radius.clamp(0.0, outer);
        let center = painter.region.center();
        let mut cumulative = 0.0;
        for d in data {
            let share = d.value.max(0.0) / total;
            let start = a0 + (a1 - a0) * cumulative;
            let sweep = (a1 - a0) * share;
            cumulative += share;
            let path = Circle::new(center, outer)
                .segment(inner, start, sweep)
                .to_path(self.tolerance);
            let fill = painter.color(&d.category);
            painter.mark("arc", Primitive::Area { path, fill }, d.category.as_str(), d.value);
        }
    }
}
