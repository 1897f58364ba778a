// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart regions.
//!
//! The container is the full chart bounds and the main region is the container inset by
//! the configured padding. Guides that need room (axis labels, the legend) live in the
//! padding.

use kurbo::{Insets, Rect};

use crate::ChartConfig;

/// Per-side padding between the container and the main region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Padding {
    /// Space above the main region.
    pub top: f64,
    /// Space right of the main region.
    pub right: f64,
    /// Space below the main region.
    pub bottom: f64,
    /// Space left of the main region.
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 120.0,
            bottom: 40.0,
            left: 50.0,
        }
    }
}

impl Padding {
    /// Creates padding from `[top, right, bottom, left]`.
    pub fn new([top, right, bottom, left]: [f64; 4]) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same padding on every side.
    pub fn uniform(p: f64) -> Self {
        Self::new([p; 4])
    }
}

/// Which region a layer draws into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutRegion {
    /// The full chart bounds.
    Container,
    /// The padded plotting area.
    #[default]
    Main,
}

/// Output of the arrange pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartLayout {
    /// Full chart bounds.
    pub container: Rect,
    /// Plotting area.
    pub main: Rect,
}

impl ChartLayout {
    /// Computes the regions for `config`.
    ///
    /// When `adjust` is set and the padding does not fit, it is scaled down so the main
    /// region keeps a positive size.
    pub fn arrange(config: &ChartConfig) -> Self {
        let container = Rect::new(0.0, 0.0, config.width.max(0.0), config.height.max(0.0));
        let mut p = config.padding;
        if config.adjust {
            let sx = fit(p.left + p.right, container.width());
            let sy = fit(p.top + p.bottom, container.height());
            p = Padding {
                top: p.top * sy,
                right: p.right * sx,
                bottom: p.bottom * sy,
                left: p.left * sx,
            };
        }
        let inset = Insets::new(p.left, p.top, p.right, p.bottom);
        let main = container - inset;
        // Padding wider than the container collapses the main region instead of inverting it.
        let main = Rect::new(main.x0, main.y0, main.x1.max(main.x0), main.y1.max(main.y0));
        Self { container, main }
    }

    /// Returns the rectangle of `region`.
    pub fn region(&self, region: LayoutRegion) -> Rect {
        match region {
            LayoutRegion::Container => self.container,
            LayoutRegion::Main => self.main,
        }
    }
}

/// Factor that shrinks `used` to at most 80% of `available`.
fn fit(used: f64, available: f64) -> f64 {
    if used <= 0.0 || used <= available * 0.8 {
        1.0
    } else {
        (available * 0.8 / used).max(0.0)
    }
}
