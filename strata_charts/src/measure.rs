// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rough text extents.
//!
//! Text is never shaped here. Guides and hit-testing only need approximate bounds, so
//! callers can plug in a real measurer or use [`HeuristicTextMeasurer`].

/// Estimates the size of a run of text.
pub trait TextMeasurer {
    /// Returns `(width, height)` in scene units.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// Assumes an average glyph width of 0.6em and a line height of 1em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        (0.6 * font_size * text.chars().count() as f64, font_size)
    }
}
