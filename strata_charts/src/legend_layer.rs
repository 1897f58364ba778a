// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The legend layer: color swatches and labels for every other layer's categories.
//!
//! Rows are bound by the chart after each reconciliation pass (see
//! [`Layer::legend_entries`](crate::Layer::legend_entries)). Items run top-to-bottom, then
//! left-to-right into columns.

use kurbo::{Point, Rect};

use crate::backend::Primitive;
use crate::layer::{LayerBehavior, Painter};

/// Swatch geometry of the legend layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendLayer {
    /// Swatch square size.
    pub swatch_size: f64,
    /// Vertical gap between rows.
    pub row_gap: f64,
    /// Horizontal gap between swatch and label.
    pub label_dx: f64,
    /// Horizontal gap between columns.
    pub column_gap: f64,
    /// Offset from the right edge of the main region.
    pub inset: f64,
}

impl Default for LegendLayer {
    fn default() -> Self {
        Self {
            swatch_size: 10.0,
            row_gap: 4.0,
            label_dx: 6.0,
            column_gap: 16.0,
            inset: 16.0,
        }
    }
}

impl LegendLayer {
    fn column_width(&self, font_size: f64, longest: usize) -> f64 {
        self.swatch_size + self.label_dx + 0.6 * font_size * longest as f64
    }
}

impl LayerBehavior for LegendLayer {
    fn draw(&self, painter: &mut Painter<'_>) {
        let entries = painter.legend;
        if entries.is_empty() {
            return;
        }
        let font_size = painter.style.font_size;
        let text_color = painter.style.text_color;
        let columns = painter.style.columns.max(1);
        let rows_per_col = entries.len().div_ceil(columns);
        let row_height = self.swatch_size.max(font_size);
        let longest = entries
            .iter()
            .map(|e| e.label.chars().count())
            .max()
            .unwrap_or(0);
        let column_width = self.column_width(font_size, longest);
        let origin = Point::new(
            painter.layout.main.x1 + self.inset,
            painter.layout.main.y0,
        );

        for (i, entry) in entries.iter().enumerate() {
            let col = i / rows_per_col;
            let row = i % rows_per_col;
            let x = origin.x + col as f64 * (column_width + self.column_gap);
            let y = origin.y + row as f64 * (row_height + self.row_gap);
            let swatch_y = y + (row_height - self.swatch_size) * 0.5;

            painter.draw(
                "legend-swatch",
                Primitive::Rect {
                    rect: Rect::new(x, swatch_y, x + self.swatch_size, swatch_y + self.swatch_size),
                    fill: entry.color,
                },
            );
            painter.draw(
                "legend-label",
                Primitive::Text {
                    origin: Point::new(
                        x + self.swatch_size + self.label_dx,
                        y + 0.5 * (row_height + font_size),
                    ),
                    text: entry.label.clone(),
                    size: font_size,
                    fill: text_color,
                },
            );
        }
    }
}
