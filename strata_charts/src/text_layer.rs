// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free text: each row's category drawn at `(x, value)` relative to the layer's region.

use kurbo::Vec2;

use crate::backend::Primitive;
use crate::layer::{LayerBehavior, Painter};

/// Annotation text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextLayer;

impl LayerBehavior for TextLayer {
    fn draw(&self, painter: &mut Painter<'_>) {
        let origin = painter.region.origin();
        let size = painter.style.font_size;
        let fill = painter.style.color.unwrap_or(painter.style.text_color);
        let data = painter.data;
        for d in data {
            painter.draw(
                "text",
                Primitive::Text {
                    origin: origin + Vec2::new(d.x, d.value),
                    text: d.category.clone(),
                    size,
                    fill,
                },
            );
        }
    }
}
