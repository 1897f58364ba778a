// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart-wide tooltip.
//!
//! One [`Tooltip`] is owned by the chart and lent to every layer during pointer dispatch.
//! Writes from different layers overwrite each other; only the layer that last showed the
//! tooltip may hide it.

extern crate alloc;

use alloc::string::String;

use kurbo::{Point, Vec2};
use tracing::trace;

use crate::LayerId;

/// Tooltip configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TooltipOptions {
    /// Whether layers may show the tooltip at all.
    pub enabled: bool,
    /// Offset from the pointer position.
    pub offset: Vec2,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            offset: Vec2::new(12.0, 12.0),
        }
    }
}

/// Shared tooltip display state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    options: TooltipOptions,
    visible: bool,
    owner: Option<LayerId>,
    position: Point,
    text: String,
}

impl Tooltip {
    /// Creates a hidden tooltip.
    pub fn new(options: TooltipOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Returns `true` while shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The layer that last showed the tooltip.
    pub fn owner(&self) -> Option<&LayerId> {
        self.owner.as_ref()
    }

    /// Display position, already offset from the pointer.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shows `text` near `pointer` on behalf of `owner`, replacing whatever was shown.
    pub fn show(&mut self, owner: &LayerId, pointer: Point, text: String) {
        if !self.options.enabled {
            return;
        }
        trace!(%owner, %text, "tooltip shown");
        self.visible = true;
        self.owner = Some(owner.clone());
        self.position = pointer + self.options.offset;
        self.text = text;
    }

    /// Hides the tooltip if `owner` showed it. Returns whether it was hidden.
    pub fn hide(&mut self, owner: &LayerId) -> bool {
        if self.owner.as_ref() != Some(owner) {
            return false;
        }
        self.visible = false;
        self.owner = None;
        self.text.clear();
        true
    }
}
