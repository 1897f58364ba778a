// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors raised while composing a chart.

extern crate alloc;

use alloc::string::String;

use strata_core::AnimationError;

use crate::LayerId;

/// A rejected layer operation.
///
/// Every variant is a configuration error: the chart logs it and leaves its state
/// unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    /// A layer with this id already exists.
    #[error("a layer with id `{0}` already exists")]
    DuplicateId(LayerId),
    /// The chart already has its axis layer.
    #[error("the chart already has an axis layer (`{0}`)")]
    DuplicateAxis(LayerId),
    /// The chart already has its legend layer.
    #[error("the chart already has a legend layer (`{0}`)")]
    DuplicateLegend(LayerId),
    /// No layer factory matches the type tag.
    #[error("unknown layer kind `{0}`")]
    UnknownKind(String),
    /// No layer has this id.
    #[error("no layer with id `{0}`")]
    UnknownLayer(LayerId),
}

/// Scale reconciliation failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// Reconciliation needs the axis layer as the shared coordinate frame.
    #[error("scale reconciliation requires an axis layer")]
    MissingAxis,
    /// A redraw hit a fatal animation error.
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Failure of a chart operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    /// The layer operation was rejected.
    #[error(transparent)]
    Compose(#[from] ComposeError),
    /// Scale reconciliation failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    /// A fatal animation error.
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

impl ChartError {
    /// Returns `true` for errors that indicate a structurally broken animation queue.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Animation(err) | Self::Reconcile(ReconcileError::Animation(err)) => {
                err.is_fatal()
            }
            Self::Compose(_) | Self::Reconcile(ReconcileError::MissingAxis) => false,
        }
    }
}
