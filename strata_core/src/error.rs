// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for the event bus and the animation lifecycle.

extern crate alloc;

use alloc::string::String;

use crate::AnimationId;

/// A failure raised by an event listener.
///
/// [`EventBus::fire`](crate::EventBus::fire) stops at the first failing listener and
/// returns this error unchanged; isolating it is the caller's job.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("listener failed: {0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    /// Build a listener error from a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors produced while building or driving animations.
///
/// Only [`AnimationError::DestroyOverflow`] is fatal. Every other variant is logged and
/// recovered at the state-machine boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnimationError {
    /// No factory is registered for the requested animation kind.
    #[error("unknown animation kind `{0}`")]
    UnknownKind(String),
    /// A type-specific transition hook failed.
    #[error("animation `{id}` hook failed: {reason}")]
    Hook {
        /// The animation whose hook failed.
        id: AnimationId,
        /// Human readable failure reason.
        reason: String,
    },
    /// A listener attached to a transition event failed.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// No member with the given id exists.
    #[error("animation `{0}` not found")]
    NotFound(AnimationId),
    /// A queue did not drain within its iteration bound.
    #[error("queue `{queue}` still had members after {limit} destroy iterations")]
    DestroyOverflow {
        /// The queue being destroyed.
        queue: AnimationId,
        /// The configured iteration bound.
        limit: usize,
    },
}

impl AnimationError {
    /// Build a [`AnimationError::Hook`] value.
    pub fn hook(id: &AnimationId, reason: impl Into<String>) -> Self {
        Self::Hook {
            id: id.clone(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors that must escape to the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DestroyOverflow { .. })
    }
}
