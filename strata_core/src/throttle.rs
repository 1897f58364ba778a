// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coalescing of rapid lifecycle calls.
//!
//! Each gated operation remembers when it last ran. A call arriving inside the window is
//! not dropped: it is parked, and at most one parked call per operation runs once the
//! window has elapsed. Parked calls keep their arrival order, and a call that arrives
//! while anything is parked parks behind it, so `destroy → init → play` sequences are
//! never reordered.

use smallvec::SmallVec;

use crate::time::{Duration, Time};

/// A throttled lifecycle operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// `init`.
    Init,
    /// `play`.
    Play,
    /// `destroy`.
    Destroy,
}

impl Gate {
    const fn index(self) -> usize {
        match self {
            Self::Init => 0,
            Self::Play => 1,
            Self::Destroy => 2,
        }
    }
}

/// Last-call timestamps plus a FIFO of parked calls.
#[derive(Clone, Debug)]
pub struct Throttle {
    window: Duration,
    last: [Option<Time>; 3],
    pending: SmallVec<[Gate; 3]>,
}

impl Throttle {
    /// Default coalescing window.
    pub const DEFAULT_WINDOW: Duration = Duration(100);

    /// Creates a throttle with the given coalescing window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: [None; 3],
            pending: SmallVec::new(),
        }
    }

    /// Returns the coalescing window.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn due(&self, gate: Gate, now: Time) -> bool {
        match self.last[gate.index()] {
            Some(last) => now.saturating_since(last) >= self.window,
            None => true,
        }
    }

    /// Returns `true` if `gate` may run now; otherwise parks it and returns `false`.
    pub fn admit(&mut self, gate: Gate, now: Time) -> bool {
        if self.pending.is_empty() && self.due(gate, now) {
            self.last[gate.index()] = Some(now);
            return true;
        }
        if !self.pending.contains(&gate) {
            self.pending.push(gate);
        }
        false
    }

    /// Pops the oldest parked call if its window has elapsed.
    pub fn take_due(&mut self, now: Time) -> Option<Gate> {
        let gate = *self.pending.first()?;
        if !self.due(gate, now) {
            return None;
        }
        self.pending.remove(0);
        self.last[gate.index()] = Some(now);
        Some(gate)
    }

    /// Returns `true` while any call is parked.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn rapid_calls_collapse_to_one_trailing_call() {
        let mut t = Throttle::new(Duration(100));
        assert!(t.admit(Gate::Play, Time(0)));
        assert!(!t.admit(Gate::Play, Time(10)));
        assert!(!t.admit(Gate::Play, Time(20)));
        assert!(!t.admit(Gate::Play, Time(30)));

        assert_eq!(t.take_due(Time(50)), None);
        assert_eq!(t.take_due(Time(100)), Some(Gate::Play));
        assert_eq!(t.take_due(Time(500)), None);
    }

    #[test]
    fn gates_are_independent_but_ordered() {
        let mut t = Throttle::new(Duration(100));
        assert!(t.admit(Gate::Destroy, Time(0)));
        assert!(t.admit(Gate::Init, Time(0)));
        assert!(!t.admit(Gate::Destroy, Time(50)));
        // Init is due on its own, but must wait behind the parked destroy.
        assert!(!t.admit(Gate::Init, Time(50)));

        assert_eq!(t.take_due(Time(100)), Some(Gate::Destroy));
        assert_eq!(t.take_due(Time(100)), Some(Gate::Init));
        assert!(!t.has_pending());
    }

    #[test]
    fn zero_window_never_parks() {
        let mut t = Throttle::new(Duration::ZERO);
        for _ in 0..5 {
            assert!(t.admit(Gate::Init, Time(7)));
        }
        assert!(!t.has_pending());
    }
}
