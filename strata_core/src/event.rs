// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A per-owner publish/subscribe bus with category-tagged listeners.
//!
//! Listeners are registered under an event `name` and a `category`. The category names
//! the *source* of a registration, so a component that rewires itself can replace its own
//! listeners with [`EventBus::on_with_off`] without touching anyone else's and without
//! ever double-firing.
//!
//! [`EventBus::fire`] is synchronous and runs listeners in registration order. It does
//! not isolate failures: the first listener error is returned to the caller.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::ListenerError;

/// A boxed listener callback.
pub type Callback<E> = Box<dyn FnMut(&E) -> Result<(), ListenerError>>;

/// Handle returned by registration, used to remove a single listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Listener<E> {
    id: ListenerId,
    category: String,
    once: bool,
    inert: bool,
    callback: Callback<E>,
}

/// Named, category-tagged listeners for events of type `E`.
pub struct EventBus<E> {
    listeners: HashMap<String, Vec<Listener<E>>>,
    next_id: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, listeners) in &self.listeners {
            map.entry(name, &listeners.len());
        }
        map.finish()
    }
}

impl<E> EventBus<E> {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener for `name`.
    pub fn on<F>(&mut self, name: &str, category: &str, callback: F) -> ListenerId
    where
        F: FnMut(&E) -> Result<(), ListenerError> + 'static,
    {
        self.push(name, category, false, Box::new(callback))
    }

    /// Replaces any listener registered under `(name, category)`, then appends `callback`.
    pub fn on_with_off<F>(&mut self, name: &str, category: &str, callback: F) -> ListenerId
    where
        F: FnMut(&E) -> Result<(), ListenerError> + 'static,
    {
        self.off_category(name, category);
        self.on(name, category, callback)
    }

    /// Appends a listener that goes inert after its first invocation.
    ///
    /// Inert listeners stay in storage until removed but are never invoked again.
    pub fn once<F>(&mut self, name: &str, category: &str, callback: F) -> ListenerId
    where
        F: FnMut(&E) -> Result<(), ListenerError> + 'static,
    {
        self.push(name, category, true, Box::new(callback))
    }

    fn push(&mut self, name: &str, category: &str, once: bool, callback: Callback<E>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        let listener = Listener {
            id,
            category: String::from(category),
            once,
            inert: false,
            callback,
        };
        match self.listeners.get_mut(name) {
            Some(list) => list.push(listener),
            None => {
                self.listeners.insert(String::from(name), alloc::vec![listener]);
            }
        }
        id
    }

    /// Removes every listener for `name`. Returns how many were removed.
    pub fn off(&mut self, name: &str) -> usize {
        self.listeners.remove(name).map_or(0, |list| list.len())
    }

    /// Removes a single listener. Returns `true` if it existed.
    pub fn off_listener(&mut self, name: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(name) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        before != list.len()
    }

    /// Removes every listener for `name` registered under `category`.
    pub fn off_category(&mut self, name: &str, category: &str) -> usize {
        let Some(list) = self.listeners.get_mut(name) else {
            return 0;
        };
        let before = list.len();
        list.retain(|l| l.category != category);
        before - list.len()
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Invokes every active listener for `name` in registration order.
    ///
    /// Returns the number of listeners invoked, or the first listener error.
    pub fn fire(&mut self, name: &str, event: &E) -> Result<usize, ListenerError> {
        let Some(list) = self.listeners.get_mut(name) else {
            return Ok(0);
        };
        let mut invoked = 0;
        for listener in list.iter_mut().filter(|l| !l.inert) {
            if listener.once {
                listener.inert = true;
            }
            invoked += 1;
            (listener.callback)(event)?;
        }
        Ok(invoked)
    }

    /// Returns the number of active listeners for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners
            .get(name)
            .map_or(0, |list| list.iter().filter(|l| !l.inert).count())
    }

    /// Returns the number of active listeners for `(name, category)`.
    pub fn category_count(&self, name: &str, category: &str) -> usize {
        self.listeners.get(name).map_or(0, |list| {
            list.iter()
                .filter(|l| !l.inert && l.category == category)
                .count()
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Callback<u32>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |tag: &'static str| -> Callback<u32> {
            let sink = sink.clone();
            Box::new(move |_: &u32| {
                sink.borrow_mut().push(tag);
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn on_with_off_twice_leaves_one_listener() {
        let mut bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        let first = make("first");
        let second = make("second");
        bus.on_with_off("end", "catA", first);
        bus.on_with_off("end", "catA", second);

        assert_eq!(bus.category_count("end", "catA"), 1);
        assert_eq!(bus.fire("end", &0), Ok(1));
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn on_with_off_leaves_other_categories_alone() {
        let mut bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        bus.on("end", "catB", make("b"));
        bus.on_with_off("end", "catA", make("a1"));
        bus.on_with_off("end", "catA", make("a2"));

        bus.fire("end", &0).unwrap();
        assert_eq!(*log.borrow(), vec!["b", "a2"]);
    }

    #[test]
    fn once_goes_inert_but_stays_stored() {
        let mut bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        let id = bus.once("play", "x", make("once"));

        assert_eq!(bus.fire("play", &1), Ok(1));
        assert_eq!(bus.fire("play", &2), Ok(0));
        assert_eq!(*log.borrow(), vec!["once"]);
        assert_eq!(bus.listener_count("play"), 0);
        // Still removable by id: it was never dropped from storage.
        assert!(bus.off_listener("play", id));
    }

    #[test]
    fn off_variants_remove_the_right_listeners() {
        let mut bus = EventBus::<u32>::new();
        let (_log, make) = recorder();
        let a = bus.on("start", "a", make("a"));
        bus.on("start", "b", make("b"));
        bus.on("start", "b", make("b2"));
        bus.on("end", "a", make("end"));

        assert!(bus.off_listener("start", a));
        assert!(!bus.off_listener("start", a));
        assert_eq!(bus.off_category("start", "b"), 2);
        assert_eq!(bus.listener_count("start"), 0);
        assert_eq!(bus.off("end"), 1);
        assert_eq!(bus.off("missing"), 0);
    }

    #[test]
    fn fire_runs_in_registration_order_and_propagates_errors() {
        let mut bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        bus.on("tick", "a", make("1"));
        bus.on("tick", "a", |_: &u32| Err(ListenerError::new("broken")));
        bus.on("tick", "a", make("3"));

        assert_eq!(bus.fire("tick", &0), Err(ListenerError::new("broken")));
        assert_eq!(*log.borrow(), vec!["1"]);
    }
}
