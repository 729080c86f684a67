//! Injected event source with scoped subscriptions.
//!
//! The window layer pushes [`InputEvent`]s into an [`InputBus`]; listeners
//! register a handler and receive a [`Subscription`] that unregisters the
//! handler when dropped. The bus is single-threaded and lives on the
//! render thread.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::event::InputEvent;

type Handler = Rc<RefCell<dyn FnMut(&InputEvent)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Fan-out of input events to every live subscriber.
///
/// Cloning the bus yields another handle to the same set of subscribers.
#[derive(Clone, Default)]
pub struct InputBus {
    registry: Rc<RefCell<Registry>>,
}

impl InputBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler`. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unregisters the handler"]
    pub fn subscribe(&self, handler: impl FnMut(&InputEvent) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        registry.handlers.push((id, handler));
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Deliver `event` to every subscriber in registration order.
    ///
    /// Malformed events (non-finite coordinates) are dropped. Handlers may
    /// subscribe or unsubscribe while the event is being delivered; those
    /// changes apply from the next dispatch. A handler that re-enters the
    /// bus does not receive the nested event.
    pub fn dispatch(&self, event: InputEvent) {
        if !event.is_well_formed() {
            tracing::trace!(?event, "dropping malformed input event");
            return;
        }
        let handlers: Vec<Handler> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (&mut *handler)(&event);
            }
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

impl std::fmt::Debug for InputBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Keeps a handler registered on an [`InputBus`]. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .handlers
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_dispatch_reaches_subscriber() {
        let bus = InputBus::new();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let _sub = bus.subscribe(move |_| counter.set(counter.get() + 1));

        bus.dispatch(InputEvent::FocusChanged(true));
        bus.dispatch(InputEvent::FocusChanged(false));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = InputBus::new();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let sub = bus.subscribe(move |_| counter.set(counter.get() + 1));
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
        bus.dispatch(InputEvent::FocusChanged(true));
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = InputBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }

    #[test]
    fn test_registration_order() {
        let bus = InputBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&order);
        let second = Rc::clone(&order);
        let _a = bus.subscribe(move |_| first.borrow_mut().push('a'));
        let _b = bus.subscribe(move |_| second.borrow_mut().push('b'));

        bus.dispatch(InputEvent::FocusChanged(true));
        assert_eq!(*order.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn test_malformed_event_dropped() {
        let bus = InputBus::new();
        let seen = Rc::new(Cell::new(false));
        let flag = Rc::clone(&seen);
        let _sub = bus.subscribe(move |_| flag.set(true));

        bus.dispatch(InputEvent::CursorMoved {
            x: f64::INFINITY,
            y: 0.0,
        });
        assert!(!seen.get());
    }

    #[test]
    fn test_subscribe_during_dispatch() {
        let bus = InputBus::new();
        let late = Rc::new(RefCell::new(Vec::new()));
        let bus_handle = bus.clone();
        let late_subs = Rc::clone(&late);
        let _sub = bus.subscribe(move |_| {
            late_subs.borrow_mut().push(bus_handle.subscribe(|_| {}));
        });

        bus.dispatch(InputEvent::FocusChanged(true));
        assert_eq!(bus.subscriber_count(), 2);
    }
}
