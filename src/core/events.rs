//! Subscriber-based event emission.
//!
//! An [`EventEmitter`] holds subscriber callbacks that receive both the
//! event and mutable access to the owning context. Owners publish through
//! the [`EventBus`] trait by temporarily taking the emitter out of `self`
//! (`std::mem::take`) so subscribers can re-borrow the owner mutably.

/// A list of subscribers for events of type `E`, called with a context `C`.
pub struct EventEmitter<E, C> {
    subscribers: Vec<Box<dyn FnMut(&E, &mut C)>>,
}

impl<E, C> EventEmitter<E, C> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Register a subscriber. Subscribers run in registration order.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&E, &mut C) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver an event to every subscriber, returning the emitter so the
    /// owner can put it back after a `std::mem::take`.
    pub fn emit(mut self, event: E, context: &mut C) -> Self {
        for subscriber in &mut self.subscribers {
            subscriber(&event, context);
        }
        self
    }
}

impl<E, C> Default for EventEmitter<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C> std::fmt::Debug for EventEmitter<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Implemented by owners of an [`EventEmitter`] to publish events to their
/// own subscribers.
pub trait EventBus<E> {
    fn publish(&mut self, event: &E);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        count: usize,
        events: EventEmitter<u32, Counter>,
    }

    impl EventBus<u32> for Counter {
        fn publish(&mut self, event: &u32) {
            let emitter = std::mem::take(&mut self.events);
            self.events = emitter.emit(*event, self);
        }
    }

    #[test]
    fn test_subscribers_see_events_and_context() {
        let mut counter = Counter {
            count: 0,
            events: EventEmitter::new(),
        };
        counter.events.subscribe(|event, ctx| {
            ctx.count += *event as usize;
        });
        counter.publish(&3);
        counter.publish(&4);
        assert_eq!(counter.count, 7);
    }

    #[test]
    fn test_subscribers_run_in_order() {
        let mut counter = Counter {
            count: 1,
            events: EventEmitter::new(),
        };
        counter.events.subscribe(|_, ctx| ctx.count *= 10);
        counter.events.subscribe(|_, ctx| ctx.count += 1);
        counter.publish(&0);
        assert_eq!(counter.count, 11);
    }
}
