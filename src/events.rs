//! Events.
//!
//! Presenters talk to each other across the tree through an [`EventBus`]: a typed, in-process
//! publish/subscribe hub backed by crossbeam channels. The bus is handed to each presenter when it
//! is constructed; nothing about it is global.

use core::any::{Any, TypeId};
use core::fmt;
use crossbeam::channel::{self, Receiver, Sender, TryIter, TryRecvError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

type SubscriberId = u64;

/// Subscriber table.
///
/// Senders are stored type-erased; every entry under `TypeId::of::<E>()` is a `Sender<E>`.
#[derive(Default)]
struct Subscribers {
    next_id: SubscriberId,
    by_type: HashMap<TypeId, Vec<(SubscriberId, Box<dyn Any + Send>)>>,
}

/// A typed publish/subscribe event bus.
///
/// Cloning a bus yields another handle to the same set of subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Subscribers>>,
}

impl EventBus {
    pub fn new() -> EventBus {
        EventBus::default()
    }

    /// Subscribes to events of type `E`.
    ///
    /// Events published after this call are queued on the returned subscription until received.
    pub fn subscribe<E: Clone + Send + 'static>(&self) -> Subscription<E> {
        let (sender, receiver) = channel::unbounded::<E>();
        let type_id = TypeId::of::<E>();

        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .by_type
            .entry(type_id)
            .or_insert_with(Vec::new)
            .push((id, Box::new(sender)));

        Subscription {
            receiver,
            registration: Registration {
                bus: Arc::downgrade(&self.inner),
                type_id,
                id,
            },
        }
    }

    /// Publishes an event to every live subscriber of its type.
    ///
    /// Returns the number of subscribers the event was delivered to. Subscribers whose receiving
    /// end has been dropped are pruned.
    pub fn publish<E: Clone + Send + 'static>(&self, event: E) -> usize {
        let mut inner = self.inner.lock();
        let subscribers = match inner.by_type.get_mut(&TypeId::of::<E>()) {
            Some(subscribers) => subscribers,
            None => return 0,
        };

        let mut delivered = 0;
        subscribers.retain(|(id, sender)| match sender.downcast_ref::<Sender<E>>() {
            Some(sender) => match sender.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    log::trace!("pruning disconnected subscriber {}", id);
                    false
                }
            },
            None => {
                log::error!("subscriber {} is registered under the wrong event type", id);
                false
            }
        });
        delivered
    }

    /// Returns the number of registered subscribers for events of type `E`.
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.inner
            .lock()
            .by_type
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.lock();
        let count: usize = inner.by_type.values().map(Vec::len).sum();
        write!(f, "EventBus({} subscribers)", count)
    }
}

/// A live subscription on an event bus.
///
/// Dropping the registration (or calling [`Registration::remove`]) unsubscribes; the bus then
/// drops its sending end, so any receiver still held observes a disconnected channel.
pub struct Registration {
    bus: Weak<Mutex<Subscribers>>,
    type_id: TypeId,
    id: SubscriberId,
}

impl Registration {
    /// Unsubscribes.
    pub fn remove(self) {
        drop(self);
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            let mut inner = bus.lock();
            if let Some(subscribers) = inner.by_type.get_mut(&self.type_id) {
                subscribers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Registration({})", self.id)
    }
}

/// A receiver paired with the registration that keeps it subscribed.
#[derive(Debug)]
pub struct Subscription<E> {
    receiver: Receiver<E>,
    registration: Registration,
}

impl<E> Subscription<E> {
    /// Receives a queued event, if any.
    pub fn try_recv(&self) -> Result<E, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Iterates over all currently queued events.
    pub fn try_iter(&self) -> TryIter<'_, E> {
        self.receiver.try_iter()
    }

    /// Splits the subscription into its receiver and registration.
    pub fn into_parts(self) -> (Receiver<E>, Registration) {
        (self.receiver, self.registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Saved(u32);

    #[derive(Debug, Clone, PartialEq)]
    struct Closed;

    #[test]
    fn publish_reaches_subscribers_of_the_same_type() {
        let bus = EventBus::new();
        let first = bus.subscribe::<Saved>();
        let second = bus.clone().subscribe::<Saved>();
        let other = bus.subscribe::<Closed>();

        assert_eq!(bus.publish(Saved(7)), 2);
        assert_eq!(first.try_recv(), Ok(Saved(7)));
        assert_eq!(second.try_recv(), Ok(Saved(7)));
        assert_eq!(other.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(bus.publish(Closed), 1);
    }

    #[test]
    fn events_queue_in_order() {
        let bus = EventBus::new();
        let sub = bus.subscribe::<Saved>();
        bus.publish(Saved(1));
        bus.publish(Saved(2));
        bus.publish(Saved(3));
        assert_eq!(sub.try_iter().collect::<Vec<_>>(), vec![Saved(1), Saved(2), Saved(3)]);
    }

    #[test]
    fn removing_a_registration_disconnects_the_receiver() {
        let bus = EventBus::new();
        let (receiver, registration) = bus.subscribe::<Saved>().into_parts();
        assert_eq!(bus.subscriber_count::<Saved>(), 1);

        registration.remove();
        assert_eq!(bus.subscriber_count::<Saved>(), 0);
        assert_eq!(bus.publish(Saved(1)), 0);
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn dropped_receivers_are_pruned_on_publish() {
        let bus = EventBus::new();
        let (receiver, registration) = bus.subscribe::<Saved>().into_parts();
        drop(receiver);
        assert_eq!(bus.subscriber_count::<Saved>(), 1);
        assert_eq!(bus.publish(Saved(1)), 0);
        assert_eq!(bus.subscriber_count::<Saved>(), 0);
        // unsubscribing after the prune is harmless
        drop(registration);
    }

    #[test]
    fn registrations_outliving_the_bus() {
        let bus = EventBus::new();
        let sub = bus.subscribe::<Closed>();
        drop(bus);
        assert_eq!(sub.try_recv(), Err(TryRecvError::Disconnected));
        drop(sub);
    }
}
