//! Notification bus.
//!
//! In-process publish/subscribe with two guarantees the rest of the core
//! leans on:
//!
//! 1. **Ordering**: handlers are delivered to in subscription order, and
//!    notifications are delivered in publish order.
//! 2. **Re-entrancy safety**: a notification produced while another is
//!    being delivered is queued and drained strictly after the current
//!    delivery finishes. There is one global publish order and no
//!    handler-recursion stack growth.
//!
//! Handlers return their follow-up notifications from `handle` instead of
//! publishing re-entrantly; the bus enqueues them in return order.

use std::collections::VecDeque;

use super::Notification;

/// Subscription handle, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u32);

impl HandlerId {
    /// Create a new handler ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handler({})", self.0)
    }
}

/// An observer of core notifications.
///
/// Returned notifications are treated as follow-up publications: the bus
/// appends them to its queue and delivers them after the current
/// notification has been seen by every handler.
pub trait Handler {
    /// React to a notification, optionally producing follow-ups.
    fn handle(&mut self, notification: &Notification) -> Vec<Notification>;
}

/// Blanket adapter so plain closures can observe without follow-ups.
impl<F> Handler for F
where
    F: FnMut(&Notification),
{
    fn handle(&mut self, notification: &Notification) -> Vec<Notification> {
        self(notification);
        Vec::new()
    }
}

/// The in-process notification bus.
#[derive(Default)]
pub struct NotificationBus {
    /// Subscribers in subscription order.
    handlers: Vec<(HandlerId, Box<dyn Handler>)>,

    /// Notifications awaiting delivery.
    queue: VecDeque<Notification>,

    /// True while the queue is being drained.
    delivering: bool,

    /// Next handler ID to allocate.
    next_id: u32,
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("handlers", &self.handlers.len())
            .field("queued", &self.queue.len())
            .field("delivering", &self.delivering)
            .finish()
    }
}

impl NotificationBus {
    /// Create a new bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler, returns its ID.
    pub fn subscribe(&mut self, handler: Box<dyn Handler>) -> HandlerId {
        let id = HandlerId::new(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    /// Subscribe a closure that never publishes follow-ups.
    pub fn subscribe_fn<F>(&mut self, f: F) -> HandlerId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.subscribe(Box::new(f))
    }

    /// Unsubscribe a handler. Returns true if it was registered.
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(hid, _)| *hid != id);
        self.handlers.len() != before
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Publish a notification.
    ///
    /// If a delivery is already in progress the notification is queued
    /// behind it; otherwise the queue is drained to completion before
    /// this call returns. Either way, every queued notification reaches
    /// every handler in one global order.
    pub fn publish(&mut self, notification: Notification) {
        self.queue.push_back(notification);

        if self.delivering {
            return;
        }

        self.delivering = true;
        while let Some(current) = self.queue.pop_front() {
            for (_, handler) in &mut self.handlers {
                for follow_up in handler.handle(&current) {
                    self.queue.push_back(follow_up);
                }
            }
        }
        self.delivering = false;
    }

    /// Publish a batch in order.
    pub fn publish_all(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        for n in notifications {
            self.publish(n);
        }
    }
}
