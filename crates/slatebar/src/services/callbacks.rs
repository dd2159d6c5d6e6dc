//! Subscriber registry used by the main-thread services.
//!
//! Services hold a `Subscribers<T>` and emit snapshots into it; widgets
//! subscribe and keep the returned id so they can unsubscribe on teardown.
//! Entries are cloned out before invocation, so a callback may subscribe
//! or unsubscribe (including itself) while an emit is in flight.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cancellation handle for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// A set of subscribers receiving `&T` snapshots.
pub struct Subscribers<T> {
    entries: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Add a subscriber and return its cancellation handle.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + 'static,
    {
        let id = SubscriptionId::next();
        self.entries.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns whether it was present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Invoke every current subscriber with `snapshot`.
    pub fn emit(&self, snapshot: &T) {
        let subscribers: Vec<Subscriber<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for subscriber in subscribers {
            subscriber(snapshot);
        }
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_subscribe_and_emit() {
        let subscribers: Subscribers<i32> = Subscribers::new();
        let sum = Rc::new(Cell::new(0));

        let sum_ref = sum.clone();
        subscribers.subscribe(move |v| sum_ref.set(sum_ref.get() + v));

        subscribers.emit(&3);
        subscribers.emit(&4);
        assert_eq!(sum.get(), 7);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let subscribers: Subscribers<i32> = Subscribers::new();
        let count = Rc::new(Cell::new(0));

        let count_ref = count.clone();
        let id = subscribers.subscribe(move |_| count_ref.set(count_ref.get() + 1));

        subscribers.emit(&0);
        assert!(subscribers.unsubscribe(id));
        subscribers.emit(&0);
        assert_eq!(count.get(), 1);

        // Second unsubscribe reports the id as gone.
        assert!(!subscribers.unsubscribe(id));
    }

    #[test]
    fn test_ids_are_unique_across_registries() {
        let a: Subscribers<()> = Subscribers::new();
        let b: Subscribers<()> = Subscribers::new();
        let id_a = a.subscribe(|_| {});
        let id_b = b.subscribe(|_| {});
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_subscriber_may_unsubscribe_itself_during_emit() {
        let subscribers: Rc<Subscribers<()>> = Rc::new(Subscribers::new());
        let fired = Rc::new(Cell::new(0));

        let id_cell: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let subs_ref = subscribers.clone();
        let id_ref = id_cell.clone();
        let fired_ref = fired.clone();
        let id = subscribers.subscribe(move |_| {
            fired_ref.set(fired_ref.get() + 1);
            if let Some(own) = id_ref.get() {
                subs_ref.unsubscribe(own);
            }
        });
        id_cell.set(Some(id));

        subscribers.emit(&());
        subscribers.emit(&());
        assert_eq!(fired.get(), 1);
    }
}
