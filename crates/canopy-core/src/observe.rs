//! Change notification for UI layers.

use crate::types::Slot;

/// What changed in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A file was accepted for the slot.
    Selected(Slot),
    /// A file was rejected for the slot; the slot is unchanged.
    Rejected(Slot),
    /// The slot's selection was removed.
    Cleared(Slot),
    /// The submission state changed.
    Submission,
}

/// Handle returned by [`Observers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Change)>;

/// A list of change listeners.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Observers {
    /// Register a listener. It is called after every change, in
    /// registration order.
    pub fn subscribe(&mut self, listener: impl FnMut(Change) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn notify(&mut self, change: Change) {
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn listeners_receive_changes_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        let a = Rc::clone(&log);
        observers.subscribe(move |c| a.borrow_mut().push(("a", c)));
        let b = Rc::clone(&log);
        observers.subscribe(move |c| b.borrow_mut().push(("b", c)));

        observers.notify(Change::Selected(Slot::Before));
        assert_eq!(
            *log.borrow(),
            vec![
                ("a", Change::Selected(Slot::Before)),
                ("b", Change::Selected(Slot::Before)),
            ]
        );
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::default();
        let c = Rc::clone(&count);
        let id = observers.subscribe(move |_| *c.borrow_mut() += 1);

        observers.notify(Change::Submission);
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(Change::Submission);
        assert_eq!(*count.borrow(), 1);
        assert!(observers.is_empty());
    }
}
