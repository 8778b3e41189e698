//! One-shot "family finished" notification shared along a split chain.
//!
//! A root branch creates the signal; every child produced by a split gets
//! a handle to the same signal rather than a copy of its subscribers. So
//! however many splits a family goes through, its subscribers hear about
//! the end exactly once, from whichever branch was growing last.

use crate::types::BranchId;
use std::{cell::RefCell, fmt, rc::Rc};

pub type FinishedHandler = Box<dyn FnMut(BranchId)>;

/// Handle returned by [`FamilySignal::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct SignalState {
    handlers: Vec<(SubscriptionId, FinishedHandler)>,
    next_id: u64,
    fired: bool,
}

#[derive(Clone, Default)]
pub struct FamilySignal {
    inner: Rc<RefCell<SignalState>>,
}

impl fmt::Debug for FamilySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("FamilySignal")
            .field("subscribers", &state.handlers.len())
            .field("fired", &state.fired)
            .finish()
    }
}

impl FamilySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl FnMut(BranchId) + 'static) -> SubscriptionId {
        let mut state = self.inner.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.inner.borrow_mut();
        let before = state.handlers.len();
        state.handlers.retain(|(h, _)| *h != id);
        state.handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    pub fn has_fired(&self) -> bool {
        self.inner.borrow().fired
    }

    /// Notifies every subscriber that the family ended at `branch`.
    ///
    /// Only the first call delivers anything; later calls return `false`.
    /// Handlers may subscribe or unsubscribe on this signal while running.
    pub fn fire(&self, branch: BranchId) -> bool {
        let mut handlers = {
            let mut state = self.inner.borrow_mut();
            if state.fired {
                return false;
            }
            state.fired = true;
            std::mem::take(&mut state.handlers)
        };

        for (_, handler) in handlers.iter_mut() {
            handler(branch);
        }

        let mut state = self.inner.borrow_mut();
        let added = std::mem::take(&mut state.handlers);
        handlers.extend(added);
        state.handlers = handlers;
        true
    }

    /// Whether two handles refer to the same family.
    pub fn same_family(&self, other: &FamilySignal) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<BranchId>>>, impl FnMut(BranchId) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |id| sink.borrow_mut().push(id))
    }

    #[test]
    fn fire_delivers_once() {
        let signal = FamilySignal::new();
        let (seen, handler) = recorder();
        signal.subscribe(handler);

        assert!(signal.fire(3));
        assert!(!signal.fire(4));
        assert!(signal.has_fired());
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn clones_share_subscribers_and_fired_flag() {
        let root = FamilySignal::new();
        let child = root.clone();
        let (seen, handler) = recorder();
        root.subscribe(handler);

        assert!(child.same_family(&root));
        assert_eq!(child.subscriber_count(), 1);

        child.fire(9);
        assert!(!root.fire(1));
        assert_eq!(*seen.borrow(), vec![9]);
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let signal = FamilySignal::new();
        let (seen, handler) = recorder();
        let id = signal.subscribe(handler);

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        signal.fire(1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn handler_may_touch_signal_while_firing() {
        let signal = FamilySignal::new();
        let inner = signal.clone();
        signal.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        assert!(signal.fire(0));
        assert_eq!(signal.subscriber_count(), 2);
    }

    #[test]
    fn separate_families_are_independent() {
        let a = FamilySignal::new();
        let b = FamilySignal::new();
        a.fire(1);
        assert!(!a.same_family(&b));
        assert!(!b.has_fired());
    }
}
