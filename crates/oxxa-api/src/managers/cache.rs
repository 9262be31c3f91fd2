use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::trace;

/// Lazily filled details shared by every resource object with the same handle.
pub type Slot<D> = Rc<OnceCell<D>>;

/// Per-client map from handle to details slot.
///
/// Only the details are cached, never the resource objects themselves, so
/// the cache holds no reference back to the client.
pub struct HandleCache<D> {
    kind: &'static str,
    slots: RefCell<BTreeMap<String, Slot<D>>>,
}

impl<D> HandleCache<D> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slots: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn clear(&self) {
        let mut slots = self.slots.borrow_mut();
        trace!(kind = self.kind, dropped = slots.len(), "clearing handle cache");
        slots.clear();
    }

    /// Store freshly listed details. An unfilled slot already handed out is
    /// filled in place; a filled one is replaced.
    pub fn insert(&self, handle: &str, details: D) -> Slot<D> {
        let mut slots = self.slots.borrow_mut();
        let details = match slots.get(handle) {
            Some(slot) => match slot.set(details) {
                Ok(()) => {
                    trace!(kind = self.kind, handle, "filled cached handle");
                    return Rc::clone(slot);
                }
                Err(details) => details,
            },
            None => details,
        };
        let slot = Rc::new(OnceCell::from(details));
        trace!(kind = self.kind, handle, "caching handle");
        slots.insert(handle.to_string(), Rc::clone(&slot));
        slot
    }

    pub fn lookup(&self, handle: &str) -> Option<Slot<D>> {
        self.slots.borrow().get(handle).cloned()
    }

    /// The slot for `handle`, creating an empty one if there is none.
    pub fn get_or_insert(&self, handle: &str) -> Slot<D> {
        let mut slots = self.slots.borrow_mut();
        Rc::clone(slots.entry(handle.to_string()).or_insert_with(|| {
            trace!(kind = self.kind, handle, "new unfetched handle");
            Rc::new(OnceCell::new())
        }))
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_insert_shares_one_slot() {
        let cache: HandleCache<String> = HandleCache::new("identity");
        let a = cache.get_or_insert("SQGU88967");
        let b = cache.get_or_insert("SQGU88967");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert!(a.get().is_none());
    }

    #[test]
    fn insert_fills_handed_out_slot() {
        let cache = HandleCache::new("identity");
        let early = cache.get_or_insert("SQGU88967");
        let listed = cache.insert("SQGU88967", "ACME Inc".to_string());
        assert!(Rc::ptr_eq(&early, &listed));
        assert_eq!(early.get().map(String::as_str), Some("ACME Inc"));
    }

    #[test]
    fn insert_replaces_filled_slot() {
        let cache = HandleCache::new("nsgroup");
        let old = cache.insert("YDNR00000", 1);
        let new = cache.insert("YDNR00000", 2);
        assert!(!Rc::ptr_eq(&old, &new));
        assert_eq!(cache.lookup("YDNR00000").and_then(|s| s.get().copied()), Some(2));
        assert_eq!(old.get(), Some(&1));
    }

    #[test]
    fn clear_empties_the_map() {
        let cache = HandleCache::new("reseller");
        cache.insert("KULB12345", ());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.lookup("KULB12345").is_none());
    }
}
