use std::collections::HashMap;

use rapier2d::prelude::ColliderHandle;

/// Identity of an engine contact: the unordered pair of colliders it connects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContactKey {
    low: ColliderHandle,
    high: ColliderHandle,
}

impl ContactKey {
    pub fn new(a: ColliderHandle, b: ColliderHandle) -> Self {
        if a.into_raw_parts() <= b.into_raw_parts() {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    #[inline]
    pub fn colliders(&self) -> (ColliderHandle, ColliderHandle) {
        (self.low, self.high)
    }

    #[inline]
    pub fn involves(&self, collider: ColliderHandle) -> bool {
        self.low == collider || self.high == collider
    }
}

#[derive(Copy, Clone, Debug)]
struct Decision {
    pass_thru: bool,
    seen: bool,
}

/// Pass-through decisions, one per live contact.
///
/// A decision is made the first time the engine is about to solve a contact and reused
/// until the contact ends. Flipping it mid-contact would hand the solver an inconsistent
/// constraint, so callers must never recompute an entry that is present.
///
/// Each lookup marks the entry as seen for the current step. [`Self::end_step`] drops
/// entries the engine stopped presenting, which covers contacts that come within solving
/// distance and leave again without ever being reported as started.
#[derive(Debug)]
pub struct PassThroughCache {
    decisions: HashMap<ContactKey, Decision>,
}

impl PassThroughCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            decisions: HashMap::with_capacity(capacity),
        }
    }

    /// Cached decision for `key`, marking it as seen this step.
    pub fn lookup(&mut self, key: ContactKey) -> Option<bool> {
        let decision = self.decisions.get_mut(&key)?;
        decision.seen = true;
        Some(decision.pass_thru)
    }

    /// Cached decision for `key` without touching it.
    pub fn get(&self, key: ContactKey) -> Option<bool> {
        self.decisions.get(&key).map(|d| d.pass_thru)
    }

    pub fn record(&mut self, key: ContactKey, pass_thru: bool) {
        self.decisions.insert(
            key,
            Decision {
                pass_thru,
                seen: true,
            },
        );
    }

    pub fn invalidate(&mut self, key: ContactKey) -> Option<bool> {
        self.decisions.remove(&key).map(|d| d.pass_thru)
    }

    /// Drop every decision involving `collider`.
    pub fn forget_collider(&mut self, collider: ColliderHandle) {
        self.decisions.retain(|key, _| !key.involves(collider));
    }

    /// Drop decisions not seen since the previous call, except those for which `is_frozen`
    /// holds (the engine skipped the pair, e.g. because both bodies are asleep).
    pub fn end_step(&mut self, mut is_frozen: impl FnMut(ContactKey) -> bool) {
        self.decisions.retain(|key, decision| {
            if decision.seen {
                decision.seen = false;
                true
            } else {
                is_frozen(*key)
            }
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collider(id: u32) -> ColliderHandle {
        ColliderHandle::from_raw_parts(id, 0)
    }

    #[test]
    fn key_is_unordered() {
        let a = ContactKey::new(collider(4), collider(1));
        let b = ContactKey::new(collider(1), collider(4));
        assert_eq!(a, b);
        assert_eq!(a.colliders(), (collider(1), collider(4)));
        assert!(a.involves(collider(4)));
        assert!(!a.involves(collider(2)));
    }

    #[test]
    fn decisions_survive_while_seen_each_step() {
        let mut cache = PassThroughCache::with_capacity(4);
        let key = ContactKey::new(collider(1), collider(2));
        cache.record(key, true);

        cache.end_step(|_| false);
        assert_eq!(cache.lookup(key), Some(true));
        cache.end_step(|_| false);
        assert_eq!(cache.get(key), Some(true));

        // Not presented by the engine during this step.
        cache.end_step(|_| false);
        assert_eq!(cache.get(key), None);
    }

    #[test]
    fn frozen_contacts_keep_their_decision() {
        let mut cache = PassThroughCache::with_capacity(4);
        let key = ContactKey::new(collider(1), collider(2));
        cache.record(key, false);

        cache.end_step(|_| true);
        cache.end_step(|_| true);
        assert_eq!(cache.get(key), Some(false));
    }

    #[test]
    fn forget_collider_drops_all_its_contacts() {
        let mut cache = PassThroughCache::with_capacity(4);
        cache.record(ContactKey::new(collider(1), collider(2)), true);
        cache.record(ContactKey::new(collider(3), collider(1)), false);
        cache.record(ContactKey::new(collider(3), collider(4)), true);

        cache.forget_collider(collider(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.invalidate(ContactKey::new(collider(4), collider(3))),
            Some(true)
        );
        assert!(cache.is_empty());
    }
}
