use rapier2d::prelude::ColliderHandle;

use crate::body::Body;
use crate::category::Category;

/// One side of a contact: the collider the engine reported, the body owning it, and that
/// body's category.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContactSide {
    pub collider: ColliderHandle,
    pub body: Body,
    pub category: Category,
}

/// A touching collider pair with at least one matching handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActiveCollision {
    pub first: ContactSide,
    pub second: ContactSide,
    /// Set until the first dispatch round reports the pair as collided.
    pub just_collided: bool,
    seq: u64,
}

impl ActiveCollision {
    /// Identity is the unordered collider pair.
    #[inline]
    pub fn matches(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        (self.first.collider == a && self.second.collider == b)
            || (self.first.collider == b && self.second.collider == a)
    }

    #[inline]
    pub fn owns_body(&self, body: Body) -> bool {
        self.first.body == body || self.second.body == body
    }

    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Active collision records, kept in the order contacts began.
///
/// Every record gets a monotonically increasing sequence number, and removals preserve
/// order, so the records are always sorted by sequence. Dispatch walks them with a cursor
/// on the sequence number ([`Self::next_after`]) rather than an index: callbacks may remove
/// or add records mid-round without the walk skipping or repeating any.
///
/// Storage is reserved up front and reused; steady-state churn does not allocate.
#[derive(Debug)]
pub struct ActiveCollisions {
    records: Vec<ActiveCollision>,
    next_seq: u64,
}

impl ActiveCollisions {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    /// Start tracking a pair, returning the new record's sequence number. `None` if the
    /// pair is already tracked.
    pub fn begin(&mut self, first: ContactSide, second: ContactSide) -> Option<u64> {
        if self.contains(first.collider, second.collider) {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.push(ActiveCollision {
            first,
            second,
            just_collided: true,
            seq,
        });
        Some(seq)
    }

    /// Stop tracking a pair, returning the record if there was one.
    pub fn end(&mut self, a: ColliderHandle, b: ColliderHandle) -> Option<ActiveCollision> {
        let index = self.records.iter().position(|r| r.matches(a, b))?;
        Some(self.records.remove(index))
    }

    /// Remove and return the oldest record involving `body`.
    ///
    /// Call repeatedly to drain a body's records one at a time, so work done between calls
    /// (such as running callbacks) sees a consistent tracker.
    pub fn take_owned_by(&mut self, body: Body) -> Option<ActiveCollision> {
        let index = self.records.iter().position(|r| r.owns_body(body))?;
        Some(self.records.remove(index))
    }

    /// Sequence number the next record will receive. Records at or past this value were
    /// created after the call.
    #[inline]
    pub fn round_limit(&self) -> u64 {
        self.next_seq
    }

    /// The oldest record with a sequence number greater than `after` (or the oldest record
    /// overall when `after` is `None`).
    pub fn next_after(&self, after: Option<u64>) -> Option<ActiveCollision> {
        let index = match after {
            Some(seq) => self.records.partition_point(|r| r.seq <= seq),
            None => 0,
        };
        self.records.get(index).copied()
    }

    /// Clear `just_collided` on the record with this sequence number, if it still exists.
    pub fn mark_dispatched(&mut self, seq: u64) {
        if let Ok(index) = self.records.binary_search_by_key(&seq, |r| r.seq) {
            self.records[index].just_collided = false;
        }
    }

    #[inline]
    pub fn contains(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.records.iter().any(|r| r.matches(a, b))
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ActiveCollision> {
        self.records.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(id: u32) -> ContactSide {
        ContactSide {
            collider: ColliderHandle::from_raw_parts(id, 0),
            body: Body::from_raw_parts(id, 0),
            category: Category::from_index(0),
        }
    }

    #[test]
    fn pairs_are_unordered_and_tracked_once() {
        let mut active = ActiveCollisions::with_capacity(4);
        assert_eq!(active.begin(side(1), side(2)), Some(0));
        assert_eq!(active.begin(side(2), side(1)), None);
        assert_eq!(active.len(), 1);

        let record = active.end(side(2).collider, side(1).collider).unwrap();
        assert!(record.just_collided);
        assert_eq!(record.first, side(1));
        assert!(active.is_empty());
        assert!(active.end(side(1).collider, side(2).collider).is_none());
    }

    #[test]
    fn take_owned_by_drains_in_insertion_order() {
        let mut active = ActiveCollisions::with_capacity(4);
        active.begin(side(1), side(2));
        active.begin(side(3), side(4));
        active.begin(side(5), side(1));

        let body = side(1).body;
        assert_eq!(active.take_owned_by(body).unwrap().second, side(2));
        assert_eq!(active.take_owned_by(body).unwrap().first, side(5));
        assert!(active.take_owned_by(body).is_none());
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn cursor_survives_removals_during_a_round() {
        let mut active = ActiveCollisions::with_capacity(4);
        active.begin(side(1), side(2));
        active.begin(side(3), side(4));
        active.begin(side(5), side(6));
        let limit = active.round_limit();

        let first = active.next_after(None).unwrap();
        // A callback removes the current record and the next one...
        active.end(side(1).collider, side(2).collider);
        active.end(side(3).collider, side(4).collider);
        // ...and adds a new one, which belongs to the next round.
        active.begin(side(7), side(8));

        let next = active.next_after(Some(first.seq())).unwrap();
        assert_eq!(next.first, side(5));
        let after = active.next_after(Some(next.seq())).unwrap();
        assert!(after.seq() >= limit);
    }

    #[test]
    fn mark_dispatched_clears_just_collided() {
        let mut active = ActiveCollisions::with_capacity(4);
        active.begin(side(1), side(2));
        active.begin(side(3), side(4));

        let second = active.next_after(Some(0)).unwrap();
        active.mark_dispatched(second.seq());

        let flags: Vec<bool> = active.iter().map(|r| r.just_collided).collect();
        assert_eq!(flags, vec![true, false]);
    }
}
