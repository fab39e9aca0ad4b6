use std::collections::HashMap;

use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::body::Body;
use crate::category::Category;

/// What the world knows about a live body besides the engine state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BodyRecord {
    pub handle: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub category: Category,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    record: Option<BodyRecord>,
}

/// Generational slot pool of live bodies.
///
/// Released slots are reused, but with a bumped generation, so handles to destroyed bodies
/// never resolve to their successors.
#[derive(Debug)]
pub struct BodyPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_handle: HashMap<RigidBodyHandle, Body>,
}

impl BodyPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            by_handle: HashMap::with_capacity(capacity),
        }
    }

    pub fn acquire(&mut self, record: BodyRecord) -> Body {
        let body = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.record = Some(record);
                Body::from_raw_parts(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                Body::from_raw_parts(index, 0)
            }
        };
        self.by_handle.insert(record.handle, body);
        body
    }

    /// Returns the record of a live body and invalidates its handle.
    pub fn release(&mut self, body: Body) -> Option<BodyRecord> {
        let (index, generation) = body.into_raw_parts();
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.by_handle.remove(&record.handle);
        Some(record)
    }

    pub fn get(&self, body: Body) -> Option<&BodyRecord> {
        let (index, generation) = body.into_raw_parts();
        let slot = self.slots.get(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.record.as_ref()
    }

    #[inline]
    pub fn contains(&self, body: Body) -> bool {
        self.get(body).is_some()
    }

    /// Body owning an engine rigid-body.
    pub fn resolve(&self, handle: RigidBodyHandle) -> Option<(Body, &BodyRecord)> {
        let body = *self.by_handle.get(&handle)?;
        Some((body, self.get(body)?))
    }

    /// Any live body, lowest slot first.
    pub fn first(&self) -> Option<Body> {
        self.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = Body> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.record
                .is_some()
                .then(|| Body::from_raw_parts(index as u32, slot.generation))
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32) -> BodyRecord {
        BodyRecord {
            handle: RigidBodyHandle::from_raw_parts(id, 0),
            collider: ColliderHandle::from_raw_parts(id, 0),
            category: Category::from_index(0),
        }
    }

    #[test]
    fn released_handles_go_stale() {
        let mut pool = BodyPool::with_capacity(2);
        let a = pool.acquire(record(1));
        assert_eq!(pool.release(a), Some(record(1)));
        assert_eq!(pool.release(a), None);

        // Slot reused under a new generation.
        let b = pool.acquire(record(2));
        assert_eq!(a.into_raw_parts().0, b.into_raw_parts().0);
        assert_ne!(a, b);
        assert!(pool.get(a).is_none());
        assert_eq!(pool.get(b), Some(&record(2)));
    }

    #[test]
    fn resolve_maps_engine_handles_back() {
        let mut pool = BodyPool::with_capacity(2);
        let a = pool.acquire(record(1));
        let b = pool.acquire(record(2));

        let (body, rec) = pool.resolve(record(2).handle).unwrap();
        assert_eq!(body, b);
        assert_eq!(rec.collider, record(2).collider);

        pool.release(a);
        assert!(pool.resolve(record(1).handle).is_none());
        assert_eq!(pool.iter().collect::<Vec<_>>(), vec![b]);
        assert_eq!(pool.first(), Some(b));
        assert_eq!(pool.len(), 1);
    }
}
