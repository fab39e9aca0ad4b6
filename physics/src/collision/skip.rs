use std::collections::HashSet;

use crate::body::Body;

/// Bodies whose collisions are switched off: their contacts are never solved and never
/// reach a handler.
#[derive(Debug)]
pub struct SkipSet {
    bodies: HashSet<Body>,
}

impl SkipSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bodies: HashSet::with_capacity(capacity),
        }
    }

    /// Returns `true` if the body was not already skipped.
    #[inline]
    pub fn insert(&mut self, body: Body) -> bool {
        self.bodies.insert(body)
    }

    /// Returns `true` if the body was skipped.
    #[inline]
    pub fn remove(&mut self, body: Body) -> bool {
        self.bodies.remove(&body)
    }

    #[inline]
    pub fn contains(&self, body: Body) -> bool {
        self.bodies.contains(&body)
    }

    #[inline]
    pub fn involves(&self, a: Body, b: Body) -> bool {
        self.contains(a) || self.contains(b)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
