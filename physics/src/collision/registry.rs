use std::sync::Arc;

use crate::category::{Category, CategorySet};
use crate::collision::handler::CollisionHandler;
use crate::collision::table::CollidabilityTable;
use crate::error::PhysicsError;
use crate::settings::EXPECTED_COLLISION_HANDLER_COUNT;

/// A registered handler and the two category sets it was registered for, in order.
#[derive(Clone)]
pub struct HandlerEntry {
    categories_first: CategorySet,
    categories_second: CategorySet,
    handler: Arc<dyn CollisionHandler>,
}

impl HandlerEntry {
    #[inline]
    pub fn handler(&self) -> &Arc<dyn CollisionHandler> {
        &self.handler
    }

    /// True if a contact between categories `a` and `b` concerns this entry, in either order.
    #[inline]
    pub fn matches(&self, a: Category, b: Category) -> bool {
        self.matches_in_order(a, b) || self.matches_in_order(b, a)
    }

    /// True if `a` belongs on this entry's first side, i.e. bodies should be passed as
    /// `(a, b)` rather than `(b, a)`.
    ///
    /// For single-category registrations this is `a == categories_first`.
    #[inline]
    pub fn is_first_category(&self, a: Category, b: Category) -> bool {
        self.matches_in_order(a, b)
    }

    #[inline]
    fn matches_in_order(&self, a: Category, b: Category) -> bool {
        self.categories_first.contains(a) && self.categories_second.contains(b)
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("categories_first", &self.categories_first)
            .field("categories_second", &self.categories_second)
            .finish_non_exhaustive()
    }
}

/// Append-only, ordered list of collision handlers.
pub struct HandlerRegistry {
    entries: Vec<HandlerEntry>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self {
            entries: Vec::with_capacity(EXPECTED_COLLISION_HANDLER_COUNT),
        }
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for contacts between `categories_a` and `categories_b`.
    ///
    /// Rejected if either side is empty or if the pair was never declared collidable: the
    /// engine would never report such a contact, so the handler could never run.
    pub fn add(
        &mut self,
        table: &CollidabilityTable,
        categories_a: CategorySet,
        categories_b: CategorySet,
        handler: Arc<dyn CollisionHandler>,
    ) -> Result<(), PhysicsError> {
        if categories_a.is_empty() || categories_b.is_empty() {
            return Err(PhysicsError::EmptyCategorySet);
        }
        if !table.permits(categories_a, categories_b) {
            return Err(PhysicsError::NotCollidable {
                first: categories_a,
                second: categories_b,
            });
        }

        self.entries.push(HandlerEntry {
            categories_first: categories_a,
            categories_second: categories_b,
            handler,
        });
        Ok(())
    }

    /// First matching entry in registration order.
    pub fn find_match(&self, a: Category, b: Category) -> Option<&HandlerEntry> {
        self.entries.iter().find(|entry| entry.matches(a, b))
    }

    #[inline]
    pub fn has_match(&self, a: Category, b: Category) -> bool {
        self.find_match(a, b).is_some()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&HandlerEntry> {
        self.entries.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::handler::DefaultHandler;

    const BALL: Category = Category::from_index(0);
    const SENSOR_1: Category = Category::from_index(1);
    const SENSOR_5: Category = Category::from_index(2);
    const PLATFORM: Category = Category::from_index(3);

    fn table() -> CollidabilityTable {
        let mut table = CollidabilityTable::new();
        table.register_collidable(BALL, SENSOR_1 | SENSOR_5 | PLATFORM);
        table
    }

    fn add(registry: &mut HandlerRegistry, a: impl Into<CategorySet>, b: impl Into<CategorySet>) {
        registry
            .add(&table(), a.into(), b.into(), Arc::new(DefaultHandler))
            .expect("collidable pair");
    }

    #[test]
    fn rejects_pairs_that_never_collide() {
        let mut registry = HandlerRegistry::new();
        let err = registry
            .add(
                &table(),
                SENSOR_1.as_set(),
                SENSOR_5.as_set(),
                Arc::new(DefaultHandler),
            )
            .unwrap_err();

        assert_eq!(
            err,
            PhysicsError::NotCollidable {
                first: SENSOR_1.as_set(),
                second: SENSOR_5.as_set(),
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_empty_sets() {
        let mut registry = HandlerRegistry::new();
        let err = registry
            .add(
                &table(),
                CategorySet::EMPTY,
                BALL.as_set(),
                Arc::new(DefaultHandler),
            )
            .unwrap_err();
        assert_eq!(err, PhysicsError::EmptyCategorySet);
    }

    #[test]
    fn find_match_returns_first_registered_in_either_order() {
        let mut registry = HandlerRegistry::new();
        add(&mut registry, BALL, SENSOR_1);
        add(&mut registry, BALL, SENSOR_1 | SENSOR_5);

        // Only the second entry covers SENSOR_5.
        let entry = registry.find_match(SENSOR_5, BALL).expect("second entry");
        assert!(entry.is_first_category(BALL, SENSOR_5));

        // Both cover SENSOR_1; the first registered wins.
        let entry = registry.find_match(SENSOR_1, BALL).expect("first entry");
        assert!(!entry.is_first_category(BALL, SENSOR_5));
        assert!(entry.is_first_category(BALL, SENSOR_1));

        assert!(registry.find_match(BALL, PLATFORM).is_none());
    }

    #[test]
    fn is_first_category_follows_registration_order() {
        let mut registry = HandlerRegistry::new();
        add(&mut registry, PLATFORM, BALL);
        add(&mut registry, SENSOR_1 | SENSOR_5, BALL);

        let platform = registry.get(0).unwrap();
        assert!(platform.is_first_category(PLATFORM, BALL));
        assert!(!platform.is_first_category(BALL, PLATFORM));

        let sensors = registry.get(1).unwrap();
        assert!(sensors.is_first_category(SENSOR_5, BALL));
        assert!(!sensors.is_first_category(BALL, SENSOR_1));
    }
}
