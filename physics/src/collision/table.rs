use crate::category::{Category, CategorySet};
use crate::settings::MAX_CATEGORIES;

/// Which categories each category is allowed to physically collide with.
///
/// Symmetric by construction: registering `(a, b)` lets every category of `a` collide with
/// every category of `b` and vice versa. Built once before the world exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollidabilityTable {
    collides_with: [CategorySet; MAX_CATEGORIES],
}

impl CollidabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates; never clears a previous registration.
    pub fn register_collidable(
        &mut self,
        categories_a: impl Into<CategorySet>,
        categories_b: impl Into<CategorySet>,
    ) {
        let a = categories_a.into();
        let b = categories_b.into();
        for category in a.iter() {
            self.collides_with[category.index()] |= b;
        }
        for category in b.iter() {
            self.collides_with[category.index()] |= a;
        }
    }

    /// Mask handed to the engine for bodies of `category`.
    pub fn collides_with(&self, category: Category) -> CategorySet {
        let index = category.index();
        assert!(index < MAX_CATEGORIES, "requesting mask for invalid category");
        self.collides_with[index]
    }

    /// Engine-level filter for two single-category bodies.
    #[inline]
    pub fn can_collide(&self, a: Category, b: Category) -> bool {
        self.collides_with(a).contains(b)
    }

    /// True if every category on each side may collide with the other side.
    pub fn permits(&self, a: CategorySet, b: CategorySet) -> bool {
        a.iter().all(|c| self.collides_with(c).intersects(b))
            && b.iter().all(|c| self.collides_with(c).intersects(a))
    }
}
