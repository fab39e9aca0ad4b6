use crate::category::{Category, CategoryBits, CategorySet};

/// Collision filter carried by every collider in its `user_data`.
///
/// The contact filter hook only sees colliders, not bodies, so a body's category and the
/// set of categories it collides with travel with the collider as a packed `u128`.
///
/// # Bit layout
/// Least-significant bit = bit 0:
///
/// - bits 0..=15   : category bits (exactly one bit set)
/// - bits 16..=31  : collision mask (categories this body collides with)
/// - bits 32..=127 : reserved (must be zero)
///
/// # Invariants
/// - A contact is solved only when each side's mask contains the other side's category.
/// - Reserved bits stay zero; [`CollisionFilter::unpack`] rejects anything else.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: Category,
    pub mask: CategorySet,
}

impl CollisionFilter {
    const FIELD_BITS: u32 = CategoryBits::BITS;
    const FIELD_MASK: u128 = CategoryBits::MAX as u128;

    pub fn new(category: Category, mask: CategorySet) -> Self {
        Self { category, mask }
    }

    /// Pack into collider `user_data`.
    #[inline]
    pub fn pack(self) -> u128 {
        (self.category.bits() as u128) | ((self.mask.bits() as u128) << Self::FIELD_BITS)
    }

    /// Returns `None` for values not produced by [`Self::pack`]: no category bit, several
    /// category bits, or reserved bits set.
    pub fn unpack(packed: u128) -> Option<Self> {
        if packed >> (2 * Self::FIELD_BITS) != 0 {
            return None;
        }
        let category = Category::from_bits((packed & Self::FIELD_MASK) as CategoryBits).ok()?;
        let mask =
            CategorySet::from_bits(((packed >> Self::FIELD_BITS) & Self::FIELD_MASK) as CategoryBits);
        Some(Self { category, mask })
    }

    /// Symmetric check: both masks must accept the other category.
    #[inline]
    pub fn should_collide(&self, other: &Self) -> bool {
        self.mask.contains(other.category) && other.mask.contains(self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BALL: Category = Category::from_index(0);
    const WALL: Category = Category::from_index(1);
    const GHOST: Category = Category::from_index(15);

    #[test]
    fn pack_then_unpack_preserves_fields() {
        let filter = CollisionFilter::new(GHOST, BALL | WALL);
        let packed = filter.pack();
        assert_eq!(packed, (1 << 15) | (0b11 << 16));
        assert_eq!(CollisionFilter::unpack(packed), Some(filter));
    }

    #[test]
    fn unpack_rejects_foreign_user_data() {
        // No category.
        assert_eq!(CollisionFilter::unpack(0), None);
        // Two categories.
        assert_eq!(CollisionFilter::unpack(0b11), None);
        // Reserved bits.
        assert_eq!(CollisionFilter::unpack(1 | (1 << 40)), None);
    }

    #[test]
    fn both_masks_must_agree() {
        let ball = CollisionFilter::new(BALL, WALL.as_set());
        let wall = CollisionFilter::new(WALL, BALL.as_set());
        let deaf_wall = CollisionFilter::new(WALL, CategorySet::EMPTY);

        assert!(ball.should_collide(&wall));
        assert!(wall.should_collide(&ball));
        assert!(!ball.should_collide(&deaf_wall));
        assert!(!deaf_wall.should_collide(&ball));
    }
}
