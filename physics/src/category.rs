use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::error::PhysicsError;
use crate::settings::MAX_CATEGORIES;

/// The primitive storage for category bitmasks.
///
/// Sixteen bits, matching the width of the collision filter the world is built around.
pub type CategoryBits = u16;

/// A single collision category: exactly one bit set.
///
/// A body always belongs to exactly one category. Use [`CategorySet`] when registering
/// collidability or handlers for several categories at once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Category(CategoryBits);

impl Category {
    /// Category at bit `index`.
    ///
    /// # Panics
    /// If `index` is not below [`MAX_CATEGORIES`].
    pub const fn from_index(index: u8) -> Self {
        assert!((index as usize) < MAX_CATEGORIES, "category index out of range");
        Self(1 << index)
    }

    /// Validate raw bits as a single category. Zero or multi-bit values are rejected.
    pub fn from_bits(bits: CategoryBits) -> Result<Self, PhysicsError> {
        if bits.count_ones() == 1 {
            Ok(Self(bits))
        } else {
            Err(PhysicsError::InvalidCategory(bits))
        }
    }

    #[inline]
    pub const fn bits(self) -> CategoryBits {
        self.0
    }

    /// Position of the single set bit.
    #[inline]
    pub const fn index(self) -> usize {
        self.0.trailing_zeros() as usize
    }

    #[inline]
    pub const fn as_set(self) -> CategorySet {
        CategorySet(self.0)
    }
}

impl TryFrom<CategorySet> for Category {
    type Error = PhysicsError;

    fn try_from(set: CategorySet) -> Result<Self, Self::Error> {
        Self::from_bits(set.bits())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

/// A union of categories.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CategorySet(CategoryBits);

impl CategorySet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(CategoryBits::MAX);

    #[inline]
    pub const fn from_bits(bits: CategoryBits) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> CategoryBits {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if the two sets share at least one category.
    #[inline]
    pub const fn intersects(self, other: CategorySet) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn contains(self, category: Category) -> bool {
        (self.0 & category.0) != 0
    }

    /// Iterate the individual categories in this set, lowest bit first.
    pub fn iter(self) -> impl Iterator<Item = Category> {
        (0..MAX_CATEGORIES as u8)
            .map(Category::from_index)
            .filter(move |c| self.contains(*c))
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl From<Category> for CategorySet {
    fn from(category: Category) -> Self {
        category.as_set()
    }
}

impl<T: Into<CategorySet>> BitOr<T> for CategorySet {
    type Output = CategorySet;

    fn bitor(self, rhs: T) -> Self::Output {
        CategorySet(self.0 | rhs.into().0)
    }
}

impl<T: Into<CategorySet>> BitOr<T> for Category {
    type Output = CategorySet;

    fn bitor(self, rhs: T) -> Self::Output {
        CategorySet(self.0 | rhs.into().0)
    }
}

impl<T: Into<CategorySet>> BitOrAssign<T> for CategorySet {
    fn bitor_assign(&mut self, rhs: T) {
        self.0 |= rhs.into().0;
    }
}

impl BitAnd for CategorySet {
    type Output = CategorySet;

    fn bitand(self, rhs: CategorySet) -> Self::Output {
        CategorySet(self.0 & rhs.0)
    }
}

/// Declare a category enum whose discriminants are bit indices.
///
/// Each variant converts into a [`Category`] and a [`CategorySet`], and variants combine
/// with `|` into a set.
///
/// Example:
/// ```rust
/// category_physics::define_categories!(Layer, {
///     Ball,
///     Platform,
///     Sensor,
/// });
///
/// let both = Layer::Ball | Layer::Platform;
/// assert_eq!(both.bits(), 0b011);
/// ```
#[macro_export]
macro_rules! define_categories {
    ($name:ident, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl ::core::convert::From<$name> for $crate::Category {
            fn from(value: $name) -> Self {
                $crate::Category::from_index(value as u8)
            }
        }

        impl ::core::convert::From<$name> for $crate::CategorySet {
            fn from(value: $name) -> Self {
                $crate::Category::from_index(value as u8).as_set()
            }
        }

        impl<T: ::core::convert::Into<$crate::CategorySet>> ::core::ops::BitOr<T> for $name {
            type Output = $crate::CategorySet;

            fn bitor(self, rhs: T) -> Self::Output {
                $crate::CategorySet::from(self) | rhs
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_categories!(Layer, { Ball, Sensor, Platform });

    #[test]
    fn from_bits_accepts_only_single_bits() {
        assert_eq!(Category::from_bits(0b100).map(Category::index), Ok(2));
        assert_eq!(
            Category::from_bits(0),
            Err(PhysicsError::InvalidCategory(0))
        );
        assert_eq!(
            Category::from_bits(0b111),
            Err(PhysicsError::InvalidCategory(0b111))
        );
    }

    #[test]
    #[should_panic(expected = "category index out of range")]
    fn from_index_panics_past_the_filter_width() {
        let _ = Category::from_index(MAX_CATEGORIES as u8);
    }

    #[test]
    fn macro_variants_map_to_bit_indices() {
        assert_eq!(Category::from(Layer::Ball).bits(), 0b001);
        assert_eq!(Category::from(Layer::Platform).bits(), 0b100);

        let set = Layer::Ball | Layer::Platform;
        assert!(set.contains(Layer::Ball.into()));
        assert!(!set.contains(Layer::Sensor.into()));
        assert_eq!(set.iter().map(Category::index).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn intersects_requires_a_shared_bit() {
        let a = CategorySet::from_bits(0b0110);
        assert!(a.intersects(CategorySet::from_bits(0b0010)));
        assert!(!a.intersects(CategorySet::from_bits(0b1001)));
        assert!(!CategorySet::EMPTY.intersects(CategorySet::ALL));
    }
}
