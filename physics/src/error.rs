use thiserror::Error;

use crate::body::Body;
use crate::category::{CategoryBits, CategorySet};

/// Caller mistakes rejected at the call site.
///
/// These all indicate a misconfigured simulation. Internal invariant breaks are asserted
/// instead of being reported here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    /// A body category must have exactly one bit set.
    #[error("category bits {0:#06x} must have exactly one bit set")]
    InvalidCategory(CategoryBits),

    /// Handler registrations need at least one category on each side.
    #[error("collision handler registered with an empty category set")]
    EmptyCategorySet,

    /// The engine would never report a contact for this pair.
    #[error(
        "attempting to add handler for categories that don't collide ({first} and {second}); \
         did you forget to call register_collidable?"
    )]
    NotCollidable {
        first: CategorySet,
        second: CategorySet,
    },

    /// The handle refers to a body that was destroyed (or never belonged to this world).
    #[error("unknown body {0}")]
    UnknownBody(Body),
}
