/*!
World defaults and pool sizing hints.

These constants centralize the values the [`WorldBuilder`](crate::WorldBuilder) falls back
to, and the capacities reserved up front so that stepping does not allocate once warm.

Notes
- Distances are in meters, time in seconds, mass in kilograms.
- Capacities are hints: pools grow past them, they just stop being allocation-free.
*/

/// Number of distinct collision categories. Filter masks are 16 bits wide.
pub const MAX_CATEGORIES: usize = 16;

/// Expected number of live bodies when the caller does not say otherwise.
pub const DEFAULT_BODY_COUNT: usize = 1000;

/// Fixed simulation rate when the caller does not say otherwise.
pub const DEFAULT_STEPS_PER_SEC: u32 = 60;

/// Capacity reserved for the handler registry.
pub const EXPECTED_COLLISION_HANDLER_COUNT: usize = 30;

/// Capacity reserved for the set of bodies with collisions disabled.
pub const EXPECTED_SKIPPED_BODY_COUNT: usize = 5;

/// One active collision record is reserved per this many expected bodies.
pub const BODIES_PER_ACTIVE_COLLISION: usize = 10;

/// Capacity reserved for cached pass-through decisions.
pub const EXPECTED_CONTACT_COUNT: usize = 30;

/// Mass given to every body's collider, so forces map directly to accelerations.
pub const DEFAULT_BODY_MASS: f32 = 1.0;

/// Colliders are frictionless; contacts only push along the normal.
pub const DEFAULT_FRICTION: f32 = 0.0;

/// Capacity for active collisions given an expected body count.
#[inline]
pub const fn active_collision_capacity(expected_body_count: usize) -> usize {
    let capacity = expected_body_count / BODIES_PER_ACTIVE_COLLISION;
    if capacity == 0 { 1 } else { capacity }
}
