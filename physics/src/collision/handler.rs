use crate::body::{Body, BodyRef};
use crate::world::World;

/// Reacts to contacts between bodies of the categories it was registered for.
///
/// Register with [`World::add_collision_handler`]. Bodies are always passed in the order the
/// categories were registered: for a handler registered as `(BALL, PLATFORM)`, `first` is
/// the ball and `second` the platform, whichever the engine reported first.
///
/// Several handlers may match one contact. They are all notified, in registration order,
/// but only the first one decides whether the contact is solid.
///
/// # Re-entrancy
/// The `on_*` callbacks get the world mutably and may call back into it (disable collisions,
/// destroy bodies, register more handlers). Handlers are shared between the world and the
/// engine's solver hooks, hence `&self` and the `Send + Sync` bound: keep mutable state in
/// atomics or a mutex.
pub trait CollisionHandler: Send + Sync {
    /// Decide once per contact whether the two bodies pass through each other.
    ///
    /// Called the first time the engine is about to resolve the contact. The answer holds
    /// until the bodies stop touching.
    fn allow_pass_thru(&self, first: BodyRef<'_>, second: BodyRef<'_>) -> bool {
        let _ = (first, second);
        true
    }

    /// First step the bodies touch.
    fn on_collided(&self, world: &mut World, first: Body, second: Body) {
        let _ = (world, first, second);
    }

    /// Every later step the bodies are still touching.
    fn on_overlapping(&self, world: &mut World, first: Body, second: Body) {
        let _ = (world, first, second);
    }

    /// The bodies stopped touching, one of them had collisions disabled, or was destroyed.
    fn on_separated(&self, world: &mut World, first: Body, second: Body) {
        let _ = (world, first, second);
    }
}

/// A handler with every default: contacts pass through, callbacks do nothing.
///
/// Useful to turn a category pair into sensors without reacting to them.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHandler;

impl CollisionHandler for DefaultHandler {}
