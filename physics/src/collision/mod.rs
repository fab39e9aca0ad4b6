/*!
Collision root module.

Everything that sits between Rapier's contact pipeline and user collision handlers. The code
is split for clarity:

- table:     which categories may physically touch
- filter:    per-collider category/mask packed into Rapier `user_data`
- handler:   the `CollisionHandler` trait
- registry:  ordered handler registrations and matching
- active:    touching pairs awaiting collided/overlapping dispatch
- pass_thru: per-contact pass-through decisions
- skip:      bodies with collisions switched off
- hooks:     Rapier `PhysicsHooks`/`EventHandler` adapters over the above
*/

pub mod active;
pub mod filter;
pub mod handler;
pub mod hooks;
pub mod pass_thru;
pub mod registry;
pub mod skip;
pub mod table;

// Re-export commonly used types.
pub use filter::CollisionFilter;
pub use handler::{CollisionHandler, DefaultHandler};
pub use table::CollidabilityTable;
