pub mod body;
pub mod category;
pub mod collision;
pub mod error;
pub mod rapier_world;
pub mod settings;
pub mod timestep;
pub mod world;

pub use body::{Body, BodyMut, BodyRef, BodyShape, BodyType, Vec2};
pub use category::{Category, CategoryBits, CategorySet};
pub use collision::{CollisionHandler, DefaultHandler};
pub use error::PhysicsError;
pub use rapier_world::rapier2d;
pub use world::{World, WorldBuilder};
