//! Rapier-based dynamics world for category-filtered bodies.
//!
//! This module owns every Rapier set and pipeline the simulation needs and exposes the few
//! operations the [`World`](crate::World) builds on: insert/remove a body, step with hooks
//! and an event sink, clear forces, and query contacts.
//!
//! Design goals
//! - One body, one collider: every body is inserted with exactly one attached collider whose
//!   `user_data` carries its packed [`CollisionFilter`].
//! - Box2D-like defaults: a dynamic body weighs [`DEFAULT_BODY_MASS`] regardless of shape,
//!   and colliders are frictionless.
//! - Forces are per-step: the caller clears them after each step with [`RapierWorld::clear_forces`].

// Re-export Rapier so downstream crates can name Rapier types without depending on
// `rapier2d` directly.
pub use rapier2d;

use rapier2d::prelude::*;

use crate::body::{BodyShape, BodyType, Vec2};
use crate::collision::filter::CollisionFilter;
use crate::collision::pass_thru::ContactKey;
use crate::settings::{DEFAULT_BODY_MASS, DEFAULT_FRICTION};

/// Canonical definition of a body to insert.
///
/// Conventions
/// - Units are meters.
/// - `position` is the world-space translation of the body origin, which is also the
///   shape's center.
#[derive(Clone, Debug)]
pub struct BodyDef {
    pub filter: CollisionFilter,
    pub shape: BodyShape,
    pub body_type: BodyType,
    pub position: Vec2,
}

/// In-memory Rapier structures for a simulated 2D world.
pub struct RapierWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    islands: IslandManager,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    gravity: Vector<Real>,
}

impl RapierWorld {
    /// Empty world stepping by `dt` seconds.
    pub fn new(gravity: Vec2, dt: Real) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;

        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            islands: IslandManager::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            gravity,
        }
    }

    /// Insert a rigid-body with its single collider.
    pub fn insert_body(&mut self, def: &BodyDef) -> (RigidBodyHandle, ColliderHandle) {
        let rb = RigidBodyBuilder::new(def.body_type.into())
            .pose(Isometry::translation(def.position.x, def.position.y))
            .build();
        let rb_handle = self.bodies.insert(rb);

        let collider = collider_from_def(def);
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, rb_handle, &mut self.bodies);

        // Mass properties are otherwise only refreshed during the next step.
        if let Some(rb) = self.bodies.get_mut(rb_handle) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }

        (rb_handle, collider_handle)
    }

    /// Remove a rigid-body and its collider. Contacts it was part of are reported as
    /// stopped during the next step.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Advance the simulation by one fixed step.
    pub fn step(&mut self, hooks: &dyn PhysicsHooks, events: &dyn EventHandler) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            hooks,
            events,
        );
    }

    /// Reset the accumulated user forces on the given bodies, draining the list.
    pub fn clear_forces(&mut self, forced: &mut Vec<RigidBodyHandle>) {
        for handle in forced.drain(..) {
            if let Some(rb) = self.bodies.get_mut(handle) {
                rb.reset_forces(false);
            }
        }
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Parent rigid-body of a collider.
    #[inline]
    pub fn collider_parent(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.colliders.get(collider)?.parent()
    }

    /// Append every collider pair involving `collider` that currently has solver contacts.
    pub fn touching_pairs(
        &self,
        collider: ColliderHandle,
        out: &mut Vec<(ColliderHandle, ColliderHandle)>,
    ) {
        out.extend(
            self.narrow_phase
                .contact_pairs_with(collider)
                .filter(|pair| pair.has_any_active_contact)
                .map(|pair| (pair.collider1, pair.collider2)),
        );
    }

    /// True if the engine skips contact computation for this pair: neither side is an
    /// awake dynamic body.
    pub fn is_frozen(&self, key: ContactKey) -> bool {
        let (a, b) = key.colliders();
        [a, b].into_iter().all(|collider| {
            self.collider_parent(collider)
                .and_then(|handle| self.bodies.get(handle))
                .is_some_and(|rb| !rb.is_dynamic() || rb.is_sleeping())
        })
    }
}

/// Build a Rapier collider from a `BodyDef`.
///
/// The collider is attached with identity local transform; the pose lives on the rigid-body.
fn collider_from_def(def: &BodyDef) -> Collider {
    let builder = match def.shape {
        BodyShape::Circle { radius } => ColliderBuilder::ball(radius),

        BodyShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y)
        }
    };

    builder
        .mass(DEFAULT_BODY_MASS)
        .friction(DEFAULT_FRICTION)
        .user_data(def.filter.pack())
        .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::MODIFY_SOLVER_CONTACTS)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, CategorySet};
    use approx::assert_relative_eq;

    const DT: Real = 1.0 / 60.0;

    fn def(shape: BodyShape, body_type: BodyType, position: Vec2) -> BodyDef {
        BodyDef {
            filter: CollisionFilter::new(Category::from_index(0), CategorySet::ALL),
            shape,
            body_type,
            position,
        }
    }

    #[test]
    fn inserted_bodies_weigh_default_mass() {
        let mut world = RapierWorld::new(Vec2::zeros(), DT);
        let (rb, collider) = world.insert_body(&def(
            BodyShape::Cuboid {
                half_extents: Vec2::new(3.0, 4.0),
            },
            BodyType::Dynamic,
            Vec2::new(1.0, 2.0),
        ));

        let body = &world.bodies[rb];
        assert_relative_eq!(body.mass(), DEFAULT_BODY_MASS);
        assert_eq!(body.center_of_mass().coords, Vec2::new(1.0, 2.0));
        assert_eq!(world.collider_parent(collider), Some(rb));
        assert_eq!(
            CollisionFilter::unpack(world.colliders[collider].user_data),
            Some(def(BodyShape::Circle { radius: 1.0 }, BodyType::Static, Vec2::zeros()).filter)
        );
    }

    #[test]
    fn removal_detaches_collider() {
        let mut world = RapierWorld::new(Vec2::zeros(), DT);
        let (rb, collider) = world.insert_body(&def(
            BodyShape::Circle { radius: 1.0 },
            BodyType::Static,
            Vec2::zeros(),
        ));

        assert!(world.remove_body(rb));
        assert!(!world.remove_body(rb));
        assert_eq!(world.body_count(), 0);
        assert!(world.collider_parent(collider).is_none());
    }

    #[test]
    fn static_pairs_are_frozen() {
        let mut world = RapierWorld::new(Vec2::zeros(), DT);
        let circle = BodyShape::Circle { radius: 1.0 };
        let (_, a) = world.insert_body(&def(circle, BodyType::Static, Vec2::zeros()));
        let (_, b) = world.insert_body(&def(circle, BodyType::Static, Vec2::zeros()));
        let (_, c) = world.insert_body(&def(circle, BodyType::Dynamic, Vec2::zeros()));

        assert!(world.is_frozen(ContactKey::new(a, b)));
        assert!(!world.is_frozen(ContactKey::new(a, c)));
    }
}
