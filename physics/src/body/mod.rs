//! Body handles and the views used to read and drive them.
//!
//! A [`Body`] is a small `Copy` handle into the world's body pool. It stays valid until the
//! body is destroyed; after that every lookup through it returns `None` (or
//! [`PhysicsError::UnknownBody`](crate::PhysicsError::UnknownBody)), even if the pool slot
//! is reused.

pub mod pool;

use std::fmt;

use nalgebra as na;
use rapier2d::prelude::{RigidBody, RigidBodyHandle, RigidBodyType};

use crate::category::Category;

/// 2D vector in world units (meters).
pub type Vec2 = na::Vector2<f32>;

/// Generational handle to a body owned by a [`World`](crate::World).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Body {
    index: u32,
    generation: u32,
}

impl Body {
    #[inline]
    pub(crate) const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// `(slot index, generation)`.
    #[inline]
    pub const fn into_raw_parts(self) -> (u32, u32) {
        (self.index, self.generation)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// How the engine moves a body.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BodyType {
    /// Moved by forces, impulses, gravity and contacts.
    #[default]
    Dynamic,
    /// Never moves.
    Static,
    /// Moves at the velocity it is given, ignoring forces and contacts.
    Kinematic,
}

impl From<BodyType> for RigidBodyType {
    fn from(value: BodyType) -> Self {
        match value {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Static => RigidBodyType::Fixed,
            BodyType::Kinematic => RigidBodyType::KinematicVelocityBased,
        }
    }
}

/// Supported body shapes. Every body has exactly one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyShape {
    /// Circle (meters).
    Circle { radius: f32 },

    /// Axis-aligned box with given half-extents (meters).
    Cuboid { half_extents: Vec2 },
}

/// Read-only view of a body.
#[derive(Clone, Copy)]
pub struct BodyRef<'a> {
    body: Body,
    category: Category,
    rigid_body: &'a RigidBody,
}

impl<'a> BodyRef<'a> {
    pub(crate) fn new(body: Body, category: Category, rigid_body: &'a RigidBody) -> Self {
        Self {
            body,
            category,
            rigid_body,
        }
    }

    #[inline]
    pub fn handle(&self) -> Body {
        self.body
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    /// World-space center of mass.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.rigid_body.center_of_mass().coords
    }

    #[inline]
    pub fn linear_velocity(&self) -> Vec2 {
        *self.rigid_body.linvel()
    }

    /// Damping which reduces the linear velocity each step. 0 means no damping.
    #[inline]
    pub fn linear_damping(&self) -> f32 {
        self.rigid_body.linear_damping()
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.rigid_body.mass()
    }

    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.rigid_body.is_sleeping()
    }
}

impl fmt::Display for BodyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = self.position();
        let vel = self.linear_velocity();
        write!(
            f,
            "Body {{ pos: ({}, {}), vel: ({}, {}) }}",
            pos.x, pos.y, vel.x, vel.y
        )
    }
}

impl fmt::Debug for BodyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyRef")
            .field("body", &self.body)
            .field("category", &self.category)
            .field("position", &self.position())
            .field("linear_velocity", &self.linear_velocity())
            .finish()
    }
}

/// Mutable view of a body.
///
/// Forces last for the next fixed step only, then the world clears them; apply a force
/// before every `update` to keep pushing.
pub struct BodyMut<'a> {
    body: Body,
    category: Category,
    handle: RigidBodyHandle,
    rigid_body: &'a mut RigidBody,
    forced: &'a mut Vec<RigidBodyHandle>,
}

impl<'a> BodyMut<'a> {
    pub(crate) fn new(
        body: Body,
        category: Category,
        handle: RigidBodyHandle,
        rigid_body: &'a mut RigidBody,
        forced: &'a mut Vec<RigidBodyHandle>,
    ) -> Self {
        Self {
            body,
            category,
            handle,
            rigid_body,
            forced,
        }
    }

    #[inline]
    pub fn as_ref(&self) -> BodyRef<'_> {
        BodyRef::new(self.body, self.category, self.rigid_body)
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec2) {
        self.rigid_body.set_linvel(velocity, true);
    }

    pub fn set_linear_damping(&mut self, damping: f32) {
        self.rigid_body.set_linear_damping(damping);
    }

    /// Push on the center of mass during the next fixed step.
    pub fn apply_force(&mut self, force: Vec2) {
        self.rigid_body.add_force(force, true);
        if !self.forced.contains(&self.handle) {
            self.forced.push(self.handle);
        }
    }

    /// Instantly change the momentum, at the center of mass.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.rigid_body.apply_impulse(impulse, true);
    }
}
