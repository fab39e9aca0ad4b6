use std::sync::{Mutex, PoisonError};

use rapier2d::prelude::*;

use crate::body::BodyRef;
use crate::body::pool::BodyPool;
use crate::collision::filter::CollisionFilter;
use crate::collision::pass_thru::{ContactKey, PassThroughCache};
use crate::collision::registry::HandlerRegistry;
use crate::collision::skip::SkipSet;

/// Contact transition reported by the engine during a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContactEvent {
    Began(ColliderHandle, ColliderHandle),
    Ended(ColliderHandle, ColliderHandle),
}

/// Collects contact transitions during a step, for processing once the step is done.
///
/// The engine may call from several threads, hence the lock; the buffer itself is owned by
/// the world and reused across steps.
pub struct ContactEventBuffer<'a> {
    events: Mutex<&'a mut Vec<ContactEvent>>,
}

impl<'a> ContactEventBuffer<'a> {
    pub fn new(events: &'a mut Vec<ContactEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }
}

impl EventHandler for ContactEventBuffer<'_> {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let event = match event {
            CollisionEvent::Started(h1, h2, _) => ContactEvent::Began(h1, h2),
            CollisionEvent::Stopped(h1, h2, _) => ContactEvent::Ended(h1, h2),
        };
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Physics hooks that apply category filtering and pass-through decisions.
///
/// Filtering: a pair is considered only when each collider's mask contains the other's
/// category (see [`CollisionFilter`]).
///
/// Pass-through: right before a contact is solved for the first time, the first registered
/// handler matching both categories decides whether the bodies pass through each other.
/// The decision is cached and reused for the rest of the contact. Contacts involving a body
/// with collisions disabled are never solved.
pub struct ContactFilter<'a> {
    handlers: &'a HandlerRegistry,
    skipped: &'a SkipSet,
    bodies: &'a BodyPool,
    pass_thru: Mutex<&'a mut PassThroughCache>,
}

impl<'a> ContactFilter<'a> {
    pub fn new(
        handlers: &'a HandlerRegistry,
        skipped: &'a SkipSet,
        bodies: &'a BodyPool,
        pass_thru: &'a mut PassThroughCache,
    ) -> Self {
        Self {
            handlers,
            skipped,
            bodies,
            pass_thru: Mutex::new(pass_thru),
        }
    }

    /// Ask the first matching handler, with bodies in registration order. No handler means
    /// the bodies collide.
    fn decide(
        &self,
        rigid_bodies: &RigidBodySet,
        handle1: RigidBodyHandle,
        handle2: RigidBodyHandle,
    ) -> bool {
        let (Some((body1, record1)), Some((body2, record2))) =
            (self.bodies.resolve(handle1), self.bodies.resolve(handle2))
        else {
            return false;
        };
        let (Some(rb1), Some(rb2)) = (rigid_bodies.get(handle1), rigid_bodies.get(handle2)) else {
            return false;
        };
        let Some(entry) = self
            .handlers
            .find_match(record1.category, record2.category)
        else {
            return false;
        };

        let a = BodyRef::new(body1, record1.category, rb1);
        let b = BodyRef::new(body2, record2.category, rb2);
        if entry.is_first_category(record1.category, record2.category) {
            entry.handler().allow_pass_thru(a, b)
        } else {
            entry.handler().allow_pass_thru(b, a)
        }
    }
}

impl PhysicsHooks for ContactFilter<'_> {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        let filter1 = CollisionFilter::unpack(context.colliders.get(context.collider1)?.user_data)?;
        let filter2 = CollisionFilter::unpack(context.colliders.get(context.collider2)?.user_data)?;
        filter1
            .should_collide(&filter2)
            .then_some(SolverFlags::COMPUTE_IMPULSES)
    }

    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        if context.solver_contacts.is_empty() {
            return;
        }
        let (Some(handle1), Some(handle2)) = (context.rigid_body1, context.rigid_body2) else {
            return;
        };

        let skipped = match (self.bodies.resolve(handle1), self.bodies.resolve(handle2)) {
            (Some((body1, _)), Some((body2, _))) => self.skipped.involves(body1, body2),
            _ => false,
        };
        if skipped {
            context.solver_contacts.clear();
            return;
        }

        let key = ContactKey::new(context.collider1, context.collider2);
        let cached = self
            .pass_thru
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup(key);

        let pass_thru = match cached {
            Some(pass_thru) => pass_thru,
            None => {
                // Lock released: handlers run user code.
                let pass_thru = self.decide(context.bodies, handle1, handle2);
                self.pass_thru
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record(key, pass_thru);
                pass_thru
            }
        };

        if pass_thru {
            context.solver_contacts.clear();
        }
    }
}
