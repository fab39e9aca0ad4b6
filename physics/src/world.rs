/*!
Category-filtered physics world.

A [`World`] wraps a Rapier dynamics world and adds:

- Category filtering: each body belongs to exactly one [`Category`]; only category pairs
  declared collidable on the [`WorldBuilder`] ever touch.
- Collision handlers: objects registered for a pair of category sets, told when matching
  bodies start touching ([`CollisionHandler::on_collided`]), keep touching
  ([`CollisionHandler::on_overlapping`], once per fixed step) and stop touching
  ([`CollisionHandler::on_separated`]). They also decide, once per contact, whether the two
  bodies pass through each other ([`CollisionHandler::allow_pass_thru`]).
- Per-body collision switch: [`World::enable_collisions`].
- A fixed-timestep driver: [`World::update`] takes wall-clock time and runs whole steps.

Notes
- Callbacks get `&mut World` and may call back into it, including destroying the bodies they
  were called for. Handles held across such calls may therefore go stale; lookups return
  `None` or [`PhysicsError::UnknownBody`] rather than panicking.
- Handlers run for every matching registration, in registration order, always with bodies
  ordered the way the registration names their categories.
*/

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::body::pool::{BodyPool, BodyRecord};
use crate::body::{Body, BodyMut, BodyRef, BodyShape, BodyType, Vec2};
use crate::category::{Category, CategorySet};
use crate::collision::active::{ActiveCollisions, ContactSide};
use crate::collision::filter::CollisionFilter;
use crate::collision::handler::CollisionHandler;
use crate::collision::hooks::{ContactEvent, ContactEventBuffer, ContactFilter};
use crate::collision::pass_thru::{ContactKey, PassThroughCache};
use crate::collision::registry::HandlerRegistry;
use crate::collision::skip::SkipSet;
use crate::collision::table::CollidabilityTable;
use crate::error::PhysicsError;
use crate::rapier_world::{BodyDef, RapierWorld};
use crate::settings::{
    DEFAULT_BODY_COUNT, DEFAULT_STEPS_PER_SEC, EXPECTED_CONTACT_COUNT,
    EXPECTED_SKIPPED_BODY_COUNT, active_collision_capacity,
};
use crate::timestep::FixedTimestep;


/// Configures and builds a [`World`].
#[derive(Clone, Debug)]
pub struct WorldBuilder {
    gravity: Vec2,
    expected_body_count: usize,
    steps_per_sec: u32,
    collidable: CollidabilityTable,
}

impl Default for WorldBuilder {
    fn default() -> Self {
        Self {
            gravity: Vec2::zeros(),
            expected_body_count: DEFAULT_BODY_COUNT,
            steps_per_sec: DEFAULT_STEPS_PER_SEC,
            collidable: CollidabilityTable::new(),
        }
    }
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults to no gravity.
    pub fn gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Sizes the body pool and collision bookkeeping up front.
    pub fn expected_body_count(mut self, count: usize) -> Self {
        self.expected_body_count = count;
        self
    }

    /// # Panics
    /// If `steps_per_sec` is zero.
    pub fn steps_per_sec(mut self, steps_per_sec: u32) -> Self {
        assert!(steps_per_sec > 0, "steps per second must be positive");
        self.steps_per_sec = steps_per_sec;
        self
    }

    /// Let every category in `categories_a` collide with every category in `categories_b`.
    ///
    /// Symmetric and cumulative. Unregistered pairs never touch.
    pub fn register_collidable(
        mut self,
        categories_a: impl Into<CategorySet>,
        categories_b: impl Into<CategorySet>,
    ) -> Self {
        self.collidable
            .register_collidable(categories_a, categories_b);
        self
    }

    pub fn build(self) -> World {
        World::new(self)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CollisionPhase {
    Collided,
    Overlapping,
    Separated,
}

/// Physics world with category-based collision filtering and handler dispatch.
pub struct World {
    rapier: RapierWorld,
    collidable: CollidabilityTable,
    handlers: HandlerRegistry,
    bodies: BodyPool,
    active: ActiveCollisions,
    pass_thru: PassThroughCache,
    skipped: SkipSet,
    timestep: FixedTimestep,
    /// Contact transitions buffered during a step.
    events: Vec<ContactEvent>,
    /// Scratch for re-enabling collisions.
    touching: Vec<(ColliderHandle, ColliderHandle)>,
    /// Bodies with forces to clear after the next step.
    forced: Vec<RigidBodyHandle>,
}

impl World {
    pub fn builder() -> WorldBuilder {
        WorldBuilder::new()
    }

    fn new(builder: WorldBuilder) -> Self {
        let timestep = FixedTimestep::from_rate(builder.steps_per_sec);
        debug!(
            "creating world: gravity=({}, {}) step={:?} expected_bodies={}",
            builder.gravity.x,
            builder.gravity.y,
            timestep.step(),
            builder.expected_body_count
        );

        Self {
            rapier: RapierWorld::new(builder.gravity, timestep.step().as_secs_f32()),
            collidable: builder.collidable,
            handlers: HandlerRegistry::new(),
            bodies: BodyPool::with_capacity(builder.expected_body_count),
            active: ActiveCollisions::with_capacity(active_collision_capacity(
                builder.expected_body_count,
            )),
            pass_thru: PassThroughCache::with_capacity(EXPECTED_CONTACT_COUNT),
            skipped: SkipSet::with_capacity(EXPECTED_SKIPPED_BODY_COUNT),
            timestep,
            events: Vec::with_capacity(EXPECTED_CONTACT_COUNT),
            touching: Vec::new(),
            forced: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------------------------
    // Bodies
    // ---------------------------------------------------------------------------------------

    /// Create a body of a single `category`.
    ///
    /// `position` defaults to the origin.
    ///
    /// # Errors
    /// [`PhysicsError::InvalidCategory`] unless `category` has exactly one bit set.
    pub fn create_body(
        &mut self,
        category: impl Into<CategorySet>,
        shape: BodyShape,
        body_type: BodyType,
        position: Option<Vec2>,
    ) -> Result<Body, PhysicsError> {
        let category: CategorySet = category.into();
        let category = Category::try_from(category).inspect_err(|err| warn!("{err}"))?;
        let def = BodyDef {
            filter: CollisionFilter::new(category, self.collidable.collides_with(category)),
            shape,
            body_type,
            position: position.unwrap_or_else(Vec2::zeros),
        };

        let (handle, collider) = self.rapier.insert_body(&def);
        let body = self.bodies.acquire(BodyRecord {
            handle,
            collider,
            category,
        });
        debug!(
            "created {:?} body {body} in category {category}",
            def.body_type
        );
        Ok(body)
    }

    pub fn create_circle_body(
        &mut self,
        category: impl Into<CategorySet>,
        radius: f32,
        body_type: BodyType,
        position: Option<Vec2>,
    ) -> Result<Body, PhysicsError> {
        self.create_body(category, BodyShape::Circle { radius }, body_type, position)
    }

    /// `width` and `height` are full extents.
    pub fn create_box_body(
        &mut self,
        category: impl Into<CategorySet>,
        width: f32,
        height: f32,
        body_type: BodyType,
        position: Option<Vec2>,
    ) -> Result<Body, PhysicsError> {
        self.create_box_body_half_extents(
            category,
            Vec2::new(width / 2.0, height / 2.0),
            body_type,
            position,
        )
    }

    pub fn create_box_body_half_extents(
        &mut self,
        category: impl Into<CategorySet>,
        half_extents: Vec2,
        body_type: BodyType,
        position: Option<Vec2>,
    ) -> Result<Body, PhysicsError> {
        self.create_body(
            category,
            BodyShape::Cuboid { half_extents },
            body_type,
            position,
        )
    }

    /// Destroy a body.
    ///
    /// Unless its collisions were disabled (which already reported them), every collision
    /// the body is part of is reported as separated first. Those callbacks may destroy the
    /// body themselves.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] if the body was already destroyed.
    pub fn destroy_body(&mut self, body: Body) -> Result<(), PhysicsError> {
        if !self.bodies.contains(body) {
            warn!("destroy_body: unknown body {body}");
            return Err(PhysicsError::UnknownBody(body));
        }

        if !self.skipped.remove(body) {
            self.separate_all(body);
        }

        let Some(record) = self.bodies.release(body) else {
            trace!("body {body} destroyed by one of its separation handlers");
            return Ok(());
        };

        // Separation handlers may have disabled it again or re-created records.
        self.skipped.remove(body);
        while self.active.take_owned_by(body).is_some() {}
        self.pass_thru.forget_collider(record.collider);
        self.forced.retain(|handle| *handle != record.handle);
        self.rapier.remove_body(record.handle);

        debug!("destroyed body {body}");
        Ok(())
    }

    /// Read-only view of a live body.
    pub fn body(&self, body: Body) -> Option<BodyRef<'_>> {
        let record = self.bodies.get(body)?;
        let rigid_body = self.rapier.bodies.get(record.handle)?;
        Some(BodyRef::new(body, record.category, rigid_body))
    }

    /// Mutable view of a live body.
    pub fn body_mut(&mut self, body: Body) -> Option<BodyMut<'_>> {
        let record = *self.bodies.get(body)?;
        let rigid_body = self.rapier.bodies.get_mut(record.handle)?;
        Some(BodyMut::new(
            body,
            record.category,
            record.handle,
            rigid_body,
            &mut self.forced,
        ))
    }

    /// Live bodies, in pool order.
    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.bodies.iter()
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // ---------------------------------------------------------------------------------------
    // Collisions
    // ---------------------------------------------------------------------------------------

    /// Register `handler` for contacts between `categories_a` and `categories_b`.
    ///
    /// Handlers receive bodies in this order: the body from `categories_a` first.
    ///
    /// # Errors
    /// - [`PhysicsError::EmptyCategorySet`] if either set is empty.
    /// - [`PhysicsError::NotCollidable`] if the categories were never registered as
    ///   collidable on the builder.
    pub fn add_collision_handler<H: CollisionHandler + 'static>(
        &mut self,
        categories_a: impl Into<CategorySet>,
        categories_b: impl Into<CategorySet>,
        handler: H,
    ) -> Result<(), PhysicsError> {
        let (a, b) = (categories_a.into(), categories_b.into());
        self.handlers
            .add(&self.collidable, a, b, Arc::new(handler))
            .inspect_err(|err| warn!("{err}"))?;
        debug!("added collision handler for {a} and {b}");
        Ok(())
    }

    /// Switch collision evaluation for a body on or off.
    ///
    /// Turning it off reports every collision the body is part of as separated, right away,
    /// and lets it pass through everything. Turning it back on reports bodies it still
    /// touches as collided, right away. Repeating the current state does nothing.
    ///
    /// # Errors
    /// [`PhysicsError::UnknownBody`] if the body was destroyed.
    pub fn enable_collisions(&mut self, body: Body, enabled: bool) -> Result<(), PhysicsError> {
        let Some(&record) = self.bodies.get(body) else {
            warn!("enable_collisions: unknown body {body}");
            return Err(PhysicsError::UnknownBody(body));
        };

        if enabled {
            if self.skipped.remove(body) {
                debug!("enabled collisions for body {body}");
                self.collide_touching(record.collider);
            }
        } else if self.skipped.insert(body) {
            debug!("disabled collisions for body {body}");
            self.pass_thru.forget_collider(record.collider);
            self.separate_all(body);
        }
        Ok(())
    }

    #[inline]
    pub fn is_collision_enabled(&self, body: Body) -> bool {
        !self.skipped.contains(body)
    }

    /// Categories `category` was registered as collidable with.
    #[inline]
    pub fn collides_with(&self, category: Category) -> CategorySet {
        self.collidable.collides_with(category)
    }

    /// Number of touching pairs currently tracked for handler dispatch.
    #[inline]
    pub fn active_collision_count(&self) -> usize {
        self.active.len()
    }

    // ---------------------------------------------------------------------------------------
    // Stepping
    // ---------------------------------------------------------------------------------------

    /// Fixed step duration.
    #[inline]
    pub fn step_duration(&self) -> Duration {
        self.timestep.step()
    }

    /// Advance the simulation by as many fixed steps as fit in the banked time.
    pub fn update(&mut self, elapsed: Duration) {
        self.timestep.accumulate(elapsed);
        while self.timestep.consume_step() {
            self.step();
        }
    }

    /// Destroy every body, reporting separations as [`Self::destroy_body`] does.
    pub fn dispose(mut self) {
        while let Some(body) = self.bodies.first() {
            if self.destroy_body(body).is_err() {
                break;
            }
        }
        debug_assert_eq!(
            self.rapier.body_count(),
            0,
            "physics world wasn't disposed correctly"
        );
        debug!("disposed world");
    }

    fn step(&mut self) {
        {
            let hooks = ContactFilter::new(
                &self.handlers,
                &self.skipped,
                &self.bodies,
                &mut self.pass_thru,
            );
            let events = ContactEventBuffer::new(&mut self.events);
            self.rapier.step(&hooks, &events);
        }

        self.process_contact_events();

        let rapier = &self.rapier;
        self.pass_thru.end_step(|key| rapier.is_frozen(key));

        self.rapier.clear_forces(&mut self.forced);
        self.dispatch_round();
    }

    fn process_contact_events(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        for event in events.drain(..) {
            match event {
                ContactEvent::Began(a, b) => self.begin_contact(a, b),
                ContactEvent::Ended(a, b) => self.end_contact(a, b),
            }
        }
        self.events = events;
    }

    fn begin_contact(&mut self, a: ColliderHandle, b: ColliderHandle) {
        let (Some(first), Some(second)) = (self.contact_side(a), self.contact_side(b)) else {
            return;
        };
        if self.skipped.involves(first.body, second.body)
            || !self.handlers.has_match(first.category, second.category)
        {
            return;
        }
        if self.active.begin(first, second).is_some() {
            trace!("collision began: {} and {}", first.body, second.body);
        }
    }

    fn end_contact(&mut self, a: ColliderHandle, b: ColliderHandle) {
        self.pass_thru.invalidate(ContactKey::new(a, b));
        if let Some(record) = self.active.end(a, b) {
            trace!(
                "collision ended: {} and {}",
                record.first.body, record.second.body
            );
            self.run_handlers(record.first, record.second, CollisionPhase::Separated);
        }
    }

    /// One dispatch round over the records that exist when it starts.
    fn dispatch_round(&mut self) {
        let limit = self.active.round_limit();
        let mut cursor = None;

        while let Some(record) = self.active.next_after(cursor) {
            if record.seq() >= limit {
                break;
            }
            cursor = Some(record.seq());
            if self.skipped.involves(record.first.body, record.second.body) {
                continue;
            }

            let phase = if record.just_collided {
                CollisionPhase::Collided
            } else {
                CollisionPhase::Overlapping
            };
            self.active.mark_dispatched(record.seq());
            self.run_handlers(record.first, record.second, phase);
        }
    }

    /// Report every active collision of `body` as separated, removing the records.
    fn separate_all(&mut self, body: Body) {
        while let Some(record) = self.active.take_owned_by(body) {
            trace!(
                "collision ended: {} and {}",
                record.first.body, record.second.body
            );
            self.run_handlers(record.first, record.second, CollisionPhase::Separated);
        }
    }

    /// Track and report as collided every pair `collider` still touches.
    fn collide_touching(&mut self, collider: ColliderHandle) {
        let mut touching = std::mem::take(&mut self.touching);
        touching.clear();
        self.rapier.touching_pairs(collider, &mut touching);

        for &(a, b) in &touching {
            let (Some(first), Some(second)) = (self.contact_side(a), self.contact_side(b)) else {
                continue;
            };
            if self.skipped.involves(first.body, second.body)
                || !self.handlers.has_match(first.category, second.category)
            {
                continue;
            }
            let Some(seq) = self.active.begin(first, second) else {
                continue;
            };
            trace!("collision resumed: {} and {}", first.body, second.body);
            self.active.mark_dispatched(seq);
            self.run_handlers(first, second, CollisionPhase::Collided);
        }

        self.touching = touching;
    }

    /// Call every matching handler, in registration order.
    ///
    /// Handlers may mutate the world, including the registry: the count is fixed up front
    /// and each handler is cloned out before it runs.
    fn run_handlers(&mut self, a: ContactSide, b: ContactSide, phase: CollisionPhase) {
        let count = self.handlers.len();
        for index in 0..count {
            let Some(entry) = self.handlers.get(index) else {
                break;
            };
            if !entry.matches(a.category, b.category) {
                continue;
            }
            let (first, second) = if entry.is_first_category(a.category, b.category) {
                (a.body, b.body)
            } else {
                (b.body, a.body)
            };
            let handler = Arc::clone(entry.handler());

            match phase {
                CollisionPhase::Collided => handler.on_collided(self, first, second),
                CollisionPhase::Overlapping => handler.on_overlapping(self, first, second),
                CollisionPhase::Separated => handler.on_separated(self, first, second),
            }
        }
    }

    fn contact_side(&self, collider: ColliderHandle) -> Option<ContactSide> {
        let handle = self.rapier.collider_parent(collider)?;
        let (body, record) = self.bodies.resolve(handle)?;
        Some(ContactSide {
            collider,
            body,
            category: record.category,
        })
    }
}
