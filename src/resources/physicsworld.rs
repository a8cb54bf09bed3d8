//! Physics world resource.
//!
//! Owns every rapier set, the actor registry and the material table. Actors
//! are handed over with [`PhysicsWorld::add_actor`] and are addressed by
//! [`ActorId`] from then on; colliders are mapped back to the owning actor
//! and shape index so engine notifications can be reported in course terms.
//!
//! Collision notifications are collected on a crossbeam channel during
//! [`PhysicsWorld::step`] and drained once per step by the dispatch system.
//! The installed [`FilterShader`] also runs inside the engine as a pair
//! filter, so ignored pairs are never tracked and trigger pairs never get a
//! contact response.

use crossbeam_channel::{Receiver, unbounded};
use log::{debug, warn};
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

use bevy_ecs::prelude::Resource;

use crate::components::actor::{Actor, ActorId, BodyKind, ShapeKind};
use crate::components::collision::{
    FilterAttributes, FilterData, FilterInput, FilterShader, PairDecision, course_filter_shader,
};
use crate::components::tint::Tint;
use crate::error::SceneError;
use crate::resources::gameconfig::GameConfig;
use crate::resources::material::{Material, MaterialId, MaterialTable};

/// What the world remembers about a realised shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRecord {
    pub actor: ActorId,
    pub index: usize,
    pub kind: ShapeKind,
    pub body: BodyKind,
    pub trigger: bool,
    pub filter: FilterData,
    pub material: MaterialId,
}

impl ShapeRecord {
    pub fn filter_input(&self) -> FilterInput {
        let mut attributes = match self.body {
            BodyKind::Static => FilterAttributes::STATIC_BODY,
            BodyKind::Dynamic => FilterAttributes::DYNAMIC_BODY,
        };
        if self.trigger {
            attributes |= FilterAttributes::TRIGGER;
        }
        FilterInput::new(attributes, self.filter)
    }
}

/// A dynamic actor changed activation state during the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationChange {
    Woke(ActorId),
    FellAsleep(ActorId),
}

/// Engine pair filter running the installed shader on every candidate pair.
struct ShaderHooks<'a> {
    shapes: &'a FxHashMap<ColliderHandle, ShapeRecord>,
    shader: FilterShader,
}

impl ShaderHooks<'_> {
    fn decide(&self, context: &PairFilterContext) -> Option<PairDecision> {
        let a = self.shapes.get(&context.collider1)?;
        let b = self.shapes.get(&context.collider2)?;
        Some((self.shader)(&a.filter_input(), &b.filter_input()))
    }
}

impl PhysicsHooks for ShaderHooks<'_> {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        // Colliders the world does not know about keep the engine default.
        let Some(decision) = self.decide(context) else {
            return Some(SolverFlags::COMPUTE_IMPULSES);
        };
        if !decision.detects() {
            None
        } else if decision.solves_contact() {
            Some(SolverFlags::COMPUTE_IMPULSES)
        } else {
            Some(SolverFlags::empty())
        }
    }

    fn filter_intersection_pair(&self, context: &PairFilterContext) -> bool {
        self.decide(context).is_none_or(|decision| decision.detects())
    }
}

struct ActorEntry {
    actor: Actor,
    body: RigidBodyHandle,
    colliders: SmallVec<[ColliderHandle; 4]>,
    asleep: bool,
}

/// Serializable view of one actor, used by the runner's snapshot dump.
#[derive(Debug, Clone, Serialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub kind: BodyKind,
    pub tint: Tint,
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub sleeping: bool,
}

#[derive(Resource)]
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    event_collector: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    contact_force_recv: Receiver<ContactForceEvent>,
    materials: MaterialTable,
    actors: FxHashMap<ActorId, ActorEntry>,
    shapes: FxHashMap<ColliderHandle, ShapeRecord>,
    /// Records of colliders removed since the last step. The engine reports
    /// their lost pairs during that step.
    removed_shapes: FxHashMap<ColliderHandle, ShapeRecord>,
    /// Records of colliders whose removal the last step reported.
    retired_shapes: FxHashMap<ColliderHandle, ShapeRecord>,
    filter_shader: FilterShader,
    activation_changes: Vec<ActivationChange>,
    world_anchor: RigidBodyHandle,
    drive_gain: Real,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::from_config(&GameConfig::new())
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Real, timestep: Real) -> Self {
        let (collision_send, collision_recv) = unbounded();
        let (contact_force_send, contact_force_recv) = unbounded();

        let mut bodies = RigidBodySet::new();
        let world_anchor = bodies.insert(RigidBodyBuilder::fixed().build());

        let params = IntegrationParameters {
            dt: timestep,
            ..Default::default()
        };

        Self {
            gravity: vector![0.0, gravity, 0.0],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            event_collector: ChannelEventCollector::new(collision_send, contact_force_send),
            collision_recv,
            contact_force_recv,
            materials: MaterialTable::new(),
            actors: FxHashMap::default(),
            shapes: FxHashMap::default(),
            removed_shapes: FxHashMap::default(),
            retired_shapes: FxHashMap::default(),
            filter_shader: course_filter_shader,
            activation_changes: Vec::new(),
            world_anchor,
            drive_gain: 50.0,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        let mut world = Self::new(config.gravity, config.timestep);
        world.drive_gain = config.drive_gain;
        world
    }

    pub fn timestep(&self) -> Real {
        self.params.dt
    }

    pub fn gravity(&self) -> Vector<Real> {
        self.gravity
    }

    pub fn filter_shader(&self) -> FilterShader {
        self.filter_shader
    }

    /// Install the pair filter used by the engine from the next step on.
    pub fn set_filter_shader(&mut self, shader: FilterShader) {
        self.filter_shader = shader;
    }

    /// Gain handed to velocity motors of driven hinges.
    pub fn drive_gain(&self) -> Real {
        self.drive_gain
    }

    // Materials

    pub fn create_material(&mut self, static_friction: Real, dynamic_friction: Real, restitution: Real) -> MaterialId {
        self.materials
            .create(Material::new(static_friction, dynamic_friction, restitution))
    }

    pub fn default_material(&self) -> MaterialId {
        MaterialId::DEFAULT
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Change the dynamic friction of a material and of every realised shape
    /// using it.
    pub fn set_dynamic_friction(&mut self, id: MaterialId, value: Real) -> bool {
        let Some(material) = self.materials.get_mut(id) else {
            return false;
        };
        material.dynamic_friction = value;
        for (handle, _) in self.shapes.iter().filter(|(_, s)| s.material == id) {
            if let Some(collider) = self.colliders.get_mut(*handle) {
                collider.set_friction(value);
            }
        }
        true
    }

    /// Change the restitution of a material and of every realised shape using
    /// it.
    pub fn set_restitution(&mut self, id: MaterialId, value: Real) -> bool {
        let Some(material) = self.materials.get_mut(id) else {
            return false;
        };
        material.restitution = value;
        for (handle, _) in self.shapes.iter().filter(|(_, s)| s.material == id) {
            if let Some(collider) = self.colliders.get_mut(*handle) {
                collider.set_restitution(value);
            }
        }
        true
    }

    // Actors

    /// Realise `actor` in the engine. The world owns it from now on.
    pub fn add_actor(&mut self, actor: Actor) -> ActorId {
        let id = actor.id();
        let builder = match actor.kind() {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let body = self.bodies.insert(builder.position(*actor.pose()).build());

        let mut colliders = SmallVec::new();
        for (index, shape) in actor.shapes().iter().enumerate() {
            let material = self.materials.get(shape.material()).copied().unwrap_or_else(|| {
                warn!("{} shape {} references unknown material, using default", id, index);
                Material::default()
            });
            let collider = ColliderBuilder::new(shape.geometry().shared_shape())
                .position(*shape.local_pose())
                .density(shape.density())
                .friction(material.dynamic_friction)
                .restitution(material.restitution)
                .sensor(shape.is_trigger())
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::FILTER_INTERSECTION_PAIR)
                .build();
            let handle = self.colliders.insert_with_parent(collider, body, &mut self.bodies);
            self.shapes.insert(
                handle,
                ShapeRecord {
                    actor: id,
                    index,
                    kind: shape.kind(),
                    body: actor.kind(),
                    trigger: shape.is_trigger(),
                    filter: shape.filter(),
                    material: shape.material(),
                },
            );
            colliders.push(handle);
        }

        debug!("Added {} ({}) with {} shape(s)", id, actor.name(), colliders.len());
        self.actors.insert(
            id,
            ActorEntry {
                actor,
                body,
                colliders,
                asleep: false,
            },
        );
        id
    }

    /// Remove an actor, its colliders and any joint attached to it, handing
    /// the descriptor back.
    ///
    /// The shape records stay resolvable until the step after next so that
    /// the lost pairs the engine reports for the removal can be classified.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let entry = self.actors.remove(&id)?;
        for handle in &entry.colliders {
            if let Some(record) = self.shapes.remove(handle) {
                self.removed_shapes.insert(*handle, record);
            }
        }
        self.bodies.remove(
            entry.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        debug!("Removed {} ({})", id, entry.actor.name());
        Some(entry.actor)
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id).map(|e| &e.actor)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    /// Current world pose of an actor's body.
    pub fn body_pose(&self, id: ActorId) -> Option<Isometry<Real>> {
        self.body(id).map(|rb| *rb.position())
    }

    /// Record of a live collider, or of one removed recently enough that the
    /// engine may still report it.
    pub fn shape_record(&self, handle: ColliderHandle) -> Option<&ShapeRecord> {
        self.shapes
            .get(&handle)
            .or_else(|| self.retired_shapes.get(&handle))
            .or_else(|| self.removed_shapes.get(&handle))
    }

    /// Collider handles of an actor, in shape creation order.
    pub fn colliders_of(&self, id: ActorId) -> Option<&[ColliderHandle]> {
        self.actors.get(&id).map(|e| e.colliders.as_slice())
    }

    /// Engine handle of the body bound to `id`, or the world anchor for
    /// `None`.
    pub(crate) fn body_handle(&self, id: Option<ActorId>) -> Result<RigidBodyHandle, SceneError> {
        match id {
            None => Ok(self.world_anchor),
            Some(id) => self
                .actors
                .get(&id)
                .map(|e| e.body)
                .ok_or(SceneError::UnknownActor(id)),
        }
    }

    pub(crate) fn body(&self, id: ActorId) -> Option<&RigidBody> {
        let entry = self.actors.get(&id)?;
        self.bodies.get(entry.body)
    }

    pub(crate) fn body_mut(&mut self, id: ActorId) -> Option<&mut RigidBody> {
        let entry = self.actors.get(&id)?;
        self.bodies.get_mut(entry.body)
    }

    pub(crate) fn impulse_joints_mut(&mut self) -> &mut ImpulseJointSet {
        &mut self.impulse_joints
    }

    pub(crate) fn impulse_joints(&self) -> &ImpulseJointSet {
        &self.impulse_joints
    }

    // Activation

    pub fn is_sleeping(&self, id: ActorId) -> Option<bool> {
        self.body(id).map(|rb| rb.is_sleeping())
    }

    /// Wake a sleeping dynamic actor. Static actors and awake actors are left
    /// untouched.
    pub fn wake_up(&mut self, id: ActorId) -> Result<(), SceneError> {
        let rb = self.body_mut(id).ok_or(SceneError::UnknownActor(id))?;
        if rb.is_dynamic() && rb.is_sleeping() {
            rb.wake_up(true);
        }
        Ok(())
    }

    /// Put a dynamic actor to sleep. Repeating the call is harmless.
    pub fn put_to_sleep(&mut self, id: ActorId) -> Result<(), SceneError> {
        let rb = self.body_mut(id).ok_or(SceneError::UnknownActor(id))?;
        if !rb.is_dynamic() {
            return Err(SceneError::NotDynamic(id));
        }
        if !rb.is_sleeping() {
            rb.sleep();
        }
        Ok(())
    }

    // Stepping

    /// Advance the simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.retired_shapes = std::mem::take(&mut self.removed_shapes);
        let hooks = ShaderHooks {
            shapes: &self.shapes,
            shader: self.filter_shader,
        };
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &hooks,
            &self.event_collector,
        );

        // Contact forces are never requested; keep the channel empty.
        while self.contact_force_recv.try_recv().is_ok() {}

        for (id, entry) in self.actors.iter_mut() {
            if entry.actor.kind() != BodyKind::Dynamic {
                continue;
            }
            let Some(rb) = self.bodies.get(entry.body) else {
                continue;
            };
            let asleep = rb.is_sleeping();
            if asleep != entry.asleep {
                entry.asleep = asleep;
                self.activation_changes.push(if asleep {
                    ActivationChange::FellAsleep(*id)
                } else {
                    ActivationChange::Woke(*id)
                });
            }
        }
    }

    /// Take every collision notification collected since the last drain.
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        self.collision_recv.try_iter().collect()
    }

    /// Take every wake/sleep transition recorded since the last drain.
    pub fn drain_activation_changes(&mut self) -> Vec<ActivationChange> {
        std::mem::take(&mut self.activation_changes)
    }

    pub fn snapshot(&self) -> Vec<ActorSnapshot> {
        let mut snapshot: Vec<ActorSnapshot> = self
            .actors
            .iter()
            .filter_map(|(id, entry)| {
                let rb = self.bodies.get(entry.body)?;
                let pose = rb.position();
                let t = pose.translation.vector;
                let q = pose.rotation;
                Some(ActorSnapshot {
                    id: *id,
                    name: entry.actor.name().to_string(),
                    kind: entry.actor.kind(),
                    tint: entry.actor.tint(),
                    translation: [t.x, t.y, t.z],
                    rotation: [q.i, q.j, q.k, q.w],
                    sleeping: rb.is_sleeping(),
                })
            })
            .collect();
        snapshot.sort_by_key(|s| s.id);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::prefabs;

    fn ball_over_ground(world: &mut PhysicsWorld) -> ActorId {
        world.add_actor(prefabs::ground());
        world.add_actor(prefabs::sphere(Isometry::translation(0.0, 5.0, 0.0), 1.0, 1.0))
    }

    #[test]
    fn test_add_and_remove_actor() {
        let mut world = PhysicsWorld::default();
        let id = world.add_actor(prefabs::border(Isometry::identity()));
        assert!(world.contains(id));
        assert_eq!(world.actor_count(), 1);
        assert_eq!(world.actor(id).unwrap().shape_count(), 4);

        let actor = world.remove_actor(id).unwrap();
        assert_eq!(actor.id(), id);
        assert!(!world.contains(id));
        assert!(world.remove_actor(id).is_none());
    }

    #[test]
    fn test_shape_records_map_back_to_owner() {
        let mut world = PhysicsWorld::default();
        let id = world.add_actor(prefabs::spinner(Isometry::identity()));
        let mut indices: Vec<usize> = world
            .shapes
            .values()
            .filter(|s| s.actor == id)
            .map(|s| s.index)
            .collect();
        indices.sort();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_ball_falls_under_gravity() {
        let mut world = PhysicsWorld::default();
        let ball = ball_over_ground(&mut world);
        for _ in 0..10 {
            world.step();
        }
        assert!(world.body_pose(ball).unwrap().translation.y < 5.0);
    }

    #[test]
    fn test_put_to_sleep_is_idempotent() {
        let mut world = PhysicsWorld::default();
        let ball = ball_over_ground(&mut world);
        world.put_to_sleep(ball).unwrap();
        world.put_to_sleep(ball).unwrap();
        assert_eq!(world.is_sleeping(ball), Some(true));

        world.wake_up(ball).unwrap();
        assert_eq!(world.is_sleeping(ball), Some(false));
    }

    #[test]
    fn test_put_to_sleep_rejects_static_and_unknown() {
        let mut world = PhysicsWorld::default();
        let wall = world.add_actor(prefabs::border(Isometry::identity()));
        assert_eq!(world.put_to_sleep(wall), Err(SceneError::NotDynamic(wall)));

        let stray = prefabs::ground().id();
        assert_eq!(world.put_to_sleep(stray), Err(SceneError::UnknownActor(stray)));
    }

    #[test]
    fn test_material_changes_reach_colliders() {
        let mut world = PhysicsWorld::default();
        let bouncy = world.create_material(0.0, 0.0, 0.5);
        assert_eq!(world.material_count(), 2);
        let mut wall = prefabs::border(Isometry::identity());
        wall.set_material(bouncy);
        world.add_actor(wall);

        assert!(world.set_restitution(bouncy, 3.0));
        assert!(world.set_dynamic_friction(bouncy, 0.2));
        for (handle, _) in world.shapes.iter().filter(|(_, s)| s.material == bouncy) {
            let collider = world.colliders.get(*handle).unwrap();
            assert_eq!(collider.restitution(), 3.0);
            assert_eq!(collider.friction(), 0.2);
        }
        assert_eq!(world.material(bouncy).unwrap().restitution, 3.0);
    }

    #[test]
    fn test_sleep_transition_is_recorded_after_step() {
        let mut world = PhysicsWorld::default();
        let ball = ball_over_ground(&mut world);
        world.put_to_sleep(ball).unwrap();
        world.step();
        let changes = world.drain_activation_changes();
        assert!(changes.contains(&ActivationChange::FellAsleep(ball)));
        assert!(world.drain_activation_changes().is_empty());
    }

    fn ignore_everything(_: &FilterInput, _: &FilterInput) -> PairDecision {
        crate::components::collision::IGNORE_PAIR
    }

    #[test]
    fn test_ground_holds_ball_under_course_filter() {
        let mut world = PhysicsWorld::default();
        let ball = ball_over_ground(&mut world);
        for _ in 0..180 {
            world.step();
        }
        assert!(world.body_pose(ball).unwrap().translation.y > 0.5);
    }

    #[test]
    fn test_ignoring_filter_lets_ball_fall_through_ground() {
        let mut world = PhysicsWorld::default();
        world.set_filter_shader(ignore_everything);
        let ball = ball_over_ground(&mut world);
        for _ in 0..180 {
            world.step();
        }
        assert!(world.body_pose(ball).unwrap().translation.y < -5.0);
        assert!(world.drain_collision_events().is_empty());
    }

    #[test]
    fn test_trigger_box_gives_no_contact_response() {
        let mut world = PhysicsWorld::default();
        let mut slab = prefabs::static_box(Isometry::translation(0.0, 2.0, 0.0), vector![3.0, 0.3, 3.0]);
        slab.set_trigger(true);
        world.add_actor(slab);
        let ball = world.add_actor(prefabs::sphere(Isometry::translation(0.0, 5.0, 0.0), 1.0, 1.0));
        for _ in 0..120 {
            world.step();
        }
        assert!(world.body_pose(ball).unwrap().translation.y < 0.0);
    }

    #[test]
    fn test_removed_shape_records_outlive_one_step() {
        let mut world = PhysicsWorld::default();
        let wall = world.add_actor(prefabs::border(Isometry::identity()));
        let handle = world.colliders_of(wall).unwrap()[0];

        world.remove_actor(wall);
        assert_eq!(world.shape_record(handle).unwrap().actor, wall);
        world.step();
        assert_eq!(world.shape_record(handle).unwrap().actor, wall);
        world.step();
        assert!(world.shape_record(handle).is_none());
    }

    #[test]
    fn test_removing_sensor_reports_lost_pair() {
        let mut world = PhysicsWorld::default();
        world.add_actor(prefabs::ground());
        let mut hole = prefabs::static_box(Isometry::translation(0.0, 0.5, 0.0), vector![3.0, 0.3, 3.0]);
        hole.set_trigger(true);
        let hole = world.add_actor(hole);
        world.add_actor(prefabs::sphere(Isometry::translation(0.0, 3.0, 0.0), 1.0, 1.0));
        let sensor = world.colliders_of(hole).unwrap()[0];

        let mut entered = false;
        for _ in 0..120 {
            world.step();
            entered |= world
                .drain_collision_events()
                .iter()
                .any(|e| e.started() && (e.collider1() == sensor || e.collider2() == sensor));
        }
        assert!(entered);

        world.remove_actor(hole);
        world.step();
        let lost: Vec<CollisionEvent> = world
            .drain_collision_events()
            .into_iter()
            .filter(|e| e.stopped() && (e.collider1() == sensor || e.collider2() == sensor))
            .collect();
        assert_eq!(lost.len(), 1);
        assert_eq!(world.shape_record(sensor).unwrap().actor, hole);
    }

    #[test]
    fn test_snapshot_is_sorted_and_named() {
        let mut world = PhysicsWorld::default();
        let ground = world.add_actor(prefabs::ground());
        let border = world.add_actor(prefabs::border(Isometry::identity()));
        let snapshot = world.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, ground.min(border));
        let mut ids: Vec<ActorId> = world.actor_ids().collect();
        ids.sort();
        assert_eq!(ids, vec![ground.min(border), ground.max(border)]);
        assert!(snapshot.iter().any(|s| s.name == "border"));
    }
}
