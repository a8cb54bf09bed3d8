//! The minigolf course.
//!
//! [`setup`] builds every actor, the trampoline and the driven hinges once,
//! installs the filter policy and the observers, and inserts the [`Course`]
//! resource. [`step_schedule`] chains the per-step systems:
//!
//! 1. spring joints
//! 2. engine step
//! 3. notification dispatch
//! 4. message queue update
//! 5. event sink
//! 6. [`update`]
//!
//! [`run_step`] advances world time and runs that schedule once.

use std::f32::consts::FRAC_PI_2;

use bevy_ecs::prelude::*;
use log::{info, warn};
use rapier3d::prelude::*;

use crate::components::actor::{Actor, ActorId};
use crate::components::collision::FilterGroup;
use crate::components::joint::RevoluteJoint;
use crate::components::prefabs::{self, DEFAULT_BOX_HALF_EXTENTS};
use crate::components::tint::{CIRCUS_PALETTE, GROUND_GREY};
use crate::components::trampoline::Trampoline;
use crate::error::SceneError;
use crate::events::gamestate::{HoleSunkEvent, PushEvent, observe_hole_sunk, observe_push};
use crate::events::simulation::SimulationEvent;
use crate::resources::filterpolicy::FilterPolicy;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::GameState;
use crate::resources::material::MaterialId;
use crate::resources::physicsworld::PhysicsWorld;
use crate::resources::worldtime::WorldTime;
use crate::systems::collision::{dispatch_simulation_events, update_simulation_messages};
use crate::systems::eventsink::{HoleWatch, simulation_event_sink};
use crate::systems::physics::{apply_spring_joints, physics_step};
use crate::systems::time::update_world_time;

/// Candidate hole positions. Slot 0 is where the course starts.
pub const HOLE_SLOTS: [[Real; 3]; 5] = [
    [0.5, 0.5, 43.0],
    [-40.0, 0.5, 55.0],
    [25.0, 0.5, 30.0],
    [-20.0, 0.5, 0.0],
    [30.0, 0.5, -25.0],
];

const BALL_START: [Real; 3] = [0.5, 5.0, -28.0];
const BALL_RADIUS: Real = 1.1;
const COURSE_OFFSET: Real = 0.5;
const DEFAULT_DYNAMIC_FRICTION: Real = 0.2;

/// Materials created for the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseMaterials {
    /// Very bouncy bumper walls.
    pub walls: MaterialId,
    pub border: MaterialId,
    /// Spinners and the trampoline base.
    pub spinner: MaterialId,
}

#[derive(Resource, Debug)]
pub struct Course {
    ground: ActorId,
    ball: ActorId,
    hole: ActorId,
    hole_slot: usize,
    border: ActorId,
    rectangles: ActorId,
    spinners: [ActorId; 2],
    club: ActorId,
    trampoline: Trampoline,
    club_hinge: RevoluteJoint,
    spinner_hinges: [RevoluteJoint; 2],
    materials: CourseMaterials,
}

fn course_pose() -> Isometry<Real> {
    Isometry::translation(COURSE_OFFSET, COURSE_OFFSET, COURSE_OFFSET)
}

fn hole_at(slot: [Real; 3]) -> Actor {
    let [hx, hy, hz] = DEFAULT_BOX_HALF_EXTENTS;
    let mut hole = prefabs::static_box(Isometry::translation(slot[0], slot[1], slot[2]), vector![hx, hy, hz]);
    hole.set_trigger(true);
    hole.set_tint(CIRCUS_PALETTE[1]);
    hole.set_name("hole");
    hole
}

impl Course {
    /// Build and register every piece of the course in `physics`.
    pub fn build(physics: &mut PhysicsWorld, config: &GameConfig) -> Result<Self, SceneError> {
        let default = physics.default_material();
        physics.set_dynamic_friction(default, DEFAULT_DYNAMIC_FRICTION);

        let materials = CourseMaterials {
            walls: physics.create_material(0.0, 0.0, 3.0),
            border: physics.create_material(0.0, 0.0, 0.5),
            spinner: physics.create_material(0.0, 0.0, 0.8),
        };

        let mut ground = prefabs::ground();
        ground.set_tint(GROUND_GREY);

        let [bx, by, bz] = BALL_START;
        let mut ball = prefabs::sphere(Isometry::translation(bx, by, bz), BALL_RADIUS, 1.0);
        ball.set_name("ball");
        ball.set_tint(CIRCUS_PALETTE[0]);
        ball.setup_filtering(FilterGroup::ACTOR0, FilterGroup::ACTOR1);

        let mut border = prefabs::border(course_pose());
        border.set_material(materials.border);
        border.set_tint(CIRCUS_PALETTE[4]);

        let mut rectangles = prefabs::rectangles(course_pose());
        rectangles.set_material(materials.walls);

        let spinners = ["spinner-a", "spinner-b"].map(|name| {
            let mut spinner = prefabs::spinner(course_pose());
            spinner.set_name(name);
            spinner.set_material(materials.spinner);
            spinner.setup_filtering(FilterGroup::ACTOR1, FilterGroup::ACTOR0);
            spinner
        });

        let club = prefabs::club(Isometry::identity());

        let mut trampoline = Trampoline::new(
            Isometry::new(vector![0.0, 3.0, 15.0], vector![FRAC_PI_2, 0.0, 0.0]),
            vector![8.0, 3.0, 3.0],
            config.trampoline_stiffness,
            config.trampoline_damping,
        );
        if let Some(bottom) = trampoline.bottom_actor_mut() {
            bottom.set_material(materials.spinner);
            bottom.set_tint(CIRCUS_PALETTE[2]);
        }
        if let Some(top) = trampoline.top_actor_mut() {
            top.set_tint(CIRCUS_PALETTE[3]);
        }

        let ground = physics.add_actor(ground);
        let ball = physics.add_actor(ball);
        let border = physics.add_actor(border);
        let rectangles = physics.add_actor(rectangles);
        let hole = physics.add_actor(hole_at(HOLE_SLOTS[0]));
        let spinners = spinners.map(|spinner| physics.add_actor(spinner));
        let club = physics.add_actor(club);
        trampoline.add_to_world(physics);

        let mut club_hinge = RevoluteJoint::new(
            physics,
            None,
            Isometry::new(vector![0.0, 16.0, 0.0], vector![0.0, FRAC_PI_2, 0.0]),
            club,
            Isometry::translation(-25.0, 1.0, 0.0),
        )?;
        club_hinge.set_drive_velocity(physics, 0.0)?;

        let mut spinner_hinges = [
            RevoluteJoint::new(
                physics,
                None,
                Isometry::new(vector![35.0, 0.1, 50.0], vector![0.0, 0.0, FRAC_PI_2]),
                spinners[0],
                Isometry::translation(0.0, 5.0, 0.0),
            )?,
            RevoluteJoint::new(
                physics,
                None,
                Isometry::new(vector![-35.0, 0.1, -30.0], vector![0.0, 0.0, FRAC_PI_2]),
                spinners[1],
                Isometry::translation(0.0, 5.0, 0.0),
            )?,
        ];
        spinner_hinges[0].set_drive_velocity(physics, config.spinner_velocity_a)?;
        spinner_hinges[1].set_drive_velocity(physics, config.spinner_velocity_b)?;

        info!("Course built with {} actors", physics.actor_count());

        Ok(Self {
            ground,
            ball,
            hole,
            hole_slot: 0,
            border,
            rectangles,
            spinners,
            club,
            trampoline,
            club_hinge,
            spinner_hinges,
            materials,
        })
    }

    pub fn ground(&self) -> ActorId {
        self.ground
    }

    pub fn ball(&self) -> ActorId {
        self.ball
    }

    pub fn hole(&self) -> ActorId {
        self.hole
    }

    /// The hole and the ball whose overlap wins the course.
    pub fn hole_watch(&self) -> HoleWatch {
        HoleWatch {
            hole: self.hole,
            ball: self.ball,
        }
    }

    pub fn hole_slot(&self) -> usize {
        self.hole_slot
    }

    pub fn border(&self) -> ActorId {
        self.border
    }

    pub fn rectangles(&self) -> ActorId {
        self.rectangles
    }

    pub fn spinners(&self) -> [ActorId; 2] {
        self.spinners
    }

    pub fn club(&self) -> ActorId {
        self.club
    }

    pub fn trampoline(&self) -> &Trampoline {
        &self.trampoline
    }

    pub fn club_hinge(&self) -> &RevoluteJoint {
        &self.club_hinge
    }

    pub fn spinner_hinges(&self) -> &[RevoluteJoint; 2] {
        &self.spinner_hinges
    }

    pub fn materials(&self) -> CourseMaterials {
        self.materials
    }

    /// Swing the club: the hinge is driven opposite to the applied force.
    pub fn push(&mut self, physics: &mut PhysicsWorld, state: &GameState) -> Result<(), SceneError> {
        self.club_hinge
            .set_drive_velocity(physics, -state.applied_force())
    }

    /// Move the hole to a random slot. The old hole actor is removed and a
    /// fresh trigger box takes its place. Returns the chosen slot.
    pub fn switch_hole_position(&mut self, physics: &mut PhysicsWorld, rng: &mut fastrand::Rng) -> usize {
        let slot = rng.usize(..HOLE_SLOTS.len());
        if physics.remove_actor(self.hole).is_none() {
            warn!("Hole {} was not in the world", self.hole);
        }
        self.hole = physics.add_actor(hole_at(HOLE_SLOTS[slot]));
        self.hole_slot = slot;
        info!("Hole moved to slot {} ({:?})", slot, HOLE_SLOTS[slot]);
        slot
    }
}

/// Build the course into `world`.
///
/// Uses the [`GameConfig`] resource when present, creates the
/// [`PhysicsWorld`] when missing, and registers the push and hole-sunk
/// observers.
pub fn setup(world: &mut World) -> Result<(), SceneError> {
    let config = world.get_resource::<GameConfig>().cloned().unwrap_or_default();
    if !world.contains_resource::<PhysicsWorld>() {
        world.insert_resource(PhysicsWorld::from_config(&config));
    }
    world.insert_resource(GameState::new(config.force_limit));
    world.init_resource::<WorldTime>();
    world.init_resource::<FilterPolicy>();
    world.init_resource::<Messages<SimulationEvent>>();

    let course = {
        let mut physics = world.resource_mut::<PhysicsWorld>();
        Course::build(&mut physics, &config)?
    };
    world.insert_resource(course);

    world.add_observer(observe_push);
    world.add_observer(observe_hole_sunk);
    world.flush();
    Ok(())
}

/// Per-step course update: clamp the applied force and, while the ball sits
/// in the hole, latch the win and keep the ball asleep.
pub fn update(
    mut state: ResMut<GameState>,
    course: Option<Res<Course>>,
    mut physics: ResMut<PhysicsWorld>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    state.clamp_applied_force();
    if !state.trigger_active() {
        return;
    }
    let newly_won = state.latch_win();
    let Some(course) = course else {
        return;
    };
    if let Err(e) = physics.put_to_sleep(course.ball()) {
        warn!("Could not put the ball to sleep: {}", e);
    }
    if newly_won {
        commands.trigger(HoleSunkEvent {
            ball: course.ball(),
            step: time.steps,
        });
    }
}

/// The chained per-step schedule.
pub fn step_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            apply_spring_joints,
            physics_step,
            dispatch_simulation_events,
            update_simulation_messages,
            simulation_event_sink,
            update,
        )
            .chain(),
    );
    schedule
}

/// Advance time by one fixed step and run `schedule` once.
pub fn run_step(world: &mut World, schedule: &mut Schedule) {
    let dt = world.resource::<PhysicsWorld>().timestep();
    update_world_time(world, dt);
    schedule.run(world);
}

/// Input hook: swing the club with the current applied force.
pub fn push(world: &mut World) {
    world.trigger(PushEvent {});
}
