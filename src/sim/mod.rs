//! The bubble toy's simulation.
//!
//! This module contains everything that happens inside the playfield:
//! - Bubble entities (growing under a held pointer, then floating free)
//! - Ripple rings spawned when a bubble pops
//! - Boundary bounces and pairwise bubble collisions
//! - Pointer/touch gestures that spawn, grow, release and pop bubbles
//! - Lifetime pop statistics
//!
//! The simulation advances in discrete ticks: one `FixedUpdate` run is one
//! tick, and all per-tick rates (growth, fade, drift) are applied once per
//! tick rather than scaled by delta time.

mod bubble;
mod collision;
pub mod config;
mod debug;
mod input;
mod palette;
mod ripple;
mod stats;
mod textures;

use bevy::{prelude::*, window::PrimaryWindow};

use crate::PausableSystems;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Playfield>();
    app.init_resource::<Playfield>();

    // One fixed tick per display frame at a steady rate.
    app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ));

    // The tick is strictly ordered: ripples are advanced and pruned before
    // bubbles move, popped bubbles burst into ripples before pairs are
    // resolved.
    app.configure_sets(
        FixedUpdate,
        (SimStep::Ripples, SimStep::Bubbles, SimStep::Burst, SimStep::Collide)
            .chain()
            .in_set(PausableSystems),
    );

    app.add_plugins((
        textures::plugin,
        config::plugin,
        bubble::plugin,
        ripple::plugin,
        collision::plugin,
        input::plugin,
        stats::plugin,
        debug::plugin,
    ));

    // Textures must exist before the background spawns.
    app.add_systems(
        Startup,
        spawn_background.after(textures::generate_toy_assets),
    );
    app.add_systems(
        Update,
        (sync_playfield, resize_background).in_set(crate::AppSystems::Update),
    );
}

/// Simulation ticks per second.
const TICK_HZ: f64 = 60.0;

/// The phases of one simulation tick, in execution order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimStep {
    /// Advance and prune ripples.
    Ripples,
    /// Grow, integrate and bounce bubbles.
    Bubbles,
    /// Turn popped bubbles into ripple bursts.
    Burst,
    /// Resolve pairwise bubble collisions.
    Collide,
}

/// Current half-extents of the playfield in world units.
///
/// Tracks the primary window every frame. Resizing moves the walls without
/// touching live entities, so bubbles may momentarily sit out of bounds
/// until their next boundary test.
#[derive(Resource, Debug, Clone, Copy, Reflect)]
#[reflect(Resource)]
pub struct Playfield {
    pub half: Vec2,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            half: Vec2::new(640.0, 360.0),
        }
    }
}

/// Keep the playfield bounds in sync with the window size.
fn sync_playfield(
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut playfield: ResMut<Playfield>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let half = Vec2::new(window.resolution.width(), window.resolution.height()) / 2.0;
    if half != playfield.half && half.x > 0.0 && half.y > 0.0 {
        playfield.half = half;
    }
}

/// Marker for the background gradient sprite.
#[derive(Component)]
struct Background;

/// Spawn the background gradient behind everything else.
fn spawn_background(
    mut commands: Commands,
    playfield: Res<Playfield>,
    toy_assets: Res<textures::ToyAssets>,
) {
    commands.spawn((
        Name::new("Background"),
        Background,
        Sprite {
            image: toy_assets.background.clone(),
            custom_size: Some(playfield.half * 2.0),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, -10.0),
    ));
}

/// Stretch the background gradient to cover the window after resizes.
fn resize_background(
    playfield: Res<Playfield>,
    mut background_query: Query<&mut Sprite, With<Background>>,
) {
    if !playfield.is_changed() {
        return;
    }
    let Ok(mut sprite) = background_query.single_mut() else {
        return;
    };
    sprite.custom_size = Some(playfield.half * 2.0);
}
