//! Bubble entities - the toy's main objects.
//!
//! A bubble starts anchored under the pointer that created it and grows
//! while held. Released, it floats free: it drifts, bounces off the
//! playfield walls and cycles its hue until it pops - by touch, or on its
//! own when it grows past the preset maximum.

use bevy::prelude::*;
use rand::Rng;

use super::{
    SimStep,
    config::{BouncePolicy, SimConfig},
    palette, ripple,
    textures::ToyAssets,
};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Bubble>();
    app.init_resource::<GrowingBubble>();
    app.init_resource::<SpawnSeq>();
    app.add_message::<BubblePopped>();

    app.add_systems(
        FixedUpdate,
        (grow_bubbles, float_bubbles).chain().in_set(SimStep::Bubbles),
    );
    app.add_systems(FixedUpdate, burst_bubbles.in_set(SimStep::Burst));

    // Visual sync runs in the frame schedule so drag-driven growth shows up
    // even between ticks.
    app.add_systems(
        Update,
        (sync_bubble_scale, tint_bubbles).in_set(crate::AppSystems::Update),
    );
}

/// Radius a bubble is born with.
pub const INITIAL_RADIUS: f32 = 5.0;

/// Radius gained per growth step - one tick of holding, or one drag event.
pub const GROWTH_STEP: f32 = 0.5;

/// Upward velocity given to a bubble on release.
pub const RELEASE_LIFT: f32 = 2.0;

/// Largest magnitude of the random horizontal drift given on release.
pub const RELEASE_DRIFT: f32 = 1.0;

/// Hue degrees advanced per tick while free, wrapping at 360.
const HUE_DRIFT: f32 = 1.0;

/// Saturation and lightness used when turning a hue into a tint.
const TINT_SATURATION: f32 = 0.75;
const TINT_LIGHTNESS: f32 = 0.7;

/// Which part of its life a bubble is in. Never goes back to `Growing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
pub enum Phase {
    /// Anchored at its creation point, radius increasing under the held
    /// pointer, zero velocity.
    #[default]
    Growing,
    /// Moving under its own velocity with a fixed radius.
    Free,
}

/// A live bubble. Position lives in the entity's `Transform`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Bubble {
    pub radius: f32,
    pub velocity: Vec2,
    /// Color angle in degrees, 0-360.
    pub hue: f32,
    pub phase: Phase,
    /// Spawn order, used for newest-first hit-testing.
    pub seq: u64,
}

impl Bubble {
    fn new_growing(hue: f32, seq: u64) -> Self {
        Self {
            radius: INITIAL_RADIUS,
            velocity: Vec2::ZERO,
            hue,
            phase: Phase::Growing,
            seq,
        }
    }

    pub fn is_free(&self) -> bool {
        self.phase == Phase::Free
    }

    /// Add one growth step while anchored.
    pub fn grow_step(&mut self, amount: f32) {
        self.radius += amount;
    }

    /// Whether the bubble has reached the auto-burst radius.
    pub fn overgrown(&self, max_radius: f32) -> bool {
        self.radius >= max_radius
    }

    /// Let go: the bubble keeps its current radius and starts moving.
    pub fn release(&mut self, velocity: Vec2) {
        self.phase = Phase::Free;
        self.velocity = velocity;
    }

    /// One tick of free flight: drift, integrate, cycle hue, bounce.
    pub fn float_step(&mut self, position: &mut Vec2, half: Vec2, config: &SimConfig) {
        self.velocity.y += config.buoyancy;
        self.velocity *= config.drag;
        *position += self.velocity;
        self.hue = (self.hue + HUE_DRIFT).rem_euclid(360.0);
        self.bounce(position, half, config.bounce);
    }

    /// Test each wall and redirect the velocity inward on overflow.
    pub fn bounce(&mut self, position: &mut Vec2, half: Vec2, policy: BouncePolicy) {
        let r = self.radius;
        match policy {
            BouncePolicy::Elastic => {
                if position.x - r < -half.x {
                    self.velocity.x = self.velocity.x.abs();
                } else if position.x + r > half.x {
                    self.velocity.x = -self.velocity.x.abs();
                }
                if position.y - r < -half.y {
                    self.velocity.y = self.velocity.y.abs();
                } else if position.y + r > half.y {
                    self.velocity.y = -self.velocity.y.abs();
                }
            }
            BouncePolicy::Clamped { restitution } => {
                // A bubble wider than the playfield pins to the center.
                let limit = (half - Vec2::splat(r)).max(Vec2::ZERO);
                if position.x - r < -half.x {
                    position.x = -limit.x;
                    self.velocity.x = self.velocity.x.abs() * restitution;
                } else if position.x + r > half.x {
                    position.x = limit.x;
                    self.velocity.x = -self.velocity.x.abs() * restitution;
                }
                if position.y - r < -half.y {
                    position.y = -limit.y;
                    self.velocity.y = self.velocity.y.abs() * restitution;
                } else if position.y + r > half.y {
                    position.y = limit.y;
                    self.velocity.y = -self.velocity.y.abs() * restitution;
                }
            }
        }
    }

    /// The bubble's current tint.
    pub fn tint(&self) -> Color {
        Color::hsla(self.hue, TINT_SATURATION, TINT_LIGHTNESS, 0.9)
    }
}

/// The single growing slot: at most one bubble grows at a time, owned by
/// the pointer gesture that created it. Cleared on release and auto-burst.
#[derive(Resource, Debug, Default)]
pub struct GrowingBubble(pub Option<Entity>);

/// Monotonic spawn counter backing `Bubble::seq`.
#[derive(Resource, Debug, Default)]
pub struct SpawnSeq(u64);

/// Marks a bubble for the burst pass. Inserted by the grow step on
/// over-growth and by the input handler on a touch hit.
#[derive(Component, Debug, Clone, Copy)]
pub struct Popped {
    pub overgrown: bool,
}

/// Message sent when a bubble bursts, after its ripples have spawned.
#[derive(Message, Debug, Clone)]
pub struct BubblePopped {
    pub position: Vec2,
    pub hue: f32,
    pub radius: f32,
    pub overgrown: bool,
}

/// Marker for the tinted glow child of a bubble.
#[derive(Component)]
struct BubbleBody;

/// Spawn a new growing bubble under the pointer.
///
/// The visuals are children in unit space: the parent transform's scale is
/// the radius, so growth is a scale change.
pub(super) fn spawn_bubble(
    commands: &mut Commands,
    materials: &mut Assets<ColorMaterial>,
    toy_assets: &ToyAssets,
    seq: &mut SpawnSeq,
    position: Vec2,
) -> Entity {
    let mut rng = rand::rng();
    seq.0 += 1;
    let bubble = Bubble::new_growing(rng.random_range(0.0..360.0), seq.0);
    let tint = bubble.tint();

    // Glimmer: every bubble carries its highlight in a slightly different
    // spot.
    let glimmer_angle = rng.random_range(0.0..std::f32::consts::TAU);
    let glimmer = Vec2::from_angle(glimmer_angle) * rng.random_range(0.1..0.35);

    commands
        .spawn((
            Name::new("Bubble"),
            bubble,
            Transform::from_translation(position.extend(0.0))
                .with_scale(Vec3::splat(INITIAL_RADIUS)),
            Visibility::default(),
            children![
                (
                    Name::new("Bubble Glow"),
                    BubbleBody,
                    Sprite {
                        image: toy_assets.glow.clone(),
                        custom_size: Some(Vec2::splat(2.0)),
                        color: tint,
                        ..default()
                    },
                    Transform::from_xyz(0.0, 0.0, 0.0),
                ),
                (
                    Name::new("Bubble Highlight"),
                    Sprite {
                        image: toy_assets.highlight.clone(),
                        custom_size: Some(Vec2::splat(0.9)),
                        color: palette::BUBBLE_HIGHLIGHT,
                        ..default()
                    },
                    Transform::from_translation(glimmer.extend(0.01)),
                ),
                (
                    Name::new("Bubble Rim"),
                    Mesh2d(toy_assets.ring.clone()),
                    MeshMaterial2d(materials.add(ColorMaterial::from_color(palette::BUBBLE_RIM))),
                    Transform::from_xyz(0.0, 0.0, 0.02),
                ),
            ],
        ))
        .id()
}

/// Grow anchored bubbles one step and flag any that reach the cap.
fn grow_bubbles(
    mut commands: Commands,
    config: Res<SimConfig>,
    mut bubbles: Query<(Entity, &mut Bubble), Without<Popped>>,
) {
    for (entity, mut bubble) in &mut bubbles {
        if bubble.phase != Phase::Growing {
            continue;
        }
        bubble.grow_step(GROWTH_STEP);
        if bubble.overgrown(config.max_radius) {
            commands.entity(entity).insert(Popped { overgrown: true });
        }
    }
}

/// Move free bubbles one tick.
fn float_bubbles(
    config: Res<SimConfig>,
    playfield: Res<super::Playfield>,
    mut bubbles: Query<(&mut Transform, &mut Bubble), Without<Popped>>,
) {
    for (mut transform, mut bubble) in &mut bubbles {
        if bubble.phase != Phase::Free {
            continue;
        }
        let mut position = transform.translation.truncate();
        bubble.float_step(&mut position, playfield.half, &config);
        transform.translation = position.extend(transform.translation.z);
    }
}

/// Turn popped bubbles into ripple bursts and remove them.
fn burst_bubbles(
    mut commands: Commands,
    mut materials: ResMut<Assets<ColorMaterial>>,
    toy_assets: Res<ToyAssets>,
    mut growing: ResMut<GrowingBubble>,
    mut popped_messages: MessageWriter<BubblePopped>,
    popped: Query<(Entity, &Transform, &Bubble, &Popped)>,
) {
    for (entity, transform, bubble, pop) in &popped {
        let position = transform.translation.truncate();
        ripple::spawn_burst(
            &mut commands,
            &mut materials,
            &toy_assets,
            position,
            bubble.hue,
        );
        popped_messages.write(BubblePopped {
            position,
            hue: bubble.hue,
            radius: bubble.radius,
            overgrown: pop.overgrown,
        });

        // An auto-burst ends the gesture's bubble; the next press starts a
        // fresh one.
        if growing.0 == Some(entity) {
            growing.0 = None;
        }

        commands.entity(entity).despawn();
        debug!("Bubble burst at {:?} (radius {:.1})", position, bubble.radius);
    }
}

/// Keep each bubble's scale equal to its radius.
fn sync_bubble_scale(mut bubbles: Query<(&Bubble, &mut Transform), Changed<Bubble>>) {
    for (bubble, mut transform) in &mut bubbles {
        transform.scale = Vec3::splat(bubble.radius);
    }
}

/// Re-tint glow sprites as hues cycle.
fn tint_bubbles(
    bubbles: Query<&Bubble>,
    mut sprites: Query<(&ChildOf, &mut Sprite), With<BubbleBody>>,
) {
    for (child_of, mut sprite) in &mut sprites {
        if let Ok(bubble) = bubbles.get(child_of.parent()) {
            sprite.color = bubble.tint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::config::Preset;

    #[test]
    fn test_hold_growth() {
        // Ten growth steps from birth: 5 + 10 * 0.5 = 10.
        let mut bubble = Bubble::new_growing(120.0, 1);
        assert_eq!(bubble.radius, 5.0);
        for _ in 0..10 {
            bubble.grow_step(GROWTH_STEP);
        }
        assert_eq!(bubble.radius, 10.0);
        assert_eq!(bubble.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_overgrown_exactly_at_max() {
        let mut bubble = Bubble::new_growing(0.0, 1);
        bubble.radius = 149.9;
        assert!(!bubble.overgrown(150.0));
        bubble.radius = 150.0;
        assert!(bubble.overgrown(150.0));
    }

    #[test]
    fn test_release_keeps_radius() {
        let config = Preset::Classic.config();
        let mut bubble = Bubble::new_growing(0.0, 1);
        bubble.grow_step(GROWTH_STEP);
        let released_radius = bubble.radius;
        bubble.release(Vec2::new(0.4, RELEASE_LIFT));
        assert!(bubble.is_free());

        let mut position = Vec2::ZERO;
        for _ in 0..100 {
            bubble.float_step(&mut position, Vec2::new(400.0, 300.0), &config);
        }
        assert_eq!(bubble.radius, released_radius);
    }

    #[test]
    fn test_elastic_bounce_redirects_without_clamping() {
        let mut bubble = Bubble::new_growing(0.0, 1);
        bubble.radius = 20.0;
        bubble.release(Vec2::new(-3.0, 0.0));

        // Overlapping the left wall: velocity flips inward, position stays.
        let mut position = Vec2::new(-95.0, 0.0);
        bubble.bounce(&mut position, Vec2::new(100.0, 100.0), BouncePolicy::Elastic);
        assert_eq!(position, Vec2::new(-95.0, 0.0));
        assert_eq!(bubble.velocity.x, 3.0);

        // Already moving inward: no change.
        bubble.bounce(&mut position, Vec2::new(100.0, 100.0), BouncePolicy::Elastic);
        assert_eq!(bubble.velocity.x, 3.0);
    }

    #[test]
    fn test_clamped_bounce_clamps_and_damps() {
        let mut bubble = Bubble::new_growing(0.0, 1);
        bubble.radius = 20.0;
        bubble.release(Vec2::new(0.0, -5.0));

        // Sinking through the floor: y clamps to one radius off the wall
        // and the velocity flips scaled by restitution.
        let mut position = Vec2::new(50.0, -95.0);
        bubble.bounce(
            &mut position,
            Vec2::new(100.0, 100.0),
            BouncePolicy::Clamped { restitution: 0.85 },
        );
        assert_eq!(position.y, -80.0);
        assert!((bubble.velocity.y - 4.25).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_positions_stay_in_bounds() {
        let config = Preset::Fizzy.config();
        let half = Vec2::new(200.0, 150.0);
        let mut bubble = Bubble::new_growing(0.0, 1);
        bubble.radius = 30.0;
        bubble.release(Vec2::new(7.0, RELEASE_LIFT));

        let mut position = Vec2::ZERO;
        for _ in 0..500 {
            bubble.float_step(&mut position, half, &config);
            assert!(position.x >= -half.x + bubble.radius - 1e-3);
            assert!(position.x <= half.x - bubble.radius + 1e-3);
            assert!(position.y >= -half.y + bubble.radius - 1e-3);
            assert!(position.y <= half.y - bubble.radius + 1e-3);
        }
    }

    #[test]
    fn test_buoyancy_and_drag() {
        let config = Preset::Fizzy.config();
        let mut bubble = Bubble::new_growing(0.0, 1);
        bubble.radius = 10.0;
        bubble.release(Vec2::new(1.0, 0.0));

        let mut position = Vec2::ZERO;
        bubble.float_step(&mut position, Vec2::new(1000.0, 1000.0), &config);
        assert!((bubble.velocity.x - 0.99).abs() < 1e-6);
        assert!((bubble.velocity.y - 0.04 * 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_hue_wraps_at_360() {
        let config = Preset::Classic.config();
        let mut bubble = Bubble::new_growing(359.5, 1);
        bubble.release(Vec2::ZERO);

        let mut position = Vec2::ZERO;
        bubble.float_step(&mut position, Vec2::new(1000.0, 1000.0), &config);
        assert!(bubble.hue >= 0.0 && bubble.hue < 360.0);
    }
}
