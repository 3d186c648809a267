//! Ripple rings - the expanding, fading circles a popped bubble leaves
//! behind.
//!
//! Every pop spawns three rings at the same spot with staggered start
//! delays, so the burst reads as a splash instead of a single ring.

use bevy::prelude::*;

use super::{SimStep, textures::ToyAssets};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Ripple>();
    app.add_systems(FixedUpdate, advance_ripples.in_set(SimStep::Ripples));
}

/// Radius gained per tick once a ripple is running.
const RIPPLE_GROWTH: f32 = 3.0;

/// Alpha lost per tick once a ripple is running.
const RIPPLE_FADE: f32 = 0.01;

/// Start delays (in ticks) for the three rings of one burst.
const RIPPLE_DELAYS: [u32; 3] = [0, 15, 30];

/// Saturation and lightness of ripple strokes.
const STROKE_SATURATION: f32 = 0.7;
const STROKE_LIGHTNESS: f32 = 0.65;

/// One expanding ring.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Ripple {
    pub radius: f32,
    pub growth: f32,
    pub fade: f32,
    pub alpha: f32,
    pub hue: f32,
    /// Ticks left before the ring starts growing and fading.
    pub delay: u32,
}

impl Ripple {
    fn new(hue: f32, delay: u32) -> Self {
        Self {
            radius: 0.0,
            growth: RIPPLE_GROWTH,
            fade: RIPPLE_FADE,
            alpha: 1.0,
            hue,
            delay,
        }
    }

    /// One tick. While the delay runs, nothing moves; afterwards the ring
    /// grows and fades. Returns true once fully faded.
    pub fn advance(&mut self) -> bool {
        if self.delay > 0 {
            self.delay -= 1;
            return false;
        }
        self.radius += self.growth;
        self.alpha -= self.fade;
        self.alpha <= 0.0
    }

    /// Whether the ring has started (and should be drawn).
    pub fn visible(&self) -> bool {
        self.delay == 0
    }

    fn stroke(&self) -> Color {
        Color::hsla(self.hue, STROKE_SATURATION, STROKE_LIGHTNESS, self.alpha)
    }
}

/// The three rings of one pop.
fn burst(hue: f32) -> [Ripple; 3] {
    RIPPLE_DELAYS.map(|delay| Ripple::new(hue, delay))
}

/// Spawn the three staggered rings for a pop at `position`.
pub(super) fn spawn_burst(
    commands: &mut Commands,
    materials: &mut Assets<ColorMaterial>,
    toy_assets: &ToyAssets,
    position: Vec2,
    hue: f32,
) {
    for ripple in burst(hue) {
        let visibility = if ripple.visible() {
            Visibility::default()
        } else {
            Visibility::Hidden
        };
        let material = materials.add(ColorMaterial::from_color(ripple.stroke()));
        commands.spawn((
            Name::new("Ripple"),
            ripple,
            Mesh2d(toy_assets.ring.clone()),
            MeshMaterial2d(material),
            // Behind bubbles, in front of the background.
            Transform::from_translation(position.extend(-1.0)).with_scale(Vec3::splat(0.01)),
            visibility,
        ));
    }
}

/// Advance every ripple one tick, prune the finished ones and sync the
/// survivors' rings.
fn advance_ripples(
    mut commands: Commands,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut ripples: Query<(
        Entity,
        &mut Ripple,
        &mut Transform,
        &mut Visibility,
        &MeshMaterial2d<ColorMaterial>,
    )>,
) {
    for (entity, mut ripple, mut transform, mut visibility, material) in &mut ripples {
        if ripple.advance() {
            commands.entity(entity).despawn();
            continue;
        }
        *visibility = if ripple.visible() {
            Visibility::default()
        } else {
            Visibility::Hidden
        };
        transform.scale = Vec3::splat(ripple.radius.max(0.01));
        if let Some(material) = materials.get_mut(&material.0) {
            material.color = ripple.stroke();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_holds_alpha_and_radius() {
        let mut ripple = Ripple::new(200.0, 2);
        assert!(!ripple.visible());

        assert!(!ripple.advance());
        assert_eq!(ripple.alpha, 1.0);
        assert_eq!(ripple.radius, 0.0);
        assert_eq!(ripple.delay, 1);

        assert!(!ripple.advance());
        assert!(ripple.visible());
    }

    #[test]
    fn test_fade_is_exact_per_tick() {
        let mut ripple = Ripple::new(10.0, 0);
        assert!(!ripple.advance());
        assert_eq!(ripple.radius, RIPPLE_GROWTH);
        assert!((ripple.alpha - (1.0 - RIPPLE_FADE)).abs() < 1e-6);

        assert!(!ripple.advance());
        assert!((ripple.alpha - (1.0 - 2.0 * RIPPLE_FADE)).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_monotonic_until_done() {
        let mut ripple = Ripple::new(0.0, 15);
        let mut previous = ripple.alpha;
        let mut ticks = 0;
        loop {
            let done = ripple.advance();
            assert!(ripple.alpha <= previous);
            previous = ripple.alpha;
            ticks += 1;
            assert!(ticks < 1000, "ripple never finished");
            if done {
                break;
            }
        }
        // 15 delay ticks plus roughly 1/fade ticks of life; f32 rounding
        // may add one tick.
        assert!((115..=116).contains(&ticks), "lived {} ticks", ticks);
    }

    #[test]
    fn test_burst_is_three_staggered_rings() {
        let rings = burst(123.0);
        let delays: Vec<u32> = rings.iter().map(|r| r.delay).collect();
        assert_eq!(delays, vec![0, 15, 30]);
        for ring in &rings {
            assert_eq!(ring.hue, 123.0);
            assert_eq!(ring.radius, 0.0);
            assert_eq!(ring.alpha, 1.0);
            assert_eq!(ring.growth, RIPPLE_GROWTH);
            assert_eq!(ring.fade, RIPPLE_FADE);
        }
    }
}
