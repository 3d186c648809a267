//! Debug visualization for the simulation.
//!
//! Toggle with the 'D' key.
//! Shows:
//! - The playfield walls
//! - Each bubble's collision circle and velocity
//! - The currently growing bubble

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    Playfield,
    bubble::{Bubble, GrowingBubble},
};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugOverlayVisible>();

    // Toggle debug with 'D' key
    app.add_systems(Update, toggle_overlay.run_if(input_just_pressed(KeyCode::KeyD)));
    app.add_systems(Update, draw_overlay.run_if(overlay_visible));
}

/// How many ticks of travel one velocity line covers.
const VELOCITY_SCALE: f32 = 10.0;

/// Resource to track if the debug overlay is visible.
#[derive(Resource, Default)]
pub struct DebugOverlayVisible(pub bool);

fn overlay_visible(visible: Res<DebugOverlayVisible>) -> bool {
    visible.0
}

fn toggle_overlay(mut visible: ResMut<DebugOverlayVisible>) {
    visible.0 = !visible.0;
    let state = if visible.0 { "ON" } else { "OFF" };
    info!("Debug overlay: {}", state);
}

/// Draw the overlay using Bevy's Gizmos.
fn draw_overlay(
    mut gizmos: Gizmos,
    playfield: Res<Playfield>,
    growing: Res<GrowingBubble>,
    bubbles: Query<(Entity, &Transform, &Bubble)>,
) {
    // Playfield walls
    gizmos.rect_2d(
        Isometry2d::from_translation(Vec2::ZERO),
        playfield.half * 2.0,
        css::ORANGE.with_alpha(0.8),
    );

    for (entity, transform, bubble) in &bubbles {
        let position = transform.translation.truncate();

        // Collision circle
        let circle_color = if bubble.is_free() {
            css::WHITE.with_alpha(0.25)
        } else {
            css::GOLD.with_alpha(0.6)
        };
        gizmos.circle_2d(position, bubble.radius, circle_color);

        // Velocity
        if bubble.is_free() {
            gizmos.line_2d(
                position,
                position + bubble.velocity * VELOCITY_SCALE,
                css::AQUA.with_alpha(0.8),
            );
        }

        // Growing slot marker
        if growing.0 == Some(entity) {
            gizmos.circle_2d(position, bubble.radius + 4.0, css::LIMEGREEN.with_alpha(0.7));
        }
    }
}
