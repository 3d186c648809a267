//! Pointer gestures - mouse and touch, unified.
//!
//! One gesture model drives the toy:
//! - press on a free bubble pops it (and creates nothing),
//! - press on empty space starts a new growing bubble if none is growing,
//! - dragging while holding grows the bubble faster,
//! - letting go releases it with a little upward drift.
//!
//! At most one bubble grows at a time, owned by the pointer that created
//! it; other pointers can still pop.

use bevy::{input::mouse::AccumulatedMouseMotion, prelude::*, window::PrimaryWindow};
use rand::Rng;

use super::{
    bubble::{
        self, Bubble, GROWTH_STEP, GrowingBubble, Popped, RELEASE_DRIFT, RELEASE_LIFT, SpawnSeq,
    },
    textures::ToyAssets,
};
use crate::{AppSystems, PausableSystems};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<ActiveGesture>();

    app.add_systems(
        Update,
        (begin_gestures, grow_held_bubble, end_gestures)
            .chain()
            .in_set(AppSystems::RecordInput)
            .in_set(PausableSystems),
    );
}

/// A pointer that can own the growing bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pointer {
    Mouse,
    Touch(u64),
}

/// The pointer currently holding the growing bubble, if any.
#[derive(Resource, Debug, Default)]
struct ActiveGesture(Option<Pointer>);

/// Handle press starts: pop on hit, otherwise start a growing bubble.
fn begin_gestures(
    mut commands: Commands,
    mut materials: ResMut<Assets<ColorMaterial>>,
    toy_assets: Res<ToyAssets>,
    mut seq: ResMut<SpawnSeq>,
    mut growing: ResMut<GrowingBubble>,
    mut gesture: ResMut<ActiveGesture>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    bubbles: Query<(Entity, &Transform, &Bubble), Without<Popped>>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let mut presses: Vec<(Pointer, Vec2)> = Vec::new();
    if mouse.just_pressed(MouseButton::Left)
        && let Ok(window) = window_query.single()
        && let Some(position) = window.cursor_position()
    {
        presses.push((Pointer::Mouse, position));
    }
    for touch in touches.iter_just_pressed() {
        presses.push((Pointer::Touch(touch.id()), touch.position()));
    }

    for (pointer, viewport_position) in presses {
        let Ok(point) = camera.viewport_to_world_2d(camera_transform, viewport_position) else {
            continue;
        };

        // A hit pops the bubble and suppresses creation for this gesture.
        if let Some(hit) = hit_bubble(&bubbles, point) {
            commands.entity(hit).insert(Popped { overgrown: false });
            continue;
        }

        if growing.0.is_none() {
            let entity = bubble::spawn_bubble(
                &mut commands,
                &mut materials,
                &toy_assets,
                &mut seq,
                point,
            );
            growing.0 = Some(entity);
            gesture.0 = Some(pointer);
            debug!("Started growing bubble at {:?}", point);
        }
    }
}

/// Newest-first hit-test over free bubbles.
fn hit_bubble(
    bubbles: &Query<(Entity, &Transform, &Bubble), Without<Popped>>,
    point: Vec2,
) -> Option<Entity> {
    bubbles
        .iter()
        .filter(|(_, transform, bubble)| {
            bubble.is_free() && transform.translation.truncate().distance(point) <= bubble.radius
        })
        .max_by_key(|(_, _, bubble)| bubble.seq)
        .map(|(entity, _, _)| entity)
}

/// Dragging the owning pointer grows the held bubble, on top of the
/// per-tick growth.
fn grow_held_bubble(
    growing: Res<GrowingBubble>,
    gesture: Res<ActiveGesture>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    touches: Res<Touches>,
    mut bubbles: Query<&mut Bubble>,
) {
    let (Some(entity), Some(pointer)) = (growing.0, gesture.0) else {
        return;
    };

    let moved = match pointer {
        Pointer::Mouse => mouse_motion.delta != Vec2::ZERO,
        Pointer::Touch(id) => touches
            .get_pressed(id)
            .is_some_and(|touch| touch.delta() != Vec2::ZERO),
    };
    if !moved {
        return;
    }

    if let Ok(mut bubble) = bubbles.get_mut(entity) {
        bubble.grow_step(GROWTH_STEP);
    }
}

/// Handle press ends: release the held bubble into free flight.
fn end_gestures(
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    mut growing: ResMut<GrowingBubble>,
    mut gesture: ResMut<ActiveGesture>,
    mut bubbles: Query<&mut Bubble>,
) {
    let Some(pointer) = gesture.0 else {
        return;
    };

    let ended = match pointer {
        Pointer::Mouse => mouse.just_released(MouseButton::Left),
        Pointer::Touch(id) => {
            touches.iter_just_released().any(|touch| touch.id() == id)
                || touches.iter_just_canceled().any(|touch| touch.id() == id)
        }
    };
    if !ended {
        return;
    }

    if let Some(entity) = growing.0
        && let Ok(mut bubble) = bubbles.get_mut(entity)
    {
        let mut rng = rand::rng();
        bubble.release(Vec2::new(
            rng.random_range(-RELEASE_DRIFT..=RELEASE_DRIFT),
            RELEASE_LIFT,
        ));
        debug!("Released bubble at radius {:.1}", bubble.radius);
    }

    // Clear the slot even if the bubble already auto-burst, so the next
    // press can start fresh.
    growing.0 = None;
    gesture.0 = None;
}
