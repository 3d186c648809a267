//! Pairwise bubble collisions.
//!
//! A single pass over every unordered pair of free bubbles: overlapping
//! pairs are pushed apart symmetrically until they exactly touch, then an
//! equal-mass impulse is exchanged along the contact normal. Pairs are
//! visited once per tick, so simultaneous multi-body overlaps resolve
//! approximately - good enough for a toy, not for a rigid-body engine.

use bevy::prelude::*;

use super::{
    SimStep,
    bubble::{Bubble, Popped},
    config::{self, SimConfig},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        resolve_bubble_collisions
            .in_set(SimStep::Collide)
            .run_if(config::pair_collisions_enabled),
    );
}

/// Resolve one pair. Returns true if the pair was in contact.
///
/// Concentric pairs (distance zero) are skipped: there is no usable normal.
pub fn resolve_pair(
    position_a: &mut Vec2,
    velocity_a: &mut Vec2,
    radius_a: f32,
    position_b: &mut Vec2,
    velocity_b: &mut Vec2,
    radius_b: f32,
    restitution: f32,
) -> bool {
    let delta = *position_b - *position_a;
    let distance = delta.length();
    let reach = radius_a + radius_b;
    if distance <= 0.0 || distance >= reach {
        return false;
    }
    let normal = delta / distance;

    // Push both out half the overlap so they exactly touch.
    let half_overlap = (reach - distance) / 2.0;
    *position_a -= normal * half_overlap;
    *position_b += normal * half_overlap;

    // Already separating: leave the velocities alone.
    let closing = (*velocity_b - *velocity_a).dot(normal);
    if closing > 0.0 {
        return true;
    }

    // Equal masses: each side takes half of the (1 + e) exchange.
    let impulse = -(1.0 + restitution) / 2.0 * closing;
    *velocity_a -= normal * impulse;
    *velocity_b += normal * impulse;
    true
}

/// One pass over all free bubble pairs, in query order.
fn resolve_bubble_collisions(
    config: Res<SimConfig>,
    mut bubbles: Query<(&mut Transform, &mut Bubble), Without<Popped>>,
) {
    let Some(restitution) = config.pair_restitution else {
        return;
    };

    let mut pairs = bubbles.iter_combinations_mut();
    while let Some([(mut transform_a, mut a), (mut transform_b, mut b)]) = pairs.fetch_next() {
        if !a.is_free() || !b.is_free() {
            continue;
        }

        let mut position_a = transform_a.translation.truncate();
        let mut position_b = transform_b.translation.truncate();
        let mut velocity_a = a.velocity;
        let mut velocity_b = b.velocity;

        if resolve_pair(
            &mut position_a,
            &mut velocity_a,
            a.radius,
            &mut position_b,
            &mut velocity_b,
            b.radius,
            restitution,
        ) {
            transform_a.translation = position_a.extend(transform_a.translation.z);
            transform_b.translation = position_b.extend(transform_b.translation.z);
            a.velocity = velocity_a;
            b.velocity = velocity_b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_on_pair_ends_exactly_touching() {
        // Two radius-20 bubbles 30 apart, approaching head-on.
        let mut pa = Vec2::new(0.0, 0.0);
        let mut pb = Vec2::new(30.0, 0.0);
        let mut va = Vec2::new(2.0, 0.0);
        let mut vb = Vec2::new(-2.0, 0.0);

        assert!(resolve_pair(
            &mut pa, &mut va, 20.0, &mut pb, &mut vb, 20.0, 0.9
        ));

        // Centers end exactly one reach apart, still on the x axis.
        assert!((pa.distance(pb) - 40.0).abs() < 1e-4);
        assert_eq!(pa.y, 0.0);
        assert_eq!(pb.y, 0.0);
        assert_eq!(pa.x, -5.0);
        assert_eq!(pb.x, 35.0);
    }

    #[test]
    fn test_impulse_flips_and_scales_closing_velocity() {
        let mut pa = Vec2::new(0.0, 0.0);
        let mut pb = Vec2::new(30.0, 0.0);
        let mut va = Vec2::new(2.0, 0.0);
        let mut vb = Vec2::new(-2.0, 0.0);
        let restitution = 0.9;

        let closing_before = (vb - va).dot(Vec2::X);
        resolve_pair(&mut pa, &mut va, 20.0, &mut pb, &mut vb, 20.0, restitution);
        let closing_after = (vb - va).dot(Vec2::X);

        // Approaching became separating, scaled by the restitution.
        assert!(closing_before < 0.0);
        assert!((closing_after + restitution * closing_before).abs() < 1e-5);
    }

    #[test]
    fn test_separating_pair_gets_no_impulse() {
        let mut pa = Vec2::new(0.0, 0.0);
        let mut pb = Vec2::new(30.0, 0.0);
        let mut va = Vec2::new(-1.0, 0.0);
        let mut vb = Vec2::new(1.0, 0.0);

        assert!(resolve_pair(
            &mut pa, &mut va, 20.0, &mut pb, &mut vb, 20.0, 0.9
        ));

        // Separated to touching, velocities untouched.
        assert!((pa.distance(pb) - 40.0).abs() < 1e-4);
        assert_eq!(va, Vec2::new(-1.0, 0.0));
        assert_eq!(vb, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_non_overlapping_pair_is_skipped() {
        let mut pa = Vec2::new(0.0, 0.0);
        let mut pb = Vec2::new(40.0, 0.0);
        let mut va = Vec2::new(5.0, 0.0);
        let mut vb = Vec2::new(-5.0, 0.0);

        // Exactly touching counts as no overlap.
        assert!(!resolve_pair(
            &mut pa, &mut va, 20.0, &mut pb, &mut vb, 20.0, 0.9
        ));
        assert_eq!(pa, Vec2::ZERO);
        assert_eq!(va, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_concentric_pair_is_skipped() {
        let mut pa = Vec2::new(10.0, 10.0);
        let mut pb = Vec2::new(10.0, 10.0);
        let mut va = Vec2::ZERO;
        let mut vb = Vec2::ZERO;

        assert!(!resolve_pair(
            &mut pa, &mut va, 20.0, &mut pb, &mut vb, 20.0, 0.9
        ));
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_oblique_pair_separates_along_normal() {
        let mut pa = Vec2::new(0.0, 0.0);
        let mut pb = Vec2::new(9.0, 12.0); // distance 15, reach 20
        let mut va = Vec2::ZERO;
        let mut vb = Vec2::ZERO;

        assert!(resolve_pair(
            &mut pa, &mut va, 10.0, &mut pb, &mut vb, 10.0, 0.5
        ));
        assert!((pa.distance(pb) - 20.0).abs() < 1e-4);

        // Still on the original connecting line through the origin.
        let direction = (pb - pa).normalize();
        assert!((direction - Vec2::new(9.0, 12.0).normalize()).length() < 1e-5);
    }
}
