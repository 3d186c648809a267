//! Named simulation presets.
//!
//! The toy ships two tunings that differ in more than numbers: `Classic`
//! bounces perfectly elastically and ignores bubble-bubble contact, while
//! `Fizzy` caps bubbles smaller, bleeds energy on every bounce and resolves
//! pairwise collisions. They are deliberately kept as separate presets
//! instead of one merged behavior.

use bevy::{input::common_conditions::input_just_pressed, prelude::*};
use serde::{Deserialize, Serialize};

use crate::PausableSystems;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<SimConfig>();
    app.insert_resource(Preset::default().config());

    app.add_systems(
        Update,
        cycle_preset
            .run_if(input_just_pressed(KeyCode::Tab))
            .in_set(crate::AppSystems::RecordInput)
            .in_set(PausableSystems),
    );
}

/// The two supported tunings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum Preset {
    /// Big bubbles, perfectly elastic walls, no bubble-bubble contact.
    #[default]
    Classic,
    /// Smaller bubbles that rise, slow down and jostle each other.
    Fizzy,
}

impl Preset {
    /// Build the full tuning for this preset.
    pub fn config(self) -> SimConfig {
        match self {
            Preset::Classic => SimConfig {
                preset: self,
                max_radius: 150.0,
                bounce: BouncePolicy::Elastic,
                buoyancy: 0.0,
                drag: 1.0,
                pair_restitution: None,
            },
            Preset::Fizzy => SimConfig {
                preset: self,
                max_radius: 80.0,
                bounce: BouncePolicy::Clamped { restitution: 0.85 },
                buoyancy: 0.04,
                drag: 0.99,
                pair_restitution: Some(0.9),
            },
        }
    }

    /// The preset after this one in the Tab cycle.
    pub fn next(self) -> Self {
        match self {
            Preset::Classic => Preset::Fizzy,
            Preset::Fizzy => Preset::Classic,
        }
    }
}

/// How a bubble reacts to crossing a playfield boundary.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum BouncePolicy {
    /// Redirect the velocity inward, full speed, no positional correction.
    /// Transient overshoot past the wall is allowed.
    Elastic,
    /// Clamp the position fully in bounds and redirect the velocity inward
    /// scaled by `restitution`, so energy bleeds off over repeated bounces.
    Clamped { restitution: f32 },
}

/// The active tuning, consulted by the bubble and collision systems every
/// tick. Replaced wholesale when the preset changes; live entities are
/// never reset.
#[derive(Resource, Debug, Clone, Copy, Reflect)]
#[reflect(Resource)]
pub struct SimConfig {
    pub preset: Preset,
    /// Radius at which a growing bubble auto-bursts.
    pub max_radius: f32,
    pub bounce: BouncePolicy,
    /// Upward acceleration per tick while free.
    pub buoyancy: f32,
    /// Multiplicative velocity damping per tick while free (1.0 = none).
    pub drag: f32,
    /// Restitution for bubble-bubble collisions; `None` disables the
    /// pairwise pass entirely.
    pub pair_restitution: Option<f32>,
}

/// Run condition: the active preset resolves bubble-bubble collisions.
pub(super) fn pair_collisions_enabled(config: Res<SimConfig>) -> bool {
    config.pair_restitution.is_some()
}

/// Swap to the next preset.
fn cycle_preset(mut config: ResMut<SimConfig>) {
    let next = config.preset.next();
    *config = next.config();
    info!("Switched to preset {:?}", next);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_values() {
        let config = Preset::Classic.config();
        assert_eq!(config.max_radius, 150.0);
        assert_eq!(config.bounce, BouncePolicy::Elastic);
        assert_eq!(config.buoyancy, 0.0);
        assert_eq!(config.drag, 1.0);
        assert!(config.pair_restitution.is_none());
    }

    #[test]
    fn test_fizzy_values() {
        let config = Preset::Fizzy.config();
        assert_eq!(config.max_radius, 80.0);
        assert_eq!(config.bounce, BouncePolicy::Clamped { restitution: 0.85 });
        assert_eq!(config.buoyancy, 0.04);
        assert_eq!(config.drag, 0.99);
        assert_eq!(config.pair_restitution, Some(0.9));
    }

    #[test]
    fn test_presets_cycle() {
        let start = Preset::Classic;
        assert_eq!(start.next().next(), start);
    }
}
