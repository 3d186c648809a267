//! Lifetime pop statistics, persisted across runs.
//!
//! A small JSON record in the user's data directory: how many bubbles ever
//! popped, how many burst on their own, the biggest bubble so far, and the
//! selected preset (restored on startup). Saved by an autosave timer while
//! dirty and immediately on preset changes; every I/O failure degrades to
//! defaults with a warning.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::{
    bubble::BubblePopped,
    config::{Preset, SimConfig},
};
use crate::AppSystems;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<LifetimeStats>();
    app.insert_resource(AutosaveTimer(Timer::from_seconds(
        AUTOSAVE_SECONDS,
        TimerMode::Repeating,
    )));

    app.add_systems(Startup, load_stats);
    app.add_systems(
        Update,
        (
            autosave.in_set(AppSystems::TickTimers),
            record_pops.in_set(AppSystems::Update),
            follow_preset
                .run_if(resource_changed::<SimConfig>)
                .in_set(AppSystems::Update),
        ),
    );
}

/// Seconds between autosave checks.
const AUTOSAVE_SECONDS: f32 = 30.0;

/// Resource holding the persisted lifetime statistics.
#[derive(Resource, Debug, Default, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub total_pops: u64,
    pub overgrown_pops: u64,
    pub biggest_radius: f32,
    pub preset: Preset,
    #[serde(skip)]
    dirty: bool,
}

impl LifetimeStats {
    /// Fold one pop into the record.
    pub fn record(&mut self, radius: f32, overgrown: bool) {
        self.total_pops += 1;
        if overgrown {
            self.overgrown_pops += 1;
        }
        if radius > self.biggest_radius {
            self.biggest_radius = radius;
        }
        self.dirty = true;
    }

    /// Get the file path for storing stats.
    fn file_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("bloop").join("stats.json"))
    }

    /// Load stats from disk.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for stats");
            return Self::default();
        };

        if !path.exists() {
            info!("No stats file found at {:?}, starting fresh", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(stats) => {
                    info!("Loaded stats from {:?}", path);
                    stats
                }
                Err(e) => {
                    warn!("Failed to parse stats: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read stats file: {}", e);
                Self::default()
            }
        }
    }

    /// Save stats to disk.
    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine data directory for saving stats");
            return;
        };

        if let Some(parent) = path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!("Failed to create stats directory: {}", e);
            return;
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(&path, json) {
                Ok(()) => debug!("Saved stats to {:?}", path),
                Err(e) => warn!("Failed to write stats: {}", e),
            },
            Err(e) => warn!("Failed to serialize stats: {}", e),
        }
    }
}

/// Autosave ticker.
#[derive(Resource)]
struct AutosaveTimer(Timer);

/// Load stats on startup and restore the persisted preset.
fn load_stats(mut stats: ResMut<LifetimeStats>, mut config: ResMut<SimConfig>) {
    *stats = LifetimeStats::load();
    if config.preset != stats.preset {
        *config = stats.preset.config();
        info!("Restored preset {:?}", stats.preset);
    }
}

/// Fold burst messages into the record.
fn record_pops(mut stats: ResMut<LifetimeStats>, mut popped: MessageReader<BubblePopped>) {
    for message in popped.read() {
        stats.record(message.radius, message.overgrown);
    }
}

/// Track preset switches and save them right away.
fn follow_preset(mut stats: ResMut<LifetimeStats>, config: Res<SimConfig>) {
    if stats.preset != config.preset {
        stats.preset = config.preset;
        stats.save();
        stats.dirty = false;
    }
}

/// Flush dirty stats on a fixed cadence.
fn autosave(
    time: Res<Time>,
    mut timer: ResMut<AutosaveTimer>,
    mut stats: ResMut<LifetimeStats>,
) {
    if timer.0.tick(time.delta()).just_finished() && stats.dirty {
        stats.save();
        stats.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_pops() {
        let mut stats = LifetimeStats::default();
        stats.record(12.0, false);
        stats.record(80.0, true);
        stats.record(30.0, false);

        assert_eq!(stats.total_pops, 3);
        assert_eq!(stats.overgrown_pops, 1);
        assert_eq!(stats.biggest_radius, 80.0);
    }

    #[test]
    fn test_record_keeps_biggest_radius() {
        let mut stats = LifetimeStats::default();
        stats.record(50.0, false);
        stats.record(10.0, false);
        assert_eq!(stats.biggest_radius, 50.0);
    }
}
