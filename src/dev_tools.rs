//! Development tools for the toy. This plugin is only enabled in dev builds.

use bevy::{dev_tools::states::log_transitions, prelude::*};

use crate::Pause;

pub(super) fn plugin(app: &mut App) {
    // Log `Pause` state transitions in dev builds.
    app.add_systems(Update, log_transitions::<Pause>);
}
