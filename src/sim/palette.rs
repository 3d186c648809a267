use bevy::prelude::*;

/// Night-sky blue at the top of the background gradient
pub const BACKGROUND_TOP: Color = Color::srgb(0.05, 0.08, 0.18);

/// Near-black at the bottom of the background gradient
pub const BACKGROUND_BOTTOM: Color = Color::srgb(0.01, 0.02, 0.06);

/// Thin outline around each bubble
pub const BUBBLE_RIM: Color = Color::srgba(1.0, 1.0, 1.0, 0.35);

/// Glimmer highlight inside each bubble
pub const BUBBLE_HIGHLIGHT: Color = Color::srgba(1.0, 1.0, 1.0, 0.55);
