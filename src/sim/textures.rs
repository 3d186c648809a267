//! Procedurally generated textures and shared meshes.
//!
//! The toy ships no asset files: the bubble glow, the glimmer highlight and
//! the background gradient are all rendered into small images at startup,
//! and the ring mesh used by outlines and ripples is a shared unit annulus.

use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};

use super::palette;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, generate_toy_assets);
}

/// Handles for everything the toy draws with.
#[derive(Resource)]
pub struct ToyAssets {
    /// Radial glow, white with alpha falling off to the rim. Tinted per
    /// bubble via the sprite color.
    pub glow: Handle<Image>,
    /// Small soft white blob for the glimmer highlight.
    pub highlight: Handle<Image>,
    /// Vertical background gradient, stretched over the whole window.
    pub background: Handle<Image>,
    /// Unit-radius ring, scaled per entity. Shared by bubble outlines and
    /// ripples.
    pub ring: Handle<Mesh>,
}

/// Side length of the bubble glow texture in pixels.
const GLOW_SIZE: u32 = 64;

/// Side length of the highlight texture in pixels.
const HIGHLIGHT_SIZE: u32 = 32;

/// Number of rows in the 1px-wide background gradient strip.
const GRADIENT_STEPS: u32 = 256;

/// Build all textures and meshes once at startup.
pub(super) fn generate_toy_assets(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    commands.insert_resource(ToyAssets {
        glow: images.add(radial_glow_image(GLOW_SIZE)),
        highlight: images.add(highlight_image(HIGHLIGHT_SIZE)),
        background: images.add(vertical_gradient_image(
            palette::BACKGROUND_TOP,
            palette::BACKGROUND_BOTTOM,
        )),
        ring: meshes.add(Annulus::new(0.94, 1.0)),
    });
    info!("Generated toy textures");
}

/// Radial falloff: bright near the center, transparent at the rim.
///
/// Luminance drops toward the rim as well, so a hue tint reads as a bright
/// center fading into a darker, more transparent edge.
fn radial_glow_image(size: u32) -> Image {
    grayscale_image(size, |t| {
        let v = (1.0 - t).clamp(0.0, 1.0);
        let alpha = v * v * (3.0 - 2.0 * v);
        let luminance = 0.4 + 0.6 * v;
        (luminance, alpha * 0.9)
    })
}

/// Tight soft blob used for the glimmer highlight.
fn highlight_image(size: u32) -> Image {
    grayscale_image(size, |t| {
        let v = (1.0 - t * 1.6).clamp(0.0, 1.0);
        (1.0, v * v)
    })
}

/// Square grayscale+alpha image where `shade(t)` maps the normalized
/// distance from the center (0 at center, 1 at the inscribed circle) to
/// (luminance, alpha).
fn grayscale_image(size: u32, shade: impl Fn(f32) -> (f32, f32)) -> Image {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    let center = (size as f32 - 1.0) / 2.0;
    let radius = size as f32 / 2.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let t = (dx * dx + dy * dy).sqrt() / radius;
            let (luminance, alpha) = shade(t);
            let l = (luminance.clamp(0.0, 1.0) * 255.0) as u8;
            data.extend_from_slice(&[l, l, l, (alpha.clamp(0.0, 1.0) * 255.0) as u8]);
        }
    }

    Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

/// A 1px-wide vertical strip blending `top` into `bottom`, stretched by the
/// background sprite.
fn vertical_gradient_image(top: Color, bottom: Color) -> Image {
    let top = top.to_srgba();
    let bottom = bottom.to_srgba();
    let mut data = Vec::with_capacity((GRADIENT_STEPS * 4) as usize);

    for row in 0..GRADIENT_STEPS {
        let t = row as f32 / (GRADIENT_STEPS - 1) as f32;
        let c = top.mix(&bottom, t);
        data.extend_from_slice(&[
            (c.red * 255.0) as u8,
            (c.green * 255.0) as u8,
            (c.blue * 255.0) as u8,
            255,
        ]);
    }

    Image::new(
        Extent3d {
            width: 1,
            height: GRADIENT_STEPS,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}
