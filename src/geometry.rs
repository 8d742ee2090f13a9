//! Raster geometry and transform math.
//!
//! The emulator writes a 418x284 frame into the top-left corner of a 512x512
//! backing texture. Only a sub-rectangle of that texture is meant to be seen:
//! the visible canvas plus a slice of border whose width depends on the
//! timing standard. [`VisibleRegion`] is that rectangle, normalized against
//! the backing store, and feeds the UV coordinates of every display quad.

use glam::{Mat4, Vec3};

use crate::source::TimingStandard;

/// Side length of the square backing texture the raw frame lives in.
pub const TEXTURE_SIZE: u32 = 512;
/// Side length of the upscaled and filtered textures (always exactly 2x).
pub const UPSCALED_SIZE: u32 = 2 * TEXTURE_SIZE;

/// Visible canvas dimensions, identical for both standards.
const CANVAS_WIDTH: u32 = 320;
const CANVAS_HEIGHT: u32 = 200;

// Offsets of the canvas inside the raw frame.
const PAL_LEFT_BORDER_WIDTH: u32 = 48;
const PAL_UPPER_BORDER_HEIGHT: u32 = 42;
const NTSC_LEFT_BORDER_WIDTH: u32 = 49;
const NTSC_UPPER_BORDER_HEIGHT: u32 = 14;

// How much border to keep visible around the canvas.
const PAL_VISIBLE_BORDER_H: u32 = 36;
const PAL_VISIBLE_BORDER_V: u32 = 34;
const NTSC_VISIBLE_BORDER_H: u32 = 42;
const NTSC_VISIBLE_BORDER_V: u32 = 9;

/// Normalized sub-rectangle of the backing texture to sample for display.
///
/// Invariant: contained in the unit square. Recomputed only when the timing
/// standard changes, and bit-for-bit reproducible for a given standard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl VisibleRegion {
    pub fn for_standard(standard: TimingStandard) -> Self {
        let (left, upper, border_h, border_v) = match standard {
            TimingStandard::Pal => (
                PAL_LEFT_BORDER_WIDTH,
                PAL_UPPER_BORDER_HEIGHT,
                PAL_VISIBLE_BORDER_H,
                PAL_VISIBLE_BORDER_V,
            ),
            TimingStandard::Ntsc => (
                NTSC_LEFT_BORDER_WIDTH,
                NTSC_UPPER_BORDER_HEIGHT,
                NTSC_VISIBLE_BORDER_H,
                NTSC_VISIBLE_BORDER_V,
            ),
        };
        let size = TEXTURE_SIZE as f32;
        Self {
            x: (left - border_h) as f32 / size,
            y: (upper - border_v) as f32 / size,
            width: (CANVAS_WIDTH + 2 * border_h) as f32 / size,
            height: (CANVAS_HEIGHT + 2 * border_v) as f32 / size,
        }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Aspect ratio of the visible area in texels.
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Cached transform matrices for the three draw paths. Rebuilt when the
/// drawable size changes or while the animation is in motion.
#[derive(Debug, Clone, Copy)]
pub struct Transforms {
    pub flat_2d: Mat4,
    pub cuboid: Mat4,
    pub background: Mat4,
}

/// Eye position and rotation state consumed by [`Transforms::build`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraPose {
    pub angle_x: f32,
    pub angle_y: f32,
    pub angle_z: f32,
    pub eye_x: f32,
    pub eye_y: f32,
    pub eye_z: f32,
}

impl Transforms {
    pub fn build(drawable_width: u32, drawable_height: u32, pose: &CameraPose) -> Self {
        let aspect = drawable_width.max(1) as f32 / drawable_height.max(1) as f32;
        let proj = Mat4::perspective_rh(65.0_f32.to_radians(), aspect, 0.1, 100.0);

        // The 2D path draws a quad already laid out in clip space.
        let flat_2d = Mat4::IDENTITY;

        let view = Mat4::from_translation(Vec3::new(
            -pose.eye_x,
            -pose.eye_y,
            -(pose.eye_z + 1.39),
        ));
        let model = Mat4::from_rotation_x(pose.angle_x.to_radians())
            * Mat4::from_rotation_y(pose.angle_y.to_radians())
            * Mat4::from_rotation_z(pose.angle_z.to_radians());
        let cuboid = proj * view * model;

        // Background plane sits behind the deepest cuboid position and fills
        // the frustum at that depth.
        let bg_distance = 6.8_f32;
        let bg_half_h = bg_distance * (65.0_f32.to_radians() / 2.0).tan();
        let bg_half_w = bg_half_h * aspect;
        let background = proj
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -bg_distance))
            * Mat4::from_scale(Vec3::new(bg_half_w, bg_half_h, 1.0));

        Self {
            flat_2d,
            cuboid,
            background,
        }
    }
}
