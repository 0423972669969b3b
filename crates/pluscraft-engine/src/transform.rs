use std::f32::consts::PI;

use glam::{Mat4, Vec3};

/// Perspective projection tracking the swapchain aspect ratio.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
}

impl Projection {
    pub const FOV_Y: f32 = PI / 4.0;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 100.0;

    pub fn new(width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_y: Self::FOV_Y,
            near: Self::NEAR,
            far: Self::FAR,
            aspect: 1.0,
        };
        projection.set_size(width, height);
        projection
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Updates the aspect ratio. Zero-sized targets leave it unchanged and
    /// return `false`.
    pub fn set_size(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    /// Right-handed, depth mapped to `0..1`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Model rotation plus fixed translation at `elapsed` seconds.
pub fn model_at(elapsed: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0))
        * Mat4::from_rotation_y(elapsed)
        * Mat4::from_rotation_x(-PI * 0.1)
}

/// Per-frame transform inputs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformState {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,
}

impl TransformState {
    pub fn at(elapsed: f32, projection: &Projection) -> Self {
        Self {
            projection: projection.matrix(),
            view: Mat4::IDENTITY,
            model: model_at(elapsed),
        }
    }

    pub fn world_view_proj(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn zero_size_keeps_aspect() {
        let mut p = Projection::new(800, 600);
        assert!(!p.set_size(0, 600));
        assert!(approx(p.aspect(), 800.0 / 600.0));
        assert!(p.set_size(1920, 1080));
        assert!(approx(p.aspect(), 1920.0 / 1080.0));
    }

    #[test]
    fn degenerate_initial_size_defaults_to_square() {
        assert_eq!(Projection::new(0, 0).aspect(), 1.0);
    }

    #[test]
    fn model_origin_lands_in_front_of_camera() {
        let state = TransformState::at(1.3, &Projection::new(1280, 720));
        let clip = state.world_view_proj() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc_z = clip.z / clip.w;

        assert!(clip.w > 0.0);
        assert!(approx(clip.x, 0.0) && approx(clip.y, 0.0));
        assert!((0.0..1.0).contains(&ndc_z));
    }

    #[test]
    fn rotation_is_periodic() {
        let a = model_at(0.5);
        let b = model_at(0.5 + 2.0 * PI);
        assert!(a.abs_diff_eq(b, 1e-4));
    }
}
