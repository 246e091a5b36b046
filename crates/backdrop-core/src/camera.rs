//! Perspective camera and the orbit controller that drives it.
//!
//! The controller keeps the eye on a sphere around a target. Its azimuth is
//! fed by two sources: an autonomous spin and pointer drags. While a drag is
//! active the spin is suspended; it picks up again once the drag ends.

use crate::constants::*;
use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const POLAR_EPS: f32 = 1e-6;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect.max(1e-6), self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub auto_rotate: bool,
    /// Orbits per minute; 2.0 is one orbit every 30 s.
    pub auto_rotate_speed: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: CAMERA_POSITION,
            target: Vec3::ZERO,
            fov_degrees: CAMERA_FOV_DEG,
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
            auto_rotate: true,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
            min_polar_angle: MIN_POLAR_ANGLE,
            max_polar_angle: MAX_POLAR_ANGLE,
            enable_rotate: true,
            enable_zoom: false,
            enable_pan: false,
            enable_damping: true,
            damping_factor: DAMPING_FACTOR,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

impl CameraConfig {
    /// Autonomous azimuth rate in radians per second.
    pub fn auto_rotate_rate(&self) -> f32 {
        TAU / 60.0 * self.auto_rotate_speed
    }

    fn polar_range(&self) -> (f32, f32) {
        let lo = self.min_polar_angle.max(POLAR_EPS);
        let hi = self.max_polar_angle.min(PI - POLAR_EPS);
        if lo <= hi {
            (lo, hi)
        } else {
            (hi, lo)
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrbitController {
    config: CameraConfig,
    target: Vec3,
    azimuth: f32,
    polar: f32,
    distance: f32,
    // (azimuth, polar) rotation waiting to be applied by `update`
    pending: Vec2,
    dragging: bool,
    aspect: f32,
}

impl OrbitController {
    pub fn new(config: CameraConfig) -> Self {
        let offset = config.position - config.target;
        let distance = offset.length();
        let (azimuth, polar) = if distance > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / distance).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };
        let (lo, hi) = config.polar_range();
        Self {
            target: config.target,
            azimuth,
            polar: polar.clamp(lo, hi),
            distance,
            pending: Vec2::ZERO,
            dragging: false,
            aspect: 1.0,
            config,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }
    pub fn polar(&self) -> f32 {
        self.polar
    }
    pub fn distance(&self) -> f32 {
        self.distance
    }
    pub fn target(&self) -> Vec3 {
        self.target
    }
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn begin_drag(&mut self) {
        if self.config.enable_rotate {
            self.dragging = true;
        }
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Pointer movement in pixels while dragging; a full viewport height of
    /// travel is one full turn.
    pub fn drag(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.dragging || !(viewport_height > 0.0) || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        let k = TAU * self.config.rotate_speed / viewport_height;
        self.pending.x -= k * dx;
        self.pending.y -= k * dy;
        if !self.config.enable_damping {
            self.apply_pending(1.0);
        }
    }

    /// Wheel steps: positive moves closer, negative moves away.
    pub fn zoom(&mut self, steps: f32) {
        if !self.config.enable_zoom || steps == 0.0 || !steps.is_finite() {
            return;
        }
        let scale = ZOOM_STEP_BASE.powf(self.config.zoom_speed * steps.abs());
        let d = if steps > 0.0 {
            self.distance * scale
        } else {
            self.distance / scale
        };
        self.distance = d.clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Screen-space pan in pixels; moves the target in the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.config.enable_pan || !(viewport_height > 0.0) {
            return;
        }
        let half_fov = self.config.fov_degrees.to_radians() * 0.5;
        let world_per_px = 2.0 * self.distance * half_fov.tan() / viewport_height;
        let view = self.camera().view_matrix().inverse();
        let right = view.x_axis.truncate();
        let up = view.y_axis.truncate();
        self.target += -right * dx * world_per_px + up * dy * world_per_px;
    }

    /// Advance by `dt` seconds: accrue autonomous spin (unless dragging),
    /// apply pending rotation and clamp the polar angle.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if self.config.auto_rotate && !self.dragging {
            self.pending.x -= self.config.auto_rotate_rate() * dt;
        }
        let fraction = if self.config.enable_damping {
            let keep = (1.0 - self.config.damping_factor.clamp(0.0, 1.0))
                .powf(DAMPING_REFERENCE_HZ * dt);
            1.0 - keep
        } else {
            1.0
        };
        self.apply_pending(fraction);
    }

    fn apply_pending(&mut self, fraction: f32) {
        let step = self.pending * fraction;
        self.pending -= step;
        self.azimuth = (self.azimuth + step.x + PI).rem_euclid(TAU) - PI;
        let (lo, hi) = self.config.polar_range();
        self.polar = (self.polar + step.y).clamp(lo, hi);
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        self.target
            + Vec3::new(
                self.distance * sin_p * sin_a,
                self.distance * cos_p,
                self.distance * sin_p * cos_a,
            )
    }

    pub fn camera(&self) -> Camera {
        Camera {
            eye: self.eye(),
            target: self.target,
            up: Vec3::Y,
            aspect: self.aspect,
            fovy_radians: self.config.fov_degrees.to_radians(),
            znear: self.config.znear,
            zfar: self.config.zfar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undamped() -> OrbitController {
        OrbitController::new(CameraConfig {
            enable_damping: false,
            ..Default::default()
        })
    }

    #[test]
    fn starts_at_configured_position() {
        let c = OrbitController::new(CameraConfig::default());
        assert!((c.eye() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
        assert!((c.distance() - 10.0).abs() < 1e-6);
        assert!((c.polar() - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn auto_rotation_is_time_based() {
        let mut a = undamped();
        let mut b = undamped();
        a.update(1.0);
        for _ in 0..60 {
            b.update(1.0 / 60.0);
        }
        let expected = -TAU / 60.0 * 0.5;
        assert!((a.azimuth() - expected).abs() < 1e-5);
        assert!((b.azimuth() - expected).abs() < 1e-4);
    }

    #[test]
    fn drag_suspends_then_resumes_auto_rotation() {
        let mut c = undamped();
        c.begin_drag();
        c.update(2.0);
        assert_eq!(c.azimuth(), 0.0);
        c.end_drag();
        c.update(2.0);
        assert!((c.azimuth() + TAU / 60.0).abs() < 1e-5);
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut c = undamped();
        c.drag(300.0, 300.0, 600.0);
        assert_eq!(c.azimuth(), 0.0);
        assert!((c.polar() - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn vertical_drag_is_clamped() {
        let mut c = undamped();
        c.begin_drag();
        c.drag(0.0, 10_000.0, 600.0);
        assert!((c.polar() - MIN_POLAR_ANGLE).abs() < 1e-5);
        c.drag(0.0, -50_000.0, 600.0);
        assert!((c.polar() - MAX_POLAR_ANGLE).abs() < 1e-5);
    }

    #[test]
    fn damping_converges_to_nominal_rate() {
        let mut c = OrbitController::new(CameraConfig::default());
        let dt = 1.0 / 60.0;
        for _ in 0..600 {
            c.update(dt);
        }
        let before = c.azimuth();
        c.update(dt);
        let step = c.azimuth() - before;
        assert!((step + TAU / 60.0 * 0.5 * dt).abs() < 1e-5);
    }

    #[test]
    fn disabled_zoom_and_pan_are_noops() {
        let mut c = OrbitController::new(CameraConfig::default());
        for _ in 0..10 {
            c.zoom(3.0);
            c.zoom(-7.0);
            c.pan(120.0, -40.0, 600.0);
        }
        assert_eq!(c.distance(), 10.0);
        assert_eq!(c.target(), Vec3::ZERO);
    }

    #[test]
    fn enabled_zoom_respects_limits() {
        let mut c = OrbitController::new(CameraConfig {
            enable_zoom: true,
            min_distance: 5.0,
            max_distance: 12.0,
            ..Default::default()
        });
        c.zoom(1.0);
        assert!((c.distance() - 9.5).abs() < 1e-4);
        c.zoom(100.0);
        assert_eq!(c.distance(), 5.0);
        c.zoom(-100.0);
        assert_eq!(c.distance(), 12.0);
    }

    #[test]
    fn enabled_pan_moves_target_in_view_plane() {
        let mut c = OrbitController::new(CameraConfig {
            enable_pan: true,
            ..Default::default()
        });
        c.pan(100.0, 0.0, 600.0);
        let t = c.target();
        assert!(t.x < 0.0);
        assert!(t.y.abs() < 1e-4 && t.z.abs() < 1e-4);
    }

    #[test]
    fn camera_matrices_are_finite() {
        let mut c = OrbitController::new(CameraConfig::default());
        c.set_aspect(16.0 / 9.0);
        let vp = c.camera().view_projection();
        assert!(vp.is_finite());
    }
}
