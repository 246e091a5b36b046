//! Closed-form procedural motion for floating shapes.
//!
//! Every transform here is a pure function of elapsed time and per-object
//! constants. Nothing is integrated frame to frame, so sampling the same
//! `t` twice yields the same transform and pausing/resuming needs no care.

use crate::constants::{BOB_AMPLITUDE, ROTATION_X_RATE, ROTATION_Y_RATE};
use crate::shapes::ShapeKind;
use glam::{EulerRot, Mat4, Quat, Vec3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionError {
    #[error("object {id}: speed must be finite and positive, got {speed}")]
    InvalidSpeed { id: u32, speed: f32 },
    #[error("object {id}: scale must be finite and positive, got {scale}")]
    InvalidScale { id: u32, scale: f32 },
    #[error("object {id}: base position is not finite")]
    InvalidPosition { id: u32 },
}

/// Immutable description of one floating shape.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub id: u32,
    pub base_position: Vec3,
    pub color_rgb: [f32; 3],
    pub scale: f32,
    pub speed: f32,
    pub shape: ShapeKind,
}

/// Per-frame transform derived from a [`SceneObject`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub position: Vec3,
    pub scale: f32,
}

impl MotionSample {
    /// Translation * rotation (XYZ Euler) * uniform scale.
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation_x, self.rotation_y, 0.0);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

#[inline]
pub fn rotation_x(t: f32, speed: f32) -> f32 {
    ROTATION_X_RATE * speed * t
}

#[inline]
pub fn rotation_y(t: f32, speed: f32) -> f32 {
    ROTATION_Y_RATE * speed * t
}

#[inline]
pub fn position_y(t: f32, speed: f32, initial_y: f32) -> f32 {
    initial_y + BOB_AMPLITUDE * (speed * t).sin()
}

impl SceneObject {
    pub fn validate(&self) -> Result<(), MotionError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(MotionError::InvalidSpeed {
                id: self.id,
                speed: self.speed,
            });
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(MotionError::InvalidScale {
                id: self.id,
                scale: self.scale,
            });
        }
        if !self.base_position.is_finite() {
            return Err(MotionError::InvalidPosition { id: self.id });
        }
        Ok(())
    }

    /// Sample the object's transform at elapsed time `t` (seconds).
    pub fn sample(&self, t: f32) -> Result<MotionSample, MotionError> {
        self.validate()?;
        let base = self.base_position;
        Ok(MotionSample {
            rotation_x: rotation_x(t, self.speed),
            rotation_y: rotation_y(t, self.speed),
            position: Vec3::new(base.x, position_y(t, self.speed, base.y), base.z),
            scale: self.scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    fn object(speed: f32, y: f32) -> SceneObject {
        SceneObject {
            id: 7,
            base_position: Vec3::new(1.0, y, -2.0),
            color_rgb: [1.0, 1.0, 1.0],
            scale: 1.0,
            speed,
            shape: ShapeKind::Icosahedron,
        }
    }

    #[test]
    fn bob_hits_zero_and_peak() {
        assert!(position_y(PI, 1.0, 0.0).abs() < 1e-5);
        assert!((position_y(PI / 2.0, 1.0, 0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn bob_stays_within_amplitude() {
        for speed in [0.1_f32, 0.8, 1.3, 4.0] {
            for i in 0..2000 {
                let t = i as f32 * 0.037;
                let y = position_y(t, speed, 2.5);
                assert!((2.0..=3.0).contains(&y), "y={y} at t={t}");
            }
        }
    }

    #[test]
    fn rotations_match_rates_modulo_tau() {
        let speed = 1.2;
        for i in 0..100 {
            let t = i as f32 * 0.73;
            let rx = rotation_x(t, speed).rem_euclid(TAU);
            let ry = rotation_y(t, speed).rem_euclid(TAU);
            assert!((rx - (0.3 * speed * t).rem_euclid(TAU)).abs() < 1e-4);
            assert!((ry - (0.2 * speed * t).rem_euclid(TAU)).abs() < 1e-4);
        }
    }

    #[test]
    fn sampling_is_idempotent() {
        let o = object(1.5, 0.3);
        assert_eq!(o.sample(12.5).unwrap(), o.sample(12.5).unwrap());
    }

    #[test]
    fn sample_keeps_x_and_z() {
        let s = object(1.0, 0.0).sample(3.0).unwrap();
        assert_eq!(s.position.x, 1.0);
        assert_eq!(s.position.z, -2.0);
    }

    #[test]
    fn malformed_objects_are_rejected() {
        assert!(matches!(
            object(0.0, 0.0).sample(1.0),
            Err(MotionError::InvalidSpeed { id: 7, .. })
        ));
        assert!(matches!(
            object(f32::NAN, 0.0).sample(1.0),
            Err(MotionError::InvalidSpeed { .. })
        ));
        let mut o = object(1.0, 0.0);
        o.scale = -1.0;
        assert!(matches!(o.sample(1.0), Err(MotionError::InvalidScale { .. })));
        let mut o = object(1.0, 0.0);
        o.base_position.x = f32::INFINITY;
        assert_eq!(o.sample(1.0), Err(MotionError::InvalidPosition { id: 7 }));
    }

    #[test]
    fn model_matrix_places_object_at_sampled_position() {
        let s = object(1.0, 0.0).sample(PI / 2.0).unwrap();
        let origin = s.model_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 0.5, -2.0)).length() < 1e-5);
    }
}
