use crate::constants::*;
use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

/// Axis-aligned box the particle field is sampled from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: PARTICLE_BOUNDS_MIN,
            max: PARTICLE_BOUNDS_MAX,
        }
    }
}

impl Bounds {
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    fn sample(&self, rng: &mut impl Rng) -> Vec3 {
        Vec3::new(
            sample_axis(rng, self.min.x, self.max.x),
            sample_axis(rng, self.min.y, self.max.y),
            sample_axis(rng, self.min.z, self.max.z),
        )
    }
}

#[inline]
fn sample_axis(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

#[derive(Clone, Debug)]
pub struct ParticleConfig {
    pub count: usize,
    pub bounds: Bounds,
    pub size: f32,
    pub color_rgb: [f32; 3],
    pub opacity: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: PARTICLE_COUNT,
            bounds: Bounds::default(),
            size: PARTICLE_SIZE,
            color_rgb: PARTICLE_COLOR,
            opacity: PARTICLE_OPACITY,
        }
    }
}

/// Whole-field rigid rotation at a given time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldRotation {
    pub pitch: f32,
    pub yaw: f32,
}

impl FieldRotation {
    pub fn at(t: f32) -> Self {
        Self {
            pitch: PARTICLE_PITCH_AMPLITUDE * (PARTICLE_PITCH_FREQ * t).sin(),
            yaw: PARTICLE_YAW_RATE * t,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0))
    }
}

/// Fixed buffer of randomly placed points, rotated as one rigid body.
///
/// The position buffer is written once in [`ParticleField::new`] and only
/// exposed as a slice afterwards.
#[derive(Clone, Debug)]
pub struct ParticleField {
    positions: Box<[Vec3]>,
    config: ParticleConfig,
}

impl ParticleField {
    pub fn new(config: ParticleConfig, rng: &mut impl Rng) -> Self {
        let positions = (0..config.count)
            .map(|_| config.bounds.sample(rng))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { positions, config }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn rotation(&self, t: f32) -> FieldRotation {
        FieldRotation::at(t)
    }

    pub fn model_matrix(&self, t: f32) -> Mat4 {
        self.rotation(t).matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn field_has_fixed_count_within_bounds() {
        for seed in [0_u64, 1, 42, 9_999, u64::MAX] {
            let mut rng = StdRng::seed_from_u64(seed);
            let field = ParticleField::new(ParticleConfig::default(), &mut rng);
            assert_eq!(field.len(), 100);
            for p in field.positions() {
                assert!((-10.0..=10.0).contains(&p.x));
                assert!((-10.0..=10.0).contains(&p.y));
                assert!((-5.0..=5.0).contains(&p.z));
            }
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = ParticleField::new(ParticleConfig::default(), &mut StdRng::seed_from_u64(3));
        let b = ParticleField::new(ParticleConfig::default(), &mut StdRng::seed_from_u64(3));
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn degenerate_bounds_collapse_to_min() {
        let cfg = ParticleConfig {
            count: 4,
            bounds: Bounds {
                min: Vec3::new(1.0, 2.0, 3.0),
                max: Vec3::new(1.0, 2.0, 3.0),
            },
            ..Default::default()
        };
        let field = ParticleField::new(cfg, &mut StdRng::seed_from_u64(0));
        assert!(field
            .positions()
            .iter()
            .all(|p| *p == Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn rotation_follows_closed_form() {
        let r = FieldRotation::at(10.0);
        assert!((r.yaw - 0.5).abs() < 1e-6);
        assert!((r.pitch - 0.1 * 1.0_f32.sin()).abs() < 1e-6);
        assert_eq!(FieldRotation::at(0.0), FieldRotation { pitch: 0.0, yaw: 0.0 });
    }

    #[test]
    fn rotation_is_rigid() {
        let field = ParticleField::new(ParticleConfig::default(), &mut StdRng::seed_from_u64(8));
        let m = field.model_matrix(37.0);
        let p = field.positions();
        let before = p[0].distance(p[1]);
        let after = m.transform_point3(p[0]).distance(m.transform_point3(p[1]));
        assert!((before - after).abs() < 1e-4);
    }
}
