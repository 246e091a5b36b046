//! Distant star backdrop.
//!
//! Stars are scattered in a spherical shell once at creation. Their
//! positions never change; the only animation is a shared twinkle phase
//! that the renderer folds into the sprite size.

use crate::constants::*;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Clone, Debug, PartialEq)]
pub struct StarConfig {
    pub radius: f32,
    pub depth: f32,
    pub count: usize,
    pub factor: f32,
    pub saturation: f32,
    pub fade: bool,
    pub speed: f32,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            radius: STAR_RADIUS,
            depth: STAR_DEPTH,
            count: STAR_COUNT,
            factor: STAR_SIZE_FACTOR,
            saturation: STAR_SATURATION,
            fade: true,
            speed: STAR_TWINKLE_SPEED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub color_rgb: [f32; 3],
    pub size: f32,
}

#[derive(Clone, Debug)]
pub struct StarField {
    stars: Vec<Star>,
    config: StarConfig,
}

impl StarField {
    pub fn new(config: StarConfig, rng: &mut impl Rng) -> Self {
        let count = config.count;
        let increment = if count > 0 {
            config.depth / count as f32
        } else {
            0.0
        };
        let mut r = config.radius + config.depth;
        let mut stars = Vec::with_capacity(count);
        for i in 0..count {
            r -= increment * rng.gen::<f32>();
            let polar = (1.0 - 2.0 * rng.gen::<f32>()).clamp(-1.0, 1.0).acos();
            let azimuth = TAU * rng.gen::<f32>();
            let (sin_p, cos_p) = polar.sin_cos();
            let (sin_a, cos_a) = azimuth.sin_cos();
            let position = Vec3::new(r * sin_p * sin_a, r * cos_p, r * sin_p * cos_a);
            let hue = i as f32 / count as f32;
            stars.push(Star {
                position,
                color_rgb: hsl_to_rgb(hue, config.saturation, STAR_LIGHTNESS),
                size: (0.5 + 0.5 * rng.gen::<f32>()) * config.factor,
            });
        }
        Self { stars, config }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn config(&self) -> &StarConfig {
        &self.config
    }

    /// Shared twinkle phase at elapsed time `t`.
    pub fn twinkle_phase(&self, t: f32) -> f32 {
        self.config.speed * t
    }
}

/// Size multiplier applied to every star sprite for a given phase.
#[inline]
pub fn twinkle_scale(phase: f32) -> f32 {
    STAR_TWINKLE_BASE + (phase + STAR_TWINKLE_OFFSET).sin()
}

/// Logistic edge softening for a sprite, `d` = distance from sprite center
/// in sprite-UV units (0 at center, 0.5 at the edge).
#[inline]
pub fn fade_alpha(d: f32) -> f32 {
    1.0 / (1.0 + (16.0 * (d - 0.25)).exp())
}

pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn stars_fill_the_shell() {
        let field = StarField::new(StarConfig::default(), &mut StdRng::seed_from_u64(11));
        assert_eq!(field.len(), 1000);
        for s in field.stars() {
            let r = s.position.length();
            assert!(r >= 50.0 - 1e-3 && r <= 100.0 + 1e-3, "r={r}");
            assert!(s.size >= 2.0 && s.size <= 4.0);
        }
    }

    #[test]
    fn zero_saturation_gives_grey_stars() {
        let field = StarField::new(StarConfig::default(), &mut StdRng::seed_from_u64(2));
        assert!(field
            .stars()
            .iter()
            .all(|s| s.color_rgb == [0.9, 0.9, 0.9]));
    }

    #[test]
    fn hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6 && red[2].abs() < 1e-6);
        let green = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
        assert!((green[1] - 1.0).abs() < 1e-5 && green[0].abs() < 1e-5);
    }

    #[test]
    fn twinkle_stays_positive() {
        for i in 0..500 {
            let s = twinkle_scale(i as f32 * 0.1);
            assert!((2.0..=4.0).contains(&s));
        }
    }

    #[test]
    fn fade_is_soft_edged() {
        assert!(fade_alpha(0.0) > 0.98);
        assert!((fade_alpha(0.25) - 0.5).abs() < 1e-6);
        assert!(fade_alpha(0.5) < 0.02);
    }

    #[test]
    fn empty_config_builds_empty_field() {
        let cfg = StarConfig {
            count: 0,
            ..Default::default()
        };
        assert!(StarField::new(cfg, &mut StdRng::seed_from_u64(0)).is_empty());
    }
}
