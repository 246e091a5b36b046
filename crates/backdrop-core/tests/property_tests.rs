// Host-side randomized checks of scene invariants.
// Seeds are fixed so failures reproduce.

use backdrop_core::*;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn polar_angle_stays_clamped_under_random_drags() {
    let mut rng = StdRng::seed_from_u64(0xb0b);
    for damping in [true, false] {
        let mut controller = OrbitController::new(CameraConfig {
            enable_damping: damping,
            ..Default::default()
        });
        for _ in 0..500 {
            match rng.gen_range(0..4) {
                0 => controller.begin_drag(),
                1 => controller.end_drag(),
                _ => controller.drag(
                    rng.gen_range(-2000.0..2000.0),
                    rng.gen_range(-2000.0..2000.0),
                    rng.gen_range(100.0..1200.0),
                ),
            }
            controller.update(rng.gen_range(0.0..0.1));
            let polar = controller.polar();
            assert!(polar >= MIN_POLAR_ANGLE - 1e-5, "polar {polar} below range");
            assert!(polar <= MAX_POLAR_ANGLE + 1e-5, "polar {polar} above range");
        }
    }
}

#[test]
fn particle_field_has_exact_count_for_any_seed() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let field = ParticleField::new(ParticleConfig::default(), &mut rng);
        assert_eq!(field.len(), 100);
        let bounds = field.config().bounds;
        assert!(field.positions().iter().all(|p| bounds.contains(*p)));
    }
}

#[test]
fn star_radii_stay_in_shell_for_any_seed() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let field = StarField::new(StarConfig::default(), &mut rng);
        assert_eq!(field.len(), 1000);
        for star in field.stars() {
            let r = star.position.length();
            assert!(r >= STAR_RADIUS - 1e-3 && r <= STAR_RADIUS + STAR_DEPTH + 1e-3);
        }
    }
}

#[test]
fn bobbing_stays_within_half_unit_for_random_objects() {
    let mut rng = StdRng::seed_from_u64(99);
    for id in 0..64 {
        let object = SceneObject {
            id,
            base_position: Vec3::new(0.0, rng.gen_range(-5.0..5.0), 0.0),
            color_rgb: TEAL,
            scale: rng.gen_range(0.1..2.0),
            speed: rng.gen_range(0.1..3.0),
            shape: ShapeKind::Sphere,
        };
        for _ in 0..20 {
            let t = rng.gen_range(0.0..10_000.0);
            let y = object.sample(t).unwrap().position.y;
            assert!((y - object.base_position.y).abs() <= BOB_AMPLITUDE + 1e-4);
        }
    }
}

#[test]
fn composed_frames_are_reproducible_with_a_seed() {
    let config = SceneConfig {
        seed: Some(2024),
        ..Default::default()
    };
    let a = Scene::new(config.clone());
    let b = Scene::new(config);
    assert_eq!(a.assets().particles.positions(), b.assets().particles.positions());
    assert_eq!(a.assets().stars.stars(), b.assets().stars.stars());
}
