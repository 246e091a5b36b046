//! Scene composition: the fixed shape catalogue, particle and star fields,
//! lights and the orbit camera, turned into one [`Frame`] per tick.

use crate::camera::{Camera, CameraConfig, OrbitController};
use crate::clock::FrameTime;
use crate::constants::*;
use crate::motion::SceneObject;
use crate::particles::{ParticleConfig, ParticleField};
use crate::shapes::{Geometry, ShapeKind};
use crate::stars::{StarConfig, StarField};
use fnv::FnvHashSet;
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::{smallvec, SmallVec};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color_rgb: [f32; 3],
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color_rgb: [f32; 3],
    pub intensity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lights {
    pub ambient: AmbientLight,
    pub points: SmallVec<[PointLight; 4]>,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color_rgb: [1.0, 1.0, 1.0],
                intensity: AMBIENT_INTENSITY,
            },
            points: smallvec![
                PointLight {
                    position: Vec3::new(10.0, 10.0, 10.0),
                    color_rgb: TEAL,
                    intensity: 1.0,
                },
                PointLight {
                    position: Vec3::new(-10.0, -10.0, -10.0),
                    color_rgb: VIOLET,
                    intensity: 0.5,
                },
                PointLight {
                    position: Vec3::new(0.0, 10.0, -5.0),
                    color_rgb: BLUE,
                    intensity: 0.5,
                },
            ],
        }
    }
}

/// The central shape followed by the four smaller orbiting ones.
pub fn default_objects() -> Vec<SceneObject> {
    let layout: [([f32; 3], [f32; 3], f32, f32, ShapeKind); 5] = [
        ([0.0, 0.0, 0.0], TEAL, 1.5, 0.8, ShapeKind::Icosahedron),
        ([3.0, 2.0, -2.0], CORAL, 0.8, 1.2, ShapeKind::Octahedron),
        ([-3.0, -1.0, -3.0], BLUE, 0.9, 1.0, ShapeKind::TorusKnot),
        ([2.0, -2.0, 2.0], VIOLET, 0.7, 1.5, ShapeKind::Sphere),
        ([-2.0, 3.0, 1.0], TEAL, 0.6, 1.3, ShapeKind::Icosahedron),
    ];
    layout
        .iter()
        .enumerate()
        .map(|(i, (pos, color, scale, speed, shape))| SceneObject {
            id: i as u32,
            base_position: Vec3::from(*pos),
            color_rgb: *color,
            scale: *scale,
            speed: *speed,
            shape: *shape,
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub objects: Vec<SceneObject>,
    pub camera: CameraConfig,
    pub particles: ParticleConfig,
    pub stars: StarConfig,
    pub lights: Lights,
    /// Fixed seed for particle/star placement; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            objects: default_objects(),
            camera: CameraConfig::default(),
            particles: ParticleConfig::default(),
            stars: StarConfig::default(),
            lights: Lights::default(),
            seed: None,
        }
    }
}

/// Geometry and material for one shape, built once at scene creation.
#[derive(Clone, Debug)]
pub struct ShapeAsset {
    pub object_id: u32,
    pub kind: ShapeKind,
    pub geometry: Geometry,
    pub color_rgb: [f32; 3],
    pub opacity: f32,
    pub emissive_intensity: f32,
}

/// Everything a renderer uploads once at mount.
#[derive(Clone, Debug)]
pub struct SceneAssets {
    pub shapes: Vec<ShapeAsset>,
    pub particles: ParticleField,
    pub stars: StarField,
}

/// One shape's transform for the current frame; `asset` indexes
/// [`SceneAssets::shapes`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectInstance {
    pub asset: usize,
    pub object_id: u32,
    pub model: Mat4,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub time: FrameTime,
    pub objects: SmallVec<[ObjectInstance; 8]>,
    pub particles_model: Mat4,
    pub star_twinkle_phase: f32,
    pub camera: Camera,
    pub lights: Lights,
}

pub struct Scene {
    objects: Vec<SceneObject>,
    assets: SceneAssets,
    controller: OrbitController,
    lights: Lights,
    reported: FnvHashSet<u32>,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    pub fn with_rng(config: SceneConfig, rng: &mut impl Rng) -> Self {
        let shapes = config
            .objects
            .iter()
            .map(|o| ShapeAsset {
                object_id: o.id,
                kind: o.shape,
                geometry: o.shape.geometry(),
                color_rgb: o.color_rgb,
                opacity: SHAPE_OPACITY,
                emissive_intensity: SHAPE_EMISSIVE_INTENSITY,
            })
            .collect::<Vec<_>>();
        let particles = ParticleField::new(config.particles, rng);
        let stars = StarField::new(config.stars, rng);
        log::info!(
            "[scene] objects={} particles={} stars={} lights={}",
            shapes.len(),
            particles.len(),
            stars.len(),
            config.lights.points.len()
        );
        Self {
            objects: config.objects,
            assets: SceneAssets {
                shapes,
                particles,
                stars,
            },
            controller: OrbitController::new(config.camera),
            lights: config.lights,
            reported: FnvHashSet::default(),
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn assets(&self) -> &SceneAssets {
        &self.assets
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn controller(&self) -> &OrbitController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut OrbitController {
        &mut self.controller
    }

    /// Advance the camera by `time.delta` and sample every transform at
    /// `time.elapsed`. Malformed objects are left out of the frame.
    pub fn compose(&mut self, time: FrameTime) -> Frame {
        self.controller.update(time.delta);
        let t = time.elapsed;
        let mut objects = SmallVec::new();
        for (asset, object) in self.objects.iter().enumerate() {
            match object.sample(t) {
                Ok(sample) => objects.push(ObjectInstance {
                    asset,
                    object_id: object.id,
                    model: sample.model_matrix(),
                }),
                Err(e) => {
                    if self.reported.insert(object.id) {
                        log::warn!("[scene] skipping object: {e}");
                    }
                }
            }
        }
        log::trace!("[scene] frame={} t={:.3} drawn={}", time.frame, t, objects.len());
        Frame {
            time,
            objects,
            particles_model: self.assets.particles.model_matrix(t),
            star_twinkle_phase: self.assets.stars.twinkle_phase(t),
            camera: self.controller.camera(),
            lights: self.lights.clone(),
        }
    }
}
