use glam::Vec3;

// Shared visual tuning constants for the hero backdrop.

// Procedural motion
pub const ROTATION_X_RATE: f32 = 0.3; // radians per second per unit speed
pub const ROTATION_Y_RATE: f32 = 0.2;
pub const BOB_AMPLITUDE: f32 = 0.5; // vertical oscillation half-range

// Particle field
pub const PARTICLE_COUNT: usize = 100;
pub const PARTICLE_BOUNDS_MIN: Vec3 = Vec3::new(-10.0, -10.0, -5.0);
pub const PARTICLE_BOUNDS_MAX: Vec3 = Vec3::new(10.0, 10.0, 5.0);
pub const PARTICLE_YAW_RATE: f32 = 0.05;
pub const PARTICLE_PITCH_FREQ: f32 = 0.1;
pub const PARTICLE_PITCH_AMPLITUDE: f32 = 0.1;
pub const PARTICLE_SIZE: f32 = 0.05; // world units, attenuated by distance
pub const PARTICLE_COLOR: [f32; 3] = [0.392, 1.0, 0.855]; // #64ffda
pub const PARTICLE_OPACITY: f32 = 0.8;

// Star backdrop
pub const STAR_RADIUS: f32 = 50.0;
pub const STAR_DEPTH: f32 = 50.0;
pub const STAR_COUNT: usize = 1000;
pub const STAR_SIZE_FACTOR: f32 = 4.0;
pub const STAR_SATURATION: f32 = 0.0;
pub const STAR_LIGHTNESS: f32 = 0.9;
pub const STAR_TWINKLE_SPEED: f32 = 0.5;
pub const STAR_TWINKLE_OFFSET: f32 = 100.0; // phase offset baked into the twinkle
pub const STAR_TWINKLE_BASE: f32 = 3.0;

// Shape material
pub const SHAPE_OPACITY: f32 = 0.8;
pub const SHAPE_EMISSIVE_INTENSITY: f32 = 0.2;

// Camera
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 10.0);
pub const CAMERA_FOV_DEG: f32 = 60.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;
pub const AUTO_ROTATE_SPEED: f32 = 0.5; // one orbit per 60 / speed seconds
pub const MIN_POLAR_ANGLE: f32 = std::f32::consts::PI / 3.0;
pub const MAX_POLAR_ANGLE: f32 = std::f32::consts::PI / 1.5;
pub const DAMPING_FACTOR: f32 = 0.05; // fraction of pending rotation applied per 1/60 s
pub const DAMPING_REFERENCE_HZ: f32 = 60.0;
pub const ZOOM_STEP_BASE: f32 = 0.95;

// Lights
pub const AMBIENT_INTENSITY: f32 = 0.5;

// Palette
pub const TEAL: [f32; 3] = [0.392, 1.0, 0.855]; // #64ffda
pub const CORAL: [f32; 3] = [1.0, 0.420, 0.420]; // #ff6b6b
pub const BLUE: [f32; 3] = [0.231, 0.510, 0.965]; // #3b82f6
pub const VIOLET: [f32; 3] = [0.741, 0.204, 0.996]; // #bd34fe

// Display
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;
pub const MSAA_SAMPLES: u32 = 4;
