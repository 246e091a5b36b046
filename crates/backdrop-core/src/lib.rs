pub mod camera;
pub mod clock;
pub mod constants;
pub mod motion;
pub mod mount;
pub mod particles;
pub mod renderer;
pub mod scene;
pub mod scheduler;
pub mod shapes;
pub mod stars;

pub use camera::*;
pub use clock::*;
pub use constants::*;
pub use motion::*;
pub use mount::*;
pub use particles::*;
pub use renderer::*;
pub use scene::*;
pub use scheduler::*;
pub use shapes::*;
pub use stars::*;

// Shaders bundled as string constants
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
