// Host-side tests for the mount/unmount lifecycle.
// A recording renderer and the manual refresh driver stand in for WebGPU and
// requestAnimationFrame.

use backdrop_core::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Upload { shapes: usize, particles: usize, stars: usize },
    Draw { objects: usize },
    Resize(u32, u32),
    Release,
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<Call>>>,
    fail_upload: bool,
    fail_draw: bool,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    fn releases(&self) -> usize {
        self.count(|c| *c == Call::Release)
    }
}

impl SceneRenderer for Recorder {
    fn upload(&mut self, assets: &SceneAssets) -> Result<(), RenderError> {
        self.calls.borrow_mut().push(Call::Upload {
            shapes: assets.shapes.len(),
            particles: assets.particles.len(),
            stars: assets.stars.len(),
        });
        if self.fail_upload {
            return Err(RenderError::Context("no adapter".into()));
        }
        Ok(())
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.calls.borrow_mut().push(Call::Draw {
            objects: frame.objects.len(),
        });
        if self.fail_draw {
            return Err(RenderError::SurfaceLost);
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.calls.borrow_mut().push(Call::Resize(width, height));
    }

    fn release(&mut self) {
        self.calls.borrow_mut().push(Call::Release);
    }
}

fn seeded() -> SceneConfig {
    SceneConfig {
        seed: Some(7),
        ..Default::default()
    }
}

#[test]
fn mount_uploads_once_then_draws_every_tick() {
    let renderer = Recorder::default();
    let driver = ManualDriver::new();
    let mounted = mount(seeded(), renderer.clone(), driver.clone()).unwrap();
    assert!(mounted.is_mounted());
    assert_eq!(driver.scheduled(), 1);
    assert_eq!(
        renderer.calls(),
        vec![Call::Upload {
            shapes: 5,
            particles: 100,
            stars: 1000
        }]
    );

    for i in 0..4 {
        driver.pump(i as f64 / 60.0);
    }
    assert_eq!(mounted.invocations(), 4);
    assert_eq!(mounted.frames_drawn(), 4);
    assert_eq!(renderer.count(|c| *c == Call::Draw { objects: 5 }), 4);
    assert_eq!(renderer.releases(), 0);
}

#[test]
fn unmount_stops_frames_and_releases_once() {
    let renderer = Recorder::default();
    let driver = ManualDriver::new();
    let mounted = mount(seeded(), renderer.clone(), driver.clone()).unwrap();
    driver.pump(0.0);
    driver.pump(0.016);
    mounted.unmount();

    assert_eq!(driver.scheduled(), 0);
    assert_eq!(driver.pump(0.032), 0);
    assert_eq!(driver.pump(0.048), 0);
    assert_eq!(renderer.count(|c| matches!(c, Call::Draw { .. })), 2);
    assert_eq!(renderer.releases(), 1);
}

#[test]
fn dropping_the_handle_unmounts() {
    let renderer = Recorder::default();
    let driver = ManualDriver::new();
    {
        let _mounted = mount(seeded(), renderer.clone(), driver.clone()).unwrap();
        driver.pump(0.0);
    }
    assert_eq!(driver.scheduled(), 0);
    driver.pump(1.0);
    assert_eq!(renderer.count(|c| matches!(c, Call::Draw { .. })), 1);
    assert_eq!(renderer.releases(), 1);
}

#[test]
fn upload_failure_releases_and_never_schedules() {
    let renderer = Recorder {
        fail_upload: true,
        ..Default::default()
    };
    let driver = ManualDriver::new();
    let err = mount(seeded(), renderer.clone(), driver.clone()).err().unwrap();
    assert_eq!(err, MountError::Render(RenderError::Context("no adapter".into())));
    assert_eq!(driver.scheduled(), 0);
    assert_eq!(driver.pump(0.0), 0);
    assert_eq!(renderer.releases(), 1);
    assert_eq!(renderer.count(|c| matches!(c, Call::Draw { .. })), 0);
}

#[test]
fn refused_scheduling_releases_renderer() {
    let renderer = Recorder::default();
    let err = mount(seeded(), renderer.clone(), ManualDriver::refusing("no rAF"))
        .err()
        .unwrap();
    assert_eq!(
        err,
        MountError::Scheduler(SchedulerError::Refused("no rAF".into()))
    );
    assert_eq!(renderer.releases(), 1);
}

#[test]
fn draw_errors_do_not_stop_the_loop() {
    let renderer = Recorder {
        fail_draw: true,
        ..Default::default()
    };
    let driver = ManualDriver::new();
    let mounted = mount(seeded(), renderer.clone(), driver.clone()).unwrap();
    for i in 0..3 {
        driver.pump(i as f64);
    }
    assert_eq!(mounted.invocations(), 3);
    assert_eq!(mounted.frames_drawn(), 0);
    assert_eq!(renderer.count(|c| matches!(c, Call::Draw { .. })), 3);
}

#[test]
fn zoom_and_pan_input_leave_camera_untouched() {
    let driver = ManualDriver::new();
    let mounted = mount(seeded(), Recorder::default(), driver.clone()).unwrap();
    let before = mounted
        .with_scene(|s| (s.controller().distance(), s.controller().target()))
        .unwrap();
    mounted.input(PointerInput::Wheel { steps: 3.0 });
    mounted.input(PointerInput::Wheel { steps: -5.0 });
    mounted.input(PointerInput::Pan {
        dx: 120.0,
        dy: -40.0,
        viewport_height: 800.0,
    });
    let after = mounted
        .with_scene(|s| (s.controller().distance(), s.controller().target()))
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn drag_input_suspends_auto_rotation() {
    let driver = ManualDriver::new();
    let mounted = mount(seeded(), Recorder::default(), driver.clone()).unwrap();
    driver.pump(0.0);
    mounted.input(PointerInput::DragStart);
    assert_eq!(mounted.with_scene(|s| s.controller().is_dragging()), Some(true));
    let held = mounted.with_scene(|s| s.controller().azimuth()).unwrap();
    for i in 1..=30 {
        driver.pump(i as f64 / 60.0);
    }
    let still = mounted.with_scene(|s| s.controller().azimuth()).unwrap();
    assert!((still - held).abs() < 1e-6);

    mounted.input(PointerInput::DragEnd);
    for i in 31..=90 {
        driver.pump(i as f64 / 60.0);
    }
    let moved = mounted.with_scene(|s| s.controller().azimuth()).unwrap();
    assert!((moved - still).abs() > 1e-3);
}

#[test]
fn resize_updates_aspect_and_renderer() {
    let renderer = Recorder::default();
    let driver = ManualDriver::new();
    let mounted = mount(seeded(), renderer.clone(), driver.clone()).unwrap();
    mounted.resize(1600, 800);
    mounted.resize(0, 800);
    assert_eq!(renderer.count(|c| matches!(c, Call::Resize(..))), 1);
    let aspect = mounted
        .with_scene(|s| s.controller().camera().aspect)
        .unwrap();
    assert!((aspect - 2.0).abs() < 1e-6);
}

#[test]
fn scene_is_gone_after_unmount() {
    let renderer = Recorder::default();
    let driver = ManualDriver::new();
    let mounted = mount(seeded(), renderer.clone(), driver.clone()).unwrap();
    assert!(mounted.with_scene(|s| s.objects().len()).is_some());
    drop(mounted);
    assert_eq!(renderer.calls().last(), Some(&Call::Release));
}
