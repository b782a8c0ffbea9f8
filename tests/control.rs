use std::{io::Cursor, thread, time::Duration};

use ultraviolet::DVec2;

use gravity_arena::{
    Body, BodyField, BodyView, RunState, Rgb, SharedBodies, ShutdownFlag, SimConfig, Simulation,
    console::Console,
    control::{self, apply_edit},
    runner::{self, RunOptions},
};

fn two_bodies() -> SharedBodies {
    SharedBodies::new(vec![
        Body::new(DVec2::new(200.0, 200.0), 15.0, 1e15, Rgb::WHITE, 1600.0, 900.0)
            .with_velocity(DVec2::new(20.0, 0.0)),
        Body::new(DVec2::new(900.0, 500.0), 25.0, 5e15, Rgb::WHITE, 1600.0, 900.0),
    ])
}

fn paced(ms: u64) -> RunOptions {
    RunOptions {
        frame_interval: Duration::from_millis(ms),
        max_frames: None,
    }
}

// ==================================================================================
// Console driving a live step loop
// ==================================================================================

#[test]
fn paused_edits_land_and_quit_stops_the_loop() {
    let bodies = two_bodies();
    let mut sim = Simulation::new(bodies.clone(), &SimConfig::default());
    let shutdown = ShutdownFlag::new();
    let (handle, mut receiver) = control::channel(RunState::Paused);

    let stepper = {
        let shutdown = shutdown.clone();
        thread::spawn(move || {
            let mut sink = |_: usize, _: &[BodyView]| {};
            runner::run(&mut sim, &mut receiver, &shutdown, paced(1), &mut sink)
        })
    };

    let console = Console::new(bodies.clone(), handle, shutdown.clone());
    let script = "set 0 vx 0\nset 0 x 400\nset 1 mass -3\nquit\nset 0 y 10\n";
    let mut out = Vec::new();
    console.run(Cursor::new(script), &mut out).unwrap();

    let summary = stepper.join().unwrap().unwrap();
    assert_eq!(summary.steps, 0, "a paused loop must not step");
    assert!(shutdown.is_requested());

    let b = bodies.get(0).unwrap();
    assert_eq!(b.pos, DVec2::new(400.0, 200.0));
    assert_eq!(b.vel, DVec2::zero());
    assert_eq!(bodies.get(1).unwrap().mass, 5e15);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("rejected"), "{printed}");
    assert!(printed.contains("stopping"), "{printed}");
}

#[test]
fn edits_interleave_with_running_steps() {
    let bodies = two_bodies();
    let mut sim = Simulation::new(bodies.clone(), &SimConfig::default());
    let shutdown = ShutdownFlag::new();
    let (handle, mut receiver) = control::channel(RunState::Running);

    let stepper = {
        let shutdown = shutdown.clone();
        thread::spawn(move || {
            let mut sink = |_: usize, _: &[BodyView]| {};
            runner::run(&mut sim, &mut receiver, &shutdown, paced(0), &mut sink)
        })
    };

    for i in 1..=200 {
        apply_edit(&bodies, 1, BodyField::Mass, &format!("{i}e14")).unwrap();
        if i % 50 == 0 {
            handle.pause();
            handle.resume();
        }
    }
    shutdown.request();

    let summary = stepper.join().unwrap().unwrap();
    assert!(summary.frames >= summary.steps);

    assert_eq!(bodies.get(1).unwrap().mass, 200e14);
    for b in bodies.snapshot() {
        assert!(b.pos.x.is_finite() && b.pos.y.is_finite());
    }
}
