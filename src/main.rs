use std::{io, path::PathBuf, thread};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use gravity_arena::{
    BodyView, RunState, ShutdownFlag, SimConfig, Simulation,
    console::Console,
    control,
    runner::{self, RunOptions},
};

#[derive(Parser, Debug)]
#[command(about = "Circular bodies under mutual gravity, bouncing inside a box")]
struct Args {
    /// YAML scenario; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Stop after this many frames instead of running until `quit` or Ctrl-C.
    #[arg(short, long)]
    frames: Option<usize>,
    /// Seed for the body generator.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Log every body each time this many frames have passed (0 disables).
    #[arg(long, default_value_t = 60)]
    report_every: usize,
    /// Do not read control commands from stdin.
    #[arg(long)]
    no_console: bool,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.generator.seed = args.seed;
    }
    Ok(config)
}

fn report(frame: usize, bodies: &[BodyView]) {
    for (i, b) in bodies.iter().enumerate() {
        log::info!(
            "frame {frame} body #{i}: pos ({:.1}, {:.1}) vel ({:.1}, {:.1}) trail {}",
            b.pos.x,
            b.pos.y,
            b.vel.x,
            b.vel.y,
            b.trail.len()
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    if !config.gravity_enabled {
        log::warn!("gravity is disabled");
    }

    let mut sim = Simulation::from_config(&config).context("cannot set up the scene")?;
    let shutdown = ShutdownFlag::new();
    let initial = if config.start_paused {
        RunState::Paused
    } else {
        RunState::Running
    };
    let (handle, mut receiver) = control::channel(initial);

    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            log::info!("interrupt received, stopping");
            shutdown.request();
        })
        .context("cannot install the Ctrl-C handler")?;
    }

    let console = if args.no_console {
        None
    } else {
        let console = Console::new(sim.bodies().clone(), handle.clone(), shutdown.clone());
        let thread = thread::Builder::new()
            .name("console".into())
            .spawn(move || {
                if let Err(err) = console.run(io::BufReader::new(io::stdin()), io::stdout()) {
                    log::warn!("console closed: {err}");
                }
            })
            .context("cannot start the console thread")?;
        Some(thread)
    };

    let options = RunOptions {
        frame_interval: config.frame_interval(),
        max_frames: args.frames,
    };
    let report_every = args.report_every;

    let stop = shutdown.clone();
    let stepper = thread::Builder::new()
        .name("simulation".into())
        .spawn(move || {
            let mut sink = |frame: usize, bodies: &[BodyView]| {
                if report_every > 0 && frame % report_every == 0 {
                    report(frame, bodies);
                } else {
                    log::trace!("frame {frame}: {} bodies", bodies.len());
                }
            };
            runner::run(&mut sim, &mut receiver, &stop, options, &mut sink)
        })
        .context("cannot start the simulation thread")?;

    let summary = stepper
        .join()
        .map_err(|_| anyhow!("simulation thread panicked"))??;
    shutdown.request();
    if let Some(console) = console {
        console
            .join()
            .map_err(|_| anyhow!("console thread panicked"))?;
    }
    drop(handle);

    log::info!("done: {} steps, {} contacts", summary.steps, summary.contacts);
    Ok(())
}
