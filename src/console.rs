use std::{
    io::{self, BufRead, Write},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::Duration,
};

use anyhow::{Result, bail};

use crate::{
    control::{self, BodyField, ControlHandle, ShutdownFlag},
    shared::SharedBodies,
};

const HELP: &str = "\
commands:
  pause | p                 stop stepping
  resume | r                continue stepping
  set <index> <field> <v>   field is one of x, y, vx, vy, mass, radius
  show | s                  print every body
  quit | q                  stop the simulation";

/// How long the console waits for a line before it rechecks the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A line typed at the control console.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Pause,
    Resume,
    Set { index: usize, field: BodyField, raw: String },
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        bail!("empty command");
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "pause" | "p" => Command::Pause,
        "resume" | "r" => Command::Resume,
        "show" | "s" => Command::Show,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "set" => {
            let (Some(index), Some(field), Some(raw)) = (words.next(), words.next(), words.next())
            else {
                bail!("usage: set <index> <field> <value>");
            };
            let Ok(index) = index.parse::<usize>() else {
                bail!("'{index}' is not a body index");
            };
            Command::Set {
                index,
                field: field.parse()?,
                raw: raw.to_string(),
            }
        }
        other => bail!("unknown command '{other}', try 'help'"),
    };

    if let Some(extra) = words.next() {
        bail!("unexpected '{extra}' after command");
    }
    Ok(command)
}

/// Line-oriented control surface for pausing, resuming and editing bodies.
#[derive(Debug)]
pub struct Console {
    bodies: SharedBodies,
    control: ControlHandle,
    shutdown: ShutdownFlag,
}

impl Console {
    pub fn new(bodies: SharedBodies, control: ControlHandle, shutdown: ShutdownFlag) -> Self {
        Self {
            bodies,
            control,
            shutdown,
        }
    }

    /// Prints one row per body.
    pub fn show(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "{:>3} {:>7} {:>7} {:>8} {:>8} {:>9} {:>6}",
            "#", "x", "y", "vx", "vy", "m", "rad"
        )?;
        for (i, body) in self.bodies.snapshot().iter().enumerate() {
            writeln!(
                out,
                "{:>3} {:>7.0} {:>7.0} {:>8.1} {:>8.1} {:>9.1e} {:>6.1}",
                i, body.pos.x, body.pos.y, body.vel.x, body.vel.y, body.mass, body.radius
            )?;
        }
        Ok(())
    }

    pub fn execute(&self, command: Command, out: &mut impl Write) -> io::Result<()> {
        match command {
            Command::Pause => {
                self.control.pause();
                writeln!(out, "paused")
            }
            Command::Resume => {
                self.control.resume();
                writeln!(out, "running")
            }
            Command::Set { index, field, raw } => {
                match control::apply_edit(&self.bodies, index, field, &raw) {
                    Ok(()) => writeln!(out, "body #{index}: {field} = {}", raw.trim()),
                    Err(err) => {
                        log::warn!("rejected edit: {err}");
                        writeln!(out, "rejected: {err}")
                    }
                }
            }
            Command::Show => self.show(out),
            Command::Help => writeln!(out, "{HELP}"),
            Command::Quit => {
                self.shutdown.request();
                writeln!(out, "stopping")
            }
        }
    }

    /// Serves commands from `input` until it ends, `quit` is entered, or
    /// shutdown is requested elsewhere.
    ///
    /// Lines are read on a separate thread so a pending read never holds the
    /// console past a shutdown request. That reader stays blocked until the
    /// input yields another line or closes.
    pub fn run(&self, input: impl BufRead + Send + 'static, out: impl Write) -> io::Result<()> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("console-input".into())
            .spawn(move || {
                for line in input.lines() {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;
        self.serve(&rx, out)
    }

    /// Executes lines from `lines` until the sender hangs up, `quit` is
    /// entered, or shutdown is requested. The flag is checked at least once
    /// per [`POLL_INTERVAL`].
    pub fn serve(
        &self,
        lines: &Receiver<io::Result<String>>,
        mut out: impl Write,
    ) -> io::Result<()> {
        while !self.shutdown.is_requested() {
            let line = match lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => line?,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Ok(command) => self.execute(command, &mut out)?,
                Err(err) => writeln!(out, "{err}")?,
            }
            out.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        body::{Body, Rgb},
        control::RunState,
    };
    use ultraviolet::DVec2;

    fn console() -> (Console, control::ControlReceiver, SharedBodies, ShutdownFlag) {
        let bodies = SharedBodies::new(vec![Body::new(
            DVec2::new(40.0, 50.0),
            5.0,
            2e15,
            Rgb::WHITE,
            100.0,
            100.0,
        )]);
        let (handle, rx) = control::channel(RunState::Running);
        let shutdown = ShutdownFlag::new();
        (Console::new(bodies.clone(), handle, shutdown.clone()), rx, bodies, shutdown)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("P").unwrap(), Command::Pause);
        assert_eq!(parse_command("  resume ").unwrap(), Command::Resume);
        assert_eq!(
            parse_command("set 0 vx -2.5").unwrap(),
            Command::Set {
                index: 0,
                field: BodyField::Vx,
                raw: "-2.5".to_string()
            }
        );
        assert!(parse_command("set 0 vx").is_err());
        assert!(parse_command("set one vx 3").is_err());
        assert!(parse_command("set 0 spin 3").is_err());
        assert!(parse_command("jump").is_err());
        assert!(parse_command("pause now").is_err());
    }

    #[test]
    fn session_edits_and_controls() {
        let (console, mut rx, bodies, shutdown) = console();
        let input = "pause\nset 0 x 70\nset 0 mass heavy\n\nbogus\nresume\nquit\nset 0 y 1\n";
        let mut out = Vec::new();
        console.run(input.as_bytes(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("body #0: x = 70"));
        assert!(text.contains("rejected: mass: 'heavy' is not a number"));
        assert!(text.contains("unknown command 'bogus'"));
        assert!(shutdown.is_requested());

        let body = bodies.get(0).unwrap();
        assert_eq!(body.pos, DVec2::new(70.0, 50.0));
        assert_eq!(body.mass, 2e15);
        assert_eq!(rx.poll(), RunState::Running);
    }

    #[test]
    fn idle_console_leaves_on_shutdown() {
        let (console, _rx, _bodies, shutdown) = console();
        let (lines, pending) = mpsc::channel::<io::Result<String>>();

        let stopper = {
            let shutdown = shutdown.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                shutdown.request();
            })
        };
        let mut out = Vec::new();
        console.serve(&pending, &mut out).unwrap();
        stopper.join().unwrap();

        assert!(out.is_empty());
        // The sender is still open: the console left because of the flag.
        drop(lines);
    }

    #[test]
    fn show_lists_bodies() {
        let (console, _rx, _bodies, _shutdown) = console();
        let mut out = Vec::new();
        console.show(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().contains("2.0e15"));
    }
}
