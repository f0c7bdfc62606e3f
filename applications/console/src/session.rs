/// Interactive terminal session
use crate::config::ConsoleConfig;
use crate::engine::SimulatedEngine;
use crate::error::{ConsoleError, Result};
use cadenza_playback::{BarGeometry, TransportController, TransportEvent, TransportStatus};
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const HELP: &str = "\
Commands:
  p          play / pause
  n, b       next / previous track
  t <n>      play track number n
  f, r       skip forward / back
  s <0..1>   scrub to a fraction of the track
  +, -       volume up / down
  v <0..1>   set volume
  m          mute / unmute
  ended      jump to the end of the track
  ?          show status
  h          this help
  q          quit";

/// Width of the text progress bar
const BAR_CELLS: usize = 24;

/// Pointer coordinates used to express scrub fractions
const VIRTUAL_BAR: BarGeometry = BarGeometry {
    left: 0.0,
    width: 1000.0,
};

/// A line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TogglePlay,
    Next,
    Previous,
    /// Zero-based playlist index
    Select(usize),
    Forward,
    Back,
    Scrub(f64),
    VolumeUp,
    VolumeDown,
    SetVolume(f64),
    Mute,
    Ended,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        let command = match name {
            "p" => Command::TogglePlay,
            "n" => Command::Next,
            "b" => Command::Previous,
            "t" => {
                let number: usize = parse_arg("t", arg)?;
                if number == 0 {
                    return Err(ConsoleError::InvalidArgument {
                        command: "t",
                        reason: "track numbers start at 1".to_string(),
                    });
                }
                Command::Select(number - 1)
            }
            "f" => Command::Forward,
            "r" => Command::Back,
            "s" => Command::Scrub(parse_fraction("s", arg)?),
            "+" => Command::VolumeUp,
            "-" => Command::VolumeDown,
            "v" => Command::SetVolume(parse_fraction("v", arg)?),
            "m" => Command::Mute,
            "ended" => Command::Ended,
            "?" => Command::Status,
            "h" | "help" => Command::Help,
            "q" | "quit" => Command::Quit,
            other => return Err(ConsoleError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn parse_arg<T: FromStr>(command: &'static str, arg: Option<&str>) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let arg = arg.ok_or_else(|| ConsoleError::InvalidArgument {
        command,
        reason: "missing value".to_string(),
    })?;
    arg.parse().map_err(|e: T::Err| ConsoleError::InvalidArgument {
        command,
        reason: format!("{}: {}", arg, e),
    })
}

fn parse_fraction(command: &'static str, arg: Option<&str>) -> Result<f64> {
    let value: f64 = parse_arg(command, arg)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConsoleError::InvalidArgument {
            command,
            reason: format!("{} is outside 0..1", value),
        });
    }
    Ok(value)
}

/// Transport plus the simulated engine it drives
pub struct Session {
    transport: TransportController<SimulatedEngine>,
    json_events: bool,
    last_status: String,
}

impl Session {
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let engine = SimulatedEngine::new(config.durations());
        let transport =
            TransportController::new(engine, config.playlist()?, config.player.clone())?;

        Ok(Self {
            transport,
            json_events: config.session.json_events,
            last_status: String::new(),
        })
    }

    pub fn transport(&self) -> &TransportController<SimulatedEngine> {
        &self.transport
    }

    /// Advance the simulated engine and feed its observations back
    pub fn tick(&mut self, elapsed: f64) {
        let observations = self.transport.engine_mut().tick(elapsed);
        for event in observations {
            self.transport.handle_engine_event(event);
        }
    }

    /// Run one user command
    pub fn apply(&mut self, command: Command) -> Result<()> {
        let transport = &mut self.transport;
        match command {
            Command::TogglePlay => transport.toggle_play_pause(),
            Command::Next => transport.next_track(),
            Command::Previous => transport.previous_track(),
            Command::Select(index) => transport.select_track(index)?,
            Command::Forward => transport.skip_forward_default(),
            Command::Back => transport.rewind_default(),
            Command::Scrub(fraction) => {
                // Press and release at the same spot
                let x = VIRTUAL_BAR.left + fraction * VIRTUAL_BAR.width;
                if transport.scrub_start(x, VIRTUAL_BAR) {
                    transport.scrub_end();
                } else {
                    info!("Track length not known yet, cannot scrub");
                }
            }
            Command::VolumeUp => transport.increase_volume(),
            Command::VolumeDown => transport.decrease_volume(),
            Command::SetVolume(volume) => transport.set_volume(volume),
            Command::Mute => transport.toggle_mute(),
            Command::Ended => {
                let observations = transport.engine_mut().finish();
                for event in observations {
                    transport.handle_engine_event(event);
                }
            }
            Command::Status | Command::Help | Command::Quit => {}
        }
        Ok(())
    }

    /// Parse and run one input line
    ///
    /// Returns `false` when the user asked to quit. Bad input is reported
    /// and otherwise ignored.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<bool> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(true);
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => return Ok(false),
            Ok(Command::Help) => writeln!(out, "{}", HELP)?,
            Ok(Command::Status) => {
                writeln!(out, "{}", self.track_line())?;
                writeln!(out, "{}", self.status_line())?;
            }
            Ok(command) => {
                if let Err(e) = self.apply(command) {
                    warn!("{}", e);
                    writeln!(out, "! {}", e)?;
                }
            }
            Err(e) => writeln!(out, "! {}", e)?,
        }
        Ok(true)
    }

    /// Render pending transport events
    ///
    /// In JSON mode every event becomes one line. Otherwise track changes
    /// and errors are announced and the status line is reprinted whenever
    /// its text changes.
    pub fn flush(&mut self, out: &mut impl Write) -> Result<()> {
        for event in self.transport.drain_events() {
            if self.json_events {
                writeln!(out, "{}", serde_json::to_string(&event)?)?;
                continue;
            }
            match &event {
                TransportEvent::TrackChanged { .. } => {
                    writeln!(out, "> {}", self.track_line())?;
                }
                TransportEvent::Error { message } => writeln!(out, "! {}", message)?,
                other => debug!("Transport event: {}", other.name()),
            }
        }

        if !self.json_events {
            let status = self.status_line();
            if status != self.last_status {
                writeln!(out, "{}", status)?;
                self.last_status = status;
            }
        }
        Ok(())
    }

    /// `2/3 Title - Artist`
    pub fn track_line(&self) -> String {
        let track = self.transport.current_track();
        format!(
            "{}/{} {} - {}",
            self.transport.current_index() + 1,
            self.transport.playlist().len(),
            track.title,
            track.artist
        )
    }

    /// `[Playing] 01:05 [######------] 03:07  vol 50%`
    pub fn status_line(&self) -> String {
        let transport = &self.transport;
        let status = match transport.status() {
            TransportStatus::Idle => "Loading",
            _ => transport.status_text(),
        };
        let filled = (transport.progress_fraction() * BAR_CELLS as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "#".repeat(filled),
            "-".repeat(BAR_CELLS.saturating_sub(filled))
        );
        format!(
            "[{}] {} [{}] {}  vol {}",
            status,
            transport.formatted_current_time(),
            bar,
            transport.formatted_duration(),
            transport.volume_label()
        )
    }

    /// Release the transport's listeners
    pub fn shutdown(&mut self) {
        self.transport.teardown();
    }
}

/// Run an interactive session on stdin/stdout until `q` or end of input
pub async fn run(config: ConsoleConfig) -> Result<()> {
    let mut session = Session::new(&config)?;
    let period = Duration::from_millis(config.session.tick_ms);
    let step = period.as_secs_f64() * config.session.speed;

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    info!(
        "Session started: {} tracks, tick {}ms, speed {}x",
        config.tracks.len(),
        config.session.tick_ms,
        config.session.speed
    );
    if !config.session.json_events {
        writeln!(stdout, "{}", HELP)?;
        writeln!(stdout, "> {}", session.track_line())?;
    }

    loop {
        let keep_going = tokio::select! {
            _ = interval.tick() => {
                session.tick(step);
                true
            }
            line = lines.next_line() => match line? {
                Some(line) => session.handle_line(&line, &mut stdout)?,
                None => {
                    debug!("Input closed");
                    false
                }
            },
        };
        session.flush(&mut stdout)?;
        if !keep_going {
            break;
        }
    }

    session.shutdown();
    info!("Session ended");
    Ok(())
}
