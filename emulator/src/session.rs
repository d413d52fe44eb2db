use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant as HostInstant};

use depth_core::alerts::ThresholdState;
use depth_core::config::{AccessKeys, ConfigError, MissionConfig};
use depth_core::console::{
    COMMAND_SUMMARY, ConsoleCommand, Direction, HelpTopic, parse_command,
};
use depth_core::feedback::{Feedback, FeedbackSink, GlyphPattern, Rgb, encode_number};
use depth_core::mission::{self, DepthMonitor, MissionPhase, PollOutcome};
use depth_core::position::PositionStore;
use depth_core::quadrature::{PinLevels, QuadratureDecoder, next_levels};
use depth_core::telemetry::DiagnosticLog;

pub const HELP_TOPICS: &[HelpTopic] = &[
    HelpTopic::Turn,
    HelpTopic::Glitch,
    HelpTopic::Tick,
    HelpTopic::Status,
    HelpTopic::Restart,
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranscriptProfile {
    Ascent,
    Clamp,
    Fault,
}

impl TranscriptProfile {
    pub fn log_path(self) -> &'static str {
        match self {
            TranscriptProfile::Ascent => "transcripts/emulator-ascent.log",
            TranscriptProfile::Clamp => "transcripts/emulator-clamp.log",
            TranscriptProfile::Fault => "transcripts/emulator-fault.log",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            TranscriptProfile::Ascent => "Ascent Emulator climb transcript",
            TranscriptProfile::Clamp => "Ascent Emulator floor clamp transcript",
            TranscriptProfile::Fault => "Ascent Emulator access key fault transcript",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, String> {
        if tag.eq_ignore_ascii_case("ascent") {
            Ok(Self::Ascent)
        } else if tag.eq_ignore_ascii_case("clamp") {
            Ok(Self::Clamp)
        } else if tag.eq_ignore_ascii_case("fault") {
            Ok(Self::Fault)
        } else {
            Err(format!("Unknown transcript profile `{tag}`"))
        }
    }
}

/// One line of emulator output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Text(String),
    /// Lamp colour change; terminals render it as a coloured swatch.
    Lamp(Rgb),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Text(text) => f.write_str(text),
            Response::Lamp(color) => write!(
                f,
                "lamp rgb({},{},{})",
                color.red, color.green, color.blue
            ),
        }
    }
}

impl From<String> for Response {
    fn from(text: String) -> Self {
        Response::Text(text)
    }
}

/// Collects feedback emitted during a command so it can be narrated.
#[derive(Default)]
struct HostPanel {
    pending: Vec<Feedback>,
    display: Option<GlyphPattern>,
    lamp: Option<Rgb>,
}

impl FeedbackSink for HostPanel {
    fn emit(&mut self, feedback: Feedback) {
        match &feedback {
            Feedback::ShowNumber { value, separator } => {
                self.display = Some(encode_number(*value, *separator));
            }
            Feedback::BlinkNumber { value, .. } => {
                self.display = Some(encode_number(*value, false));
            }
            Feedback::ShowGlyphs(glyphs) | Feedback::BlinkGlyphs { glyphs, .. } => {
                self.display = Some(*glyphs);
            }
            Feedback::Clear => self.display = Some(GlyphPattern::BLANK),
            Feedback::Lamp(color) => self.lamp = Some(*color),
            Feedback::Tone(_) | Feedback::Melody(_) => {}
        }
        self.pending.push(feedback);
    }
}

impl HostPanel {
    fn drain(&mut self) -> Vec<Response> {
        self.pending.drain(..).map(describe_feedback).collect()
    }
}

enum Mission {
    Running(DepthMonitor),
    Faulted(ConfigError),
}

pub struct Session<W: Write> {
    store: PositionStore,
    decoder: QuadratureDecoder,
    mission: Mission,
    panel: HostPanel,
    diagnostics: DiagnosticLog,
    transcript: TranscriptLogger<W>,
    started_at: HostInstant,
}

impl Session<BufWriter<fs::File>> {
    /// Opens a session logging to the profile's transcript file.
    pub fn new(profile: TranscriptProfile, config: &MissionConfig) -> io::Result<Self> {
        let writer = open_transcript(profile)?;
        Self::with_writer(writer, profile.header(), config)
    }
}

impl<W: Write> Session<W> {
    /// Builds a session over an arbitrary transcript writer.
    pub fn with_writer(writer: W, header: &str, config: &MissionConfig) -> io::Result<Self> {
        let transcript = TranscriptLogger::from_writer(writer, header)?;
        let mission = match DepthMonitor::new(config) {
            Ok(monitor) => Mission::Running(monitor),
            Err(error) => Mission::Faulted(error),
        };

        Ok(Self {
            store: PositionStore::new(),
            decoder: QuadratureDecoder::new(config.resolution, PinLevels::new(false, false)),
            mission,
            panel: HostPanel::default(),
            diagnostics: DiagnosticLog::new(),
            transcript,
            started_at: HostInstant::now(),
        })
    }

    /// Powers the gauge on: shows the floor depth, or `nOPE` on a bad config.
    pub fn boot(&mut self) -> io::Result<Vec<Response>> {
        let elapsed = self.started_at.elapsed();
        let mut lines = Vec::new();
        match &self.mission {
            Mission::Running(monitor) => {
                lines.push(Response::from(format!(
                    "boot floor={} surface={} thresholds={}",
                    monitor.initial_depth(),
                    monitor.surface_depth(),
                    monitor.alerts().len()
                )));
                monitor.start(&mut self.panel);
            }
            Mission::Faulted(error) => {
                lines.push(Response::from(format!("ERR config {error}")));
                mission::fault(&mut self.panel);
            }
        }
        lines.extend(self.panel.drain());
        self.record_output(elapsed, &lines)?;
        Ok(lines)
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<Response>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let elapsed = self.started_at.elapsed();
        self.transcript
            .append_line(elapsed, TranscriptRole::Host, trimmed)?;

        let lines = match parse_command(trimmed) {
            Ok(ConsoleCommand::Help(topic)) => help_lines(topic),
            Ok(command) => {
                if let Mission::Faulted(error) = &self.mission {
                    vec![Response::from(format!("ERR halted: {error}"))]
                } else {
                    self.execute(command)
                }
            }
            Err(error) => vec![Response::from(format!("ERR {error}"))],
        };

        self.record_output(elapsed, &lines)?;
        Ok(lines)
    }

    /// Current display contents, as the panel would show them.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn display(&self) -> Option<GlyphPattern> {
        self.panel.display
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn lamp(&self) -> Option<Rgb> {
        self.panel.lamp
    }

    fn execute(&mut self, command: ConsoleCommand) -> Vec<Response> {
        match command {
            ConsoleCommand::Turn { direction, detents } => self.turn(direction, detents),
            ConsoleCommand::Glitch => self.glitch(),
            ConsoleCommand::Tick { count } => self.tick(count),
            ConsoleCommand::Status => self.status(),
            ConsoleCommand::Restart => self.restart(),
            ConsoleCommand::Help(topic) => help_lines(topic),
        }
    }

    fn turn(&mut self, direction: Direction, detents: u16) -> Vec<Response> {
        let clockwise = direction == Direction::Clockwise;
        // One detent is one decoded step at the configured resolution.
        let per_step = self.decoder.resolution().transitions_per_step();
        let per_detent = u32::from(per_step.unsigned_abs());
        let mut levels = self.decoder.levels();
        for _ in 0..u32::from(detents) * per_detent {
            levels = next_levels(levels, clockwise);
            self.store.apply_step(self.decoder.update(levels));
        }

        let label = if clockwise { "cw" } else { "ccw" };
        vec![Response::from(format!(
            "turned {label} {detents} detent(s) counter={:+}",
            self.store.count()
        ))]
    }

    fn glitch(&mut self) -> Vec<Response> {
        let flipped = PinLevels::from_bits(self.decoder.levels().bits() ^ 0b11);
        self.store.apply_step(self.decoder.update(flipped));
        vec![Response::from(format!(
            "glitch injected (total {})",
            self.decoder.glitches()
        ))]
    }

    fn tick(&mut self, count: u16) -> Vec<Response> {
        let Mission::Running(monitor) = &mut self.mission else {
            return Vec::new();
        };

        let mut lines = Vec::new();
        let mut idle = 0_u32;
        for _ in 0..count {
            let report = monitor.poll(&self.store, &mut self.panel);
            let outcome = report.outcome;
            match self.diagnostics.record(report) {
                Some(record) => lines.push(Response::from(record.to_string())),
                None => idle += 1,
            }
            if outcome != PollOutcome::Idle {
                lines.extend(self.panel.drain());
            }
        }
        if idle > 0 {
            lines.push(Response::from(format!("{idle} idle tick(s)")));
        }
        lines
    }

    fn status(&self) -> Vec<Response> {
        let Mission::Running(monitor) = &self.mission else {
            return Vec::new();
        };

        let phase = match monitor.phase() {
            MissionPhase::Ascending => "ascending",
            MissionPhase::Complete => "complete",
        };
        let mut lines = vec![Response::from(format!(
            "depth={} counter={:+} ascent={}% phase={phase} glitches={} ticks={}",
            monitor.depth(),
            self.store.count(),
            monitor.ascent(),
            self.decoder.glitches(),
            self.diagnostics.ticks()
        ))];
        for (threshold, state) in monitor.alerts().iter() {
            let state = match state {
                ThresholdState::Armed => "armed",
                ThresholdState::Fired => "fired",
            };
            let kind = if threshold.is_surface() {
                "surface"
            } else {
                "checkpoint"
            };
            lines.push(Response::from(format!(
                "  {kind} {} {state}",
                threshold.depth
            )));
        }
        if let Some(display) = self.panel.display {
            lines.push(Response::from(format!("  display [{}]", render_glyphs(display))));
        }
        lines
    }

    fn restart(&mut self) -> Vec<Response> {
        let Mission::Running(monitor) = &mut self.mission else {
            return Vec::new();
        };

        monitor.restart(&self.store);
        self.diagnostics.clear();
        monitor.start(&mut self.panel);

        let mut lines = vec![Response::from("mission restarted".to_string())];
        lines.extend(self.panel.drain());
        lines
    }

    fn record_output(&mut self, elapsed: Duration, lines: &[Response]) -> io::Result<()> {
        for line in lines {
            self.transcript
                .append_line(elapsed, TranscriptRole::Emulator, &line.to_string())?;
        }
        Ok(())
    }
}

fn help_lines(topic: Option<HelpTopic>) -> Vec<Response> {
    match topic {
        Some(topic) => vec![Response::from(topic.usage().to_string())],
        None => {
            let mut lines = vec![Response::from("Available commands:".to_string())];
            for topic in HELP_TOPICS {
                lines.push(Response::from(format!("  {}", topic.usage())));
            }
            lines.push(Response::from(format!("Usage: {COMMAND_SUMMARY}")));
            lines
        }
    }
}

fn describe_feedback(feedback: Feedback) -> Response {
    match feedback {
        Feedback::ShowNumber { value, separator } => {
            let mark = if separator { ":" } else { "" };
            Response::from(format!("display [{value:>4}]{mark}"))
        }
        Feedback::ShowGlyphs(glyphs) => {
            Response::from(format!("display [{}]", render_glyphs(glyphs)))
        }
        Feedback::Clear => Response::from("display [    ]".to_string()),
        Feedback::BlinkNumber { value, times } => {
            Response::from(format!("display blink [{value:>4}] x{times}"))
        }
        Feedback::BlinkGlyphs { glyphs, times } => Response::from(format!(
            "display blink [{}] x{times}",
            render_glyphs(glyphs)
        )),
        Feedback::Tone(tone) => Response::from(format!(
            "buzzer {} Hz {} ms",
            tone.frequency_hz,
            tone.duration.as_millis()
        )),
        Feedback::Melody(melody) => {
            let notes: Vec<String> = melody
                .iter()
                .map(|tone| format!("{} Hz {} ms", tone.frequency_hz, tone.duration.as_millis()))
                .collect();
            Response::from(format!("buzzer melody {}", notes.join(", ")))
        }
        Feedback::Lamp(color) => Response::Lamp(color),
    }
}

fn render_glyphs(glyphs: GlyphPattern) -> String {
    glyphs.word().map_or_else(
        || {
            glyphs
                .segments()
                .iter()
                .map(|segments| format!("{segments:02x}"))
                .collect::<Vec<_>>()
                .join(" ")
        },
        str::to_string,
    )
}

/// Parses `a,b,c` into access keys.
pub fn parse_access_keys(value: &str) -> Result<AccessKeys, String> {
    let parsed: Result<Vec<u16>, _> = value.split(',').map(|key| key.trim().parse()).collect();
    let keys = parsed.map_err(|err| format!("Invalid access key list `{value}`: {err}"))?;
    let keys: [u16; 3] = keys
        .try_into()
        .map_err(|_| format!("Expected three access keys, got `{value}`"))?;
    Ok(AccessKeys::new(keys))
}

struct TranscriptLogger<W: Write> {
    writer: W,
}

fn open_transcript(profile: TranscriptProfile) -> io::Result<BufWriter<fs::File>> {
    let path = Path::new(profile.log_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::new(file))
}

impl<W: Write> TranscriptLogger<W> {
    fn from_writer(writer: W, header: &str) -> io::Result<Self> {
        let mut logger = Self { writer };
        logger.write_header(header)?;
        Ok(logger)
    }

    fn write_header(&mut self, header: &str) -> io::Result<()> {
        writeln!(self.writer, "# {header}")?;
        writeln!(
            self.writer,
            "# Timestamps are milliseconds since session start"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(
        &mut self,
        elapsed: Duration,
        role: TranscriptRole,
        line: &str,
    ) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}
