//! Operator command grammar shared by the emulator and diagnostic links.
//!
//! Keywords are case-insensitive and separated by ASCII spaces or tabs.
//! Repeat counts are bounded to `1..=MAX_REPEAT`.

use core::fmt;

use winnow::ModalResult;
use winnow::ascii::{Caseless, dec_uint, space1};
use winnow::combinator::{alt, cut_err, opt, preceded};
use winnow::prelude::*;

/// Largest detent or tick count accepted by a single command.
pub const MAX_REPEAT: u16 = 1000;

/// One-line summary of every command.
pub const COMMAND_SUMMARY: &str =
    "turn <cw|ccw> [n] | glitch | tick [n] | status | restart | help [topic]";

/// Knob rotation direction. Clockwise raises the lander.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

/// Commands with dedicated help text.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HelpTopic {
    Turn,
    Glitch,
    Tick,
    Status,
    Restart,
}

impl HelpTopic {
    #[must_use]
    pub const fn usage(self) -> &'static str {
        match self {
            HelpTopic::Turn => "turn <cw|ccw> [n]: rotate the knob n detents (default 1)",
            HelpTopic::Glitch => "glitch: inject an invalid encoder transition",
            HelpTopic::Tick => "tick [n]: run n poll cycles (default 1)",
            HelpTopic::Status => "status: print depth, counter, and threshold states",
            HelpTopic::Restart => "restart: zero the counter and re-arm every threshold",
        }
    }
}

/// Parsed operator command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsoleCommand {
    Turn { direction: Direction, detents: u16 },
    Glitch,
    Tick { count: u16 },
    Status,
    Restart,
    Help(Option<HelpTopic>),
}

/// Errors surfaced by [`parse_command`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsoleError {
    /// The line held only whitespace.
    Empty,
    /// Input was rejected at `offset` bytes into the line.
    Syntax { offset: usize },
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Empty => f.write_str("empty command"),
            ConsoleError::Syntax { offset } => write!(f, "syntax error at column {}", offset + 1),
        }
    }
}

/// Parses a single command line.
///
/// # Errors
///
/// Returns [`ConsoleError::Empty`] for blank input and
/// [`ConsoleError::Syntax`] when the line does not match the grammar.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let trimmed = line.trim_start();
    let leading = line.len() - trimmed.len();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        return Err(ConsoleError::Empty);
    }

    command.parse(trimmed).map_err(|error| ConsoleError::Syntax {
        offset: leading + error.offset(),
    })
}

fn command(input: &mut &str) -> ModalResult<ConsoleCommand> {
    alt((turn, glitch, tick, status, restart, help)).parse_next(input)
}

fn turn(input: &mut &str) -> ModalResult<ConsoleCommand> {
    preceded(
        (Caseless("turn"), space1),
        cut_err((direction, opt(preceded(space1, repeat)))),
    )
    .map(|(direction, detents)| ConsoleCommand::Turn {
        direction,
        detents: detents.unwrap_or(1),
    })
    .parse_next(input)
}

fn glitch(input: &mut &str) -> ModalResult<ConsoleCommand> {
    Caseless("glitch")
        .value(ConsoleCommand::Glitch)
        .parse_next(input)
}

fn tick(input: &mut &str) -> ModalResult<ConsoleCommand> {
    preceded(Caseless("tick"), opt(preceded(space1, cut_err(repeat))))
        .map(|count| ConsoleCommand::Tick {
            count: count.unwrap_or(1),
        })
        .parse_next(input)
}

fn status(input: &mut &str) -> ModalResult<ConsoleCommand> {
    Caseless("status")
        .value(ConsoleCommand::Status)
        .parse_next(input)
}

fn restart(input: &mut &str) -> ModalResult<ConsoleCommand> {
    Caseless("restart")
        .value(ConsoleCommand::Restart)
        .parse_next(input)
}

fn help(input: &mut &str) -> ModalResult<ConsoleCommand> {
    preceded(Caseless("help"), opt(preceded(space1, cut_err(topic))))
        .map(ConsoleCommand::Help)
        .parse_next(input)
}

fn direction(input: &mut &str) -> ModalResult<Direction> {
    alt((
        Caseless("ccw").value(Direction::CounterClockwise),
        Caseless("cw").value(Direction::Clockwise),
    ))
    .parse_next(input)
}

fn topic(input: &mut &str) -> ModalResult<HelpTopic> {
    alt((
        Caseless("turn").value(HelpTopic::Turn),
        Caseless("glitch").value(HelpTopic::Glitch),
        Caseless("tick").value(HelpTopic::Tick),
        Caseless("status").value(HelpTopic::Status),
        Caseless("restart").value(HelpTopic::Restart),
    ))
    .parse_next(input)
}

fn repeat(input: &mut &str) -> ModalResult<u16> {
    dec_uint
        .verify(|value: &u16| (1..=MAX_REPEAT).contains(value))
        .parse_next(input)
}
