//! Directional pad for the car.
//!
//! Pressing one of the eight buttons starts the matching motion at the power
//! set when the press began; releasing anywhere on the pad sends a stop. A
//! release always stops, even when nothing was pressed.

use std::{fmt, str::FromStr};

use tracing::debug;

use crate::commands::{Dispatched, MotionCommand, MotionCommands};

pub const DEFAULT_POWER: u32 = 200;
pub const MAX_POWER: u32 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Left,
    Right,
    DownLeft,
    Down,
    DownRight,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
        Direction::Left,
        Direction::Right,
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
    ];

    pub fn command(self, power: u32) -> MotionCommand {
        match self {
            Self::UpLeft => MotionCommand::LeftForward(power),
            Self::Up => MotionCommand::Forward(power),
            Self::UpRight => MotionCommand::RightForward(power),
            Self::Left => MotionCommand::Left(power),
            Self::Right => MotionCommand::Right(power),
            Self::DownLeft => MotionCommand::LeftBackward(power),
            Self::Down => MotionCommand::Backward(power),
            Self::DownRight => MotionCommand::RightBackward(power),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpLeft => "upleft",
            Self::Up => "up",
            Self::UpRight => "upright",
            Self::Left => "left",
            Self::Right => "right",
            Self::DownLeft => "downleft",
            Self::Down => "down",
            Self::DownRight => "downright",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Direction::ALL
            .into_iter()
            .find(|direction| direction.as_str() == normalized)
            .ok_or_else(|| format!("unknown direction `{value}`"))
    }
}

/// Mouse and touch input drive the pad identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadEvent {
    PressStart {
        direction: Direction,
        source: InputSource,
    },
    Release {
        source: InputSource,
    },
    ContextMenu,
}

/// Exclusive "currently pressed" indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PadIndicator {
    #[default]
    Neutral,
    Pressed(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadResponse {
    Dispatch(MotionCommand),
    /// The event's default handling (context menu) must be prevented.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadState {
    pub indicator: PadIndicator,
    pub power: u32,
}

impl Default for PadState {
    fn default() -> Self {
        Self {
            indicator: PadIndicator::Neutral,
            power: DEFAULT_POWER,
        }
    }
}

impl PadState {
    pub fn handle(&mut self, event: PadEvent) -> PadResponse {
        match event {
            PadEvent::PressStart { direction, .. } => {
                self.indicator = PadIndicator::Pressed(direction);
                PadResponse::Dispatch(direction.command(self.power))
            }
            PadEvent::Release { .. } => {
                self.indicator = PadIndicator::Neutral;
                PadResponse::Dispatch(MotionCommand::Stop)
            }
            PadEvent::ContextMenu => PadResponse::Suppressed,
        }
    }

    /// Clamped to the slider range. A held press keeps the power it started with.
    pub fn set_power(&mut self, power: u32) {
        self.power = power.min(MAX_POWER);
    }
}

/// Pad state wired to the car's motion commands.
pub struct PadController {
    state: PadState,
    commands: MotionCommands,
}

impl PadController {
    pub fn new(commands: MotionCommands) -> Self {
        Self {
            state: PadState::default(),
            commands,
        }
    }

    pub fn state(&self) -> PadState {
        self.state
    }

    pub fn set_power(&mut self, power: u32) {
        self.state.set_power(power);
    }

    /// Returns the queued send for dispatched commands, `None` for
    /// suppressed events.
    pub fn handle(&mut self, event: PadEvent) -> Option<Dispatched> {
        match self.state.handle(event) {
            PadResponse::Dispatch(command) => {
                debug!(?event, command = command.name(), "pad event");
                Some(self.commands.dispatch(command))
            }
            PadResponse::Suppressed => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/pad_tests.rs"]
mod tests;
