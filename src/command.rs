use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Discrete input delivered by the host. Gravity is not a command; it comes
/// from `Game::step`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    RotateCw,
    SoftDrop,
    HardDrop,
    TogglePause,
    Reset,
}

impl Command {
    /// Commands that act on the falling piece, as opposed to the session.
    pub fn targets_piece(self) -> bool {
        !matches!(self, Command::TogglePause | Command::Reset)
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(match key.as_str() {
            "moveleft" | "left" | "arrowleft" => Command::MoveLeft,
            "moveright" | "right" | "arrowright" => Command::MoveRight,
            "rotatecw" | "rotate" | "cw" | "arrowup" | "x" => Command::RotateCw,
            "softdrop" | "soft" | "down" | "arrowdown" => Command::SoftDrop,
            "harddrop" | "hard" | "drop" | "space" => Command::HardDrop,
            "togglepause" | "pause" | "p" => Command::TogglePause,
            "reset" | "restart" => Command::Reset,
            _ => return Err(ParseError::new("command", s)),
        })
    }
}
