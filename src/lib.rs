//! Simulation core for a falling-block puzzle game: a 20x10 well, seven piece
//! kinds dealt from shuffled bags, flat per-line scoring and a frame-driven
//! scheduler. Hosts push commands in and read render snapshots out.

use wasm_bindgen::prelude::*;

pub mod bag;
pub mod board;
pub mod client;
pub mod command;
mod error;
pub mod game;
pub mod piece;
pub mod scoring;
pub mod settings;
pub mod shape;

pub use bag::{PieceQueue, Randomizer, SevenBag, PREVIEW_DEPTH};
pub use board::Board;
pub use client::GameClient;
pub use command::Command;
pub use error::ParseError;
pub use game::{Game, GameView, Phase, RenderCell, RenderGrid, Stats};
pub use piece::{ActivePiece, Point};
pub use scoring::Scoring;
pub use settings::Settings;
pub use shape::{PieceKind, Shape};

pub const ROWS: usize = 20;
pub const COLS: usize = 10;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn log(msg: &str) {
    eprintln!("[engine] {msg}");
}
